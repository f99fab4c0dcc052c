use chrono::{Datelike, NaiveDateTime};

use crate::models::AnalyticsPeriod;

/// Bucket key for `at` at the given granularity.
///
/// Every format is zero-padded and most-significant first, so sorting keys
/// lexically sorts them chronologically. Weekly keys use the ISO week-year,
/// which differs from the calendar year for a few days around New Year
/// (2023-01-01 is `2022-W52`).
pub(crate) fn period_key(at: NaiveDateTime, period: AnalyticsPeriod) -> String {
    match period {
        AnalyticsPeriod::Daily => at.format("%Y-%m-%d").to_string(),
        AnalyticsPeriod::Weekly => {
            let week = at.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        AnalyticsPeriod::Monthly => format!("{:04}-{:02}", at.year(), at.month()),
        AnalyticsPeriod::Yearly => format!("{:04}", at.year()),
    }
}
