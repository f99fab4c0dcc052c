use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::TransactionKind;

/// Bucket granularity for time-series views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl AnalyticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Unrecognized values fall back to daily.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "w" => Self::Weekly,
            "monthly" | "month" | "m" => Self::Monthly,
            "yearly" | "year" | "y" => Self::Yearly,
            _ => Self::Daily,
        }
    }

    pub fn all() -> &'static [AnalyticsPeriod] {
        &[Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly]
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Yearly,
            Self::Yearly => Self::Daily,
        }
    }
}

impl std::fmt::Display for AnalyticsPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to aggregate. `kind` and `category_id` are applied by the store
/// when it selects rows; the aggregator only reads `period`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period: AnalyticsPeriod,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
}

impl AnalyticsQuery {
    pub fn with_period(period: AnalyticsPeriod) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargestExpense {
    pub id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category_id: String,
    pub occurred_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFrequency {
    pub category_id: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_income: Decimal,
    pub avg_daily_expense: Decimal,
    pub largest_expense: Option<LargestExpense>,
    pub most_frequent_category: Option<CategoryFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryBreakdown {
    pub subcategory_id: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category_id: String,
    pub category_name: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub percentage: Decimal,
    pub subcategories: Vec<SubcategoryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingTrend {
    pub period: String,
    pub amount: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagAnalytics {
    pub tag: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub avg_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub period: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalyticsOverview {
    pub summary: FinancialSummary,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub spending_trends: Vec<SpendingTrend>,
    pub top_tags: Vec<TagAnalytics>,
    pub period_comparison: Vec<PeriodComparison>,
}
