#![allow(clippy::unwrap_used)]

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{AnalyticsPeriod, AnalyticsQuery, Currency, Transaction, TransactionKind};

fn at(s: &str) -> NaiveDateTime {
    crate::models::parse_datetime(s).unwrap()
}

fn txn(
    id: &str,
    kind: TransactionKind,
    amount: Decimal,
    date: &str,
    category: &str,
    subcategory: &str,
) -> Transaction {
    Transaction {
        id: id.into(),
        owner_id: 1,
        kind,
        currency: Currency::default(),
        amount,
        occurred_at: at(date),
        category_id: category.into(),
        subcategory_id: subcategory.into(),
        description: Some(format!("txn {id}")),
        notes: None,
        tags: Vec::new(),
        created_at: String::new(),
        updated_at: String::new(),
        is_deleted: false,
    }
}

fn expense(id: &str, amount: Decimal, date: &str, category: &str, sub: &str) -> Transaction {
    txn(id, TransactionKind::Expense, amount, date, category, sub)
}

fn income(id: &str, amount: Decimal, date: &str) -> Transaction {
    txn(id, TransactionKind::Income, amount, date, "income", "salary")
}

fn tagged(mut t: Transaction, tags: &[&str]) -> Transaction {
    t.tags = tags.iter().map(|s| s.to_string()).collect();
    t
}

/// Three food expenses and one salary.
fn food_and_salary() -> Vec<Transaction> {
    vec![
        expense("e1", dec!(100), "2024-03-01", "food", "a"),
        expense("e2", dec!(200), "2024-03-02", "food", "a"),
        expense("e3", dec!(300), "2024-03-02", "food", "b"),
        income("i1", dec!(1000), "2024-03-05"),
    ]
}

fn monthly() -> AnalyticsQuery {
    AnalyticsQuery::with_period(AnalyticsPeriod::Monthly)
}

// ── Period bucketing ─────────────────────────────────────────

#[test]
fn test_period_key_formats() {
    let t = at("2024-03-07T15:30:00");
    assert_eq!(period_key(t, AnalyticsPeriod::Daily), "2024-03-07");
    assert_eq!(period_key(t, AnalyticsPeriod::Weekly), "2024-W10");
    assert_eq!(period_key(t, AnalyticsPeriod::Monthly), "2024-03");
    assert_eq!(period_key(t, AnalyticsPeriod::Yearly), "2024");
}

#[test]
fn test_weekly_uses_iso_week_year_at_start_of_year() {
    // 2023-01-01 is a Sunday, the last day of ISO week 52 of 2022.
    assert_eq!(
        period_key(at("2023-01-01"), AnalyticsPeriod::Weekly),
        "2022-W52"
    );
    assert_eq!(
        period_key(at("2023-01-02"), AnalyticsPeriod::Weekly),
        "2023-W01"
    );
}

#[test]
fn test_weekly_uses_iso_week_year_at_end_of_year() {
    // 2024-12-30 is a Monday, which starts ISO week 1 of 2025.
    assert_eq!(
        period_key(at("2024-12-30"), AnalyticsPeriod::Weekly),
        "2025-W01"
    );
    // 2020 has 53 ISO weeks.
    assert_eq!(
        period_key(at("2020-12-31"), AnalyticsPeriod::Weekly),
        "2020-W53"
    );
}

#[test]
fn test_unknown_granularity_falls_back_to_daily() {
    let period = AnalyticsPeriod::parse("fortnightly");
    assert_eq!(period, AnalyticsPeriod::Daily);
    assert_eq!(period_key(at("2024-03-07"), period), "2024-03-07");
}

#[test]
fn test_period_keys_sort_chronologically() {
    let dates = ["2023-12-31", "2024-01-01", "2024-02-29", "2024-10-01"];
    for period in AnalyticsPeriod::all() {
        let keys: Vec<String> = dates.iter().map(|d| period_key(at(d), *period)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted, "keys out of order for {period}");
    }
}

// ── Financial summary ────────────────────────────────────────

#[test]
fn test_summary_totals() {
    let summary = financial_summary(&food_and_salary());
    assert_eq!(summary.total_expense, dec!(600));
    assert_eq!(summary.total_income, dec!(1000));
    assert_eq!(summary.net_income, dec!(400));
}

#[test]
fn test_summary_income_plus_expense_equals_sum_of_amounts() {
    let txns = food_and_salary();
    let summary = financial_summary(&txns);
    let sum: Decimal = txns.iter().map(|t| t.amount).sum();
    assert_eq!(summary.total_income + summary.total_expense, sum);
    assert_eq!(
        summary.net_income,
        summary.total_income - summary.total_expense
    );
}

#[test]
fn test_avg_daily_expense_uses_distinct_calendar_days() {
    // 600 over two distinct expense days (the income day does not count).
    let summary = financial_summary(&food_and_salary());
    assert_eq!(summary.avg_daily_expense, dec!(300));
}

#[test]
fn test_avg_daily_expense_ignores_time_of_day() {
    let txns = vec![
        expense("a", dec!(10), "2024-01-01T08:00:00", "food", "x"),
        expense("b", dec!(20), "2024-01-01T23:59:59", "food", "x"),
        expense("c", dec!(5), "2024-01-03T12:00:00", "food", "x"),
    ];
    let summary = financial_summary(&txns);
    assert_eq!(summary.avg_daily_expense, dec!(17.5));
}

#[test]
fn test_avg_daily_expense_rounds_to_two_places() {
    let txns = vec![
        expense("a", dec!(5), "2024-01-01", "food", "x"),
        expense("b", dec!(3), "2024-01-02", "food", "x"),
        expense("c", dec!(2), "2024-01-03", "food", "x"),
    ];
    let summary = financial_summary(&txns);
    assert_eq!(summary.avg_daily_expense, dec!(3.33));
}

#[test]
fn test_avg_daily_expense_zero_without_expenses() {
    let summary = financial_summary(&[income("i", dec!(50), "2024-01-01")]);
    assert_eq!(summary.avg_daily_expense, Decimal::ZERO);
    assert!(summary.largest_expense.is_none());
    assert_eq!(summary.total_expense, Decimal::ZERO);
}

#[test]
fn test_largest_expense_snapshot() {
    let summary = financial_summary(&food_and_salary());
    let largest = summary.largest_expense.unwrap();
    assert_eq!(largest.id, "e3");
    assert_eq!(largest.amount, dec!(300));
    assert_eq!(largest.description.as_deref(), Some("txn e3"));
    assert_eq!(largest.category_id, "food");
    assert_eq!(largest.occurred_at, "2024-03-02T00:00:00");
}

#[test]
fn test_largest_expense_ignores_larger_income() {
    let summary = financial_summary(&food_and_salary());
    assert_ne!(summary.largest_expense.unwrap().id, "i1");
}

#[test]
fn test_largest_expense_tie_goes_to_first() {
    let txns = vec![
        expense("first", dec!(50), "2024-01-02", "food", "x"),
        expense("second", dec!(50), "2024-01-01", "food", "x"),
    ];
    let summary = financial_summary(&txns);
    assert_eq!(summary.largest_expense.unwrap().id, "first");
}

#[test]
fn test_most_frequent_category_counts_all_kinds() {
    let txns = vec![
        expense("a", dec!(1), "2024-01-01", "food", "x"),
        income("b", dec!(1), "2024-01-01"),
        income("c", dec!(1), "2024-01-02"),
    ];
    let summary = financial_summary(&txns);
    let most = summary.most_frequent_category.unwrap();
    assert_eq!(most.category_id, "income");
    assert_eq!(most.count, 2);
}

#[test]
fn test_most_frequent_category_tie_goes_to_first_seen() {
    let txns = vec![
        expense("a", dec!(1), "2024-01-01", "travel", "x"),
        expense("b", dec!(1), "2024-01-01", "food", "x"),
        expense("c", dec!(1), "2024-01-01", "food", "x"),
        expense("d", dec!(1), "2024-01-01", "travel", "x"),
    ];
    let most = financial_summary(&txns).most_frequent_category.unwrap();
    assert_eq!(most.category_id, "travel");
    assert_eq!(most.count, 2);
}

#[test]
fn test_summary_empty_input() {
    let summary = financial_summary(&[]);
    assert_eq!(summary, FinancialSummary::default());
    assert_eq!(summary.total_income, Decimal::ZERO);
    assert_eq!(summary.avg_daily_expense, Decimal::ZERO);
    assert!(summary.largest_expense.is_none());
    assert!(summary.most_frequent_category.is_none());
}

// ── Category breakdown ───────────────────────────────────────

#[test]
fn test_category_breakdown_scenario() {
    let breakdown = category_breakdown(&food_and_salary());
    assert_eq!(breakdown.len(), 2);

    // Income (1000) sorts ahead of food (600).
    assert_eq!(breakdown[0].category_id, "income");
    let food = &breakdown[1];
    assert_eq!(food.category_id, "food");
    assert_eq!(food.category_name, "Food");
    assert_eq!(food.total_amount, dec!(600));
    assert_eq!(food.transaction_count, 3);
    assert_eq!(food.percentage, dec!(37.5));

    let a = food
        .subcategories
        .iter()
        .find(|s| s.subcategory_id == "a")
        .unwrap();
    assert_eq!(a.total_amount, dec!(300));
    assert_eq!(a.transaction_count, 2);
    assert_eq!(a.percentage, dec!(50.0));
}

#[test]
fn test_category_totals_sum_to_grand_total() {
    let txns = food_and_salary();
    let breakdown = category_breakdown(&txns);
    let grand: Decimal = txns.iter().map(|t| t.amount).sum();
    let categories: Decimal = breakdown.iter().map(|c| c.total_amount).sum();
    assert_eq!(categories, grand);
}

#[test]
fn test_subcategory_percentages_sum_to_hundred() {
    let txns = vec![
        expense("a", dec!(1), "2024-01-01", "food", "x"),
        expense("b", dec!(1), "2024-01-01", "food", "y"),
        expense("c", dec!(1), "2024-01-01", "food", "z"),
    ];
    let breakdown = category_breakdown(&txns);
    let total: Decimal = breakdown[0].subcategories.iter().map(|s| s.percentage).sum();
    // 3 x 33.33
    assert!((total - dec!(100)).abs() <= dec!(0.03));
}

#[test]
fn test_subcategories_sorted_by_amount_descending() {
    let breakdown = category_breakdown(&food_and_salary());
    let food = breakdown.iter().find(|c| c.category_id == "food").unwrap();
    let subs: Vec<&str> = food
        .subcategories
        .iter()
        .map(|s| s.subcategory_id.as_str())
        .collect();
    // a = 300, b = 300: tie keeps first-seen order
    assert_eq!(subs, vec!["a", "b"]);
}

#[test]
fn test_category_ties_keep_encounter_order() {
    let txns = vec![
        expense("a", dec!(10), "2024-01-01", "zeta", "x"),
        expense("b", dec!(10), "2024-01-01", "alpha", "x"),
        expense("c", dec!(25), "2024-01-01", "mid", "x"),
    ];
    let ids: Vec<String> = category_breakdown(&txns)
        .into_iter()
        .map(|c| c.category_id)
        .collect();
    assert_eq!(ids, vec!["mid", "zeta", "alpha"]);
}

#[test]
fn test_category_name_is_title_cased() {
    let txns = vec![expense("a", dec!(1), "2024-01-01", "food_dining", "lunch")];
    let breakdown = category_breakdown(&txns);
    assert_eq!(breakdown[0].category_name, "Food Dining");
}

#[test]
fn test_category_percentages_round_to_two_places() {
    let txns = vec![
        expense("a", dec!(1), "2024-01-01", "one", "x"),
        expense("b", dec!(2), "2024-01-01", "two", "x"),
    ];
    let breakdown = category_breakdown(&txns);
    assert_eq!(breakdown[0].percentage, dec!(66.67));
    assert_eq!(breakdown[1].percentage, dec!(33.33));
}

#[test]
fn test_category_breakdown_empty() {
    assert!(category_breakdown(&[]).is_empty());
}

#[test]
fn test_percentage_zero_whole_is_zero() {
    assert_eq!(percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
}

// ── Spending trends ──────────────────────────────────────────

#[test]
fn test_spending_trends_sum_both_kinds() {
    let trends = spending_trends(&food_and_salary(), &monthly());
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].period, "2024-03");
    assert_eq!(trends[0].amount, dec!(1600));
    assert_eq!(trends[0].transaction_count, 4);
}

#[test]
fn test_spending_trends_sorted_ascending() {
    let txns = vec![
        expense("a", dec!(5), "2024-03-10", "food", "x"),
        expense("b", dec!(7), "2023-12-01", "food", "x"),
        expense("c", dec!(1), "2024-01-15", "food", "x"),
        expense("d", dec!(2), "2024-03-20", "food", "x"),
    ];
    let trends = spending_trends(&txns, &monthly());
    let keys: Vec<&str> = trends.iter().map(|t| t.period.as_str()).collect();
    assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);
    assert_eq!(trends[2].amount, dec!(7));
    assert_eq!(trends[2].transaction_count, 2);
}

#[test]
fn test_spending_trends_daily() {
    let query = AnalyticsQuery::with_period(AnalyticsPeriod::Daily);
    let trends = spending_trends(&food_and_salary(), &query);
    let keys: Vec<&str> = trends.iter().map(|t| t.period.as_str()).collect();
    assert_eq!(keys, vec!["2024-03-01", "2024-03-02", "2024-03-05"]);
    assert_eq!(trends[1].amount, dec!(500));
}

// ── Tag analytics ────────────────────────────────────────────

#[test]
fn test_tag_analytics_scenario() {
    let txns = vec![
        tagged(expense("a", dec!(10), "2024-01-01", "food", "x"), &["a", "b"]),
        tagged(expense("b", dec!(20), "2024-01-02", "food", "x"), &["a"]),
    ];
    let tags = tag_analytics(&txns);
    assert_eq!(tags.len(), 2);

    assert_eq!(tags[0].tag, "a");
    assert_eq!(tags[0].total_amount, dec!(30));
    assert_eq!(tags[0].transaction_count, 2);
    assert_eq!(tags[0].avg_amount, dec!(15.0));

    assert_eq!(tags[1].tag, "b");
    assert_eq!(tags[1].total_amount, dec!(10));
    assert_eq!(tags[1].transaction_count, 1);
    assert_eq!(tags[1].avg_amount, dec!(10.0));
}

#[test]
fn test_tag_analytics_case_sensitive_and_duplicates_count() {
    let txns = vec![tagged(
        expense("a", dec!(4), "2024-01-01", "food", "x"),
        &["Trip", "trip", "trip"],
    )];
    let tags = tag_analytics(&txns);
    let lower = tags.iter().find(|t| t.tag == "trip").unwrap();
    assert_eq!(lower.transaction_count, 2);
    assert_eq!(lower.total_amount, dec!(8));
    assert!(tags.iter().any(|t| t.tag == "Trip"));
}

#[test]
fn test_tag_analytics_untagged_contribute_nothing() {
    let tags = tag_analytics(&food_and_salary());
    assert!(tags.is_empty());
}

#[test]
fn test_tag_analytics_top_twenty_non_increasing() {
    let txns: Vec<Transaction> = (1..=30)
        .map(|i| {
            let tag = format!("tag{i}");
            tagged(
                expense(&i.to_string(), Decimal::from(i), "2024-01-01", "food", "x"),
                &[tag.as_str()],
            )
        })
        .collect();
    let tags = tag_analytics(&txns);
    assert_eq!(tags.len(), TOP_TAGS_LIMIT);
    assert_eq!(tags[0].tag, "tag30");
    assert!(tags
        .windows(2)
        .all(|w| w[0].total_amount >= w[1].total_amount));
}

#[test]
fn test_tag_analytics_ties_keep_first_seen() {
    let txns = vec![
        tagged(expense("a", dec!(5), "2024-01-01", "food", "x"), &["later"]),
        tagged(expense("b", dec!(5), "2024-01-01", "food", "x"), &["earlier"]),
    ];
    let tags = tag_analytics(&txns);
    assert_eq!(tags[0].tag, "later");
    assert_eq!(tags[1].tag, "earlier");
}

// ── Period comparison ────────────────────────────────────────

#[test]
fn test_period_comparison_splits_kinds() {
    let txns = vec![
        expense("a", dec!(30), "2024-01-10", "food", "x"),
        income("b", dec!(100), "2024-01-20"),
        expense("c", dec!(50), "2024-02-01", "food", "x"),
    ];
    let periods = period_comparison(&txns, &monthly());
    assert_eq!(periods.len(), 2);

    assert_eq!(periods[0].period, "2024-01");
    assert_eq!(periods[0].income, dec!(100));
    assert_eq!(periods[0].expense, dec!(30));
    assert_eq!(periods[0].net, dec!(70));
    assert_eq!(periods[0].transaction_count, 2);

    assert_eq!(periods[1].period, "2024-02");
    assert_eq!(periods[1].income, Decimal::ZERO);
    assert_eq!(periods[1].net, dec!(-50));
}

#[test]
fn test_period_comparison_weekly_crosses_year() {
    let txns = vec![
        expense("a", dec!(1), "2023-01-01", "food", "x"),
        expense("b", dec!(2), "2022-12-26", "food", "x"),
        expense("c", dec!(4), "2023-01-02", "food", "x"),
    ];
    let query = AnalyticsQuery::with_period(AnalyticsPeriod::Weekly);
    let periods = period_comparison(&txns, &query);
    let keys: Vec<&str> = periods.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(keys, vec!["2022-W52", "2023-W01"]);
    assert_eq!(periods[0].expense, dec!(3));
}

// ── Overview ─────────────────────────────────────────────────

#[test]
fn test_overview_composes_all_views() {
    let txns = food_and_salary();
    let query = monthly();
    let result = overview(&txns, &query);
    assert_eq!(result.summary, financial_summary(&txns));
    assert_eq!(result.category_breakdown, category_breakdown(&txns));
    assert_eq!(result.spending_trends, spending_trends(&txns, &query));
    assert_eq!(result.top_tags, tag_analytics(&txns));
    assert_eq!(result.period_comparison, period_comparison(&txns, &query));
}

#[test]
fn test_overview_empty_matches_each_view() {
    let query = monthly();
    let result = overview(&[], &query);
    assert_eq!(result.summary, financial_summary(&[]));
    assert!(result.category_breakdown.is_empty());
    assert!(result.spending_trends.is_empty());
    assert!(result.top_tags.is_empty());
    assert!(result.period_comparison.is_empty());
    assert_eq!(spending_trends(&[], &query), result.spending_trends);
    assert_eq!(period_comparison(&[], &query), result.period_comparison);
}

#[test]
fn test_overview_is_deterministic() {
    let mut txns = food_and_salary();
    txns.push(tagged(
        expense("t", dec!(12.34), "2024-04-01", "travel", "hotel"),
        &["x", "y"],
    ));
    let query = AnalyticsQuery::with_period(AnalyticsPeriod::Weekly);
    let first = overview(&txns, &query);
    let second = overview(&txns, &query);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_overview_serializes_expected_fields() {
    let json = serde_json::to_value(overview(&food_and_salary(), &monthly())).unwrap();
    assert!(json.get("summary").is_some());
    assert!(json["summary"].get("net_income").is_some());
    assert!(json.get("category_breakdown").is_some());
    assert!(json.get("spending_trends").is_some());
    assert!(json.get("top_tags").is_some());
    assert!(json.get("period_comparison").is_some());
}

#[test]
fn test_tolerates_pre_narrowed_slice() {
    // The store has already applied an expense-only filter.
    let txns: Vec<Transaction> = food_and_salary()
        .into_iter()
        .filter(|t| t.is_expense())
        .collect();
    let result = overview(&txns, &monthly());
    assert_eq!(result.summary.total_income, Decimal::ZERO);
    assert_eq!(result.summary.total_expense, dec!(600));
    assert_eq!(result.category_breakdown[0].percentage, dec!(100));
}

// ── Extreme totals ───────────────────────────────────────────

#[test]
fn test_totals_past_decimal_max_clamp_instead_of_panicking() {
    let big = Decimal::MAX / dec!(2) + Decimal::ONE;
    let txns = vec![
        tagged(expense("e1", big, "2024-03-01", "food", "a"), &["x"]),
        tagged(expense("e2", big, "2024-03-02", "food", "a"), &["x"]),
    ];

    let result = overview(&txns, &monthly());
    assert_eq!(result.summary.total_expense, Decimal::MAX);
    assert_eq!(result.summary.net_income, -Decimal::MAX);
    assert_eq!(result.category_breakdown[0].total_amount, Decimal::MAX);
    assert_eq!(result.category_breakdown[0].percentage, dec!(100));
    assert_eq!(result.spending_trends[0].amount, Decimal::MAX);
    assert_eq!(result.period_comparison[0].expense, Decimal::MAX);
}
