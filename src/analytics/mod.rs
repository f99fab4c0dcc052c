//! Aggregate views over an already-filtered slice of transactions.
//!
//! Everything here is a pure function of its inputs. Rows are selected by the
//! store (owner, soft-delete flag, date range, kind, category); this module
//! only groups and sums what it is handed. Output order never depends on map
//! iteration order: groups are kept in first-encounter order and then put
//! through an explicit stable sort.

mod period;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    display_name, AnalyticsOverview, AnalyticsQuery, CategoryBreakdown, CategoryFrequency,
    FinancialSummary, LargestExpense, PeriodComparison, SpendingTrend, SubcategoryBreakdown,
    TagAnalytics, Transaction, TransactionKind, DATETIME_FORMAT,
};

pub(crate) use period::period_key;

pub(crate) const TOP_TAGS_LIMIT: usize = 20;

/// All five views for one slice and one query.
pub(crate) fn overview(transactions: &[Transaction], query: &AnalyticsQuery) -> AnalyticsOverview {
    if transactions.is_empty() {
        return AnalyticsOverview::default();
    }

    AnalyticsOverview {
        summary: financial_summary(transactions),
        category_breakdown: category_breakdown(transactions),
        spending_trends: spending_trends(transactions, query),
        top_tags: tag_analytics(transactions),
        period_comparison: period_comparison(transactions, query),
    }
}

pub(crate) fn financial_summary(transactions: &[Transaction]) -> FinancialSummary {
    if transactions.is_empty() {
        return FinancialSummary::default();
    }

    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut expense_days = HashSet::new();
    let mut largest: Option<&Transaction> = None;

    for t in transactions {
        match t.kind {
            TransactionKind::Income => total_income = total_income.saturating_add(t.amount),
            TransactionKind::Expense => {
                total_expense = total_expense.saturating_add(t.amount);
                expense_days.insert(t.occurred_at.date());
                // Strict comparison: the first of equal amounts wins.
                let is_larger = match largest {
                    Some(best) => t.amount > best.amount,
                    None => true,
                };
                if is_larger {
                    largest = Some(t);
                }
            }
        }
    }

    let avg_daily_expense = if expense_days.is_empty() {
        Decimal::ZERO
    } else {
        round2(total_expense / Decimal::from(expense_days.len()))
    };

    let largest_expense = largest.map(|t| LargestExpense {
        id: t.id.clone(),
        amount: t.amount,
        description: t.description.clone(),
        category_id: t.category_id.clone(),
        occurred_at: t.occurred_at.format(DATETIME_FORMAT).to_string(),
    });

    let mut most_frequent: Option<(&str, usize)> = None;
    for (category_id, group) in group_in_order(transactions, |t| t.category_id.as_str()) {
        let is_more = match most_frequent {
            Some((_, best)) => group.len() > best,
            None => true,
        };
        if is_more {
            most_frequent = Some((category_id, group.len()));
        }
    }

    FinancialSummary {
        total_income,
        total_expense,
        net_income: total_income.saturating_sub(total_expense),
        avg_daily_expense,
        largest_expense,
        most_frequent_category: most_frequent.map(|(category_id, count)| CategoryFrequency {
            category_id: category_id.to_string(),
            count,
        }),
    }
}

/// Per-category totals with a nested per-subcategory split.
///
/// Category percentages are shares of every amount in the slice, income and
/// expense together. Subcategory percentages are shares of their category.
pub(crate) fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBreakdown> {
    let grand_total = sum_amounts(transactions);

    let mut result: Vec<CategoryBreakdown> = group_in_order(transactions, |t| t.category_id.as_str())
        .into_iter()
        .map(|(category_id, group)| {
            let category_total = sum_amounts(group.iter().copied());

            let mut subcategories: Vec<SubcategoryBreakdown> =
                group_in_order(group.iter().copied(), |t| t.subcategory_id.as_str())
                    .into_iter()
                    .map(|(subcategory_id, sub_group)| {
                        let sub_total = sum_amounts(sub_group.iter().copied());
                        SubcategoryBreakdown {
                            subcategory_id: subcategory_id.to_string(),
                            total_amount: sub_total,
                            transaction_count: sub_group.len(),
                            percentage: percentage(sub_total, category_total),
                        }
                    })
                    .collect();
            subcategories.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

            CategoryBreakdown {
                category_id: category_id.to_string(),
                category_name: display_name(category_id),
                total_amount: category_total,
                transaction_count: group.len(),
                percentage: percentage(category_total, grand_total),
                subcategories,
            }
        })
        .collect();

    result.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    result
}

/// Amount and count per period bucket, ascending by bucket.
///
/// Income and expense amounts are summed together here; use
/// [`period_comparison`] for the split.
pub(crate) fn spending_trends(
    transactions: &[Transaction],
    query: &AnalyticsQuery,
) -> Vec<SpendingTrend> {
    let mut buckets: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for t in transactions {
        let entry = buckets
            .entry(period_key(t.occurred_at, query.period))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(t.amount);
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(period, (amount, transaction_count))| SpendingTrend {
            period,
            amount,
            transaction_count,
        })
        .collect()
}

/// Top tags by total amount. Tags are case-sensitive and a tag repeated on
/// one transaction counts once per occurrence.
pub(crate) fn tag_analytics(transactions: &[Transaction]) -> Vec<TagAnalytics> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, Decimal, usize)> = Vec::new();

    for t in transactions {
        for tag in &t.tags {
            let i = *index.entry(tag.as_str()).or_insert_with(|| {
                totals.push((tag.as_str(), Decimal::ZERO, 0));
                totals.len() - 1
            });
            totals[i].1 = totals[i].1.saturating_add(t.amount);
            totals[i].2 += 1;
        }
    }

    let mut result: Vec<TagAnalytics> = totals
        .into_iter()
        .map(|(tag, total_amount, transaction_count)| TagAnalytics {
            tag: tag.to_string(),
            total_amount,
            transaction_count,
            avg_amount: round2(total_amount / Decimal::from(transaction_count)),
        })
        .collect();

    result.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    result.truncate(TOP_TAGS_LIMIT);
    result
}

/// Income, expense and net per period bucket, ascending by bucket.
pub(crate) fn period_comparison(
    transactions: &[Transaction],
    query: &AnalyticsQuery,
) -> Vec<PeriodComparison> {
    #[derive(Default)]
    struct Bucket {
        income: Decimal,
        expense: Decimal,
        count: usize,
    }

    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    for t in transactions {
        let bucket = buckets
            .entry(period_key(t.occurred_at, query.period))
            .or_default();
        match t.kind {
            TransactionKind::Income => bucket.income = bucket.income.saturating_add(t.amount),
            TransactionKind::Expense => {
                bucket.expense = bucket.expense.saturating_add(t.amount)
            }
        }
        bucket.count += 1;
    }

    buckets
        .into_iter()
        .map(|(period, b)| PeriodComparison {
            period,
            income: b.income,
            expense: b.expense,
            net: b.income.saturating_sub(b.expense),
            transaction_count: b.count,
        })
        .collect()
}

/// Group by key, keeping groups (and members within each group) in the order
/// they were first seen.
fn group_in_order<'a, I, K, F>(items: I, key: F) -> Vec<(K, Vec<&'a Transaction>)>
where
    I: IntoIterator<Item = &'a Transaction>,
    K: Eq + Hash + Copy,
    F: Fn(&'a Transaction) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a Transaction>)> = Vec::new();

    for t in items {
        let k = key(t);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(t),
            None => {
                index.insert(k, groups.len());
                groups.push((k, vec![t]));
            }
        }
    }

    groups
}

/// Totals clamp at `Decimal::MAX` instead of overflowing.
fn sum_amounts<'a>(items: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    items
        .into_iter()
        .fold(Decimal::ZERO, |total, t| total.saturating_add(t.amount))
}

/// `part / whole * 100` to 2 dp, or 0 when `whole` is not positive.
fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| {
            part.checked_div(whole)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .map(round2)
        .unwrap_or(Decimal::ZERO)
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests;
