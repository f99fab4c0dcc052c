use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AnalyticsQuery, Transaction, TransactionKind, ValidationError};

pub(crate) const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortField {
    #[default]
    OccurredAt,
    Amount,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" | "occurred_at" | "transaction_date" => Some(Self::OccurredAt),
            "amount" => Some(Self::Amount),
            "created" | "created_at" => Some(Self::CreatedAt),
            "updated" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::OccurredAt => "t.occurred_at",
            Self::Amount => "CAST(t.amount AS REAL)",
            Self::CreatedAt => "t.created_at",
            Self::UpdatedAt => "t.updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Paged listing of one user's transactions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionListQuery {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) kind: Option<TransactionKind>,
    pub(crate) category_id: Option<String>,
    pub(crate) subcategory_id: Option<String>,
    pub(crate) sort_by: SortField,
    pub(crate) sort_order: SortOrder,
}

impl Default for TransactionListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            start_date: None,
            end_date: None,
            kind: None,
            category_id: None,
            subcategory_id: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl TransactionListQuery {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.page < 1 {
            return Err(ValidationError::InvalidPage);
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.limit) {
            return Err(ValidationError::InvalidLimit(MAX_PAGE_LIMIT));
        }
        Ok(())
    }

    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub(crate) fn order_by(&self) -> String {
        format!(
            " ORDER BY {} {}, t.rowid {}",
            self.sort_by.column(),
            self.sort_order.keyword(),
            self.sort_order.keyword()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TransactionPage {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) total: u64,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total_pages: u64,
}

impl TransactionPage {
    pub(crate) fn new(transactions: Vec<Transaction>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            transactions,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// A `WHERE` clause over `transactions t` with positional parameters.
///
/// Always scoped to one owner and to rows that are not soft-deleted.
pub(crate) struct Filter {
    pub(crate) sql: String,
    pub(crate) params: Vec<Box<dyn rusqlite::types::ToSql>>,
}

impl Filter {
    pub(crate) fn for_owner(owner_id: i64) -> Self {
        Self {
            sql: String::from(" WHERE t.owner_id = ?1 AND t.is_deleted = 0"),
            params: vec![Box::new(owner_id)],
        }
    }

    pub(crate) fn push<T: rusqlite::types::ToSql + 'static>(&mut self, condition: &str, value: T) {
        self.sql
            .push_str(&format!(" AND {condition} ?{}", self.params.len() + 1));
        self.params.push(Box::new(value));
    }

    /// Inclusive on both ends: the end date covers the whole day up to 23:59:59.
    pub(crate) fn date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let Some(start) = start {
            self.push(
                "t.occurred_at >=",
                format!("{}T00:00:00", start.format("%Y-%m-%d")),
            );
        }
        if let Some(end) = end {
            self.push(
                "t.occurred_at <=",
                format!("{}T23:59:59", end.format("%Y-%m-%d")),
            );
        }
    }

    pub(crate) fn from_analytics(owner_id: i64, query: &AnalyticsQuery) -> Self {
        let mut filter = Self::for_owner(owner_id);
        filter.date_range(query.start_date, query.end_date);
        if let Some(kind) = query.kind {
            filter.push("t.kind =", kind.as_str().to_string());
        }
        if let Some(ref category_id) = query.category_id {
            filter.push("t.category_id =", category_id.clone());
        }
        filter
    }

    pub(crate) fn from_list(owner_id: i64, query: &TransactionListQuery) -> Self {
        let mut filter = Self::for_owner(owner_id);
        filter.date_range(query.start_date, query.end_date);
        if let Some(kind) = query.kind {
            filter.push("t.kind =", kind.as_str().to_string());
        }
        if let Some(ref category_id) = query.category_id {
            filter.push("t.category_id =", category_id.clone());
        }
        if let Some(ref subcategory_id) = query.subcategory_id {
            filter.push("t.subcategory_id =", subcategory_id.clone());
        }
        filter
    }

    pub(crate) fn params_ref(&self) -> Vec<&dyn rusqlite::types::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
