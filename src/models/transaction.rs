use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Taxonomy, ValidationError};

/// Storage and display format for `occurred_at`. Zero-padded so that
/// lexical comparison in SQL matches chronological order.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 500;

/// Largest accepted amount, 1,000,000,000,000. Keeps every sum the
/// aggregator can form far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Separates tags in one CSV field, so it may not appear inside a tag.
pub const TAG_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn all() -> &'static [TransactionKind] {
        &[Self::Income, Self::Expense]
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currency a transaction was recorded in. Aggregation ignores it and sums
/// amounts as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Jpy,
    Krw,
    Cny,
    Eur,
    Gbp,
    Cad,
    Hkd,
    #[default]
    Twd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Jpy => "JPY",
            Self::Krw => "KRW",
            Self::Cny => "CNY",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Hkd => "HKD",
            Self::Twd => "TWD",
        }
    }

    pub fn all() -> &'static [Currency] {
        &[
            Self::Usd,
            Self::Jpy,
            Self::Krw,
            Self::Cny,
            Self::Eur,
            Self::Gbp,
            Self::Cad,
            Self::Hkd,
            Self::Twd,
        ]
    }
}

impl std::str::FromStr for Currency {
    type Err = ValidationError;

    /// Case-insensitive ISO code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| ValidationError::UnknownCurrency(s.trim().to_string()))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub owner_id: i64,
    pub kind: TransactionKind,
    pub currency: Currency,
    pub amount: Decimal,
    pub occurred_at: NaiveDateTime,
    pub category_id: String,
    pub subcategory_id: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: bool,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn occurred_at_str(&self) -> String {
        self.occurred_at.format(DATETIME_FORMAT).to_string()
    }

    /// Apply a partial update. Fields left as `None` keep their current value;
    /// an empty description or notes clears the field.
    pub fn apply(&mut self, update: TransactionUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(occurred_at) = update.occurred_at {
            self.occurred_at = occurred_at;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(subcategory_id) = update.subcategory_id {
            self.subcategory_id = subcategory_id;
        }
        if let Some(description) = update.description {
            self.description = non_empty(description);
        }
        if let Some(notes) = update.notes {
            self.notes = non_empty(notes);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn validate(&self, taxonomy: &Taxonomy) -> Result<(), ValidationError> {
        validate_fields(
            self.amount,
            &self.category_id,
            &self.subcategory_id,
            self.description.as_deref(),
            self.notes.as_deref(),
            &self.tags,
            taxonomy,
        )
    }
}

/// A transaction as entered by a user, before it has an id or owner timestamps.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub currency: Currency,
    pub amount: Decimal,
    pub occurred_at: NaiveDateTime,
    pub category_id: String,
    pub subcategory_id: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl NewTransaction {
    pub fn validate(&self, taxonomy: &Taxonomy) -> Result<(), ValidationError> {
        validate_fields(
            self.amount,
            &self.category_id,
            &self.subcategory_id,
            self.description.as_deref(),
            self.notes.as_deref(),
            &self.tags,
            taxonomy,
        )
    }

    pub fn into_transaction(self, id: String, owner_id: i64) -> Transaction {
        let now = chrono::Utc::now().to_rfc3339();
        Transaction {
            id,
            owner_id,
            kind: self.kind,
            currency: self.currency,
            amount: self.amount,
            occurred_at: self.occurred_at,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            description: self.description.and_then(non_empty),
            notes: self.notes.and_then(non_empty),
            tags: self.tags,
            created_at: now.clone(),
            updated_at: now,
            is_deleted: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub kind: Option<TransactionKind>,
    pub currency: Option<Currency>,
    pub amount: Option<Decimal>,
    pub occurred_at: Option<NaiveDateTime>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.currency.is_none()
            && self.amount.is_none()
            && self.occurred_at.is_none()
            && self.category_id.is_none()
            && self.subcategory_id.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }
}

fn validate_fields(
    amount: Decimal,
    category_id: &str,
    subcategory_id: &str,
    description: Option<&str>,
    notes: Option<&str>,
    tags: &[String],
    taxonomy: &Taxonomy,
) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(MAX_AMOUNT));
    }
    if let Some(d) = description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong(MAX_DESCRIPTION_LEN));
        }
    }
    if let Some(n) = notes {
        if n.chars().count() > MAX_NOTES_LEN {
            return Err(ValidationError::NotesTooLong(MAX_NOTES_LEN));
        }
    }
    if let Some(tag) = tags
        .iter()
        .find(|t| t.is_empty() || t.trim() != t.as_str() || t.contains(TAG_SEPARATOR))
    {
        return Err(ValidationError::InvalidTag(tag.clone()));
    }
    if taxonomy.category(category_id).is_none() {
        return Err(ValidationError::UnknownCategory(category_id.to_string()));
    }
    if !taxonomy.subcategory_belongs(category_id, subcategory_id) {
        return Err(ValidationError::UnknownSubcategory {
            category: category_id.to_string(),
            subcategory: subcategory_id.to_string(),
        });
    }
    Ok(())
}

fn non_empty(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

/// Parse a user-supplied date or date-time. A bare date is taken at midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
