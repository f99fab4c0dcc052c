use rust_decimal::Decimal;

/// Input rules a transaction or user must satisfy before it is stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("amount must be greater than 0, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount must be at most {0}")]
    AmountTooLarge(Decimal),

    #[error("currency '{0}' is not supported")]
    UnknownCurrency(String),

    #[error("tag '{0}' must be non-empty, without surrounding spaces or ';'")]
    InvalidTag(String),

    #[error("description must be {0} characters or less")]
    DescriptionTooLong(usize),

    #[error("notes must be {0} characters or less")]
    NotesTooLong(usize),

    #[error("category '{0}' not found")]
    UnknownCategory(String),

    #[error("subcategory '{subcategory}' not found in category '{category}'")]
    UnknownSubcategory {
        category: String,
        subcategory: String,
    },

    #[error("name must be between {min} and {max} characters")]
    InvalidName { min: usize, max: usize },

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("page must be 1 or greater")]
    InvalidPage,

    #[error("limit must be between 1 and {0}")]
    InvalidLimit(u32),
}
