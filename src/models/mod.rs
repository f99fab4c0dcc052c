mod analytics;
mod category;
mod error;
mod transaction;
mod user;

pub use analytics::{
    AnalyticsOverview, AnalyticsPeriod, AnalyticsQuery, CategoryBreakdown, CategoryFrequency,
    FinancialSummary, LargestExpense, PeriodComparison, SpendingTrend, SubcategoryBreakdown,
    TagAnalytics,
};
pub use category::{display_name, Category, Subcategory, Taxonomy};
pub use error::ValidationError;
pub use transaction::{
    parse_datetime, Currency, NewTransaction, Transaction, TransactionKind, TransactionUpdate,
    DATETIME_FORMAT, MAX_AMOUNT, TAG_SEPARATOR,
};
pub use user::User;
