use serde::Serialize;

use super::TransactionKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subcategory {
    pub id: String,
    pub category_id: String,
    pub name: String,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// (category id, kind, subcategory ids)
const BUILTIN: &[(&str, TransactionKind, &[&str])] = &[
    (
        "shopping",
        TransactionKind::Expense,
        &["clothing", "electronics", "home_goods"],
    ),
    (
        "food_dining",
        TransactionKind::Expense,
        &["breakfast", "lunch", "dinner", "snack", "drink"],
    ),
    (
        "transportation",
        TransactionKind::Expense,
        &["ticket", "bus", "train", "taxi", "parking"],
    ),
    (
        "entertainment",
        TransactionKind::Expense,
        &["movie", "concert", "sports", "game"],
    ),
    (
        "living",
        TransactionKind::Expense,
        &["rent", "mortgage", "telecom"],
    ),
    ("education", TransactionKind::Expense, &["tuition", "software"]),
    ("health", TransactionKind::Expense, &["medical", "insurance"]),
    (
        "investment",
        TransactionKind::Expense,
        &["stock", "mutual_fund", "crypto"],
    ),
    ("travel", TransactionKind::Expense, &["hotel", "flight"]),
    (
        "income",
        TransactionKind::Income,
        &["salary", "bonus", "interest", "other"],
    ),
    ("other", TransactionKind::Expense, &["other"]),
];

/// The fixed category/subcategory reference set transactions are recorded against.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
}

impl Taxonomy {
    pub fn builtin() -> Self {
        let mut categories = Vec::new();
        let mut subcategories = Vec::new();
        for &(id, kind, subs) in BUILTIN {
            categories.push(Category {
                id: id.to_string(),
                name: display_name(id),
                kind,
            });
            for &sub in subs {
                subcategories.push(Subcategory {
                    id: sub.to_string(),
                    category_id: id.to_string(),
                    name: display_name(sub),
                });
            }
        }
        Self {
            categories,
            subcategories,
        }
    }

    pub fn from_parts(categories: Vec<Category>, subcategories: Vec<Subcategory>) -> Self {
        Self {
            categories,
            subcategories,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn subcategories_of<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Subcategory> {
        self.subcategories
            .iter()
            .filter(move |s| s.category_id == category_id)
    }

    pub fn subcategory_belongs(&self, category_id: &str, subcategory_id: &str) -> bool {
        self.subcategories
            .iter()
            .any(|s| s.category_id == category_id && s.id == subcategory_id)
    }
}

/// Derive a human label from an identifier: `food_dining` → `Food Dining`.
pub fn display_name(id: &str) -> String {
    id.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
