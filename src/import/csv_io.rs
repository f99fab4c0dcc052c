use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::{
    parse_datetime, Currency, NewTransaction, Transaction, TransactionKind, TAG_SEPARATOR,
};

pub(crate) const CSV_HEADER: [&str; 9] = [
    "date",
    "type",
    "amount",
    "category",
    "subcategory",
    "description",
    "notes",
    "tags",
    "currency",
];

const REQUIRED_COLUMNS: [&str; 5] = ["date", "type", "amount", "category", "subcategory"];

/// Column positions resolved from the header row, so files may reorder or omit
/// the optional columns.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let map: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();
        for required in REQUIRED_COLUMNS {
            if !map.contains_key(required) {
                anyhow::bail!("CSV header is missing the '{required}' column");
            }
        }
        Ok(Self(map))
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.0
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn optional(&self, record: &csv::StringRecord, name: &str) -> Option<String> {
        let value = self.get(record, name);
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Read transactions from a fintrack CSV file.
///
/// Rows whose date is blank are skipped. Everything else must parse; the first
/// bad row aborts the import with its row number. A missing or blank
/// `currency` means TWD.
pub(crate) fn import_transactions(path: &Path) -> Result<Vec<NewTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let columns = Columns::from_header(rdr.headers().context("Failed to read CSV header")?)?;

    let mut transactions = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in rdr.records().enumerate() {
        // Header is line 1.
        let row = i + 2;
        let record = result.with_context(|| format!("Row {row}: failed to read CSV record"))?;

        let date_str = columns.get(&record, "date");
        if date_str.is_empty() {
            tracing::warn!(row, "skipping CSV row with blank date");
            skipped += 1;
            continue;
        }
        let occurred_at = parse_datetime(date_str)
            .with_context(|| format!("Row {row}: failed to parse date '{date_str}'"))?;

        let kind_str = columns.get(&record, "type");
        let kind = TransactionKind::parse(kind_str)
            .with_context(|| format!("Row {row}: unknown transaction type '{kind_str}'"))?;

        let amount = parse_decimal(columns.get(&record, "amount"))
            .with_context(|| format!("Row {row}: failed to parse amount"))?;

        let currency = match columns.get(&record, "currency") {
            "" => Currency::default(),
            code => code
                .parse::<Currency>()
                .with_context(|| format!("Row {row}: unsupported currency"))?,
        };

        transactions.push(NewTransaction {
            kind,
            currency,
            amount,
            occurred_at,
            category_id: columns.get(&record, "category").to_lowercase(),
            subcategory_id: columns.get(&record, "subcategory").to_lowercase(),
            description: columns.optional(&record, "description"),
            notes: columns.optional(&record, "notes"),
            tags: split_tags(columns.get(&record, "tags")),
        });
    }

    tracing::info!(
        path = %path.display(),
        rows = transactions.len(),
        skipped,
        "parsed CSV import"
    );
    Ok(transactions)
}

/// Write transactions in the layout `import_transactions` reads. Returns the row count.
pub(crate) fn export_transactions(path: &Path, transactions: &[Transaction]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(CSV_HEADER)?;

    for txn in transactions {
        let tags = txn.tags.join(&TAG_SEPARATOR.to_string());
        wtr.write_record([
            txn.occurred_at_str().as_str(),
            txn.kind.as_str(),
            txn.amount.to_string().as_str(),
            txn.category_id.as_str(),
            txn.subcategory_id.as_str(),
            txn.description.as_deref().unwrap_or(""),
            txn.notes.as_deref().unwrap_or(""),
            tags.as_str(),
            txn.currency.as_str(),
        ])?;
    }
    wtr.flush().context("Failed to flush CSV file")?;

    tracing::info!(path = %path.display(), rows = transactions.len(), "exported transactions");
    Ok(transactions.len())
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Amounts are unsigned; the `type` column carries the direction.
fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        anyhow::bail!("amount is empty");
    }
    Decimal::from_str(cleaned).with_context(|| format!("Failed to parse '{s}' as decimal"))
}

#[cfg(test)]
#[path = "csv_io_tests.rs"]
mod tests;
