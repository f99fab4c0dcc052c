mod query;
mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

pub(crate) use query::{SortField, SortOrder, TransactionListQuery, TransactionPage};
use query::Filter;

const TRANSACTION_COLUMNS: &str = "t.id, t.owner_id, t.kind, t.amount, t.occurred_at,
    t.category_id, t.subcategory_id, t.description, t.notes,
    t.created_at, t.updated_at, t.is_deleted, t.currency";

pub(crate) struct Database {
    conn: Connection,
    taxonomy: Taxonomy,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        let mut db = Self {
            conn,
            taxonomy: Taxonomy::from_parts(Vec::new(), Vec::new()),
        };
        db.migrate().context("Database migration failed")?;
        db.seed_taxonomy()?;
        db.taxonomy = db.load_taxonomy()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_taxonomy(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let builtin = Taxonomy::builtin();
        let tx = self.conn.transaction()?;
        for cat in builtin.categories() {
            tx.execute(
                "INSERT OR IGNORE INTO categories (id, name, kind) VALUES (?1, ?2, ?3)",
                params![cat.id, cat.name, cat.kind.as_str()],
            )?;
        }
        for sub in builtin.subcategories() {
            tx.execute(
                "INSERT OR IGNORE INTO subcategories (id, category_id, name) VALUES (?1, ?2, ?3)",
                params![sub.id, sub.category_id, sub.name],
            )?;
        }
        tx.commit()?;
        tracing::debug!(
            categories = builtin.categories().len(),
            subcategories = builtin.subcategories().len(),
            "seeded taxonomy"
        );
        Ok(())
    }

    fn load_taxonomy(&self) -> Result<Taxonomy> {
        let categories = self.get_categories()?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, category_id, name FROM subcategories ORDER BY category_id, rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(Subcategory {
                id: row.get(0)?,
                category_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        let subcategories = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Taxonomy::from_parts(categories, subcategories))
    }

    pub(crate) fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, user: &User) -> Result<i64> {
        if self.get_user_by_email(&user.email)?.is_some() {
            return Err(ValidationError::DuplicateEmail(user.email.clone()).into());
        }
        self.conn.execute(
            "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
            params![user.name, user.email, user.created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(user_id = id, email = %user.email, "registered user");
        Ok(id)
    }

    pub(crate) fn get_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, created_at FROM users ORDER BY id")?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, email, created_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?)
    }

    pub(crate) fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, email, created_at FROM users WHERE email = ?1",
                params![email.trim().to_lowercase()],
                row_to_user,
            )
            .optional()?)
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(
        &mut self,
        owner_id: i64,
        new: NewTransaction,
    ) -> Result<Transaction> {
        new.validate(&self.taxonomy)?;
        let txn = new.into_transaction(new_transaction_id(), owner_id);

        let tx = self.conn.transaction()?;
        write_transaction(&tx, &txn)?;
        tx.commit()?;

        tracing::info!(id = %txn.id, owner_id, kind = %txn.kind, amount = %txn.amount, "created transaction");
        Ok(txn)
    }

    /// Insert all or nothing. Every row is validated before anything is written.
    pub(crate) fn insert_transactions_batch(
        &mut self,
        owner_id: i64,
        batch: Vec<NewTransaction>,
    ) -> Result<usize> {
        for (i, new) in batch.iter().enumerate() {
            new.validate(&self.taxonomy)
                .with_context(|| format!("Transaction {} is invalid", i + 1))?;
        }

        let tx = self.conn.transaction()?;
        let mut count = 0;
        for new in batch {
            let txn = new.into_transaction(new_transaction_id(), owner_id);
            write_transaction(&tx, &txn)?;
            count += 1;
        }
        tx.commit()?;

        tracing::info!(owner_id, count, "inserted transaction batch");
        Ok(count)
    }

    pub(crate) fn get_transaction(&self, owner_id: i64, id: &str) -> Result<Option<Transaction>> {
        let mut filter = Filter::for_owner(owner_id);
        filter.push("t.id =", id.to_string());
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions t{}", filter.sql);
        let mut found = self.query_transactions(&sql, &filter)?;
        Ok(found.pop())
    }

    /// Returns the updated transaction, or `None` if it does not exist for this owner.
    pub(crate) fn update_transaction(
        &mut self,
        owner_id: i64,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        let Some(mut txn) = self.get_transaction(owner_id, id)? else {
            return Ok(None);
        };
        txn.apply(update);
        txn.validate(&self.taxonomy)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE transactions SET kind = ?1, amount = ?2, occurred_at = ?3, category_id = ?4,
                    subcategory_id = ?5, description = ?6, notes = ?7, updated_at = ?8,
                    currency = ?9
             WHERE id = ?10 AND owner_id = ?11",
            params![
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.occurred_at_str(),
                txn.category_id,
                txn.subcategory_id,
                txn.description,
                txn.notes,
                txn.updated_at,
                txn.currency.as_str(),
                txn.id,
                owner_id,
            ],
        )?;
        tx.execute(
            "DELETE FROM transaction_tags WHERE transaction_id = ?1",
            params![txn.id],
        )?;
        write_tags(&tx, &txn.id, &txn.tags)?;
        tx.commit()?;

        tracing::info!(id = %txn.id, owner_id, "updated transaction");
        Ok(Some(txn))
    }

    /// Flag a transaction as deleted. Returns whether a live row was found.
    pub(crate) fn soft_delete_transaction(&self, owner_id: i64, id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE transactions SET is_deleted = 1, updated_at = ?1
             WHERE id = ?2 AND owner_id = ?3 AND is_deleted = 0",
            params![chrono::Utc::now().to_rfc3339(), id, owner_id],
        )?;
        if changed > 0 {
            tracing::info!(id, owner_id, "deleted transaction");
        }
        Ok(changed > 0)
    }

    pub(crate) fn list_transactions(
        &self,
        owner_id: i64,
        query: &TransactionListQuery,
    ) -> Result<TransactionPage> {
        query.validate()?;
        let filter = Filter::from_list(owner_id, query);

        let count_sql = format!("SELECT COUNT(*) FROM transactions t{}", filter.sql);
        let total: i64 = self
            .conn
            .query_row(&count_sql, filter.params_ref().as_slice(), |row| row.get(0))?;

        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t{}{} LIMIT {} OFFSET {}",
            filter.sql,
            query.order_by(),
            query.limit,
            query.offset()
        );
        let transactions = self.query_transactions(&sql, &filter)?;
        tracing::debug!(owner_id, total, page = query.page, "listed transactions");

        Ok(TransactionPage::new(
            transactions,
            u64::try_from(total).unwrap_or(0),
            query.page,
            query.limit,
        ))
    }

    /// The rows an analytics query covers, oldest first.
    ///
    /// Ties on `occurred_at` keep insertion order so that first-wins choices
    /// in the aggregator are reproducible.
    pub(crate) fn get_filtered_transactions(
        &self,
        owner_id: i64,
        query: &AnalyticsQuery,
    ) -> Result<Vec<Transaction>> {
        let filter = Filter::from_analytics(owner_id, query);
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t{} ORDER BY t.occurred_at ASC, t.rowid ASC",
            filter.sql
        );
        let transactions = self.query_transactions(&sql, &filter)?;
        tracing::debug!(
            owner_id,
            rows = transactions.len(),
            period = %query.period,
            "loaded transactions for analytics"
        );
        Ok(transactions)
    }

    pub(crate) fn transaction_count(&self, owner_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner_id = ?1 AND is_deleted = 0",
            params![owner_id],
            |row| row.get(0),
        )?)
    }

    fn query_transactions(&self, sql: &str, filter: &Filter) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(filter.params_ref().as_slice(), row_to_transaction)?;
        let mut transactions = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let mut tag_stmt = self.conn.prepare_cached(
            "SELECT tag FROM transaction_tags WHERE transaction_id = ?1 ORDER BY position",
        )?;
        for txn in &mut transactions {
            let tags = tag_stmt.query_map(params![txn.id], |row| row.get::<_, String>(0))?;
            txn.tags = tags.collect::<std::result::Result<Vec<_>, _>>()?;
        }
        Ok(transactions)
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, kind FROM categories ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(2)?;
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: parse_kind(2, &kind)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_subcategories(&self, category_id: &str) -> Result<Vec<Subcategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category_id, name FROM subcategories WHERE category_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![category_id], |row| {
            Ok(Subcategory {
                id: row.get(0)?,
                category_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn new_transaction_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn write_transaction(conn: &Connection, txn: &Transaction) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, owner_id, kind, amount, occurred_at, category_id,
                                   subcategory_id, description, notes, created_at, updated_at,
                                   is_deleted, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            txn.id,
            txn.owner_id,
            txn.kind.as_str(),
            txn.amount.to_string(),
            txn.occurred_at_str(),
            txn.category_id,
            txn.subcategory_id,
            txn.description,
            txn.notes,
            txn.created_at,
            txn.updated_at,
            txn.is_deleted,
            txn.currency.as_str(),
        ],
    )?;
    write_tags(conn, &txn.id, &txn.tags)
}

fn write_tags(conn: &Connection, transaction_id: &str, tags: &[String]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transaction_tags (transaction_id, position, tag) VALUES (?1, ?2, ?3)",
    )?;
    for (position, tag) in tags.iter().enumerate() {
        stmt.execute(params![transaction_id, position as i64, tag])?;
    }
    Ok(())
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(2)?;
    let amount: String = row.get(3)?;
    let occurred_at: String = row.get(4)?;
    let currency: String = row.get(12)?;
    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: parse_kind(2, &kind)?,
        currency: currency
            .parse()
            .map_err(|e: ValidationError| conversion_error(12, e.to_string()))?,
        amount: Decimal::from_str(&amount).map_err(|e| conversion_error(3, e.to_string()))?,
        occurred_at: parse_datetime(&occurred_at)
            .ok_or_else(|| conversion_error(4, format!("invalid date-time '{occurred_at}'")))?,
        category_id: row.get(5)?,
        subcategory_id: row.get(6)?,
        description: row.get(7)?,
        notes: row.get(8)?,
        tags: Vec::new(),
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        is_deleted: row.get(11)?,
    })
}

fn parse_kind(column: usize, s: &str) -> rusqlite::Result<TransactionKind> {
    TransactionKind::parse(s)
        .ok_or_else(|| conversion_error(column, format!("unknown transaction kind '{s}'")))
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}
