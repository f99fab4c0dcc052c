pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id    TEXT PRIMARY KEY,
    name  TEXT NOT NULL,
    kind  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subcategories (
    id           TEXT NOT NULL,
    category_id  TEXT NOT NULL REFERENCES categories(id),
    name         TEXT NOT NULL,
    PRIMARY KEY (category_id, id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id              TEXT PRIMARY KEY,
    owner_id        INTEGER NOT NULL REFERENCES users(id),
    kind            TEXT NOT NULL,
    currency        TEXT NOT NULL DEFAULT 'TWD',
    amount          TEXT NOT NULL,
    occurred_at     TEXT NOT NULL,
    category_id     TEXT NOT NULL REFERENCES categories(id),
    subcategory_id  TEXT NOT NULL,
    description     TEXT,
    notes           TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    is_deleted      BOOLEAN NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_transactions_owner_date ON transactions(owner_id, occurred_at);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS transaction_tags (
    transaction_id  TEXT NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    tag             TEXT NOT NULL,
    PRIMARY KEY (transaction_id, position)
);

CREATE INDEX IF NOT EXISTS idx_transaction_tags_tag ON transaction_tags(tag);
"#;

pub(crate) const CURRENT_VERSION: i32 = 2;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[(
    1,
    "ALTER TABLE transactions ADD COLUMN currency TEXT NOT NULL DEFAULT 'TWD';",
)];
