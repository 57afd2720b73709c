use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
";

// Document keys
pub const LEDGER_KEY: &str = "finsense_financial_data";
pub const BILLS_KEY: &str = "finsense_bills";
pub const PROFILE_KEY: &str = "finsense_user_profile";
pub const TOKENS_KEY: &str = "finsense_tokens";
pub const LEGACY_EXPENSES_KEY: &str = "expenses";
pub const LEGACY_INCOMES_KEY: &str = "incomes";

// Id sequences
pub const ENTRY_SEQUENCE: &str = "ledger_entries";
pub const BILL_SEQUENCE: &str = "bills";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Run `f` as one write transaction.
///
/// Opens the transaction with `BEGIN IMMEDIATE` so concurrent writers queue on
/// the database lock instead of overwriting each other. The transaction rolls
/// back if `f` fails or panics. When the connection is already inside a
/// transaction, `f` joins it.
pub fn atomically<T>(conn: &Connection, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback() {
                log::error!("Rollback failed: {rollback}");
            }
            Err(e)
        }
    }
}

pub fn get_raw_document(conn: &Connection, key: &str) -> Result<Option<String>> {
    let raw = conn
        .query_row("SELECT value FROM documents WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(raw)
}

/// Read and decode a document. Malformed JSON is an error.
pub fn get_document<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    match get_raw_document(conn, key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Read a document for display. Any failure is logged and yields the default.
pub fn load_document_or_default<T: DeserializeOwned + Default>(conn: &Connection, key: &str) -> T {
    match get_document(conn, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read '{key}', using defaults: {e}");
            T::default()
        }
    }
}

pub fn put_document<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO documents (key, value, updated_at) VALUES (?1, ?2, datetime('now')) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, json],
    )?;
    Ok(())
}

pub fn remove_document(conn: &Connection, key: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM documents WHERE key = ?1", [key])?;
    Ok(changed > 0)
}

/// All documents as raw `(key, json)` pairs, ordered by key.
pub fn list_documents(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM documents ORDER BY key")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Next value of a monotonic id sequence, starting at 1.
pub fn next_id(conn: &Connection, sequence: &str) -> Result<u64> {
    conn.execute(
        "INSERT INTO sequences (name, value) VALUES (?1, 1) \
         ON CONFLICT(name) DO UPDATE SET value = value + 1",
        [sequence],
    )?;
    let value: i64 = conn.query_row(
        "SELECT value FROM sequences WHERE name = ?1",
        [sequence],
        |row| row.get(0),
    )?;
    Ok(value as u64)
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}
