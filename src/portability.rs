use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::db;
use crate::error::Result;
use crate::ledger;

/// Everything stored for the user, keyed by document name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataExport {
    pub exported_at: NaiveDateTime,
    pub documents: BTreeMap<String, Value>,
    /// SHA-256 over the serialized `documents`.
    pub checksum: String,
}

fn checksum(documents: &BTreeMap<String, Value>) -> Result<String> {
    let bytes = serde_json::to_vec(documents)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn export_user_data(conn: &Connection, now: NaiveDateTime) -> Result<UserDataExport> {
    let mut documents = BTreeMap::new();
    for (key, raw) in db::list_documents(conn)? {
        let value = serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Exporting '{key}' as raw text, it is not valid JSON: {e}");
            Value::String(raw)
        });
        documents.insert(key, value);
    }
    Ok(UserDataExport {
        exported_at: now,
        checksum: checksum(&documents)?,
        documents,
    })
}

pub fn verify_export(export: &UserDataExport) -> bool {
    checksum(&export.documents).is_ok_and(|c| c == export.checksum)
}

/// Remove every stored document and reset id sequences.
/// Returns the number of documents removed.
pub fn delete_user_data(conn: &Connection) -> Result<usize> {
    db::atomically(conn, |conn| {
        let removed = conn.execute("DELETE FROM documents", [])?;
        conn.execute("DELETE FROM sequences", [])?;
        log::info!("Deleted {removed} stored documents");
        Ok(removed)
    })
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: u64,
    date: String,
    kind: &'static str,
    amount: f64,
    tag: &'static str,
    emotion: &'static str,
    description: &'a str,
}

/// Write all ledger entries as CSV, oldest first. Expenses are negative.
pub fn export_ledger_csv<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let state = ledger::get_financial_data(conn);
    let mut rows: Vec<CsvRow> = state
        .income_entries
        .iter()
        .map(|e| CsvRow {
            id: e.id,
            date: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            kind: "income",
            amount: e.amount,
            tag: e.source.as_str(),
            emotion: e.emotion.as_str(),
            description: &e.description,
        })
        .chain(state.expense_entries.iter().map(|e| CsvRow {
            id: e.id,
            date: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            kind: "expense",
            amount: -e.amount,
            tag: e.category.as_str(),
            emotion: e.emotion.as_str(),
            description: &e.description,
        }))
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut wtr = csv::Writer::from_writer(writer);
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::ledger::{add_expense, add_income, NewExpense, NewIncome};
    use crate::models::{Category, Emotion, IncomeSource};
    use chrono::NaiveDate;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn seed(conn: &Connection) {
        add_expense(
            conn,
            NewExpense {
                amount: 60.0,
                category: Category::Transport,
                description: "Auto, station".to_string(),
                emotion: Emotion::Neutral,
                timestamp: Some(at(3)),
                bill_id: None,
            },
            at(3),
        )
        .unwrap();
        add_income(
            conn,
            NewIncome {
                amount: 900.0,
                source: IncomeSource::Gift,
                description: String::new(),
                emotion: Emotion::Happy,
                timestamp: Some(at(1)),
            },
            at(3),
        )
        .unwrap();
    }

    #[test]
    fn test_export_includes_documents_and_verifies() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let export = export_user_data(&conn, at(4)).unwrap();
        assert!(export.documents.contains_key(db::LEDGER_KEY));
        assert!(verify_export(&export));

        let mut tampered = export.clone();
        tampered.documents.insert("extra".to_string(), Value::Bool(true));
        assert!(!verify_export(&tampered));
    }

    #[test]
    fn test_export_keeps_malformed_documents_as_text() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO documents (key, value) VALUES ('odd', 'not json')", []).unwrap();
        let export = export_user_data(&conn, at(4)).unwrap();
        assert_eq!(export.documents["odd"], Value::String("not json".to_string()));
    }

    #[test]
    fn test_delete_user_data_clears_everything() {
        let (_dir, conn) = test_db();
        seed(&conn);
        assert_eq!(delete_user_data(&conn).unwrap(), 1);
        assert!(db::list_documents(&conn).unwrap().is_empty());
        assert_eq!(db::next_id(&conn, db::ENTRY_SEQUENCE).unwrap(), 1);
    }

    #[test]
    fn test_export_ledger_csv() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let mut buf = Vec::new();
        let count = export_ledger_csv(&conn, &mut buf).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,date,kind,amount,tag,emotion,description");
        assert!(lines[1].contains(",income,900.0,gift,happy,"));
        assert!(lines[2].contains(",expense,-60.0,transport,neutral,\"Auto, station\""));
    }
}
