//! Facades that turn loosely-shaped user input into ledger entries, plus the
//! legacy list views older data was stored in.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{self, LEGACY_EXPENSES_KEY, LEGACY_INCOMES_KEY};
use crate::error::{FinsenseError, Result};
use crate::events::{AppEvent, EventBus};
use crate::ledger::{self, NewExpense, NewIncome};
use crate::models::{
    Category, Emotion, ExpenseEntry, IncomeEntry, IncomeSource, RewardReason, TransactionKind,
};
use crate::tokens::{self, Credit};

/// Newest legacy list format this build can import.
const LEGACY_VERSION: u64 = 1;

// ---------------------------------------------------------------------------
// Input normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub amount: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub emotion: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeInput {
    pub amount: String,
    pub source: Option<String>,
    pub description: Option<String>,
    pub emotion: Option<String>,
    pub date: Option<String>,
}

/// Parse a user-typed amount, tolerating currency symbols and separators.
/// Only strictly positive amounts are accepted.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$' | ' ' | '"'))
        .collect();
    if cleaned.is_empty() {
        return Err(FinsenseError::MissingField("amount"));
    }
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| FinsenseError::InvalidAmount(format!("'{}' is not a number", raw.trim())))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FinsenseError::InvalidAmount(format!(
            "amount must be greater than zero, got {}",
            raw.trim()
        )));
    }
    Ok(amount)
}

/// Accepts `YYYY-MM-DD` (noon that day) or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_when(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .ok_or_else(|| FinsenseError::InvalidDate(raw.to_string()))
}

fn parse_tag<T: std::str::FromStr<Err = FinsenseError> + Default>(raw: Option<&str>) -> Result<T> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(T::default()),
    }
}

fn clean_description(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

pub fn normalize_expense(input: &ExpenseInput) -> Result<NewExpense> {
    Ok(NewExpense {
        amount: parse_amount(&input.amount)?,
        category: parse_tag::<Category>(input.category.as_deref())?,
        description: clean_description(input.description.as_deref()),
        emotion: parse_tag::<Emotion>(input.emotion.as_deref())?,
        timestamp: input.date.as_deref().map(parse_when).transpose()?,
        bill_id: None,
    })
}

pub fn normalize_income(input: &IncomeInput) -> Result<NewIncome> {
    Ok(NewIncome {
        amount: parse_amount(&input.amount)?,
        source: parse_tag::<IncomeSource>(input.source.as_deref())?,
        description: clean_description(input.description.as_deref()),
        emotion: parse_tag::<Emotion>(input.emotion.as_deref())?,
        timestamp: input.date.as_deref().map(parse_when).transpose()?,
    })
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Recorded<T> {
    pub entry: T,
    pub credit: Credit,
}

pub fn record_expense(
    conn: &Connection,
    input: &ExpenseInput,
    now: NaiveDateTime,
    bus: &EventBus,
) -> Result<Recorded<ExpenseEntry>> {
    let new = normalize_expense(input)?;
    let recorded = db::atomically(conn, |conn| {
        let entry = ledger::add_expense(conn, new, now)?;
        let credit = tokens::credit(conn, RewardReason::ExpenseLogged, now)?;
        Ok(Recorded { entry, credit })
    })?;
    bus.emit(&AppEvent::TransactionUpdated {
        kind: TransactionKind::Expense,
        id: recorded.entry.id,
    });
    tokens::notify(bus, &recorded.credit);
    Ok(recorded)
}

pub fn record_income(
    conn: &Connection,
    input: &IncomeInput,
    now: NaiveDateTime,
    bus: &EventBus,
) -> Result<Recorded<IncomeEntry>> {
    let new = normalize_income(input)?;
    let recorded = db::atomically(conn, |conn| {
        let entry = ledger::add_income(conn, new, now)?;
        let credit = tokens::credit(conn, RewardReason::IncomeLogged, now)?;
        Ok(Recorded { entry, credit })
    })?;
    bus.emit(&AppEvent::TransactionUpdated {
        kind: TransactionKind::Income,
        id: recorded.entry.id,
    });
    tokens::notify(bus, &recorded.credit);
    Ok(recorded)
}

pub fn delete_transaction(
    conn: &Connection,
    kind: TransactionKind,
    id: u64,
    now: NaiveDateTime,
    bus: &EventBus,
) -> Result<()> {
    match kind {
        TransactionKind::Expense => ledger::delete_expense(conn, id, now).map(|_| ())?,
        TransactionKind::Income => ledger::delete_income(conn, id, now).map(|_| ())?,
    }
    bus.emit(&AppEvent::TransactionUpdated { kind, id });
    Ok(())
}

// ---------------------------------------------------------------------------
// Legacy views
// ---------------------------------------------------------------------------

/// An expense in the flat shape older components read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyExpense {
    pub id: u64,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub emotion: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyIncome {
    pub id: u64,
    pub amount: f64,
    pub source: String,
    pub description: String,
    pub emotion: String,
    pub date: String,
}

pub fn legacy_expenses(conn: &Connection) -> Vec<LegacyExpense> {
    ledger::get_financial_data(conn)
        .expense_entries
        .into_iter()
        .map(|e| LegacyExpense {
            id: e.id,
            amount: e.amount,
            category: e.category.to_string(),
            description: e.description,
            emotion: e.emotion.to_string(),
            date: e.timestamp.format("%Y-%m-%d").to_string(),
        })
        .collect()
}

pub fn legacy_incomes(conn: &Connection) -> Vec<LegacyIncome> {
    ledger::get_financial_data(conn)
        .income_entries
        .into_iter()
        .map(|e| LegacyIncome {
            id: e.id,
            amount: e.amount,
            source: e.source.to_string(),
            description: e.description,
            emotion: e.emotion.to_string(),
            date: e.timestamp.format("%Y-%m-%d").to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Legacy migration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub expenses: usize,
    pub incomes: usize,
    pub skipped: usize,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.expenses == 0 && self.incomes == 0 && self.skipped == 0
    }
}

/// Items of a legacy list document: either a bare array or
/// `{"version": 1, "items": [...]}`. `None` means the version is unsupported.
fn legacy_items(doc: Value) -> Option<Vec<Value>> {
    match doc {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(LEGACY_VERSION);
            if version > LEGACY_VERSION {
                return None;
            }
            match map.remove("items") {
                Some(Value::Array(items)) => Some(items),
                _ => Some(Vec::new()),
            }
        }
        _ => Some(Vec::new()),
    }
}

fn field_str<'a>(item: &'a Value, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|n| item.get(*n).and_then(Value::as_str))
}

fn legacy_amount(item: &Value) -> Option<f64> {
    let amount = match item.get("amount")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount(s).ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn legacy_when(item: &Value, now: NaiveDateTime) -> NaiveDateTime {
    field_str(item, &["date", "timestamp"])
        .and_then(|raw| {
            parse_when(raw)
                .ok()
                .or_else(|| parse_when(raw.get(..10)?).ok())
        })
        .unwrap_or(now)
}

/// Legacy documents that are not JSON at all are left alone so the rest of
/// the app keeps working.
fn read_legacy(conn: &Connection, key: &str) -> Option<Value> {
    match db::get_document::<Value>(conn, key) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Skipping unreadable legacy list '{key}': {e}");
            None
        }
    }
}

fn lenient_tag<T: std::str::FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Fold any leftover legacy `expenses`/`incomes` lists into the ledger and
/// drop them. Runs in one transaction; a no-op once the keys are gone.
pub fn migrate_legacy_lists(conn: &Connection, now: NaiveDateTime) -> Result<MigrationReport> {
    let report = db::atomically(conn, |conn| {
        let mut report = MigrationReport::default();

        if let Some(doc) = read_legacy(conn, LEGACY_EXPENSES_KEY) {
            match legacy_items(doc) {
                Some(items) => {
                    // Oldest first so the ledger ends up newest first.
                    for item in items.iter().rev() {
                        let Some(amount) = legacy_amount(item) else {
                            report.skipped += 1;
                            continue;
                        };
                        ledger::add_expense(
                            conn,
                            NewExpense {
                                amount,
                                category: lenient_tag(field_str(item, &["category"])),
                                description: field_str(item, &["description", "note"])
                                    .unwrap_or_default()
                                    .to_string(),
                                emotion: lenient_tag(field_str(item, &["emotion"])),
                                timestamp: Some(legacy_when(item, now)),
                                bill_id: None,
                            },
                            now,
                        )?;
                        report.expenses += 1;
                    }
                    db::remove_document(conn, LEGACY_EXPENSES_KEY)?;
                }
                None => log::warn!("Legacy expense list has an unsupported version; leaving it in place"),
            }
        }

        if let Some(doc) = read_legacy(conn, LEGACY_INCOMES_KEY) {
            match legacy_items(doc) {
                Some(items) => {
                    for item in items.iter().rev() {
                        let Some(amount) = legacy_amount(item) else {
                            report.skipped += 1;
                            continue;
                        };
                        ledger::add_income(
                            conn,
                            NewIncome {
                                amount,
                                source: lenient_tag(field_str(item, &["source", "category"])),
                                description: field_str(item, &["description", "note"])
                                    .unwrap_or_default()
                                    .to_string(),
                                emotion: lenient_tag(field_str(item, &["emotion"])),
                                timestamp: Some(legacy_when(item, now)),
                            },
                            now,
                        )?;
                        report.incomes += 1;
                    }
                    db::remove_document(conn, LEGACY_INCOMES_KEY)?;
                }
                None => log::warn!("Legacy income list has an unsupported version; leaving it in place"),
            }
        }

        Ok(report)
    })?;

    if !report.is_empty() {
        log::info!(
            "Migrated legacy lists: {} expenses, {} incomes, {} skipped",
            report.expenses,
            report.incomes,
            report.skipped
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::events::recording_bus;
    use crate::ledger::get_financial_data;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 30, 0).unwrap()
    }

    fn expense_input(amount: &str) -> ExpenseInput {
        ExpenseInput {
            amount: amount.to_string(),
            category: Some("Food".to_string()),
            description: Some("  Dosa  ".to_string()),
            emotion: Some("happy".to_string()),
            date: None,
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount(" ₹ 300 ").unwrap(), 300.0);
        assert_eq!(parse_amount("$42").unwrap(), 42.0);
        assert!(matches!(parse_amount(""), Err(FinsenseError::MissingField("amount"))));
        assert!(matches!(parse_amount("0"), Err(FinsenseError::InvalidAmount(_))));
        assert!(matches!(parse_amount("-5"), Err(FinsenseError::InvalidAmount(_))));
        assert!(matches!(parse_amount("abc"), Err(FinsenseError::InvalidAmount(_))));
        assert!(matches!(parse_amount("inf"), Err(FinsenseError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_when() {
        assert_eq!(
            parse_when("2025-02-03").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_when("2025-02-03T07:15:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap().and_hms_opt(7, 15, 0).unwrap()
        );
        assert!(matches!(parse_when("03/02/2025"), Err(FinsenseError::InvalidDate(_))));
    }

    #[test]
    fn test_normalize_expense_defaults() {
        let new = normalize_expense(&ExpenseInput {
            amount: "99".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(new.category, Category::Other);
        assert_eq!(new.emotion, Emotion::Neutral);
        assert!(new.description.is_empty());
        assert!(new.timestamp.is_none());
    }

    #[test]
    fn test_normalize_rejects_unknown_tags() {
        let mut input = expense_input("10");
        input.emotion = Some("furious".to_string());
        assert!(matches!(normalize_expense(&input), Err(FinsenseError::UnknownEmotion(_))));

        let income = IncomeInput {
            amount: "10".to_string(),
            source: Some("lottery".to_string()),
            ..Default::default()
        };
        assert!(matches!(normalize_income(&income), Err(FinsenseError::UnknownSource(_))));
    }

    #[test]
    fn test_record_expense_updates_ledger_and_notifies() {
        let (_dir, conn) = test_db();
        let (bus, seen) = recording_bus();
        let recorded = record_expense(&conn, &expense_input("250"), now(), &bus).unwrap();
        assert_eq!(recorded.entry.description, "Dosa");
        assert_eq!(recorded.entry.category, Category::Food);
        assert_eq!(recorded.credit.balance, 5);

        let state = get_financial_data(&conn);
        assert_eq!(state.expense_entries.len(), 1);

        let names: Vec<&str> = seen.borrow().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["transaction-updated", "fincoins-notification"]);
    }

    #[test]
    fn test_record_rejects_non_positive_without_side_effects() {
        let (_dir, conn) = test_db();
        let (bus, seen) = recording_bus();
        assert!(record_expense(&conn, &expense_input("0"), now(), &bus).is_err());
        assert!(get_financial_data(&conn).expense_entries.is_empty());
        assert_eq!(tokens::get_wallet(&conn).balance, 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_record_income_and_legacy_view() {
        let (_dir, conn) = test_db();
        let (bus, _seen) = recording_bus();
        let input = IncomeInput {
            amount: "45000".to_string(),
            source: Some("salary".to_string()),
            description: Some("June salary".to_string()),
            emotion: Some("confident".to_string()),
            date: Some("2025-06-01".to_string()),
        };
        let recorded = record_income(&conn, &input, now(), &bus).unwrap();

        let legacy = legacy_incomes(&conn);
        assert_eq!(
            legacy,
            vec![LegacyIncome {
                id: recorded.entry.id,
                amount: 45000.0,
                source: "salary".to_string(),
                description: "June salary".to_string(),
                emotion: "confident".to_string(),
                date: "2025-06-01".to_string(),
            }]
        );
        assert!(legacy_expenses(&conn).is_empty());
    }

    #[test]
    fn test_delete_transaction() {
        let (_dir, conn) = test_db();
        let (bus, seen) = recording_bus();
        let recorded = record_expense(&conn, &expense_input("20"), now(), &bus).unwrap();
        seen.borrow_mut().clear();
        delete_transaction(&conn, TransactionKind::Expense, recorded.entry.id, now(), &bus).unwrap();
        assert!(get_financial_data(&conn).expense_entries.is_empty());
        assert_eq!(seen.borrow().len(), 1);
        assert!(matches!(
            delete_transaction(&conn, TransactionKind::Income, 77, now(), &bus),
            Err(FinsenseError::EntryNotFound(77))
        ));
    }

    #[test]
    fn test_migrate_legacy_lists() {
        let (_dir, conn) = test_db();
        db::put_document(
            &conn,
            LEGACY_EXPENSES_KEY,
            &json!([
                {"id": 1717000000002u64, "amount": "120", "category": "Food", "emotion": "sad", "date": "2025-05-02"},
                {"id": 1717000000001u64, "amount": 80.5, "category": "mystery", "date": "2025-05-01T09:00:00.000Z"},
                {"id": 1717000000000u64, "amount": 0}
            ]),
        )
        .unwrap();
        db::put_document(
            &conn,
            LEGACY_INCOMES_KEY,
            &json!({"version": 1, "items": [{"amount": 5000, "source": "freelance"}]}),
        )
        .unwrap();

        let report = migrate_legacy_lists(&conn, now()).unwrap();
        assert_eq!(report, MigrationReport { expenses: 2, incomes: 1, skipped: 1 });

        let state = get_financial_data(&conn);
        assert_eq!(state.expense_entries[0].amount, 120.0);
        assert_eq!(state.expense_entries[0].emotion, Emotion::Sad);
        assert_eq!(state.expense_entries[1].category, Category::Other);
        assert_eq!(
            state.expense_entries[1].timestamp,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
        assert_eq!(state.income_entries[0].source, IncomeSource::Freelance);
        assert_eq!(state.total_assets, 5000.0 - 200.5);

        assert!(db::get_raw_document(&conn, LEGACY_EXPENSES_KEY).unwrap().is_none());
        assert!(migrate_legacy_lists(&conn, now()).unwrap().is_empty());
    }

    #[test]
    fn test_migrate_leaves_unsupported_versions() {
        let (_dir, conn) = test_db();
        db::put_document(&conn, LEGACY_INCOMES_KEY, &json!({"version": 2, "items": []})).unwrap();
        let report = migrate_legacy_lists(&conn, now()).unwrap();
        assert!(report.is_empty());
        assert!(db::get_raw_document(&conn, LEGACY_INCOMES_KEY).unwrap().is_some());
    }
}
