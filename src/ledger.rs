use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDateTime};
use rusqlite::Connection;

use crate::db::{self, ENTRY_SEQUENCE, LEDGER_KEY};
use crate::error::{FinsenseError, Result};
use crate::models::{Category, Emotion, ExpenseEntry, IncomeEntry, IncomeSource, LedgerState};
use crate::profile;

// ---------------------------------------------------------------------------
// Ledger state
// ---------------------------------------------------------------------------

impl LedgerState {
    pub fn with_baseline(savings: f64, debt: f64, now: NaiveDateTime) -> Self {
        let mut state = LedgerState {
            opening_assets: savings,
            total_liabilities: debt,
            last_updated: Some(now),
            ..Default::default()
        };
        state.recompute();
        state
    }

    pub fn total_income(&self) -> f64 {
        self.income_entries.iter().map(|e| e.amount).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expense_entries.iter().map(|e| e.amount).sum()
    }

    /// Assets never go below zero: spending past the balance has no further
    /// effect on the total.
    pub fn recompute(&mut self) {
        let raw = self.opening_assets + self.total_income() - self.total_expenses();
        self.total_assets = raw.max(0.0);
    }

    pub fn net_worth(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub amount: f64,
    pub source: IncomeSource,
    pub description: String,
    pub emotion: Emotion,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub emotion: Emotion,
    pub timestamp: Option<NaiveDateTime>,
    pub bill_id: Option<u64>,
}

fn coerce_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        log::warn!("Ignoring unusable amount {amount}; recording 0");
        0.0
    }
}

fn baseline(conn: &Connection, now: NaiveDateTime) -> LedgerState {
    match get_onboarding_values(conn) {
        Some(v) => LedgerState::with_baseline(v.savings, v.debt, now),
        None => LedgerState::default(),
    }
}

/// Current ledger snapshot. Never fails.
///
/// A missing ledger is derived from onboarding values; an unreadable one is
/// logged and replaced with an empty ledger.
pub fn get_financial_data(conn: &Connection) -> LedgerState {
    match db::get_document::<LedgerState>(conn, LEDGER_KEY) {
        Ok(Some(state)) => state,
        Ok(None) => baseline(conn, chrono::Local::now().naive_local()),
        Err(e) => {
            log::warn!("Could not read ledger, using an empty one: {e}");
            LedgerState::default()
        }
    }
}

/// Ledger for a read-modify-write. Unlike `get_financial_data`, a corrupt
/// document is an error so it is not silently overwritten.
fn load_for_update(conn: &Connection, now: NaiveDateTime) -> Result<LedgerState> {
    match db::get_document::<LedgerState>(conn, LEDGER_KEY)? {
        Some(state) => Ok(state),
        None => Ok(baseline(conn, now)),
    }
}

fn save(conn: &Connection, state: &mut LedgerState, now: NaiveDateTime) -> Result<()> {
    state.recompute();
    state.last_updated = Some(now);
    db::put_document(conn, LEDGER_KEY, state)
}

pub fn add_income(conn: &Connection, income: NewIncome, now: NaiveDateTime) -> Result<IncomeEntry> {
    db::atomically(conn, |conn| {
        let mut state = load_for_update(conn, now)?;
        let entry = IncomeEntry {
            id: db::next_id(conn, ENTRY_SEQUENCE)?,
            amount: coerce_amount(income.amount),
            source: income.source,
            description: income.description,
            emotion: income.emotion,
            timestamp: income.timestamp.unwrap_or(now),
        };
        state.income_entries.insert(0, entry.clone());
        save(conn, &mut state, now)?;
        log::info!(
            "Recorded income {} of {:.2}; assets now {:.2}",
            entry.id,
            entry.amount,
            state.total_assets
        );
        Ok(entry)
    })
}

pub fn add_expense(conn: &Connection, expense: NewExpense, now: NaiveDateTime) -> Result<ExpenseEntry> {
    db::atomically(conn, |conn| {
        let mut state = load_for_update(conn, now)?;
        let entry = ExpenseEntry {
            id: db::next_id(conn, ENTRY_SEQUENCE)?,
            amount: coerce_amount(expense.amount),
            category: expense.category,
            description: expense.description,
            emotion: expense.emotion,
            timestamp: expense.timestamp.unwrap_or(now),
            bill_id: expense.bill_id,
        };
        state.expense_entries.insert(0, entry.clone());
        save(conn, &mut state, now)?;
        log::info!(
            "Recorded expense {} of {:.2}; assets now {:.2}",
            entry.id,
            entry.amount,
            state.total_assets
        );
        Ok(entry)
    })
}

pub fn delete_income(conn: &Connection, id: u64, now: NaiveDateTime) -> Result<IncomeEntry> {
    db::atomically(conn, |conn| {
        let mut state = load_for_update(conn, now)?;
        let pos = state
            .income_entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(FinsenseError::EntryNotFound(id))?;
        let removed = state.income_entries.remove(pos);
        save(conn, &mut state, now)?;
        log::info!("Deleted income {id}");
        Ok(removed)
    })
}

pub fn delete_expense(conn: &Connection, id: u64, now: NaiveDateTime) -> Result<ExpenseEntry> {
    db::atomically(conn, |conn| {
        let mut state = load_for_update(conn, now)?;
        let pos = state
            .expense_entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(FinsenseError::EntryNotFound(id))?;
        let removed = state.expense_entries.remove(pos);
        save(conn, &mut state, now)?;
        log::info!("Deleted expense {id}");
        Ok(removed)
    })
}

/// May be negative.
pub fn get_net_worth(conn: &Connection) -> f64 {
    get_financial_data(conn).net_worth()
}

// ---------------------------------------------------------------------------
// Net worth history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl Timeframe {
    /// `1M`, `3M` and `6M` select their window; anything else means a year.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "1M" => Timeframe::OneMonth,
            "3M" => Timeframe::ThreeMonths,
            "6M" => Timeframe::SixMonths,
            _ => Timeframe::OneYear,
        }
    }

    pub fn months(self) -> u32 {
        match self {
            Timeframe::OneMonth => 1,
            Timeframe::ThreeMonths => 3,
            Timeframe::SixMonths => 6,
            Timeframe::OneYear => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetWorthPoint {
    pub timestamp: NaiveDateTime,
    pub change: f64,
    pub assets: f64,
    pub net_worth: f64,
    pub label: String,
}

pub fn get_net_worth_history(
    conn: &Connection,
    timeframe: Timeframe,
    now: NaiveDateTime,
) -> Vec<NetWorthPoint> {
    net_worth_history(&get_financial_data(conn), timeframe, now)
}

/// Replay every entry in time order from the opening balance and keep the
/// points that fall inside the trailing window.
pub fn net_worth_history(
    state: &LedgerState,
    timeframe: Timeframe,
    now: NaiveDateTime,
) -> Vec<NetWorthPoint> {
    // Both entry kinds draw ids from one sequence, so the id breaks ties
    // between entries with the same timestamp in creation order.
    let mut events: Vec<(NaiveDateTime, u64, f64, String)> = state
        .income_entries
        .iter()
        .map(|e| (e.timestamp, e.id, e.amount, entry_label(&e.description, e.source.as_str())))
        .chain(state.expense_entries.iter().map(|e| {
            (e.timestamp, e.id, -e.amount, entry_label(&e.description, e.category.as_str()))
        }))
        .collect();
    events.sort_by_key(|(ts, id, _, _)| (*ts, *id));

    let cutoff = now
        .checked_sub_months(Months::new(timeframe.months()))
        .unwrap_or(NaiveDateTime::MIN);

    let mut running = state.opening_assets;
    let mut points = Vec::new();
    for (timestamp, _, change, label) in events {
        running += change;
        if timestamp < cutoff {
            continue;
        }
        let assets = running.max(0.0);
        points.push(NetWorthPoint {
            timestamp,
            change,
            assets,
            net_worth: assets - state.total_liabilities,
            label,
        });
    }
    points
}

fn entry_label(description: &str, tag: &str) -> String {
    if description.is_empty() {
        tag.to_string()
    } else {
        description.to_string()
    }
}

// ---------------------------------------------------------------------------
// Emotional analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionStats {
    pub emotion: Emotion,
    pub expense_total: f64,
    pub expense_count: usize,
    pub income_total: f64,
    pub income_count: usize,
}

impl EmotionStats {
    fn new(emotion: Emotion) -> Self {
        Self {
            emotion,
            expense_total: 0.0,
            expense_count: 0,
            income_total: 0.0,
            income_count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.expense_count + self.income_count
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionalAnalytics {
    pub by_emotion: Vec<EmotionStats>,
    pub most_frequent: Option<Emotion>,
    pub most_expensive: Option<Emotion>,
    pub most_income: Option<Emotion>,
}

pub fn get_emotional_analytics(conn: &Connection) -> EmotionalAnalytics {
    emotional_analytics(&get_financial_data(conn))
}

pub fn emotional_analytics(state: &LedgerState) -> EmotionalAnalytics {
    let mut groups: BTreeMap<Emotion, EmotionStats> = BTreeMap::new();
    for e in &state.expense_entries {
        let stats = groups.entry(e.emotion).or_insert_with(|| EmotionStats::new(e.emotion));
        stats.expense_total += e.amount;
        stats.expense_count += 1;
    }
    for e in &state.income_entries {
        let stats = groups.entry(e.emotion).or_insert_with(|| EmotionStats::new(e.emotion));
        stats.income_total += e.amount;
        stats.income_count += 1;
    }
    let by_emotion: Vec<EmotionStats> = groups.into_values().collect();

    // Ties go to the emotion listed first.
    let leader = |key: &dyn Fn(&EmotionStats) -> f64| -> Option<Emotion> {
        let mut best: Option<(Emotion, f64)> = None;
        for s in &by_emotion {
            let v = key(s);
            if v > 0.0 && best.map_or(true, |(_, b)| v > b) {
                best = Some((s.emotion, v));
            }
        }
        best.map(|(e, _)| e)
    };

    EmotionalAnalytics {
        most_frequent: leader(&|s| s.count() as f64),
        most_expensive: leader(&|s| s.expense_total),
        most_income: leader(&|s| s.income_total),
        by_emotion,
    }
}

// ---------------------------------------------------------------------------
// Monthly summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    /// Largest spend first.
    pub by_category: Vec<(Category, f64)>,
}

pub fn get_monthly_summary(conn: &Connection, year: i32, month: u32) -> MonthlySummary {
    monthly_summary(&get_financial_data(conn), year, month)
}

pub fn monthly_summary(state: &LedgerState, year: i32, month: u32) -> MonthlySummary {
    let in_month = |ts: &NaiveDateTime| ts.year() == year && ts.month() == month;

    let income: f64 = state
        .income_entries
        .iter()
        .filter(|e| in_month(&e.timestamp))
        .map(|e| e.amount)
        .sum();

    let mut categories: BTreeMap<Category, f64> = BTreeMap::new();
    for e in state.expense_entries.iter().filter(|e| in_month(&e.timestamp)) {
        *categories.entry(e.category).or_insert(0.0) += e.amount;
    }
    let expenses: f64 = categories.values().sum();
    let mut by_category: Vec<(Category, f64)> = categories.into_iter().collect();
    by_category.sort_by(|a, b| b.1.total_cmp(&a.1));

    MonthlySummary {
        year,
        month,
        income,
        expenses,
        net: income - expenses,
        by_category,
    }
}

// ---------------------------------------------------------------------------
// Onboarding baseline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnboardingValues {
    pub savings: f64,
    pub debt: f64,
}

pub fn has_onboarding_data(conn: &Connection) -> bool {
    get_onboarding_values(conn).is_some()
}

/// Savings and debt from the user profile, if either was ever set.
pub fn get_onboarding_values(conn: &Connection) -> Option<OnboardingValues> {
    let profile = profile::get_user_profile(conn)?;
    if profile.current_savings.is_none() && profile.total_debt.is_none() {
        return None;
    }
    Some(OnboardingValues {
        savings: profile.current_savings.unwrap_or(0.0),
        debt: profile.total_debt.unwrap_or(0.0),
    })
}

/// Throw away the ledger, including all history, and rebuild it from the
/// profile's current savings and debt.
pub fn force_reinitialize_with_onboarding(conn: &Connection, now: NaiveDateTime) -> Result<LedgerState> {
    db::atomically(conn, |conn| {
        db::remove_document(conn, LEDGER_KEY)?;
        let mut state = baseline(conn, now);
        save(conn, &mut state, now)?;
        log::info!(
            "Ledger reset to onboarding baseline: assets {:.2}, liabilities {:.2}",
            state.total_assets,
            state.total_liabilities
        );
        Ok(state)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::UserProfile;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn income(amount: f64, emotion: Emotion, ts: NaiveDateTime) -> NewIncome {
        NewIncome {
            amount,
            source: IncomeSource::Salary,
            description: String::new(),
            emotion,
            timestamp: Some(ts),
        }
    }

    fn expense(amount: f64, category: Category, emotion: Emotion, ts: NaiveDateTime) -> NewExpense {
        NewExpense {
            amount,
            category,
            description: String::new(),
            emotion,
            timestamp: Some(ts),
            bill_id: None,
        }
    }

    fn set_profile(conn: &Connection, savings: Option<f64>, debt: Option<f64>) {
        let profile = UserProfile {
            name: "Asha".to_string(),
            current_savings: savings,
            total_debt: debt,
            ..Default::default()
        };
        db::put_document(conn, db::PROFILE_KEY, &profile).unwrap();
    }

    #[test]
    fn test_empty_ledger_defaults() {
        let (_dir, conn) = test_db();
        let state = get_financial_data(&conn);
        assert_eq!(state, LedgerState::default());
        assert_eq!(get_net_worth(&conn), 0.0);
    }

    #[test]
    fn test_corrupt_ledger_reads_as_empty_but_blocks_writes() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO documents (key, value) VALUES (?1, 'garbage')",
            [LEDGER_KEY],
        )
        .unwrap();
        assert_eq!(get_financial_data(&conn), LedgerState::default());
        let now = at(2025, 1, 1);
        let err = add_income(&conn, income(10.0, Emotion::Happy, now), now).unwrap_err();
        assert!(matches!(err, FinsenseError::Json(_)));
    }

    #[test]
    fn test_add_income_and_expense_update_totals() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        let inc = add_income(&conn, income(1000.0, Emotion::Happy, now), now).unwrap();
        let exp = add_expense(&conn, expense(300.0, Category::Food, Emotion::Stressed, now), now).unwrap();
        assert_ne!(inc.id, exp.id);

        let state = get_financial_data(&conn);
        assert_eq!(state.total_assets, 700.0);
        assert_eq!(state.income_entries.len(), 1);
        assert_eq!(state.expense_entries.len(), 1);
        assert_eq!(state.last_updated, Some(now));
    }

    #[test]
    fn test_entries_are_newest_first() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        let first = add_expense(&conn, expense(1.0, Category::Food, Emotion::Neutral, now), now).unwrap();
        let second = add_expense(&conn, expense(2.0, Category::Food, Emotion::Neutral, now), now).unwrap();
        let state = get_financial_data(&conn);
        assert_eq!(state.expense_entries[0].id, second.id);
        assert_eq!(state.expense_entries[1].id, first.id);
    }

    #[test]
    fn test_expense_cannot_drive_assets_negative() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        add_income(&conn, income(1000.0, Emotion::Happy, now), now).unwrap();
        add_expense(&conn, expense(1500.0, Category::Shopping, Emotion::Impulsive, now), now).unwrap();
        assert_eq!(get_financial_data(&conn).total_assets, 0.0);
    }

    #[test]
    fn test_totals_match_replay_for_mixed_sequence() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        let ops: &[(bool, f64)] = &[
            (true, 1000.0),
            (false, 1500.0),
            (true, 1000.0),
            (false, 200.0),
            (false, 50.5),
            (true, 10.0),
        ];
        let (mut inc, mut exp) = (0.0, 0.0);
        for &(is_income, amount) in ops {
            if is_income {
                inc += amount;
                add_income(&conn, income(amount, Emotion::Neutral, now), now).unwrap();
            } else {
                exp += amount;
                add_expense(&conn, expense(amount, Category::Other, Emotion::Neutral, now), now).unwrap();
            }
            let state = get_financial_data(&conn);
            let expected: f64 = (inc - exp).max(0.0);
            assert!((state.total_assets - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_non_finite_amount_is_recorded_as_zero() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        let entry = add_income(&conn, income(f64::NAN, Emotion::Neutral, now), now).unwrap();
        assert_eq!(entry.amount, 0.0);
        assert_eq!(get_financial_data(&conn).total_assets, 0.0);
    }

    #[test]
    fn test_delete_entries_recomputes() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        add_income(&conn, income(500.0, Emotion::Neutral, now), now).unwrap();
        let exp = add_expense(&conn, expense(200.0, Category::Food, Emotion::Neutral, now), now).unwrap();
        assert_eq!(get_financial_data(&conn).total_assets, 300.0);

        delete_expense(&conn, exp.id, now).unwrap();
        assert_eq!(get_financial_data(&conn).total_assets, 500.0);
        assert!(matches!(
            delete_expense(&conn, exp.id, now),
            Err(FinsenseError::EntryNotFound(_))
        ));
        assert!(matches!(delete_income(&conn, 999, now), Err(FinsenseError::EntryNotFound(999))));
    }

    #[test]
    fn test_net_worth_subtracts_liabilities() {
        let (_dir, conn) = test_db();
        set_profile(&conn, Some(2000.0), Some(5000.0));
        let now = at(2025, 1, 10);
        force_reinitialize_with_onboarding(&conn, now).unwrap();
        add_income(&conn, income(500.0, Emotion::Neutral, now), now).unwrap();
        let state = get_financial_data(&conn);
        assert_eq!(state.total_assets, 2500.0);
        assert_eq!(get_net_worth(&conn), 2500.0 - 5000.0);
    }

    #[test]
    fn test_missing_ledger_bootstraps_from_profile() {
        let (_dir, conn) = test_db();
        set_profile(&conn, Some(1200.0), None);
        let state = get_financial_data(&conn);
        assert_eq!(state.opening_assets, 1200.0);
        assert_eq!(state.total_assets, 1200.0);
        assert_eq!(state.total_liabilities, 0.0);

        let now = at(2025, 1, 10);
        add_expense(&conn, expense(200.0, Category::Food, Emotion::Neutral, now), now).unwrap();
        assert_eq!(get_financial_data(&conn).total_assets, 1000.0);
    }

    #[test]
    fn test_onboarding_values() {
        let (_dir, conn) = test_db();
        assert!(!has_onboarding_data(&conn));
        set_profile(&conn, None, None);
        assert!(!has_onboarding_data(&conn));
        set_profile(&conn, None, Some(300.0));
        assert_eq!(
            get_onboarding_values(&conn),
            Some(OnboardingValues { savings: 0.0, debt: 300.0 })
        );
    }

    #[test]
    fn test_force_reinitialize_discards_history() {
        let (_dir, conn) = test_db();
        let now = at(2025, 1, 10);
        add_income(&conn, income(1000.0, Emotion::Happy, now), now).unwrap();
        add_expense(&conn, expense(100.0, Category::Food, Emotion::Sad, now), now).unwrap();
        set_profile(&conn, Some(50.0), Some(10.0));

        let state = force_reinitialize_with_onboarding(&conn, now).unwrap();
        assert!(state.income_entries.is_empty());
        assert!(state.expense_entries.is_empty());
        assert_eq!(state.total_assets, 50.0);
        assert_eq!(get_financial_data(&conn), state);
    }

    #[test]
    fn test_timeframe_codes() {
        assert_eq!(Timeframe::from_code("1M"), Timeframe::OneMonth);
        assert_eq!(Timeframe::from_code("3m"), Timeframe::ThreeMonths);
        assert_eq!(Timeframe::from_code("6M"), Timeframe::SixMonths);
        assert_eq!(Timeframe::from_code("1Y"), Timeframe::OneYear);
        assert_eq!(Timeframe::from_code("bogus").months(), 12);
    }

    #[test]
    fn test_history_replays_chronologically_and_windows() {
        let (_dir, conn) = test_db();
        let now = at(2025, 6, 15);
        // Inserted out of order on purpose.
        add_expense(&conn, expense(100.0, Category::Food, Emotion::Neutral, at(2025, 6, 1)), now).unwrap();
        add_income(&conn, income(1000.0, Emotion::Happy, at(2025, 1, 5)), now).unwrap();
        add_income(&conn, income(500.0, Emotion::Happy, at(2025, 5, 20)), now).unwrap();

        let all = get_net_worth_history(&conn, Timeframe::OneYear, now);
        let assets: Vec<f64> = all.iter().map(|p| p.assets).collect();
        assert_eq!(assets, vec![1000.0, 1500.0, 1400.0]);
        assert_eq!(all.last().unwrap().assets, get_financial_data(&conn).total_assets);

        let recent = get_net_worth_history(&conn, Timeframe::OneMonth, now);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].assets, 1500.0);
        assert_eq!(recent[1].change, -100.0);
    }

    #[test]
    fn test_history_orders_same_day_entries_by_creation() {
        let (_dir, conn) = test_db();
        let day = at(2025, 6, 1);
        add_expense(&conn, expense(100.0, Category::Food, Emotion::Neutral, day), day).unwrap();
        add_income(&conn, income(300.0, Emotion::Happy, day), day).unwrap();

        let points = get_net_worth_history(&conn, Timeframe::OneMonth, day);
        let assets: Vec<f64> = points.iter().map(|p| p.assets).collect();
        assert_eq!(assets, vec![0.0, 200.0]);
        assert_eq!(points[0].change, -100.0);
    }

    #[test]
    fn test_history_floors_points_and_includes_liabilities() {
        let now = at(2025, 2, 1);
        let mut state = LedgerState::with_baseline(0.0, 100.0, now);
        state.expense_entries.push(ExpenseEntry {
            id: 1,
            amount: 50.0,
            category: Category::Food,
            description: "Lunch".to_string(),
            emotion: Emotion::Neutral,
            timestamp: at(2025, 1, 20),
            bill_id: None,
        });
        let points = net_worth_history(&state, Timeframe::OneMonth, now);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].assets, 0.0);
        assert_eq!(points[0].net_worth, -100.0);
        assert_eq!(points[0].label, "Lunch");
    }

    #[test]
    fn test_emotional_analytics() {
        let (_dir, conn) = test_db();
        let now = at(2025, 3, 1);
        add_expense(&conn, expense(50.0, Category::Food, Emotion::Stressed, now), now).unwrap();
        add_expense(&conn, expense(20.0, Category::Food, Emotion::Stressed, now), now).unwrap();
        add_expense(&conn, expense(400.0, Category::Shopping, Emotion::Impulsive, now), now).unwrap();
        add_income(&conn, income(3000.0, Emotion::Confident, now), now).unwrap();

        let a = get_emotional_analytics(&conn);
        assert_eq!(a.most_frequent, Some(Emotion::Stressed));
        assert_eq!(a.most_expensive, Some(Emotion::Impulsive));
        assert_eq!(a.most_income, Some(Emotion::Confident));

        let stressed = a.by_emotion.iter().find(|s| s.emotion == Emotion::Stressed).unwrap();
        assert_eq!(stressed.expense_total, 70.0);
        assert_eq!(stressed.expense_count, 2);
        assert_eq!(stressed.income_count, 0);
    }

    #[test]
    fn test_emotional_analytics_empty() {
        let a = emotional_analytics(&LedgerState::default());
        assert!(a.by_emotion.is_empty());
        assert_eq!(a.most_frequent, None);
        assert_eq!(a.most_expensive, None);
        assert_eq!(a.most_income, None);
    }

    #[test]
    fn test_monthly_summary() {
        let (_dir, conn) = test_db();
        let now = at(2025, 3, 31);
        add_income(&conn, income(2000.0, Emotion::Neutral, at(2025, 3, 1)), now).unwrap();
        add_expense(&conn, expense(300.0, Category::Food, Emotion::Neutral, at(2025, 3, 2)), now).unwrap();
        add_expense(&conn, expense(900.0, Category::Festival, Emotion::Excited, at(2025, 3, 9)), now).unwrap();
        add_expense(&conn, expense(50.0, Category::Food, Emotion::Neutral, at(2025, 2, 28)), now).unwrap();

        let s = get_monthly_summary(&conn, 2025, 3);
        assert_eq!(s.income, 2000.0);
        assert_eq!(s.expenses, 1200.0);
        assert_eq!(s.net, 800.0);
        assert_eq!(s.by_category, vec![(Category::Festival, 900.0), (Category::Food, 300.0)]);
    }
}
