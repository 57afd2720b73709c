pub mod bills;
pub mod coins;
pub mod expense;
pub mod export;
pub mod income;
pub mod init;
pub mod onboard;
pub mod report;
pub mod reset;
pub mod status;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{FinsenseError, Result};
use crate::events::{AppEvent, EventBus};
use crate::settings::get_db_path;
use crate::transactions::migrate_legacy_lists;

pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub(crate) fn today() -> NaiveDate {
    now().date()
}

/// Open the configured database, bringing the schema and any legacy lists
/// up to date.
pub(crate) fn open_db() -> Result<Connection> {
    let path = get_db_path();
    if !path.exists() {
        return Err(FinsenseError::NotInitialized(format!(
            "no database at {}. Run `finsense init` first.",
            path.display()
        )));
    }
    let conn = get_connection(&path)?;
    init_db(&conn)?;
    let report = migrate_legacy_lists(&conn, now())?;
    if !report.is_empty() {
        println!(
            "Imported {} expenses and {} incomes from legacy lists.",
            report.expenses, report.incomes
        );
    }
    Ok(conn)
}

/// Event bus that prints FinCoins rewards as they happen.
pub(crate) fn event_bus() -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(|event| {
        if let AppEvent::FincoinsNotification { amount, reason, balance } = event {
            println!(
                "{} {} (balance {balance})",
                format!("+{amount} FinCoins").yellow().bold(),
                reason.label()
            );
        }
    });
    bus
}

/// Parse a `YYYY-MM` month argument. `None` when no month was given.
pub(crate) fn parse_month_arg(month: Option<&str>) -> Result<Option<(i32, u32)>> {
    let Some(raw) = month else {
        return Ok(None);
    };
    let invalid = || FinsenseError::InvalidDate(format!("{raw} (expected YYYY-MM)"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(Some((year, month)))
}

pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FinsenseError::InvalidDate(format!("{raw} (expected YYYY-MM-DD)")))
}

#[derive(Parser)]
#[command(
    name = "finsense",
    version,
    about = "Emotion-aware personal finance ledger with bills and FinCoins."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for FinSense data (default: ~/Documents/finsense)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record onboarding answers. Resets the ledger to the new baseline.
    Onboard {
        #[arg(long)]
        name: Option<String>,
        /// Monthly take-home income
        #[arg(long)]
        income: Option<f64>,
        /// Current savings; becomes the opening asset balance
        #[arg(long)]
        savings: Option<f64>,
        /// Total outstanding debt; becomes the liability total
        #[arg(long)]
        debt: Option<f64>,
        /// Financial goal (repeatable)
        #[arg(long = "goal")]
        goals: Vec<String>,
    },
    /// Record and manage income.
    Income {
        #[command(subcommand)]
        command: IncomeCommands,
    },
    /// Record and manage expenses.
    Expense {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
    /// Track bills and pay them.
    Bills {
        #[command(subcommand)]
        command: BillsCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show the FinCoins balance and recent rewards.
    Coins {
        /// Number of recent rewards to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show current database and summary statistics.
    Status,
    /// Export stored data.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Delete all stored data.
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income.
    Add {
        /// Amount, e.g. 45000 or "45,000"
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// salary, freelance, business, investment, gift, rental, other
        #[arg(long)]
        source: Option<String>,
        /// How you felt about it
        #[arg(long)]
        emotion: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date: YYYY-MM-DD (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded income, newest first.
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print JSON in the older flat `incomes` record shape
        #[arg(long)]
        legacy: bool,
    },
    /// Delete an income entry by ID.
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense.
    Add {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// food, transport, shopping, entertainment, housing, utilities,
        /// healthcare, education, festival, subscriptions, insurance, debt, other
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        emotion: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date: YYYY-MM-DD (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded expenses, newest first.
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print JSON in the older flat `expenses` record shape
        #[arg(long)]
        legacy: bool,
    },
    /// Delete an expense entry by ID.
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum BillsCommands {
    /// Add a bill.
    Add {
        /// Bill name, e.g. 'Electricity'
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Due date: YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long)]
        category: Option<String>,
        /// Repeat after payment
        #[arg(long)]
        recurring: bool,
        /// weekly, monthly, yearly (default: monthly)
        #[arg(long)]
        interval: Option<String>,
    },
    /// List bills.
    List {
        /// Only unpaid bills due today or later
        #[arg(long, conflicts_with_all = ["overdue", "paid"])]
        upcoming: bool,
        /// Only unpaid bills past their due date
        #[arg(long, conflicts_with = "paid")]
        overdue: bool,
        /// Only paid bills
        #[arg(long)]
        paid: bool,
    },
    /// Mark a bill paid and record the expense.
    Pay { id: u64 },
    /// Update a bill.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Set whether the bill repeats: true or false
        #[arg(long)]
        recurring: Option<bool>,
        #[arg(long)]
        interval: Option<String>,
    },
    /// Delete a bill. Expenses it already produced are kept.
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Assets, liabilities, net worth and bills at a glance.
    Summary,
    /// Net worth over time.
    History {
        /// 1M, 3M, 6M or 1Y
        #[arg(long, default_value = "3M")]
        timeframe: String,
    },
    /// Spending and income grouped by emotion.
    Emotions,
    /// One month's income, spending and categories.
    Month {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export all stored documents as JSON.
    Json {
        /// Output file path (default: <data_dir>/exports/finsense-YYYY-MM-DD.json)
        #[arg(long)]
        output: Option<String>,
    },
    /// Export ledger entries as CSV.
    Csv {
        /// Output file path (default: <data_dir>/exports/ledger-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Check a JSON export against its checksum.
    Verify {
        /// Path to a file written by `export json`
        file: String,
    },
}
