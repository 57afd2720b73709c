use std::path::PathBuf;

use crate::backend::connect_backend;
use crate::bills::get_all_bills;
use crate::cli::{event_bus, open_db};
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::ledger::{get_financial_data, has_onboarding_data};
use crate::settings::{load_settings, DB_FILE};
use crate::tokens::get_wallet;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `finsense init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = open_db()?;
    let bus = event_bus();
    let backend = connect_backend(&settings, &conn, &bus);
    println!("Backend:    {}", backend.name());

    let profile = backend.get_user_profile()?;
    println!(
        "Profile:    {}",
        match &profile {
            Some(p) if !p.name.is_empty() => p.name.as_str(),
            Some(_) => "(unnamed)",
            None => "(not set)",
        }
    );
    println!("Onboarded:  {}", if has_onboarding_data(&conn) { "yes" } else { "no" });

    let state = get_financial_data(&conn);
    let bills = get_all_bills(&conn);
    let unpaid = bills.iter().filter(|b| !b.is_paid).count();
    let wallet = get_wallet(&conn);

    println!();
    println!("Income entries:   {}", state.income_entries.len());
    println!("Expense entries:  {}", state.expense_entries.len());
    println!("Bills:            {} ({unpaid} unpaid)", bills.len());
    println!("Net worth:        {}", money(state.net_worth(), &settings.currency_symbol));
    println!("FinCoins:         {}", wallet.balance);
    Ok(())
}
