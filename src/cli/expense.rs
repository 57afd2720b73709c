use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::backend::connect_backend;
use crate::cli::{event_bus, now, open_db};
use crate::error::Result;
use crate::events::EventBus;
use crate::fmt::money;
use crate::ledger::get_financial_data;
use crate::models::TransactionKind;
use crate::settings::load_settings;
use crate::transactions::{delete_transaction, legacy_expenses, ExpenseInput};

pub fn add(input: ExpenseInput) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();
    let backend = connect_backend(&settings, &conn, &bus);

    let recorded = backend.add_expense(&input)?;
    let entry = &recorded.entry;
    println!(
        "Recorded expense #{}: {} on {} ({})",
        entry.id,
        money(entry.amount, &settings.currency_symbol),
        entry.category,
        entry.emotion
    );

    let state = get_financial_data(&conn);
    if state.total_assets == 0.0 && state.total_expenses() > 0.0 {
        println!("{}", "Your tracked assets are now at zero.".red());
    }
    Ok(())
}

pub fn list(limit: usize, legacy: bool) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    if legacy {
        let records: Vec<_> = legacy_expenses(&conn).into_iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    let state = get_financial_data(&conn);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Amount", "Category", "Emotion", "Description"]);
    for e in state.expense_entries.iter().take(limit) {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.timestamp.format("%Y-%m-%d")),
            Cell::new(money(e.amount, &settings.currency_symbol)),
            Cell::new(e.category),
            Cell::new(e.emotion),
            Cell::new(&e.description),
        ]);
    }
    println!("Expenses\n{table}");
    println!(
        "Total expenses: {}",
        money(state.total_expenses(), &settings.currency_symbol)
    );
    Ok(())
}

pub fn delete(id: u64) -> Result<()> {
    let conn = open_db()?;
    delete_transaction(&conn, TransactionKind::Expense, id, now(), &EventBus::new())?;
    println!("Deleted expense #{id}");
    Ok(())
}
