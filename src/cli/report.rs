use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::bills::{get_all_bills, get_overdue_bills, get_upcoming_bills};
use crate::cli::{now, open_db, parse_month_arg, today};
use crate::error::Result;
use crate::fmt::{money, signed_money};
use crate::ledger::{self, Timeframe};
use crate::settings::load_settings;

pub fn summary() -> Result<()> {
    let settings = load_settings();
    let symbol = settings.currency_symbol.as_str();
    let conn = open_db()?;
    let state = ledger::get_financial_data(&conn);
    let today = today();

    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Opening savings"), Cell::new(money(state.opening_assets, symbol))]);
    table.add_row(vec![
        Cell::new("Total income".green()),
        Cell::new(money(state.total_income(), symbol)),
    ]);
    table.add_row(vec![
        Cell::new("Total expenses".red()),
        Cell::new(money(state.total_expenses(), symbol)),
    ]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![Cell::new("Assets".bold()), Cell::new(money(state.total_assets, symbol))]);
    table.add_row(vec![
        Cell::new("Liabilities".bold()),
        Cell::new(money(state.total_liabilities, symbol)),
    ]);
    let net = state.net_worth();
    let net_label = if net >= 0.0 {
        "NET WORTH".green().bold()
    } else {
        "NET WORTH".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(net, symbol))]);
    println!("Financial Summary\n{table}");

    let upcoming = get_upcoming_bills(&conn, today);
    let overdue = get_overdue_bills(&conn, today);
    let unpaid_total: f64 = get_all_bills(&conn)
        .iter()
        .filter(|b| !b.is_paid)
        .map(|b| b.amount)
        .sum();
    println!(
        "Bills: {} upcoming, {} overdue, {} unpaid in total",
        upcoming.len(),
        if overdue.is_empty() {
            overdue.len().to_string().normal()
        } else {
            overdue.len().to_string().red().bold()
        },
        money(unpaid_total, symbol)
    );
    if let Some(next) = upcoming.first() {
        println!(
            "Next due: {} ({}) on {}",
            next.bill_name,
            money(next.amount, symbol),
            next.due_date
        );
    }
    if let Some(updated) = state.last_updated {
        println!("Last updated {}", updated.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

pub fn history(timeframe: &str) -> Result<()> {
    let settings = load_settings();
    let symbol = settings.currency_symbol.as_str();
    let conn = open_db()?;
    let tf = Timeframe::from_code(timeframe);
    let points = ledger::get_net_worth_history(&conn, tf, now());

    if points.is_empty() {
        println!("No transactions in the last {} month(s).", tf.months());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Entry", "Change", "Assets", "Net Worth"]);
    for p in &points {
        let change = if p.change >= 0.0 {
            signed_money(p.change, symbol).green()
        } else {
            signed_money(p.change, symbol).red()
        };
        table.add_row(vec![
            Cell::new(p.timestamp.format("%Y-%m-%d")),
            Cell::new(&p.label),
            Cell::new(change),
            Cell::new(money(p.assets, symbol)),
            Cell::new(money(p.net_worth, symbol)),
        ]);
    }
    println!("Net Worth History ({} months)\n{table}", tf.months());
    Ok(())
}

pub fn emotions() -> Result<()> {
    let settings = load_settings();
    let symbol = settings.currency_symbol.as_str();
    let conn = open_db()?;
    let analytics = ledger::get_emotional_analytics(&conn);

    if analytics.by_emotion.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Emotion", "Spent", "Expenses", "Earned", "Income"]);
    for s in &analytics.by_emotion {
        table.add_row(vec![
            Cell::new(s.emotion),
            Cell::new(money(s.expense_total, symbol)),
            Cell::new(s.expense_count),
            Cell::new(money(s.income_total, symbol)),
            Cell::new(s.income_count),
        ]);
    }
    println!("Spending by Emotion\n{table}");

    let show = |label: &str, e: Option<crate::models::Emotion>| {
        if let Some(e) = e {
            println!("{label:<16}{}", e.as_str().bold());
        }
    };
    show("Most frequent:", analytics.most_frequent);
    show("Most spent:", analytics.most_expensive);
    show("Most earned:", analytics.most_income);
    Ok(())
}

pub fn month(month: Option<String>) -> Result<()> {
    let settings = load_settings();
    let symbol = settings.currency_symbol.as_str();
    let (year, month) = match parse_month_arg(month.as_deref())? {
        Some(ym) => ym,
        None => {
            let today = today();
            (today.year(), today.month())
        }
    };
    let conn = open_db()?;
    let summary = ledger::get_monthly_summary(&conn, year, month);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount"]);
    if !summary.by_category.is_empty() {
        table.add_row(vec![Cell::new("EXPENSES".red().bold()), Cell::new("")]);
        for (category, total) in &summary.by_category {
            table.add_row(vec![
                Cell::new(format!("  {category}")),
                Cell::new(money(*total, symbol)),
            ]);
        }
        table.add_row(vec![Cell::new(""), Cell::new("")]);
    }
    table.add_row(vec![Cell::new("Income".green().bold()), Cell::new(money(summary.income, symbol))]);
    table.add_row(vec![Cell::new("Expenses".bold()), Cell::new(money(summary.expenses, symbol))]);
    let net_label = if summary.net >= 0.0 {
        "NET".green().bold()
    } else {
        "NET".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(signed_money(summary.net, symbol))]);

    println!("{:04}-{:02}\n{table}", summary.year, summary.month);
    Ok(())
}
