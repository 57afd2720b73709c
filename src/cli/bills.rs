use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::bills::{self, bill_status, BillStatus};
use crate::cli::{event_bus, now, open_db, parse_date_arg, today};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Bill, BillPatch, Category, NewBill, RecurringInterval};
use crate::settings::load_settings;
use crate::transactions::parse_amount;

pub struct AddArgs {
    pub name: String,
    pub amount: String,
    pub due: String,
    pub category: Option<String>,
    pub recurring: bool,
    pub interval: Option<String>,
}

pub fn add(args: AddArgs) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();

    let interval = args
        .interval
        .as_deref()
        .map(str::parse::<RecurringInterval>)
        .transpose()?;
    let new = NewBill {
        bill_name: args.name,
        due_date: parse_date_arg(&args.due)?,
        amount: parse_amount(&args.amount)?,
        category: args.category.as_deref().map(str::parse::<Category>).transpose()?,
        is_recurring: args.recurring || interval.is_some(),
        recurring_interval: interval,
    };
    let added = bills::add_bill(&conn, new, now(), &bus)?;
    let bill = &added.bill;
    println!(
        "Added bill #{}: {} {} due {}{}",
        bill.id,
        bill.bill_name,
        money(bill.amount, &settings.currency_symbol),
        bill.due_date,
        if bill.is_recurring {
            format!(" (repeats {})", bill.recurring_interval)
        } else {
            String::new()
        }
    );
    Ok(())
}

fn status_cell(status: BillStatus) -> Cell {
    let text = status.as_str();
    match status {
        BillStatus::Paid => Cell::new(text.green()),
        BillStatus::Overdue => Cell::new(text.red().bold()),
        BillStatus::DueSoon => Cell::new(text.yellow()),
        BillStatus::Upcoming => Cell::new(text),
    }
}

pub fn list(upcoming: bool, overdue: bool, paid: bool) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    let today = today();

    let (title, rows): (&str, Vec<Bill>) = if upcoming {
        ("Upcoming Bills", bills::get_upcoming_bills(&conn, today))
    } else if overdue {
        ("Overdue Bills", bills::get_overdue_bills(&conn, today))
    } else if paid {
        ("Paid Bills", bills::get_paid_bills(&conn))
    } else {
        let mut all = bills::get_all_bills(&conn);
        all.sort_by_key(|b| (b.is_paid, b.due_date, b.id));
        ("Bills", all)
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Amount", "Due", "Category", "Repeats", "Status"]);
    for b in &rows {
        table.add_row(vec![
            Cell::new(b.id),
            Cell::new(&b.bill_name),
            Cell::new(money(b.amount, &settings.currency_symbol)),
            Cell::new(b.due_date),
            Cell::new(b.category),
            Cell::new(if b.is_recurring { b.recurring_interval.as_str() } else { "" }),
            status_cell(bill_status(b, today)),
        ]);
    }
    println!("{title}\n{table}");
    Ok(())
}

pub fn pay(id: u64) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();

    let payment = bills::mark_bill_as_paid(&conn, id, now(), &bus)?;
    println!(
        "Paid {} ({}). Recorded as expense #{}.",
        payment.bill.bill_name,
        money(payment.bill.amount, &settings.currency_symbol),
        payment.expense.id
    );
    if let Some(next) = &payment.next_bill {
        println!("Next {} bill #{} is due {}.", next.bill_name, next.id, next.due_date);
    }
    Ok(())
}

pub struct UpdateArgs {
    pub name: Option<String>,
    pub amount: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub recurring: Option<bool>,
    pub interval: Option<String>,
}

pub fn update(id: u64, args: UpdateArgs) -> Result<()> {
    let conn = open_db()?;
    let patch = BillPatch {
        bill_name: args.name,
        due_date: args.due.as_deref().map(parse_date_arg).transpose()?,
        amount: args.amount.as_deref().map(parse_amount).transpose()?,
        category: args.category.as_deref().map(str::parse::<Category>).transpose()?,
        is_recurring: args.recurring,
        recurring_interval: args
            .interval
            .as_deref()
            .map(str::parse::<RecurringInterval>)
            .transpose()?,
    };
    let bill = bills::update_bill(&conn, id, patch)?;
    println!("Updated bill #{}: {}", bill.id, bill.bill_name);
    Ok(())
}

pub fn delete(id: u64) -> Result<()> {
    let conn = open_db()?;
    let bill = bills::delete_bill(&conn, id)?;
    println!("Deleted bill #{}: {}", bill.id, bill.bill_name);
    Ok(())
}
