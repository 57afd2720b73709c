use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::{self, BILLS_KEY, BILL_SEQUENCE};
use crate::error::{FinsenseError, Result};
use crate::events::{AppEvent, EventBus};
use crate::ledger::{self, NewExpense};
use crate::models::{
    Bill, BillPatch, Emotion, ExpenseEntry, NewBill, RecurringInterval, RewardReason,
    TransactionKind,
};
use crate::tokens::{self, Credit};

/// Bills due within this many days are flagged as due soon.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BillStatus::Paid => "paid",
            BillStatus::Overdue => "overdue",
            BillStatus::DueSoon => "due soon",
            BillStatus::Upcoming => "upcoming",
        }
    }
}

pub fn bill_status(bill: &Bill, today: NaiveDate) -> BillStatus {
    if bill.is_paid {
        return BillStatus::Paid;
    }
    let days_left = (bill.due_date - today).num_days();
    if days_left < 0 {
        BillStatus::Overdue
    } else if days_left <= DUE_SOON_DAYS {
        BillStatus::DueSoon
    } else {
        BillStatus::Upcoming
    }
}

/// Next due date of a recurring bill. Month and year steps clamp to the end
/// of shorter months (Jan 31 -> Feb 28).
pub fn advance_due_date(due: NaiveDate, interval: RecurringInterval) -> Result<NaiveDate> {
    let next = match interval {
        RecurringInterval::Weekly => due.checked_add_days(Days::new(7)),
        RecurringInterval::Monthly => due.checked_add_months(Months::new(1)),
        RecurringInterval::Yearly => due.checked_add_months(Months::new(12)),
    };
    next.ok_or_else(|| FinsenseError::InvalidDate(format!("cannot advance {due} by one {interval} step")))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn get_all_bills(conn: &Connection) -> Vec<Bill> {
    db::load_document_or_default(conn, BILLS_KEY)
}

fn unpaid_sorted(conn: &Connection, keep: impl Fn(&Bill) -> bool) -> Vec<Bill> {
    let mut bills: Vec<Bill> = get_all_bills(conn)
        .into_iter()
        .filter(|b| !b.is_paid && keep(b))
        .collect();
    bills.sort_by_key(|b| (b.due_date, b.id));
    bills
}

/// Unpaid bills due today or later, soonest first.
pub fn get_upcoming_bills(conn: &Connection, today: NaiveDate) -> Vec<Bill> {
    unpaid_sorted(conn, |b| b.due_date >= today)
}

/// Unpaid bills whose due date has passed, oldest first.
pub fn get_overdue_bills(conn: &Connection, today: NaiveDate) -> Vec<Bill> {
    unpaid_sorted(conn, |b| b.due_date < today)
}

pub fn get_paid_bills(conn: &Connection) -> Vec<Bill> {
    let mut bills: Vec<Bill> = get_all_bills(conn).into_iter().filter(|b| b.is_paid).collect();
    bills.sort_by(|a, b| b.paid_date.cmp(&a.paid_date));
    bills
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

fn load_for_update(conn: &Connection) -> Result<Vec<Bill>> {
    Ok(db::get_document(conn, BILLS_KEY)?.unwrap_or_default())
}

fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(FinsenseError::InvalidAmount(format!("bill amount must be positive, got {amount}")))
    }
}

#[derive(Debug, Clone)]
pub struct AddedBill {
    pub bill: Bill,
    pub credit: Credit,
}

pub fn add_bill(conn: &Connection, new: NewBill, now: NaiveDateTime, bus: &EventBus) -> Result<AddedBill> {
    let name = new.bill_name.trim().to_string();
    if name.is_empty() {
        return Err(FinsenseError::MissingField("bill name"));
    }
    check_amount(new.amount)?;

    let added = db::atomically(conn, |conn| {
        let mut bills = load_for_update(conn)?;
        let bill = Bill {
            id: db::next_id(conn, BILL_SEQUENCE)?,
            bill_name: name,
            due_date: new.due_date,
            amount: new.amount,
            category: new.category.unwrap_or_default(),
            is_recurring: new.is_recurring,
            recurring_interval: new.recurring_interval.unwrap_or_default(),
            is_paid: false,
            paid_date: None,
        };
        bills.push(bill.clone());
        db::put_document(conn, BILLS_KEY, &bills)?;
        let credit = tokens::credit(conn, RewardReason::BillAdded, now)?;
        Ok(AddedBill { bill, credit })
    })?;

    log::info!("Added bill {} '{}' due {}", added.bill.id, added.bill.bill_name, added.bill.due_date);
    tokens::notify(bus, &added.credit);
    Ok(added)
}

#[derive(Debug, Clone)]
pub struct BillPayment {
    pub bill: Bill,
    /// The next occurrence, for recurring bills.
    pub next_bill: Option<Bill>,
    pub expense: ExpenseEntry,
    pub credit: Credit,
}

/// Mark a bill paid, record it as an expense, and roll recurring bills over.
///
/// Each payment produces exactly one expense entry and, for recurring bills,
/// exactly one new unpaid bill. Paying an already-paid bill is an error.
pub fn mark_bill_as_paid(conn: &Connection, id: u64, now: NaiveDateTime, bus: &EventBus) -> Result<BillPayment> {
    let payment = db::atomically(conn, |conn| {
        let mut bills = load_for_update(conn)?;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(FinsenseError::BillNotFound(id))?;
        if bill.is_paid {
            return Err(FinsenseError::Other(format!("Bill {id} is already paid")));
        }
        let on_time = bill.due_date >= now.date();
        bill.is_paid = true;
        bill.paid_date = Some(now);
        let paid = bill.clone();

        let next_bill = if paid.is_recurring {
            let next = Bill {
                id: db::next_id(conn, BILL_SEQUENCE)?,
                due_date: advance_due_date(paid.due_date, paid.recurring_interval)?,
                is_paid: false,
                paid_date: None,
                ..paid.clone()
            };
            bills.push(next.clone());
            Some(next)
        } else {
            None
        };
        db::put_document(conn, BILLS_KEY, &bills)?;

        let expense = ledger::add_expense(
            conn,
            NewExpense {
                amount: paid.amount,
                category: paid.category,
                description: format!("Bill Payment: {}", paid.bill_name),
                emotion: Emotion::Neutral,
                timestamp: Some(now),
                bill_id: Some(paid.id),
            },
            now,
        )?;
        let reason = if on_time {
            RewardReason::BillPaidOnTime
        } else {
            RewardReason::BillPaidLate
        };
        let credit = tokens::credit(conn, reason, now)?;

        Ok(BillPayment {
            bill: paid,
            next_bill,
            expense,
            credit,
        })
    })?;

    log::info!(
        "Paid bill {} '{}'{}",
        payment.bill.id,
        payment.bill.bill_name,
        payment
            .next_bill
            .as_ref()
            .map(|n| format!("; next due {}", n.due_date))
            .unwrap_or_default()
    );
    bus.emit(&AppEvent::TransactionUpdated {
        kind: TransactionKind::Expense,
        id: payment.expense.id,
    });
    bus.emit(&AppEvent::BillPaid {
        bill_id: payment.bill.id,
        next_bill_id: payment.next_bill.as_ref().map(|b| b.id),
    });
    tokens::notify(bus, &payment.credit);
    Ok(payment)
}

pub fn update_bill(conn: &Connection, id: u64, patch: BillPatch) -> Result<Bill> {
    if let Some(amount) = patch.amount {
        check_amount(amount)?;
    }
    if patch.bill_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(FinsenseError::MissingField("bill name"));
    }

    db::atomically(conn, |conn| {
        let mut bills = load_for_update(conn)?;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(FinsenseError::BillNotFound(id))?;
        if let Some(name) = patch.bill_name {
            bill.bill_name = name.trim().to_string();
        }
        if let Some(due) = patch.due_date {
            bill.due_date = due;
        }
        if let Some(amount) = patch.amount {
            bill.amount = amount;
        }
        if let Some(category) = patch.category {
            bill.category = category;
        }
        if let Some(recurring) = patch.is_recurring {
            bill.is_recurring = recurring;
        }
        if let Some(interval) = patch.recurring_interval {
            bill.recurring_interval = interval;
        }
        let updated = bill.clone();
        db::put_document(conn, BILLS_KEY, &bills)?;
        log::info!("Updated bill {id}");
        Ok(updated)
    })
}

/// Remove a bill. Expenses it already generated stay in the ledger.
pub fn delete_bill(conn: &Connection, id: u64) -> Result<Bill> {
    db::atomically(conn, |conn| {
        let mut bills = load_for_update(conn)?;
        let pos = bills
            .iter()
            .position(|b| b.id == id)
            .ok_or(FinsenseError::BillNotFound(id))?;
        let removed = bills.remove(pos);
        db::put_document(conn, BILLS_KEY, &bills)?;
        log::info!("Deleted bill {id}");
        Ok(removed)
    })
}
