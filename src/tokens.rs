use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{self, TOKENS_KEY};
use crate::error::Result;
use crate::events::{AppEvent, EventBus};
use crate::models::{RewardReason, TokenAward, TokenWallet};

const HISTORY_LIMIT: usize = 200;

impl RewardReason {
    pub fn coins(self) -> u64 {
        match self {
            RewardReason::ExpenseLogged => 5,
            RewardReason::IncomeLogged => 5,
            RewardReason::BillAdded => 2,
            RewardReason::BillPaidOnTime => 10,
            RewardReason::BillPaidLate => 3,
            RewardReason::OnboardingCompleted => 50,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RewardReason::ExpenseLogged => "Expense logged",
            RewardReason::IncomeLogged => "Income logged",
            RewardReason::BillAdded => "Bill added",
            RewardReason::BillPaidOnTime => "Bill paid on time",
            RewardReason::BillPaidLate => "Bill paid late",
            RewardReason::OnboardingCompleted => "Onboarding completed",
        }
    }
}

/// A committed award and the balance right after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub award: TokenAward,
    pub balance: u64,
}

pub fn get_wallet(conn: &Connection) -> TokenWallet {
    db::load_document_or_default(conn, TOKENS_KEY)
}

pub fn credit(conn: &Connection, reason: RewardReason, now: NaiveDateTime) -> Result<Credit> {
    db::atomically(conn, |conn| {
        let mut wallet: TokenWallet = db::get_document(conn, TOKENS_KEY)?.unwrap_or_default();
        let award = TokenAward {
            reason,
            amount: reason.coins(),
            timestamp: now,
        };
        wallet.balance += award.amount;
        wallet.lifetime_earned += award.amount;
        wallet.history.insert(0, award.clone());
        wallet.history.truncate(HISTORY_LIMIT);
        db::put_document(conn, TOKENS_KEY, &wallet)?;
        log::debug!("Awarded {} FinCoins for {:?}", award.amount, reason);
        Ok(Credit {
            award,
            balance: wallet.balance,
        })
    })
}

pub fn notify(bus: &EventBus, credit: &Credit) {
    bus.emit(&AppEvent::FincoinsNotification {
        amount: credit.award.amount,
        reason: credit.award.reason,
        balance: credit.balance,
    });
}
