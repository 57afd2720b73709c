//! The service surface the app talks to, and its local implementation.
//!
//! A remote canister backend would implement the same trait. This build only
//! ships the local store; `connect_backend` falls back to it for the whole
//! session when a remote endpoint is configured.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::error::Result;
use crate::events::EventBus;
use crate::models::{ExpenseEntry, IncomeEntry, UserProfile};
use crate::portability::{self, UserDataExport};
use crate::profile::{self, ProfileOutcome, ProfileUpdate};
use crate::settings::Settings;
use crate::transactions::{self, ExpenseInput, IncomeInput, Recorded};

pub trait FinanceBackend {
    fn name(&self) -> &'static str;
    fn add_expense(&self, input: &ExpenseInput) -> Result<Recorded<ExpenseEntry>>;
    fn add_income(&self, input: &IncomeInput) -> Result<Recorded<IncomeEntry>>;
    fn get_user_profile(&self) -> Result<Option<UserProfile>>;
    fn update_user_profile(&self, update: ProfileUpdate) -> Result<ProfileOutcome>;
    fn export_user_data(&self) -> Result<UserDataExport>;
    fn delete_user_data(&self) -> Result<usize>;
}

pub struct LocalBackend<'a> {
    conn: &'a Connection,
    bus: &'a EventBus,
    clock: fn() -> NaiveDateTime,
}

fn wall_clock() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl<'a> LocalBackend<'a> {
    pub fn new(conn: &'a Connection, bus: &'a EventBus) -> Self {
        Self {
            conn,
            bus,
            clock: wall_clock,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }
}

impl FinanceBackend for LocalBackend<'_> {
    fn name(&self) -> &'static str {
        "local"
    }

    fn add_expense(&self, input: &ExpenseInput) -> Result<Recorded<ExpenseEntry>> {
        transactions::record_expense(self.conn, input, (self.clock)(), self.bus)
    }

    fn add_income(&self, input: &IncomeInput) -> Result<Recorded<IncomeEntry>> {
        transactions::record_income(self.conn, input, (self.clock)(), self.bus)
    }

    fn get_user_profile(&self) -> Result<Option<UserProfile>> {
        Ok(profile::get_user_profile(self.conn))
    }

    fn update_user_profile(&self, update: ProfileUpdate) -> Result<ProfileOutcome> {
        profile::update_user_profile(self.conn, update, (self.clock)(), self.bus)
    }

    fn export_user_data(&self) -> Result<UserDataExport> {
        portability::export_user_data(self.conn, (self.clock)())
    }

    fn delete_user_data(&self) -> Result<usize> {
        portability::delete_user_data(self.conn)
    }
}

/// Pick the backend for this session.
pub fn connect_backend<'a>(
    settings: &Settings,
    conn: &'a Connection,
    bus: &'a EventBus,
) -> Box<dyn FinanceBackend + 'a> {
    if let Some(url) = settings.canister_url.as_deref().filter(|u| !u.trim().is_empty()) {
        log::warn!("Remote backend at {url} is not supported by this build; using the local store");
    }
    Box::new(LocalBackend::new(conn, bus))
}
