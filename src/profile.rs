use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{self, PROFILE_KEY};
use crate::error::{FinsenseError, Result};
use crate::events::{AppEvent, EventBus};
use crate::ledger;
use crate::models::{LedgerState, RewardReason, UserProfile};
use crate::tokens::{self, Credit};

/// Onboarding answers. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub monthly_income: Option<f64>,
    pub current_savings: Option<f64>,
    pub total_debt: Option<f64>,
    pub financial_goals: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    pub profile: UserProfile,
    pub ledger: LedgerState,
    /// Present the first time onboarding is completed.
    pub credit: Option<Credit>,
}

pub fn get_user_profile(conn: &Connection) -> Option<UserProfile> {
    match db::get_document(conn, PROFILE_KEY) {
        Ok(profile) => profile,
        Err(e) => {
            log::warn!("Could not read user profile: {e}");
            None
        }
    }
}

fn check_money(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(FinsenseError::InvalidAmount(format!(
            "{field} must be zero or more, got {v}"
        ))),
        _ => Ok(()),
    }
}

/// Save onboarding answers and rebuild the ledger from them.
///
/// Submitting onboarding always resets the ledger to the new savings/debt
/// baseline, discarding recorded history.
pub fn update_user_profile(
    conn: &Connection,
    update: ProfileUpdate,
    now: NaiveDateTime,
    bus: &EventBus,
) -> Result<ProfileOutcome> {
    check_money("monthly income", update.monthly_income)?;
    check_money("savings", update.current_savings)?;
    check_money("debt", update.total_debt)?;

    let outcome = db::atomically(conn, |conn| {
        let mut profile: UserProfile = db::get_document(conn, PROFILE_KEY)?.unwrap_or_default();
        let first_time = !profile.onboarding_complete;

        if let Some(name) = update.name {
            profile.name = name.trim().to_string();
        }
        if update.monthly_income.is_some() {
            profile.monthly_income = update.monthly_income;
        }
        if update.current_savings.is_some() {
            profile.current_savings = update.current_savings;
        }
        if update.total_debt.is_some() {
            profile.total_debt = update.total_debt;
        }
        if let Some(goals) = update.financial_goals {
            profile.financial_goals = goals.into_iter().filter(|g| !g.trim().is_empty()).collect();
        }
        profile.onboarding_complete = true;
        profile.updated_at = Some(now);
        db::put_document(conn, PROFILE_KEY, &profile)?;

        let ledger = ledger::force_reinitialize_with_onboarding(conn, now)?;
        let credit = if first_time {
            Some(tokens::credit(conn, RewardReason::OnboardingCompleted, now)?)
        } else {
            None
        };
        Ok(ProfileOutcome { profile, ledger, credit })
    })?;

    log::info!("Profile updated for '{}'", outcome.profile.name);
    bus.emit(&AppEvent::ProfileUpdated);
    if let Some(credit) = &outcome.credit {
        tokens::notify(bus, credit);
    }
    Ok(outcome)
}
