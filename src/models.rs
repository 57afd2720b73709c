use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FinsenseError;

/// Declares a closed tag enum that is stored lowercase and parsed
/// case-insensitively at the input boundary.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:path, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FinsenseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| $err(s.trim().to_string()))
            }
        }
    };
}

tag_enum! {
    /// How the user felt about a transaction.
    Emotion, FinsenseError::UnknownEmotion, default = Neutral {
        Happy => "happy",
        Excited => "excited",
        Confident => "confident",
        Neutral => "neutral",
        Anxious => "anxious",
        Stressed => "stressed",
        Sad => "sad",
        Guilty => "guilty",
        Impulsive => "impulsive",
    }
}

tag_enum! {
    /// Spending category shared by expenses and bills.
    Category, FinsenseError::UnknownCategory, default = Other {
        Food => "food",
        Transport => "transport",
        Shopping => "shopping",
        Entertainment => "entertainment",
        Housing => "housing",
        Utilities => "utilities",
        Healthcare => "healthcare",
        Education => "education",
        Festival => "festival",
        Subscriptions => "subscriptions",
        Insurance => "insurance",
        Debt => "debt",
        Other => "other",
    }
}

tag_enum! {
    IncomeSource, FinsenseError::UnknownSource, default = Other {
        Salary => "salary",
        Freelance => "freelance",
        Business => "business",
        Investment => "investment",
        Gift => "gift",
        Rental => "rental",
        Other => "other",
    }
}

tag_enum! {
    RecurringInterval, FinsenseError::UnknownInterval, default = Monthly {
        Weekly => "weekly",
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    pub id: u64,
    pub amount: f64,
    pub source: IncomeSource,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emotion: Emotion,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    pub id: u64,
    pub amount: f64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emotion: Emotion,
    pub timestamp: NaiveDateTime,
    /// Set when the expense was generated by paying a bill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<u64>,
}

/// The persisted ledger. Entry lists are newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// Savings recorded at onboarding; the starting point for `total_assets`.
    #[serde(default)]
    pub opening_assets: f64,
    #[serde(default)]
    pub total_assets: f64,
    #[serde(default)]
    pub total_liabilities: f64,
    #[serde(default)]
    pub income_entries: Vec<IncomeEntry>,
    #[serde(default)]
    pub expense_entries: Vec<ExpenseEntry>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: u64,
    pub bill_name: String,
    pub due_date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_interval: RecurringInterval,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub paid_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewBill {
    pub bill_name: String,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub category: Option<Category>,
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
}

#[derive(Debug, Clone, Default)]
pub struct BillPatch {
    pub bill_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub is_recurring: Option<bool>,
    pub recurring_interval: Option<RecurringInterval>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub current_savings: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub financial_goals: Vec<String>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// FinCoins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardReason {
    ExpenseLogged,
    IncomeLogged,
    BillAdded,
    BillPaidOnTime,
    BillPaidLate,
    OnboardingCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAward {
    pub reason: RewardReason,
    pub amount: u64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenWallet {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub lifetime_earned: u64,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<TokenAward>,
}
