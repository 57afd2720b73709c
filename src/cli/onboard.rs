use crate::backend::connect_backend;
use crate::cli::{event_bus, open_db};
use crate::error::Result;
use crate::fmt::money;
use crate::profile::ProfileUpdate;
use crate::settings::{load_settings, save_settings};

pub fn run(
    name: Option<String>,
    income: Option<f64>,
    savings: Option<f64>,
    debt: Option<f64>,
    goals: Vec<String>,
) -> Result<()> {
    let mut settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();
    let backend = connect_backend(&settings, &conn, &bus);

    let update = ProfileUpdate {
        name: name.clone(),
        monthly_income: income,
        current_savings: savings,
        total_debt: debt,
        financial_goals: if goals.is_empty() { None } else { Some(goals) },
    };
    let outcome = backend.update_user_profile(update)?;

    if let Some(name) = name {
        settings.user_name = name.trim().to_string();
        save_settings(&settings)?;
    }

    let symbol = &settings.currency_symbol;
    println!(
        "Profile saved{}.",
        if outcome.profile.name.is_empty() {
            String::new()
        } else {
            format!(" for {}", outcome.profile.name)
        }
    );
    println!("Ledger reset to your onboarding baseline:");
    println!("  Assets:       {}", money(outcome.ledger.total_assets, symbol));
    println!("  Liabilities:  {}", money(outcome.ledger.total_liabilities, symbol));
    println!("  Net worth:    {}", money(outcome.ledger.net_worth(), symbol));
    Ok(())
}
