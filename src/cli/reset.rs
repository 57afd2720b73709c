use colored::Colorize;

use crate::backend::connect_backend;
use crate::cli::{event_bus, open_db};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes every income, expense, bill, profile and FinCoin record.".red()
        );
        println!("Run `finsense export json` first if you want a copy, then re-run with --yes.");
        return Ok(());
    }

    let settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();
    let backend = connect_backend(&settings, &conn, &bus);
    let removed = backend.delete_user_data()?;
    println!("Deleted {removed} stored documents.");
    Ok(())
}
