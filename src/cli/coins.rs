use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::tokens::get_wallet;

pub fn run(limit: usize) -> Result<()> {
    let conn = open_db()?;
    let wallet = get_wallet(&conn);

    println!(
        "FinCoins: {}  (lifetime {})",
        wallet.balance.to_string().yellow().bold(),
        wallet.lifetime_earned
    );
    if wallet.history.is_empty() {
        println!("No rewards yet. Log an expense or add a bill to earn some.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["When", "Reward", "Coins"]);
    for award in wallet.history.iter().take(limit) {
        table.add_row(vec![
            Cell::new(award.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(award.reason.label()),
            Cell::new(format!("+{}", award.amount)),
        ]);
    }
    println!("{table}");
    Ok(())
}
