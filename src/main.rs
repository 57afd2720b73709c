mod backend;
mod bills;
mod cli;
mod db;
mod error;
mod events;
mod fmt;
mod ledger;
mod models;
mod portability;
mod profile;
mod settings;
mod tokens;
mod transactions;

use clap::{CommandFactory, Parser};

use cli::{
    BillsCommands, Cli, Commands, ExpenseCommands, ExportCommands, IncomeCommands, ReportCommands,
};
use transactions::{ExpenseInput, IncomeInput};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Onboard {
            name,
            income,
            savings,
            debt,
            goals,
        } => cli::onboard::run(name, income, savings, debt, goals),
        Commands::Income { command } => match command {
            IncomeCommands::Add {
                amount,
                source,
                emotion,
                description,
                date,
            } => cli::income::add(IncomeInput {
                amount,
                source,
                description,
                emotion,
                date,
            }),
            IncomeCommands::List { limit, legacy } => cli::income::list(limit, legacy),
            IncomeCommands::Delete { id } => cli::income::delete(id),
        },
        Commands::Expense { command } => match command {
            ExpenseCommands::Add {
                amount,
                category,
                emotion,
                description,
                date,
            } => cli::expense::add(ExpenseInput {
                amount,
                category,
                description,
                emotion,
                date,
            }),
            ExpenseCommands::List { limit, legacy } => cli::expense::list(limit, legacy),
            ExpenseCommands::Delete { id } => cli::expense::delete(id),
        },
        Commands::Bills { command } => match command {
            BillsCommands::Add {
                name,
                amount,
                due,
                category,
                recurring,
                interval,
            } => cli::bills::add(cli::bills::AddArgs {
                name,
                amount,
                due,
                category,
                recurring,
                interval,
            }),
            BillsCommands::List {
                upcoming,
                overdue,
                paid,
            } => cli::bills::list(upcoming, overdue, paid),
            BillsCommands::Pay { id } => cli::bills::pay(id),
            BillsCommands::Update {
                id,
                name,
                amount,
                due,
                category,
                recurring,
                interval,
            } => cli::bills::update(
                id,
                cli::bills::UpdateArgs {
                    name,
                    amount,
                    due,
                    category,
                    recurring,
                    interval,
                },
            ),
            BillsCommands::Delete { id } => cli::bills::delete(id),
        },
        Commands::Report { command } => match command {
            ReportCommands::Summary => cli::report::summary(),
            ReportCommands::History { timeframe } => cli::report::history(&timeframe),
            ReportCommands::Emotions => cli::report::emotions(),
            ReportCommands::Month { month } => cli::report::month(month),
        },
        Commands::Coins { limit } => cli::coins::run(limit),
        Commands::Status => cli::status::run(),
        Commands::Export { command } => match command {
            ExportCommands::Json { output } => cli::export::json(output),
            ExportCommands::Csv { output } => cli::export::csv(output),
            ExportCommands::Verify { file } => cli::export::verify(&file),
        },
        Commands::Reset { yes } => cli::reset::run(yes),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "finsense", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
