mod cli;
mod contract;
mod db;
mod engine;
mod error;
mod fmt;
mod models;
mod settings;
mod store;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{CasesCommands, Cli, Commands, TxCommands};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("PAYOFF_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&settings::load_settings().log_level);

    let result = match cli.command {
        Commands::Init { data_dir, firm_name } => cli::init::run(data_dir, firm_name),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Cases { command } => match command {
            CasesCommands::Add {
                name,
                court,
                number,
                amount,
                date,
                rate,
                details,
            } => cli::cases::add(&name, &court, &number, amount, &date, rate, details),
            CasesCommands::List { limit, offset, as_of } => cli::cases::list(limit, offset, as_of.as_deref()),
            CasesCommands::Show { id } => cli::cases::show(id),
            CasesCommands::Edit {
                id,
                name,
                court,
                number,
                amount,
                date,
                rate,
                details,
            } => cli::cases::edit(id, name, court, number, amount, date, rate, details),
            CasesCommands::Delete { id } => cli::cases::delete(id),
        },
        Commands::Tx { command } => match command {
            TxCommands::Add {
                case_id,
                kind,
                amount,
                date,
                description,
            } => cli::transactions::add(case_id, &kind, amount, &date, description),
            TxCommands::List { case_id, as_of } => cli::transactions::list(case_id, as_of.as_deref()),
            TxCommands::Edit {
                id,
                kind,
                amount,
                date,
                description,
            } => cli::transactions::edit(id, kind, amount, date, description),
            TxCommands::Delete { id } => cli::transactions::delete(id),
        },
        Commands::Payoff { case_id, as_of } => cli::report::payoff(case_id, as_of.as_deref()),
        Commands::Timeline { case_id, as_of, csv } => cli::report::timeline(case_id, as_of.as_deref(), csv),
        Commands::Calc { file } => cli::calc::run(file.as_deref()),
        Commands::Demo => cli::demo::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "payoff", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
