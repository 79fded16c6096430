pub mod commands;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "rentbot",
    about = "Rentbot operator CLI",
    long_about = "Prepare the rental assistant database, maintain the vehicle catalog, and inspect runtime readiness.",
    after_help = "Examples:\n  rentbot migrate\n  rentbot seed\n  rentbot inventory list --all\n  rentbot inventory set-price 3 119.50\n  rentbot doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo rental fleet when the catalog is empty")]
    Seed,
    #[command(about = "List vehicles or change their availability and daily price")]
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM endpoint settings, database and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventoryAction {
    #[command(about = "List vehicles in catalog order")]
    List {
        #[arg(long, help = "Include vehicles that are not currently available")]
        all: bool,
    },
    #[command(about = "Mark a vehicle as available or unavailable")]
    SetAvailability {
        id: i64,
        #[arg(action = clap::ArgAction::Set)]
        available: bool,
    },
    #[command(about = "Change a vehicle's daily price")]
    SetPrice { id: i64, price: Decimal },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Inventory { action } => commands::inventory::run(action),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
