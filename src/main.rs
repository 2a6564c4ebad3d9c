use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use networth::cli::record::parse_balance;
use networth::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for networth::AppCommand {
    fn from(cmd: Commands) -> networth::AppCommand {
        match cmd {
            Commands::Record { date, balances } => networth::AppCommand::Record { date, balances },
            Commands::Show { date } => networth::AppCommand::Show { date },
            Commands::History => networth::AppCommand::History,
            Commands::Allocation { date } => networth::AppCommand::Allocation { date },
            Commands::Rate { from, to, date } => networth::AppCommand::Rate { from, to, date },
            Commands::Remove { date } => networth::AppCommand::Remove { date },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record account balances for a date
    Record {
        /// Entry date (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Account balance as ID=AMOUNT, repeatable
        #[arg(short, long = "balance", value_parser = parse_balance, required = true)]
        balances: Vec<(String, f64)>,
    },
    /// Display a recorded entry, the latest by default
    Show {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Display net worth over time
    History,
    /// Display the category breakdown of an entry
    Allocation {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Look up an exchange rate
    Rate {
        from: String,
        to: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Delete the entry recorded for a date
    Remove {
        #[arg(short, long)]
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => networth::cli::setup::setup(),
        Some(cmd) => networth::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
