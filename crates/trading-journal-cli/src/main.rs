mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::account::SetAccountArgs;
use commands::pnl::PnlArgs;
use commands::stats::{GroupArgs, PeriodPlArgs, StatsArgs};
use commands::trades::{AddArgs, IdArgs, ListArgs, UpdateArgs};
use commands::transfer::ImportArgs;
use config::JournalConfig;

/// Trading journal: record trades, compute realized P/L and track performance
#[derive(Parser)]
#[command(
    name = "tj",
    version,
    about = "Trading journal: record trades, compute realized P/L and track performance",
    long_about = "A CLI for keeping a trading journal with decimal precision. Records trades \
                  with take-profit and stop-loss legs, derives realized P/L from hit flags, \
                  and reports win rate, average R and calendar P/L against an account baseline."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Journal data file
    #[arg(long, env = "TJ_DATA_FILE", global = true)]
    data: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, env = "TJ_LOG", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the account baseline and current value
    Account,
    /// Change the initial account value
    SetAccount(SetAccountArgs),
    /// Record a trade
    Add(AddArgs),
    /// Edit fields of a recorded trade
    Update(UpdateArgs),
    /// Remove a trade
    Delete(IdArgs),
    /// Print one trade
    Show(IdArgs),
    /// Search and sort the trade log
    List(ListArgs),
    /// Realized P/L from stop-loss and take-profit hit flags
    Pnl(PnlArgs),
    /// Dashboard summary: account value, win rate, average R, period P/L
    Stats(StatsArgs),
    /// Realized P/L for one day, month or year
    PeriodPl(PeriodPlArgs),
    /// Bucket trades by day, month or year
    Group(GroupArgs),
    /// Account value at the close of each period
    EquityCurve(GroupArgs),
    /// Replace the journal with an exported snapshot
    Import(ImportArgs),
    /// Print the whole journal as a snapshot
    Export,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("tj {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = JournalConfig::resolve(cli.data, cli.log_level).and_then(|config| {
        config.init_logging();
        dispatch(cli.command, &config)
    });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn dispatch(
    command: Commands,
    config: &JournalConfig,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    match command {
        Commands::Account => commands::account::run_account(config),
        Commands::SetAccount(args) => commands::account::run_set_account(args, config),
        Commands::Add(args) => commands::trades::run_add(args, config),
        Commands::Update(args) => commands::trades::run_update(args, config),
        Commands::Delete(args) => commands::trades::run_delete(args, config),
        Commands::Show(args) => commands::trades::run_show(args, config),
        Commands::List(args) => commands::trades::run_list(args, config),
        Commands::Pnl(args) => commands::pnl::run_pnl(args, config),
        Commands::Stats(args) => commands::stats::run_stats(args, config),
        Commands::PeriodPl(args) => commands::stats::run_period_pl(args, config),
        Commands::Group(args) => commands::stats::run_group(args, config),
        Commands::EquityCurve(args) => commands::stats::run_equity_curve(args, config),
        Commands::Import(args) => commands::transfer::run_import(args, config),
        Commands::Export => commands::transfer::run_export(config),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    }
}
