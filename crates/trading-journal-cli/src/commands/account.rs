use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::config::JournalConfig;

/// Arguments for changing the account baseline
#[derive(Args)]
pub struct SetAccountArgs {
    /// New initial account value (must be positive)
    #[arg(long)]
    pub amount: Decimal,
}

pub fn run_account(config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = config.open_journal()?;
    Ok(json!({
        "initial_account_value": journal.initial_account(),
        "account_value": journal.account_value(),
        "num_trades": journal.trades().len(),
        "data_file": config.data_file.display().to_string(),
    }))
}

pub fn run_set_account(
    args: SetAccountArgs,
    config: &JournalConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut journal = config.open_journal()?;
    journal.set_initial_account(args.amount)?;
    journal.flush()?;
    Ok(json!({
        "initial_account_value": journal.initial_account(),
        "account_value": journal.account_value(),
    }))
}
