use chrono::NaiveDate;
use clap::Args;
use serde_json::{json, Map, Value};

use trading_journal_core::statistics::{
    self, compute_statistics, period_profit_loss, Period, PeriodKind, StatisticsInput,
};

use crate::config::JournalConfig;
use crate::input;

/// Arguments for the dashboard summary
#[derive(Args)]
pub struct StatsArgs {
    /// Reference date for "this month" and "this year" (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
    /// Summarize a JSON snapshot instead of the stored journal
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for P/L over one calendar period
#[derive(Args)]
pub struct PeriodPlArgs {
    /// day, month or year
    #[arg(long)]
    pub period: PeriodKind,
    /// 2025-03-14, 2025-03 or 2025 to match --period
    #[arg(long)]
    pub value: String,
}

/// Arguments for bucketing trades by period
#[derive(Args)]
pub struct GroupArgs {
    /// day, month or year
    #[arg(long, default_value = "month")]
    pub by: PeriodKind,
}

pub fn run_stats(args: StatsArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let stats_input = match args.input.as_deref() {
        Some(path) => {
            let mut parsed: StatisticsInput = input::file::read_json(path)?;
            parsed.as_of = args.as_of.or(parsed.as_of);
            parsed
        }
        None => {
            let journal = config.open_journal()?;
            StatisticsInput {
                initial_account_value: journal.initial_account(),
                trades: journal.trades().to_vec(),
                as_of: args.as_of,
            }
        }
    };
    let result = compute_statistics(&stats_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_period_pl(
    args: PeriodPlArgs,
    config: &JournalConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let period = Period::parse(args.period, &args.value)?;
    let journal = config.open_journal()?;
    let trades = journal.trades();
    let num_trades = trades.iter().filter(|t| period.contains(t.date)).count();
    Ok(json!({
        "period": period.to_string(),
        "kind": period.kind(),
        "profit_loss": period_profit_loss(trades, period),
        "num_trades": num_trades,
    }))
}

pub fn run_group(args: GroupArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = config.open_journal()?;
    let groups = journal.group_by_period(args.by);

    let mut out = Map::new();
    let mut keys: Vec<&String> = groups.keys().collect();
    keys.sort();
    for key in keys {
        let bucket = &groups[key];
        let ids: Vec<&str> = bucket.iter().map(|t| t.id.as_str()).collect();
        let profit_loss: rust_decimal::Decimal = bucket.iter().map(|t| t.realized_amount).sum();
        out.insert(
            key.clone(),
            json!({
                "num_trades": bucket.len(),
                "profit_loss": profit_loss,
                "ids": ids,
            }),
        );
    }
    Ok(Value::Object(out))
}

pub fn run_equity_curve(
    args: GroupArgs,
    config: &JournalConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = config.open_journal()?;
    let curve = statistics::equity_curve(journal.trades(), journal.initial_account(), args.by);
    Ok(serde_json::to_value(curve)?)
}
