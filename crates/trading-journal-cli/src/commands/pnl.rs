use clap::Args;
use serde_json::Value;

use trading_journal_core::pnl::{self, PnlInput, PnlOutcome};
use trading_journal_core::{TradeId, TradePatch};

use crate::config::JournalConfig;
use crate::input;

/// Arguments for the realized P/L calculation
#[derive(Args)]
pub struct PnlArgs {
    /// Path to a JSON calculation input (sl, tp1, tp2, margin, initialAccount)
    #[arg(long, conflicts_with = "id")]
    pub input: Option<String>,
    /// Calculate for a stored trade against the journal's baseline
    #[arg(long)]
    pub id: Option<String>,
    /// Write the result back into the stored trade
    #[arg(long, requires = "id")]
    pub apply: bool,
}

pub fn run_pnl(args: PnlArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let Some(id) = args.id else {
        let pnl_input: PnlInput = input::file_or_stdin(args.input.as_deref())?
            .ok_or("--input <file.json>, stdin or --id required for P/L calculation")?;
        let result = pnl::calculate_pnl(&pnl_input)?;
        return Ok(serde_json::to_value(result)?);
    };

    let id = TradeId::new(id);
    let mut journal = config.open_journal()?;
    let trade = journal
        .trade(&id)
        .ok_or_else(|| format!("No trade with id '{}'", id))?;
    let result = pnl::calculate_pnl(&PnlInput::for_trade(trade, journal.initial_account()))?;

    if args.apply {
        if !journal.update_trade(&id, outcome_patch(&result.result)) {
            return Err(format!("No trade with id '{}'", id).into());
        }
        journal.flush()?;
    }

    Ok(serde_json::to_value(result)?)
}

/// Patch writing the derived fields of `outcome` into a stored trade.
fn outcome_patch(outcome: &PnlOutcome) -> TradePatch {
    TradePatch {
        realized_amount: Some(outcome.realized_amount),
        realized_percentage: Some(outcome.realized_percentage),
        status: Some(outcome.status),
        ..TradePatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_journal_core::journal::TradeJournal;
    use trading_journal_core::{TradeDraft, TradeStatus};

    fn outcome() -> PnlOutcome {
        PnlOutcome {
            realized_risk_percentage: dec!(2),
            realized_amount: dec!(20000),
            realized_percentage: dec!(0.02),
            status: TradeStatus::Win,
        }
    }

    #[test]
    fn test_outcome_patch_touches_only_derived_fields() {
        let patch = outcome_patch(&outcome());
        assert_eq!(patch.realized_amount, Some(dec!(20000)));
        assert_eq!(patch.status, Some(TradeStatus::Win));
        assert!(patch.notes.is_none() && patch.take_profit_1.is_none());
    }

    #[test]
    fn test_apply_to_missing_trade_reports_not_found() {
        let mut journal = TradeJournal::in_memory();
        journal.add_trade(TradeDraft {
            pair: "EURUSD".into(),
            ..TradeDraft::default()
        });
        assert!(!journal.update_trade(&TradeId::from("missing"), outcome_patch(&outcome())));
    }
}
