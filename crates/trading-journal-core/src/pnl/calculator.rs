use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::JournalError;
use crate::trade::{StopLoss, TakeProfitLeg, Trade, TradeStatus};
use crate::types::*;
use crate::JournalResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Everything the realized result of a trade depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlInput {
    #[serde(rename = "sl")]
    pub stop_loss: StopLoss,
    #[serde(rename = "tp1")]
    pub take_profit_1: TakeProfitLeg,
    #[serde(rename = "tp2")]
    pub take_profit_2: TakeProfitLeg,
    pub margin: Money,
    /// The account baseline at the time of calculation
    #[serde(rename = "initialAccount")]
    pub initial_account_value: Money,
}

impl PnlInput {
    pub fn for_trade(trade: &Trade, initial_account_value: Money) -> Self {
        Self {
            stop_loss: trade.stop_loss.clone(),
            take_profit_1: trade.take_profit_1.clone(),
            take_profit_2: trade.take_profit_2.clone(),
            margin: trade.margin,
            initial_account_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlOutcome {
    /// Signed percentage of the margin realized, before scaling to currency
    pub realized_risk_percentage: Percent,
    pub realized_amount: Money,
    /// Realized amount as a percentage of the account baseline
    pub realized_percentage: Percent,
    pub status: TradeStatus,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the realized result of a trade from its hit flags.
///
/// A stop-loss hit takes precedence over any take-profit flags. Otherwise each
/// hit take-profit leg contributes `rr * risk% * close% / 100` of the margin.
pub fn realized_pnl(input: &PnlInput) -> JournalResult<PnlOutcome> {
    if input.initial_account_value.is_zero() {
        return Err(JournalError::DivisionByZero {
            context: "realized percentage of account (initial account is zero)".into(),
        });
    }
    let risk = input.stop_loss.risk_percentage;

    let realized_risk_percentage: Percent = if input.stop_loss.hit {
        -risk
    } else {
        [&input.take_profit_1, &input.take_profit_2]
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, leg| {
                acc.checked_add(leg.checked_achieved_r()?.checked_mul(risk)?)
            })
            .ok_or_else(|| JournalError::out_of_range("tp.rr"))?
    };

    let realized_amount = input
        .margin
        .checked_mul(realized_risk_percentage)
        .map(|v| v / Decimal::ONE_HUNDRED)
        .ok_or_else(|| JournalError::out_of_range("margin"))?;

    let realized_percentage = percent_of(realized_amount, input.initial_account_value)
        .ok_or_else(|| JournalError::out_of_range("initialAccount"))?;

    Ok(PnlOutcome {
        realized_risk_percentage,
        realized_amount,
        realized_percentage,
        status: TradeStatus::from_amount(realized_amount),
    })
}

/// Envelope form of [`realized_pnl`] with methodology, warnings and timing.
pub fn calculate_pnl(input: &PnlInput) -> JournalResult<ComputationOutput<PnlOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.margin <= Decimal::ZERO {
        return Err(JournalError::invalid("margin", "Margin must be positive"));
    }
    if input.stop_loss.risk_percentage <= Decimal::ZERO {
        return Err(JournalError::invalid(
            "sl.percentage",
            "Stop-loss risk percentage must be positive",
        ));
    }

    let any_tp_hit = input.take_profit_1.hit || input.take_profit_2.hit;
    if input.stop_loss.hit && any_tp_hit {
        warnings.push(
            "Stop-loss and take-profit both flagged as hit; stop-loss result used".into(),
        );
    }
    let closed = checked_sum(
        [&input.take_profit_1, &input.take_profit_2]
            .into_iter()
            .filter(|leg| leg.hit)
            .map(|leg| leg.close_percentage),
    )
    .ok_or_else(|| JournalError::out_of_range("tp.percentage"))?;
    if !input.stop_loss.hit && closed > Decimal::ONE_HUNDRED {
        warnings.push(format!(
            "Hit take-profit legs close {closed}% of the position (more than 100%)"
        ));
    }

    let outcome = realized_pnl(input)?;

    let assumptions = serde_json::json!({
        "stop_loss_precedence": true,
        "percentage_base": "current initial account value",
    });

    Ok(with_metadata(
        "Realized R from stop-loss / take-profit hit flags, scaled by margin",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        outcome,
    ))
}

impl Trade {
    /// Write a calculated outcome into the trade's derived fields.
    pub fn apply_pnl(&mut self, outcome: &PnlOutcome) {
        self.realized_amount = outcome.realized_amount;
        self.realized_percentage = outcome.realized_percentage;
        self.status = outcome.status;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
