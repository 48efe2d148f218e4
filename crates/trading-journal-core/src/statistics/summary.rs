use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::aggregate::{checked_achieved_risk_reward, status_counts, win_rate};
use super::periods::{Period, PeriodKind};
use crate::error::JournalError;
use crate::trade::{Trade, TradeStatus};
use crate::types::*;
use crate::JournalResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Same shape as a journal snapshot, plus the reference date for the
/// "this month" / "this year" figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsInput {
    #[serde(rename = "initialAccount")]
    pub initial_account_value: Money,
    #[serde(default)]
    pub trades: Vec<Trade>,
    /// Defaults to today's local date
    #[serde(default, rename = "asOf")]
    pub as_of: Option<NaiveDate>,
}

/// Dashboard figures for the whole journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSummary {
    pub as_of: NaiveDate,
    pub initial_account_value: Money,
    pub account_value: Money,
    pub total_profit_loss: Money,
    /// Total P/L against the current baseline
    pub percentage_change: Percent,
    pub this_month_profit_loss: Money,
    pub this_year_profit_loss: Money,
    pub win_rate: Percent,
    pub average_risk_reward: Ratio,
    pub num_trades: u32,
    pub num_wins: u32,
    pub num_losses: u32,
    pub num_breakevens: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn summarize(
    trades: &[Trade],
    initial_account_value: Money,
    as_of: NaiveDate,
) -> JournalResult<JournalSummary> {
    if initial_account_value.is_zero() {
        return Err(JournalError::DivisionByZero {
            context: "account percentage change (initial account is zero)".into(),
        });
    }

    // Amounts arrive from user-edited JSON, so every sum is overflow-checked.
    let amount_total = |period: Option<Period>| {
        checked_sum(
            trades
                .iter()
                .filter(|t| period.map_or(true, |p| p.contains(t.date)))
                .map(|t| t.realized_amount),
        )
        .ok_or_else(|| JournalError::out_of_range("profitLossAmount"))
    };

    let total_profit_loss = amount_total(None)?;
    let value = initial_account_value
        .checked_add(total_profit_loss)
        .ok_or_else(|| JournalError::out_of_range("profitLossAmount"))?;
    let percentage_change = percent_of(total_profit_loss, initial_account_value)
        .ok_or_else(|| JournalError::out_of_range("initialAccount"))?;

    let average_risk_reward = if trades.is_empty() {
        Ratio::ZERO
    } else {
        let total_r = trades
            .iter()
            .try_fold(Ratio::ZERO, |acc, t| {
                acc.checked_add(checked_achieved_risk_reward(t)?)
            })
            .ok_or_else(|| JournalError::out_of_range("tp.rr"))?;
        total_r / Ratio::from(trades.len() as u64)
    };
    let counts = status_counts(trades);

    Ok(JournalSummary {
        as_of,
        initial_account_value,
        account_value: value,
        total_profit_loss,
        percentage_change,
        this_month_profit_loss: amount_total(Some(Period::containing(PeriodKind::Month, as_of)))?,
        this_year_profit_loss: amount_total(Some(Period::containing(PeriodKind::Year, as_of)))?,
        win_rate: win_rate(trades),
        average_risk_reward,
        num_trades: trades.len() as u32,
        num_wins: counts.wins,
        num_losses: counts.losses,
        num_breakevens: counts.breakevens,
    })
}

/// Envelope form of [`summarize`].
pub fn compute_statistics(
    input: &StatisticsInput,
) -> JournalResult<ComputationOutput<JournalSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let as_of = input
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mismatched = input
        .trades
        .iter()
        .filter(|t| t.status != TradeStatus::from_amount(t.realized_amount))
        .count();
    if mismatched > 0 {
        warnings.push(format!(
            "{mismatched} trade(s) have a status that disagrees with the sign of their P/L; \
             win rate and average R use the recorded status"
        ));
    }

    let summary = summarize(&input.trades, input.initial_account_value, as_of)?;

    let assumptions = serde_json::json!({
        "percentage_base": "current initial account value",
        "loss_r": -1,
        "breakeven_r": 0,
    });

    Ok(with_metadata(
        "Status-based win rate and achieved R; calendar-bucketed realized P/L",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        summary,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::{TakeProfitLeg, TradeDraft, TradeId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn trade(date: &str, amount: Money, status: TradeStatus) -> Trade {
        TradeDraft {
            date: date.parse().unwrap(),
            pair: "EURUSD".into(),
            take_profit_1: TakeProfitLeg::new(dec!(2), dec!(100), status == TradeStatus::Win),
            realized_amount: amount,
            status,
            ..TradeDraft::default()
        }
        .into_trade(TradeId::from(date))
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn test_summary_figures() {
        let trades = vec![
            trade("2024-12-01", dec!(50000), TradeStatus::Win),
            trade("2025-01-05", dec!(-10000), TradeStatus::Loss),
            trade("2025-03-02", dec!(20000), TradeStatus::Win),
            trade("2025-03-10", dec!(0), TradeStatus::Breakeven),
        ];
        let s = summarize(&trades, dec!(100000000), as_of()).unwrap();
        assert_eq!(s.account_value, dec!(100060000));
        assert_eq!(s.total_profit_loss, dec!(60000));
        assert_eq!(s.percentage_change, dec!(0.06));
        assert_eq!(s.this_month_profit_loss, dec!(20000));
        assert_eq!(s.this_year_profit_loss, dec!(10000));
        assert_eq!(s.win_rate, dec!(50));
        // (2 - 1 + 2 + 0) / 4
        assert_eq!(s.average_risk_reward, dec!(0.75));
        assert_eq!(s.num_trades, 4);
        assert_eq!(s.num_breakevens, 1);
    }

    #[test]
    fn test_empty_journal() {
        let s = summarize(&[], dec!(100000000), as_of()).unwrap();
        assert_eq!(s.account_value, dec!(100000000));
        assert_eq!(s.win_rate, Decimal::ZERO);
        assert_eq!(s.average_risk_reward, Decimal::ZERO);
        assert_eq!(s.percentage_change, Decimal::ZERO);
    }

    #[test]
    fn test_zero_baseline_fails() {
        assert!(matches!(
            summarize(&[], Decimal::ZERO, as_of()),
            Err(JournalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_overflowing_amounts_are_an_error_not_a_panic() {
        let trades = vec![
            trade("2025-03-01", Decimal::MAX, TradeStatus::Win),
            trade("2025-03-02", Decimal::MAX, TradeStatus::Win),
        ];
        assert!(matches!(
            summarize(&trades, dec!(1000), as_of()),
            Err(JournalError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_envelope_flags_overridden_status() {
        let input = StatisticsInput {
            initial_account_value: dec!(1000),
            trades: vec![trade("2025-03-01", dec!(10), TradeStatus::Loss)],
            as_of: Some(as_of()),
        };
        let out = compute_statistics(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.win_rate, Decimal::ZERO);
    }
}
