use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trade::{Trade, TradeStatus};
use crate::types::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
}

impl StatusCounts {
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.breakevens
    }
}

/// Count trades by their recorded status.
pub fn status_counts(trades: &[Trade]) -> StatusCounts {
    trades.iter().fold(StatusCounts::default(), |mut acc, t| {
        match t.status {
            TradeStatus::Win => acc.wins += 1,
            TradeStatus::Loss => acc.losses += 1,
            TradeStatus::Breakeven => acc.breakevens += 1,
        }
        acc
    })
}

/// Share of trades with status Win, as a percentage. Zero for no trades.
pub fn win_rate(trades: &[Trade]) -> Percent {
    if trades.is_empty() {
        return Decimal::ZERO;
    }
    let wins = status_counts(trades).wins;
    Decimal::from(wins) / Decimal::from(trades.len() as u64) * Decimal::ONE_HUNDRED
}

/// R achieved by a trade, judged by its recorded status rather than its
/// realized amount: wins count the hit take-profit legs, losses count -1R.
pub fn achieved_risk_reward(trade: &Trade) -> Ratio {
    match trade.status {
        TradeStatus::Win => trade.take_profit_1.achieved_r() + trade.take_profit_2.achieved_r(),
        TradeStatus::Loss => Decimal::NEGATIVE_ONE,
        TradeStatus::Breakeven => Decimal::ZERO,
    }
}

/// [`achieved_risk_reward`], `None` on overflow.
pub(crate) fn checked_achieved_risk_reward(trade: &Trade) -> Option<Ratio> {
    match trade.status {
        TradeStatus::Win => trade
            .take_profit_1
            .checked_achieved_r()?
            .checked_add(trade.take_profit_2.checked_achieved_r()?),
        TradeStatus::Loss => Some(Decimal::NEGATIVE_ONE),
        TradeStatus::Breakeven => Some(Decimal::ZERO),
    }
}

/// Mean achieved R across all trades. Zero for no trades.
pub fn average_risk_reward(trades: &[Trade]) -> Ratio {
    if trades.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = trades.iter().map(achieved_risk_reward).sum();
    total / Decimal::from(trades.len() as u64)
}

pub fn total_profit_loss(trades: &[Trade]) -> Money {
    trades.iter().map(|t| t.realized_amount).sum()
}

/// Baseline plus every realized amount.
pub fn account_value(trades: &[Trade], initial_account_value: Money) -> Money {
    initial_account_value + total_profit_loss(trades)
}
