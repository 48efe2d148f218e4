use chrono::Month;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::periods::{group_by_period, PeriodKind};
use crate::trade::Trade;
use crate::types::*;

/// Account value at the close of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub period: String,
    /// Chart label, e.g. "January 2025" for monthly buckets
    pub label: String,
    pub period_pnl: Money,
    pub num_trades: u32,
    pub account_value: Money,
}

/// Running account value: baseline plus cumulative bucket P/L, visiting
/// buckets in chronological order.
pub fn equity_curve(
    trades: &[Trade],
    initial_account_value: Money,
    kind: PeriodKind,
) -> Vec<EquityPoint> {
    let groups = group_by_period(trades, kind);

    // Zero-padded keys sort chronologically.
    let mut keys: Vec<&String> = groups.keys().collect();
    keys.sort();

    let mut running = initial_account_value;
    keys.into_iter()
        .map(|key| {
            let bucket = &groups[key];
            let period_pnl: Decimal = bucket.iter().map(|t| t.realized_amount).sum();
            running += period_pnl;
            EquityPoint {
                period: key.clone(),
                label: label_for(kind, key),
                period_pnl,
                num_trades: bucket.len() as u32,
                account_value: running,
            }
        })
        .collect()
}

fn label_for(kind: PeriodKind, key: &str) -> String {
    if kind != PeriodKind::Month {
        return key.to_string();
    }
    let Some((year, month)) = key.split_once('-') else {
        return key.to_string();
    };
    match month.parse::<u8>().ok().and_then(|m| Month::try_from(m).ok()) {
        Some(m) => format!("{} {year}", m.name()),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::{TradeDraft, TradeId};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn trade(date: (i32, u32, u32), amount: Money) -> Trade {
        TradeDraft {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            pair: "BTCUSDT".into(),
            realized_amount: amount,
            ..TradeDraft::default()
        }
        .into_trade(TradeId::from("x"))
    }

    #[test]
    fn test_monthly_curve_is_chronological_and_cumulative() {
        // Inserted out of order on purpose
        let trades = vec![
            trade((2025, 2, 3), dec!(-500)),
            trade((2024, 12, 30), dec!(1000)),
            trade((2025, 1, 10), dec!(200)),
            trade((2025, 1, 20), dec!(300)),
        ];
        let curve = equity_curve(&trades, dec!(10000), PeriodKind::Month);
        let periods: Vec<&str> = curve.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-12", "2025-01", "2025-02"]);
        assert_eq!(curve[0].account_value, dec!(11000));
        assert_eq!(curve[1].period_pnl, dec!(500));
        assert_eq!(curve[1].num_trades, 2);
        assert_eq!(curve[1].account_value, dec!(11500));
        assert_eq!(curve[2].account_value, dec!(11000));
        assert_eq!(curve[1].label, "January 2025");
        assert_eq!(curve[0].label, "December 2024");
    }

    #[test]
    fn test_yearly_labels_are_keys() {
        let trades = vec![trade((2023, 6, 1), dec!(5))];
        let curve = equity_curve(&trades, dec!(0), PeriodKind::Year);
        assert_eq!(curve[0].label, "2023");
        assert_eq!(curve[0].account_value, dec!(5));
    }

    #[test]
    fn test_empty_curve() {
        assert!(equity_curve(&[], dec!(100), PeriodKind::Day).is_empty());
    }
}
