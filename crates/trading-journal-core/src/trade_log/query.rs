use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::JournalError;
use crate::trade::Trade;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    #[default]
    Date,
    ProfitLossAmount,
    ProfitLossPercentage,
    Margin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortField {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "date" => Ok(SortField::Date),
            "profit-loss-amount" | "amount" | "pnl" => Ok(SortField::ProfitLossAmount),
            "profit-loss-percentage" | "percentage" | "pct" => {
                Ok(SortField::ProfitLossPercentage)
            }
            "margin" => Ok(SortField::Margin),
            other => Err(JournalError::invalid(
                "sort",
                format!(
                    "Unknown sort field '{other}'. Use: date, profit-loss-amount, \
                     profit-loss-percentage, margin"
                ),
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(JournalError::invalid(
                "order",
                format!("Unknown sort order '{other}'. Use: asc, desc"),
            )),
        }
    }
}

/// Filter and ordering for the trade log view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeQuery {
    /// Case-insensitive substring matched against pair, setup tag and notes
    pub search: Option<String>,
    pub sort_field: SortField,
    pub order: SortOrder,
}

impl TradeQuery {
    pub fn matches(&self, trade: &Trade) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [&trade.pair, &trade.setup_tag, &trade.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn compare(&self, a: &Trade, b: &Trade) -> Ordering {
        let ord = match self.sort_field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::ProfitLossAmount => a.realized_amount.cmp(&b.realized_amount),
            SortField::ProfitLossPercentage => a.realized_percentage.cmp(&b.realized_percentage),
            SortField::Margin => a.margin.cmp(&b.margin),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Matching trades in query order. Ties keep insertion order.
pub fn query_trades<'a>(trades: &'a [Trade], query: &TradeQuery) -> Vec<&'a Trade> {
    let mut rows: Vec<&Trade> = trades.iter().filter(|t| query.matches(t)).collect();
    rows.sort_by(|a, b| query.compare(a, b));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::{TradeDraft, TradeId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn trade(id: &str, date: &str, pair: &str, notes: &str, amount: Decimal) -> Trade {
        TradeDraft {
            date: date.parse().unwrap(),
            pair: pair.into(),
            setup_tag: "OB".into(),
            notes: notes.into(),
            realized_amount: amount,
            ..TradeDraft::default()
        }
        .into_trade(TradeId::from(id))
    }

    fn book() -> Vec<Trade> {
        vec![
            trade("1", "2024-01-02", "EURUSD", "clean entry", dec!(100)),
            trade("2", "2024-01-01", "XAUUSD", "news spike", dec!(-50)),
            trade("3", "2024-01-03", "GBPUSD", "", dec!(100)),
        ]
    }

    fn ids(rows: &[&Trade]) -> Vec<String> {
        rows.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let trades = book();
        let rows = query_trades(&trades, &TradeQuery::default());
        assert_eq!(ids(&rows), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_pair_setup_and_notes() {
        let trades = book();
        let by_pair = TradeQuery {
            search: Some("usd".into()),
            ..TradeQuery::default()
        };
        assert_eq!(query_trades(&trades, &by_pair).len(), 3);

        let by_notes = TradeQuery {
            search: Some("NEWS".into()),
            ..TradeQuery::default()
        };
        assert_eq!(ids(&query_trades(&trades, &by_notes)), vec!["2"]);

        let by_setup = TradeQuery {
            search: Some("ob".into()),
            ..TradeQuery::default()
        };
        assert_eq!(query_trades(&trades, &by_setup).len(), 3);
    }

    #[test]
    fn test_sort_by_amount_ascending_keeps_ties_stable() {
        let trades = book();
        let q = TradeQuery {
            sort_field: SortField::ProfitLossAmount,
            order: SortOrder::Asc,
            ..TradeQuery::default()
        };
        assert_eq!(ids(&query_trades(&trades, &q)), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("pnl".parse::<SortField>().unwrap(), SortField::ProfitLossAmount);
        assert_eq!(
            "profit_loss_percentage".parse::<SortField>().unwrap(),
            SortField::ProfitLossPercentage
        );
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
