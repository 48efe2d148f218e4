use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;
use crate::trade::Trade;
use crate::types::Money;
use crate::JournalResult;

/// Calendar granularity used for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Day,
    Month,
    Year,
}

impl PeriodKind {
    /// Bucket key for a trade date: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub fn key(&self, date: NaiveDate) -> String {
        match self {
            PeriodKind::Day => date.format("%Y-%m-%d").to_string(),
            PeriodKind::Month => format!("{:04}-{:02}", date.year(), date.month()),
            PeriodKind::Year => format!("{:04}", date.year()),
        }
    }
}

impl FromStr for PeriodKind {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(PeriodKind::Day),
            "month" | "monthly" => Ok(PeriodKind::Month),
            "year" | "yearly" => Ok(PeriodKind::Year),
            other => Err(JournalError::invalid(
                "period",
                format!("Unknown period '{other}'. Use: day, month, year"),
            )),
        }
    }
}

/// One concrete calendar bucket. Months are 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Period {
    pub fn month(year: i32, month: u32) -> JournalResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(JournalError::DateError(format!(
                "month {month} is outside 1-12"
            )));
        }
        Ok(Period::Month { year, month })
    }

    /// Parse `value` at the granularity of `kind`.
    pub fn parse(kind: PeriodKind, value: &str) -> JournalResult<Self> {
        let value = value.trim();
        let bad = || JournalError::DateError(format!("'{value}' is not a valid {kind} value"));
        match kind {
            PeriodKind::Day => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Period::Day)
                .map_err(|_| bad()),
            PeriodKind::Month => {
                let (y, m) = value.split_once('-').ok_or_else(bad)?;
                let year = y.parse::<i32>().map_err(|_| bad())?;
                let month = m.parse::<u32>().map_err(|_| bad())?;
                Period::month(year, month).map_err(|_| bad())
            }
            PeriodKind::Year => value.parse::<i32>().map(Period::Year).map_err(|_| bad()),
        }
    }

    /// The period containing `date`.
    pub fn containing(kind: PeriodKind, date: NaiveDate) -> Self {
        match kind {
            PeriodKind::Day => Period::Day(date),
            PeriodKind::Month => Period::Month {
                year: date.year(),
                month: date.month(),
            },
            PeriodKind::Year => Period::Year(date.year()),
        }
    }

    pub fn kind(&self) -> PeriodKind {
        match self {
            Period::Day(_) => PeriodKind::Day,
            Period::Month { .. } => PeriodKind::Month,
            Period::Year(_) => PeriodKind::Year,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::Day(d) => d == date,
            Period::Month { year, month } => date.year() == year && date.month() == month,
            Period::Year(year) => date.year() == year,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Day => f.write_str("day"),
            PeriodKind::Month => f.write_str("month"),
            PeriodKind::Year => f.write_str("year"),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Period::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Period::Year(year) => write!(f, "{year:04}"),
        }
    }
}

/// Sum of realized amounts for trades dated inside `period`.
pub fn period_profit_loss(trades: &[Trade], period: Period) -> Money {
    trades
        .iter()
        .filter(|t| period.contains(t.date))
        .map(|t| t.realized_amount)
        .sum::<Decimal>()
}

/// Partition trades by bucket key. Every trade lands in exactly one bucket;
/// within a bucket the input order is kept.
pub fn group_by_period(trades: &[Trade], kind: PeriodKind) -> HashMap<String, Vec<&Trade>> {
    let mut groups: HashMap<String, Vec<&Trade>> = HashMap::new();
    for trade in trades {
        groups.entry(kind.key(trade.date)).or_default().push(trade);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(PeriodKind::Day.key(d), "2024-03-01");
        assert_eq!(PeriodKind::Month.key(d), "2024-03");
        assert_eq!(PeriodKind::Year.key(d), "2024");
    }

    #[test]
    fn test_parse_round_trips_through_display() {
        for (kind, value) in [
            (PeriodKind::Day, "2025-01-31"),
            (PeriodKind::Month, "2025-01"),
            (PeriodKind::Year, "2025"),
        ] {
            assert_eq!(Period::parse(kind, value).unwrap().to_string(), value);
        }
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(Period::parse(PeriodKind::Month, "2024-13").is_err());
        assert!(Period::parse(PeriodKind::Month, "2024").is_err());
        assert!(Period::parse(PeriodKind::Year, "20x4").is_err());
        assert!(Period::parse(PeriodKind::Day, "2024-02-30").is_err());
    }

    #[test]
    fn test_contains() {
        let d = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
        assert!(Period::Year(2024).contains(d));
        assert!(Period::month(2024, 11).unwrap().contains(d));
        assert!(!Period::month(2024, 10).unwrap().contains(d));
        assert!(!Period::Day(NaiveDate::from_ymd_opt(2024, 11, 14).unwrap()).contains(d));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Monthly".parse::<PeriodKind>().unwrap(), PeriodKind::Month);
        assert!("week".parse::<PeriodKind>().is_err());
    }
}
