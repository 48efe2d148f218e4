use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::JournalError;
use crate::trade::Trade;
use crate::types::Money;
use crate::JournalResult;

/// Starting capital of a fresh journal, in the account currency.
pub const DEFAULT_INITIAL_ACCOUNT: Money = dec!(100000000);

/// Everything the journal persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "initialAccount", alias = "initialAccountValue")]
    pub initial_account_value: Money,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            initial_account_value: DEFAULT_INITIAL_ACCOUNT,
            trades: Vec::new(),
        }
    }
}

/// The browser build persisted `{"state": {...}, "version": 0}`.
#[derive(Deserialize)]
struct LegacyEnvelope {
    state: Snapshot,
}

impl Snapshot {
    /// Parse either a bare snapshot or the browser build's wrapped export.
    pub fn from_legacy_json(json: &str) -> JournalResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let snapshot = if value.get("state").is_some() {
            serde_json::from_value::<LegacyEnvelope>(value)?.state
        } else {
            serde_json::from_value::<Snapshot>(value)?
        };
        Ok(snapshot)
    }

    /// Checks that hold for any snapshot the journal accepts wholesale.
    pub fn validate(&self) -> JournalResult<()> {
        if self.initial_account_value <= Decimal::ZERO {
            return Err(JournalError::invalid(
                "initialAccount",
                "Initial account must be positive",
            ));
        }
        let mut seen = HashSet::new();
        for trade in &self.trades {
            if !seen.insert(trade.id.as_str()) {
                return Err(JournalError::invalid(
                    "trades",
                    format!("Duplicate trade id '{}'", trade.id),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADE: &str = r#"{
        "id": "1",
        "date": "2024-03-01",
        "pair": "EURUSD",
        "htfTrend": "",
        "ictSetup": "",
        "margin": 1000000,
        "expectedRR": 2,
        "tp1": { "rr": 1, "percentage": 50, "hit": false },
        "tp2": { "rr": 2, "percentage": 50, "hit": false },
        "sl": { "percentage": 1, "hit": true },
        "profitLossPercentage": -0.01,
        "profitLossAmount": -10000,
        "status": "Loss",
        "psychology": "FOMO",
        "notes": "",
        "image": null
    }"#;

    #[test]
    fn test_wrapped_browser_export() {
        let json = format!(
            r#"{{"state": {{"initialAccount": 50000000, "trades": [{TRADE}]}}, "version": 0}}"#
        );
        let snap = Snapshot::from_legacy_json(&json).unwrap();
        assert_eq!(snap.initial_account_value, dec!(50000000));
        assert_eq!(snap.trades.len(), 1);
        assert_eq!(snap.trades[0].realized_amount, dec!(-10000));
    }

    #[test]
    fn test_bare_snapshot() {
        let json = format!(r#"{{"initialAccount": "1000", "trades": [{TRADE}]}}"#);
        let snap = Snapshot::from_legacy_json(&json).unwrap();
        assert_eq!(snap.initial_account_value, dec!(1000));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            Snapshot::from_legacy_json("{not json"),
            Err(JournalError::SerializationError(_))
        ));
    }

    #[test]
    fn test_default() {
        let snap = Snapshot::default();
        assert_eq!(snap.initial_account_value, dec!(100000000));
        assert!(snap.trades.is_empty());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let json = format!(r#"{{"initialAccount": 1000, "trades": [{TRADE}, {TRADE}]}}"#);
        let snap = Snapshot::from_legacy_json(&json).unwrap();
        assert!(snap.validate().is_err());
    }
}
