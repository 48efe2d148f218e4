use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;
use crate::types::*;
use crate::JournalResult;

// ---------------------------------------------------------------------------
// Identity and classification
// ---------------------------------------------------------------------------

/// Stable trade identifier, assigned by the journal at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        TradeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        TradeId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    Win,
    Loss,
    #[serde(rename = "BE", alias = "Breakeven")]
    Breakeven,
}

impl TradeStatus {
    /// Classification by the sign of a realized amount.
    pub fn from_amount(amount: Money) -> Self {
        if amount > Decimal::ZERO {
            TradeStatus::Win
        } else if amount < Decimal::ZERO {
            TradeStatus::Loss
        } else {
            TradeStatus::Breakeven
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Win => f.write_str("Win"),
            TradeStatus::Loss => f.write_str("Loss"),
            TradeStatus::Breakeven => f.write_str("BE"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(TradeStatus::Win),
            "loss" => Ok(TradeStatus::Loss),
            "be" | "breakeven" => Ok(TradeStatus::Breakeven),
            other => Err(JournalError::invalid(
                "status",
                format!("'{other}' is not one of Win, Loss, BE"),
            )),
        }
    }
}

/// Labels offered by the entry form. `psychology` stays free text, so
/// anything else is accepted too.
pub const PSYCHOLOGY_LABELS: [&str; 6] = [
    "FOMO",
    "Confident",
    "Worried",
    "Neutral",
    "Impatient",
    "Disciplined",
];

// ---------------------------------------------------------------------------
// Exit structure
// ---------------------------------------------------------------------------

/// A partial position-close target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitLeg {
    #[serde(rename = "rr")]
    pub risk_reward_ratio: Ratio,
    /// Share of the position closed at this leg, 0-100
    #[serde(rename = "percentage")]
    pub close_percentage: Percent,
    pub hit: bool,
}

impl TakeProfitLeg {
    pub fn new(risk_reward_ratio: Ratio, close_percentage: Percent, hit: bool) -> Self {
        Self {
            risk_reward_ratio,
            close_percentage,
            hit,
        }
    }

    /// R achieved by this leg when hit, weighted by the share it closed.
    pub fn achieved_r(&self) -> Ratio {
        if self.hit {
            self.risk_reward_ratio * self.close_percentage / Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// [`achieved_r`](Self::achieved_r), `None` on overflow.
    pub fn checked_achieved_r(&self) -> Option<Ratio> {
        if self.hit {
            self.risk_reward_ratio
                .checked_mul(self.close_percentage)
                .map(|r| r / Decimal::ONE_HUNDRED)
        } else {
            Some(Decimal::ZERO)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLoss {
    /// Percentage of the trade's margin put at risk
    #[serde(rename = "percentage")]
    pub risk_percentage: Percent,
    pub hit: bool,
}

impl StopLoss {
    pub fn new(risk_percentage: Percent, hit: bool) -> Self {
        Self {
            risk_percentage,
            hit,
        }
    }
}

// ---------------------------------------------------------------------------
// Trade record
// ---------------------------------------------------------------------------

/// One journal entry. Field names on the wire follow the browser build's
/// persisted format so its exports load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub date: NaiveDate,
    pub pair: String,
    #[serde(rename = "htfTrend", default)]
    pub htf_trend: String,
    #[serde(rename = "ictSetup", alias = "setupTag", default)]
    pub setup_tag: String,
    pub margin: Money,
    #[serde(rename = "expectedRR")]
    pub expected_risk_reward: Ratio,
    #[serde(rename = "tp1")]
    pub take_profit_1: TakeProfitLeg,
    #[serde(rename = "tp2")]
    pub take_profit_2: TakeProfitLeg,
    #[serde(rename = "sl")]
    pub stop_loss: StopLoss,
    /// Signed, relative to the account baseline rather than the margin
    #[serde(rename = "profitLossPercentage", default)]
    pub realized_percentage: Percent,
    #[serde(rename = "profitLossAmount", default)]
    pub realized_amount: Money,
    /// May disagree with the sign of `realized_amount` after a manual edit.
    pub status: TradeStatus,
    #[serde(default)]
    pub psychology: String,
    #[serde(default)]
    pub notes: String,
    /// Inline screenshot, usually a base64 data URL
    #[serde(rename = "image", default)]
    pub chart_image: Option<String>,
}

impl Trade {
    pub fn validate(&self) -> JournalResult<()> {
        validate_fields(
            &self.pair,
            self.margin,
            self.expected_risk_reward,
            &self.take_profit_1,
            &self.take_profit_2,
            &self.stop_loss,
        )
    }

    /// Merge every field present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: TradePatch) {
        let TradePatch {
            date,
            pair,
            htf_trend,
            setup_tag,
            margin,
            expected_risk_reward,
            take_profit_1,
            take_profit_2,
            stop_loss,
            realized_percentage,
            realized_amount,
            status,
            psychology,
            notes,
            chart_image,
        } = patch;

        if let Some(v) = date {
            self.date = v;
        }
        if let Some(v) = pair {
            self.pair = v;
        }
        if let Some(v) = htf_trend {
            self.htf_trend = v;
        }
        if let Some(v) = setup_tag {
            self.setup_tag = v;
        }
        if let Some(v) = margin {
            self.margin = v;
        }
        if let Some(v) = expected_risk_reward {
            self.expected_risk_reward = v;
        }
        if let Some(v) = take_profit_1 {
            self.take_profit_1 = v;
        }
        if let Some(v) = take_profit_2 {
            self.take_profit_2 = v;
        }
        if let Some(v) = stop_loss {
            self.stop_loss = v;
        }
        if let Some(v) = realized_percentage {
            self.realized_percentage = v;
        }
        if let Some(v) = realized_amount {
            self.realized_amount = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = psychology {
            self.psychology = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = chart_image {
            self.chart_image = v;
        }
    }
}

/// A trade before the journal has assigned it an id.
///
/// Missing fields in JSON fall back to the entry form's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeDraft {
    pub date: NaiveDate,
    pub pair: String,
    #[serde(rename = "htfTrend")]
    pub htf_trend: String,
    #[serde(rename = "ictSetup", alias = "setupTag")]
    pub setup_tag: String,
    pub margin: Money,
    #[serde(rename = "expectedRR")]
    pub expected_risk_reward: Ratio,
    #[serde(rename = "tp1")]
    pub take_profit_1: TakeProfitLeg,
    #[serde(rename = "tp2")]
    pub take_profit_2: TakeProfitLeg,
    #[serde(rename = "sl")]
    pub stop_loss: StopLoss,
    #[serde(rename = "profitLossPercentage")]
    pub realized_percentage: Percent,
    #[serde(rename = "profitLossAmount")]
    pub realized_amount: Money,
    pub status: TradeStatus,
    pub psychology: String,
    pub notes: String,
    #[serde(rename = "image")]
    pub chart_image: Option<String>,
}

impl Default for TradeDraft {
    fn default() -> Self {
        Self {
            date: chrono::Local::now().date_naive(),
            pair: String::new(),
            htf_trend: String::new(),
            setup_tag: String::new(),
            margin: dec!(1000000),
            expected_risk_reward: dec!(2),
            take_profit_1: TakeProfitLeg::new(dec!(1), dec!(50), false),
            take_profit_2: TakeProfitLeg::new(dec!(2), dec!(50), false),
            stop_loss: StopLoss::new(dec!(1), false),
            realized_percentage: Decimal::ZERO,
            realized_amount: Decimal::ZERO,
            status: TradeStatus::Win,
            psychology: "Confident".to_string(),
            notes: String::new(),
            chart_image: None,
        }
    }
}

impl TradeDraft {
    pub fn validate(&self) -> JournalResult<()> {
        validate_fields(
            &self.pair,
            self.margin,
            self.expected_risk_reward,
            &self.take_profit_1,
            &self.take_profit_2,
            &self.stop_loss,
        )
    }

    pub fn into_trade(self, id: TradeId) -> Trade {
        Trade {
            id,
            date: self.date,
            pair: self.pair,
            htf_trend: self.htf_trend,
            setup_tag: self.setup_tag,
            margin: self.margin,
            expected_risk_reward: self.expected_risk_reward,
            take_profit_1: self.take_profit_1,
            take_profit_2: self.take_profit_2,
            stop_loss: self.stop_loss,
            realized_percentage: self.realized_percentage,
            realized_amount: self.realized_amount,
            status: self.status,
            psychology: self.psychology,
            notes: self.notes,
            chart_image: self.chart_image,
        }
    }
}

impl From<Trade> for TradeDraft {
    fn from(t: Trade) -> Self {
        Self {
            date: t.date,
            pair: t.pair,
            htf_trend: t.htf_trend,
            setup_tag: t.setup_tag,
            margin: t.margin,
            expected_risk_reward: t.expected_risk_reward,
            take_profit_1: t.take_profit_1,
            take_profit_2: t.take_profit_2,
            stop_loss: t.stop_loss,
            realized_percentage: t.realized_percentage,
            realized_amount: t.realized_amount,
            status: t.status,
            psychology: t.psychology,
            notes: t.notes,
            chart_image: t.chart_image,
        }
    }
}

/// Partial update. `None` leaves the field as it is.
///
/// `chart_image` has three states: absent keeps the image, `null` clears it,
/// a string replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<String>,
    #[serde(rename = "htfTrend", skip_serializing_if = "Option::is_none")]
    pub htf_trend: Option<String>,
    #[serde(
        rename = "ictSetup",
        alias = "setupTag",
        skip_serializing_if = "Option::is_none"
    )]
    pub setup_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Money>,
    #[serde(rename = "expectedRR", skip_serializing_if = "Option::is_none")]
    pub expected_risk_reward: Option<Ratio>,
    #[serde(rename = "tp1", skip_serializing_if = "Option::is_none")]
    pub take_profit_1: Option<TakeProfitLeg>,
    #[serde(rename = "tp2", skip_serializing_if = "Option::is_none")]
    pub take_profit_2: Option<TakeProfitLeg>,
    #[serde(rename = "sl", skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<StopLoss>,
    #[serde(rename = "profitLossPercentage", skip_serializing_if = "Option::is_none")]
    pub realized_percentage: Option<Percent>,
    #[serde(rename = "profitLossAmount", skip_serializing_if = "Option::is_none")]
    pub realized_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TradeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psychology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "image",
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub chart_image: Option<Option<String>>,
}

impl TradePatch {
    pub fn is_empty(&self) -> bool {
        *self == TradePatch::default()
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_fields(
    pair: &str,
    margin: Money,
    expected_risk_reward: Ratio,
    tp1: &TakeProfitLeg,
    tp2: &TakeProfitLeg,
    sl: &StopLoss,
) -> JournalResult<()> {
    if pair.trim().is_empty() {
        return Err(JournalError::invalid("pair", "Pair is required"));
    }
    if margin <= Decimal::ZERO {
        return Err(JournalError::invalid("margin", "Margin must be positive"));
    }
    if expected_risk_reward <= Decimal::ZERO {
        return Err(JournalError::invalid(
            "expectedRR",
            "Expected risk-reward must be positive",
        ));
    }
    if sl.risk_percentage <= Decimal::ZERO {
        return Err(JournalError::invalid(
            "sl.percentage",
            "Stop-loss risk percentage must be positive",
        ));
    }
    for (name, leg) in [("tp1", tp1), ("tp2", tp2)] {
        if leg.risk_reward_ratio <= Decimal::ZERO {
            return Err(JournalError::invalid(
                &format!("{name}.rr"),
                "Risk-reward ratio must be positive",
            ));
        }
        if leg.close_percentage < Decimal::ZERO || leg.close_percentage > Decimal::ONE_HUNDRED {
            return Err(JournalError::invalid(
                &format!("{name}.percentage"),
                "Close percentage must be between 0 and 100",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legacy_json() -> &'static str {
        r#"{
            "id": "1718000000000",
            "date": "2024-06-10",
            "pair": "EURUSD",
            "htfTrend": "Bullish",
            "ictSetup": "FVG",
            "margin": 1000000,
            "expectedRR": 2,
            "tp1": { "rr": 1, "percentage": 50, "hit": true },
            "tp2": { "rr": 2, "percentage": 50, "hit": false },
            "sl": { "percentage": 1, "hit": false },
            "profitLossPercentage": 0.005,
            "profitLossAmount": 5000,
            "status": "BE",
            "psychology": "Neutral",
            "notes": "partial",
            "image": null
        }"#
    }

    #[test]
    fn test_legacy_field_names_deserialize() {
        let trade: Trade = serde_json::from_str(legacy_json()).unwrap();
        assert_eq!(trade.id.as_str(), "1718000000000");
        assert_eq!(trade.setup_tag, "FVG");
        assert_eq!(trade.take_profit_1.close_percentage, dec!(50));
        assert_eq!(trade.stop_loss.risk_percentage, dec!(1));
        assert_eq!(trade.realized_percentage, dec!(0.005));
        assert_eq!(trade.status, TradeStatus::Breakeven);
        assert_eq!(trade.chart_image, None);
    }

    #[test]
    fn test_trade_json_round_trip_is_exact() {
        let mut trade: Trade = serde_json::from_str(legacy_json()).unwrap();
        trade.chart_image = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);
    }

    #[test]
    fn test_missing_profit_loss_amount_defaults_to_zero() {
        let json = legacy_json().replace("\"profitLossAmount\": 5000,", "");
        let trade: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.realized_amount, Decimal::ZERO);
    }

    #[test]
    fn test_status_from_amount() {
        assert_eq!(TradeStatus::from_amount(dec!(1)), TradeStatus::Win);
        assert_eq!(TradeStatus::from_amount(dec!(-0.01)), TradeStatus::Loss);
        assert_eq!(TradeStatus::from_amount(Decimal::ZERO), TradeStatus::Breakeven);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("be".parse::<TradeStatus>().unwrap(), TradeStatus::Breakeven);
        assert_eq!("Breakeven".parse::<TradeStatus>().unwrap(), TradeStatus::Breakeven);
        assert_eq!("WIN".parse::<TradeStatus>().unwrap(), TradeStatus::Win);
        assert!("draw".parse::<TradeStatus>().is_err());
        assert_eq!(TradeStatus::Breakeven.to_string(), "BE");
    }

    #[test]
    fn test_achieved_r_only_counts_hit_legs() {
        assert_eq!(TakeProfitLeg::new(dec!(2), dec!(50), true).achieved_r(), dec!(1));
        assert_eq!(
            TakeProfitLeg::new(dec!(2), dec!(50), false).achieved_r(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_draft_defaults_match_entry_form() {
        let draft = TradeDraft::default();
        assert_eq!(draft.margin, dec!(1000000));
        assert_eq!(draft.expected_risk_reward, dec!(2));
        assert_eq!(draft.take_profit_1, TakeProfitLeg::new(dec!(1), dec!(50), false));
        assert_eq!(draft.take_profit_2, TakeProfitLeg::new(dec!(2), dec!(50), false));
        assert_eq!(draft.stop_loss, StopLoss::new(dec!(1), false));
        assert_eq!(draft.status, TradeStatus::Win);
        assert_eq!(draft.psychology, "Confident");
    }

    #[test]
    fn test_draft_from_partial_json_uses_defaults() {
        let draft: TradeDraft =
            serde_json::from_str(r#"{"pair": "GBPUSD", "date": "2024-03-01"}"#).unwrap();
        assert_eq!(draft.pair, "GBPUSD");
        assert_eq!(draft.margin, dec!(1000000));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_drafts() {
        let empty_pair = TradeDraft::default();
        assert!(matches!(
            empty_pair.validate(),
            Err(JournalError::InvalidInput { ref field, .. }) if field == "pair"
        ));

        let mut zero_margin = TradeDraft {
            pair: "XAUUSD".into(),
            ..TradeDraft::default()
        };
        zero_margin.margin = Decimal::ZERO;
        assert!(zero_margin.validate().is_err());

        let mut over_close = TradeDraft {
            pair: "XAUUSD".into(),
            ..TradeDraft::default()
        };
        over_close.take_profit_2.close_percentage = dec!(120);
        assert!(matches!(
            over_close.validate(),
            Err(JournalError::InvalidInput { ref field, .. }) if field == "tp2.percentage"
        ));
    }

    #[test]
    fn test_patch_image_tri_state() {
        let keep: TradePatch = serde_json::from_str(r#"{"notes": "x"}"#).unwrap();
        assert_eq!(keep.chart_image, None);

        let clear: TradePatch = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(clear.chart_image, Some(None));

        let replace: TradePatch = serde_json::from_str(r#"{"image": "data:x"}"#).unwrap();
        assert_eq!(replace.chart_image, Some(Some("data:x".to_string())));
    }

    #[test]
    fn test_apply_patch_replaces_legs_whole() {
        let mut trade: Trade = serde_json::from_str(legacy_json()).unwrap();
        let patch = TradePatch {
            take_profit_2: Some(TakeProfitLeg::new(dec!(3), dec!(25), true)),
            ..TradePatch::default()
        };
        trade.apply_patch(patch);
        assert_eq!(trade.take_profit_2, TakeProfitLeg::new(dec!(3), dec!(25), true));
        assert_eq!(trade.take_profit_1, TakeProfitLeg::new(dec!(1), dec!(50), true));
    }
}
