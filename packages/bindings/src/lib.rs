use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trading_journal_core::journal::Snapshot;
use trading_journal_core::statistics::{self, PeriodKind, StatisticsInput};
use trading_journal_core::trade_log::{self, TradeQuery};
use trading_journal_core::{Trade, TradeDraft};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn to_json(value: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// P/L
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_pnl(input_json: String) -> NapiResult<String> {
    let input: trading_journal_core::pnl::PnlInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = trading_journal_core::pnl::calculate_pnl(&input).map_err(to_napi_error)?;
    to_json(&output)
}

/// Checks a form submission. Returns the draft with defaults filled in.
#[napi]
pub fn validate_trade(draft_json: String) -> NapiResult<String> {
    let draft: TradeDraft = serde_json::from_str(&draft_json).map_err(to_napi_error)?;
    draft.validate().map_err(to_napi_error)?;
    to_json(&draft)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[napi]
pub fn journal_statistics(input_json: String) -> NapiResult<String> {
    let input: StatisticsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = statistics::compute_statistics(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct GroupInput {
    #[serde(default)]
    trades: Vec<Trade>,
    by: PeriodKind,
}

#[derive(Serialize)]
struct GroupBucket<'a> {
    period: &'a str,
    profit_loss: Decimal,
    trades: &'a [&'a Trade],
}

/// Buckets in chronological order. Sums are unchecked, so a panic on
/// overflow surfaces as a JS error.
#[napi(catch_unwind)]
pub fn group_trades_by_period(input_json: String) -> NapiResult<String> {
    let input: GroupInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let groups = statistics::group_by_period(&input.trades, input.by);

    let mut keys: Vec<&String> = groups.keys().collect();
    keys.sort();
    let buckets: Vec<GroupBucket<'_>> = keys
        .into_iter()
        .map(|key| {
            let trades = &groups[key];
            GroupBucket {
                period: key,
                profit_loss: trades.iter().map(|t| t.realized_amount).sum(),
                trades,
            }
        })
        .collect();
    to_json(&buckets)
}

#[derive(Deserialize)]
struct EquityCurveInput {
    #[serde(rename = "initialAccount")]
    initial_account_value: Decimal,
    #[serde(default)]
    trades: Vec<Trade>,
    by: PeriodKind,
}

#[napi(catch_unwind)]
pub fn equity_curve(input_json: String) -> NapiResult<String> {
    let input: EquityCurveInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let curve = statistics::equity_curve(&input.trades, input.initial_account_value, input.by);
    to_json(&curve)
}

#[derive(Deserialize)]
struct PeriodInput {
    #[serde(default)]
    trades: Vec<Trade>,
    kind: PeriodKind,
    date: NaiveDate,
}

/// P/L of the day, month or year containing `date`.
#[napi(catch_unwind)]
pub fn period_profit_loss(input_json: String) -> NapiResult<String> {
    let input: PeriodInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let period = statistics::Period::containing(input.kind, input.date);
    to_json(&statistics::period_profit_loss(&input.trades, period))
}

// ---------------------------------------------------------------------------
// Trade log
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryInput {
    #[serde(default)]
    trades: Vec<Trade>,
    #[serde(default)]
    query: TradeQuery,
}

#[napi]
pub fn query_trades(input_json: String) -> NapiResult<String> {
    let input: QueryInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    to_json(&trade_log::query_trades(&input.trades, &input.query))
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Normalize a stored or exported journal (bare or `{"state": ...}`) into a
/// validated snapshot.
#[napi]
pub fn parse_snapshot(json: String) -> NapiResult<String> {
    let snapshot = Snapshot::from_legacy_json(&json).map_err(to_napi_error)?;
    snapshot.validate().map_err(to_napi_error)?;
    to_json(&snapshot)
}
