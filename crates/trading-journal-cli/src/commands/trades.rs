use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use trading_journal_core::pnl::{realized_pnl, PnlInput};
use trading_journal_core::trade_log::{query_trades, SortField, SortOrder, TradeQuery};
use trading_journal_core::{
    Trade, TradeDraft, TradeId, TradePatch, TradeStatus, PSYCHOLOGY_LABELS,
};

use crate::config::JournalConfig;
use crate::input;

/// Per-field flags shared by `add` and `update`. Each one overrides the
/// matching field of the JSON input (or the entry form defaults).
#[derive(Args, Default)]
pub struct TradeFieldArgs {
    /// Trade date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Instrument, e.g. EURUSD
    #[arg(long)]
    pub pair: Option<String>,
    /// Higher-timeframe trend
    #[arg(long)]
    pub htf_trend: Option<String>,
    /// Setup tag
    #[arg(long)]
    pub setup: Option<String>,
    /// Position margin
    #[arg(long)]
    pub margin: Option<Decimal>,
    /// Planned risk-reward multiple
    #[arg(long)]
    pub expected_rr: Option<Decimal>,
    /// First target in R
    #[arg(long)]
    pub tp1_rr: Option<Decimal>,
    /// Percentage of the position closed at the first target
    #[arg(long)]
    pub tp1_pct: Option<Decimal>,
    /// Whether the first target was reached
    #[arg(long)]
    pub tp1_hit: Option<bool>,
    /// Second target in R
    #[arg(long)]
    pub tp2_rr: Option<Decimal>,
    /// Percentage of the position closed at the second target
    #[arg(long)]
    pub tp2_pct: Option<Decimal>,
    /// Whether the second target was reached
    #[arg(long)]
    pub tp2_hit: Option<bool>,
    /// Stop-loss distance as a percentage of the margin
    #[arg(long)]
    pub sl_pct: Option<Decimal>,
    /// Whether the stop was hit
    #[arg(long)]
    pub sl_hit: Option<bool>,
    /// Realized amount, when entered by hand
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Decimal>,
    /// Realized percentage of the account, when entered by hand
    #[arg(long, allow_hyphen_values = true)]
    pub percentage: Option<Decimal>,
    /// Win, Loss or BE
    #[arg(long)]
    pub status: Option<TradeStatus>,
    /// Psychology label, e.g. Confident or FOMO
    #[arg(long)]
    pub psychology: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Chart screenshot to embed
    #[arg(long)]
    pub image: Option<String>,
}

impl TradeFieldArgs {
    /// Fold the flags into `patch`. Partial leg flags merge onto the leg the
    /// patch already carries, else onto the one in `base`.
    fn fold_into(
        self,
        mut patch: TradePatch,
        base: &Trade,
    ) -> Result<TradePatch, Box<dyn std::error::Error>> {
        if self.tp1_rr.is_some() || self.tp1_pct.is_some() || self.tp1_hit.is_some() {
            let mut leg = patch
                .take_profit_1
                .take()
                .unwrap_or_else(|| base.take_profit_1.clone());
            leg.risk_reward_ratio = self.tp1_rr.unwrap_or(leg.risk_reward_ratio);
            leg.close_percentage = self.tp1_pct.unwrap_or(leg.close_percentage);
            leg.hit = self.tp1_hit.unwrap_or(leg.hit);
            patch.take_profit_1 = Some(leg);
        }
        if self.tp2_rr.is_some() || self.tp2_pct.is_some() || self.tp2_hit.is_some() {
            let mut leg = patch
                .take_profit_2
                .take()
                .unwrap_or_else(|| base.take_profit_2.clone());
            leg.risk_reward_ratio = self.tp2_rr.unwrap_or(leg.risk_reward_ratio);
            leg.close_percentage = self.tp2_pct.unwrap_or(leg.close_percentage);
            leg.hit = self.tp2_hit.unwrap_or(leg.hit);
            patch.take_profit_2 = Some(leg);
        }
        if self.sl_pct.is_some() || self.sl_hit.is_some() {
            let mut sl = patch
                .stop_loss
                .take()
                .unwrap_or_else(|| base.stop_loss.clone());
            sl.risk_percentage = self.sl_pct.unwrap_or(sl.risk_percentage);
            sl.hit = self.sl_hit.unwrap_or(sl.hit);
            patch.stop_loss = Some(sl);
        }

        if let Some(path) = self.image.as_deref() {
            patch.chart_image = Some(Some(input::image::read_data_url(path)?));
        }

        patch.date = self.date.or(patch.date);
        patch.pair = self.pair.or(patch.pair);
        patch.htf_trend = self.htf_trend.or(patch.htf_trend);
        patch.setup_tag = self.setup.or(patch.setup_tag);
        patch.margin = self.margin.or(patch.margin);
        patch.expected_risk_reward = self.expected_rr.or(patch.expected_risk_reward);
        patch.realized_amount = self.amount.or(patch.realized_amount);
        patch.realized_percentage = self.percentage.or(patch.realized_percentage);
        patch.status = self.status.or(patch.status);
        patch.psychology = self.psychology.or(patch.psychology);
        patch.notes = self.notes.or(patch.notes);

        Ok(patch)
    }
}

/// Arguments for recording a trade
#[derive(Args)]
pub struct AddArgs {
    /// Path to a JSON trade (missing fields take the form defaults)
    #[arg(long)]
    pub input: Option<String>,
    #[command(flatten)]
    pub fields: TradeFieldArgs,
    /// Derive amount, percentage and status from the hit flags
    #[arg(long)]
    pub calculate: bool,
}

/// Arguments for editing a trade
#[derive(Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub id: String,
    /// Path to a JSON patch; only the keys present are changed
    #[arg(long)]
    pub input: Option<String>,
    #[command(flatten)]
    pub fields: TradeFieldArgs,
    /// Remove the embedded chart image
    #[arg(long, conflicts_with = "image")]
    pub clear_image: bool,
    /// Recompute amount, percentage and status after applying the changes
    #[arg(long)]
    pub recalculate: bool,
}

/// Arguments for commands addressing one trade
#[derive(Args)]
pub struct IdArgs {
    #[arg(long)]
    pub id: String,
}

/// Arguments for the trade log
#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive search over pair, setup and notes
    #[arg(long)]
    pub search: Option<String>,
    /// date, profit-loss-amount, profit-loss-percentage or margin
    #[arg(long, default_value = "date")]
    pub sort: SortField,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
    /// Keep embedded chart images in the rows
    #[arg(long)]
    pub with_images: bool,
}

pub fn run_add(args: AddArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: TradeDraft = input::file_or_stdin(args.input.as_deref())?.unwrap_or_default();

    let mut journal = config.open_journal()?;

    // Flags are applied through the same patch path `update` uses.
    let mut preview = draft.into_trade(TradeId::new(""));
    let patch = args.fields.fold_into(TradePatch::default(), &preview)?;
    preview.apply_patch(patch);
    preview.validate()?;
    if !PSYCHOLOGY_LABELS.contains(&preview.psychology.as_str()) {
        debug!(psychology = %preview.psychology, "custom psychology label");
    }

    if args.calculate {
        let outcome = realized_pnl(&PnlInput::for_trade(&preview, journal.initial_account()))?;
        preview.apply_pnl(&outcome);
    }

    let id = journal.add_trade(TradeDraft::from(preview));
    journal.flush()?;
    debug!(%id, "trade recorded");

    let trade = journal
        .trade(&id)
        .ok_or_else(|| format!("Trade '{}' vanished after insert", id))?;
    Ok(serde_json::to_value(trade)?)
}

pub fn run_update(
    args: UpdateArgs,
    config: &JournalConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let id = TradeId::new(args.id);
    let from_input: TradePatch = input::file_or_stdin(args.input.as_deref())?.unwrap_or_default();

    let mut journal = config.open_journal()?;
    let current = journal
        .trade(&id)
        .cloned()
        .ok_or_else(|| format!("No trade with id '{}'", id))?;

    let mut patch = args.fields.fold_into(from_input, &current)?;
    if args.clear_image {
        patch.chart_image = Some(None);
    }

    let mut preview = current;
    preview.apply_patch(patch.clone());
    preview.validate()?;

    if args.recalculate {
        let outcome = realized_pnl(&PnlInput::for_trade(&preview, journal.initial_account()))?;
        patch.realized_amount = Some(outcome.realized_amount);
        patch.realized_percentage = Some(outcome.realized_percentage);
        patch.status = Some(outcome.status);
    }

    if patch.is_empty() {
        return Err("Nothing to update: pass --input or at least one field flag".into());
    }

    journal.update_trade(&id, patch);
    journal.flush()?;

    let trade = journal
        .trade(&id)
        .ok_or_else(|| format!("No trade with id '{}'", id))?;
    Ok(serde_json::to_value(trade)?)
}

pub fn run_delete(args: IdArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let id = TradeId::new(args.id);
    let mut journal = config.open_journal()?;
    if !journal.delete_trade(&id) {
        return Err(format!("No trade with id '{}'", id).into());
    }
    journal.flush()?;
    Ok(json!({ "deleted": id, "num_trades": journal.trades().len() }))
}

pub fn run_show(args: IdArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let id = TradeId::new(args.id);
    let journal = config.open_journal()?;
    let trade = journal
        .trade(&id)
        .ok_or_else(|| format!("No trade with id '{}'", id))?;
    Ok(serde_json::to_value(trade)?)
}

pub fn run_list(args: ListArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = config.open_journal()?;
    let query = TradeQuery {
        search: args.search,
        sort_field: args.sort,
        order: args.order,
    };

    let rows = query_trades(journal.trades(), &query)
        .into_iter()
        .map(|trade| {
            let mut row = serde_json::to_value(trade)?;
            if !args.with_images {
                if let Value::Object(map) = &mut row {
                    map.remove("image");
                }
            }
            Ok(row)
        })
        .collect::<Result<Vec<Value>, serde_json::Error>>()?;

    Ok(Value::Array(rows))
}
