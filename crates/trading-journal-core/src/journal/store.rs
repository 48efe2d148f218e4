use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::events::{JournalEvent, JournalObserver};
use super::persistence::{MemoryStore, SnapshotStore};
use super::snapshot::Snapshot;
use crate::error::JournalError;
use crate::trade::{Trade, TradeDraft, TradeId, TradePatch};
use crate::types::Money;
use crate::JournalResult;

/// Owner of the trade collection and the account baseline.
///
/// Every mutation is applied in memory first, then the full snapshot is handed
/// to the [`SnapshotStore`]. A failed save does not undo the mutation; it marks
/// the journal dirty so [`TradeJournal::flush`] can retry and report it.
pub struct TradeJournal {
    state: Snapshot,
    store: Box<dyn SnapshotStore>,
    observers: Vec<Box<dyn JournalObserver>>,
    dirty: bool,
}

impl TradeJournal {
    /// Load from `store`, or start empty with the default baseline.
    ///
    /// A stored snapshot must pass [`Snapshot::validate`]: duplicate ids or a
    /// non-positive baseline fail to open.
    pub fn open(store: impl SnapshotStore + 'static) -> JournalResult<Self> {
        let loaded = store.load()?;
        let existed = loaded.is_some();
        let state = loaded.unwrap_or_default();
        if let Err(e) = state.validate() {
            warn!(error = %e, "Stored journal snapshot rejected");
            return Err(e);
        }
        info!(
            trades = state.trades.len(),
            initial_account = %state.initial_account_value,
            existed,
            "Journal loaded"
        );
        Ok(Self {
            state,
            store: Box::new(store),
            observers: Vec::new(),
            dirty: false,
        })
    }

    /// A journal that persists nowhere but memory.
    pub fn in_memory() -> Self {
        Self {
            state: Snapshot::default(),
            store: Box::new(MemoryStore::new()),
            observers: Vec::new(),
            dirty: false,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn JournalObserver>) {
        self.observers.push(observer);
    }

    // -- Reads --------------------------------------------------------------

    pub fn initial_account(&self) -> Money {
        self.state.initial_account_value
    }

    /// Trades in insertion order.
    pub fn trades(&self) -> &[Trade] {
        &self.state.trades
    }

    pub fn trade(&self, id: &TradeId) -> Option<&Trade> {
        self.state.trades.iter().find(|t| &t.id == id)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    /// True when the last save failed and has not been retried successfully.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- Mutations ----------------------------------------------------------

    pub fn set_initial_account(&mut self, amount: Money) -> JournalResult<()> {
        if amount <= Decimal::ZERO {
            return Err(JournalError::invalid(
                "initialAccount",
                "Initial account must be positive",
            ));
        }
        self.state.initial_account_value = amount;
        debug!(amount = %amount, "Initial account set");
        self.commit(JournalEvent::InitialAccountChanged { amount });
        Ok(())
    }

    /// Append a trade and return its newly assigned id.
    pub fn add_trade(&mut self, draft: TradeDraft) -> TradeId {
        let id = self.next_id();
        self.state.trades.push(draft.into_trade(id.clone()));
        debug!(trade_id = %id, "Trade appended");
        self.commit(JournalEvent::TradeAdded { id: id.clone() });
        id
    }

    /// Merge `patch` into the trade with `id`. Returns false, changing and
    /// persisting nothing, when no such trade exists.
    pub fn update_trade(&mut self, id: &TradeId, patch: TradePatch) -> bool {
        let Some(trade) = self.state.trades.iter_mut().find(|t| &t.id == id) else {
            debug!(trade_id = %id, "Update skipped, trade not found");
            return false;
        };
        trade.apply_patch(patch);
        debug!(trade_id = %id, "Trade patched");
        self.commit(JournalEvent::TradeUpdated { id: id.clone() });
        true
    }

    /// Remove the trade with `id`. Returns false when no such trade exists.
    pub fn delete_trade(&mut self, id: &TradeId) -> bool {
        let before = self.state.trades.len();
        self.state.trades.retain(|t| &t.id != id);
        if self.state.trades.len() == before {
            debug!(trade_id = %id, "Delete skipped, trade not found");
            return false;
        }
        debug!(trade_id = %id, "Trade removed");
        self.commit(JournalEvent::TradeDeleted { id: id.clone() });
        true
    }

    /// Replace the whole state, e.g. from an import.
    pub fn replace(&mut self, snapshot: Snapshot) -> JournalResult<()> {
        snapshot.validate()?;
        let num_trades = snapshot.trades.len();
        self.state = snapshot;
        self.commit(JournalEvent::Replaced { num_trades });
        Ok(())
    }

    /// Retry a failed save. A no-op when nothing is pending.
    pub fn flush(&mut self) -> JournalResult<()> {
        if self.dirty {
            self.store.save(&self.state)?;
            self.dirty = false;
            debug!("Pending snapshot saved");
        }
        Ok(())
    }

    // -- Internals ----------------------------------------------------------

    fn commit(&mut self, event: JournalEvent) {
        match self.store.save(&self.state) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(error = %e, "Failed to save journal snapshot");
                self.dirty = true;
            }
        }
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Millisecond timestamp, bumped past every numeric id already present.
    ///
    /// When the highest numeric id is `i64::MAX` there is nothing to bump to,
    /// so the id becomes `<now>-<n>` with the first `n` not already taken.
    fn next_id(&self) -> TradeId {
        let now = chrono::Utc::now().timestamp_millis();
        let highest = self
            .state
            .trades
            .iter()
            .filter_map(|t| t.id.as_str().parse::<i64>().ok())
            .max();
        match highest {
            Some(h) if h >= now => match h.checked_add(1) {
                Some(next) => TradeId::new(next.to_string()),
                None => self.suffixed_id(now),
            },
            _ => TradeId::new(now.to_string()),
        }
    }

    fn suffixed_id(&self, now: i64) -> TradeId {
        let taken: HashSet<&str> = self.state.trades.iter().map(|t| t.id.as_str()).collect();
        let mut n = 1u64;
        loop {
            let candidate = format!("{now}-{n}");
            if !taken.contains(candidate.as_str()) {
                return TradeId::new(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(feature = "statistics")]
mod derived {
    use chrono::NaiveDate;
    use std::collections::HashMap;

    use super::TradeJournal;
    use crate::statistics::{self, EquityPoint, JournalSummary, Period, PeriodKind};
    use crate::trade::Trade;
    use crate::types::*;
    use crate::JournalResult;

    /// Statistics recomputed from the current state on every call.
    impl TradeJournal {
        pub fn period_profit_loss(&self, period: Period) -> Money {
            statistics::period_profit_loss(self.trades(), period)
        }

        pub fn win_rate(&self) -> Percent {
            statistics::win_rate(self.trades())
        }

        pub fn average_risk_reward(&self) -> Ratio {
            statistics::average_risk_reward(self.trades())
        }

        pub fn group_by_period(&self, kind: PeriodKind) -> HashMap<String, Vec<&Trade>> {
            statistics::group_by_period(self.trades(), kind)
        }

        pub fn account_value(&self) -> Money {
            statistics::account_value(self.trades(), self.initial_account())
        }

        pub fn equity_curve(&self, kind: PeriodKind) -> Vec<EquityPoint> {
            statistics::equity_curve(self.trades(), self.initial_account(), kind)
        }

        pub fn summary(&self, as_of: NaiveDate) -> JournalResult<JournalSummary> {
            statistics::summarize(self.trades(), self.initial_account(), as_of)
        }
    }
}
