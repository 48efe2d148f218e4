use serde::{Deserialize, Serialize};
use tracing::info;

use crate::trade::TradeId;
use crate::types::Money;

/// Emitted after a mutation has been applied (and a save attempted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEvent {
    TradeAdded { id: TradeId },
    TradeUpdated { id: TradeId },
    TradeDeleted { id: TradeId },
    InitialAccountChanged { amount: Money },
    /// The whole state was replaced, e.g. by an import
    Replaced { num_trades: usize },
}

/// Receives journal events. Called synchronously, in subscription order.
pub trait JournalObserver: Send + Sync {
    fn on_event(&self, event: &JournalEvent);
}

impl<F> JournalObserver for F
where
    F: Fn(&JournalEvent) + Send + Sync,
{
    fn on_event(&self, event: &JournalEvent) {
        self(event)
    }
}

/// Logs every event via tracing.
pub struct LogObserver;

impl JournalObserver for LogObserver {
    fn on_event(&self, event: &JournalEvent) {
        match event {
            JournalEvent::TradeAdded { id } => info!(trade_id = %id, "Trade added"),
            JournalEvent::TradeUpdated { id } => info!(trade_id = %id, "Trade updated"),
            JournalEvent::TradeDeleted { id } => info!(trade_id = %id, "Trade deleted"),
            JournalEvent::InitialAccountChanged { amount } => {
                info!(amount = %amount, "Initial account changed")
            }
            JournalEvent::Replaced { num_trades } => {
                info!(num_trades, "Journal replaced")
            }
        }
    }
}
