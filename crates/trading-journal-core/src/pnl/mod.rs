pub mod calculator;

pub use calculator::{calculate_pnl, realized_pnl, PnlInput, PnlOutcome};
