pub mod error;
pub mod trade;
pub mod types;

#[cfg(feature = "pnl")]
pub mod pnl;

#[cfg(feature = "statistics")]
pub mod statistics;

#[cfg(feature = "journal")]
pub mod journal;

#[cfg(feature = "trade_log")]
pub mod trade_log;

pub use error::JournalError;
pub use trade::*;
pub use types::*;

/// Standard result type for all trading-journal operations
pub type JournalResult<T> = Result<T, JournalError>;
