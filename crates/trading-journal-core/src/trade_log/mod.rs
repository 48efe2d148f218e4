pub mod query;

pub use query::{query_trades, SortField, SortOrder, TradeQuery};
