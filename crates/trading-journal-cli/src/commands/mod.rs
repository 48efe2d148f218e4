pub mod account;
pub mod pnl;
pub mod stats;
pub mod trades;
pub mod transfer;
