pub mod aggregate;
pub mod equity_curve;
pub mod periods;
pub mod summary;

pub use aggregate::{account_value, average_risk_reward, status_counts, win_rate, StatusCounts};
pub use equity_curve::{equity_curve, EquityPoint};
pub use periods::{group_by_period, period_profit_loss, Period, PeriodKind};
pub use summary::{compute_statistics, summarize, JournalSummary, StatisticsInput};
