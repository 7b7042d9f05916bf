//! Pure view models for the dashboard components.
//!
//! Both the terminal UI and the headless output render from these, so
//! layout code never reads the store directly.

pub mod card;
/// Price history chart.
pub mod chart;
pub mod market;

pub use card::{AgentCardView, CardDetails, ForecastRow};
pub use chart::PriceChart;
pub use market::{MarketTiles, StatTile, TransactionRow, transaction_rows};
