/// Simulated clock handing out tick timestamps.
pub mod clock;
pub mod engine;
/// Post-hoc run summary.
pub mod kpi;
/// Owned state store.
pub mod store;
pub mod tick;
/// Manual trade form and settlement.
pub mod trade;
pub mod types;
