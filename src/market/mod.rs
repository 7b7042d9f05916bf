//! Market data model: agents, transactions, and the market aggregate.

/// Producer and consumer agents.
pub mod agent;
pub mod state;
/// Transaction records and the capped log.
pub mod transaction;

pub use agent::{Agent, AgentId, AgentKind, AgentStatus, find_agent};
pub use state::{MarketState, PRICE_HISTORY_LEN, PricePoint};
pub use transaction::{
    TRANSACTION_LOG_CAPACITY, Transaction, TransactionId, TransactionLog, TransactionOrigin,
    TransactionStatus,
};
