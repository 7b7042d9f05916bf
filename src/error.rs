use thiserror::Error;

use crate::market::AgentId;

/// Reasons a manual trade submission is refused.
///
/// A refused submission leaves the trade form open and the store untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("no trade is open")]
    NotOpen,

    #[error("select a trading partner first")]
    NoCounterparty,

    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("{0} and {1} are on the same side of the market")]
    SameSide(AgentId, AgentId),

    #[error("amount {amount:.1} kWh outside allowed range [{min:.1}, {max:.1}]")]
    AmountOutOfRange { amount: f64, min: f64, max: f64 },

    #[error("price {0:.3} below minimum {1:.3}")]
    PriceTooLow(f64, f64),
}

pub type Result<T> = std::result::Result<T, TradeError>;
