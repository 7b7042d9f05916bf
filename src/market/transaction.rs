//! Transaction records and the capped, newest-first transaction log.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::agent::AgentId;

/// Maximum number of transactions retained in the log.
pub const TRANSACTION_LOG_CAPACITY: usize = 10;

/// Sequential transaction identifier, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{:04}", self.0)
    }
}

/// Lifecycle status of a transaction. Only `Completed` is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOrigin {
    /// Drawn by the tick simulator; logged only, never settled.
    Synthesized,
    /// Submitted through the trade flow and settled against both agents.
    Manual,
}

impl fmt::Display for TransactionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Synthesized => "synthesized",
            Self::Manual => "manual",
        })
    }
}

/// Immutable record of an energy trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub seller_id: AgentId,
    pub buyer_id: AgentId,
    /// Traded energy (kWh).
    pub amount_kwh: f64,
    /// Unit price (currency/kWh).
    pub price_per_kwh: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Derived display metric (kg). Signed for synthesized trades.
    pub carbon_saved_kg: f64,
    pub origin: TransactionOrigin,
}

impl Transaction {
    /// Total cost, `amount x price`.
    pub fn cost(&self) -> f64 {
        self.amount_kwh * self.price_per_kwh
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} | {:.1} kWh @ ${:.3}/kWh = ${:.2} | carbon saved {:.2} kg ({}, {})",
            self.id,
            self.seller_id,
            self.buyer_id,
            self.amount_kwh,
            self.price_per_kwh,
            self.cost(),
            self.carbon_saved_kg,
            self.origin,
            self.status,
        )
    }
}

/// Newest-first transaction log holding at most [`TRANSACTION_LOG_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `tx`, dropping the oldest entry once the cap is exceeded.
    pub fn record(&mut self, tx: Transaction) {
        self.entries.push_front(tx);
        self.entries.truncate(TRANSACTION_LOG_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent transaction, if any.
    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.front()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(id: u64) -> Transaction {
        Transaction {
            id: TransactionId(id),
            seller_id: AgentId::new("1"),
            buyer_id: AgentId::new("3"),
            amount_kwh: 50.0,
            price_per_kwh: 0.12,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: TransactionStatus::Completed,
            carbon_saved_kg: 3.0,
            origin: TransactionOrigin::Manual,
        }
    }

    #[test]
    fn cost_is_amount_times_price() {
        assert!((tx(1).cost() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn log_is_newest_first() {
        let mut log = TransactionLog::new();
        log.record(tx(1));
        log.record(tx(2));
        let ids: Vec<u64> = log.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(log.latest().map(|t| t.id), Some(TransactionId(2)));
    }

    #[test]
    fn log_caps_at_ten_and_drops_oldest() {
        let mut log = TransactionLog::new();
        for i in 1..=15 {
            log.record(tx(i));
            assert!(log.len() <= TRANSACTION_LOG_CAPACITY);
        }
        assert_eq!(log.len(), 10);
        let ids: Vec<u64> = log.iter().map(|t| t.id.0).collect();
        assert_eq!(ids.first(), Some(&15));
        assert_eq!(ids.last(), Some(&6));
    }

    #[test]
    fn id_display_is_zero_padded() {
        assert_eq!(TransactionId(7).to_string(), "tx-0007");
    }
}
