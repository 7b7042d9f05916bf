//! Market summary tiles and transaction list rows.

use chrono::{DateTime, Utc};

use crate::market::{
    Agent, AgentId, MarketState, Transaction, TransactionId, TransactionOrigin, find_agent,
};

/// One summary tile: a title, a headline value, and a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTile {
    pub title: &'static str,
    pub value: String,
    pub caption: &'static str,
}

/// The five market summary tiles, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketTiles {
    pub tiles: [StatTile; 5],
}

impl MarketTiles {
    pub fn new(market: &MarketState) -> Self {
        Self {
            tiles: [
                StatTile {
                    title: "Current Price",
                    value: format!("${:.3}", market.current_price),
                    caption: "Per kWh",
                },
                StatTile {
                    title: "Trading Volume",
                    value: format!("{:.1}", market.total_volume_kwh),
                    caption: "kWh Today",
                },
                StatTile {
                    title: "Carbon Offset",
                    value: format!("{:.1}", market.carbon_offset),
                    caption: "Tons CO₂",
                },
                StatTile {
                    title: "Network Efficiency",
                    value: format!("{:.1}%", market.network_efficiency * 100.0),
                    caption: "Last 24h",
                },
                StatTile {
                    title: "Last Update",
                    value: market.last_update.format("%H:%M:%S").to_string(),
                    caption: "UTC",
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatTile> {
        self.tiles.iter()
    }
}

/// A transaction as shown in the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: TransactionId,
    /// Empty when the seller id no longer resolves.
    pub seller_name: String,
    /// Empty when the buyer id no longer resolves.
    pub buyer_name: String,
    pub timestamp: DateTime<Utc>,
    pub carbon_saved_kg: f64,
    pub amount_kwh: f64,
    pub cost: f64,
    pub price_per_kwh: f64,
    pub origin: TransactionOrigin,
}

impl TransactionRow {
    /// Resolves counterparty names against the current roster.
    pub fn new(tx: &Transaction, agents: &[Agent]) -> Self {
        let name_of = |id: &AgentId| {
            find_agent(agents, id)
                .map(|a| a.name.clone())
                .unwrap_or_default()
        };
        Self {
            id: tx.id,
            seller_name: name_of(&tx.seller_id),
            buyer_name: name_of(&tx.buyer_id),
            timestamp: tx.timestamp,
            carbon_saved_kg: tx.carbon_saved_kg,
            amount_kwh: tx.amount_kwh,
            cost: tx.cost(),
            price_per_kwh: tx.price_per_kwh,
            origin: tx.origin,
        }
    }

    /// Single-line rendering used by both the headless output and the TUI list.
    pub fn line(&self) -> String {
        format!(
            "{} {} {} → {} | {:.1} kWh ${:.2} (${:.3}/kWh) | {:.2} kg CO₂ saved [{}]",
            self.timestamp.format("%H:%M:%S"),
            self.id,
            self.seller_name,
            self.buyer_name,
            self.amount_kwh,
            self.cost,
            self.price_per_kwh,
            self.carbon_saved_kg,
            self.origin,
        )
    }
}

/// Rows for the whole log, newest first.
pub fn transaction_rows<'a>(
    log: impl IntoIterator<Item = &'a Transaction>,
    agents: &[Agent],
) -> Vec<TransactionRow> {
    log.into_iter()
        .map(|tx| TransactionRow::new(tx, agents))
        .collect()
}
