//! Trading agents: producers and consumers with an energy balance.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::transaction::TransactionId;
use crate::forecast::EnergyForecast;

/// Stable identifier of an agent within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the market an agent trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Sells energy (solar, wind).
    Producer,
    /// Buys energy (industrial, residential).
    Consumer,
}

impl AgentKind {
    /// The kind this agent can trade with.
    pub fn opposite(self) -> Self {
        match self {
            Self::Producer => Self::Consumer,
            Self::Consumer => Self::Producer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Activity state shown on the agent card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Trading,
    Idle,
}

impl AgentStatus {
    /// All statuses, in the order a random reassignment picks from.
    pub const ALL: [AgentStatus; 3] = [Self::Active, Self::Trading, Self::Idle];

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trading => "trading",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A simulated market participant.
///
/// `current_energy_kwh` is capped at `energy_capacity_kwh` by every tick but
/// has no lower bound unless the tick is configured to clamp it; manual
/// settlement does not re-clamp in either direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub kind: AgentKind,
    /// Fixed upper bound on stored energy (kWh).
    pub energy_capacity_kwh: f64,
    /// Stored energy (kWh).
    pub current_energy_kwh: f64,
    /// Asking or bidding price (currency/kWh).
    pub price_per_kwh: f64,
    pub status: AgentStatus,
    /// Conversion efficiency in `[0, 1]`.
    pub efficiency: f64,
    pub location: String,
    /// Emissions intensity (kg/kWh).
    pub carbon_footprint: f64,
    /// Hourly forecast, one entry per future hour.
    pub forecast: Vec<EnergyForecast>,
    /// Most recent manually settled transaction involving this agent.
    pub last_transaction: Option<TransactionId>,
}

impl Agent {
    /// Stored energy as a percentage of capacity.
    pub fn energy_pct(&self) -> f64 {
        if self.energy_capacity_kwh <= 0.0 {
            return 0.0;
        }
        self.current_energy_kwh / self.energy_capacity_kwh * 100.0
    }

    /// Remaining headroom before the capacity cap (kWh).
    pub fn remaining_capacity_kwh(&self) -> f64 {
        self.energy_capacity_kwh - self.current_energy_kwh
    }

    pub fn is_producer(&self) -> bool {
        self.kind == AgentKind::Producer
    }

    pub fn is_consumer(&self) -> bool {
        self.kind == AgentKind::Consumer
    }
}

/// Finds an agent by id.
pub fn find_agent<'a>(agents: &'a [Agent], id: &AgentId) -> Option<&'a Agent> {
    agents.iter().find(|a| &a.id == id)
}
