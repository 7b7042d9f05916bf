//! The owned state store: agents, market aggregate, and transaction log.
//!
//! The tick driver and the trade flow are the only writers. Both go through
//! pure functions that take the prior [`SimState`] and return the next one;
//! the [`Store`] just swaps the result in.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::tick;
use super::trade::{self, TradeTicket};
use super::types::TickParams;
use crate::config::ScenarioConfig;
use crate::forecast::generate_forecast;
use crate::market::state::seed_price_history;
use crate::market::{Agent, AgentId, MarketState, Transaction, TransactionId, TransactionLog};
use crate::random::RandomSource;

/// Complete simulation state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimState {
    pub agents: Vec<Agent>,
    pub market: MarketState,
    pub transactions: TransactionLog,
    /// Id assigned to the next recorded transaction.
    pub next_transaction_id: u64,
}

impl SimState {
    /// Builds the initial state for a scenario.
    ///
    /// Forecasts are drawn agent by agent first, then the price history.
    pub fn from_scenario<R: RandomSource>(
        cfg: &ScenarioConfig,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let agents = cfg
            .agents
            .iter()
            .map(|a| Agent {
                id: AgentId::new(a.id.clone()),
                name: a.name.clone(),
                kind: a.kind,
                energy_capacity_kwh: a.energy_capacity_kwh,
                current_energy_kwh: a.current_energy_kwh,
                price_per_kwh: a.price_per_kwh,
                status: a.status,
                efficiency: a.efficiency,
                location: a.location.clone(),
                carbon_footprint: a.carbon_footprint,
                forecast: generate_forecast(now, rng),
                last_transaction: None,
            })
            .collect();

        let m = &cfg.market;
        let market = MarketState {
            current_price: m.current_price,
            total_volume_kwh: m.total_volume_kwh,
            last_update: now,
            price_history: seed_price_history(
                now,
                m.history_base_price,
                m.history_price_spread,
                rng,
            ),
            demand_forecast_kwh: m.demand_forecast_kwh,
            carbon_offset: m.carbon_offset,
            network_efficiency: m.network_efficiency,
        };

        Self {
            agents,
            market,
            transactions: TransactionLog::new(),
            next_transaction_id: 1,
        }
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        crate::market::find_agent(&self.agents, id)
    }

    /// Lowest stored energy across all agents (kWh).
    pub fn min_agent_energy_kwh(&self) -> f64 {
        self.agents
            .iter()
            .map(|a| a.current_energy_kwh)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Owner of the live [`SimState`].
#[derive(Debug, Clone)]
pub struct Store {
    state: SimState,
}

impl Store {
    pub fn new(state: SimState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Applies one tick.
    ///
    /// # Returns
    ///
    /// The id of the transaction synthesized on this tick, if any.
    pub fn apply_tick<R: RandomSource>(
        &mut self,
        now: DateTime<Utc>,
        params: &TickParams,
        rng: &mut R,
    ) -> Option<TransactionId> {
        let next = tick::advance(&self.state, now, params, rng);
        let synthesized = (next.next_transaction_id != self.state.next_transaction_id)
            .then_some(TransactionId(self.state.next_transaction_id));
        self.state = next;
        synthesized
    }

    /// Settles a manual trade and returns the recorded transaction.
    pub fn settle(&mut self, ticket: &TradeTicket, now: DateTime<Utc>) -> Transaction {
        let (next, tx) = trade::settle(&self.state, ticket, now);
        self.state = next;
        tx
    }
}
