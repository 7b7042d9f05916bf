//! Pure per-tick update rules.
//!
//! Each function takes the prior value and returns the next one; nothing here
//! mutates shared state. Draw order is fixed: market, then every agent in
//! roster order, then transaction synthesis.

use chrono::{DateTime, Utc};

use super::store::SimState;
use super::types::TickParams;
use crate::market::{
    Agent, AgentStatus, MarketState, PricePoint, Transaction, TransactionId, TransactionOrigin,
    TransactionStatus,
};
use crate::random::RandomSource;

/// Perturbs price, volume, carbon offset and efficiency, and slides the history window.
pub fn update_market<R: RandomSource>(
    prev: &MarketState,
    now: DateTime<Utc>,
    params: &TickParams,
    rng: &mut R,
) -> MarketState {
    let price = prev.current_price + rng.symmetric(params.price_jitter);
    let total_volume_kwh = prev.total_volume_kwh + rng.uniform(0.0, params.volume_drift_max_kwh);
    let carbon_offset = prev.carbon_offset + rng.uniform(0.0, params.carbon_offset_drift_max);
    let network_efficiency =
        (prev.network_efficiency + rng.symmetric(params.efficiency_jitter)).min(1.0);

    let mut next = MarketState {
        current_price: price,
        total_volume_kwh,
        last_update: now,
        price_history: prev.price_history.clone(),
        demand_forecast_kwh: prev.demand_forecast_kwh,
        carbon_offset,
        network_efficiency,
    };
    next.push_price(PricePoint {
        timestamp: now,
        price,
    });
    next
}

/// Perturbs one agent's energy, status and forecast.
pub fn update_agent<R: RandomSource>(prev: &Agent, params: &TickParams, rng: &mut R) -> Agent {
    let mut energy = (prev.current_energy_kwh + rng.symmetric(params.energy_jitter_kwh))
        .min(prev.energy_capacity_kwh);
    if params.clamp_energy_floor {
        energy = energy.max(0.0);
    }

    let status = if rng.chance(params.status_change_probability) {
        AgentStatus::ALL[rng.index(AgentStatus::ALL.len())]
    } else {
        prev.status
    };

    let forecast = prev
        .forecast
        .iter()
        .map(|f| f.perturbed(params, rng))
        .collect();

    Agent {
        current_energy_kwh: energy,
        status,
        forecast,
        ..prev.clone()
    }
}

/// Possibly draws a random producer-to-consumer transaction.
///
/// `agents` and `price` are the values from before the current tick's
/// updates. The result is logged only; no energy changes hands.
/// `carbon_saved_kg` keeps the sign of `buyer - seller` footprint.
pub fn synthesize_transaction<R: RandomSource>(
    agents: &[Agent],
    price: f64,
    now: DateTime<Utc>,
    id: TransactionId,
    params: &TickParams,
    rng: &mut R,
) -> Option<Transaction> {
    if !rng.chance(params.trade_probability) {
        return None;
    }

    let sellers: Vec<&Agent> = agents
        .iter()
        .filter(|a| a.is_producer() && a.current_energy_kwh > params.min_seller_energy_kwh)
        .collect();
    let buyers: Vec<&Agent> = agents
        .iter()
        .filter(|a| a.is_consumer() && a.current_energy_kwh < a.energy_capacity_kwh)
        .collect();
    if sellers.is_empty() || buyers.is_empty() {
        return None;
    }

    let seller = sellers[rng.index(sellers.len())];
    let buyer = buyers[rng.index(buyers.len())];
    let amount_kwh = rng
        .uniform(0.0, params.trade_draw_max_kwh)
        .floor()
        .min(params.max_trade_kwh);

    Some(Transaction {
        id,
        seller_id: seller.id.clone(),
        buyer_id: buyer.id.clone(),
        amount_kwh,
        price_per_kwh: price,
        timestamp: now,
        status: TransactionStatus::Completed,
        carbon_saved_kg: amount_kwh * (buyer.carbon_footprint - seller.carbon_footprint),
        origin: TransactionOrigin::Synthesized,
    })
}

/// Applies one full tick to `prev` and returns the next state.
pub fn advance<R: RandomSource>(
    prev: &SimState,
    now: DateTime<Utc>,
    params: &TickParams,
    rng: &mut R,
) -> SimState {
    let market = update_market(&prev.market, now, params, rng);
    let agents = prev
        .agents
        .iter()
        .map(|a| update_agent(a, params, rng))
        .collect();

    let mut transactions = prev.transactions.clone();
    let mut next_transaction_id = prev.next_transaction_id;
    if let Some(tx) = synthesize_transaction(
        &prev.agents,
        prev.market.current_price,
        now,
        TransactionId(next_transaction_id),
        params,
        rng,
    ) {
        log::info!("synthesized {tx}");
        transactions.record(tx);
        next_transaction_id += 1;
    }

    SimState {
        agents,
        market,
        transactions,
        next_transaction_id,
    }
}
