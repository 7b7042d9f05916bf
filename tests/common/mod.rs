//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use p2p_energy_sim::config::ScenarioConfig;
use p2p_energy_sim::market::{Agent, AgentId};
use p2p_energy_sim::random::SeededSource;
use p2p_energy_sim::sim::engine::Engine;
use p2p_energy_sim::sim::store::SimState;

/// Fixed start time so timestamps are reproducible.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Baseline scenario with the given seed and run length.
pub fn baseline(seed: u64, ticks: usize) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = seed;
    cfg.simulation.ticks = ticks;
    cfg
}

/// Seeded engine starting at [`t0`].
pub fn engine(cfg: &ScenarioConfig) -> Engine {
    Engine::from_scenario(cfg, t0())
}

/// Initial baseline state drawn from `seed`.
pub fn initial_state(seed: u64) -> SimState {
    SimState::from_scenario(&ScenarioConfig::baseline(), t0(), &mut SeededSource::new(seed))
}

/// Looks up an agent that must exist.
pub fn agent<'a>(state: &'a SimState, id: &str) -> &'a Agent {
    state
        .agent(&AgentId::new(id))
        .unwrap_or_else(|| panic!("agent {id} missing"))
}
