//! Simulation engine: drives the store from a clock and a random source.

use chrono::{DateTime, TimeDelta, Utc};

use super::clock::SimClock;
use super::store::{SimState, Store};
use super::trade::TradeFlow;
use super::types::{TickParams, TickReport};
use crate::config::ScenarioConfig;
use crate::error::Result;
use crate::market::Transaction;
use crate::random::{RandomSource, SeededSource};

/// Simulation engine owning the store, clock, and randomness.
///
/// Generic over `R: RandomSource` so tests can pin every draw. The tick
/// driver and trade submission are the only paths that write to the store.
pub struct Engine<R: RandomSource = SeededSource> {
    store: Store,
    clock: SimClock,
    params: TickParams,
    rng: R,
}

impl Engine<SeededSource> {
    /// Builds a seeded engine for a validated scenario.
    ///
    /// The clock is bounded by `simulation.ticks` and starts at
    /// `simulation.start_time`, or at `fallback_start` when unset.
    pub fn from_scenario(cfg: &ScenarioConfig, fallback_start: DateTime<Utc>) -> Self {
        let start = cfg.simulation.start_time.unwrap_or(fallback_start);
        let interval = interval_of(cfg);
        let clock = SimClock::bounded(start, interval, cfg.simulation.ticks);
        Self::with_source(cfg, clock, SeededSource::new(cfg.simulation.seed))
    }
}

impl<R: RandomSource> Engine<R> {
    /// Creates an engine from a scenario, a clock, and an explicit random source.
    ///
    /// The initial state is drawn from `rng` at the clock's start time.
    pub fn with_source(cfg: &ScenarioConfig, clock: SimClock, mut rng: R) -> Self {
        let state = SimState::from_scenario(cfg, clock.start(), &mut rng);
        Self {
            store: Store::new(state),
            clock,
            params: cfg.tick.clone(),
            rng,
        }
    }

    /// Executes one tick and returns its report, or `None` once the clock is exhausted.
    pub fn step(&mut self) -> Option<TickReport> {
        let (tick, now) = self.clock.tick()?;
        let synthesized = self.store.apply_tick(now, &self.params, &mut self.rng);
        let state = self.store.state();
        let report = TickReport {
            tick,
            timestamp: now,
            price: state.market.current_price,
            total_volume_kwh: state.market.total_volume_kwh,
            carbon_offset: state.market.carbon_offset,
            network_efficiency: state.market.network_efficiency,
            min_agent_energy_kwh: state.min_agent_energy_kwh(),
            synthesized,
        };
        log::debug!("{report}");
        Some(report)
    }

    /// Executes all remaining ticks and returns their reports.
    pub fn run(&mut self) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(self.clock.total().unwrap_or(0));
        while let Some(report) = self.step() {
            reports.push(report);
        }
        reports
    }

    /// Submits an open trade form at the current simulated time.
    ///
    /// # Errors
    ///
    /// Propagates the [`crate::error::TradeError`] from the flow; the store
    /// is untouched on error.
    pub fn submit_trade(&mut self, flow: &mut TradeFlow) -> Result<Transaction> {
        let now = self.clock.now();
        flow.submit(&mut self.store, now).inspect_err(|e| {
            log::warn!("trade rejected: {e}");
        })
    }

    pub fn state(&self) -> &SimState {
        self.store.state()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }
}

/// Tick interval of a scenario as a simulated duration.
///
/// Saturates at `TimeDelta::MAX`; the clock then stops instead of ticking.
pub fn interval_of(cfg: &ScenarioConfig) -> TimeDelta {
    i64::try_from(cfg.simulation.tick_interval_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::AgentId;
    use crate::random::ScriptedSource;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn run_produces_configured_tick_count() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.ticks = 12;
        let mut engine = Engine::from_scenario(&cfg, t0());
        let reports = engine.run();
        assert_eq!(reports.len(), 12);
        assert!(engine.is_finished());
        assert!(engine.step().is_none());
    }

    #[test]
    fn ticks_are_three_seconds_apart() {
        let cfg = ScenarioConfig::baseline();
        let mut engine = Engine::from_scenario(&cfg, t0());
        let reports = engine.run();
        assert_eq!(reports[0].timestamp, t0() + TimeDelta::seconds(3));
        assert_eq!(reports[1].timestamp - reports[0].timestamp, TimeDelta::seconds(3));
        assert_eq!(engine.state().market.last_update, reports[19].timestamp);
    }

    #[test]
    fn start_time_from_config_wins() {
        let mut cfg = ScenarioConfig::baseline();
        let configured = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        cfg.simulation.start_time = Some(configured);
        let engine = Engine::from_scenario(&cfg, t0());
        assert_eq!(engine.clock().start(), configured);
    }

    #[test]
    fn scripted_engine_is_quiet_at_midpoint() {
        let cfg = ScenarioConfig::baseline();
        let clock = SimClock::bounded(t0(), interval_of(&cfg), 5);
        let mut engine = Engine::with_source(&cfg, clock, ScriptedSource::constant(0.5));
        let reports = engine.run();
        assert!(reports.iter().all(|r| r.synthesized.is_none()));
        assert!(reports.iter().all(|r| (r.price - 0.135).abs() < 1e-12));
        assert_eq!(engine.state().agents[0].current_energy_kwh, 850.0);
    }

    #[test]
    fn oversized_interval_ends_the_run() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.tick_interval_ms = 10_000_000_000_000_000;
        assert_eq!(interval_of(&cfg), TimeDelta::MAX);
        let mut engine = Engine::from_scenario(&cfg, t0());
        assert!(engine.step().is_none());
        assert!(engine.run().is_empty());
    }

    #[test]
    fn submit_trade_uses_clock_time() {
        let cfg = ScenarioConfig::baseline();
        let mut engine = Engine::from_scenario(&cfg, t0());
        engine.step();
        let target = engine.state().agent(&AgentId::new("2")).cloned().unwrap();
        let mut flow = TradeFlow::default();
        flow.open(&target, engine.state().market.current_price);
        flow.form_mut()
            .unwrap()
            .select_counterparty(AgentId::new("4"));
        let tx = engine.submit_trade(&mut flow).unwrap();
        assert_eq!(tx.timestamp, t0() + TimeDelta::seconds(3));
    }
}
