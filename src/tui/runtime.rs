//! Dashboard application state driven by the TUI event loop.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use chrono::Utc;

use crate::config::ScenarioConfig;
use crate::market::{Agent, AgentId};
use crate::random::SeededSource;
use crate::sim::clock::SimClock;
use crate::sim::engine::{Engine, interval_of};
use crate::sim::trade::{FormField, TradeFlow};
use crate::sim::types::TickReport;
use crate::view::{AgentCardView, MarketTiles, PriceChart, TransactionRow, transaction_rows};

/// Maximum number of tick reports kept for the header readout.
const MAX_HISTORY: usize = 200;

/// Speed multipliers over the configured tick interval (slowest → fastest).
pub const SPEED_MULTIPLIERS: [u64; 5] = [1, 2, 5, 10, 30];

/// Amount step for the trade form (kWh).
const AMOUNT_STEP_KWH: f64 = 10.0;
/// Price step for the trade form.
const PRICE_STEP: f64 = 0.001;

/// Builds an engine that ticks until the dashboard is closed.
fn live_engine(cfg: &ScenarioConfig) -> Engine {
    let start = cfg.simulation.start_time.unwrap_or_else(Utc::now);
    let clock = SimClock::unbounded(start, interval_of(cfg));
    Engine::with_source(cfg, clock, SeededSource::new(cfg.simulation.seed))
}

/// TUI application state.
pub struct App {
    engine: Engine,
    /// Scenario kept for restart.
    scenario: ScenarioConfig,
    /// Trade modal.
    pub flow: TradeFlow,
    /// Recent tick reports.
    pub history: VecDeque<TickReport>,
    /// Index of the highlighted agent card.
    pub selected: usize,
    /// Cards with their detail panel open.
    pub expanded: HashSet<AgentId>,
    pub paused: bool,
    /// Current index into [`SPEED_MULTIPLIERS`].
    pub speed_idx: usize,
    pub quit: bool,
    /// When the last simulation tick was executed.
    pub last_tick: Instant,
    /// Name of the active preset, or `custom` for a scenario file.
    pub preset_name: String,
    /// Outcome of the last trade submission.
    pub notice: Option<String>,
}

impl App {
    /// Creates an app for an already validated scenario.
    pub fn new(scenario: ScenarioConfig, preset_name: &str) -> Self {
        Self {
            engine: live_engine(&scenario),
            scenario,
            flow: TradeFlow::Closed,
            history: VecDeque::with_capacity(MAX_HISTORY),
            selected: 0,
            expanded: HashSet::new(),
            paused: false,
            speed_idx: 0,
            quit: false,
            last_tick: Instant::now(),
            preset_name: preset_name.to_string(),
            notice: None,
        }
    }

    /// Applies one tick. The modal does not pause the market.
    pub fn tick(&mut self) {
        let Some(report) = self.engine.step() else {
            return;
        };
        if self.history.len() >= MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(report);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_MULTIPLIERS.len() {
            self.speed_idx += 1;
        }
    }

    pub fn speed_down(&mut self) {
        self.speed_idx = self.speed_idx.saturating_sub(1);
    }

    pub fn speed_multiplier(&self) -> u64 {
        SPEED_MULTIPLIERS[self.speed_idx]
    }

    /// Wall-clock milliseconds between ticks at the current speed.
    pub fn tick_interval_ms(&self) -> u64 {
        (self.scenario.simulation.tick_interval_ms / self.speed_multiplier()).max(1)
    }

    /// Switches to a built-in preset, resetting all state. Unknown names are ignored.
    pub fn switch_preset(&mut self, name: &str) {
        let Ok(mut scenario) = ScenarioConfig::from_preset(name) else {
            return;
        };
        scenario.simulation.seed = self.scenario.simulation.seed;
        self.scenario = scenario;
        self.preset_name = name.to_string();
        self.restart();
    }

    /// Restarts the current scenario from its initial state.
    pub fn restart(&mut self) {
        self.engine = live_engine(&self.scenario);
        self.flow.cancel();
        self.history.clear();
        self.expanded.clear();
        self.selected = 0;
        self.paused = false;
        self.notice = None;
        self.last_tick = Instant::now();
    }

    pub fn agents(&self) -> &[Agent] {
        &self.engine.state().agents
    }

    pub fn selected_agent(&self) -> Option<&Agent> {
        self.agents().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let n = self.agents().len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.agents().len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    /// Shows or hides the detail panel of the selected card.
    pub fn toggle_details(&mut self) {
        let Some(id) = self.selected_agent().map(|a| a.id.clone()) else {
            return;
        };
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Opens the trade modal for the selected card.
    pub fn open_trade(&mut self) {
        let price = self.engine.state().market.current_price;
        if let Some(agent) = self.engine.state().agents.get(self.selected) {
            self.flow.open(agent, price);
            self.notice = None;
        }
    }

    pub fn cancel_trade(&mut self) {
        self.flow.cancel();
    }

    pub fn trade_focus_next(&mut self) {
        if let Some(form) = self.flow.form_mut() {
            form.focus_next();
        }
    }

    /// Nudges the focused form field up or down.
    pub fn trade_adjust(&mut self, up: bool) {
        let agents = &self.engine.state().agents;
        let Some(form) = self.flow.form_mut() else {
            return;
        };
        let sign = if up { 1.0 } else { -1.0 };
        match form.focus {
            FormField::Counterparty => form.cycle_counterparty(agents, up),
            FormField::Amount => form.adjust_amount(sign * AMOUNT_STEP_KWH),
            FormField::Price => form.adjust_price(sign * PRICE_STEP),
        }
    }

    /// Submits the modal. On error the modal stays open and the error is shown.
    pub fn submit_trade(&mut self) {
        self.notice = Some(match self.engine.submit_trade(&mut self.flow) {
            Ok(tx) => format!("Settled {tx}"),
            Err(e) => format!("Trade rejected: {e}"),
        });
    }

    pub fn cards(&self) -> Vec<AgentCardView> {
        self.agents()
            .iter()
            .map(|a| AgentCardView::new(a, self.expanded.contains(&a.id)))
            .collect()
    }

    pub fn tiles(&self) -> MarketTiles {
        MarketTiles::new(&self.engine.state().market)
    }

    pub fn chart(&self) -> PriceChart {
        PriceChart::new(&self.engine.state().market.price_history)
    }

    pub fn transaction_rows(&self) -> Vec<TransactionRow> {
        let state = self.engine.state();
        transaction_rows(state.transactions.iter(), &state.agents)
    }

    /// Ticks applied since the last restart.
    pub fn elapsed_ticks(&self) -> usize {
        self.engine.clock().elapsed_ticks()
    }

    /// Name of an agent by id, empty when unknown.
    pub fn agent_name(&self, id: &AgentId) -> &str {
        self.engine
            .state()
            .agent(id)
            .map_or("", |a| a.name.as_str())
    }
}
