//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::market::{AgentKind, AgentStatus};
use crate::sim::types::TickParams;

/// Longest accepted tick interval: one day (ms).
pub const MAX_TICK_INTERVAL_MS: u64 = 86_400_000;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length, timing and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Initial market aggregate.
    #[serde(default)]
    pub market: MarketConfig,
    /// Per-tick perturbation constants.
    #[serde(default)]
    pub tick: TickParams,
    /// Agent roster.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed.
    pub seed: u64,
    /// Number of ticks in a headless run.
    pub ticks: usize,
    /// Wall-clock period between ticks (ms, `1..=MAX_TICK_INTERVAL_MS`).
    pub tick_interval_ms: u64,
    /// Simulated start time (RFC 3339 string). Defaults to now.
    pub start_time: Option<DateTime<Utc>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 20,
            tick_interval_ms: 3000,
            start_time: None,
        }
    }
}

/// Initial market aggregate and history seeding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Opening price (currency/kWh).
    pub current_price: f64,
    /// Opening cumulative volume (kWh).
    pub total_volume_kwh: f64,
    /// Static demand forecast (kWh).
    pub demand_forecast_kwh: f64,
    pub carbon_offset: f64,
    /// Opening network efficiency (<= 1).
    pub network_efficiency: f64,
    /// Floor of the seeded history prices.
    pub history_base_price: f64,
    /// Spread above the floor for seeded history prices.
    pub history_price_spread: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            current_price: 0.135,
            total_volume_kwh: 2450.0,
            demand_forecast_kwh: 3000.0,
            carbon_offset: 125.5,
            network_efficiency: 0.93,
            history_base_price: 0.13,
            history_price_spread: 0.02,
        }
    }
}

/// One agent in the roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub kind: AgentKind,
    pub energy_capacity_kwh: f64,
    pub current_energy_kwh: f64,
    pub price_per_kwh: f64,
    #[serde(default = "default_status")]
    pub status: AgentStatus,
    pub efficiency: f64,
    #[serde(default)]
    pub location: String,
    pub carbon_footprint: f64,
}

fn default_status() -> AgentStatus {
    AgentStatus::Active
}

#[allow(clippy::too_many_arguments)]
fn agent(
    id: &str,
    name: &str,
    kind: AgentKind,
    capacity: f64,
    current: f64,
    price: f64,
    status: AgentStatus,
    efficiency: f64,
    location: &str,
    carbon_footprint: f64,
) -> AgentConfig {
    AgentConfig {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        energy_capacity_kwh: capacity,
        current_energy_kwh: current,
        price_per_kwh: price,
        status,
        efficiency,
        location: location.to_string(),
        carbon_footprint,
    }
}

/// The four-agent roster of the reference dashboard.
fn default_agents() -> Vec<AgentConfig> {
    use AgentKind::{Consumer, Producer};
    use AgentStatus::{Active, Idle, Trading};
    vec![
        agent(
            "1",
            "Solar Farm Alpha",
            Producer,
            1000.0,
            850.0,
            0.12,
            Active,
            0.95,
            "Arizona, USA",
            0.02,
        ),
        agent(
            "2",
            "Wind Farm Beta",
            Producer,
            800.0,
            600.0,
            0.14,
            Trading,
            0.92,
            "Texas, USA",
            0.01,
        ),
        agent(
            "3",
            "Industrial Consumer",
            Consumer,
            1500.0,
            400.0,
            0.15,
            Active,
            0.88,
            "Michigan, USA",
            0.08,
        ),
        agent(
            "4",
            "Residential Grid",
            Consumer,
            500.0,
            280.0,
            0.13,
            Idle,
            0.90,
            "California, USA",
            0.05,
        ),
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_interval_ms"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: the reference four-agent market.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            market: MarketConfig::default(),
            tick: TickParams::default(),
            agents: default_agents(),
        }
    }

    /// Returns the wind-rich preset: an extra offshore producer and cheaper power.
    pub fn wind_rich() -> Self {
        let mut agents = default_agents();
        agents.push(agent(
            "5",
            "Offshore Wind Gamma",
            AgentKind::Producer,
            1200.0,
            950.0,
            0.11,
            AgentStatus::Active,
            0.94,
            "Massachusetts, USA",
            0.01,
        ));
        Self {
            market: MarketConfig {
                current_price: 0.125,
                history_base_price: 0.12,
                ..MarketConfig::default()
            },
            agents,
            ..Self::baseline()
        }
    }

    /// Returns the grid-stress preset: volatile prices, frequent trades,
    /// consumers close to capacity.
    pub fn grid_stress() -> Self {
        let mut agents = default_agents();
        agents[2].current_energy_kwh = 1400.0;
        agents[3].current_energy_kwh = 470.0;
        Self {
            market: MarketConfig {
                current_price: 0.16,
                network_efficiency: 0.85,
                history_base_price: 0.15,
                history_price_spread: 0.04,
                ..MarketConfig::default()
            },
            tick: TickParams {
                price_jitter: 0.03,
                efficiency_jitter: 0.03,
                energy_jitter_kwh: 80.0,
                trade_probability: 0.6,
                ..TickParams::default()
            },
            agents,
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "wind_rich", "grid_stress"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "wind_rich" => Ok(Self::wind_rich()),
            "grid_stress" => Ok(Self::grid_stress()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.tick_interval_ms == 0 {
            errors.push(ConfigError::new("simulation.tick_interval_ms", "must be > 0"));
        } else if self.simulation.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            errors.push(ConfigError::new(
                "simulation.tick_interval_ms",
                format!("must be <= {MAX_TICK_INTERVAL_MS} (one day)"),
            ));
        }

        let m = &self.market;
        if m.network_efficiency > 1.0 {
            errors.push(ConfigError::new("market.network_efficiency", "must be <= 1.0"));
        }
        if m.history_price_spread < 0.0 {
            errors.push(ConfigError::new("market.history_price_spread", "must be >= 0"));
        }

        let t = &self.tick;
        for (field, p) in [
            ("tick.status_change_probability", t.status_change_probability),
            ("tick.trade_probability", t.trade_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if t.confidence_min > t.confidence_max {
            errors.push(ConfigError::new("tick.confidence_min", "must be <= tick.confidence_max"));
        }
        for (field, width) in [
            ("tick.price_jitter", t.price_jitter),
            ("tick.efficiency_jitter", t.efficiency_jitter),
            ("tick.energy_jitter_kwh", t.energy_jitter_kwh),
            ("tick.forecast_amount_jitter_kwh", t.forecast_amount_jitter_kwh),
            ("tick.confidence_jitter", t.confidence_jitter),
            ("tick.volume_drift_max_kwh", t.volume_drift_max_kwh),
            ("tick.carbon_offset_drift_max", t.carbon_offset_drift_max),
        ] {
            if width < 0.0 {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }

        if self.agents.is_empty() {
            errors.push(ConfigError::new("agents", "at least one agent is required"));
        }
        if !self.agents.iter().any(|a| a.kind == AgentKind::Producer) {
            errors.push(ConfigError::new("agents", "at least one producer is required"));
        }
        if !self.agents.iter().any(|a| a.kind == AgentKind::Consumer) {
            errors.push(ConfigError::new("agents", "at least one consumer is required"));
        }

        let mut seen = HashSet::new();
        for (i, a) in self.agents.iter().enumerate() {
            let prefix = format!("agents[{i}]");
            if a.id.is_empty() {
                errors.push(ConfigError::new(format!("{prefix}.id"), "must not be empty"));
            } else if !seen.insert(a.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("{prefix}.id"),
                    format!("duplicate id \"{}\"", a.id),
                ));
            }
            if a.energy_capacity_kwh <= 0.0 {
                errors.push(ConfigError::new(
                    format!("{prefix}.energy_capacity_kwh"),
                    "must be > 0",
                ));
            }
            if !(0.0..=a.energy_capacity_kwh).contains(&a.current_energy_kwh) {
                errors.push(ConfigError::new(
                    format!("{prefix}.current_energy_kwh"),
                    "must be in [0.0, energy_capacity_kwh]",
                ));
            }
            if !(0.0..=1.0).contains(&a.efficiency) {
                errors.push(ConfigError::new(
                    format!("{prefix}.efficiency"),
                    "must be in [0.0, 1.0]",
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
seed = 99
ticks = 50
tick_interval_ms = 1000
start_time = "2024-06-01T12:00:00Z"

[market]
current_price = 0.2
network_efficiency = 0.9

[tick]
trade_probability = 0.5
clamp_energy_floor = true

[[agents]]
id = "p"
name = "Rooftop PV"
kind = "producer"
energy_capacity_kwh = 50.0
current_energy_kwh = 20.0
price_per_kwh = 0.1
efficiency = 0.9
carbon_footprint = 0.03

[[agents]]
id = "c"
name = "Bakery"
kind = "consumer"
energy_capacity_kwh = 80.0
current_energy_kwh = 10.0
price_per_kwh = 0.16
status = "idle"
efficiency = 0.85
location = "Lyon, France"
carbon_footprint = 0.07
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.ticks), Some(50));
        assert_eq!(cfg.as_ref().map(|c| c.agents.len()), Some(2));
        assert_eq!(
            cfg.as_ref().map(|c| c.agents[1].status),
            Some(AgentStatus::Idle)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.agents[0].status),
            Some(AgentStatus::Active)
        );
        assert_eq!(cfg.as_ref().map(|c| c.tick.clamp_energy_floor), Some(true));
        assert!(cfg.as_ref().and_then(|c| c.simulation.start_time).is_some());
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
seed = 1
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.tick_interval_ms), Some(3000));
        assert_eq!(cfg.as_ref().map(|c| c.agents.len()), Some(4));
        assert_eq!(cfg.as_ref().map(|c| c.market.current_price), Some(0.135));
    }

    #[test]
    fn validation_catches_zero_interval() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.tick_interval_ms = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.tick_interval_ms"));
    }

    #[test]
    fn validation_caps_interval_at_one_day() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.tick_interval_ms = MAX_TICK_INTERVAL_MS;
        assert!(cfg.validate().is_empty());

        cfg.simulation.tick_interval_ms = 10_000_000_000_000_000;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "simulation.tick_interval_ms");
    }

    #[test]
    fn validation_catches_duplicate_ids() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.agents[1].id = "1".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "agents[1].id"));
    }

    #[test]
    fn validation_catches_energy_over_capacity() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.agents[0].current_energy_kwh = 2000.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "agents[0].current_energy_kwh"));
    }

    #[test]
    fn validation_requires_both_sides() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.agents.retain(|a| a.kind == AgentKind::Producer);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("consumer")));
    }

    #[test]
    fn validation_catches_bad_probability() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.tick.trade_probability = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tick.trade_probability"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn wind_rich_adds_producer() {
        let base = ScenarioConfig::baseline();
        let wind = ScenarioConfig::wind_rich();
        assert_eq!(wind.agents.len(), base.agents.len() + 1);
        assert!(wind.market.current_price < base.market.current_price);
    }

    #[test]
    fn grid_stress_is_more_volatile() {
        let base = ScenarioConfig::baseline();
        let stress = ScenarioConfig::grid_stress();
        assert!(stress.tick.price_jitter > base.tick.price_jitter);
        assert!(stress.tick.trade_probability > base.tick.trade_probability);
    }

    #[test]
    fn error_display_names_field() {
        let e = ConfigError::new("agents", "at least one agent is required");
        assert_eq!(
            e.to_string(),
            "config error: agents: at least one agent is required"
        );
    }
}
