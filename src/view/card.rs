//! Agent card view model.

use crate::forecast::EnergyForecast;
use crate::market::{Agent, AgentId, AgentKind, AgentStatus};

/// Number of forecast rows shown in an expanded card.
pub const FORECAST_PREVIEW_LEN: usize = 3;

/// One row of the forecast preview.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    /// `HH:MM` of the forecast hour.
    pub label: String,
    pub amount_kwh: f64,
    /// Confidence as a percentage.
    pub confidence_pct: f64,
}

impl From<&EnergyForecast> for ForecastRow {
    fn from(f: &EnergyForecast) -> Self {
        Self {
            label: f.timestamp.format("%H:%M").to_string(),
            amount_kwh: f.amount_kwh,
            confidence_pct: f.confidence * 100.0,
        }
    }
}

/// Fields only visible once a card is expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    pub location: String,
    pub efficiency_pct: f64,
    pub carbon_footprint: f64,
    pub forecast: Vec<ForecastRow>,
}

/// Everything an agent card renders.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCardView {
    pub id: AgentId,
    pub name: String,
    pub kind: AgentKind,
    pub status: AgentStatus,
    /// Fill level of the energy bar, `current / capacity x 100`. Not clamped.
    pub energy_pct: f64,
    pub current_energy_kwh: f64,
    pub capacity_kwh: f64,
    pub price_per_kwh: f64,
    pub details: Option<CardDetails>,
}

impl AgentCardView {
    /// Builds the card for `agent`, including the detail panel when `expanded`.
    pub fn new(agent: &Agent, expanded: bool) -> Self {
        let details = expanded.then(|| CardDetails {
            location: agent.location.clone(),
            efficiency_pct: agent.efficiency * 100.0,
            carbon_footprint: agent.carbon_footprint,
            forecast: agent
                .forecast
                .iter()
                .take(FORECAST_PREVIEW_LEN)
                .map(ForecastRow::from)
                .collect(),
        });
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            kind: agent.kind,
            status: agent.status,
            energy_pct: agent.energy_pct(),
            current_energy_kwh: agent.current_energy_kwh,
            capacity_kwh: agent.energy_capacity_kwh,
            price_per_kwh: agent.price_per_kwh,
            details,
        }
    }

    /// Energy bar fill as a ratio in `[0, 1]`.
    pub fn energy_ratio(&self) -> f64 {
        (self.energy_pct / 100.0).clamp(0.0, 1.0)
    }

    /// Text lines for the headless dashboard.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("{} [{}] ({})", self.name, self.status, self.kind),
            format!(
                "  Energy Level {:>5.1}%  ({:.1} / {} kWh)",
                self.energy_pct, self.current_energy_kwh, self.capacity_kwh
            ),
            format!("  Price        ${}/kWh", self.price_per_kwh),
        ];
        if let Some(d) = &self.details {
            out.push(format!("  Location     {}", d.location));
            out.push(format!("  Efficiency   {:.1}%", d.efficiency_pct));
            out.push(format!("  Carbon       {} kg/kWh", d.carbon_footprint));
            out.push("  Energy Forecast".to_string());
            for row in &d.forecast {
                out.push(format!(
                    "    {}  {:>7.1} kWh  {:>3.0}%",
                    row.label, row.amount_kwh, row.confidence_pct
                ));
            }
        }
        out
    }
}
