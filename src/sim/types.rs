//! Core simulation types: tick parameters and per-tick reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::market::TransactionId;

/// Perturbation constants applied on every tick.
///
/// Widths are full ranges: a jitter of `0.01` draws from `U(-0.005, 0.005)`.
/// Defaults reproduce the reference dashboard.
///
/// # Examples
///
/// ```
/// use p2p_energy_sim::sim::types::TickParams;
///
/// let params = TickParams::default();
/// assert_eq!(params.trade_probability, 0.3);
/// assert!(!params.clamp_energy_floor);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TickParams {
    /// Market price jitter width (currency/kWh).
    pub price_jitter: f64,
    /// Upper bound of the per-tick volume increase (kWh).
    pub volume_drift_max_kwh: f64,
    /// Upper bound of the per-tick carbon offset increase.
    pub carbon_offset_drift_max: f64,
    /// Network efficiency jitter width.
    pub efficiency_jitter: f64,
    /// Agent energy jitter width (kWh).
    pub energy_jitter_kwh: f64,
    /// Clamp agent energy at zero after perturbation.
    pub clamp_energy_floor: bool,
    /// Probability that an agent's status is redrawn.
    pub status_change_probability: f64,
    /// Forecast amount jitter width (kWh).
    pub forecast_amount_jitter_kwh: f64,
    /// Forecast confidence jitter width.
    pub confidence_jitter: f64,
    pub confidence_min: f64,
    pub confidence_max: f64,
    /// Probability that a random transaction is synthesized.
    pub trade_probability: f64,
    /// Producers need strictly more than this to be picked as seller (kWh).
    pub min_seller_energy_kwh: f64,
    /// Upper bound of the raw amount draw (kWh).
    pub trade_draw_max_kwh: f64,
    /// Cap applied to the floored amount draw (kWh).
    pub max_trade_kwh: f64,
}

impl Default for TickParams {
    fn default() -> Self {
        Self {
            price_jitter: 0.01,
            volume_drift_max_kwh: 10.0,
            carbon_offset_drift_max: 0.1,
            efficiency_jitter: 0.01,
            energy_jitter_kwh: 50.0,
            clamp_energy_floor: false,
            status_change_probability: 0.3,
            forecast_amount_jitter_kwh: 10.0,
            confidence_jitter: 0.1,
            confidence_min: 0.5,
            confidence_max: 1.0,
            trade_probability: 0.3,
            min_seller_energy_kwh: 100.0,
            trade_draw_max_kwh: 200.0,
            max_trade_kwh: 100.0,
        }
    }
}

/// Market snapshot captured after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Zero-based tick index.
    pub tick: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub total_volume_kwh: f64,
    pub carbon_offset: f64,
    pub network_efficiency: f64,
    /// Lowest agent energy after the tick (kWh); negative values are possible.
    pub min_agent_energy_kwh: f64,
    /// Transaction synthesized on this tick, if any.
    pub synthesized: Option<TransactionId>,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick={:>4} {} | price=${:.4}/kWh  volume={:>9.1} kWh  carbon={:>7.2}  eff={:>5.1}% \
             | min_energy={:>7.1} kWh",
            self.tick,
            self.timestamp.format("%H:%M:%S"),
            self.price,
            self.total_volume_kwh,
            self.carbon_offset,
            self.network_efficiency * 100.0,
            self.min_agent_energy_kwh,
        )?;
        if let Some(id) = self.synthesized {
            write!(f, " | trade {id}")?;
        }
        Ok(())
    }
}
