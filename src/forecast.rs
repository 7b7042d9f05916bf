//! Hourly energy forecasts attached to each agent.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::random::RandomSource;
use crate::sim::types::TickParams;

/// Number of hourly entries in a freshly generated forecast.
pub const FORECAST_HORIZON_HOURS: usize = 24;

/// Predicted energy for one future hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyForecast {
    pub timestamp: DateTime<Utc>,
    /// Predicted energy (kWh). Unbounded; repeated perturbation can push it negative.
    pub amount_kwh: f64,
    /// Confidence, kept within the tick's confidence bounds once perturbed.
    pub confidence: f64,
}

impl EnergyForecast {
    /// Returns a copy nudged by one tick of noise.
    ///
    /// Draws the amount jitter first, then the confidence jitter.
    pub fn perturbed<R: RandomSource>(&self, params: &TickParams, rng: &mut R) -> Self {
        let amount_kwh = self.amount_kwh + rng.symmetric(params.forecast_amount_jitter_kwh);
        let confidence = (self.confidence + rng.symmetric(params.confidence_jitter))
            .clamp(params.confidence_min, params.confidence_max);
        Self {
            timestamp: self.timestamp,
            amount_kwh,
            confidence,
        }
    }
}

/// Generates a fresh 24-hour forecast starting at `now`.
///
/// Amounts are whole kWh in `[50, 150]`, confidence is drawn from `[0.7, 1.0)`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use p2p_energy_sim::forecast::{generate_forecast, FORECAST_HORIZON_HOURS};
/// use p2p_energy_sim::random::SeededSource;
///
/// let forecast = generate_forecast(Utc::now(), &mut SeededSource::new(1));
/// assert_eq!(forecast.len(), FORECAST_HORIZON_HOURS);
/// ```
pub fn generate_forecast<R: RandomSource>(now: DateTime<Utc>, rng: &mut R) -> Vec<EnergyForecast> {
    (0..FORECAST_HORIZON_HOURS)
        .map(|i| EnergyForecast {
            timestamp: now + TimeDelta::hours(i as i64),
            amount_kwh: rng.uniform(50.0, 150.0).round(),
            confidence: rng.uniform(0.7, 1.0),
        })
        .collect()
}
