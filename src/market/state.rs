//! Aggregate market state and its sliding price history.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::random::RandomSource;

/// Number of points kept in the price history window.
pub const PRICE_HISTORY_LEN: usize = 24;

/// One observation in the price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Singleton market aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketState {
    /// Current clearing-ish price (currency/kWh).
    pub current_price: f64,
    /// Cumulative traded volume (kWh), never decreases.
    pub total_volume_kwh: f64,
    pub last_update: DateTime<Utc>,
    /// Exactly [`PRICE_HISTORY_LEN`] points, oldest first.
    pub price_history: VecDeque<PricePoint>,
    /// Static after initialisation.
    pub demand_forecast_kwh: f64,
    /// Cumulative carbon offset, never decreases.
    pub carbon_offset: f64,
    /// Capped at 1.0; no lower bound.
    pub network_efficiency: f64,
}

impl MarketState {
    /// Appends a point and drops the oldest so the window length is preserved.
    pub fn push_price(&mut self, point: PricePoint) {
        self.price_history.push_back(point);
        while self.price_history.len() > PRICE_HISTORY_LEN {
            self.price_history.pop_front();
        }
    }

    /// Lowest and highest price in the current window.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        price_bounds(self.price_history.iter().map(|p| p.price))
    }
}

/// Min and max of a sequence of prices, `None` when empty.
pub fn price_bounds(prices: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    prices.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}

/// Seeds a full history window ending at `now`, one point per hour.
///
/// Point `i` sits at `now - (23 - i)` hours and is priced `base + U(0, spread)`.
pub fn seed_price_history<R: RandomSource>(
    now: DateTime<Utc>,
    base: f64,
    spread: f64,
    rng: &mut R,
) -> VecDeque<PricePoint> {
    (0..PRICE_HISTORY_LEN)
        .map(|i| PricePoint {
            timestamp: now - TimeDelta::hours((PRICE_HISTORY_LEN - 1 - i) as i64),
            price: base + rng.uniform(0.0, spread),
        })
        .collect()
}
