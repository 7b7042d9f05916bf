//! Post-hoc market summary computed from tick reports.

use std::fmt;

use serde::Serialize;

use super::types::TickReport;
use crate::market::state::price_bounds;

/// Aggregate indicators derived from a complete run.
///
/// Computed post-hoc from `&[TickReport]` plus the opening values, so the
/// summary always agrees with the per-tick output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub ticks: usize,
    /// Price before the first tick.
    pub price_open: f64,
    /// Price after the last tick.
    pub price_close: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub price_mean: f64,
    /// Volume added over the run (kWh).
    pub volume_added_kwh: f64,
    pub carbon_offset_added: f64,
    /// Number of ticks that synthesized a transaction.
    pub synthesized_trades: usize,
    pub final_network_efficiency: f64,
    /// Lowest agent energy seen at the start or after any tick (kWh).
    pub min_agent_energy_kwh: f64,
}

impl MarketSummary {
    /// Computes the summary.
    ///
    /// # Arguments
    ///
    /// * `reports` - Per-tick reports in order
    /// * `price_open` - Market price before the first tick
    /// * `volume_open_kwh` - Cumulative volume before the first tick
    /// * `carbon_open` - Carbon offset before the first tick
    /// * `efficiency_open` - Network efficiency before the first tick
    /// * `energy_open_kwh` - Lowest agent energy before the first tick
    pub fn from_reports(
        reports: &[TickReport],
        price_open: f64,
        volume_open_kwh: f64,
        carbon_open: f64,
        efficiency_open: f64,
        energy_open_kwh: f64,
    ) -> Self {
        let Some(last) = reports.last() else {
            return Self {
                ticks: 0,
                price_open,
                price_close: price_open,
                price_min: price_open,
                price_max: price_open,
                price_mean: price_open,
                volume_added_kwh: 0.0,
                carbon_offset_added: 0.0,
                synthesized_trades: 0,
                final_network_efficiency: efficiency_open,
                min_agent_energy_kwh: energy_open_kwh,
            };
        };

        let n = reports.len() as f64;
        let (price_min, price_max) =
            price_bounds(reports.iter().map(|r| r.price)).unwrap_or((price_open, price_open));
        let price_mean = reports.iter().map(|r| r.price).sum::<f64>() / n;
        let min_energy = reports
            .iter()
            .map(|r| r.min_agent_energy_kwh)
            .fold(energy_open_kwh, f64::min);

        Self {
            ticks: reports.len(),
            price_open,
            price_close: last.price,
            price_min,
            price_max,
            price_mean,
            volume_added_kwh: last.total_volume_kwh - volume_open_kwh,
            carbon_offset_added: last.carbon_offset - carbon_open,
            synthesized_trades: reports.iter().filter(|r| r.synthesized.is_some()).count(),
            final_network_efficiency: last.network_efficiency,
            min_agent_energy_kwh: min_energy,
        }
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Market Summary ---")?;
        writeln!(f, "Ticks:                 {}", self.ticks)?;
        writeln!(
            f,
            "Price open/close:      ${:.4} / ${:.4} per kWh",
            self.price_open, self.price_close
        )?;
        writeln!(
            f,
            "Price min/mean/max:    ${:.4} / ${:.4} / ${:.4}",
            self.price_min, self.price_mean, self.price_max
        )?;
        writeln!(f, "Volume added:          {:.2} kWh", self.volume_added_kwh)?;
        writeln!(f, "Carbon offset added:   {:.3}", self.carbon_offset_added)?;
        writeln!(f, "Synthesized trades:    {}", self.synthesized_trades)?;
        writeln!(
            f,
            "Network efficiency:    {:.1}%",
            self.final_network_efficiency * 100.0
        )?;
        write!(f, "Min agent energy:      {:.1} kWh", self.min_agent_energy_kwh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::TransactionId;
    use chrono::{TimeZone, Utc};

    fn report(tick: usize, price: f64, volume: f64, synthesized: bool) -> TickReport {
        TickReport {
            tick,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            price,
            total_volume_kwh: volume,
            carbon_offset: 125.5 + tick as f64 * 0.05,
            network_efficiency: 0.93,
            min_agent_energy_kwh: 280.0 - tick as f64,
            synthesized: synthesized.then_some(TransactionId(tick as u64 + 1)),
        }
    }

    #[test]
    fn price_statistics() {
        let reports = vec![
            report(0, 0.13, 2455.0, false),
            report(1, 0.15, 2460.0, true),
            report(2, 0.14, 2465.0, true),
        ];
        let s = MarketSummary::from_reports(&reports, 0.135, 2450.0, 125.5, 0.93, 280.0);
        assert_eq!(s.ticks, 3);
        assert_eq!(s.price_min, 0.13);
        assert_eq!(s.price_max, 0.15);
        assert!((s.price_mean - 0.14).abs() < 1e-12);
        assert_eq!(s.price_close, 0.14);
        assert_eq!(s.volume_added_kwh, 15.0);
        assert_eq!(s.synthesized_trades, 2);
        assert_eq!(s.min_agent_energy_kwh, 278.0);
    }

    #[test]
    fn empty_reports() {
        let s = MarketSummary::from_reports(&[], 0.135, 2450.0, 125.5, 0.93, 280.0);
        assert_eq!(s.ticks, 0);
        assert_eq!(s.price_close, 0.135);
        assert_eq!(s.synthesized_trades, 0);
        assert_eq!(s.min_agent_energy_kwh, 280.0);
        assert!(s.to_string().contains("Min agent energy:      280.0 kWh"));
    }

    #[test]
    fn display_has_labelled_lines() {
        let reports = vec![report(0, 0.13, 2455.0, true)];
        let s = MarketSummary::from_reports(&reports, 0.135, 2450.0, 125.5, 0.93, 280.0);
        let text = s.to_string();
        assert!(text.contains("Synthesized trades:    1"));
        assert!(text.contains("Volume added:          5.00 kWh"));
    }
}
