//! Price history chart geometry and SVG rendering.
//!
//! Points are laid out on a fixed 100 x 100 plot area inset by a 20-unit
//! padding, so the full canvas is 140 x 140. The y axis is scaled to the
//! observed min/max of the current window.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::market::PricePoint;
use crate::market::state::price_bounds;

/// Plot area width.
pub const WIDTH: f64 = 100.0;
/// Plot area height.
pub const HEIGHT: f64 = 100.0;
/// Inset on every side of the plot area.
pub const PADDING: f64 = 20.0;
/// Every n-th point carries an hour label.
pub const LABEL_EVERY: usize = 6;

const LINE_COLOR: &str = "#3b82f6";
const AXIS_COLOR: &str = "#e5e7eb";
const LABEL_COLOR: &str = "#6b7280";

/// A history point projected onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// An hour label under the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub x: f64,
    pub text: String,
}

/// Projected price history.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChart {
    pub points: Vec<ChartPoint>,
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceChart {
    /// Projects a price window onto the canvas.
    ///
    /// A flat window draws along the vertical midpoint and a single point
    /// sits on the y axis. An empty window yields no points.
    pub fn new<'a>(history: impl IntoIterator<Item = &'a PricePoint>) -> Self {
        let history: Vec<&PricePoint> = history.into_iter().collect();
        let (min_price, max_price) =
            price_bounds(history.iter().map(|p| p.price)).unwrap_or((0.0, 0.0));
        let range = max_price - min_price;
        let last = history.len().saturating_sub(1);

        let points = history
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = if last == 0 {
                    PADDING
                } else {
                    PADDING + (i as f64 / last as f64) * WIDTH
                };
                let y = if range > 0.0 {
                    PADDING + HEIGHT - ((p.price - min_price) / range) * HEIGHT
                } else {
                    PADDING + HEIGHT / 2.0
                };
                ChartPoint {
                    x,
                    y,
                    price: p.price,
                    timestamp: p.timestamp,
                }
            })
            .collect();

        Self {
            points,
            min_price,
            max_price,
        }
    }

    /// SVG path data, `M x y L x y ...`.
    pub fn path_data(&self) -> String {
        let mut d = String::new();
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                d.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd} {} {}", p.x, p.y);
        }
        d
    }

    /// Hour labels for every [`LABEL_EVERY`]-th point, starting with the first.
    pub fn hour_labels(&self) -> Vec<AxisLabel> {
        self.points
            .iter()
            .step_by(LABEL_EVERY)
            .map(|p| AxisLabel {
                x: p.x,
                text: p.timestamp.format("%H").to_string(),
            })
            .collect()
    }

    pub fn max_label(&self) -> String {
        format!("${:.3}", self.max_price)
    }

    pub fn min_label(&self) -> String {
        format!("${:.3}", self.min_price)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Renders a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let size_w = WIDTH + PADDING * 2.0;
        let size_h = HEIGHT + PADDING * 2.0;
        let bottom = HEIGHT + PADDING;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size_w} {size_h}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{PADDING}" y1="{PADDING}" x2="{PADDING}" y2="{bottom}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{PADDING}" y1="{bottom}" x2="{}" y2="{bottom}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#,
            WIDTH + PADDING
        );
        if !self.is_empty() {
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="none" stroke="{LINE_COLOR}" stroke-width="2"/>"#,
                self.path_data()
            );
        }
        for p in &self.points {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{}" cy="{}" r="2" fill="{LINE_COLOR}"/>"#,
                p.x, p.y
            );
        }
        for label in self.hour_labels() {
            let _ = writeln!(
                svg,
                r#"  <text x="{}" y="{}" text-anchor="middle" font-size="6" fill="{LABEL_COLOR}">{}</text>"#,
                label.x,
                bottom + 15.0,
                label.text
            );
        }
        if !self.is_empty() {
            let lx = PADDING - 5.0;
            let _ = writeln!(
                svg,
                r#"  <text x="{lx}" y="{PADDING}" text-anchor="end" dominant-baseline="middle" font-size="6" fill="{LABEL_COLOR}">{}</text>"#,
                self.max_label()
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{lx}" y="{bottom}" text-anchor="end" dominant-baseline="middle" font-size="6" fill="{LABEL_COLOR}">{}</text>"#,
                self.min_label()
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn history(prices: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + TimeDelta::hours(i as i64),
                price,
            })
            .collect()
    }

    #[test]
    fn endpoints_span_plot_area() {
        let chart = PriceChart::new(&history(&[0.10, 0.15, 0.20]));
        let first = chart.points[0];
        let last = chart.points[2];
        assert_eq!((first.x, first.y), (20.0, 120.0));
        assert_eq!((last.x, last.y), (120.0, 20.0));
        assert!((chart.points[1].y - 70.0).abs() < 1e-9);
    }

    #[test]
    fn path_uses_move_then_lines() {
        let chart = PriceChart::new(&history(&[0.10, 0.20]));
        assert_eq!(chart.path_data(), "M 20 120 L 120 20");
    }

    #[test]
    fn flat_window_draws_at_midpoint() {
        let chart = PriceChart::new(&history(&[0.13; 4]));
        assert!(chart.points.iter().all(|p| p.y == 70.0));
        assert!(chart.points.iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn single_point_sits_on_axis() {
        let chart = PriceChart::new(&history(&[0.13]));
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].x, PADDING);
        assert_eq!(chart.path_data(), "M 20 70");
    }

    #[test]
    fn labels_every_sixth_hour() {
        let prices: Vec<f64> = (0..24).map(|i| 0.13 + f64::from(i) * 0.001).collect();
        let chart = PriceChart::new(&history(&prices));
        let labels: Vec<String> = chart.hour_labels().into_iter().map(|l| l.text).collect();
        assert_eq!(labels, ["00", "06", "12", "18"]);
        assert_eq!(chart.min_label(), "$0.130");
        assert_eq!(chart.max_label(), "$0.153");
    }

    #[test]
    fn svg_document_has_markers() {
        let chart = PriceChart::new(&history(&[0.12, 0.14, 0.13]));
        let svg = chart.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 140 140""#));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_history_renders_axes_only() {
        let chart = PriceChart::new(&Vec::<PricePoint>::new());
        assert!(chart.is_empty());
        assert_eq!(chart.path_data(), "");
        assert!(!chart.to_svg().contains("<path"));
    }
}
