//! Color constants and small drawing helpers for the TUI.

use ratatui::style::Color;

use crate::market::{AgentStatus, TransactionOrigin};

/// Price line color.
pub const PRICE_COLOR: Color = Color::Blue;
/// Energy bar color.
pub const ENERGY_COLOR: Color = Color::Green;
/// Forecast confidence bar color.
pub const CONFIDENCE_COLOR: Color = Color::Cyan;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Border of the selected card.
pub const SELECTED_BORDER: Color = Color::Yellow;
/// Focused trade form field.
pub const FOCUS_FG: Color = Color::Yellow;
/// Rejection notice.
pub const ERROR_FG: Color = Color::Red;

/// Badge color for an agent status.
pub fn status_color(status: AgentStatus) -> Color {
    match status {
        AgentStatus::Active => Color::Green,
        AgentStatus::Trading => Color::Blue,
        AgentStatus::Idle => Color::Gray,
    }
}

pub fn origin_color(origin: TransactionOrigin) -> Color {
    match origin {
        TransactionOrigin::Manual => Color::Magenta,
        TransactionOrigin::Synthesized => Color::Gray,
    }
}

/// A fixed-width text bar filled to `ratio` (clamped to `[0, 1]`).
pub fn meter(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

/// Computes Y-axis bounds from chart data points with 10% padding.
pub fn auto_bounds_y(data: &[(f64, f64)]) -> [f64; 2] {
    let ys = data.iter().map(|&(_, y)| y);
    let min = ys.clone().fold(f64::INFINITY, f64::min);
    let max = ys.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(0.001);
    let pad = range * 0.1;
    [min - pad, max + pad]
}
