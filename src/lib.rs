//! Simulated peer-to-peer energy trading market.
//!
//! Producer and consumer agents drift randomly on a fixed tick, the market
//! aggregate follows, and trades are either synthesized by the tick or
//! entered through a manual trade form. Presentation is a terminal
//! dashboard (feature `tui`) or a headless run with file exports.

/// Command-line parsing for the binary.
pub mod cli;
pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod market;
/// Injectable randomness.
pub mod random;
/// Tick simulator, state store, trade flow, and run summary.
pub mod sim;
#[cfg(feature = "tui")]
pub mod tui;
pub mod view;
