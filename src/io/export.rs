//! One-way exports: tick telemetry and transaction CSVs, a JSON state
//! snapshot, and the price chart as SVG.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::market::Transaction;
use crate::sim::store::SimState;
use crate::sim::types::TickReport;
use crate::view::PriceChart;

/// Column header for the per-tick telemetry CSV.
const TICK_HEADER: &str = "tick,timestamp,price,total_volume_kwh,carbon_offset,\
                           network_efficiency,min_agent_energy_kwh,synthesized_tx";

/// Column header for the transaction CSV.
const TRANSACTION_HEADER: &str = "id,timestamp,origin,status,seller_id,buyer_id,\
                                  amount_kwh,price_per_kwh,cost,carbon_saved_kg";

/// Exports tick reports to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_ticks_csv(reports: &[TickReport], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_ticks_csv(reports, io::BufWriter::new(file))
}

/// Writes tick reports as CSV to any writer.
///
/// One header row, then one row per tick. Output is deterministic for
/// identical input.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_ticks_csv(reports: &[TickReport], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TICK_HEADER.split(',').map(str::trim))?;

    for r in reports {
        wtr.write_record(&[
            r.tick.to_string(),
            r.timestamp.to_rfc3339(),
            format!("{:.6}", r.price),
            format!("{:.4}", r.total_volume_kwh),
            format!("{:.4}", r.carbon_offset),
            format!("{:.6}", r.network_efficiency),
            format!("{:.4}", r.min_agent_energy_kwh),
            r.synthesized.map(|id| id.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports transactions (newest first) to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_transactions_csv<'a>(
    txs: impl IntoIterator<Item = &'a Transaction>,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_transactions_csv(txs, io::BufWriter::new(file))
}

/// Writes transactions as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_transactions_csv<'a>(
    txs: impl IntoIterator<Item = &'a Transaction>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRANSACTION_HEADER.split(',').map(str::trim))?;

    for tx in txs {
        wtr.write_record(&[
            tx.id.to_string(),
            tx.timestamp.to_rfc3339(),
            tx.origin.to_string(),
            tx.status.to_string(),
            tx.seller_id.to_string(),
            tx.buyer_id.to_string(),
            format!("{:.4}", tx.amount_kwh),
            format!("{:.6}", tx.price_per_kwh),
            format!("{:.4}", tx.cost()),
            format!("{:.4}", tx.carbon_saved_kg),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the full state as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_snapshot_json(state: &SimState, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_snapshot_json(state, io::BufWriter::new(file))
}

/// Serializes the state as pretty-printed JSON into any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_snapshot_json(state: &SimState, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, state)?;
    writeln!(writer)?;
    writer.flush()
}

/// Writes the price chart of `state` as an SVG document.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_chart_svg(state: &SimState, path: &Path) -> io::Result<()> {
    let chart = PriceChart::new(&state.market.price_history);
    let mut file = io::BufWriter::new(File::create(path)?);
    file.write_all(chart.to_svg().as_bytes())?;
    file.flush()
}
