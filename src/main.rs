//! Entry point: CLI wiring, scenario loading, headless run or dashboard.

use std::path::Path;
use std::process;

use chrono::Utc;

use p2p_energy_sim::cli::{self, CliOptions};
use p2p_energy_sim::config::ScenarioConfig;
use p2p_energy_sim::io::export;
use p2p_energy_sim::logging;
use p2p_energy_sim::sim::engine::Engine;
use p2p_energy_sim::sim::kpi::MarketSummary;
use p2p_energy_sim::view::{AgentCardView, MarketTiles, PriceChart, transaction_rows};

/// Loads the scenario named by the CLI: `--scenario` file or `--preset`.
fn load_scenario(cli: &CliOptions) -> ScenarioConfig {
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks {
        scenario.simulation.ticks = ticks;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    scenario
}

fn write_or_exit(what: &str, path: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        eprintln!("error: failed to write {what}: {e}");
        process::exit(1);
    }
    eprintln!("{what} written to {}", path.display());
}

fn run_headless(cli: &CliOptions, scenario: &ScenarioConfig) {
    let mut engine = Engine::from_scenario(scenario, Utc::now());
    let opening = engine.state().market.clone();
    let opening_energy = engine.state().min_agent_energy_kwh();
    log::info!(
        "running {} ticks, seed {}",
        scenario.simulation.ticks,
        scenario.simulation.seed
    );

    let reports = engine.run();
    for r in &reports {
        println!("{r}");
    }

    let summary = MarketSummary::from_reports(
        &reports,
        opening.current_price,
        opening.total_volume_kwh,
        opening.carbon_offset,
        opening.network_efficiency,
        opening_energy,
    );
    println!("\n{summary}");

    let state = engine.state();
    println!("\n--- Market ---");
    for tile in MarketTiles::new(&state.market).iter() {
        println!("{:<20}{:>12}  {}", tile.title, tile.value, tile.caption);
    }
    let chart = PriceChart::new(&state.market.price_history);
    println!("Price range (24h):  {} .. {}", chart.min_label(), chart.max_label());

    println!("\n--- Agents ---");
    for agent in &state.agents {
        for line in AgentCardView::new(agent, true).lines() {
            println!("{line}");
        }
    }

    println!("\n--- Transactions ({}) ---", state.transactions.len());
    for row in transaction_rows(state.transactions.iter(), &state.agents) {
        println!("{}", row.line());
    }

    if let Some(path) = &cli.telemetry_out {
        write_or_exit("Telemetry", path, export::export_ticks_csv(&reports, path));
    }
    if let Some(path) = &cli.transactions_out {
        write_or_exit(
            "Transactions",
            path,
            export::export_transactions_csv(state.transactions.iter(), path),
        );
    }
    if let Some(path) = &cli.snapshot_out {
        write_or_exit("Snapshot", path, export::export_snapshot_json(state, path));
    }
    if let Some(path) = &cli.chart_out {
        write_or_exit("Chart", path, export::export_chart_svg(state, path));
    }
}

#[cfg(feature = "tui")]
fn run_tui(cli: &CliOptions, scenario: ScenarioConfig) {
    let name = match (&cli.scenario, &cli.preset) {
        (Some(_), _) => "custom",
        (None, Some(name)) => name.as_str(),
        (None, None) => "baseline",
    };
    if let Err(e) = p2p_energy_sim::tui::run(scenario, name) {
        eprintln!("error: TUI crashed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn run_tui(_cli: &CliOptions, _scenario: ScenarioConfig) {
    eprintln!("error: this build does not include the terminal dashboard (feature `tui`)");
    process::exit(1);
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    if let Err(e) = logging::init(cli.tui, cli.log_file.as_deref()) {
        eprintln!("error: failed to open log file: {e}");
        process::exit(1);
    }

    let scenario = load_scenario(&cli);

    if cli.tui {
        run_tui(&cli, scenario);
    } else {
        run_headless(&cli, &scenario);
    }
}
