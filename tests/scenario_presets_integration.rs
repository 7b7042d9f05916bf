use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_p2p-energy-sim"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("p2p-energy-sim process should run")
}

fn stdout_of(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_count(stdout: &str, label: &str) -> usize {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing summary line `{label}` in output: {stdout}"));
    line.split_once(':')
        .map(|(_, right)| right.trim())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| panic!("invalid summary format for line `{line}`"))
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("p2p-energy-sim-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir should be writable");
    dir.join(name)
}

#[test]
fn presets_run_via_cli_with_requested_tick_count() {
    for preset in ["baseline", "wind_rich", "grid_stress"] {
        let stdout = stdout_of(&["--preset", preset, "--ticks", "30"]);
        assert_eq!(parse_count(&stdout, "Ticks:"), 30, "preset {preset}");
        assert_eq!(
            stdout.lines().filter(|l| l.starts_with("tick=")).count(),
            30,
            "preset {preset}"
        );
        assert!(stdout.contains("--- Transactions"));
    }
}

#[test]
fn presets_produce_distinct_rosters() {
    let baseline = stdout_of(&["--preset", "baseline", "--ticks", "5"]);
    let wind = stdout_of(&["--preset", "wind_rich", "--ticks", "5"]);
    assert!(!baseline.contains("Offshore Wind Gamma"));
    assert!(wind.contains("Offshore Wind Gamma"));
}

#[test]
fn seeded_runs_are_reproducible() {
    let args = [
        "--scenario",
        "scenarios/microgrid.toml",
        "--seed",
        "11",
    ];
    let a = stdout_of(&args);
    let b = stdout_of(&args);
    assert_eq!(a, b);
    assert_eq!(parse_count(&a, "Ticks:"), 40);
    assert!(a.contains("Primary School"));
}

#[test]
fn zero_tick_run_reports_opening_values() {
    let stdout = stdout_of(&["--preset", "baseline", "--ticks", "0"]);
    assert_eq!(parse_count(&stdout, "Ticks:"), 0);
    assert!(!stdout.contains("NaN"));
    assert!(stdout.contains("Min agent energy:      280.0 kWh"));
}

#[test]
fn exports_are_written() {
    let telemetry = scratch("ticks.csv");
    let snapshot = scratch("state.json");
    let chart = scratch("chart.svg");
    let txs = scratch("txs.csv");

    stdout_of(&[
        "--preset",
        "grid_stress",
        "--ticks",
        "12",
        "--telemetry-out",
        telemetry.to_str().unwrap(),
        "--snapshot-out",
        snapshot.to_str().unwrap(),
        "--chart-out",
        chart.to_str().unwrap(),
        "--transactions-out",
        txs.to_str().unwrap(),
    ]);

    let csv = fs::read_to_string(&telemetry).unwrap();
    assert_eq!(csv.lines().count(), 13);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(json["market"]["price_history"].as_array().map(Vec::len), Some(24));
    assert!(fs::read_to_string(&chart).unwrap().contains("<path"));
    assert!(fs::read_to_string(&txs).unwrap().starts_with("id,"));
}

#[test]
fn invalid_scenario_exits_with_errors() {
    let path = scratch("bad.toml");
    fs::write(
        &path,
        "[simulation]\ntick_interval_ms = 0\n\n[market]\nnetwork_efficiency = 1.5\n",
    )
    .unwrap();

    let output = run(&["--scenario", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.tick_interval_ms"));
    assert!(stderr.contains("market.network_efficiency"));
}

#[test]
fn unknown_preset_is_rejected() {
    let output = run(&["--preset", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}
