use std::env;
use std::path::PathBuf;

use crate::config::ScenarioConfig;

#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub ticks: Option<usize>,
    pub telemetry_out: Option<PathBuf>,
    pub transactions_out: Option<PathBuf>,
    pub snapshot_out: Option<PathBuf>,
    pub chart_out: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub tui: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--ticks" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --ticks (expected a count)")?;
                let ticks = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--ticks value \"{raw}\" is not a valid count"))?;
                opts.ticks = Some(ticks);
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--transactions-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --transactions-out (expected a file path)",
                )?;
                if opts.transactions_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--transactions-out provided more than once".to_string());
                }
            }
            "--snapshot-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --snapshot-out (expected a file path)")?;
                if opts.snapshot_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--snapshot-out provided more than once".to_string());
                }
            }
            "--chart-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --chart-out (expected a file path)")?;
                if opts.chart_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--chart-out provided more than once".to_string());
                }
            }
            "--log-file" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --log-file (expected a file path)")?;
                opts.log_file = Some(PathBuf::from(path));
            }
            "--tui" => opts.tui = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("baseline".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("p2p-energy-sim: simulated peer-to-peer energy trading dashboard");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  p2p-energy-sim [--scenario <path> | --preset <name>] [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>          Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>            Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>               Override random seed");
    eprintln!("  --ticks <n>                Override number of headless ticks");
    eprintln!("  --telemetry-out <path>     Export per-tick telemetry to CSV");
    eprintln!("  --transactions-out <path>  Export the final transaction log to CSV");
    eprintln!("  --snapshot-out <path>      Export the final state to JSON");
    eprintln!("  --chart-out <path>         Export the price history chart to SVG");
    eprintln!("  --log-file <path>          Write log output to a file");
    eprintln!("  --tui                      Launch the live terminal dashboard");
    eprintln!("  --help                     Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(args(&["--scenario", "scenario.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn defaults_to_baseline_preset() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("baseline"));
        assert!(!opts.tui);
        assert!(opts.ticks.is_none());
    }

    #[test]
    fn parses_overrides_and_outputs() {
        let opts = parse_args_from(args(&[
            "--preset",
            "wind_rich",
            "--seed",
            "7",
            "--ticks",
            "50",
            "--snapshot-out",
            "state.json",
            "--tui",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("wind_rich"));
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.ticks, Some(50));
        assert!(opts.snapshot_out.is_some());
        assert!(opts.tui);
    }

    #[test]
    fn rejects_scenario_with_preset() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "baseline"]))
            .err()
            .unwrap_or_default();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_seed_and_missing_values() {
        assert!(parse_args_from(args(&["--seed", "abc"])).is_err());
        assert!(parse_args_from(args(&["--telemetry-out"])).is_err());
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }
}
