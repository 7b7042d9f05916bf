//! `env_logger` setup for the two run modes.

use std::fs::File;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(tui: bool, log_file: Option<&Path>) -> &'static str {
    match (tui, log_file) {
        (true, None) => "off",
        _ => "info",
    }
}

/// Installs the global logger.
///
/// `RUST_LOG` overrides the default filter. With a log file, output goes
/// there instead of stderr. The TUI without a log file discards all output,
/// `RUST_LOG` included.
/// Repeated calls are ignored.
///
/// # Errors
///
/// Returns an `io::Error` if the log file cannot be created.
pub fn init(tui: bool, log_file: Option<&Path>) -> io::Result<()> {
    let env = Env::default().default_filter_or(default_filter(tui, log_file));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();
    builder.target(target(tui, log_file)?);
    let _ = builder.try_init();
    Ok(())
}

/// Where log records are written for the given run mode.
fn target(tui: bool, log_file: Option<&Path>) -> io::Result<Target> {
    Ok(match log_file {
        Some(path) => Target::Pipe(Box::new(File::create(path)?)),
        None if tui => Target::Pipe(Box::new(io::sink())),
        None => Target::Stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_is_silent_without_file() {
        assert_eq!(default_filter(true, None), "off");
        assert_eq!(default_filter(true, Some(Path::new("sim.log"))), "info");
        assert_eq!(default_filter(false, None), "info");
    }

    #[test]
    fn tui_never_writes_to_stderr() {
        assert!(matches!(target(true, None), Ok(Target::Pipe(_))));
        assert!(matches!(target(false, None), Ok(Target::Stderr)));

        let path = std::env::temp_dir()
            .join(format!("p2p-energy-sim-log-{}.log", std::process::id()));
        assert!(matches!(target(true, Some(&path)), Ok(Target::Pipe(_))));
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
