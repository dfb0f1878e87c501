use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::errors::CliError;

pub const LOG_ENV_VAR: &str = "BIZLENS_LOG";

#[derive(Debug, Clone)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub debug: bool,
}

impl OutputMode {
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        let text = serde_json::to_string(value)?;
        println!("{text}");
        Ok(())
    }

    pub fn print_human(&self, message: &str) {
        if self.json || self.quiet {
            return;
        }
        println!("{message}");
    }

    pub fn print_stderr(&self, message: &str) {
        if self.json || self.quiet {
            return;
        }
        eprintln!("{message}");
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Install the global subscriber. `log_file` redirects output away from the
/// terminal (used while the TUI owns the screen).
pub fn init_tracing(mode: &OutputMode, log_file: Option<&Path>) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("bizlens={}", mode.log_level())));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|err| CliError::Generic(format!("Failed to initialize logging: {err}")))
}

pub fn print_error(error: &CliError, mode: &OutputMode) {
    if mode.json {
        let payload = serde_json::json!({
            "error": error.to_string(),
            "code": error.exit_code()
        });
        println!(
            "{}",
            serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"unknown\"}".to_string())
        );
        return;
    }

    eprintln!("Error: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(quiet: bool, verbose: bool, debug: bool) -> OutputMode {
        OutputMode {
            json: false,
            quiet,
            verbose,
            debug,
        }
    }

    #[test]
    fn log_level_follows_flags() {
        assert_eq!(mode(false, false, false).log_level(), "warn");
        assert_eq!(mode(false, true, false).log_level(), "debug");
        assert_eq!(mode(false, true, true).log_level(), "trace");
        assert_eq!(mode(true, true, true).log_level(), "error");
    }
}
