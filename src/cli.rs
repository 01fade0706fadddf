//! Command-line interface for chunkscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chunked audio processing with resumable transcript merge
#[derive(Parser, Debug)]
#[command(
    name = "chunkscribe",
    version = crate::version_string(),
    about = "Chunked audio processing with resumable transcript merge"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (per-segment skip and timing lines)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split sources, run the per-segment tool, and merge transcripts
    Run {
        /// Directory of source recordings (overrides [paths].raw_audio)
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,

        /// Model identifier (overrides [tool].model)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Inference device (overrides [tool].device)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Nominal segment length (e.g., 30s, 2m, 90). Overrides [split].nominal_secs
        #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
        nominal: Option<f64>,
    },

    /// Rebuild per-segment timestamps from segment index and WAV duration
    Retime {
        /// Nominal segment length used when the segments were split
        #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
        nominal: Option<f64>,
    },

    /// Check that required external tools are installed
    Check,

    /// Inspect or create the configuration file
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration file actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML
    Show,
    /// Write a default configuration file
    Init,
    /// Print the default configuration file path
    Path,
}

/// Parse a duration string into seconds.
///
/// Supports bare numbers (seconds) and any duration format accepted by
/// `humantime`: single-unit (`30s`, `5m`, `2h`) and compound (`1h30m`).
fn parse_secs(s: &str) -> Result<f64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() && secs > 0.0 {
            return Ok(secs);
        }
        return Err("duration must be positive".to_string());
    }
    match humantime::parse_duration(s) {
        Ok(duration) => {
            let secs = duration.as_secs_f64();
            if secs > 0.0 {
                Ok(secs)
            } else {
                Err("duration must be positive".to_string())
            }
        }
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_secs_bare_number() {
        assert_eq!(parse_secs("30"), Ok(30.0));
        assert_eq!(parse_secs("7.5"), Ok(7.5));
    }

    #[test]
    fn test_parse_secs_humantime() {
        assert_eq!(parse_secs("30s"), Ok(30.0));
        assert_eq!(parse_secs("2m"), Ok(120.0));
        assert_eq!(parse_secs("1h30m"), Ok(5400.0));
    }

    #[test]
    fn test_parse_secs_rejects_nonsense() {
        assert!(parse_secs("abc").is_err());
        assert!(parse_secs("-5").is_err());
        assert!(parse_secs("0").is_err());
    }

    #[test]
    fn test_run_accepts_overrides() {
        let cli = Cli::parse_from([
            "chunkscribe",
            "run",
            "--model",
            "large-v3",
            "--nominal",
            "45s",
            "--quiet",
        ]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Run { model, nominal, .. } => {
                assert_eq!(model.as_deref(), Some("large-v3"));
                assert_eq!(nominal, Some(45.0));
            }
            other => panic!("Expected Run, got {:?}", other),
        }
    }
}
