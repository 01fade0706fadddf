//! System diagnostics and dependency checking.
//!
//! Verifies that the split program and the configured per-segment tool are
//! installed before a long batch run fails halfway through.

use crate::config::Config;
use crate::defaults;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and is executable.
fn check_command(command: &str, probe_arg: &str) -> CheckResult {
    match Command::new(command).arg(probe_arg).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        // Some tools return non-zero for --help but still exist and run.
        Ok(_) => CheckResult::Warning(format!("'{}' found but '{}' failed", command, probe_arg)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Run all dependency checks and print results.
///
/// Returns true when every required tool is present.
pub fn check_dependencies(config: &Config) -> bool {
    println!("Checking external tools...\n");
    let mut all_ok = true;

    print!("{} (splitter): ", defaults::SPLIT_PROGRAM);
    match check_command(defaults::SPLIT_PROGRAM, "-version") {
        CheckResult::Ok => println!("OK"),
        CheckResult::NotFound => {
            println!("NOT FOUND");
            println!("  Install ffmpeg, e.g.: sudo apt install ffmpeg");
            all_ok = false;
        }
        CheckResult::Warning(message) => println!("WARNING: {}", message),
    }

    print!("{} (per-segment tool): ", config.tool.program);
    match check_command(&config.tool.program, "--help") {
        CheckResult::Ok => println!("OK"),
        CheckResult::NotFound => {
            println!("NOT FOUND");
            println!(
                "  Set [tool].program in the config file to a tool on PATH \
                 (currently '{}')",
                config.tool.program
            );
            all_ok = false;
        }
        CheckResult::Warning(message) => println!("WARNING: {}", message),
    }

    println!();
    if all_ok {
        println!("All required tools available.");
    } else {
        println!("Some tools are missing; runs will fail at those stages.");
    }
    all_ok
}
