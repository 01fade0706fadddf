use anyhow::Result;
use chunkscribe::cli::{Cli, Commands, ConfigAction};
use chunkscribe::config::Config;
use chunkscribe::diagnostics::check_dependencies;
use chunkscribe::exec::SystemCommandExecutor;
use chunkscribe::orchestrate::Orchestrator;
use chunkscribe::retime::Retimer;
use clap::Parser;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            model,
            device,
            nominal,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = input {
                config.paths.raw_audio = dir;
            }
            if let Some(model) = model {
                config.tool.model = model;
            }
            if let Some(device) = device {
                config.tool.device = device;
            }
            if let Some(nominal) = nominal {
                config.split.nominal_secs = nominal;
            }

            let executor = SystemCommandExecutor::new();
            let orchestrator = Orchestrator::new(&config, &executor, cli.quiet, cli.verbose);
            let summary = orchestrator.run()?;
            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Commands::Retime { nominal } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(nominal) = nominal {
                config.split.nominal_secs = nominal;
            }
            let summary = Retimer::new(&config, cli.quiet).run()?;
            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Load configuration from an explicit path or the default location.
///
/// An explicit `--config` path must exist; the default path falls back to
/// built-in defaults when missing. Environment overrides apply last.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        if !path.exists() {
            anyhow::bail!("Configuration file not found at {}", path.display());
        }
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    Ok(config.with_env_overrides())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init => {
            let path = custom_path
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_path);
            if path.exists() {
                anyhow::bail!("Configuration file already exists at {}", path.display());
            }
            Config::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
    }
    Ok(())
}
