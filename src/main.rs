//! infopanel: rotating widget display for LED matrix panels.
//!
//! Usage: `infopanel [CONFIG]` (defaults to `config.toml`; built-in defaults
//! are used when the file does not exist). Log verbosity follows `RUST_LOG`,
//! e.g. `RUST_LOG=infopanel=debug`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use infopanel::{Config, LedPanel, Scheduler, SchedulerError};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    match run(&config_path) {
        Ok(()) => {
            tracing::info!("Exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "infopanel failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &Path) -> Result<(), SchedulerError> {
    let config = Config::load(config_path)?;
    let mut scheduler = Scheduler::from_config(&config.scheduler)?;

    let shutdown = scheduler.shutdown_token();
    {
        let shutdown = shutdown.clone();
        if let Err(err) = ctrlc::set_handler(move || shutdown.cancel()) {
            tracing::warn!(error = %err, "Could not install Ctrl-C handler");
        }
    }

    let mut panel = LedPanel::new(&config.panel, shutdown)?;
    let result = scheduler.run(&mut panel);
    tracing::info!(frames = panel.frames(), "Panel closed");
    result
}
