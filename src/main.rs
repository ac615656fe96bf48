//! waitgate launcher
//!
//! Prints the startup arguments, then blocks until SIGINT or SIGTERM arrives.
//! SIGHUP prints `reloaded` without releasing. Launcher options come before the
//! first positional argument; that argument and everything after it are passed
//! through verbatim.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waitgate::config::{
    LauncherConfig, DEFAULT_LOG_FILTER, EXIT_INTERRUPTED, EXIT_RELEASED, EXIT_SETUP_FAILED,
};
use waitgate::error::GateError;
use waitgate::signal::parse_signal;
use waitgate::{Controller, SignalListener};

#[derive(Parser, Debug)]
#[command(name = "waitgate", version, about = "Block until released by a shutdown signal")]
struct Cli {
    /// Do not bind SIGHUP to reload
    #[arg(long)]
    no_reload: bool,

    /// Signal that interrupts the wait (name like USR1 or SIGQUIT, or a number)
    #[arg(long, value_name = "SIGNAL", value_parser = parse_signal_arg)]
    interrupt_signal: Option<i32>,

    /// Arguments reported at startup, verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries the lifecycle lines.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(LauncherConfig::new(!cli.no_reload, cli.interrupt_signal, cli.args))
}

// Unknown names are usage errors, reported by clap.
fn parse_signal_arg(name: &str) -> Result<i32, String> {
    parse_signal(name).map_err(|e| e.to_string())
}

fn run(config: LauncherConfig) -> ExitCode {
    let controller = Controller::new();

    let listener = match config
        .signal_map()
        .and_then(|map| SignalListener::spawn(map, controller.clone()))
    {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    tracing::info!(
        reload = config.reload,
        interrupt_signal = ?config.interrupt_signal,
        "waitgate v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let code = match controller.start(&config.args) {
        Ok(()) => EXIT_RELEASED,
        Err(GateError::Interrupted) => EXIT_INTERRUPTED,
        Err(e) => {
            tracing::error!("{}", e);
            EXIT_SETUP_FAILED
        }
    };

    listener.close();
    ExitCode::from(code)
}
