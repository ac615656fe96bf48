//! Configuration for the waitgate launcher
//!
//! Named constants for exit codes and default signal bindings, plus the
//! [`LauncherConfig`] the binary assembles from its command line.

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use crate::error::Result;
use crate::signal::{SignalAction, SignalMap};

/// Exit code after a normal release
pub const EXIT_RELEASED: u8 = 0;

/// Exit code when the wait was interrupted before any shutdown
pub const EXIT_INTERRUPTED: u8 = 1;

/// Exit code when the launcher itself could not be set up
pub const EXIT_SETUP_FAILED: u8 = 50;

/// Signals that request a shutdown
pub const SHUTDOWN_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Signal that requests a reload
pub const RELOAD_SIGNAL: i32 = SIGHUP;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "waitgate=info";

/// Launcher settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Bind the reload signal
    pub reload: bool,
    /// Optional signal that interrupts the wait
    pub interrupt_signal: Option<i32>,
    /// Arguments handed to `start`, verbatim
    pub args: Vec<String>,
}

impl LauncherConfig {
    pub fn new(reload: bool, interrupt_signal: Option<i32>, args: Vec<String>) -> Self {
        Self {
            reload,
            interrupt_signal,
            args,
        }
    }

    /// Signal bindings described by this config
    ///
    /// Fails when the interrupt signal is one that cannot be handled.
    pub fn signal_map(&self) -> Result<SignalMap> {
        let mut map = if self.reload {
            SignalMap::default()
        } else {
            SignalMap::shutdown_only()
        };
        if let Some(signal) = self.interrupt_signal {
            map.bind(signal, SignalAction::Interrupt)?;
        }
        Ok(map)
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            reload: true,
            interrupt_signal: None,
            args: Vec::new(),
        }
    }
}
