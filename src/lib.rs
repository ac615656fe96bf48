//! waitgate: a process lifecycle gate
//!
//! This crate blocks a program's main path until something releases it:
//! - [`Controller::start`] prints the startup arguments and parks the caller
//! - [`Controller::shutdown`] releases it, after which `stopped` is printed
//! - [`Controller::reload`] prints `reloaded` and changes nothing else
//! - [`Controller::interrupt`] makes a parked `start` fail instead of stopping
//!
//! The [`signal`] module maps OS signals onto those operations, which is how the
//! `waitgate` binary is driven by a supervisor: SIGINT and SIGTERM shut down,
//! SIGHUP reloads.
//!
//! ## Example
//!
//! ```rust
//! use std::thread;
//! use waitgate::{console::Transcript, Controller};
//!
//! let transcript = Transcript::new();
//! let controller = Controller::with_console(transcript.clone());
//!
//! let main = controller.clone();
//! let handle = thread::spawn(move || main.start(&["a", "b"]));
//!
//! while controller.waiters() == 0 {
//!     thread::yield_now();
//! }
//! controller.reload();
//! controller.shutdown();
//! handle.join().unwrap().unwrap();
//!
//! assert_eq!(transcript.lines(), vec!["started: [a, b]", "reloaded", "stopped"]);
//! ```
//!
//! # Driving the gate from signals
//!
//! ```rust,no_run
//! use waitgate::{signal::{SignalListener, SignalMap}, Controller};
//!
//! # fn main() -> waitgate::error::Result<()> {
//! let controller = Controller::new();
//! let listener = SignalListener::spawn(SignalMap::default(), controller.clone())?;
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! controller.start(&args)?;
//! listener.close();
//! # Ok(())
//! # }
//! ```

#![deny(warnings)]

pub mod config;
pub mod console;
pub mod controller;
pub mod signal;

// Re-export core types
pub use console::{Console, Stdout, Transcript};
pub use controller::{Controller, Phase};
pub use signal::{SignalAction, SignalListener, SignalMap};

/// Error types for the gate
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum GateError {
        #[error("Wait interrupted before release")]
        Interrupted,

        #[error("Failed to register signal handlers: {0}")]
        SignalSetup(#[from] std::io::Error),

        #[error("Unknown signal: {0}")]
        UnknownSignal(String),

        #[error("Signal {0} cannot be handled")]
        ForbiddenSignal(i32),
    }

    pub type Result<T> = std::result::Result<T, GateError>;
}
