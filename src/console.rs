//! Output seam for the lifecycle messages
//!
//! Every message the controller emits goes through a [`Console`] as one whole
//! line. [`Stdout`] is what the binary uses; [`Transcript`] keeps the lines in
//! memory so callers can inspect the exact output order.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Prefix of the startup line, followed by the bracketed argument list
pub const STARTED_PREFIX: &str = "started: ";

/// Line printed once the main path has been released
pub const STOPPED: &str = "stopped";

/// Line printed by every reload
pub const RELOADED: &str = "reloaded";

/// A sink for lifecycle messages
pub trait Console: Send + Sync {
    /// Emit one line. Implementations append the line terminator themselves.
    fn line(&self, text: &str);
}

/// Writes lines to the process' standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Console for Stdout {
    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to stdout: {}", e);
        }
    }
}

/// Records lines in memory
///
/// Clones share the same buffer, so a test can hand one clone to a
/// controller and keep another to read back what was printed.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line recorded so far, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded lines equal to `text`
    pub fn count(&self, text: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|line| *line == text)
            .count()
    }
}

impl Console for Transcript {
    fn line(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_owned());
    }
}

/// Format arguments as a bracketed, comma-separated list: `[a, b]`
///
/// Elements are written verbatim; an empty list gives `[]`.
pub fn bracketed<S: AsRef<str>>(args: &[S]) -> String {
    let mut out = String::from("[");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(arg.as_ref());
    }
    out.push(']');
    out
}

/// The startup line for the given arguments
pub fn started_line<S: AsRef<str>>(args: &[S]) -> String {
    format!("{}{}", STARTED_PREFIX, bracketed(args))
}
