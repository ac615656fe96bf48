//! Signal handling module
//!
//! Maps OS signals onto controller operations using the signal-hook crate.
//! [`SignalListener::spawn`] registers the handlers on the calling thread and
//! then hands received signals to a dedicated thread, which dispatches them to
//! the controller one at a time in arrival order.
//!
//! Default bindings:
//! - SIGINT, SIGTERM: shutdown
//! - SIGHUP: reload
//!
//! A further signal can be bound to interrupt the wait.

use nix::sys::signal::Signal;
use signal_hook::consts::FORBIDDEN;
use signal_hook::iterator::{Handle, Signals};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use crate::config::{RELOAD_SIGNAL, SHUTDOWN_SIGNALS};
use crate::controller::Controller;
use crate::error::{GateError, Result};

/// What a received signal does to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown,
    Reload,
    Interrupt,
}

/// Signal number to action bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMap {
    bindings: BTreeMap<i32, SignalAction>,
}

impl SignalMap {
    /// A map with no bindings
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// SIGINT and SIGTERM bound to shutdown, nothing else
    pub fn shutdown_only() -> Self {
        let mut map = Self::empty();
        for signal in SHUTDOWN_SIGNALS {
            map.bindings.insert(signal, SignalAction::Shutdown);
        }
        map
    }

    /// Bind `signal` to `action`, replacing any previous binding
    pub fn bind(&mut self, signal: i32, action: SignalAction) -> Result<()> {
        if FORBIDDEN.contains(&signal) {
            return Err(GateError::ForbiddenSignal(signal));
        }
        if let Some(previous) = self.bindings.insert(signal, action) {
            if previous != action {
                tracing::debug!("Signal {} rebound from {:?} to {:?}", signal, previous, action);
            }
        }
        Ok(())
    }

    /// Remove the binding for `signal`
    pub fn unbind(&mut self, signal: i32) -> Option<SignalAction> {
        self.bindings.remove(&signal)
    }

    /// Action bound to `signal`, if any
    pub fn action(&self, signal: i32) -> Option<SignalAction> {
        self.bindings.get(&signal).copied()
    }

    /// Every bound signal, in ascending order
    pub fn signals(&self) -> Vec<i32> {
        self.bindings.keys().copied().collect()
    }

    /// True when no signal is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for SignalMap {
    fn default() -> Self {
        let mut map = Self::shutdown_only();
        map.bindings.insert(RELOAD_SIGNAL, SignalAction::Reload);
        map
    }
}

/// Resolve a signal given as a number or a name
///
/// Names are case-insensitive and the `SIG` prefix is optional, so `hup`,
/// `HUP` and `SIGHUP` all resolve to the same signal.
pub fn parse_signal(name: &str) -> Result<i32> {
    let trimmed = name.trim();
    let unknown = || GateError::UnknownSignal(name.to_owned());

    if let Ok(number) = trimmed.parse::<i32>() {
        return Signal::try_from(number)
            .map(|signal| signal as i32)
            .map_err(|_| unknown());
    }

    let upper = trimmed.to_ascii_uppercase();
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    Signal::from_str(&full)
        .map(|signal| signal as i32)
        .map_err(|_| unknown())
}

/// Apply `action` to `controller`
pub fn dispatch(controller: &Controller, action: SignalAction) {
    match action {
        SignalAction::Shutdown => controller.shutdown(),
        SignalAction::Reload => controller.reload(),
        SignalAction::Interrupt => controller.interrupt(),
    }
}

/// Listens for bound signals on a dedicated thread
pub struct SignalListener {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Register handlers for every signal in `map` and start dispatching
    ///
    /// Handlers are in place when this returns; a signal raised afterwards is
    /// delivered to the controller even if the listener thread has not been
    /// scheduled yet.
    pub fn spawn(map: SignalMap, controller: Controller) -> Result<Self> {
        let mut signals = Signals::new(map.signals())?;
        let handle = signals.handle();
        tracing::debug!("Registered handlers for signals {:?}", map.signals());

        let thread = thread::Builder::new()
            .name("waitgate-signals".into())
            .spawn(move || {
                for signal in signals.forever() {
                    match map.action(signal) {
                        Some(action) => {
                            tracing::info!("Received signal {} ({:?})", signal, action);
                            dispatch(&controller, action);
                        }
                        None => tracing::warn!("Received unbound signal {}", signal),
                    }
                }
                tracing::debug!("Signal listener stopped");
            })?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Stop listening and wait for the listener thread to exit
    pub fn close(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Signal listener thread panicked");
            }
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SignalListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalListener")
            .field("closed", &self.handle.is_closed())
            .finish()
    }
}
