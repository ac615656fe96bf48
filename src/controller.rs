//! Lifecycle controller
//!
//! Gates the primary execution path on an external release. [`Controller::start`]
//! prints the startup line and blocks until [`Controller::shutdown`] is called
//! from another thread, a signal listener, or whatever else holds a clone of the
//! controller.
//!
//! All state sits behind one mutex and every change is broadcast on one condvar.
//! The wait in `start` gives the mutex up while parked, so the control
//! operations never contend with a blocked main path.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::console::{self, Console, Stdout};
use crate::error::{GateError, Result};

/// Lifecycle phase of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial phase; `start` blocks
    Waiting,
    /// Terminal phase reached through `shutdown`
    Released,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    /// Paths currently parked in `start`
    waiters: usize,
    /// Set by `interrupt`, consumed by the first waiter that sees it
    interrupt_pending: bool,
    reloads: u64,
}

struct Shared {
    state: Mutex<State>,
    changed: Condvar,
    console: Box<dyn Console>,
}

/// Handle to a lifecycle gate
///
/// Cloning is cheap and every clone drives the same gate, so one clone can
/// block in [`start`](Self::start) while others call the control operations.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    /// Create a controller that prints to standard output
    pub fn new() -> Self {
        Self::with_console(Stdout)
    }

    /// Create a controller that prints through the given console
    pub fn with_console(console: impl Console + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    phase: Phase::Waiting,
                    waiters: 0,
                    interrupt_pending: false,
                    reloads: 0,
                }),
                changed: Condvar::new(),
                console: Box::new(console),
            }),
        }
    }

    /// Print the startup line and block until released
    ///
    /// Returns `Ok(())` after printing `stopped` once [`shutdown`](Self::shutdown)
    /// has been called, including when it was called before `start`. Fails with
    /// [`GateError::Interrupted`] if [`interrupt`](Self::interrupt) arrives
    /// before the release, even when the release lands before this thread
    /// wakes up; `stopped` is not printed in that case.
    pub fn start<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let mut state = self.lock();
        self.shared.console.line(&console::started_line(args));
        tracing::info!(args = args.len(), "Waiting for release");

        state.waiters += 1;
        let outcome = if state.phase == Phase::Released {
            Ok(())
        } else {
            // A pending interrupt was armed while still waiting, so it predates
            // any release and takes precedence over it.
            loop {
                if state.interrupt_pending {
                    state.interrupt_pending = false;
                    break Err(GateError::Interrupted);
                }
                if state.phase == Phase::Released {
                    break Ok(());
                }
                state = self
                    .shared
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };
        state.waiters -= 1;

        match outcome {
            Ok(()) => {
                self.shared.console.line(console::STOPPED);
                tracing::info!("Released, stopped");
            }
            Err(ref e) => tracing::warn!("Wait ended early: {}", e),
        }
        outcome
    }

    /// Release every path blocked in `start`
    ///
    /// The first call moves the gate to [`Phase::Released`]; later calls have no
    /// effect.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if state.phase == Phase::Released {
            tracing::debug!("Shutdown requested again, already released");
            return;
        }
        state.phase = Phase::Released;
        if state.waiters == 0 && state.interrupt_pending {
            // Nobody parked to take it; a later start returns normally.
            state.interrupt_pending = false;
            tracing::debug!("Dropping unconsumed interrupt on release");
        }
        tracing::info!(waiters = state.waiters, "Shutdown requested, releasing");
        self.shared.changed.notify_all();
    }

    /// Print `reloaded`
    ///
    /// Never changes the phase. Holds the state lock while printing so the line
    /// is ordered against `started` and `stopped`.
    pub fn reload(&self) {
        let mut state = self.lock();
        state.reloads += 1;
        self.shared.console.line(console::RELOADED);
        tracing::info!(reloads = state.reloads, phase = ?state.phase, "Reloaded");
    }

    /// Ask a blocked `start` to give up waiting
    ///
    /// One waiter consumes the request and fails with
    /// [`GateError::Interrupted`]. With nobody waiting the request stays pending
    /// for the next `start` that would block. Has no effect on the phase, and is
    /// ignored once the gate is released.
    pub fn interrupt(&self) {
        let mut state = self.lock();
        if state.phase == Phase::Released {
            tracing::debug!("Interrupt requested after release, ignoring");
            return;
        }
        state.interrupt_pending = true;
        tracing::info!(waiters = state.waiters, "Interrupt requested");
        self.shared.changed.notify_all();
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Number of paths currently blocked in `start`
    pub fn waiters(&self) -> usize {
        self.lock().waiters
    }

    /// Number of reloads performed so far
    pub fn reload_count(&self) -> u64 {
        self.lock().reloads
    }

    // The guarded state is flags and counters, consistent after every
    // critical section, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Controller")
            .field("phase", &state.phase)
            .field("waiters", &state.waiters)
            .field("interrupt_pending", &state.interrupt_pending)
            .field("reloads", &state.reloads)
            .finish()
    }
}
