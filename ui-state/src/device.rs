//! Interaction timeout tracking
//!
//! [`Device`] keeps a deadline for user interaction. The deadline is pushed
//! out on qualifying input or when ignition turns off, and the registered
//! callbacks fire once when it elapses. They do not fire again until the
//! deadline has been reset and elapsed again.

use crate::clock::{Clock, MonotonicClock};
use crate::config::UiConfig;
use crate::ui_state::UiState;
use std::fmt;
use std::time::{Duration, Instant};

type TimeoutCallback = Box<dyn FnMut()>;

/// Interaction idleness tracker
pub struct Device<C: Clock = MonotonicClock> {
    clock: C,
    onroad_timeout: Duration,
    offroad_timeout: Duration,
    ignition: bool,
    interaction_deadline: Instant,
    interactive_timeout_callbacks: Vec<TimeoutCallback>,
    prev_timed_out: bool,
}

impl Device<MonotonicClock> {
    /// Create a tracker on the system monotonic clock
    pub fn new(config: &UiConfig, ui_state: &UiState) -> Self {
        Self::with_clock(config, MonotonicClock, ui_state)
    }
}

impl<C: Clock> Device<C> {
    /// Create a tracker on a custom clock and start the first idle period
    pub fn with_clock(config: &UiConfig, clock: C, ui_state: &UiState) -> Self {
        let now = clock.now();
        let mut device = Self {
            clock,
            onroad_timeout: config.interaction_timeout(true),
            offroad_timeout: config.interaction_timeout(false),
            ignition: false,
            interaction_deadline: now,
            interactive_timeout_callbacks: Vec::new(),
            prev_timed_out: false,
        };
        device.reset_interactive_timeout(ui_state, None);
        device
    }

    /// Push the deadline out from now
    ///
    /// Without an explicit timeout, the onroad or offroad timeout is picked
    /// from the current ignition state.
    pub fn reset_interactive_timeout(&mut self, ui_state: &UiState, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(if ui_state.ignition() {
            self.onroad_timeout
        } else {
            self.offroad_timeout
        });
        self.interaction_deadline = self.clock.now() + timeout;
        log::trace!("Interaction timeout reset to {:?}", timeout);
    }

    /// Register a callback to run when the interaction timeout elapses
    pub fn add_interactive_timeout_callback(&mut self, callback: impl FnMut() + 'static) {
        self.interactive_timeout_callbacks.push(Box::new(callback));
    }

    /// Advance idle tracking by one tick
    ///
    /// `pointer_down` is true while the primary pointer button is held.
    pub fn update(&mut self, ui_state: &UiState, pointer_down: bool) {
        let ignition_just_turned_off = !ui_state.ignition() && self.ignition;
        self.ignition = ui_state.ignition();

        let interaction_timeout = self.clock.now() >= self.interaction_deadline;
        if ignition_just_turned_off || pointer_down {
            if ignition_just_turned_off {
                log::debug!("Ignition turned off, resetting interaction timeout");
            }
            self.reset_interactive_timeout(ui_state, None);
        } else if interaction_timeout && !self.prev_timed_out {
            log::info!(
                "Interaction timeout, running {} callback(s)",
                self.interactive_timeout_callbacks.len()
            );
            for callback in self.interactive_timeout_callbacks.iter_mut() {
                callback();
            }
        }
        self.prev_timed_out = interaction_timeout;
    }

    /// True if the deadline had elapsed on the last update
    pub fn is_timed_out(&self) -> bool {
        self.prev_timed_out
    }

    /// Current interaction deadline
    pub fn deadline(&self) -> Instant {
        self.interaction_deadline
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.interaction_deadline
            .saturating_duration_since(self.clock.now())
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for Device<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("clock", &self.clock)
            .field("ignition", &self.ignition)
            .field("interaction_deadline", &self.interaction_deadline)
            .field("callbacks", &self.interactive_timeout_callbacks.len())
            .field("prev_timed_out", &self.prev_timed_out)
            .finish()
    }
}
