//! Per-process UI context
//!
//! Owns the single [`UiState`] and [`Device`] of a UI process and runs them
//! in order once per frame. Construct one and pass it down the frame loop
//! instead of reaching for globals.

use crate::clock::{Clock, MonotonicClock};
use crate::config::UiConfig;
use crate::device::Device;
use crate::messaging::MessageSource;
use crate::params::Params;
use crate::ui_state::UiState;
use std::time::Duration;

/// The UI state and interaction tracker, updated together
#[derive(Debug)]
pub struct UiContext<C: Clock = MonotonicClock> {
    pub state: UiState,
    pub device: Device<C>,
}

impl UiContext<MonotonicClock> {
    /// Create a context on the system monotonic clock
    pub fn new(config: UiConfig, params: &impl Params) -> Self {
        Self::with_clock(config, params, MonotonicClock)
    }
}

impl<C: Clock> UiContext<C> {
    /// Create a context on a custom clock
    pub fn with_clock(config: UiConfig, params: &impl Params, clock: C) -> Self {
        let state = UiState::new(config, params);
        let device = Device::with_clock(state.config(), clock, &state);
        Self { state, device }
    }

    /// Run one frame: derive the state, then track interaction
    ///
    /// The transport must already have been advanced for this frame.
    pub fn update(&mut self, sm: &impl MessageSource, pointer_down: bool) {
        self.state.update(sm);
        self.device.update(&self.state, pointer_down);
    }

    /// Reset the interaction timeout
    ///
    /// Without an explicit timeout, the duration follows the current
    /// ignition state.
    pub fn reset_interactive_timeout(&mut self, timeout: Option<Duration>) {
        self.device.reset_interactive_timeout(&self.state, timeout);
    }
}
