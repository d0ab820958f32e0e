//! UI state configuration
//!
//! Timing knobs for the aggregator and the interaction tracker. Every field
//! has a default, so an empty TOML table is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`UiState`](crate::UiState) and [`Device`](crate::Device)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Nominal UI frame rate (ticks per second)
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Seconds of `pandaStates` silence before the panda type is forgotten
    #[serde(default = "default_panda_timeout")]
    pub panda_timeout_secs: u32,

    /// Interaction timeout while ignition is on (seconds)
    #[serde(default = "default_onroad_timeout")]
    pub onroad_timeout_secs: u64,

    /// Interaction timeout while ignition is off (seconds)
    #[serde(default = "default_offroad_timeout")]
    pub offroad_timeout_secs: u64,
}

fn default_fps() -> u32 {
    60
}

fn default_panda_timeout() -> u32 {
    5
}

fn default_onroad_timeout() -> u64 {
    10
}

fn default_offroad_timeout() -> u64 {
    30
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            panda_timeout_secs: default_panda_timeout(),
            onroad_timeout_secs: default_onroad_timeout(),
            offroad_timeout_secs: default_offroad_timeout(),
        }
    }
}

impl UiConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the nominal frame rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Builder method: set the panda liveness window in seconds
    pub fn with_panda_timeout(mut self, secs: u32) -> Self {
        self.panda_timeout_secs = secs;
        self
    }

    /// Builder method: set both interaction timeouts
    pub fn with_interaction_timeouts(mut self, onroad_secs: u64, offroad_secs: u64) -> Self {
        self.onroad_timeout_secs = onroad_secs;
        self.offroad_timeout_secs = offroad_secs;
        self
    }

    /// Liveness window for `pandaStates`, in ticks
    pub fn panda_timeout_frames(&self) -> u64 {
        u64::from(self.panda_timeout_secs) * u64::from(self.fps)
    }

    /// Interaction timeout for the given ignition state
    pub fn interaction_timeout(&self, ignition: bool) -> Duration {
        if ignition {
            Duration::from_secs(self.onroad_timeout_secs)
        } else {
            Duration::from_secs(self.offroad_timeout_secs)
        }
    }

    /// Duration of one nominal frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}
