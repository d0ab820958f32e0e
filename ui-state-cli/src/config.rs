//! Scenario and configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use ui_state::{CameraState, DeviceState, PandaState, SelfdriveState, UiConfig};

/// A scripted sequence of ticks (loaded from scenario.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    /// Optional human-readable name for the report
    pub name: Option<String>,
    /// Param store contents (key -> raw value)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// UI configuration overrides
    pub config: Option<UiConfig>,
    #[serde(rename = "tick", default)]
    pub ticks: Vec<TickSpec>,
}

/// Messages and input for one (or several identical) ticks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TickSpec {
    /// Number of ticks to run; messages are only delivered on the first one
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Clock advance per tick in milliseconds (default: one frame)
    pub dt_ms: Option<u64>,
    #[serde(default)]
    pub pointer_down: bool,
    pub panda_states: Option<Vec<PandaState>>,
    pub device_state: Option<DeviceState>,
    pub wide_road_camera_state: Option<CameraState>,
    /// Validity flag attached to the camera message
    #[serde(default = "default_true")]
    pub camera_valid: bool,
    pub selfdrive_state: Option<SelfdriveState>,
}

/// Upper bound on the frames a single scenario may run for
pub const MAX_FRAMES: u64 = 10_000_000;

fn default_repeat() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Problems in an otherwise well-formed scenario file
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Scenario has no [[tick]] entries")]
    NoTicks,

    #[error("Tick #{0} has repeat = 0")]
    ZeroRepeat(usize),

    #[error("Configured fps must be positive")]
    ZeroFps,

    #[error("Scenario runs for {frames} frames, more than the limit of {limit}")]
    TooManyFrames { frames: u64, limit: u64 },
}

impl Scenario {
    /// Check the scenario can be replayed
    pub fn validate(&self) -> std::result::Result<(), ScenarioError> {
        if self.ticks.is_empty() {
            return Err(ScenarioError::NoTicks);
        }
        if let Some(index) = self.ticks.iter().position(|t| t.repeat == 0) {
            return Err(ScenarioError::ZeroRepeat(index));
        }
        if self.config.as_ref().map_or(false, |c| c.fps == 0) {
            return Err(ScenarioError::ZeroFps);
        }
        let frames = self.total_frames();
        if frames > MAX_FRAMES {
            return Err(ScenarioError::TooManyFrames {
                frames,
                limit: MAX_FRAMES,
            });
        }
        Ok(())
    }

    /// Total number of frames the scenario runs for
    pub fn total_frames(&self) -> u64 {
        self.ticks.iter().map(|t| u64::from(t.repeat)).sum()
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {:?}", path))?;

    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {:?}", path))?;

    scenario
        .validate()
        .with_context(|| format!("Invalid scenario: {:?}", path))?;

    Ok(scenario)
}

/// Load a UI configuration from a TOML file
pub fn load_config(path: &Path) -> Result<UiConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: UiConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.fps == 0 {
        return Err(ScenarioError::ZeroFps.into());
    }

    Ok(config)
}
