//! Core message and status types for the UI state library
//!
//! This module defines the decoded payloads the aggregator reads from the
//! subscribed topics, plus the derived engagement status. Payloads are plain
//! data: the transport layer is responsible for decoding and validating them
//! before delivery.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Panda hardware variant reported in `pandaStates`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PandaType {
    /// No panda seen, or the hardware-state topic went silent
    #[default]
    Unknown,
    WhitePanda,
    GreyPanda,
    BlackPanda,
    Pedal,
    Uno,
    Dos,
    RedPanda,
    RedPandaV2,
    Tres,
    Cuatro,
}

impl fmt::Display for PandaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PandaType::Unknown => "unknown",
            PandaType::WhitePanda => "whitePanda",
            PandaType::GreyPanda => "greyPanda",
            PandaType::BlackPanda => "blackPanda",
            PandaType::Pedal => "pedal",
            PandaType::Uno => "uno",
            PandaType::Dos => "dos",
            PandaType::RedPanda => "redPanda",
            PandaType::RedPandaV2 => "redPandaV2",
            PandaType::Tres => "tres",
            PandaType::Cuatro => "cuatro",
        };
        write!(f, "{}", name)
    }
}

/// State of a single panda unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PandaState {
    /// Hardware variant of this unit
    pub panda_type: PandaType,
    /// Ignition detected on the dedicated ignition line
    pub ignition_line: bool,
    /// Ignition detected from CAN traffic
    pub ignition_can: bool,
}

impl PandaState {
    /// Create a panda state with both ignition sources off
    pub fn new(panda_type: PandaType) -> Self {
        Self {
            panda_type,
            ..Self::default()
        }
    }

    /// Builder method: set the ignition line
    pub fn with_ignition_line(mut self, on: bool) -> Self {
        self.ignition_line = on;
        self
    }

    /// Builder method: set CAN ignition
    pub fn with_ignition_can(mut self, on: bool) -> Self {
        self.ignition_can = on;
        self
    }

    /// True if either ignition source is asserted
    pub fn ignition(&self) -> bool {
        self.ignition_line || self.ignition_can
    }
}

/// Device-level state published by the hardware daemon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceState {
    /// The device considers itself onroad
    pub started: bool,
}

/// Image sensor fitted to a camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSensor {
    #[default]
    Unknown,
    Ar0231,
    Ox03c10,
    Os04c10,
}

impl ImageSensor {
    /// Scale from exposure percentage to ambient light level
    pub fn light_scale(&self) -> f32 {
        match self {
            ImageSensor::Ar0231 => 6.0,
            ImageSensor::Unknown | ImageSensor::Ox03c10 | ImageSensor::Os04c10 => 1.0,
        }
    }
}

/// Exposure state of a camera stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraState {
    /// Sensor variant that produced the frame
    pub sensor: ImageSensor,
    /// Exposure as a percentage of the sensor's range
    pub exposure_val_percent: f32,
}

impl CameraState {
    /// Create a camera state
    pub fn new(sensor: ImageSensor, exposure_val_percent: f32) -> Self {
        Self {
            sensor,
            exposure_val_percent,
        }
    }

    /// Ambient light level in [0, 100]
    pub fn light_level(&self) -> f32 {
        (100.0 - self.sensor.light_scale() * self.exposure_val_percent).max(0.0)
    }
}

/// Supervisory control state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenpilotState {
    #[default]
    Disabled,
    PreEnabled,
    Enabled,
    SoftDisabling,
    Overriding,
}

impl OpenpilotState {
    /// True for the substates shown as a driver override
    pub fn is_override(&self) -> bool {
        match self {
            OpenpilotState::PreEnabled | OpenpilotState::Overriding => true,
            OpenpilotState::Disabled | OpenpilotState::Enabled | OpenpilotState::SoftDisabling => {
                false
            }
        }
    }
}

/// Selfdrive supervisory message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfdriveState {
    /// Current supervisory state
    pub state: OpenpilotState,
    /// Whether the system is enabled
    pub enabled: bool,
}

impl SelfdriveState {
    /// Create a selfdrive state
    pub fn new(state: OpenpilotState, enabled: bool) -> Self {
        Self { state, enabled }
    }
}

/// Longitudinal driving personality selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongitudinalPersonality {
    Aggressive,
    #[default]
    Standard,
    Relaxed,
}

impl LongitudinalPersonality {
    /// Decode the integer form stored in params
    pub fn from_param(value: i64) -> Option<Self> {
        match value {
            0 => Some(LongitudinalPersonality::Aggressive),
            1 => Some(LongitudinalPersonality::Standard),
            2 => Some(LongitudinalPersonality::Relaxed),
            _ => None,
        }
    }
}

impl fmt::Display for LongitudinalPersonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LongitudinalPersonality::Aggressive => write!(f, "aggressive"),
            LongitudinalPersonality::Standard => write!(f, "standard"),
            LongitudinalPersonality::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// Engagement status shown by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiStatus {
    #[default]
    Disengaged,
    Engaged,
    Override,
}

impl UiStatus {
    /// Map a selfdrive message to a status
    pub fn from_selfdrive(ss: &SelfdriveState) -> Self {
        if ss.state.is_override() {
            UiStatus::Override
        } else if ss.enabled {
            UiStatus::Engaged
        } else {
            UiStatus::Disengaged
        }
    }
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiStatus::Disengaged => write!(f, "disengaged"),
            UiStatus::Engaged => write!(f, "engaged"),
            UiStatus::Override => write!(f, "override"),
        }
    }
}
