//! UI State Library
//!
//! Derives the per-frame UI snapshot of a driver-assistance HMI from the
//! latest messages on a handful of subscribed topics, and tracks user
//! interaction idleness.
//!
//! # Architecture
//!
//! - [`UiState`] reconciles panda, device, camera and selfdrive messages into
//!   ignition, onroad/offroad, panda type, light level and engagement status
//! - [`Device`] owns the interaction deadline and fires timeout callbacks
//!   once per idle period
//! - [`UiContext`] owns one of each and updates them in order every frame
//!
//! The library does NOT:
//! - Deliver or decode messages (see [`MessageSource`])
//! - Store parameters (see [`Params`])
//! - Draw anything or own the frame loop
//!
//! # Example Usage
//!
//! ```
//! use ui_state::{
//!     DeviceState, MemoryParams, Message, PandaState, PandaType, SubMaster, UiConfig,
//!     UiContext,
//! };
//!
//! let config = UiConfig::new().with_fps(20);
//! let mut sm = SubMaster::new(20);
//! let mut ctx = UiContext::new(config, &MemoryParams::new());
//!
//! sm.send(Message::PandaStates(vec![
//!     PandaState::new(PandaType::Tres).with_ignition_line(true),
//! ]));
//! sm.send(Message::DeviceState(DeviceState { started: true }));
//!
//! // One frame
//! sm.update();
//! ctx.update(&sm, false);
//!
//! assert!(ctx.state.is_onroad());
//! assert_eq!(ctx.state.started_frame(), 1);
//! ```

// Public modules
pub mod clock;
pub mod config;
pub mod context;
pub mod device;
pub mod messaging;
pub mod params;
pub mod types;
pub mod ui_state;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::UiConfig;
pub use context::UiContext;
pub use device::Device;
pub use messaging::{Message, MessageSource, Service, SubMaster};
pub use params::{MemoryParams, Params, ParamsError};
pub use types::{
    CameraState, DeviceState, ImageSensor, LongitudinalPersonality, OpenpilotState,
    PandaState, PandaType, SelfdriveState, UiStatus,
};
pub use ui_state::{UiState, LIGHT_SENSOR_UNAVAILABLE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
