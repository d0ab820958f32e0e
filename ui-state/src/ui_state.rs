//! Derived UI state
//!
//! [`UiState`] reconciles the latest messages on the subscribed topics into
//! the snapshot the renderer reads once per frame: ignition, onroad/offroad,
//! panda type, ambient light and engagement status.
//!
//! `update()` is total over the snapshot. A topic that never delivered is
//! treated exactly like a stale one and falls back to the unknown/sentinel
//! branch.

use crate::config::UiConfig;
use crate::messaging::{MessageSource, Service};
use crate::params::Params;
use crate::types::{LongitudinalPersonality, PandaType, UiStatus};

/// Light sensor value when no valid camera reading is available
pub const LIGHT_SENSOR_UNAVAILABLE: f32 = -1.0;

const PARAM_IS_METRIC: &str = "IsMetric";
const PARAM_PERSONALITY: &str = "LongitudinalPersonality";

/// Snapshot of "what is true right now" for the UI
#[derive(Debug, Clone)]
pub struct UiState {
    config: UiConfig,

    status: UiStatus,
    started_frame: u64,
    engaged_prev: bool,
    started_prev: bool,
    engagement_changed: bool,

    started: bool,
    ignition: bool,
    panda_type: PandaType,
    light_sensor: f32,
    selfdrive_enabled: bool,

    is_metric: bool,
    personality: LongitudinalPersonality,
}

impl UiState {
    /// Create the snapshot with safe defaults and read params once
    pub fn new(config: UiConfig, params: &impl Params) -> Self {
        let mut state = Self {
            config,
            status: UiStatus::Disengaged,
            started_frame: 0,
            engaged_prev: false,
            started_prev: false,
            engagement_changed: false,
            started: false,
            ignition: false,
            panda_type: PandaType::Unknown,
            light_sensor: LIGHT_SENSOR_UNAVAILABLE,
            selfdrive_enabled: false,
            is_metric: false,
            personality: LongitudinalPersonality::Standard,
        };
        state.update_params(params);
        state
    }

    /// Recompute the derived fields from this tick's messages
    pub fn update(&mut self, sm: &impl MessageSource) {
        self.update_state(sm);
        self.update_status(sm);
    }

    /// Re-read user preferences, falling back to defaults on any error
    pub fn update_params(&mut self, params: &impl Params) {
        self.is_metric = params.get_bool(PARAM_IS_METRIC).unwrap_or_else(|e| {
            log::debug!("{}, defaulting to imperial units", e);
            false
        });

        self.personality = params
            .get_int(PARAM_PERSONALITY)
            .map_err(|e| e.to_string())
            .and_then(|v| {
                LongitudinalPersonality::from_param(v)
                    .ok_or_else(|| format!("Unknown personality {}", v))
            })
            .unwrap_or_else(|e| {
                log::debug!("{}, defaulting to standard personality", e);
                LongitudinalPersonality::Standard
            });
    }

    fn update_state(&mut self, sm: &impl MessageSource) {
        if sm.updated(Service::PandaStates) {
            if let Some(first) = sm.panda_states().and_then(|states| states.first()) {
                self.panda_type = first.panda_type;
                if self.panda_type != PandaType::Unknown {
                    self.ignition = sm
                        .panda_states()
                        .map_or(false, |states| states.iter().any(|p| p.ignition()));
                }
            }
        } else if sm.frames_since_recv(Service::PandaStates) > self.config.panda_timeout_frames() {
            if self.panda_type != PandaType::Unknown {
                log::debug!(
                    "pandaStates silent for {} frames, panda type now unknown",
                    sm.frames_since_recv(Service::PandaStates)
                );
            }
            self.panda_type = PandaType::Unknown;
        }

        if sm.updated(Service::WideRoadCameraState) {
            if let Some(cam) = sm.wide_road_camera_state() {
                self.light_sensor = cam.light_level();
            }
        }
        if !sm.alive(Service::WideRoadCameraState) || !sm.valid(Service::WideRoadCameraState) {
            self.light_sensor = LIGHT_SENSOR_UNAVAILABLE;
        }

        if let Some(ss) = sm.selfdrive_state() {
            self.selfdrive_enabled = ss.enabled;
        }

        let device_started = sm.device_state().map_or(false, |ds| ds.started);
        self.started = device_started && self.ignition;
    }

    fn update_status(&mut self, sm: &impl MessageSource) {
        if self.started && sm.updated(Service::SelfdriveState) {
            if let Some(ss) = sm.selfdrive_state() {
                self.status = UiStatus::from_selfdrive(ss);
            }
        }

        let engaged = self.engaged();
        self.engagement_changed = engaged != self.engaged_prev;
        if self.engagement_changed {
            log::info!("Engagement changed: {} -> {}", self.engaged_prev, engaged);
            self.engaged_prev = engaged;
        }

        let frame = sm.frame();
        if self.started != self.started_prev || frame == 1 {
            if self.started {
                log::info!("Going onroad at frame {}", frame);
                self.status = UiStatus::Disengaged;
                self.started_frame = frame;
            } else if self.started_prev {
                log::info!("Going offroad at frame {}", frame);
            }
            self.started_prev = self.started;
        }
    }

    /// True while onroad and the selfdrive state reports enabled
    pub fn engaged(&self) -> bool {
        self.started && self.selfdrive_enabled
    }

    /// True if [`engaged`](Self::engaged) flipped on the last update
    pub fn engagement_changed(&self) -> bool {
        self.engagement_changed
    }

    pub fn is_onroad(&self) -> bool {
        self.started
    }

    pub fn is_offroad(&self) -> bool {
        !self.started
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn ignition(&self) -> bool {
        self.ignition
    }

    pub fn panda_type(&self) -> PandaType {
        self.panda_type
    }

    /// Ambient light in [0, 100], or [`LIGHT_SENSOR_UNAVAILABLE`]
    pub fn light_sensor(&self) -> f32 {
        self.light_sensor
    }

    pub fn status(&self) -> UiStatus {
        self.status
    }

    /// Frame on which the device last went onroad
    pub fn started_frame(&self) -> u64 {
        self.started_frame
    }

    pub fn is_metric(&self) -> bool {
        self.is_metric
    }

    pub fn personality(&self) -> LongitudinalPersonality {
        self.personality
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{Message, SubMaster};
    use crate::params::MemoryParams;
    use crate::types::{
        CameraState, DeviceState, ImageSensor, OpenpilotState, PandaState, SelfdriveState,
    };

    const FPS: u32 = 20;

    fn new_state() -> UiState {
        UiState::new(UiConfig::new().with_fps(FPS), &MemoryParams::new())
    }

    fn pandas(ignition: bool) -> Message {
        Message::PandaStates(vec![PandaState::new(PandaType::Tres).with_ignition_line(ignition)])
    }

    fn device(started: bool) -> Message {
        Message::DeviceState(DeviceState { started })
    }

    fn selfdrive(state: OpenpilotState, enabled: bool) -> Message {
        Message::SelfdriveState(SelfdriveState::new(state, enabled))
    }

    fn tick(sm: &mut SubMaster, ui: &mut UiState, msgs: Vec<Message>) {
        for msg in msgs {
            sm.send(msg);
        }
        sm.update();
        ui.update(sm);
    }

    /// Drive the state onroad and return the frame it went onroad on
    fn go_onroad(sm: &mut SubMaster, ui: &mut UiState) -> u64 {
        tick(sm, ui, vec![pandas(true), device(true)]);
        assert!(ui.is_onroad());
        sm.frame()
    }

    #[test]
    fn test_defaults() {
        let ui = new_state();
        assert!(!ui.started());
        assert!(!ui.ignition());
        assert!(ui.is_offroad());
        assert_eq!(ui.panda_type(), PandaType::Unknown);
        assert_eq!(ui.light_sensor(), LIGHT_SENSOR_UNAVAILABLE);
        assert_eq!(ui.status(), UiStatus::Disengaged);
        assert!(!ui.engaged());
        assert!(!ui.is_metric());
        assert_eq!(ui.personality(), LongitudinalPersonality::Standard);
    }

    #[test]
    fn test_empty_snapshot_is_total() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        for _ in 0..500 {
            sm.update();
            ui.update(&sm);
        }
        assert!(ui.is_offroad());
        assert_eq!(ui.panda_type(), PandaType::Unknown);
        assert_eq!(ui.light_sensor(), LIGHT_SENSOR_UNAVAILABLE);
    }

    #[test]
    fn test_ignition_any_unit() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        let units = vec![
            PandaState::new(PandaType::Tres).with_ignition_line(true),
            PandaState::new(PandaType::Tres),
        ];
        tick(&mut sm, &mut ui, vec![Message::PandaStates(units)]);
        assert!(ui.ignition());

        let can_only = vec![
            PandaState::new(PandaType::Dos),
            PandaState::new(PandaType::Dos).with_ignition_can(true),
        ];
        tick(&mut sm, &mut ui, vec![Message::PandaStates(can_only)]);
        assert!(ui.ignition());
        assert_eq!(ui.panda_type(), PandaType::Dos);
    }

    #[test]
    fn test_unknown_first_unit_keeps_ignition() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        tick(&mut sm, &mut ui, vec![pandas(true)]);
        assert!(ui.ignition());

        let unknown = vec![PandaState::new(PandaType::Unknown)];
        tick(&mut sm, &mut ui, vec![Message::PandaStates(unknown)]);
        assert_eq!(ui.panda_type(), PandaType::Unknown);
        assert!(ui.ignition());

        // An empty unit list changes nothing
        tick(&mut sm, &mut ui, vec![pandas(false)]);
        tick(&mut sm, &mut ui, vec![Message::PandaStates(Vec::new())]);
        assert_eq!(ui.panda_type(), PandaType::Tres);
        assert!(!ui.ignition());
    }

    #[test]
    fn test_panda_timeout_forces_unknown_but_keeps_ignition() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        tick(&mut sm, &mut ui, vec![pandas(true)]);
        let window = ui.config().panda_timeout_frames();

        for _ in 0..window {
            tick(&mut sm, &mut ui, vec![]);
            assert_eq!(ui.panda_type(), PandaType::Tres);
            assert!(ui.ignition());
        }

        tick(&mut sm, &mut ui, vec![]);
        assert!(sm.frames_since_recv(Service::PandaStates) > window);
        assert_eq!(ui.panda_type(), PandaType::Unknown);
        assert!(ui.ignition());
    }

    #[test]
    fn test_ignition_only_changes_on_delivery() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        tick(&mut sm, &mut ui, vec![pandas(true)]);
        for _ in 0..10 {
            tick(&mut sm, &mut ui, vec![device(false)]);
            assert!(ui.ignition());
        }
        tick(&mut sm, &mut ui, vec![pandas(false)]);
        assert!(!ui.ignition());
    }

    #[test]
    fn test_light_sensor() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();

        let cam = CameraState::new(ImageSensor::Ar0231, 20.0);
        tick(&mut sm, &mut ui, vec![Message::WideRoadCameraState(cam)]);
        assert_eq!(ui.light_sensor(), 0.0);

        let cam = CameraState::new(ImageSensor::Os04c10, 30.0);
        tick(&mut sm, &mut ui, vec![Message::WideRoadCameraState(cam)]);
        assert_eq!(ui.light_sensor(), 70.0);

        // Cached value holds while the topic is alive
        tick(&mut sm, &mut ui, vec![]);
        assert_eq!(ui.light_sensor(), 70.0);
    }

    #[test]
    fn test_light_sensor_invalid_or_stale() {
        let mut sm = SubMaster::new(3);
        let mut ui = new_state();

        let cam = CameraState::new(ImageSensor::Os04c10, 30.0);
        tick(&mut sm, &mut ui, vec![Message::WideRoadCameraState(cam)]);
        assert_eq!(ui.light_sensor(), 70.0);

        sm.send_invalid(Message::WideRoadCameraState(cam));
        sm.update();
        ui.update(&sm);
        assert_eq!(ui.light_sensor(), LIGHT_SENSOR_UNAVAILABLE);

        tick(&mut sm, &mut ui, vec![Message::WideRoadCameraState(cam)]);
        assert_eq!(ui.light_sensor(), 70.0);
        for _ in 0..3 {
            tick(&mut sm, &mut ui, vec![]);
        }
        assert_eq!(ui.light_sensor(), 70.0);
        tick(&mut sm, &mut ui, vec![]);
        assert!(!sm.alive(Service::WideRoadCameraState));
        assert_eq!(ui.light_sensor(), LIGHT_SENSOR_UNAVAILABLE);
    }

    #[test]
    fn test_started_requires_ignition() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();

        tick(&mut sm, &mut ui, vec![device(true)]);
        assert!(!ui.started());

        tick(&mut sm, &mut ui, vec![pandas(true)]);
        assert!(ui.started());

        // No hysteresis
        tick(&mut sm, &mut ui, vec![pandas(false)]);
        assert!(!ui.started());
        tick(&mut sm, &mut ui, vec![pandas(true)]);
        assert!(ui.started());

        tick(&mut sm, &mut ui, vec![device(false)]);
        assert!(!ui.started());
    }

    #[test]
    fn test_onroad_edge_resets_status() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        tick(&mut sm, &mut ui, vec![]);
        tick(&mut sm, &mut ui, vec![]);

        // Stale engaged selfdrive data must not leak into the first onroad frame
        tick(
            &mut sm,
            &mut ui,
            vec![pandas(true), device(true), selfdrive(OpenpilotState::Enabled, true)],
        );
        assert!(ui.is_onroad());
        assert_eq!(ui.status(), UiStatus::Disengaged);
        assert_eq!(ui.started_frame(), 3);

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Enabled, true)]);
        assert_eq!(ui.status(), UiStatus::Engaged);
        assert_eq!(ui.started_frame(), 3);

        // Offroad keeps the last status, next onroad resets it
        tick(&mut sm, &mut ui, vec![device(false)]);
        assert!(ui.is_offroad());
        assert_eq!(ui.status(), UiStatus::Engaged);

        tick(&mut sm, &mut ui, vec![device(true)]);
        assert_eq!(ui.status(), UiStatus::Disengaged);
        assert_eq!(ui.started_frame(), 6);
    }

    #[test]
    fn test_first_frame_onroad() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        let frame = go_onroad(&mut sm, &mut ui);
        assert_eq!(frame, 1);
        assert_eq!(ui.started_frame(), 1);
        assert_eq!(ui.status(), UiStatus::Disengaged);
    }

    #[test]
    fn test_status_machine() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        go_onroad(&mut sm, &mut ui);

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Overriding, false)]);
        assert_eq!(ui.status(), UiStatus::Override);

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Enabled, true)]);
        assert_eq!(ui.status(), UiStatus::Engaged);
        assert!(ui.engaged());

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::PreEnabled, true)]);
        assert_eq!(ui.status(), UiStatus::Override);

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Disabled, false)]);
        assert_eq!(ui.status(), UiStatus::Disengaged);
    }

    #[test]
    fn test_status_sticky_without_delivery() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        go_onroad(&mut sm, &mut ui);
        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Enabled, true)]);
        assert_eq!(ui.status(), UiStatus::Engaged);

        for _ in 0..5 {
            tick(&mut sm, &mut ui, vec![]);
            assert_eq!(ui.status(), UiStatus::Engaged);
        }
    }

    #[test]
    fn test_status_ignored_offroad() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Overriding, true)]);
        assert_eq!(ui.status(), UiStatus::Disengaged);
        assert!(!ui.engaged());
    }

    #[test]
    fn test_engagement_edge() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        go_onroad(&mut sm, &mut ui);
        assert!(!ui.engagement_changed());

        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Enabled, true)]);
        assert!(ui.engagement_changed());
        assert!(ui.engaged());

        tick(&mut sm, &mut ui, vec![]);
        assert!(!ui.engagement_changed());

        tick(&mut sm, &mut ui, vec![pandas(false)]);
        assert!(!ui.engaged());
        assert!(ui.engagement_changed());
    }

    #[test]
    fn test_repeated_update_is_stable() {
        let mut sm = SubMaster::new(u64::from(FPS));
        let mut ui = new_state();
        go_onroad(&mut sm, &mut ui);
        tick(&mut sm, &mut ui, vec![selfdrive(OpenpilotState::Enabled, true)]);

        ui.update(&sm);
        assert_eq!(ui.status(), UiStatus::Engaged);
        assert!(ui.is_onroad());
        assert!(!ui.engagement_changed());
    }

    #[test]
    fn test_params() {
        let mut params = MemoryParams::new();
        params.put_bool("IsMetric", true);
        params.put("LongitudinalPersonality", "0");
        let mut ui = UiState::new(UiConfig::new(), &params);
        assert!(ui.is_metric());
        assert_eq!(ui.personality(), LongitudinalPersonality::Aggressive);

        params.put("LongitudinalPersonality", "9");
        params.put_bool("IsMetric", false);
        ui.update_params(&params);
        assert!(!ui.is_metric());
        assert_eq!(ui.personality(), LongitudinalPersonality::Standard);
    }
}
