//! Scenario replay
//!
//! Drives an in-memory [`SubMaster`] and a [`UiContext`] on a manual clock
//! through a scenario, one frame per tick, and records the derived state
//! after every frame.

use crate::config::{Scenario, TickSpec};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use ui_state::{
    LongitudinalPersonality, ManualClock, MemoryParams, Message, MessageSource, PandaType,
    SubMaster, UiConfig, UiContext, UiStatus,
};

/// Derived state after one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    pub frame: u64,
    pub elapsed_ms: u64,
    pub ignition: bool,
    pub started: bool,
    pub panda_type: PandaType,
    pub light_sensor: f32,
    pub status: UiStatus,
    pub engaged: bool,
    pub started_frame: u64,
    /// Interaction timeout callbacks ran on this frame
    pub timeout_fired: bool,
}

impl TickRecord {
    /// True if any derived field differs from `prev`
    pub fn differs_from(&self, prev: &TickRecord) -> bool {
        self.ignition != prev.ignition
            || self.started != prev.started
            || self.panda_type != prev.panda_type
            || self.light_sensor != prev.light_sensor
            || self.status != prev.status
            || self.engaged != prev.engaged
            || self.timeout_fired
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    /// Unit preference read from the scenario params
    pub is_metric: bool,
    /// Driving personality read from the scenario params
    pub personality: LongitudinalPersonality,
    /// One record per frame
    pub frames: Vec<TickRecord>,
}

/// Replay a scenario and record the derived state after every frame
pub fn run(scenario: &Scenario, config: UiConfig) -> Replay {
    let params: MemoryParams = scenario.params.clone().into_iter().collect();
    let frame_duration = config.frame_duration();
    let alive_frames = u64::from(config.fps);

    let clock = ManualClock::new();
    let mut sm = SubMaster::new(alive_frames);
    let mut ctx = UiContext::with_clock(config, &params, clock.clone());

    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    ctx.device
        .add_interactive_timeout_callback(move || counter.set(counter.get() + 1));

    log::info!(
        "Replaying {} frames from {} tick entries",
        scenario.total_frames(),
        scenario.ticks.len()
    );

    let mut records = Vec::new();
    for tick in &scenario.ticks {
        let dt = tick.dt_ms.map_or(frame_duration, Duration::from_millis);
        for i in 0..tick.repeat {
            if i == 0 {
                queue_messages(&mut sm, tick);
            }
            sm.update();
            clock.advance(dt);

            let before = fired.get();
            ctx.update(&sm, tick.pointer_down);

            let ui = &ctx.state;
            let record = TickRecord {
                frame: sm.frame(),
                elapsed_ms: clock.elapsed().as_millis() as u64,
                ignition: ui.ignition(),
                started: ui.started(),
                panda_type: ui.panda_type(),
                light_sensor: ui.light_sensor(),
                status: ui.status(),
                engaged: ui.engaged(),
                started_frame: ui.started_frame(),
                timeout_fired: fired.get() > before,
            };
            log::debug!("{:?}", record);
            records.push(record);
        }
    }

    Replay {
        is_metric: ctx.state.is_metric(),
        personality: ctx.state.personality(),
        frames: records,
    }
}

fn queue_messages(sm: &mut SubMaster, tick: &TickSpec) {
    if let Some(pandas) = &tick.panda_states {
        sm.send(Message::PandaStates(pandas.clone()));
    }
    if let Some(device) = tick.device_state {
        sm.send(Message::DeviceState(device));
    }
    if let Some(cam) = tick.wide_road_camera_state {
        if tick.camera_valid {
            sm.send(Message::WideRoadCameraState(cam));
        } else {
            sm.send_invalid(Message::WideRoadCameraState(cam));
        }
    }
    if let Some(ss) = tick.selfdrive_state {
        sm.send(Message::SelfdriveState(ss));
    }
}
