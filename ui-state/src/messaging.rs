//! Subscribed topics and the transport contract
//!
//! The aggregator never talks to a transport directly. It reads a
//! tick-granular snapshot through [`MessageSource`]; whatever fills that
//! snapshot must keep every field stable for the duration of one
//! `UiState::update()` call.
//!
//! [`SubMaster`] is a single-threaded in-memory implementation used by the
//! replay tool and the tests.

use crate::types::{CameraState, DeviceState, PandaState, SelfdriveState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Topics the UI state subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    PandaStates,
    DeviceState,
    WideRoadCameraState,
    SelfdriveState,
}

impl Service {
    /// Every service, in subscription order
    pub const ALL: [Service; 4] = [
        Service::PandaStates,
        Service::DeviceState,
        Service::WideRoadCameraState,
        Service::SelfdriveState,
    ];
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::PandaStates => write!(f, "pandaStates"),
            Service::DeviceState => write!(f, "deviceState"),
            Service::WideRoadCameraState => write!(f, "wideRoadCameraState"),
            Service::SelfdriveState => write!(f, "selfdriveState"),
        }
    }
}

/// A decoded message on one of the subscribed topics
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    PandaStates(Vec<PandaState>),
    DeviceState(DeviceState),
    WideRoadCameraState(CameraState),
    SelfdriveState(SelfdriveState),
}

impl Message {
    /// Topic this message is published on
    pub fn service(&self) -> Service {
        match self {
            Message::PandaStates(_) => Service::PandaStates,
            Message::DeviceState(_) => Service::DeviceState,
            Message::WideRoadCameraState(_) => Service::WideRoadCameraState,
            Message::SelfdriveState(_) => Service::SelfdriveState,
        }
    }
}

/// Per-tick view of the subscribed topics
///
/// Implementations own the data; readers only borrow it for one tick.
pub trait MessageSource {
    /// Logical tick counter, incremented once per transport update
    fn frame(&self) -> u64;

    /// The topic delivered a message on this tick
    fn updated(&self, service: Service) -> bool;

    /// The topic was received recently enough to be trusted
    fn alive(&self, service: Service) -> bool;

    /// The latest payload self-reports as valid
    fn valid(&self, service: Service) -> bool;

    /// Frame on which the topic last delivered (0 if never)
    fn recv_frame(&self, service: Service) -> u64;

    /// Latest message on the topic, if one was ever received
    fn latest(&self, service: Service) -> Option<&Message>;

    /// Ticks elapsed since the topic last delivered
    fn frames_since_recv(&self, service: Service) -> u64 {
        self.frame().saturating_sub(self.recv_frame(service))
    }

    fn panda_states(&self) -> Option<&[PandaState]> {
        match self.latest(Service::PandaStates)? {
            Message::PandaStates(states) => Some(states.as_slice()),
            _ => None,
        }
    }

    fn device_state(&self) -> Option<&DeviceState> {
        match self.latest(Service::DeviceState)? {
            Message::DeviceState(state) => Some(state),
            _ => None,
        }
    }

    fn wide_road_camera_state(&self) -> Option<&CameraState> {
        match self.latest(Service::WideRoadCameraState)? {
            Message::WideRoadCameraState(state) => Some(state),
            _ => None,
        }
    }

    fn selfdrive_state(&self) -> Option<&SelfdriveState> {
        match self.latest(Service::SelfdriveState)? {
            Message::SelfdriveState(state) => Some(state),
            _ => None,
        }
    }
}

/// Latest-value cache for a single topic
#[derive(Debug, Clone, Default)]
struct TopicSlot {
    latest: Option<Message>,
    recv_frame: u64,
    updated: bool,
    alive: bool,
    valid: bool,
}

/// In-memory subscriber
///
/// Messages queued with [`SubMaster::send`] become visible on the next
/// [`SubMaster::update`]. If several messages are queued for the same topic
/// between updates, the newest one wins.
#[derive(Debug, Clone)]
pub struct SubMaster {
    frame: u64,
    alive_frames: u64,
    slots: HashMap<Service, TopicSlot>,
    pending: HashMap<Service, (Message, bool)>,
}

impl SubMaster {
    /// Create a subscriber for every [`Service`]
    ///
    /// A topic stays alive for `alive_frames` ticks after its last delivery.
    pub fn new(alive_frames: u64) -> Self {
        let slots = Service::ALL
            .iter()
            .map(|&service| (service, TopicSlot::default()))
            .collect();
        Self {
            frame: 0,
            alive_frames,
            slots,
            pending: HashMap::new(),
        }
    }

    /// Queue a valid message for delivery on the next update
    pub fn send(&mut self, msg: Message) {
        self.pending.insert(msg.service(), (msg, true));
    }

    /// Queue a message whose payload reports itself as invalid
    pub fn send_invalid(&mut self, msg: Message) {
        self.pending.insert(msg.service(), (msg, false));
    }

    /// Advance one tick and publish queued messages
    pub fn update(&mut self) {
        self.frame += 1;
        let frame = self.frame;

        for (service, slot) in self.slots.iter_mut() {
            match self.pending.remove(service) {
                Some((msg, valid)) => {
                    slot.latest = Some(msg);
                    slot.recv_frame = frame;
                    slot.updated = true;
                    slot.valid = valid;
                }
                None => slot.updated = false,
            }
            slot.alive =
                slot.latest.is_some() && frame - slot.recv_frame <= self.alive_frames;
        }

        log::trace!("SubMaster frame {}", frame);
    }

    fn slot(&self, service: Service) -> Option<&TopicSlot> {
        self.slots.get(&service)
    }
}

impl MessageSource for SubMaster {
    fn frame(&self) -> u64 {
        self.frame
    }

    fn updated(&self, service: Service) -> bool {
        self.slot(service).map_or(false, |s| s.updated)
    }

    fn alive(&self, service: Service) -> bool {
        self.slot(service).map_or(false, |s| s.alive)
    }

    fn valid(&self, service: Service) -> bool {
        self.slot(service).map_or(false, |s| s.valid)
    }

    fn recv_frame(&self, service: Service) -> u64 {
        self.slot(service).map_or(0, |s| s.recv_frame)
    }

    fn latest(&self, service: Service) -> Option<&Message> {
        self.slot(service).and_then(|s| s.latest.as_ref())
    }
}
