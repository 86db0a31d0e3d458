//! Event-driven source backed by gilrs.
//!
//! gilrs watches the host for hotplug on its own and queues the notifications;
//! this source registers once at construction and forwards those
//! notifications on each update. Raw values are read from gilrs's cached
//! state in the canonical [`Host::Standard`] order.

use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{Hotplug, InputSource};
use crate::controller::{ControllerType, RawDevice};
use crate::mapping::{Host, Mapping, MappingTable};

// Canonical button order, index = raw button index
const BUTTON_LAYOUT: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

const AXIS_LAYOUT: [Axis; 4] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

pub struct GilrsSource {
    // None when gilrs has no backend for this platform
    gilrs: Option<Gilrs>,
    mappings: Arc<MappingTable>,
    tracker: HotplugTracker,
}

impl GilrsSource {
    pub fn new(mappings: Arc<MappingTable>) -> Self {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                Some(g)
            }
            Err(gilrs::Error::NotImplemented(_)) => {
                warn!("gilrs has no backend for this platform");
                None
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                None
            }
        };

        let mut tracker = HotplugTracker::default();
        if let Some(gilrs) = gilrs.as_ref() {
            for (id, gamepad) in gilrs.gamepads() {
                let device = snapshot(id, &gamepad);
                info!("Found gamepad [{}] {}", device.slot, device.name);
                tracker.seed(device);
            }
            if tracker.is_empty() {
                info!("No gamepad connected yet");
            }
        }

        Self {
            gilrs,
            mappings,
            tracker,
        }
    }
}

impl InputSource for GilrsSource {
    fn name(&self) -> &'static str {
        "gilrs"
    }

    fn is_supported(&self) -> bool {
        self.gilrs.is_some()
    }

    fn host(&self) -> Host {
        Host::Standard
    }

    fn update(&mut self) -> Vec<Hotplug> {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return Vec::new();
        };

        // Draining the queue also advances gilrs's cached gamepad state
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            let slot = usize::from(id);
            self.tracker.on_event(slot, &event, || {
                gilrs
                    .connected_gamepad(id)
                    .map(|gamepad| snapshot(id, &gamepad))
            });
        }

        for (id, gamepad) in gilrs.gamepads() {
            self.tracker.refresh(snapshot(id, &gamepad));
        }

        self.tracker.take()
    }

    fn mapping(&self, kind: ControllerType) -> Option<Arc<Mapping>> {
        self.mappings.lookup(kind, Host::Standard)
    }

    fn device(&self, slot: usize) -> Option<&RawDevice> {
        self.tracker.device(slot)
    }
}

/// Connected slots and the transitions not yet handed to the engine.
///
/// Each slot is reported connected once and disconnected once, whatever
/// gilrs repeats in between.
#[derive(Debug, Default)]
struct HotplugTracker {
    devices: BTreeMap<usize, RawDevice>,
    pending: Vec<Hotplug>,
}

impl HotplugTracker {
    fn seed(&mut self, device: RawDevice) {
        self.devices.insert(device.slot, device.clone());
        self.pending.push(Hotplug::Connected(device));
    }

    fn on_event<F>(&mut self, slot: usize, event: &EventType, snapshot: F)
    where
        F: FnOnce() -> Option<RawDevice>,
    {
        match event {
            EventType::Connected => {
                if self.devices.contains_key(&slot) {
                    debug!("Gamepad {} already registered", slot);
                    return;
                }
                if let Some(device) = snapshot() {
                    info!("Gamepad connected: [{}] {}", slot, device.name);
                    self.seed(device);
                }
            }
            EventType::Disconnected => {
                if let Some(device) = self.devices.remove(&slot) {
                    warn!("Gamepad disconnected: [{}] {}", slot, device.name);
                    self.pending.push(Hotplug::Disconnected(device));
                }
            }
            _ => {}
        }
    }

    // Only slots already reported as connected are refreshed
    fn refresh(&mut self, device: RawDevice) {
        if let Some(known) = self.devices.get_mut(&device.slot) {
            *known = device;
        }
    }

    fn take(&mut self) -> Vec<Hotplug> {
        std::mem::take(&mut self.pending)
    }

    fn device(&self, slot: usize) -> Option<&RawDevice> {
        self.devices.get(&slot)
    }

    fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn snapshot(id: GamepadId, gamepad: &Gamepad<'_>) -> RawDevice {
    let buttons = BUTTON_LAYOUT
        .iter()
        .map(|button| gamepad.button_data(*button).map_or(0.0, |data| data.value()))
        .collect();
    let axes = AXIS_LAYOUT
        .iter()
        .map(|axis| gamepad.axis_data(*axis).map_or(0.0, |data| data.value()))
        .collect();

    RawDevice::new(usize::from(id), gamepad.name(), buttons, axes)
}
