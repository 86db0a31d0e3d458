use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, info};

use crate::controller::{ControllerType, RawDevice, Shaping};
use crate::engine::{ControlEvent, Dispatcher, EngineError, Event};
use crate::mapping::{Control, Mapping};

// Buttons count as pressed strictly above and released strictly below this
const PRESS_THRESHOLD: f32 = 0.5;

/// Normalized state of one connected controller.
///
/// Values are stored per control in [`Mapping::controls`] order (buttons
/// first, then axes). Both value vectors always hold exactly one entry per
/// mapped control, and the down flags one entry per mapped button.
#[derive(Debug, Clone)]
pub struct Controller {
    slot: usize,
    name: String,
    kind: ControllerType,
    mapping: Arc<Mapping>,
    current: Vec<f32>,
    previous: Vec<f32>,
    down: Vec<bool>,
    connected_at: DateTime<Local>,
}

impl Controller {
    pub fn new(raw: &RawDevice, kind: ControllerType, mapping: Arc<Mapping>) -> Self {
        let controls = mapping.len();
        let buttons = mapping.buttons().len();

        Self {
            slot: raw.slot,
            name: raw.name.clone(),
            kind,
            mapping,
            current: vec![0.0; controls],
            previous: vec![0.0; controls],
            down: vec![false; buttons],
            connected_at: Local::now(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ControllerType {
        self.kind
    }

    pub fn mapping(&self) -> &Arc<Mapping> {
        &self.mapping
    }

    pub fn connected_at(&self) -> DateTime<Local> {
        self.connected_at
    }

    /// Value computed on the last tick, `None` for names outside the mapping
    pub fn value(&self, name: &str) -> Option<f32> {
        self.mapping.position(name).map(|i| self.current[i])
    }

    pub fn previous_value(&self, name: &str) -> Option<f32> {
        self.mapping.position(name).map(|i| self.previous[i])
    }

    pub fn is_down(&self, name: &str) -> bool {
        self.mapping
            .buttons()
            .iter()
            .position(|control| control.name() == name)
            .is_some_and(|i| self.down[i])
    }

    pub fn down_buttons(&self) -> Vec<&str> {
        self.mapping
            .buttons()
            .iter()
            .zip(&self.down)
            .filter(|(_, down)| **down)
            .map(|(control, _)| control.name())
            .collect()
    }

    /// `(name, value)` pairs in mapping order
    pub fn state(&self) -> impl Iterator<Item = (&str, f32)> {
        self.mapping
            .controls()
            .zip(self.current.iter().copied())
            .map(|(control, value)| (control.name(), value))
    }

    /// Recomputes every mapped control from `raw` and fires edge events.
    ///
    /// Buttons: `button-down` when the value rises strictly above 0.5,
    /// `button-up` when it falls strictly below; exactly 0.5 keeps the previous
    /// state. Analog button values strictly between 0 and 1 also fire
    /// `axis-changed` when they move. Axes fire `axis-changed` on every
    /// distinct value.
    pub(crate) fn refresh(
        &mut self,
        raw: &RawDevice,
        shaping: &Shaping,
        dispatcher: &Dispatcher,
    ) -> Result<(), EngineError> {
        let mapping = Arc::clone(&self.mapping);

        for (i, control) in mapping.buttons().iter().enumerate() {
            let value = self.resolve(control, raw, shaping)?;
            self.current[i] = value;

            if value > PRESS_THRESHOLD && !self.down[i] {
                self.down[i] = true;
                debug!("Slot {} button {} down ({:.3})", self.slot, control.name(), value);
                dispatcher.fire(&Event::ButtonDown(ControlEvent::new(self, control, value)))?;
            } else if value < PRESS_THRESHOLD && self.down[i] {
                self.down[i] = false;
                debug!("Slot {} button {} up ({:.3})", self.slot, control.name(), value);
                dispatcher.fire(&Event::ButtonUp(ControlEvent::new(self, control, value)))?;
            }

            if value > 0.0 && value < 1.0 && value != self.previous[i] {
                dispatcher.fire(&Event::AxisChanged(ControlEvent::new(self, control, value)))?;
            }

            self.previous[i] = value;
        }

        let offset = mapping.buttons().len();
        for (j, control) in mapping.axes().iter().enumerate() {
            let i = offset + j;
            let value = self.resolve(control, raw, shaping)?;
            self.current[i] = value;

            if value != self.previous[i] {
                dispatcher.fire(&Event::AxisChanged(ControlEvent::new(self, control, value)))?;
            }

            self.previous[i] = value;
        }

        Ok(())
    }

    fn resolve(
        &self,
        control: &Control,
        raw: &RawDevice,
        shaping: &Shaping,
    ) -> Result<f32, EngineError> {
        control
            .resolve(raw, shaping)
            .ok_or_else(|| EngineError::MissingInput {
                slot: self.slot,
                control: control.name().to_string(),
                input: control.source(),
            })
    }

    pub(crate) fn log_connected(&self) {
        info!(
            "Controller connected on slot {}: {} ({}, {} controls) at {}",
            self.slot,
            self.name,
            self.kind,
            self.mapping.len(),
            self.connected_at.format("%H:%M:%S.%3f")
        );
    }
}
