//! Snapshot-diffing source over any [`DeviceProvider`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::{Hotplug, InputSource};
use crate::controller::{ControllerType, RawDevice};
use crate::mapping::{Host, Mapping, MappingTable};

/// Host primitive that returns every connected device on each poll.
///
/// Slots without a device are absent from the returned map.
pub trait DeviceProvider {
    fn host(&self) -> Host;

    fn is_available(&self) -> bool;

    fn poll(&mut self) -> BTreeMap<usize, RawDevice>;
}

/// Source that diffs consecutive provider snapshots by slot
pub struct PollingSource<P: DeviceProvider> {
    provider: P,
    mappings: Arc<MappingTable>,
    last_seen: BTreeMap<usize, RawDevice>,
}

impl<P: DeviceProvider> PollingSource<P> {
    pub fn new(provider: P, mappings: Arc<MappingTable>) -> Self {
        Self {
            provider,
            mappings,
            last_seen: BTreeMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: DeviceProvider> InputSource for PollingSource<P> {
    fn name(&self) -> &'static str {
        "polling"
    }

    fn is_supported(&self) -> bool {
        self.provider.is_available()
    }

    fn host(&self) -> Host {
        self.provider.host()
    }

    fn update(&mut self) -> Vec<Hotplug> {
        let current = self.provider.poll();
        let mut transitions = Vec::new();

        // Disconnects first so a reused slot is free before its new connect
        for (slot, previous) in &self.last_seen {
            let replaced = current
                .get(slot)
                .is_some_and(|device| device.name != previous.name);
            if replaced || !current.contains_key(slot) {
                debug!("Slot {} gone from snapshot ({})", slot, previous.name);
                transitions.push(Hotplug::Disconnected(previous.clone()));
            }
        }

        for (slot, device) in &current {
            let known = self
                .last_seen
                .get(slot)
                .is_some_and(|previous| previous.name == device.name);
            if !known {
                debug!("Slot {} appeared in snapshot ({})", slot, device.name);
                transitions.push(Hotplug::Connected(device.clone()));
            }
        }

        self.last_seen = current;
        transitions
    }

    fn mapping(&self, kind: ControllerType) -> Option<Arc<Mapping>> {
        self.mappings.lookup(kind, self.provider.host())
    }

    fn device(&self, slot: usize) -> Option<&RawDevice> {
        self.last_seen.get(&slot)
    }
}

/// Provider the host writes snapshots into, from any thread.
///
/// Clones share the same device map.
///
/// # Examples
///
/// ```rust
/// use unipad::mapping::Host;
/// use unipad::source::SharedSnapshot;
/// use unipad::RawDevice;
///
/// let feed = SharedSnapshot::new(Host::Standard);
/// feed.plug(RawDevice::new(0, "Xbox 360 Controller", vec![0.0; 17], vec![0.0; 4]));
/// feed.set_button(0, 0, 1.0);
/// assert_eq!(feed.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedSnapshot {
    host: Host,
    devices: Arc<Mutex<BTreeMap<usize, RawDevice>>>,
}

impl SharedSnapshot {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            devices: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    // A panicked writer cannot leave a snapshot half-built, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, BTreeMap<usize, RawDevice>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Places `device` at its slot, replacing whatever was there.
    pub fn plug(&self, device: RawDevice) {
        info!("Snapshot feed: device on slot {} ({})", device.slot, device.name);
        self.lock().insert(device.slot, device);
    }

    pub fn unplug(&self, slot: usize) -> Option<RawDevice> {
        self.lock().remove(&slot)
    }

    /// Sets one raw button value; returns false if the slot or index is absent.
    pub fn set_button(&self, slot: usize, index: usize, value: f32) -> bool {
        self.lock()
            .get_mut(&slot)
            .and_then(|device| device.buttons.get_mut(index))
            .map(|button| *button = value)
            .is_some()
    }

    /// Sets one raw axis value; returns false if the slot or index is absent.
    pub fn set_axis(&self, slot: usize, index: usize, value: f32) -> bool {
        self.lock()
            .get_mut(&slot)
            .and_then(|device| device.axes.get_mut(index))
            .map(|axis| *axis = value)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl DeviceProvider for SharedSnapshot {
    fn host(&self) -> Host {
        self.host
    }

    fn is_available(&self) -> bool {
        true
    }

    fn poll(&mut self) -> BTreeMap<usize, RawDevice> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(slot: usize, name: &str) -> RawDevice {
        RawDevice::new(slot, name, vec![0.0; 17], vec![0.0; 4])
    }

    fn source() -> (SharedSnapshot, PollingSource<SharedSnapshot>) {
        let feed = SharedSnapshot::new(Host::Standard);
        let source = PollingSource::new(feed.clone(), Arc::new(MappingTable::builtin()));
        (feed, source)
    }

    #[test]
    fn reports_each_transition_once() {
        let (feed, mut source) = source();
        feed.plug(device(0, "Xbox 360 Controller"));

        assert_eq!(
            source.update(),
            vec![Hotplug::Connected(device(0, "Xbox 360 Controller"))]
        );
        assert!(source.update().is_empty());

        feed.unplug(0);
        assert_eq!(
            source.update(),
            vec![Hotplug::Disconnected(device(0, "Xbox 360 Controller"))]
        );
        assert!(source.update().is_empty());
    }

    #[test]
    fn tolerates_gaps_between_slots() {
        let (feed, mut source) = source();
        feed.plug(device(0, "Xbox 360 Controller"));
        feed.plug(device(3, "Logitech Dual Action"));

        let transitions = source.update();
        assert_eq!(transitions.len(), 2);
        assert!(source.device(1).is_none());
        assert!(source.device(3).is_some());

        feed.unplug(0);
        assert_eq!(
            source.update(),
            vec![Hotplug::Disconnected(device(0, "Xbox 360 Controller"))]
        );
        assert!(source.device(3).is_some());
    }

    #[test]
    fn renamed_slot_is_a_reconnect() {
        let (feed, mut source) = source();
        feed.plug(device(1, "Xbox 360 Controller"));
        source.update();

        feed.plug(device(1, "Logitech Dual Action"));
        assert_eq!(
            source.update(),
            vec![
                Hotplug::Disconnected(device(1, "Xbox 360 Controller")),
                Hotplug::Connected(device(1, "Logitech Dual Action")),
            ]
        );
    }

    #[test]
    fn input_changes_are_not_transitions() {
        let (feed, mut source) = source();
        feed.plug(device(0, "Xbox 360 Controller"));
        source.update();

        assert!(feed.set_button(0, 3, 1.0));
        assert!(!feed.set_button(0, 99, 1.0));
        assert!(!feed.set_axis(5, 0, 1.0));

        assert!(source.update().is_empty());
        assert_eq!(source.device(0).and_then(|d| d.button(3)), Some(1.0));
    }

    #[test]
    fn mapping_follows_provider_host() {
        let feed = SharedSnapshot::new(Host::MacOs);
        let source = PollingSource::new(feed, Arc::new(MappingTable::builtin()));

        assert!(source.mapping(ControllerType::Xbox).is_some());
        assert!(source.mapping(ControllerType::Logitech).is_none());
    }
}
