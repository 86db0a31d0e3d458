use std::collections::BTreeMap;

use crate::controller::Controller;

/// Connected controllers keyed by slot.
///
/// Slots are independent: removing one never shifts another, and empty slots
/// are simply absent. Iteration is in slot order.
#[derive(Debug, Default)]
pub struct Registry {
    controllers: BTreeMap<usize, Controller>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `controller` at its slot, returning whatever occupied it before.
    pub fn insert(&mut self, controller: Controller) -> Option<Controller> {
        self.controllers.insert(controller.slot(), controller)
    }

    pub fn remove(&mut self, slot: usize) -> Option<Controller> {
        self.controllers.remove(&slot)
    }

    pub fn get(&self, slot: usize) -> Option<&Controller> {
        self.controllers.get(&slot)
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.controllers.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Controller> {
        self.controllers.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerType, RawDevice};
    use crate::mapping::{Host, MappingTable};

    fn controller(slot: usize) -> Controller {
        let table = MappingTable::builtin();
        let raw = RawDevice::new(slot, "Xbox 360 Controller", vec![0.0; 17], vec![0.0; 4]);
        match table.lookup(ControllerType::Xbox, Host::Standard) {
            Some(mapping) => Controller::new(&raw, ControllerType::Xbox, mapping),
            None => panic!("xbox mapping is built in"),
        }
    }

    #[test]
    fn removal_keeps_other_slots_in_place() {
        let mut registry = Registry::new();
        for slot in [0, 1, 3] {
            registry.insert(controller(slot));
        }

        assert!(registry.remove(1).is_some());
        assert!(registry.remove(1).is_none());

        let slots: Vec<usize> = registry.iter().map(Controller::slot).collect();
        assert_eq!(slots, vec![0, 3]);
        assert!(registry.get(3).is_some());
        assert!(!registry.contains(1));
    }

    #[test]
    fn insert_replaces_stale_entry() {
        let mut registry = Registry::new();
        registry.insert(controller(2));
        let previous = registry.insert(controller(2));

        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
    }
}
