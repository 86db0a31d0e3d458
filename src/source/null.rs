use std::sync::Arc;

use super::{Hotplug, InputSource};
use crate::controller::{ControllerType, RawDevice};
use crate::mapping::{Host, Mapping};

/// Inert source for hosts without controller support
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

impl InputSource for NullSource {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn host(&self) -> Host {
        Host::Standard
    }

    fn update(&mut self) -> Vec<Hotplug> {
        Vec::new()
    }

    fn mapping(&self, _kind: ControllerType) -> Option<Arc<Mapping>> {
        None
    }

    fn device(&self, _slot: usize) -> Option<&RawDevice> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_reports_anything() {
        let mut source = NullSource;

        assert!(!source.is_supported());
        assert!(source.update().is_empty());
        assert!(source.mapping(ControllerType::Xbox).is_none());
        assert!(source.device(0).is_none());
    }
}
