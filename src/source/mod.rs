//! Input sources: where raw device snapshots and hotplug transitions come from.
//!
//! Every host integration implements [`InputSource`]. The engine picks one at
//! `init` by trying factories in priority order and adopting the first that
//! reports itself supported; when none does it falls back to [`NullSource`],
//! so the rest of the engine never has to ask whether a source exists.
//!
//! # Variants
//!
//! ```text
//! GilrsSource     event-driven   hotplug from gilrs notifications
//! PollingSource   snapshot-diff  any DeviceProvider (e.g. SharedSnapshot)
//! NullSource      inert          unsupported hosts
//! ```

pub mod event;
pub mod null;
pub mod polling;

pub use event::GilrsSource;
pub use null::NullSource;
pub use polling::{DeviceProvider, PollingSource, SharedSnapshot};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::controller::{ControllerType, RawDevice};
use crate::mapping::{Host, Mapping, MappingTable};

/// Connection transition reported by a source
#[derive(Debug, Clone, PartialEq)]
pub enum Hotplug {
    Connected(RawDevice),
    Disconnected(RawDevice),
}

/// Capability shared by all host integrations
pub trait InputSource {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn is_supported(&self) -> bool;

    /// Raw layout the devices of this source report
    fn host(&self) -> Host;

    /// Refreshes raw snapshots and returns connection transitions in the order
    /// they happened, at most one per actual change.
    fn update(&mut self) -> Vec<Hotplug>;

    fn mapping(&self, kind: ControllerType) -> Option<Arc<Mapping>>;

    /// Latest raw snapshot for `slot`
    fn device(&self, slot: usize) -> Option<&RawDevice>;
}

/// Builds a source over the shared mapping table
pub type SourceFactory = Box<dyn Fn(Arc<MappingTable>) -> Box<dyn InputSource>>;

/// Factories tried by [`crate::Engine::new`], highest priority first
pub fn default_factories() -> Vec<SourceFactory> {
    vec![Box::new(|mappings| Box::new(GilrsSource::new(mappings)))]
}

/// Adopts the first supported source, falling back to [`NullSource`].
pub fn resolve(factories: &[SourceFactory], mappings: &Arc<MappingTable>) -> Box<dyn InputSource> {
    for factory in factories {
        let source = factory(Arc::clone(mappings));
        if source.is_supported() {
            info!(
                "Using input source: {} ({} layout)",
                source.name(),
                source.host()
            );
            return source;
        }
        debug!("Input source {} is not supported on this host", source.name());
    }

    warn!("No supported input source found, falling back to the null source");
    Box::new(NullSource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsupported_factory() -> SourceFactory {
        Box::new(|_| Box::new(NullSource))
    }

    fn polling_factory(host: Host) -> SourceFactory {
        Box::new(move |mappings| Box::new(PollingSource::new(SharedSnapshot::new(host), mappings)))
    }

    #[test]
    fn first_supported_factory_wins() {
        let mappings = Arc::new(MappingTable::builtin());
        let factories = vec![
            unsupported_factory(),
            polling_factory(Host::Linux),
            polling_factory(Host::Windows),
        ];

        let source = resolve(&factories, &mappings);
        assert!(source.is_supported());
        assert_eq!(source.host(), Host::Linux);
    }

    #[test]
    fn falls_back_to_null_source() {
        let mappings = Arc::new(MappingTable::builtin());
        let source = resolve(&[unsupported_factory()], &mappings);

        assert!(!source.is_supported());
        assert_eq!(source.name(), "null");

        let source = resolve(&[], &mappings);
        assert!(!source.is_supported());
    }
}
