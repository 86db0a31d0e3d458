//! # Engine
//!
//! Owns the adopted input source, the slot registry of connected controllers
//! and the event dispatcher. One [`Engine::tick`] applies pending hotplug
//! transitions, recomputes every controller from its latest raw snapshot,
//! fires the resulting edge events and finally one `tick` event.
//!
//! ## Threading
//! The engine is single-threaded: handlers are `Rc` closures that run inline
//! on the thread calling `tick`. Drive it from a current-thread runtime (see
//! [`crate::FrameLoop`]) or call `tick` manually.
//!
//! ## Failure model
//! Nothing is retried. A handler error or a mapping that refers to a raw
//! input the device lacks aborts the current tick with an [`EngineError`];
//! the next tick starts again from the latest snapshot. Hotplug transitions
//! are the exception: they are always applied in full before an error is
//! returned, since the source reports each of them only once.

pub mod error;
pub mod events;
pub mod registry;

pub use error::EngineError;
pub use events::{handler, Channel, ControlEvent, Dispatcher, Event, Handler, UnknownChannel};
pub use registry::Registry;

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::controller::{Controller, ControllerType, RawDevice, Shaping};
use crate::mapping::MappingTable;
use crate::source::{self, Hotplug, InputSource, NullSource, SourceFactory};

pub struct Engine {
    shaping: Shaping,
    factories: Vec<SourceFactory>,
    mappings: Arc<MappingTable>,
    // NullSource until init adopts a supported one
    source: Box<dyn InputSource>,
    registry: Registry,
    dispatcher: Dispatcher,
}

impl Engine {
    /// Engine over the default sources (gilrs).
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        Self::with_sources(config, source::default_factories())
    }

    /// Engine over `factories`, tried in order by [`Engine::init`].
    pub fn with_sources(
        config: &EngineConfig,
        factories: Vec<SourceFactory>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mappings = Arc::new(config.mapping_table()?);
        debug!("Engine created with {} mappings", mappings.len());

        Ok(Self {
            shaping: config.shaping(),
            factories,
            mappings,
            source: Box::new(NullSource),
            registry: Registry::new(),
            dispatcher: Dispatcher::new(),
        })
    }

    /// Adopts the first supported source.
    ///
    /// Returns false when the host supports none; the engine then stays a
    /// harmless no-op. Once a source is adopted further calls keep it.
    pub fn init(&mut self) -> bool {
        if self.source.is_supported() {
            debug!("Engine already initialized with {}", self.source.name());
            return true;
        }

        self.source = source::resolve(&self.factories, &self.mappings);
        let supported = self.source.is_supported();
        if supported {
            info!("Engine initialized with source {}", self.source.name());
        } else {
            warn!("Controller input is not supported on this host");
        }
        supported
    }

    pub fn is_initialized(&self) -> bool {
        self.source.is_supported()
    }

    /// Name of the adopted source (`"null"` before a successful init)
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Registers the device at its slot if its family has a mapping on this host.
    ///
    /// Fires `connected` and returns true on success; fires `unsupported` and
    /// returns false otherwise. A stale entry on the same slot is replaced.
    pub fn connect(&mut self, raw: &RawDevice) -> Result<bool, EngineError> {
        let kind = ControllerType::resolve(&raw.name);
        let mapping = if kind.is_supported() {
            self.source.mapping(kind)
        } else {
            None
        };

        let Some(mapping) = mapping else {
            warn!(
                "Unsupported controller on slot {}: {} ({}, {} layout)",
                raw.slot,
                raw.name,
                kind,
                self.source.host()
            );
            self.dispatcher.fire(&Event::Unsupported(raw))?;
            return Ok(false);
        };

        let controller = Controller::new(raw, kind, mapping);
        controller.log_connected();
        if self.registry.insert(controller).is_some() {
            debug!("Replaced stale controller on slot {}", raw.slot);
        }

        if let Some(controller) = self.registry.get(raw.slot) {
            self.dispatcher.fire(&Event::Connected(controller))?;
        }
        Ok(true)
    }

    /// Removes the slot entry, if any, and fires `disconnected`.
    pub fn disconnect(&mut self, raw: &RawDevice) -> Result<(), EngineError> {
        match self.registry.remove(raw.slot) {
            Some(controller) => info!(
                "Controller disconnected from slot {}: {}",
                raw.slot,
                controller.name()
            ),
            None => debug!("Disconnect for unregistered slot {}", raw.slot),
        }
        self.dispatcher.fire(&Event::Disconnected(raw))
    }

    /// Runs one frame.
    ///
    /// Every hotplug transition is applied to the registry even when a
    /// listener fails; the first failure is returned once the registry matches
    /// the source again, and the refresh waits for the next frame.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        let mut first_error = None;

        for transition in self.source.update() {
            let applied = match transition {
                Hotplug::Connected(raw) => self.connect(&raw).map(|_| ()),
                Hotplug::Disconnected(raw) => self.disconnect(&raw),
            };
            if let Err(e) = applied {
                warn!("Hotplug listener failed: {}", e);
                first_error = first_error.or(Some(e));
            }
        }

        if let Err(e) = self.drop_vanished() {
            first_error = first_error.or(Some(e));
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        for controller in self.registry.iter_mut() {
            let Some(raw) = self.source.device(controller.slot()) else {
                continue;
            };
            controller.refresh(raw, &self.shaping, &self.dispatcher)?;
        }

        if !self.registry.is_empty() {
            let controllers: Vec<&Controller> = self.registry.iter().collect();
            self.dispatcher.fire(&Event::Tick(&controllers))?;
        }
        Ok(())
    }

    // Registered slots the source no longer reports count as disconnected
    fn drop_vanished(&mut self) -> Result<(), EngineError> {
        let vanished: Vec<RawDevice> = self
            .registry
            .iter()
            .filter(|controller| self.source.device(controller.slot()).is_none())
            .map(|controller| {
                RawDevice::new(controller.slot(), controller.name(), Vec::new(), Vec::new())
            })
            .collect();

        let mut first_error = None;
        for raw in vanished {
            warn!(
                "Slot {} vanished from {} without a disconnect",
                raw.slot,
                self.source.name()
            );
            if let Err(e) = self.disconnect(&raw) {
                first_error = first_error.or(Some(e));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Binds `handler` on `channel`. Chainable.
    pub fn bind(&mut self, channel: Channel, handler: Handler) -> &mut Self {
        self.dispatcher.bind(channel, handler);
        self
    }

    /// Wraps `f` into a [`Handler`], binds it and returns it for a later unbind.
    pub fn on<F>(&mut self, channel: Channel, f: F) -> Handler
    where
        F: Fn(&Event<'_>) -> color_eyre::eyre::Result<()> + 'static,
    {
        let bound = handler(f);
        self.dispatcher.bind(channel, bound.clone());
        bound
    }

    pub fn unbind(&mut self, channel: Channel, handler: &Handler) -> bool {
        self.dispatcher.unbind(channel, handler)
    }

    pub fn unbind_channel(&mut self, channel: Channel) {
        self.dispatcher.unbind_channel(channel);
    }

    pub fn unbind_all(&mut self) {
        self.dispatcher.unbind_all();
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.dispatcher.listener_count(channel)
    }

    /// Shared handle for binding from inside handlers
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Number of registered controllers
    pub fn count(&self) -> usize {
        self.registry.len()
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.registry.iter()
    }

    pub fn controller(&self, slot: usize) -> Option<&Controller> {
        self.registry.get(slot)
    }

    pub fn shaping(&self) -> Shaping {
        self.shaping
    }

    /// Takes effect from the next tick.
    pub fn set_deadzone(&mut self, deadzone: f32) {
        debug!("Deadzone set to {}", deadzone);
        self.shaping.deadzone = deadzone;
    }

    /// Takes effect from the next tick.
    pub fn set_maximize_threshold(&mut self, maximize_threshold: f32) {
        debug!("Maximize threshold set to {}", maximize_threshold);
        self.shaping.maximize_threshold = maximize_threshold;
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("source", &self.source.name())
            .field("shaping", &self.shaping)
            .field("controllers", &self.registry.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
