//! unipad - unified gamepad input with edge-triggered events
//!
//! Normalizes the raw button/axis layouts that different hosts and controller
//! models report into one set of named logical controls, and turns the
//! per-frame state into discrete events.
//!
//! # Architecture
//!
//! ```text
//! FrameLoop ──► Engine::tick ──► InputSource::update ──► connect / disconnect
//!                    │                                         │
//!                    ▼                                         ▼
//!            Controller::refresh ──────────────────────► Dispatcher::fire
//!       (mapping + shaping + diff)                  (connected, button-down, ...)
//! ```
//!
//! The engine is single-threaded: it is driven either by [`scheduler::FrameLoop`]
//! or by calling [`Engine::tick`] directly from the host's own frame callback.

pub mod config;
pub mod controller;
pub mod engine;
pub mod mapping;
pub mod scheduler;
pub mod source;

pub use config::{ConfigError, EngineConfig};
pub use controller::{shape, Controller, ControllerType, RawDevice, Shaping};
pub use engine::{handler, Channel, ControlEvent, Dispatcher, Engine, EngineError, Event, Handler};
pub use mapping::{Control, ControlSource, Host, Mapping, MappingError, MappingTable};
pub use scheduler::{FrameLoop, FrameSettings};
pub use source::{Hotplug, InputSource, SourceFactory};
