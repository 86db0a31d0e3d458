//! Controller model: raw snapshots, type resolution, shaping and the
//! normalized per-slot controller state.
//!
//! # Pipeline
//!
//! ```text
//! RawDevice ──► ControllerType::resolve ──► Mapping ──► Controller::refresh
//!  (host layout)   (name heuristics)       (names)     (shaping + edge diff)
//! ```

pub mod device;
pub mod kind;
pub mod normalized;
pub mod shaping;

pub use device::RawDevice;
pub use kind::ControllerType;
pub use normalized::Controller;
pub use shaping::{shape, Shaping, DEFAULT_DEADZONE, DEFAULT_MAXIMIZE_THRESHOLD};
