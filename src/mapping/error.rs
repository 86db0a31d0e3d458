//! Error definitions for the mapping module

use crate::controller::ControllerType;
use thiserror::Error;

/// Errors raised while building or registering a mapping
#[derive(Debug, Error)]
pub enum MappingError {
    /// Two controls in one mapping share a name (buttons and axes share one namespace)
    #[error("Control `{name}` is declared more than once in the {kind} mapping")]
    DuplicateControl { kind: ControllerType, name: String },

    /// Mappings cannot be registered for devices that never resolve to a type
    #[error("Cannot register a mapping for unsupported controllers")]
    UnsupportedType,
}
