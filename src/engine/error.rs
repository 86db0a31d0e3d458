use color_eyre::eyre;

use crate::config::ConfigError;
use crate::engine::Channel;
use crate::mapping::{ControlSource, MappingError};

/// Errors surfaced by engine construction and by a tick
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A bound listener failed; remaining listeners for that event were skipped
    #[error("Listener on `{channel}` failed: {report}")]
    Listener {
        channel: Channel,
        report: eyre::Report,
    },

    /// The raw snapshot lacks an input the mapping refers to.
    ///
    /// Mappings are written for a specific host layout, so this points at a
    /// mapping/host mismatch rather than a transient condition.
    #[error("Slot {slot}: no raw input for control `{control}` ({input:?})")]
    MissingInput {
        slot: usize,
        control: String,
        input: ControlSource,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}
