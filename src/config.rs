//! # Configuration
//!
//! Engine settings are read from a single TOML file,
//! `<config dir>/unipad/config.toml`. Every field is optional; a missing file
//! behaves like an empty one. Shaping values and the frame interval live at
//! the top level, and each `[[mappings]]` table replaces the built-in mapping
//! for one controller family (and optionally one host layout).
//!
//! ```toml
//! deadzone = 0.05
//! maximize_threshold = 0.95
//! tick_interval_ms = 8
//!
//! [[mappings]]
//! controller = "logitech"
//! host = "linux"
//! buttons = [{ name = "A", index = 1 }, { name = "B", index = 2 }]
//! axes = [{ name = "LEFT_STICK_X", index = 0 }]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::{ControllerType, Shaping, DEFAULT_DEADZONE, DEFAULT_MAXIMIZE_THRESHOLD};
use crate::mapping::{ControlSource, Host, Mapping, MappingError, MappingTable};

const CONFIG_DIR: &str = "unipad";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub deadzone: f32,
    pub maximize_threshold: f32,
    /// Frame loop period in milliseconds
    pub tick_interval_ms: u64,
    pub mappings: Vec<MappingOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
            maximize_threshold: DEFAULT_MAXIMIZE_THRESHOLD,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            mappings: Vec::new(),
        }
    }
}

/// Replacement mapping for one controller family.
///
/// Without a host the override applies to every host that has no
/// host-specific entry of its own.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct MappingOverride {
    pub controller: ControllerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
    #[serde(default)]
    pub buttons: Vec<ControlOverride>,
    #[serde(default)]
    pub axes: Vec<ControlOverride>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ControlOverride {
    pub name: String,
    pub index: usize,
}

impl MappingOverride {
    pub fn to_mapping(&self) -> Result<Mapping, MappingError> {
        let controls = |list: &[ControlOverride]| {
            list.iter()
                .map(|control| (control.name.clone(), ControlSource::Index(control.index)))
                .collect()
        };
        Mapping::new(
            self.controller,
            self.host,
            controls(&self.buttons),
            controls(&self.axes),
        )
    }
}

impl EngineConfig {
    /// `<config dir>/unipad/config.toml`, falling back to the working directory
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads and validates `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse(&content)?;
        info!(
            "Loaded config from {} ({} mapping overrides)",
            path.display(),
            config.mappings.len()
        );
        Ok(config)
    }

    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load(&Self::default_path())
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_shaping(self.deadzone, self.maximize_threshold)?;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        for entry in &self.mappings {
            entry
                .to_mapping()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    pub fn shaping(&self) -> Shaping {
        Shaping::new(self.deadzone, self.maximize_threshold)
    }

    /// Built-in mappings with this config's overrides applied on top
    pub fn mapping_table(&self) -> Result<MappingTable, MappingError> {
        let mut table = MappingTable::builtin();
        for entry in &self.mappings {
            debug!(
                "Overriding {} mapping for host {}",
                entry.controller,
                entry.host.map_or("any".to_string(), |host| host.to_string())
            );
            table.insert(entry.to_mapping()?)?;
        }
        Ok(table)
    }
}

/// Checks `0 <= deadzone < maximize_threshold <= 1`.
pub fn validate_shaping(deadzone: f32, maximize_threshold: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&deadzone) || !(0.0..=1.0).contains(&maximize_threshold) {
        return Err(ConfigError::Invalid(format!(
            "deadzone ({}) and maximize_threshold ({}) must lie in [0, 1]",
            deadzone, maximize_threshold
        )));
    }
    if deadzone >= maximize_threshold {
        return Err(ConfigError::Invalid(format!(
            "deadzone ({}) must be below maximize_threshold ({})",
            deadzone, maximize_threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::tables::names;

    #[test]
    fn empty_file_yields_defaults() -> Result<(), ConfigError> {
        let config = EngineConfig::parse("")?;
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.shaping(), Shaping::default());
        assert_eq!(config.tick_interval_ms, 16);
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<(), ConfigError> {
        let config = EngineConfig::parse("deadzone = 0.1")?;
        assert_eq!(config.deadzone, 0.1);
        assert_eq!(config.maximize_threshold, DEFAULT_MAXIMIZE_THRESHOLD);
        Ok(())
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let result = EngineConfig::parse("deadzone = 0.9\nmaximize_threshold = 0.5");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = EngineConfig::parse("maximize_threshold = 1.5");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_interval() {
        let result = EngineConfig::parse("tick_interval_ms = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = EngineConfig::parse("deadzone = [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = EngineConfig::parse("deadzone = \"low\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_duplicate_override_names() {
        let content = r#"
            [[mappings]]
            controller = "xbox"
            buttons = [{ name = "A", index = 0 }, { name = "A", index = 1 }]
        "#;
        assert!(matches!(
            EngineConfig::parse(content),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_controller_names() {
        let content = r#"
            [[mappings]]
            controller = "gamecube"
        "#;
        assert!(matches!(
            EngineConfig::parse(content),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn override_replaces_builtin_entry() -> Result<(), Box<dyn std::error::Error>> {
        let content = r#"
            [[mappings]]
            controller = "logitech"
            host = "macos"
            buttons = [{ name = "A", index = 1 }]
            axes = [{ name = "LEFT_STICK_X", index = 0 }]
        "#;
        let config = EngineConfig::parse(content)?;
        let table = config.mapping_table()?;

        let mapping = table
            .lookup(ControllerType::Logitech, Host::MacOs)
            .ok_or("override not registered")?;
        assert_eq!(mapping.len(), 2);
        assert!(mapping.control(names::A).is_some());

        // Other hosts keep the built-in layout
        let linux = table
            .lookup(ControllerType::Logitech, Host::Linux)
            .ok_or("builtin missing")?;
        assert!(linux.len() > 2);
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<(), ConfigError> {
        let path = std::env::temp_dir().join("unipad-test-missing").join(CONFIG_FILE);
        let config = EngineConfig::load(&path)?;
        assert_eq!(config, EngineConfig::default());
        Ok(())
    }

    #[test]
    fn loads_file_from_disk() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join(format!("unipad-test-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "tick_interval_ms = 4\n")?;

        let config = EngineConfig::load(&path)?;
        fs::remove_dir_all(&dir)?;

        assert_eq!(config.tick_interval_ms, 4);
        Ok(())
    }

    #[test]
    fn default_path_ends_in_app_dir() {
        let path = EngineConfig::default_path();
        assert!(path.ends_with("unipad/config.toml"));
    }
}
