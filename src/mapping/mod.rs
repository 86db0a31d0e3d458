//! Mapping from raw button/axis indices to named logical controls.
//!
//! A [`Mapping`] belongs to one controller family on one host layout. Each
//! control is either a plain index into the raw button/axis arrays or a
//! derivation function that computes the value from the whole raw snapshot
//! (for example splitting a combined trigger axis into two triggers).
//!
//! Mappings are immutable once built and shared through `Arc`; the
//! [`MappingTable`] is the lookup structure sources consult on connect.

pub mod error;
pub mod tables;

pub use error::MappingError;

use crate::controller::{ControllerType, RawDevice, Shaping};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// Computes a control value from the raw snapshot.
///
/// Returns `None` when the snapshot lacks the raw inputs the function reads.
/// Derivation functions do their own shaping; the engine uses the result as is.
pub type DeriveFn = fn(&RawDevice, &Shaping) -> Option<f32>;

/// Raw layout family a source reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    /// Canonical order (17 buttons, 4 axes) as produced by the gilrs source
    Standard,
    Linux,
    Windows,
    MacOs,
}

impl Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Standard => write!(f, "Standard"),
            Host::Linux => write!(f, "Linux"),
            Host::Windows => write!(f, "Windows"),
            Host::MacOs => write!(f, "macOS"),
        }
    }
}

/// Where a control's value comes from
#[derive(Clone, Copy)]
pub enum ControlSource {
    Index(usize),
    Derived(DeriveFn),
}

impl Debug for ControlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlSource::Index(index) => f.debug_tuple("Index").field(index).finish(),
            ControlSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlGroup {
    Button,
    Axis,
}

/// One named logical control of a mapping
#[derive(Debug, Clone)]
pub struct Control {
    name: String,
    source: ControlSource,
    group: ControlGroup,
}

impl Control {
    fn new(name: impl Into<String>, source: ControlSource, group: ControlGroup) -> Self {
        Self {
            name: name.into(),
            source,
            group,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> ControlSource {
        self.source
    }

    pub fn group(&self) -> ControlGroup {
        self.group
    }

    pub fn is_button(&self) -> bool {
        self.group == ControlGroup::Button
    }

    /// Resolves the current value of this control from a raw snapshot.
    ///
    /// Index axes are shaped with `shaping`; index buttons are taken as is and
    /// derived controls are trusted to shape themselves.
    pub fn resolve(&self, raw: &RawDevice, shaping: &Shaping) -> Option<f32> {
        match (self.source, self.group) {
            (ControlSource::Derived(derive), _) => derive(raw, shaping),
            (ControlSource::Index(index), ControlGroup::Button) => raw.button(index),
            (ControlSource::Index(index), ControlGroup::Axis) => {
                raw.axis(index).map(|value| shaping.shape(value))
            }
        }
    }
}

/// Named controls for one controller family on one host layout
#[derive(Debug, Clone)]
pub struct Mapping {
    kind: ControllerType,
    // None means the mapping applies to every host
    host: Option<Host>,
    buttons: Vec<Control>,
    axes: Vec<Control>,
}

impl Mapping {
    /// Builds a mapping, rejecting duplicate control names across both groups.
    pub fn new(
        kind: ControllerType,
        host: Option<Host>,
        buttons: Vec<(String, ControlSource)>,
        axes: Vec<(String, ControlSource)>,
    ) -> Result<Self, MappingError> {
        if !kind.is_supported() {
            return Err(MappingError::UnsupportedType);
        }

        let mapping = Self {
            kind,
            host,
            buttons: buttons
                .into_iter()
                .map(|(name, source)| Control::new(name, source, ControlGroup::Button))
                .collect(),
            axes: axes
                .into_iter()
                .map(|(name, source)| Control::new(name, source, ControlGroup::Axis))
                .collect(),
        };

        match mapping.first_duplicate() {
            Some(name) => Err(MappingError::DuplicateControl {
                kind,
                name: name.to_string(),
            }),
            None => Ok(mapping),
        }
    }

    // Built-in tables are checked by tests rather than at runtime
    pub(crate) fn from_static(
        kind: ControllerType,
        host: Option<Host>,
        buttons: &[(&str, ControlSource)],
        axes: &[(&str, ControlSource)],
    ) -> Self {
        Self {
            kind,
            host,
            buttons: buttons
                .iter()
                .map(|(name, source)| Control::new(*name, *source, ControlGroup::Button))
                .collect(),
            axes: axes
                .iter()
                .map(|(name, source)| Control::new(*name, *source, ControlGroup::Axis))
                .collect(),
        }
    }

    pub fn kind(&self) -> ControllerType {
        self.kind
    }

    pub fn host(&self) -> Option<Host> {
        self.host
    }

    pub fn buttons(&self) -> &[Control] {
        &self.buttons
    }

    pub fn axes(&self) -> &[Control] {
        &self.axes
    }

    /// All controls, buttons first, in declaration order
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.buttons.iter().chain(self.axes.iter())
    }

    pub fn len(&self) -> usize {
        self.buttons.len() + self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `name` in [`Mapping::controls`] order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.controls().position(|control| control.name == name)
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls().find(|control| control.name == name)
    }

    fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.controls()
            .map(|control| control.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

/// Lookup of mappings by controller family and host layout.
///
/// Host-specific entries win over host-independent ones.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    by_host: HashMap<(ControllerType, Host), Arc<Mapping>>,
    any_host: HashMap<ControllerType, Arc<Mapping>>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mapping`, replacing any entry for the same key.
    pub fn insert(&mut self, mapping: Mapping) -> Result<(), MappingError> {
        if !mapping.kind.is_supported() {
            return Err(MappingError::UnsupportedType);
        }
        self.put(mapping);
        Ok(())
    }

    // Callers guarantee a supported kind
    pub(crate) fn put(&mut self, mapping: Mapping) {
        let kind = mapping.kind;
        match mapping.host {
            Some(host) => {
                self.by_host.insert((kind, host), Arc::new(mapping));
            }
            None => {
                self.any_host.insert(kind, Arc::new(mapping));
            }
        }
    }

    pub fn lookup(&self, kind: ControllerType, host: Host) -> Option<Arc<Mapping>> {
        if !kind.is_supported() {
            return None;
        }

        self.by_host
            .get(&(kind, host))
            .or_else(|| self.any_host.get(&kind))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.by_host.len() + self.any_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Arc<Mapping>> {
        self.by_host.values().chain(self.any_host.values())
    }
}
