/// Raw snapshot of one device as the host reports it.
///
/// Button values are in `0.0..=1.0` (digital buttons report 0 or 1), axis
/// values in `-1.0..=1.0`. Index meaning depends on the host layout and the
/// controller model; the mapping table gives it names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDevice {
    /// Stable identity for the lifetime of the connection
    pub slot: usize,
    pub name: String,
    pub buttons: Vec<f32>,
    pub axes: Vec<f32>,
}

impl RawDevice {
    pub fn new(slot: usize, name: impl Into<String>, buttons: Vec<f32>, axes: Vec<f32>) -> Self {
        Self {
            slot,
            name: name.into(),
            buttons,
            axes,
        }
    }

    pub fn button(&self, index: usize) -> Option<f32> {
        self.buttons.get(index).copied()
    }

    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }
}
