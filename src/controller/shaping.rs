//! Deadzone and maximize shaping for analog values

use serde::{Deserialize, Serialize};

/// Default deadzone: magnitudes below this snap to zero.
pub const DEFAULT_DEADZONE: f32 = 0.03;

/// Default maximize threshold: magnitudes above this snap to full deflection.
pub const DEFAULT_MAXIMIZE_THRESHOLD: f32 = 0.97;

/// Shaping settings applied to analog axis values.
///
/// Worn sticks rarely rest at exactly zero and rarely reach exactly one, so
/// values close to either end are snapped. Values in between pass through
/// unchanged (no rescaling).
///
/// # Examples
///
/// ```rust
/// use unipad::Shaping;
///
/// let shaping = Shaping::default();
/// assert_eq!(shaping.shape(0.02), 0.0);
/// assert_eq!(shaping.shape(-0.99), -1.0);
/// assert_eq!(shaping.shape(0.5), 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shaping {
    pub deadzone: f32,
    pub maximize_threshold: f32,
}

impl Default for Shaping {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
            maximize_threshold: DEFAULT_MAXIMIZE_THRESHOLD,
        }
    }
}

impl Shaping {
    pub fn new(deadzone: f32, maximize_threshold: f32) -> Self {
        Self {
            deadzone,
            maximize_threshold,
        }
    }

    /// Shapes `value` with these settings.
    pub fn shape(&self, value: f32) -> f32 {
        shape(value, self.deadzone, self.maximize_threshold)
    }
}

/// Snaps `value` to 0 inside the deadzone and to ±1 beyond the maximize threshold.
///
/// Symmetric in sign. NaN reads as centered (0).
pub fn shape(value: f32, deadzone: f32, maximize_threshold: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else if value >= 0.0 {
        if value < deadzone {
            0.0
        } else if value > maximize_threshold {
            1.0
        } else {
            value
        }
    } else if value > -deadzone {
        0.0
    } else if value < -maximize_threshold {
        -1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_inside_deadzone_snap_to_zero() {
        for deadzone in [0.01, 0.03, 0.1, 0.25] {
            for value in [0.0, 0.005, -0.005, deadzone * 0.99, -deadzone * 0.99] {
                assert_eq!(shape(value, deadzone, 0.97), 0.0, "v={value} d={deadzone}");
            }
        }
    }

    #[test]
    fn values_beyond_threshold_are_maximized() {
        for threshold in [0.8, 0.9, 0.97] {
            assert_eq!(shape(threshold + 0.01, 0.03, threshold), 1.0);
            assert_eq!(shape(-(threshold + 0.01), 0.03, threshold), -1.0);
        }
    }

    #[test]
    fn fixed_points_are_stable() {
        let shaping = Shaping::default();
        assert_eq!(shaping.shape(0.0), 0.0);
        assert_eq!(shaping.shape(1.0), 1.0);
        assert_eq!(shaping.shape(-1.0), -1.0);
    }

    #[test]
    fn boundaries_are_left_unchanged() {
        // Exactly at the deadzone or threshold is not "below"/"above"
        assert_eq!(shape(0.03, 0.03, 0.97), 0.03);
        assert_eq!(shape(-0.03, 0.03, 0.97), -0.03);
        assert_eq!(shape(0.97, 0.03, 0.97), 0.97);
        assert_eq!(shape(-0.97, 0.03, 0.97), -0.97);
    }

    #[test]
    fn midrange_passes_through() {
        assert_eq!(shape(0.42, 0.03, 0.97), 0.42);
        assert_eq!(shape(-0.42, 0.03, 0.97), -0.42);
    }

    #[test]
    fn nan_reads_as_centered() {
        assert_eq!(shape(f32::NAN, 0.03, 0.97), 0.0);
        assert_eq!(Shaping::default().shape(-f32::NAN), 0.0);
    }
}
