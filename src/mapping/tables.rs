//! Built-in mapping data per controller family and host layout.
//!
//! Plain data plus a handful of derivation functions for controls the host
//! does not report as a single button (d-pads on hat/axis pairs, triggers on
//! one combined axis). macOS layouts for Playstation and Logitech pads are not
//! recorded, so those devices report as unsupported there.

use super::{ControlSource, Host, Mapping, MappingTable};
use crate::controller::{ControllerType, RawDevice, Shaping};

use super::ControlSource::{Derived, Index};

pub mod names {
    pub const A: &str = "A";
    pub const B: &str = "B";
    pub const X: &str = "X";
    pub const Y: &str = "Y";
    pub const LEFT_SHOULDER: &str = "LEFT_SHOULDER";
    pub const RIGHT_SHOULDER: &str = "RIGHT_SHOULDER";
    pub const LEFT_TRIGGER: &str = "LEFT_TRIGGER";
    pub const RIGHT_TRIGGER: &str = "RIGHT_TRIGGER";
    pub const SELECT: &str = "SELECT";
    pub const START: &str = "START";
    pub const LEFT_STICK: &str = "LEFT_STICK";
    pub const RIGHT_STICK: &str = "RIGHT_STICK";
    pub const DPAD_UP: &str = "DPAD_UP";
    pub const DPAD_DOWN: &str = "DPAD_DOWN";
    pub const DPAD_LEFT: &str = "DPAD_LEFT";
    pub const DPAD_RIGHT: &str = "DPAD_RIGHT";
    pub const HOME: &str = "HOME";
    pub const LEFT_STICK_X: &str = "LEFT_STICK_X";
    pub const LEFT_STICK_Y: &str = "LEFT_STICK_Y";
    pub const RIGHT_STICK_X: &str = "RIGHT_STICK_X";
    pub const RIGHT_STICK_Y: &str = "RIGHT_STICK_Y";
}

use self::names::*;

// Canonical order, also what the gilrs source produces
const STANDARD_BUTTONS: &[(&str, ControlSource)] = &[
    (A, Index(0)),
    (B, Index(1)),
    (X, Index(2)),
    (Y, Index(3)),
    (LEFT_SHOULDER, Index(4)),
    (RIGHT_SHOULDER, Index(5)),
    (LEFT_TRIGGER, Index(6)),
    (RIGHT_TRIGGER, Index(7)),
    (SELECT, Index(8)),
    (START, Index(9)),
    (LEFT_STICK, Index(10)),
    (RIGHT_STICK, Index(11)),
    (DPAD_UP, Index(12)),
    (DPAD_DOWN, Index(13)),
    (DPAD_LEFT, Index(14)),
    (DPAD_RIGHT, Index(15)),
    (HOME, Index(16)),
];

const STANDARD_AXES: &[(&str, ControlSource)] = &[
    (LEFT_STICK_X, Index(0)),
    (LEFT_STICK_Y, Index(1)),
    (RIGHT_STICK_X, Index(2)),
    (RIGHT_STICK_Y, Index(3)),
];

// DualShock 3 through the Linux joystick driver
const PLAYSTATION_LINUX_BUTTONS: &[(&str, ControlSource)] = &[
    (A, Index(14)),
    (B, Index(13)),
    (X, Index(15)),
    (Y, Index(12)),
    (LEFT_SHOULDER, Index(10)),
    (RIGHT_SHOULDER, Index(11)),
    (LEFT_TRIGGER, Index(8)),
    (RIGHT_TRIGGER, Index(9)),
    (SELECT, Index(0)),
    (START, Index(3)),
    (LEFT_STICK, Index(1)),
    (RIGHT_STICK, Index(2)),
    (DPAD_UP, Index(4)),
    (DPAD_DOWN, Index(6)),
    (DPAD_LEFT, Index(7)),
    (DPAD_RIGHT, Index(5)),
    (HOME, Index(16)),
];

// DualShock 4 through DirectInput, d-pad on the POV hat
const PLAYSTATION_WINDOWS_BUTTONS: &[(&str, ControlSource)] = &[
    (A, Index(1)),
    (B, Index(2)),
    (X, Index(0)),
    (Y, Index(3)),
    (LEFT_SHOULDER, Index(4)),
    (RIGHT_SHOULDER, Index(5)),
    (LEFT_TRIGGER, Index(6)),
    (RIGHT_TRIGGER, Index(7)),
    (SELECT, Index(8)),
    (START, Index(9)),
    (LEFT_STICK, Index(10)),
    (RIGHT_STICK, Index(11)),
    (DPAD_UP, Derived(hat_up)),
    (DPAD_DOWN, Derived(hat_down)),
    (DPAD_LEFT, Derived(hat_left)),
    (DPAD_RIGHT, Derived(hat_right)),
    (HOME, Index(12)),
];

const PLAYSTATION_WINDOWS_AXES: &[(&str, ControlSource)] = &[
    (LEFT_STICK_X, Index(0)),
    (LEFT_STICK_Y, Index(1)),
    (RIGHT_STICK_X, Index(2)),
    (RIGHT_STICK_Y, Index(5)),
];

// Dual Action through the Linux joystick driver, d-pad on axes 4/5
const LOGITECH_LINUX_BUTTONS: &[(&str, ControlSource)] = &[
    (A, Index(1)),
    (B, Index(2)),
    (X, Index(0)),
    (Y, Index(3)),
    (LEFT_SHOULDER, Index(4)),
    (RIGHT_SHOULDER, Index(5)),
    (LEFT_TRIGGER, Index(6)),
    (RIGHT_TRIGGER, Index(7)),
    (SELECT, Index(8)),
    (START, Index(9)),
    (LEFT_STICK, Index(10)),
    (RIGHT_STICK, Index(11)),
    (DPAD_UP, Derived(linux_dpad_up)),
    (DPAD_DOWN, Derived(linux_dpad_down)),
    (DPAD_LEFT, Derived(linux_dpad_left)),
    (DPAD_RIGHT, Derived(linux_dpad_right)),
];

// F310/F710 in XInput mode through winmm: both triggers share axis 2
const LOGITECH_WINDOWS_BUTTONS: &[(&str, ControlSource)] = &[
    (A, Index(0)),
    (B, Index(1)),
    (X, Index(2)),
    (Y, Index(3)),
    (LEFT_SHOULDER, Index(4)),
    (RIGHT_SHOULDER, Index(5)),
    (LEFT_TRIGGER, Derived(combined_left_trigger)),
    (RIGHT_TRIGGER, Derived(combined_right_trigger)),
    (SELECT, Index(6)),
    (START, Index(7)),
    (LEFT_STICK, Index(8)),
    (RIGHT_STICK, Index(9)),
    (DPAD_UP, Derived(windows_dpad_up)),
    (DPAD_DOWN, Derived(windows_dpad_down)),
    (DPAD_LEFT, Derived(windows_dpad_left)),
    (DPAD_RIGHT, Derived(windows_dpad_right)),
];

const LOGITECH_WINDOWS_AXES: &[(&str, ControlSource)] = &[
    (LEFT_STICK_X, Index(0)),
    (LEFT_STICK_Y, Index(1)),
    (RIGHT_STICK_X, Index(3)),
    (RIGHT_STICK_Y, Index(4)),
];

const POV_HAT_AXIS: usize = 9;
const COMBINED_TRIGGER_AXIS: usize = 2;

// Hat directions clockwise from up: up, up-right, right, ..., up-left
const HAT_UP: [u8; 3] = [7, 0, 1];
const HAT_RIGHT: [u8; 3] = [1, 2, 3];
const HAT_DOWN: [u8; 3] = [3, 4, 5];
const HAT_LEFT: [u8; 3] = [5, 6, 7];

impl MappingTable {
    /// The mapping data shipped with the crate.
    pub fn builtin() -> Self {
        let mut table = Self::new();

        let entries = [
            Mapping::from_static(ControllerType::Xbox, None, STANDARD_BUTTONS, STANDARD_AXES),
            Mapping::from_static(
                ControllerType::Playstation,
                Some(Host::Standard),
                STANDARD_BUTTONS,
                STANDARD_AXES,
            ),
            Mapping::from_static(
                ControllerType::Playstation,
                Some(Host::Linux),
                PLAYSTATION_LINUX_BUTTONS,
                STANDARD_AXES,
            ),
            Mapping::from_static(
                ControllerType::Playstation,
                Some(Host::Windows),
                PLAYSTATION_WINDOWS_BUTTONS,
                PLAYSTATION_WINDOWS_AXES,
            ),
            Mapping::from_static(
                ControllerType::Logitech,
                Some(Host::Standard),
                STANDARD_BUTTONS,
                STANDARD_AXES,
            ),
            Mapping::from_static(
                ControllerType::Logitech,
                Some(Host::Linux),
                LOGITECH_LINUX_BUTTONS,
                STANDARD_AXES,
            ),
            Mapping::from_static(
                ControllerType::Logitech,
                Some(Host::Windows),
                LOGITECH_WINDOWS_BUTTONS,
                LOGITECH_WINDOWS_AXES,
            ),
        ];

        for mapping in entries {
            table.put(mapping);
        }
        table
    }
}

/// Decodes a POV hat axis into one of eight directions, `None` when centered.
///
/// Directions sit at `-1 + k * 2/7` for `k = 0..=7`; the centered position
/// reports a value beyond `1.0`.
fn hat_direction(value: f32) -> Option<u8> {
    if !(-1.05..=1.05).contains(&value) {
        return None;
    }
    let step = ((value + 1.0) * 3.5).round();
    if (0.0..=7.0).contains(&step) {
        Some(step as u8)
    } else {
        None
    }
}

fn hat_pressed(raw: &RawDevice, directions: [u8; 3]) -> Option<f32> {
    let value = raw.axis(POV_HAT_AXIS)?;
    let pressed = hat_direction(value).is_some_and(|direction| directions.contains(&direction));
    Some(if pressed { 1.0 } else { 0.0 })
}

fn hat_up(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    hat_pressed(raw, HAT_UP)
}

fn hat_down(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    hat_pressed(raw, HAT_DOWN)
}

fn hat_left(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    hat_pressed(raw, HAT_LEFT)
}

fn hat_right(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    hat_pressed(raw, HAT_RIGHT)
}

// Digital d-pad reported as an axis: -1/+1 when held, 0 otherwise
fn axis_pressed(raw: &RawDevice, axis: usize, direction: f32) -> Option<f32> {
    let value = raw.axis(axis)?;
    Some(if value * direction > 0.5 { 1.0 } else { 0.0 })
}

fn linux_dpad_up(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 5, -1.0)
}

fn linux_dpad_down(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 5, 1.0)
}

fn linux_dpad_left(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 4, -1.0)
}

fn linux_dpad_right(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 4, 1.0)
}

fn windows_dpad_up(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 6, -1.0)
}

fn windows_dpad_down(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 6, 1.0)
}

fn windows_dpad_left(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 5, -1.0)
}

fn windows_dpad_right(raw: &RawDevice, _: &Shaping) -> Option<f32> {
    axis_pressed(raw, 5, 1.0)
}

// Left trigger pulls the combined axis positive, right trigger negative
fn combined_left_trigger(raw: &RawDevice, shaping: &Shaping) -> Option<f32> {
    let value = raw.axis(COMBINED_TRIGGER_AXIS)?;
    Some(shaping.shape(value.max(0.0)))
}

fn combined_right_trigger(raw: &RawDevice, shaping: &Shaping) -> Option<f32> {
    let value = raw.axis(COMBINED_TRIGGER_AXIS)?;
    Some(shaping.shape((-value).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logitech_windows(axes: Vec<f32>) -> RawDevice {
        RawDevice::new(0, "Logitech Gamepad F310", vec![0.0; 10], axes)
    }

    #[test]
    fn builtin_mappings_have_unique_names() {
        let table = MappingTable::builtin();
        assert_eq!(table.len(), 7);

        for mapping in table.mappings() {
            let rebuilt = Mapping::new(
                mapping.kind(),
                mapping.host(),
                mapping
                    .buttons()
                    .iter()
                    .map(|c| (c.name().to_string(), c.source()))
                    .collect(),
                mapping
                    .axes()
                    .iter()
                    .map(|c| (c.name().to_string(), c.source()))
                    .collect(),
            );
            assert!(rebuilt.is_ok(), "{:?} on {:?}", mapping.kind(), mapping.host());
        }
    }

    #[test]
    fn builtin_entries_are_all_registrable() {
        let mut table = MappingTable::new();
        for mapping in MappingTable::builtin().mappings() {
            assert!(table.insert(Mapping::clone(mapping)).is_ok());
        }
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn xbox_is_host_independent() {
        let table = MappingTable::builtin();
        for host in [Host::Standard, Host::Linux, Host::Windows, Host::MacOs] {
            assert!(table.lookup(ControllerType::Xbox, host).is_some(), "{host}");
        }
    }

    #[test]
    fn macos_has_no_playstation_or_logitech_layout() {
        let table = MappingTable::builtin();
        assert!(table.lookup(ControllerType::Playstation, Host::MacOs).is_none());
        assert!(table.lookup(ControllerType::Logitech, Host::MacOs).is_none());
    }

    #[test]
    fn combined_axis_splits_into_two_triggers() {
        let shaping = Shaping::default();
        let mut axes = vec![0.0; 7];

        axes[COMBINED_TRIGGER_AXIS] = 0.6;
        let raw = logitech_windows(axes.clone());
        assert_eq!(combined_left_trigger(&raw, &shaping), Some(0.6));
        assert_eq!(combined_right_trigger(&raw, &shaping), Some(0.0));

        axes[COMBINED_TRIGGER_AXIS] = -0.99;
        let raw = logitech_windows(axes);
        assert_eq!(combined_left_trigger(&raw, &shaping), Some(0.0));
        assert_eq!(combined_right_trigger(&raw, &shaping), Some(1.0));
    }

    #[test]
    fn hat_decodes_diagonals_into_two_directions() {
        let mut axes = vec![0.0; 10];
        // up-right
        axes[POV_HAT_AXIS] = -1.0 + 2.0 / 7.0;
        let raw = RawDevice::new(0, "PLAYSTATION(R)4", vec![0.0; 13], axes);
        let shaping = Shaping::default();

        assert_eq!(hat_up(&raw, &shaping), Some(1.0));
        assert_eq!(hat_right(&raw, &shaping), Some(1.0));
        assert_eq!(hat_down(&raw, &shaping), Some(0.0));
        assert_eq!(hat_left(&raw, &shaping), Some(0.0));
    }

    #[test]
    fn centered_hat_presses_nothing() {
        assert_eq!(hat_direction(1.2857), None);
        assert_eq!(hat_direction(-1.0), Some(0));
        assert_eq!(hat_direction(1.0), Some(7));
    }

    #[test]
    fn derived_controls_report_missing_axes() {
        let raw = logitech_windows(vec![0.0; 2]);
        assert_eq!(combined_left_trigger(&raw, &Shaping::default()), None);
        assert_eq!(windows_dpad_up(&raw, &Shaping::default()), None);
    }
}
