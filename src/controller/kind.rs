use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

// Controller family, resolved once from the device name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerType {
    Playstation,
    Logitech,
    Xbox,
    Unsupported,
}

impl ControllerType {
    /// Classifies a device by case-insensitive substring match on its name.
    ///
    /// Rules are tested in order and the first match wins:
    /// `playstation`, then `logitech` / `wireless gamepad`, then `xbox` / `360`.
    /// Anything else is [`ControllerType::Unsupported`].
    pub fn resolve(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("playstation") {
            ControllerType::Playstation
        } else if name.contains("logitech") || name.contains("wireless gamepad") {
            ControllerType::Logitech
        } else if name.contains("xbox") || name.contains("360") {
            ControllerType::Xbox
        } else {
            ControllerType::Unsupported
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != ControllerType::Unsupported
    }
}

impl Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerType::Playstation => write!(f, "Playstation"),
            ControllerType::Logitech => write!(f, "Logitech"),
            ControllerType::Xbox => write!(f, "Xbox"),
            ControllerType::Unsupported => write!(f, "Unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerType;

    #[test]
    fn resolves_known_names() {
        assert_eq!(
            ControllerType::resolve("Sony PlayStation(R)3 Controller"),
            ControllerType::Playstation
        );
        assert_eq!(
            ControllerType::resolve("Logitech Dual Action"),
            ControllerType::Logitech
        );
        assert_eq!(
            ControllerType::resolve("Xbox 360 Controller"),
            ControllerType::Xbox
        );
        assert_eq!(
            ControllerType::resolve("Generic USB Joystick"),
            ControllerType::Unsupported
        );
    }

    #[test]
    fn wireless_gamepad_is_logitech() {
        assert_eq!(
            ControllerType::resolve("Wireless Gamepad F710 (STANDARD GAMEPAD)"),
            ControllerType::Logitech
        );
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // Matches both the logitech and the 360 rule
        assert_eq!(
            ControllerType::resolve("Logitech Chillstream 360"),
            ControllerType::Logitech
        );
        assert_eq!(
            ControllerType::resolve("PLAYSTATION xbox adapter"),
            ControllerType::Playstation
        );
    }
}
