//! Device classes and the (class, instance) selection used to address settings.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of input hardware with its own option hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Keyboard and mouse (single instance)
    Keyboard,
    /// Gamepads (numbered instances)
    Gamepad,
    /// Joysticks, throttles and pedals (numbered instances)
    Joystick,
}

impl DeviceClass {
    /// All device classes in display order.
    pub const ALL: [DeviceClass; 3] = [Self::Keyboard, Self::Gamepad, Self::Joystick];

    /// Identifier used by the game files (`type="joystick"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Gamepad => "gamepad",
            Self::Joystick => "joystick",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Keyboard => "Keyboard / Mouse",
            Self::Gamepad => "Gamepad",
            Self::Joystick => "Joystick",
        }
    }

    /// Whether settings are kept per numbered instance.
    #[must_use]
    pub const fn is_multi_instance(self) -> bool {
        matches!(self, Self::Gamepad | Self::Joystick)
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" | "mouse" | "kb" => Ok(Self::Keyboard),
            "gamepad" | "xboxpad" | "pad" => Ok(Self::Gamepad),
            "joystick" | "js" => Ok(Self::Joystick),
            other => anyhow::bail!(
                "Unknown device class '{}'. Expected keyboard, gamepad or joystick",
                other
            ),
        }
    }
}

/// The device class and instance an operation applies to.
///
/// Keyboard has a single bucket, so its instance is always normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceSelection {
    /// Device class
    pub class: DeviceClass,
    /// Instance number (1-based)
    pub instance: u32,
}

impl DeviceSelection {
    /// Creates a selection, clamping the instance to at least 1 and ignoring it for keyboard.
    #[must_use]
    pub fn new(class: DeviceClass, instance: u32) -> Self {
        let instance = if class.is_multi_instance() {
            instance.max(1)
        } else {
            1
        };
        Self { class, instance }
    }

    /// Selection for the keyboard bucket.
    #[must_use]
    pub fn keyboard() -> Self {
        Self::new(DeviceClass::Keyboard, 1)
    }
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self::keyboard()
    }
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_multi_instance() {
            write!(f, "{} #{}", self.class, self.instance)
        } else {
            write!(f, "{}", self.class)
        }
    }
}
