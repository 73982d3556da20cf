//! Application-wide constants.
//!
//! Names used by the game's option trees and the fixed display labels of the
//! generated sections live here so the parser, display transformer and
//! tests agree on them.

use crate::models::DeviceClass;

/// The display name of the application.
pub const APP_NAME: &str = "JoyMapper";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "joymapper";

/// Name of the wrapper option group at the top of every option tree.
pub const WRAPPER_NODE: &str = "master";

/// Name of the option group holding inversion settings.
pub const INVERSION_NODE: &str = "inversion";

/// Path segment that replaces [`INVERSION_NODE`] in the curves section.
pub const CURVES_SEGMENT: &str = "sensitivity_curves";

/// Label of the inversion section.
pub const INVERSION_LABEL: &str = "Inversion Settings";

/// Why every node of the curves section is disabled.
pub const CURVES_DISABLED_REASON: &str =
    "Sensitivity curves do not persist in the game's actionmaps.xml and are reset on restart";

/// Curve-family container relevant to a device class.
#[must_use]
pub const fn curve_family(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::Keyboard => "mouse_curves",
        DeviceClass::Gamepad => "thumbstick_curves",
        DeviceClass::Joystick => "joystick_curves",
    }
}

/// Device-appropriate label of the curves section.
#[must_use]
pub const fn curves_label(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::Keyboard => "Mouse Sensitivity Curves",
        DeviceClass::Gamepad => "Thumbstick Sensitivity Curves",
        DeviceClass::Joystick => "Joystick Sensitivity Curves",
    }
}

/// Version written to `.sccontrols` profile files.
pub const CONTROLS_FILE_VERSION: &str = "1.0";

/// Extension of profile files.
pub const CONTROLS_FILE_EXTENSION: &str = "sccontrols";

/// Default debounce window for the external sync, in milliseconds.
pub const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 500;
