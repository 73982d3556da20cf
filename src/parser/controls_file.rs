//! `.sccontrols` profile files.
//!
//! A profile stores option settings per device class, keyed by option short
//! name:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "profile_name": "HOTAS",
//!   "last_modified": "2024-05-01T12:00:00Z",
//!   "devices": {
//!     "keyboard": { "options": { "fps_view_pitch": { "invert": true } } },
//!     "joystick": { "1": { "product": "VKB Gladiator", "options": {} } }
//!   }
//! }
//! ```
//!
//! Saving keeps only `invert`; loading also accepts `curve_mode`, `exponent`
//! and `curve` so older or hand-edited files still import.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::CONTROLS_FILE_VERSION;
use crate::models::{CurveMode, DeviceClass, DeviceSelection, IDENTITY_EXPONENT};
use crate::services::flat_format::{FlatCurve, FlatEntry, FlatGroup};

/// Settings for one option.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlOptionSettings {
    /// Axis inversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    /// Active response representation; unrecognized modes load as unset
    #[serde(
        default,
        alias = "curveMode",
        deserialize_with = "lenient_curve_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub curve_mode: Option<CurveMode>,
    /// Response exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    /// Response curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<FlatCurve>,
}

impl ControlOptionSettings {
    /// Converts to a flat entry, honoring `curve_mode` when both
    /// representations are present.
    #[must_use]
    pub fn to_flat_entry(&self, name: &str) -> FlatEntry {
        let curve = self.curve.clone().filter(|c| !c.points.is_empty());
        let use_curve = curve.is_some() && self.curve_mode != Some(CurveMode::Exponent);

        FlatEntry {
            name: name.to_string(),
            invert: self.invert,
            exponent: if use_curve {
                Some(IDENTITY_EXPONENT)
            } else {
                self.exponent
            },
            curve: if use_curve { curve } else { None },
        }
    }
}

/// Settings for one device instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceInstanceSettings {
    /// Product name reported by the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Option settings by short name
    #[serde(default)]
    pub options: BTreeMap<String, ControlOptionSettings>,
}

/// Gamepad settings: one entry, or a map by instance number.
///
/// An object with an `options` key (or a string `product`) is a single
/// entry; anything else is read as an instance map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GamepadSettings {
    /// Single gamepad (instance 1)
    Single(DeviceInstanceSettings),
    /// Settings by instance number
    Instances(BTreeMap<String, DeviceInstanceSettings>),
}

/// Settings for every device class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Keyboard and mouse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<DeviceInstanceSettings>,
    /// Gamepads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamepad: Option<GamepadSettings>,
    /// Joysticks by instance number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joystick: Option<BTreeMap<String, DeviceInstanceSettings>>,
}

/// A saved profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsFile {
    /// Format version
    pub version: String,
    /// Profile name
    pub profile_name: String,
    /// Last save time; unparseable stamps load as unset
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    /// Device settings
    #[serde(default)]
    pub devices: DeviceSettings,
}

impl ControlsFile {
    /// Creates an empty profile stamped with the current time.
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            version: CONTROLS_FILE_VERSION.to_string(),
            profile_name: profile_name.into(),
            last_modified: Some(Utc::now()),
            devices: DeviceSettings::default(),
        }
    }

    /// Parses a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse controls file")
    }

    /// Serializes the profile as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize controls file")
    }

    /// Updates the modification time.
    pub fn touch(&mut self) {
        self.last_modified = Some(Utc::now());
    }

    /// Builds a profile from flat groups, keeping only `invert`.
    ///
    /// Exponents and curves do not survive this conversion. Options and
    /// instances left with nothing to save are omitted.
    pub fn from_flat_groups(profile_name: impl Into<String>, groups: &[FlatGroup]) -> Self {
        let mut file = Self::new(profile_name);
        for group in groups {
            let options: BTreeMap<String, ControlOptionSettings> = group
                .options
                .iter()
                .filter_map(|entry| {
                    entry.invert.map(|invert| {
                        (
                            entry.name.clone(),
                            ControlOptionSettings {
                                invert: Some(invert),
                                ..Default::default()
                            },
                        )
                    })
                })
                .collect();
            if options.is_empty() {
                continue;
            }
            file.insert(
                DeviceSelection::new(group.device_class, group.instance),
                DeviceInstanceSettings {
                    product: None,
                    options,
                },
            );
        }
        file
    }

    /// Stores settings for one device instance, replacing any existing entry.
    pub fn insert(&mut self, selection: DeviceSelection, settings: DeviceInstanceSettings) {
        let key = selection.instance.to_string();
        match selection.class {
            DeviceClass::Keyboard => self.devices.keyboard = Some(settings),
            DeviceClass::Gamepad => {
                self.devices.gamepad = Some(match self.devices.gamepad.take() {
                    None if selection.instance == 1 => GamepadSettings::Single(settings),
                    None => GamepadSettings::Instances(BTreeMap::from([(key, settings)])),
                    Some(GamepadSettings::Single(existing)) if selection.instance != 1 => {
                        GamepadSettings::Instances(BTreeMap::from([
                            ("1".to_string(), existing),
                            (key, settings),
                        ]))
                    }
                    Some(GamepadSettings::Single(_)) => GamepadSettings::Single(settings),
                    Some(GamepadSettings::Instances(mut map)) => {
                        map.insert(key, settings);
                        GamepadSettings::Instances(map)
                    }
                });
            }
            DeviceClass::Joystick => {
                self.devices
                    .joystick
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key, settings);
            }
        }
    }

    /// Every stored device instance. Instance keys that are not positive
    /// numbers are skipped.
    #[must_use]
    pub fn instances(&self) -> Vec<(DeviceSelection, &DeviceInstanceSettings)> {
        let mut out = Vec::new();
        if let Some(keyboard) = &self.devices.keyboard {
            out.push((DeviceSelection::keyboard(), keyboard));
        }
        match &self.devices.gamepad {
            Some(GamepadSettings::Single(settings)) => {
                out.push((DeviceSelection::new(DeviceClass::Gamepad, 1), settings));
            }
            Some(GamepadSettings::Instances(map)) => {
                out.extend(numbered(DeviceClass::Gamepad, map));
            }
            None => {}
        }
        if let Some(map) = &self.devices.joystick {
            out.extend(numbered(DeviceClass::Joystick, map));
        }
        out
    }

    /// Converts every stored option to flat groups, including any exponent
    /// and curve data present in the file.
    #[must_use]
    pub fn to_flat_groups(&self) -> Vec<FlatGroup> {
        self.instances()
            .into_iter()
            .map(|(selection, settings)| FlatGroup {
                device_class: selection.class,
                instance: selection.instance,
                options: settings
                    .options
                    .iter()
                    .map(|(name, option)| option.to_flat_entry(name))
                    .filter(|entry| !entry.is_empty())
                    .collect(),
            })
            .filter(|group| !group.options.is_empty())
            .collect()
    }
}

impl<'de> Deserialize<'de> for GamepadSettings {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let single = value.get("options").is_some()
            || value.get("product").is_some_and(serde_json::Value::is_string);
        if single {
            serde_json::from_value(value)
                .map(Self::Single)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Instances)
                .map_err(de::Error::custom)
        }
    }
}

fn lenient_curve_mode<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<CurveMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|mode| match mode.parse::<CurveMode>() {
        Ok(mode) => Some(mode),
        Err(_) => {
            warn!(curve_mode = %mode, "ignoring unknown curve mode");
            None
        }
    }))
}

/// Accepts RFC 3339 and plain `YYYY-MM-DD[ HH:MM:SS]` stamps (read as UTC).
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|stamp| {
        let parsed = parse_timestamp(stamp.trim());
        if parsed.is_none() {
            warn!(last_modified = %stamp, "ignoring unparseable timestamp");
        }
        parsed
    }))
}

fn parse_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(stamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn numbered(
    class: DeviceClass,
    map: &BTreeMap<String, DeviceInstanceSettings>,
) -> impl Iterator<Item = (DeviceSelection, &DeviceInstanceSettings)> {
    map.iter().filter_map(move |(key, settings)| {
        let instance = key.trim().parse::<u32>().ok().filter(|i| *i > 0)?;
        Some((DeviceSelection::new(class, instance), settings))
    })
}
