//! Per-path settings records and the values they hold.

use crate::models::Curve;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exponent that leaves the response unchanged.
pub const IDENTITY_EXPONENT: f64 = 1.0;

/// Which representation governs a node's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveMode {
    /// A single power exponent
    Exponent,
    /// Interpolated control points
    Curve,
}

impl CurveMode {
    /// Identifier as stored in profile files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exponent => "exponent",
            Self::Curve => "curve",
        }
    }
}

impl fmt::Display for CurveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "exponent" => Ok(Self::Exponent),
            "curve" => Ok(Self::Curve),
            other => anyhow::bail!("Unknown curve mode '{}'", other),
        }
    }
}

/// Name of a setting stored in a [`SettingsRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    /// Axis inversion
    Invert,
    /// Exponent or curve
    CurveMode,
    /// Power exponent
    Exponent,
    /// Custom curve
    Curve,
}

impl SettingKind {
    /// Field name in the flat and profile formats.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::CurveMode => "curveMode",
            Self::Exponent => "exponent",
            Self::Curve => "curve",
        }
    }
}

impl FromStr for SettingKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "invert" => Ok(Self::Invert),
            "curveMode" | "curve_mode" => Ok(Self::CurveMode),
            "exponent" => Ok(Self::Exponent),
            "curve" => Ok(Self::Curve),
            other => anyhow::bail!("Unknown setting '{}'", other),
        }
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// Axis inversion
    Invert(bool),
    /// Active response representation
    CurveMode(CurveMode),
    /// Power exponent
    Exponent(f64),
    /// Custom curve
    Curve(Curve),
}

impl SettingValue {
    /// The setting this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> SettingKind {
        match self {
            Self::Invert(_) => SettingKind::Invert,
            Self::CurveMode(_) => SettingKind::CurveMode,
            Self::Exponent(_) => SettingKind::Exponent,
            Self::Curve(_) => SettingKind::Curve,
        }
    }

    /// Inner bool for `Invert`.
    #[must_use]
    pub const fn as_invert(&self) -> Option<bool> {
        match self {
            Self::Invert(v) => Some(*v),
            _ => None,
        }
    }
}

/// Explicit settings at one path.
///
/// A `None` field means "not set here", which is distinct from any value.
/// Exponent and curve may both be stored; `curve_mode` picks the active one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Axis inversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    /// Active response representation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_mode: Option<CurveMode>,
    /// Power exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    /// Custom curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
}

impl SettingsRecord {
    /// Returns true if nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invert.is_none()
            && self.curve_mode.is_none()
            && self.exponent.is_none()
            && self.curve.is_none()
    }

    /// Reads one setting.
    #[must_use]
    pub fn get(&self, kind: SettingKind) -> Option<SettingValue> {
        match kind {
            SettingKind::Invert => self.invert.map(SettingValue::Invert),
            SettingKind::CurveMode => self.curve_mode.map(SettingValue::CurveMode),
            SettingKind::Exponent => self.exponent.map(SettingValue::Exponent),
            SettingKind::Curve => self.curve.clone().map(SettingValue::Curve),
        }
    }

    /// Writes one setting. Other fields are left untouched, so switching
    /// `curve_mode` keeps the inactive representation's data.
    pub fn set(&mut self, value: SettingValue) {
        match value {
            SettingValue::Invert(v) => self.invert = Some(v),
            SettingValue::CurveMode(v) => self.curve_mode = Some(v),
            SettingValue::Exponent(v) => self.exponent = Some(v),
            SettingValue::Curve(v) => self.curve = Some(v),
        }
    }

    /// Clears one setting.
    pub fn clear(&mut self, kind: SettingKind) {
        match kind {
            SettingKind::Invert => self.invert = None,
            SettingKind::CurveMode => self.curve_mode = None,
            SettingKind::Exponent => self.exponent = None,
            SettingKind::Curve => self.curve = None,
        }
    }
}

/// Outcome of inheritance resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// Effective value
    pub value: T,
    /// True if the value came from an ancestor
    pub inherited: bool,
    /// Short name of the ancestor that supplied the value
    pub inherited_from: Option<String>,
}

impl<T> Resolved<T> {
    /// A value set directly at the queried path.
    pub const fn direct(value: T) -> Self {
        Self {
            value,
            inherited: false,
            inherited_from: None,
        }
    }

    /// The caller's default; nothing was found.
    pub const fn fallback(value: T) -> Self {
        Self::direct(value)
    }
}
