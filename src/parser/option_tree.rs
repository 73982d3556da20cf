//! Raw option-tree types as delivered by a loader.
//!
//! These mirror the game's `<optiontree>` / `<optiongroup>` structure without
//! interpreting it. Any source (the XML reader in [`crate::parser::option_xml`],
//! a JSON dump, a test fixture) produces these, and the hierarchy builder
//! turns them into [`crate::models::Node`] trees.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::DeviceClass;

/// Attribute value that may arrive as a number, a bool or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    /// `-1`, `0`, `1`
    Number(i64),
    /// `true` / `false`
    Bool(bool),
    /// Anything as text, e.g. `"-1"`
    Text(String),
}

impl RawFlag {
    /// Text form used for tri-state parsing.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }

    /// Truthiness for boolean attributes such as `invert`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self.as_text().as_str(), "1" | "true")
    }
}

impl From<&str> for RawFlag {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A raw curve point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Input
    #[serde(rename = "in")]
    pub input: f64,
    /// Output
    #[serde(rename = "out")]
    pub output: f64,
}

/// A raw `<nonlinearity_curve>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCurve {
    /// `reset="1"`: no points follow
    #[serde(default)]
    pub reset: bool,
    /// `<point>` children
    #[serde(default)]
    pub points: Vec<RawPoint>,
}

/// A raw `<optiongroup>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionGroup {
    /// `name`
    pub name: String,
    /// `UILabel`
    #[serde(default)]
    pub label: Option<String>,
    /// `UIShowInvert`
    #[serde(default)]
    pub show_invert: Option<RawFlag>,
    /// `UIShowCurve`
    #[serde(default)]
    pub show_curve: Option<RawFlag>,
    /// `UIShowSensitivity`
    #[serde(default)]
    pub show_sensitivity: Option<RawFlag>,
    /// `invert`
    #[serde(default)]
    pub invert: Option<RawFlag>,
    /// `invert_cvar`
    #[serde(default)]
    pub invert_cvar: Option<String>,
    /// `exponent`
    #[serde(default)]
    pub exponent: Option<f64>,
    /// Nested `<nonlinearity_curve>`
    #[serde(default)]
    pub curve: Option<RawCurve>,
    /// Nested `<optiongroup>` elements
    #[serde(default)]
    pub children: Vec<RawOptionGroup>,
}

impl RawOptionGroup {
    /// Creates a group with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A raw `<optiontree>` for one device class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionTree {
    /// `type`
    pub device_class: DeviceClass,
    /// `instances`
    #[serde(default = "default_instances")]
    pub instances: u32,
    /// `sensitivityMin`
    #[serde(default)]
    pub sensitivity_min: Option<f64>,
    /// `sensitivityMax`
    #[serde(default)]
    pub sensitivity_max: Option<f64>,
    /// Top-level option group; `None` when the source had none
    #[serde(default)]
    pub root: Option<RawOptionGroup>,
}

fn default_instances() -> u32 {
    1
}

impl RawOptionTree {
    /// Creates an empty tree for a device class.
    #[must_use]
    pub fn empty(device_class: DeviceClass) -> Self {
        Self {
            device_class,
            instances: default_instances(),
            sensitivity_min: None,
            sensitivity_max: None,
            root: None,
        }
    }
}

/// Parses raw option trees from a JSON array.
pub fn parse_option_trees_json(json: &str) -> Result<Vec<RawOptionTree>> {
    serde_json::from_str(json).context("Failed to parse option trees JSON")
}

/// Loads raw option trees from a file, choosing the reader by extension.
///
/// `.json` files are read as a JSON array of trees; anything else is read as
/// game XML.
pub fn load_option_trees(path: &Path) -> Result<Vec<RawOptionTree>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read option trees: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let trees = if is_json {
        parse_option_trees_json(&content)
    } else {
        crate::parser::option_xml::parse_option_trees(&content)
    };

    trees.with_context(|| format!("Failed to parse option trees: {}", path.display()))
}
