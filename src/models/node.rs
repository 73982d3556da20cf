//! Option tree nodes.
//!
//! A [`Node`] tree is built once per device class from the raw option
//! hierarchy and then cloned into display sections. Trees own their children
//! outright, so a clone never shares structure with its source.

use crate::models::{Curve, DeviceClass};
use serde::{Deserialize, Serialize};

/// Path separator used in node paths.
pub const PATH_SEPARATOR: char = '.';

/// Tri-state visibility flag as authored in the game files.
///
/// An unset attribute is represented as `None` on the node, which differs
/// from an explicit `Inherit` (`-1`) only in how it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `-1`: take the ancestor's value
    Inherit,
    /// `1`
    Shown,
    /// `0`
    Hidden,
}

impl Visibility {
    /// Parses the raw attribute value. Unknown values yield `None`.
    ///
    /// ```
    /// use joymapper::models::Visibility;
    ///
    /// assert_eq!(Visibility::parse("-1"), Some(Visibility::Inherit));
    /// assert_eq!(Visibility::parse("1"), Some(Visibility::Shown));
    /// assert_eq!(Visibility::parse("0"), Some(Visibility::Hidden));
    /// assert_eq!(Visibility::parse("2"), None);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "-1" => Some(Self::Inherit),
            "0" => Some(Self::Hidden),
            "1" => Some(Self::Shown),
            _ => None,
        }
    }
}

/// Which capability flag to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `showInvert`
    Invert,
    /// `showCurve`
    Curve,
    /// `showSensitivity`
    Sensitivity,
}

/// Display section a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// Axis inversion editing
    Inversion,
    /// Exponent / curve editing
    Curves,
}

/// A node in an option tree.
///
/// # Invariants
///
/// - `path` addresses exactly one node within one device-class tree
/// - No two siblings share a `name`
/// - Only leaves are edited and persisted; containers may still hold
///   settings that descendants inherit
/// - `disabled_reason` is `Some` only when `disabled` is true
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Raw option identifier (e.g. "flight_move_pitch")
    pub name: String,
    /// Display label or localization key (e.g. "@ui_COFlightPitch")
    pub label: String,
    /// Dot-separated location within the device-class tree
    pub path: String,
    /// Owning device class
    pub device_class: DeviceClass,
    /// `UIShowInvert`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_invert: Option<Visibility>,
    /// `UIShowCurve`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_curve: Option<Visibility>,
    /// `UIShowSensitivity`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_sensitivity: Option<Visibility>,
    /// Default inversion
    #[serde(default)]
    pub invert: bool,
    /// Console variable linked to inversion (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert_linked_variable: Option<String>,
    /// Default response exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    /// Default response curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
    /// Display section, assigned by the display transformer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<SectionType>,
    /// Synthetic top-level grouping node
    #[serde(default)]
    pub is_section: bool,
    /// Shown but not editable
    #[serde(default)]
    pub disabled: bool,
    /// Why the node is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
    /// Ordered children
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with no flags, defaults or children.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        path: impl Into<String>,
        device_class: DeviceClass,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            path: path.into(),
            device_class,
            show_invert: None,
            show_curve: None,
            show_sensitivity: None,
            invert: false,
            invert_linked_variable: None,
            exponent: None,
            curve: None,
            section_type: None,
            is_section: false,
            disabled: false,
            disabled_reason: None,
            children: Vec::new(),
        }
    }

    /// An empty root for a device class whose hierarchy could not be loaded.
    #[must_use]
    pub fn empty_root(name: &str, device_class: DeviceClass) -> Self {
        Self::new(name, name, name, device_class)
    }

    /// Returns true if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Section this node belongs to; untagged nodes count as inversion.
    #[must_use]
    pub fn effective_section(&self) -> SectionType {
        self.section_type.unwrap_or(SectionType::Inversion)
    }

    /// Marks the node disabled with a reason.
    pub fn disable(&mut self, reason: impl Into<String>) {
        self.disabled = true;
        self.disabled_reason = Some(reason.into());
    }

    /// Finds a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Finds a node anywhere in this subtree by exact path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Node> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// First node (pre-order) whose name matches.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_name(name))
    }

    /// All strict descendants in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    /// All leaves of this subtree (the node itself if it has no children).
    #[must_use]
    pub fn leaves(&self) -> Vec<&Node> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children.iter().flat_map(Node::leaves).collect()
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Visits every node in this subtree mutably, parents before children.
    pub fn for_each_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    /// Chain of nodes from this node down to the node at `path` (inclusive).
    #[must_use]
    pub fn lineage(&self, path: &str) -> Option<Vec<&Node>> {
        if self.path == path {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut chain) = child.lineage(path) {
                chain.insert(0, self);
                return Some(chain);
            }
        }
        None
    }

    /// Resolves a capability flag for the node at `path`.
    ///
    /// Walks from the node toward the root; `Inherit` and unset continue the
    /// walk, the first `Shown`/`Hidden` wins. Nothing set anywhere means hidden.
    #[must_use]
    pub fn resolve_visibility(&self, path: &str, capability: Capability) -> bool {
        let Some(chain) = self.lineage(path) else {
            return false;
        };

        chain
            .iter()
            .rev()
            .find_map(|node| match node.visibility(capability) {
                Some(Visibility::Shown) => Some(true),
                Some(Visibility::Hidden) => Some(false),
                Some(Visibility::Inherit) | None => None,
            })
            .unwrap_or(false)
    }

    fn visibility(&self, capability: Capability) -> Option<Visibility> {
        match capability {
            Capability::Invert => self.show_invert,
            Capability::Curve => self.show_curve,
            Capability::Sensitivity => self.show_sensitivity,
        }
    }
}

/// Joins a parent path and a child name.
#[must_use]
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

/// Final segment of a path (the option's short name).
///
/// ```
/// use joymapper::models::node::short_name;
///
/// assert_eq!(short_name("master.inversion.flight_move_pitch"), "flight_move_pitch");
/// assert_eq!(short_name("master"), "master");
/// ```
#[must_use]
pub fn short_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}
