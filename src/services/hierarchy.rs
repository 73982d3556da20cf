//! Builds normalized [`Node`] trees from raw option trees.
//!
//! Every device class always gets a tree: a class missing from the source
//! gets an empty root so callers can index all three classes unconditionally.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::constants::WRAPPER_NODE;
use crate::models::node::join_path;
use crate::models::{Curve, DeviceClass, Node, Point, Visibility};
use crate::parser::option_tree::{load_option_trees, RawCurve, RawOptionGroup, RawOptionTree};
use crate::parser::option_xml::fallback_option_trees;

/// Allowed sensitivity range for a device class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityRange {
    /// `sensitivityMin`
    pub min: f64,
    /// `sensitivityMax`
    pub max: f64,
}

/// A built option tree with its class-level attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTree {
    /// Device class
    pub class: DeviceClass,
    /// Number of instances the game supports for this class
    pub instances: u32,
    /// Sensitivity range, when both bounds were given
    pub sensitivity: Option<SensitivityRange>,
    /// Root node
    pub root: Node,
}

impl DeviceTree {
    /// Empty-but-valid tree for a class whose source was unavailable.
    #[must_use]
    pub fn empty(class: DeviceClass) -> Self {
        Self {
            class,
            instances: 1,
            sensitivity: None,
            root: Node::empty_root(WRAPPER_NODE, class),
        }
    }

    /// Returns true if the tree has no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }
}

/// One built tree per device class.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTrees {
    keyboard: DeviceTree,
    gamepad: DeviceTree,
    joystick: DeviceTree,
}

impl DeviceTrees {
    /// Builds trees from raw sources, substituting empty trees for missing classes.
    ///
    /// If a class appears more than once, the first occurrence wins.
    #[must_use]
    pub fn from_raw(raw_trees: &[RawOptionTree]) -> Self {
        let build = |class: DeviceClass| {
            match raw_trees.iter().find(|t| t.device_class == class) {
                Some(raw) => build_tree(raw),
                None => {
                    warn!(device = %class, "no option tree for device class, using an empty tree");
                    DeviceTree::empty(class)
                }
            }
        };

        Self {
            keyboard: build(DeviceClass::Keyboard),
            gamepad: build(DeviceClass::Gamepad),
            joystick: build(DeviceClass::Joystick),
        }
    }

    /// Trees built from the embedded default option trees.
    #[must_use]
    pub fn fallback() -> Self {
        match fallback_option_trees() {
            Ok(raw) => Self::from_raw(&raw),
            Err(e) => {
                warn!(error = %e, "built-in option trees unavailable, using empty trees");
                Self::empty()
            }
        }
    }

    /// Empty trees for every class.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keyboard: DeviceTree::empty(DeviceClass::Keyboard),
            gamepad: DeviceTree::empty(DeviceClass::Gamepad),
            joystick: DeviceTree::empty(DeviceClass::Joystick),
        }
    }

    /// Loads trees from a game profile file.
    ///
    /// With no path, or when the file cannot be read or parsed, the embedded
    /// defaults are used and the problem is logged as a warning.
    #[must_use]
    pub fn load_or_fallback(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::fallback();
        };

        match load_option_trees(path) {
            Ok(raw) => Self::from_raw(&raw),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "falling back to built-in option trees"
                );
                Self::fallback()
            }
        }
    }

    /// Tree for a device class.
    #[must_use]
    pub fn tree(&self, class: DeviceClass) -> &DeviceTree {
        match class {
            DeviceClass::Keyboard => &self.keyboard,
            DeviceClass::Gamepad => &self.gamepad,
            DeviceClass::Joystick => &self.joystick,
        }
    }

    /// Iterates trees in class order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceTree> {
        [&self.keyboard, &self.gamepad, &self.joystick].into_iter()
    }
}

/// Builds one device tree from its raw source.
#[must_use]
pub fn build_tree(raw: &RawOptionTree) -> DeviceTree {
    let class = raw.device_class;
    let root = match raw.root.as_ref() {
        Some(group) if !group.name.is_empty() => build_node(group, "", class),
        _ => {
            warn!(device = %class, "option tree has no root group, using an empty tree");
            Node::empty_root(WRAPPER_NODE, class)
        }
    };

    let sensitivity = match (raw.sensitivity_min, raw.sensitivity_max) {
        (Some(min), Some(max)) if min <= max => Some(SensitivityRange { min, max }),
        _ => None,
    };

    debug!(device = %class, nodes = root.count(), "built option tree");

    DeviceTree {
        class,
        instances: raw.instances.max(1),
        sensitivity,
        root,
    }
}

/// Builds a node and its subtree depth-first.
///
/// The node's path is `parent_path` joined with its name; an empty parent
/// path makes this a root. Children without a name, or repeating a
/// sibling's name, are dropped so paths stay unique.
#[must_use]
pub fn build_node(raw: &RawOptionGroup, parent_path: &str, class: DeviceClass) -> Node {
    let path = join_path(parent_path, &raw.name);
    let label = raw
        .label
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| raw.name.clone());

    let mut node = Node::new(raw.name.clone(), label, path, class);
    node.show_invert = raw.show_invert.as_ref().and_then(|f| Visibility::parse(&f.as_text()));
    node.show_curve = raw.show_curve.as_ref().and_then(|f| Visibility::parse(&f.as_text()));
    node.show_sensitivity = raw
        .show_sensitivity
        .as_ref()
        .and_then(|f| Visibility::parse(&f.as_text()));
    node.invert = raw.invert.as_ref().is_some_and(|f| f.is_true());
    node.invert_linked_variable = raw.invert_cvar.clone().filter(|v| !v.is_empty());
    node.exponent = raw.exponent.filter(|e| e.is_finite() && *e > 0.0);
    node.curve = raw.curve.as_ref().map(build_curve);

    let mut seen = HashSet::new();
    for child in &raw.children {
        if child.name.is_empty() {
            warn!(parent = %node.path, "skipping option group without a name");
            continue;
        }
        if !seen.insert(child.name.as_str()) {
            warn!(parent = %node.path, option = %child.name, "skipping duplicate sibling option");
            continue;
        }
        node.children.push(build_node(child, &node.path, class));
    }

    node
}

fn build_curve(raw: &RawCurve) -> Curve {
    if raw.reset {
        return Curve::reset();
    }
    Curve {
        reset: false,
        points: raw
            .points
            .iter()
            .map(|p| Point::new(p.input, p.output))
            .collect(),
    }
}
