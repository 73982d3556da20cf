//! Shapes built option trees into the sections shown to the user.
//!
//! The game's tree wraps the editable options in a `master` group and a
//! curve-family container per device class. The display tree drops that
//! wrapping and presents the `inversion` subtree as one or two sections:
//!
//! - "Inversion Settings" for every class
//! - A disabled "Sensitivity Curves" copy for gamepads and joysticks, with
//!   `inversion` rewritten to `sensitivity_curves` in every path
//!
//! Both sections are independent deep copies, so editing one never affects
//! the other or the source tree.

use tracing::{debug, warn};

use crate::constants::{
    curve_family, curves_label, CURVES_DISABLED_REASON, CURVES_SEGMENT, INVERSION_LABEL,
    INVERSION_NODE, WRAPPER_NODE,
};
use crate::models::node::PATH_SEPARATOR;
use crate::models::{DeviceClass, Node, SectionType};

/// Options controlling which sections are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Generate the curves section for multi-instance classes
    pub include_curves: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            include_curves: true,
        }
    }
}

/// Finds the node whose children are the class's options.
///
/// Descends through the `master` wrapper and picks the curve-family
/// container for `class`. Falls back to the wrapper, then to `root` itself.
#[must_use]
pub fn content_node(root: &Node, class: DeviceClass) -> &Node {
    let wrapper = if root.name == WRAPPER_NODE {
        Some(root)
    } else {
        root.child(WRAPPER_NODE)
    };

    let family = curve_family(class);
    match wrapper {
        Some(wrapper) => wrapper.child(family).unwrap_or(wrapper),
        None => root.child(family).unwrap_or(root),
    }
}

/// Builds the display tree for one device class.
///
/// Returns `None` when the class has no options at all. When the tree has
/// options but no `inversion` group, the content node is returned unchanged;
/// its nodes carry no section tag and count as inversion.
#[must_use]
pub fn build_display_tree(
    root: &Node,
    class: DeviceClass,
    options: DisplayOptions,
) -> Option<Node> {
    let content = content_node(root, class);

    let inversion = content
        .child(INVERSION_NODE)
        .or_else(|| content.find_by_name(INVERSION_NODE));

    let Some(inversion) = inversion else {
        if content.is_leaf() {
            warn!(device = %class, "no options found for device class");
            return None;
        }
        warn!(device = %class, "no inversion section found, showing raw options");
        return Some(content.clone());
    };

    let mut tree = Node::new(
        content.name.clone(),
        content.label.clone(),
        content.path.clone(),
        class,
    );
    tree.show_invert = content.show_invert;
    tree.show_curve = content.show_curve;
    tree.show_sensitivity = content.show_sensitivity;

    tree.children.push(inversion_section(inversion));
    if class.is_multi_instance() && options.include_curves {
        tree.children.push(curves_section(inversion, class));
    }

    let (sections, nodes) = (tree.children.len(), tree.count());
    debug!(device = %class, sections, nodes, "built display tree");

    Some(tree)
}

/// Deep copy of the inversion subtree tagged as the inversion section.
#[must_use]
pub fn inversion_section(inversion: &Node) -> Node {
    let mut section = inversion.clone();
    section.for_each_mut(&mut |node| node.section_type = Some(SectionType::Inversion));
    section.label = INVERSION_LABEL.to_string();
    section.is_section = true;
    section
}

/// Deep copy of the inversion subtree re-keyed and disabled as the curves section.
#[must_use]
pub fn curves_section(inversion: &Node, class: DeviceClass) -> Node {
    let mut section = inversion.clone();
    section.for_each_mut(&mut |node| {
        node.section_type = Some(SectionType::Curves);
        node.path = rewrite_segment(&node.path, INVERSION_NODE, CURVES_SEGMENT);
        node.disable(CURVES_DISABLED_REASON);
    });
    section.name = CURVES_SEGMENT.to_string();
    section.label = curves_label(class).to_string();
    section.is_section = true;
    section
}

/// Replaces every path segment equal to `from` with `to`.
///
/// Works on whole segments, so `inversion_extra` is left alone while
/// `inversion`, `inversion.x`, `x.inversion` and `x.inversion.y` are all
/// rewritten.
///
/// ```
/// use joymapper::services::display::rewrite_segment;
///
/// assert_eq!(rewrite_segment("inversion", "inversion", "curves"), "curves");
/// assert_eq!(rewrite_segment("a.inversion.b", "inversion", "curves"), "a.curves.b");
/// assert_eq!(rewrite_segment("a.inversion_b", "inversion", "curves"), "a.inversion_b");
/// ```
#[must_use]
pub fn rewrite_segment(path: &str, from: &str, to: &str) -> String {
    path.split(PATH_SEPARATOR)
        .map(|segment| if segment == from { to } else { segment })
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}
