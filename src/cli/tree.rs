//! Tree command for inspecting option hierarchies.

use crate::cli::common::{load_session, print_json, CliError, CliResult};
use crate::constants::{CURVES_SEGMENT, INVERSION_NODE};
use crate::models::{Capability, DeviceClass, Node, SectionType, SettingKind, SettingValue};
use crate::services::display::rewrite_segment;
use crate::services::{ProfileService, Session};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Show the option tree of a device class
#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Device class (keyboard, gamepad, or joystick)
    #[arg(short, long, default_value = "keyboard")]
    pub device: DeviceClass,

    /// Instance number for gamepads and joysticks
    #[arg(short, long, default_value_t = 1)]
    pub instance: u32,

    /// Option tree source (game defaultProfile.xml or a JSON dump)
    #[arg(long, value_name = "FILE")]
    pub option_trees: Option<PathBuf>,

    /// Profile whose settings are shown next to each option
    #[arg(short, long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Show the tree as built, before display shaping
    #[arg(long)]
    pub raw: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TreeArgs {
    /// Execute the tree command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = load_session(self.option_trees.as_deref())?;

        if let Some(path) = &self.profile {
            let profile = ProfileService::load(path)
                .map_err(|e| CliError::io(format!("Failed to load profile: {e:#}")))?;
            ProfileService::apply(&mut session, &profile);
        }

        session
            .select(self.device, self.instance)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let tree = session.tree(self.device);
        let node = if self.raw {
            Some(&tree.root)
        } else {
            session.display_tree(self.device)
        };
        let Some(node) = node else {
            return Err(CliError::validation(format!(
                "No editable options for {}",
                self.device.display_name()
            )));
        };

        if self.json {
            return print_json(node);
        }

        let mut header = format!("{} ({} instance(s)", self.device.display_name(), tree.instances);
        if let Some(range) = tree.sensitivity {
            let _ = write!(header, ", sensitivity {}..{}", range.min, range.max);
        }
        header.push(')');
        println!("{header}");

        print_node(&session, &tree.root, node, 0);
        Ok(())
    }
}

fn print_node(session: &Session, raw_root: &Node, node: &Node, depth: usize) {
    let mut line = format!("{}{}", "  ".repeat(depth), node.label);
    if node.label != node.name {
        let _ = write!(line, " ({})", node.name);
    }

    let source_path = rewrite_segment(&node.path, CURVES_SEGMENT, INVERSION_NODE);
    let mut tags = Vec::new();
    if raw_root.resolve_visibility(&source_path, Capability::Invert) {
        tags.push("invert".to_string());
    }
    if raw_root.resolve_visibility(&source_path, Capability::Curve) {
        tags.push("curve".to_string());
    }
    if node.disabled {
        tags.push("disabled".to_string());
    }
    if node.is_leaf() && node.effective_section() == SectionType::Inversion {
        let resolved = session.get_with_inheritance(
            &node.path,
            SettingKind::Invert,
            SettingValue::Invert(node.invert),
        );
        if let Some(inverted) = resolved.value.as_invert() {
            match resolved.inherited_from {
                Some(from) => tags.push(format!("inverted={inverted} via {from}")),
                None => tags.push(format!("inverted={inverted}")),
            }
        }
    }

    if !tags.is_empty() {
        let _ = write!(line, " [{}]", tags.join(", "));
    }
    println!("{line}");

    for child in &node.children {
        print_node(session, raw_root, child, depth + 1);
    }
}
