//! Parsing and serialization for the file formats the application reads and writes.
//!
//! This module reads the game's option trees (XML or JSON), the device
//! option blocks of `actionmaps.xml`, and the application's own `.sccontrols`
//! profile files.

pub mod actionmaps;
pub mod controls_file;
pub mod option_tree;
pub mod option_xml;

// Re-export commonly used types and functions
pub use actionmaps::{
    actionmaps_to_flat_groups, controls_to_actionmaps, generate_options_xml,
    parse_actionmaps_options, ActionmapsDevice, ActionmapsOption,
};
pub use controls_file::ControlsFile;
pub use option_tree::{load_option_trees, RawOptionGroup, RawOptionTree};
pub use option_xml::parse_option_trees;
