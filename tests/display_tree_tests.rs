//! Building and shaping option trees from game XML.

mod fixtures;
use fixtures::*;

use joymapper::constants::{CURVES_DISABLED_REASON, INVERSION_LABEL};
use joymapper::models::{Capability, DeviceClass, Node, SectionType};
use joymapper::services::display::build_display_tree;
use joymapper::services::{DeviceTrees, DisplayOptions};

#[test]
fn test_tree_attributes_are_read() {
    let trees = sample_trees();
    let joystick = trees.tree(DeviceClass::Joystick);
    assert_eq!(joystick.instances, 2);
    let range = joystick.sensitivity.expect("joystick has a sensitivity range");
    assert!((range.min - 0.01).abs() < 1e-12);
    assert!((range.max - 2.0).abs() < 1e-12);

    let keyboard = trees.tree(DeviceClass::Keyboard);
    assert_eq!(keyboard.instances, 1);
    assert!(keyboard.sensitivity.is_none());
}

#[test]
fn test_paths_are_unique_and_rooted() {
    let trees = sample_trees();
    let root = &trees.tree(DeviceClass::Joystick).root;
    let mut paths: Vec<&str> = root.descendants().iter().map(|n| n.path.as_str()).collect();
    let total = paths.len();
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), total);
    assert!(paths.iter().all(|p| p.starts_with("master.")));

    let throttle = root.find_by_name("flight_throttle_abs").unwrap();
    assert_eq!(
        throttle.path,
        "master.joystick_curves.inversion.flight.flight_throttle_abs"
    );
    assert_eq!(throttle.curve.as_ref().unwrap().points.len(), 1);
}

#[test]
fn test_joystick_display_has_two_sections() {
    let session = sample_session();
    let display = session.display_tree(DeviceClass::Joystick).unwrap();
    assert_eq!(display.name, "joystick_curves");
    assert_eq!(display.children.len(), 2);

    let inversion = &display.children[0];
    assert!(inversion.is_section);
    assert_eq!(inversion.label, INVERSION_LABEL);
    assert!(inversion
        .descendants()
        .iter()
        .all(|n| n.section_type == Some(SectionType::Inversion) && !n.disabled));

    let curves = &display.children[1];
    assert!(curves.is_section);
    assert_eq!(curves.name, "sensitivity_curves");
    assert_eq!(curves.label, "Joystick Sensitivity Curves");
    for node in curves.descendants() {
        assert_eq!(node.section_type, Some(SectionType::Curves));
        assert!(node.disabled);
        assert_eq!(node.disabled_reason.as_deref(), Some(CURVES_DISABLED_REASON));
        assert!(!node.path.split('.').any(|s| s == "inversion"));
    }
}

#[test]
fn test_sections_mirror_each_other() {
    let session = sample_session();
    let display = session.display_tree(DeviceClass::Joystick).unwrap();
    let names = |i: usize| -> Vec<String> {
        display.children[i]
            .descendants()
            .iter()
            .map(|n| n.name.clone())
            .collect()
    };
    assert_eq!(names(0), names(1));
}

fn named_mut<'a>(node: &'a mut Node, name: &str) -> Option<&'a mut Node> {
    if node.name == name {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| named_mut(c, name))
}

#[test]
fn test_editing_curves_section_leaves_inversion_section_alone() {
    let trees = sample_trees();
    let root = &trees.tree(DeviceClass::Joystick).root;
    let mut display =
        build_display_tree(root, DeviceClass::Joystick, DisplayOptions::default()).unwrap();
    let inversion_before = display.children[0].clone();

    let throttle = named_mut(&mut display.children[1], "flight_throttle_abs").unwrap();
    throttle.curve.as_mut().unwrap().points[0].output = 0.99;
    throttle.label = "Edited".to_string();
    throttle.invert = true;
    named_mut(&mut display.children[1], "flight").unwrap().children.clear();

    assert_eq!(display.children[0], inversion_before);
    let original = display.children[0].find_by_name("flight_throttle_abs").unwrap();
    assert!((original.curve.as_ref().unwrap().points[0].output - 0.99).abs() > 1e-9);
    assert_ne!(original.label, "Edited");
}

#[test]
fn test_keyboard_has_inversion_only() {
    let session = sample_session();
    let display = session.display_tree(DeviceClass::Keyboard).unwrap();
    assert_eq!(display.children.len(), 1);
    assert_eq!(display.children[0].leaves().len(), 2);
}

#[test]
fn test_class_without_options_has_no_display_tree() {
    let session = sample_session();
    assert!(session.display_tree(DeviceClass::Gamepad).is_none());
}

#[test]
fn test_curves_section_can_be_turned_off() {
    let trees = sample_trees();
    let root = &trees.tree(DeviceClass::Joystick).root;
    let display = build_display_tree(
        root,
        DeviceClass::Joystick,
        DisplayOptions {
            include_curves: false,
        },
    )
    .unwrap();
    assert_eq!(display.children.len(), 1);
}

#[test]
fn test_display_does_not_touch_source_tree() {
    let trees = sample_trees();
    let root = trees.tree(DeviceClass::Joystick).root.clone();
    let _ = build_display_tree(&root, DeviceClass::Joystick, DisplayOptions::default());
    assert_eq!(&root, &trees.tree(DeviceClass::Joystick).root);
    assert!(root.descendants().iter().all(|n| n.section_type.is_none()));
}

#[test]
fn test_visibility_walks_toward_root() {
    let trees = sample_trees();
    let root = &trees.tree(DeviceClass::Joystick).root;
    let pitch = root.find_by_name("flight_move_pitch").unwrap();
    let turret = root.find_by_name("turret_aim_pitch").unwrap();

    assert!(root.resolve_visibility(&pitch.path, Capability::Invert));
    assert!(root.resolve_visibility(&pitch.path, Capability::Curve));
    assert!(root.resolve_visibility(&turret.path, Capability::Invert));
    assert!(!root.resolve_visibility(&turret.path, Capability::Curve));
    assert!(!root.resolve_visibility(&pitch.path, Capability::Sensitivity));
    assert!(!root.resolve_visibility("master.nowhere", Capability::Invert));
}

#[test]
fn test_fallback_trees_cover_every_class() {
    let trees = DeviceTrees::fallback();
    for class in DeviceClass::ALL {
        assert!(!trees.tree(class).is_empty(), "{class} tree is empty");
    }
    assert_eq!(trees.tree(DeviceClass::Joystick).instances, 8);
}

#[test]
fn test_missing_file_falls_back_to_builtin_trees() {
    let missing = std::path::Path::new("/nonexistent/defaultProfile.xml");
    let trees = DeviceTrees::load_or_fallback(Some(missing));
    assert_eq!(trees, DeviceTrees::fallback());
}
