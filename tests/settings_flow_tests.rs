//! Editing settings through a session: inheritance, flat export and sync.

mod fixtures;
use fixtures::*;

use anyhow::Result;
use joymapper::models::{Curve, CurveMode, DeviceClass, Point, SettingKind, SettingValue};
use joymapper::services::{FlatEntry, FlatGroup, Session, SessionOptions};
use std::time::{Duration, Instant};

fn joystick_session(instance: u32) -> Session {
    let mut session = sample_session();
    session.select(DeviceClass::Joystick, instance).unwrap();
    session
}

#[test]
fn test_container_value_is_inherited_by_leaves() {
    let mut session = joystick_session(1);
    let flight = display_path(&session, DeviceClass::Joystick, "flight");
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");

    session.set(&flight, SettingValue::Invert(true), Instant::now());

    let resolved =
        session.get_with_inheritance(&pitch, SettingKind::Invert, SettingValue::Invert(false));
    assert_eq!(resolved.value, SettingValue::Invert(true));
    assert!(resolved.inherited);
    assert_eq!(resolved.inherited_from.as_deref(), Some("flight"));

    assert!(session.get_direct(&pitch, SettingKind::Invert).is_none());
}

#[test]
fn test_direct_value_overrides_ancestor() {
    let mut session = joystick_session(1);
    let flight = display_path(&session, DeviceClass::Joystick, "flight");
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let now = Instant::now();

    session.set(&flight, SettingValue::Invert(true), now);
    session.set(&pitch, SettingValue::Invert(false), now);

    let resolved =
        session.get_with_inheritance(&pitch, SettingKind::Invert, SettingValue::Invert(true));
    assert_eq!(resolved.value, SettingValue::Invert(false));
    assert!(!resolved.inherited);
}

#[test]
fn test_default_when_nothing_is_set() {
    let session = joystick_session(1);
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let default = SettingValue::Exponent(1.0);
    let resolved = session.get_with_inheritance(&pitch, SettingKind::Exponent, default);
    assert_eq!(resolved.value, SettingValue::Exponent(1.0));
    assert!(!resolved.inherited);
    assert!(resolved.inherited_from.is_none());
}

#[test]
fn test_instances_are_isolated() {
    let mut session = joystick_session(1);
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    session.set(&pitch, SettingValue::Invert(true), Instant::now());

    session.select(DeviceClass::Joystick, 2).unwrap();
    assert!(session.get_direct(&pitch, SettingKind::Invert).is_none());
    assert!(session.to_flat_list().is_none());

    assert!(session.select(DeviceClass::Joystick, 3).is_err());
}

#[test]
fn test_propagate_then_reset() -> Result<()> {
    let mut session = joystick_session(1);
    let flight = display_path(&session, DeviceClass::Joystick, "flight");
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let now = Instant::now();

    let written = session.propagate_to_descendants(&flight, &SettingValue::Invert(true), now)?;
    assert_eq!(written, 3);
    assert!(session.get_direct(&flight, SettingKind::Invert).is_none());
    assert_eq!(
        session.get_direct(&pitch, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );

    assert!(session.reset_node(&pitch, now));
    assert!(!session.reset_node(&pitch, now));
    assert!(session.get_direct(&pitch, SettingKind::Invert).is_none());

    assert!(session
        .propagate_to_descendants("master.nowhere", &SettingValue::Invert(true), now)
        .is_err());
    Ok(())
}

#[test]
fn test_flat_export_merges_sections_by_name() {
    let mut session = joystick_session(1);
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let curve_path = pitch.replace(".inversion.", ".sensitivity_curves.");
    let now = Instant::now();

    session.set(&pitch, SettingValue::Invert(true), now);
    session.set(&curve_path, SettingValue::CurveMode(CurveMode::Exponent), now);
    session.set(&curve_path, SettingValue::Exponent(2.5), now);

    let list = session.to_flat_list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "flight_move_pitch");
    assert_eq!(list[0].invert, Some(true));
    assert_eq!(list[0].exponent, Some(2.5));
}

#[test]
fn test_identity_exponent_is_not_exported() {
    let mut session = joystick_session(1);
    let yaw = display_path(&session, DeviceClass::Joystick, "flight_move_yaw");
    let now = Instant::now();

    session.set(&yaw, SettingValue::CurveMode(CurveMode::Exponent), now);
    session.set(&yaw, SettingValue::Exponent(1.0), now);
    assert!(session.to_flat_list().is_none());
}

#[test]
fn test_curve_mode_exports_curve_with_identity_exponent() {
    let mut session = joystick_session(1);
    let throttle = display_path(&session, DeviceClass::Joystick, "flight_throttle_abs");
    let now = Instant::now();
    let curve = Curve::from_points(vec![Point::new(0.5, 0.2)]).unwrap();

    session.set(&throttle, SettingValue::Exponent(3.0), now);
    session.set(&throttle, SettingValue::Curve(curve.clone()), now);
    session.set(&throttle, SettingValue::CurveMode(CurveMode::Curve), now);

    let list = session.to_flat_list().unwrap();
    assert_eq!(list[0].exponent, Some(1.0));
    assert_eq!(list[0].curve.as_ref().unwrap().points, curve.points);

    // Switching back keeps the stored exponent
    session.set(&throttle, SettingValue::CurveMode(CurveMode::Exponent), now);
    let list = session.to_flat_list().unwrap();
    assert_eq!(list[0].exponent, Some(3.0));
    assert!(list[0].curve.is_none());
}

#[test]
fn test_flat_list_round_trip_through_session() {
    let entries = vec![
        FlatEntry {
            invert: Some(true),
            ..FlatEntry::named("flight_move_pitch")
        },
        FlatEntry {
            exponent: Some(2.0),
            ..FlatEntry::named("flight_move_yaw")
        },
    ];

    let mut session = joystick_session(2);
    session.from_flat_list(&entries);
    assert!(!session.is_dirty());

    let exported = session.to_flat_list().unwrap();
    assert_eq!(exported, entries);

    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    assert_eq!(
        session.get_direct(&pitch, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );
}

#[test]
fn test_exponent_on_editable_node_survives_flat_round_trip() {
    let mut session = joystick_session(1);
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let now = Instant::now();

    session.set(&pitch, SettingValue::CurveMode(CurveMode::Exponent), now);
    session.set(&pitch, SettingValue::Exponent(2.0), now);

    let entries = session.to_flat_list().unwrap();
    let mut restored = joystick_session(1);
    restored.from_flat_list(&entries);

    assert_eq!(
        restored.get_direct(&pitch, SettingKind::Exponent),
        Some(SettingValue::Exponent(2.0))
    );
    let resolved = restored.get_with_inheritance(
        &pitch,
        SettingKind::Exponent,
        SettingValue::Exponent(1.0),
    );
    assert_eq!(resolved.value, SettingValue::Exponent(2.0));
    assert!(!resolved.inherited);
}

#[test]
fn test_unknown_names_survive_import() {
    let mut session = joystick_session(1);
    session.from_flat_list(&[FlatEntry {
        invert: Some(true),
        ..FlatEntry::named("not_in_tree")
    }]);

    assert_eq!(
        session.get_direct("not_in_tree", SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );
    assert_eq!(session.to_flat_list().unwrap()[0].name, "not_in_tree");
}

#[test]
fn test_sync_fires_once_after_burst() {
    let options = SessionOptions {
        debounce: Duration::from_millis(100),
        ..SessionOptions::default()
    };
    let mut session = Session::new(sample_trees(), options);
    session.select(DeviceClass::Joystick, 1).unwrap();
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");

    let mut delivered: Vec<Vec<FlatGroup>> = Vec::new();
    let mut sink = |groups: &[FlatGroup]| -> Result<()> {
        delivered.push(groups.to_vec());
        Ok(())
    };

    let start = Instant::now();
    session.set(&pitch, SettingValue::Invert(true), start);
    session.set(&pitch, SettingValue::Invert(false), start + Duration::from_millis(50));
    assert!(session.sync_pending());
    assert!(session.is_dirty());

    assert!(!session.poll_sync(start + Duration::from_millis(120), &mut sink));
    assert!(session.poll_sync(start + Duration::from_millis(150), &mut sink));
    assert!(!session.poll_sync(start + Duration::from_millis(500), &mut sink));

    assert_eq!(delivered.len(), 1);
    let group = &delivered[0][0];
    assert_eq!(group.device_class, DeviceClass::Joystick);
    assert_eq!(group.instance, 1);
    assert_eq!(group.options[0].invert, Some(false));
}

#[test]
fn test_failed_sync_leaves_store_alone() {
    let mut session = joystick_session(1);
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    let start = Instant::now();
    session.set(&pitch, SettingValue::Invert(true), start);

    let mut sink = |_: &[FlatGroup]| -> Result<()> { anyhow::bail!("bindings file is locked") };
    assert!(session.poll_sync(start + Duration::from_secs(1), &mut sink));

    assert_eq!(
        session.get_direct(&pitch, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );
    assert!(!session.sync_pending());
}
