//! Profiles on disk and action-map interop.

mod fixtures;
use fixtures::*;

use anyhow::Result;
use joymapper::models::{DeviceClass, DeviceSelection, SettingKind, SettingValue};
use joymapper::parser::controls_file::GamepadSettings;
use joymapper::parser::{
    actionmaps_to_flat_groups, controls_to_actionmaps, generate_options_xml,
    parse_actionmaps_options, ControlsFile,
};
use joymapper::services::ProfileService;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_actionmaps_import_reaches_the_store() {
    let devices = parse_actionmaps_options(SAMPLE_ACTIONMAPS).unwrap();
    assert_eq!(devices.len(), 3);

    let groups = actionmaps_to_flat_groups(&devices);
    assert_eq!(groups.len(), 2, "empty joystick 2 block is skipped");

    let mut session = sample_session();
    session.apply_flat_groups(&groups);

    let keyboard_pitch = display_path(&session, DeviceClass::Keyboard, "fps_view_pitch");
    assert_eq!(
        session.get_direct(&keyboard_pitch, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );

    session.select(DeviceClass::Joystick, 1).unwrap();
    let list = session.to_flat_list().unwrap();
    let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"flight_move_pitch"));
    assert!(names.contains(&"flight_throttle_abs"));

    let throttle = list.iter().find(|e| e.name == "flight_throttle_abs").unwrap();
    assert_eq!(throttle.exponent, Some(1.0));
    assert_eq!(throttle.curve.as_ref().unwrap().points.len(), 2);
}

#[test]
fn test_saved_profile_keeps_only_inversion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let groups = actionmaps_to_flat_groups(&parse_actionmaps_options(SAMPLE_ACTIONMAPS)?);
    let mut session = sample_session();
    session.apply_flat_groups(&groups);

    let path = temp_dir.path().join("imported.sccontrols");
    ProfileService::save(&ProfileService::snapshot(&session, "Imported"), &path)?;
    let loaded = ProfileService::load(&path)?;

    assert_eq!(loaded.profile_name, "Imported");
    assert!(loaded.last_modified.is_some());
    let joystick = &loaded.devices.joystick.as_ref().unwrap()["1"];
    assert_eq!(joystick.options["flight_move_pitch"].invert, Some(true));
    assert_eq!(joystick.options["flight_move_yaw"].invert, Some(false));
    assert!(joystick.options.values().all(|o| o.exponent.is_none() && o.curve.is_none()));
    assert!(!joystick.options.contains_key("flight_throttle_abs"));
    Ok(())
}

#[test]
fn test_profile_apply_restores_inversion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_sample_profile(temp_dir.path());
    let profile = ProfileService::load(&path)?;

    let mut session = sample_session();
    ProfileService::apply(&mut session, &profile);
    assert!(!session.is_dirty());

    let yaw = display_path(&session, DeviceClass::Keyboard, "fps_view_yaw");
    assert_eq!(
        session.get_direct(&yaw, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );

    session.select(DeviceClass::Joystick, 1)?;
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    assert_eq!(
        session.get_direct(&pitch, SettingKind::Invert),
        Some(SettingValue::Invert(true))
    );
    Ok(())
}

#[test]
fn test_hand_edited_profile_with_curves_loads() -> Result<()> {
    let json = r#"{
        "version": "1.0",
        "profile_name": "Hand Edited",
        "devices": {
            "gamepad": { "options": { "fps_view_pitch": { "invert": true } } },
            "joystick": {
                "2": {
                    "product": "Throttle",
                    "options": {
                        "flight_move_yaw": { "curveMode": "curve", "exponent": 2.0,
                                             "curve": { "points": [{ "in": 0.5, "out": 0.3 }] } }
                    }
                },
                "zero": { "options": { "flight_move_pitch": { "invert": true } } }
            }
        }
    }"#;

    let profile = ControlsFile::from_json(json)?;
    assert!(matches!(profile.devices.gamepad, Some(GamepadSettings::Single(_))));

    let groups = profile.to_flat_groups();
    assert_eq!(groups.len(), 2, "non-numeric instance keys are skipped");

    let mut session = sample_session();
    ProfileService::apply(&mut session, &profile);
    session.select(DeviceClass::Joystick, 2)?;
    let list = session.to_flat_list().unwrap();
    assert_eq!(list[0].name, "flight_move_yaw");
    assert_eq!(list[0].exponent, Some(1.0));
    assert_eq!(list[0].curve.as_ref().unwrap().points.len(), 1);
    Ok(())
}

#[test]
fn test_second_gamepad_promotes_to_instance_map() {
    let mut profile = ControlsFile::new("Pads");
    profile.insert(DeviceSelection::new(DeviceClass::Gamepad, 1), Default::default());
    assert!(matches!(profile.devices.gamepad, Some(GamepadSettings::Single(_))));

    profile.insert(DeviceSelection::new(DeviceClass::Gamepad, 2), Default::default());
    match &profile.devices.gamepad {
        Some(GamepadSettings::Instances(map)) => {
            assert_eq!(map.keys().collect::<Vec<_>>(), ["1", "2"]);
        }
        other => panic!("expected instance map, got {other:?}"),
    }
}

#[test]
fn test_profile_exports_to_actionmaps_xml() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let profile = ProfileService::load(&write_sample_profile(temp_dir.path()))?;

    let devices = controls_to_actionmaps(&profile);
    let xml: String = devices.iter().map(generate_options_xml).collect();
    assert!(xml.contains(r#"<options type="keyboard" instance="1">"#));
    assert!(xml.contains(r#"<fps_view_yaw invert="1"/>"#));
    assert!(xml.contains(r#"<options type="joystick" instance="1">"#));
    assert!(xml.contains(r#"<flight_move_pitch invert="1"/>"#));

    let wrapped = format!("<ActionProfiles>\n{xml}</ActionProfiles>");
    let reparsed = parse_actionmaps_options(&wrapped)?;
    assert_eq!(reparsed, devices);
    Ok(())
}

#[test]
fn test_list_profiles_in_directory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let first = write_sample_profile(temp_dir.path());
    fs::write(temp_dir.path().join("readme.md"), "not a profile")?;

    assert_eq!(ProfileService::list(temp_dir.path())?, vec![first]);
    Ok(())
}
