//! Shared test fixtures for integration and E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use joymapper::models::{DeviceClass, SettingValue};
use joymapper::parser::{parse_option_trees, ControlsFile};
use joymapper::services::{DeviceTrees, ProfileService, Session, SessionOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tempfile::TempDir;

/// Option trees for a small HOTAS setup.
///
/// The joystick tree has two instances, a nested flight group with an
/// exponent, a throttle with a curve, and a turret group hiding curves.
pub const SAMPLE_OPTION_TREES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<profile version="1">
  <optiontree type="keyboard" instances="1">
    <optiongroup name="master" UILabel="Master" UIShowInvert="1">
      <optiongroup name="mouse_curves" UILabel="Mouse Curves" UIShowInvert="-1">
        <optiongroup name="inversion" UILabel="Inversion" UIShowInvert="-1">
          <optiongroup name="fps_view_pitch" UILabel="FPS Pitch" invert="0"/>
          <optiongroup name="fps_view_yaw" UILabel="FPS Yaw" invert="0"/>
        </optiongroup>
      </optiongroup>
    </optiongroup>
  </optiontree>
  <optiontree type="gamepad" instances="1">
    <optiongroup name="master" UILabel="Master"/>
  </optiontree>
  <optiontree type="joystick" instances="2" sensitivityMin="0.01" sensitivityMax="2">
    <optiongroup name="master" UILabel="Master" UIShowInvert="1" UIShowCurve="1">
      <optiongroup name="joystick_curves" UILabel="Joystick Curves"
                   UIShowInvert="-1" UIShowCurve="-1">
        <optiongroup name="inversion" UILabel="Inversion" UIShowInvert="-1" UIShowCurve="-1">
          <optiongroup name="flight" UILabel="Flight" exponent="1.5">
            <optiongroup name="flight_move_pitch" UILabel="Pitch" invert="0"/>
            <optiongroup name="flight_move_yaw" UILabel="Yaw" invert="0"/>
            <optiongroup name="flight_throttle_abs" UILabel="Throttle" invert="0">
              <nonlinearity_curve>
                <point in="0.5" out="0.25"/>
              </nonlinearity_curve>
            </optiongroup>
          </optiongroup>
          <optiongroup name="turret" UILabel="Turret" UIShowCurve="0">
            <optiongroup name="turret_aim_pitch" UILabel="Turret Pitch" invert="1"/>
          </optiongroup>
        </optiongroup>
      </optiongroup>
    </optiongroup>
  </optiontree>
</profile>
"#;

/// An actionmaps.xml with keyboard and joystick option blocks.
pub const SAMPLE_ACTIONMAPS: &str = r#"<ActionMaps version="1" optionsVersion="2" rebindVersion="2">
 <ActionProfiles version="1" optionsVersion="2" rebindVersion="2" profileName="default">
  <deviceoptions name="VKB Gladiator"/>
  <options type="keyboard" instance="1" Product="Keyboard {6F1D2B61-D5A0-11CF-BFC7-444553540000}">
   <fps_view_pitch invert="1"/>
  </options>
  <options type="joystick" instance="1" Product="VKB Gladiator {0200231D-0000}">
   <flight_move_pitch invert="1"/>
   <flight_move_yaw invert="0" exponent="2"/>
   <flight_throttle_abs>
    <nonlinearity_curve>
     <point in="0.3" out="0.1"/>
     <point in="0.7" out="0.6"/>
    </nonlinearity_curve>
   </flight_throttle_abs>
  </options>
  <options type="joystick" instance="2" Product="VKB Throttle"/>
  <actionmap name="spaceship_movement">
   <action name="v_pitch">
    <rebind input="js1_y"/>
   </action>
  </actionmap>
 </ActionProfiles>
</ActionMaps>
"#;

/// Builds trees from [`SAMPLE_OPTION_TREES`].
pub fn sample_trees() -> DeviceTrees {
    let raw = parse_option_trees(SAMPLE_OPTION_TREES).expect("sample option trees parse");
    DeviceTrees::from_raw(&raw)
}

/// Builds a session over the sample trees with default options.
pub fn sample_session() -> Session {
    Session::new(sample_trees(), SessionOptions::default())
}

/// Path of a display node by short name for the current selection's class.
pub fn display_path(session: &Session, class: DeviceClass, name: &str) -> String {
    session
        .display_tree(class)
        .and_then(|tree| tree.find_by_name(name))
        .unwrap_or_else(|| panic!("{name} is in the {class} display tree"))
        .path
        .clone()
}

/// Writes `content` into `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture file");
    path
}

/// Writes [`SAMPLE_OPTION_TREES`] into a temp directory.
pub fn temp_option_trees() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_file(temp_dir.path(), "defaultProfile.xml", SAMPLE_OPTION_TREES);
    (path, temp_dir)
}

/// Saves a profile with inverted joystick pitch (instance 1) and keyboard yaw.
pub fn write_sample_profile(dir: &Path) -> PathBuf {
    let mut session = sample_session();
    let now = Instant::now();

    let yaw = display_path(&session, DeviceClass::Keyboard, "fps_view_yaw");
    session.set(&yaw, SettingValue::Invert(true), now);

    session
        .select(DeviceClass::Joystick, 1)
        .expect("joystick instance 1 exists");
    let pitch = display_path(&session, DeviceClass::Joystick, "flight_move_pitch");
    session.set(&pitch, SettingValue::Invert(true), now);

    let profile = ProfileService::snapshot(&session, "Sample HOTAS");
    let path = ProfileService::path_for(dir, "Sample HOTAS");
    ProfileService::save(&profile, &path).expect("save sample profile");
    path
}

/// Loads a profile file written by the CLI.
pub fn read_profile(path: &Path) -> ControlsFile {
    ProfileService::load(path).expect("load profile")
}

/// Path to the joymapper binary.
pub fn joymapper_bin() -> String {
    std::env::var("CARGO_BIN_EXE_joymapper")
        .unwrap_or_else(|_| "target/debug/joymapper".to_string())
}

/// Creates a Command with an isolated config directory.
///
/// Share `config_dir` between commands to observe config changes.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(joymapper_bin());
    cmd.env("JOYMAPPER_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}
