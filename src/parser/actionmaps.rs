//! Device option blocks of the game's `actionmaps.xml`.
//!
//! Each bound device has an `<options>` element whose children are option
//! settings named after the option itself:
//!
//! ```xml
//! <options type="joystick" instance="1" Product="VKB Gladiator {0200231D-0000}">
//!  <flight_move_pitch invert="1"/>
//!  <flight_throttle_abs exponent="1">
//!   <nonlinearity_curve>
//!    <point in="0.25" out="0.2"/>
//!   </nonlinearity_curve>
//!  </flight_throttle_abs>
//! </options>
//! ```

use std::fmt::Write as _;

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::models::{DeviceClass, DeviceSelection, Point};
use crate::parser::controls_file::{ControlOptionSettings, ControlsFile};
use crate::parser::option_xml::{lookup, parse_f64, read_attributes};
use crate::services::flat_format::{FlatCurve, FlatEntry, FlatGroup};

/// One `<options>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionmapsDevice {
    /// `type` attribute (e.g. "joystick")
    pub device_type: String,
    /// `instance` attribute
    pub instance: String,
    /// `Product` attribute; empty if absent
    pub product: String,
    /// Option elements in document order
    pub options: Vec<ActionmapsOption>,
}

/// One option element inside `<options>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionmapsOption {
    /// Element name, which is the option's short name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Points of a nested `<nonlinearity_curve>`
    pub curve_points: Vec<Point>,
}

impl ActionmapsOption {
    /// Attribute value by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        lookup(&self.attributes, key)
    }
}

/// Extracts every `<options>` block.
pub fn parse_actionmaps_options(xml: &str) -> Result<Vec<ActionmapsDevice>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut devices = Vec::new();
    let mut device: Option<ActionmapsDevice> = None;
    let mut option: Option<ActionmapsOption> = None;
    let mut in_curve = false;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML parse error at byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"options" => {
                        let attrs = read_attributes(e)?;
                        let parsed = ActionmapsDevice {
                            device_type: lookup(&attrs, "type").unwrap_or_default().to_string(),
                            instance: lookup(&attrs, "instance").unwrap_or_default().to_string(),
                            product: lookup(&attrs, "Product").unwrap_or_default().to_string(),
                            options: Vec::new(),
                        };
                        if is_empty {
                            devices.push(parsed);
                        } else {
                            device = Some(parsed);
                        }
                    }
                    b"nonlinearity_curve" => in_curve = !is_empty,
                    b"point" if in_curve => {
                        let attrs = read_attributes(e)?;
                        if let Some(current) = option.as_mut() {
                            match (parse_f64(&attrs, "in"), parse_f64(&attrs, "out")) {
                                (Some(input), Some(output)) => {
                                    current.curve_points.push(Point::new(input, output));
                                }
                                _ => {
                                    warn!(option = %current.name, "skipping malformed curve point");
                                }
                            }
                        }
                    }
                    name if device.is_some() && !in_curve => {
                        let parsed = ActionmapsOption {
                            name: String::from_utf8_lossy(name).into_owned(),
                            attributes: read_attributes(e)?,
                            curve_points: Vec::new(),
                        };
                        if is_empty {
                            if let Some(current) = device.as_mut() {
                                current.options.push(parsed);
                            }
                        } else {
                            option = Some(parsed);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"options" => {
                    if let Some(done) = device.take() {
                        debug!(
                            device_type = %done.device_type,
                            instance = %done.instance,
                            options = done.options.len(),
                            "parsed device options"
                        );
                        devices.push(done);
                    }
                }
                b"nonlinearity_curve" => in_curve = false,
                _ if !in_curve => {
                    if let (Some(done), Some(current)) = (option.take(), device.as_mut()) {
                        current.options.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(devices)
}

/// Renders one `<options>` block, indented for insertion under
/// `<ActionProfiles>`.
#[must_use]
pub fn generate_options_xml(device: &ActionmapsDevice) -> String {
    let mut xml = String::new();

    let _ = write!(
        xml,
        "  <options type=\"{}\" instance=\"{}\"",
        escape(device.device_type.as_str()),
        escape(device.instance.as_str())
    );
    if !device.product.is_empty() {
        let _ = write!(xml, " Product=\"{}\"", escape(device.product.as_str()));
    }

    if device.options.is_empty() {
        xml.push_str("/>\n");
        return xml;
    }
    xml.push_str(">\n");

    for option in &device.options {
        let _ = write!(xml, "   <{}", option.name);
        for (key, value) in &option.attributes {
            let _ = write!(xml, " {key}=\"{}\"", escape(value.as_str()));
        }

        if option.curve_points.is_empty() {
            xml.push_str("/>\n");
            continue;
        }

        xml.push_str(">\n    <nonlinearity_curve>\n");
        for point in &option.curve_points {
            let _ = writeln!(xml, "     <point in=\"{}\" out=\"{}\"/>", point.input, point.output);
        }
        xml.push_str("    </nonlinearity_curve>\n");
        let _ = writeln!(xml, "   </{}>", option.name);
    }

    xml.push_str("  </options>\n");
    xml
}

/// Converts a profile into `<options>` blocks.
///
/// Only `invert` is written; exponents and curves are not carried by the
/// game through this file. Devices with nothing to write are omitted.
#[must_use]
pub fn controls_to_actionmaps(controls: &ControlsFile) -> Vec<ActionmapsDevice> {
    controls
        .instances()
        .into_iter()
        .filter_map(|(selection, settings)| {
            let options: Vec<ActionmapsOption> = settings
                .options
                .iter()
                .filter_map(|(name, option)| invert_option(name, option))
                .collect();
            (!options.is_empty()).then(|| ActionmapsDevice {
                device_type: selection.class.as_str().to_string(),
                instance: selection.instance.to_string(),
                product: settings.product.clone().unwrap_or_default(),
                options,
            })
        })
        .collect()
}

fn invert_option(name: &str, option: &ControlOptionSettings) -> Option<ActionmapsOption> {
    let invert = option.invert?;
    Some(ActionmapsOption {
        name: name.to_string(),
        attributes: vec![("invert".to_string(), if invert { "1" } else { "0" }.to_string())],
        curve_points: Vec::new(),
    })
}

/// Imports `<options>` blocks as flat groups.
///
/// Reads `invert`, `exponent` and curve points. Blocks for unknown device
/// types are skipped; a missing or invalid instance counts as 1.
#[must_use]
pub fn actionmaps_to_flat_groups(devices: &[ActionmapsDevice]) -> Vec<FlatGroup> {
    let mut groups = Vec::new();

    for device in devices {
        let Ok(class) = device.device_type.parse::<DeviceClass>() else {
            warn!(device_type = %device.device_type, "skipping options for unknown device type");
            continue;
        };
        let instance = device.instance.trim().parse::<u32>().unwrap_or(1);
        let selection = DeviceSelection::new(class, instance);

        let options: Vec<FlatEntry> = device
            .options
            .iter()
            .map(|option| FlatEntry {
                name: option.name.clone(),
                invert: option
                    .attribute("invert")
                    .map(|v| matches!(v.trim(), "1" | "true")),
                exponent: option
                    .attribute("exponent")
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .filter(|e| e.is_finite() && *e > 0.0),
                curve: (!option.curve_points.is_empty()).then(|| FlatCurve {
                    points: option.curve_points.clone(),
                }),
            })
            .filter(|entry| !entry.is_empty())
            .collect();

        if options.is_empty() {
            continue;
        }
        groups.push(FlatGroup {
            device_class: selection.class,
            instance: selection.instance,
            options,
        });
    }

    groups
}
