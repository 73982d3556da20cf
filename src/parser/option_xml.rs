//! Reader for the game's `<optiontree>` XML.
//!
//! The default profile shipped with the game describes one `<optiontree>` per
//! device class:
//!
//! ```xml
//! <optiontree type="joystick" instances="8" sensitivityMin="0.01" sensitivityMax="2">
//!   <optiongroup name="master" UILabel="@ui_COMaster" UIShowInvert="-1">
//!     <optiongroup name="flight_move_pitch" invert="0" exponent="1">
//!       <nonlinearity_curve reset="1"/>
//!     </optiongroup>
//!   </optiongroup>
//! </optiontree>
//! ```

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::models::DeviceClass;
use crate::parser::option_tree::{RawCurve, RawFlag, RawOptionGroup, RawOptionTree, RawPoint};

/// Built-in option trees used when no game profile is available.
pub const FALLBACK_OPTION_TREES: &str = include_str!("default_optiontree.xml");

/// Parses every `<optiontree>` element in `xml`.
///
/// Trees whose `type` is not a known device class are skipped. Multiple
/// top-level `<optiongroup>` elements inside one tree are wrapped in a
/// synthetic group named after the device class.
pub fn parse_option_trees(xml: &str) -> Result<Vec<RawOptionTree>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut trees = Vec::new();
    let mut tree: Option<RawOptionTree> = None;
    let mut top_level: Vec<RawOptionGroup> = Vec::new();
    let mut stack: Vec<RawOptionGroup> = Vec::new();
    let mut curve: Option<RawCurve> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML parse error at byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"optiontree" => {
                        let attrs = read_attributes(e)?;
                        tree = tree_from_attributes(&attrs);
                        top_level.clear();
                        stack.clear();
                        if is_empty {
                            if let Some(done) = tree.take() {
                                trees.push(done);
                            }
                        }
                    }
                    b"optiongroup" if tree.is_some() => {
                        let group = group_from_attributes(&read_attributes(e)?);
                        if is_empty {
                            attach_group(group, &mut stack, &mut top_level);
                        } else {
                            stack.push(group);
                        }
                    }
                    b"nonlinearity_curve" if tree.is_some() => {
                        let attrs = read_attributes(e)?;
                        let reset = lookup(&attrs, "reset")
                            .is_some_and(|v| RawFlag::from(v).is_true());
                        let parsed = RawCurve {
                            reset,
                            points: Vec::new(),
                        };
                        if is_empty {
                            attach_curve(parsed, &mut stack);
                        } else {
                            curve = Some(parsed);
                        }
                    }
                    b"point" => {
                        if let Some(current) = curve.as_mut() {
                            // reset short-circuits point collection
                            if !current.reset {
                                if let Some(point) = point_from_attributes(&read_attributes(e)?) {
                                    current.points.push(point);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"optiontree" => {
                    if let Some(mut done) = tree.take() {
                        // Unbalanced groups are closed implicitly
                        while let Some(group) = stack.pop() {
                            attach_group(group, &mut stack, &mut top_level);
                        }
                        done.root =
                            wrap_top_level(std::mem::take(&mut top_level), done.device_class);
                        debug!(
                            device = %done.device_class,
                            instances = done.instances,
                            "parsed option tree"
                        );
                        trees.push(done);
                    }
                }
                b"optiongroup" if tree.is_some() => {
                    if let Some(group) = stack.pop() {
                        attach_group(group, &mut stack, &mut top_level);
                    }
                }
                b"nonlinearity_curve" => {
                    if let Some(done) = curve.take() {
                        attach_curve(done, &mut stack);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(trees)
}

/// Parses the built-in fallback trees.
pub fn fallback_option_trees() -> Result<Vec<RawOptionTree>> {
    parse_option_trees(FALLBACK_OPTION_TREES).context("Built-in option trees are malformed")
}

pub(crate) fn read_attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.context("Malformed XML attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .context("Malformed XML attribute value")?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

pub(crate) fn lookup<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(crate) fn parse_f64(attrs: &[(String, String)], key: &str) -> Option<f64> {
    let raw = lookup(attrs, key)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!(attribute = key, value = raw, "ignoring non-numeric attribute");
            None
        }
    }
}

fn tree_from_attributes(attrs: &[(String, String)]) -> Option<RawOptionTree> {
    let class_name = lookup(attrs, "type").unwrap_or_default();
    let device_class = match class_name.parse::<DeviceClass>() {
        Ok(class) => class,
        Err(_) => {
            warn!(device_type = class_name, "skipping option tree for unknown device type");
            return None;
        }
    };

    let instances = lookup(attrs, "instances")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);

    Some(RawOptionTree {
        device_class,
        instances,
        sensitivity_min: parse_f64(attrs, "sensitivityMin"),
        sensitivity_max: parse_f64(attrs, "sensitivityMax"),
        root: None,
    })
}

fn group_from_attributes(attrs: &[(String, String)]) -> RawOptionGroup {
    RawOptionGroup {
        name: lookup(attrs, "name").unwrap_or_default().to_string(),
        label: lookup(attrs, "UILabel").map(str::to_string),
        show_invert: lookup(attrs, "UIShowInvert").map(RawFlag::from),
        show_curve: lookup(attrs, "UIShowCurve").map(RawFlag::from),
        show_sensitivity: lookup(attrs, "UIShowSensitivity").map(RawFlag::from),
        invert: lookup(attrs, "invert").map(RawFlag::from),
        invert_cvar: lookup(attrs, "invert_cvar").map(str::to_string),
        exponent: parse_f64(attrs, "exponent"),
        curve: None,
        children: Vec::new(),
    }
}

fn point_from_attributes(attrs: &[(String, String)]) -> Option<RawPoint> {
    match (parse_f64(attrs, "in"), parse_f64(attrs, "out")) {
        (Some(input), Some(output)) => Some(RawPoint { input, output }),
        _ => {
            warn!("skipping curve point with missing or non-numeric in/out");
            None
        }
    }
}

fn attach_group(
    group: RawOptionGroup,
    stack: &mut [RawOptionGroup],
    top_level: &mut Vec<RawOptionGroup>,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(group),
        None => top_level.push(group),
    }
}

fn attach_curve(curve: RawCurve, stack: &mut [RawOptionGroup]) {
    let Some(owner) = stack.last_mut() else {
        return;
    };
    if owner.curve.is_some() {
        warn!(option = %owner.name, "ignoring additional nonlinearity_curve");
        return;
    }
    owner.curve = Some(curve);
}

fn wrap_top_level(mut groups: Vec<RawOptionGroup>, class: DeviceClass) -> Option<RawOptionGroup> {
    match groups.len() {
        0 => None,
        1 => groups.pop(),
        _ => Some(RawOptionGroup {
            children: groups,
            ..RawOptionGroup::named(class.as_str())
        }),
    }
}
