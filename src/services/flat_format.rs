//! Conversion between path-keyed buckets and flat, name-keyed option lists.
//!
//! The flat list is what gets persisted and merged into external binding
//! files. It has no notion of paths: every entry is keyed by the option's
//! short name and only carries values explicitly set on that node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::node::short_name;
use crate::models::{Curve, CurveMode, DeviceClass, Node, Point, SettingsRecord, IDENTITY_EXPONENT};
use crate::services::settings_store::Bucket;

/// Curve points in the flat format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCurve {
    /// Control points, in authoring order
    #[serde(default)]
    pub points: Vec<Point>,
}

/// One option in the flat format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    /// Option short name
    pub name: String,
    /// Explicit inversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    /// Response exponent (1 alongside a curve)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    /// Response curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<FlatCurve>,
}

impl FlatEntry {
    /// Entry with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invert: None,
            exponent: None,
            curve: None,
        }
    }

    /// Returns true if the entry carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invert.is_none() && self.exponent.is_none() && self.curve.is_none()
    }

    /// Curve points, if any were given.
    #[must_use]
    pub fn curve_points(&self) -> Option<&[Point]> {
        self.curve
            .as_ref()
            .map(|c| c.points.as_slice())
            .filter(|p| !p.is_empty())
    }

    fn merge(&mut self, other: Self) {
        self.invert = self.invert.or(other.invert);
        if self.exponent.is_none() && self.curve.is_none() {
            self.exponent = other.exponent;
            self.curve = other.curve;
        }
    }
}

/// Flat options for one device class instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatGroup {
    /// Device class
    pub device_class: DeviceClass,
    /// Instance number (1 for keyboard)
    pub instance: u32,
    /// Options
    pub options: Vec<FlatEntry>,
}

/// Converts one record into its flat entry, if it persists anything.
///
/// Only the record's own values count. An exponent equal to the identity is
/// never written; an active curve forces the exponent to the identity.
#[must_use]
pub fn entry_from_record(name: &str, record: &SettingsRecord) -> Option<FlatEntry> {
    let mut entry = FlatEntry::named(name);
    entry.invert = record.invert;

    match record.curve_mode {
        Some(CurveMode::Curve) => {
            if let Some(curve) = record.curve.as_ref().filter(|c| c.has_points()) {
                entry.exponent = Some(IDENTITY_EXPONENT);
                entry.curve = Some(FlatCurve {
                    points: curve.points.clone(),
                });
            }
        }
        Some(CurveMode::Exponent) => {
            entry.exponent = record.exponent.filter(|e| *e != IDENTITY_EXPONENT);
        }
        None => {}
    }

    (!entry.is_empty()).then_some(entry)
}

/// Flattens a bucket into name-keyed entries.
///
/// Paths sharing a short name (the same option in the inversion and curves
/// sections) are merged into one entry in first-appearance order. Returns
/// `None` when nothing would be persisted.
#[must_use]
pub fn to_flat_list(bucket: &Bucket) -> Option<Vec<FlatEntry>> {
    let mut entries: Vec<FlatEntry> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for (path, record) in bucket {
        let name = short_name(path);
        let Some(entry) = entry_from_record(name, record) else {
            continue;
        };
        match index.get(name) {
            Some(&i) => entries[i].merge(entry),
            None => {
                index.insert(name.to_string(), entries.len());
                entries.push(entry);
            }
        }
    }

    (!entries.is_empty()).then_some(entries)
}

/// Rebuilds a bucket from flat entries.
///
/// Every value of an entry is stored under one key: the path of the first
/// node (pre-order) named like the entry, which is the editable node in the
/// inversion section. With no matching node the bare name is used.
#[must_use]
pub fn from_flat_list(entries: &[FlatEntry], tree: Option<&Node>) -> Bucket {
    let mut bucket = Bucket::new();

    for entry in entries {
        if entry.is_empty() {
            continue;
        }
        let record = bucket.entry(resolve_path(tree, &entry.name)).or_default();
        if let Some(invert) = entry.invert {
            record.invert = Some(invert);
        }
        if let Some(points) = entry.curve_points() {
            record.curve_mode = Some(CurveMode::Curve);
            record.curve = Some(Curve {
                reset: false,
                points: points.to_vec(),
            });
        } else if let Some(exponent) = entry.exponent {
            record.curve_mode = Some(CurveMode::Exponent);
            record.exponent = Some(exponent);
        }
    }

    debug!(
        entries = entries.len(),
        records = bucket.len(),
        "rebuilt settings from flat list"
    );
    bucket
}

/// Resolves the storage key for an option name: the first node (pre-order)
/// with that name, else the bare name.
#[must_use]
pub fn resolve_path(tree: Option<&Node>, name: &str) -> String {
    tree.and_then(|t| t.find_by_name(name))
        .map_or_else(|| name.to_string(), |node| node.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::display::{build_display_tree, DisplayOptions};
    use crate::services::hierarchy::DeviceTrees;

    fn record(
        invert: Option<bool>,
        mode: Option<CurveMode>,
        exponent: Option<f64>,
        points: &[(f64, f64)],
    ) -> SettingsRecord {
        SettingsRecord {
            invert,
            curve_mode: mode,
            exponent,
            curve: (!points.is_empty()).then(|| Curve {
                reset: false,
                points: points.iter().map(|&(i, o)| Point::new(i, o)).collect(),
            }),
        }
    }

    fn joystick_display_tree() -> Node {
        let trees = DeviceTrees::fallback();
        build_display_tree(
            &trees.tree(DeviceClass::Joystick).root,
            DeviceClass::Joystick,
            DisplayOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_identity_exponent_is_dropped() {
        let mut bucket = Bucket::new();
        let exponent = record(None, Some(CurveMode::Exponent), Some(1.0), &[]);
        bucket.insert("a.b".into(), exponent);
        assert!(to_flat_list(&bucket).is_none());
    }

    #[test]
    fn test_curve_forces_identity_exponent() {
        let entry = entry_from_record(
            "pitch",
            &record(Some(true), Some(CurveMode::Curve), Some(2.5), &[(0.5, 0.2)]),
        )
        .unwrap();
        assert_eq!(entry.invert, Some(true));
        assert_eq!(entry.exponent, Some(1.0));
        assert_eq!(entry.curve.unwrap().points.len(), 1);
    }

    #[test]
    fn test_inactive_representation_not_persisted() {
        // curve stored but exponent mode active
        let stale_curve = record(None, Some(CurveMode::Exponent), Some(2.0), &[(0.5, 0.2)]);
        let entry = entry_from_record("p", &stale_curve).unwrap();
        assert_eq!(entry.exponent, Some(2.0));
        assert!(entry.curve.is_none());

        // curve mode with no points persists nothing
        let empty_curve = record(None, Some(CurveMode::Curve), Some(2.0), &[]);
        assert!(entry_from_record("p", &empty_curve).is_none());
    }

    #[test]
    fn test_same_name_entries_merge() {
        let mut bucket = Bucket::new();
        let exponent = record(None, Some(CurveMode::Exponent), Some(2.0), &[]);
        bucket.insert("x.inversion.pitch".into(), record(Some(true), None, None, &[]));
        bucket.insert("x.sensitivity_curves.pitch".into(), exponent);
        let list = to_flat_list(&bucket).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].invert, Some(true));
        assert_eq!(list[0].exponent, Some(2.0));
    }

    #[test]
    fn test_curve_wins_over_exponent_on_load() {
        let entry = FlatEntry {
            exponent: Some(1.0),
            curve: Some(FlatCurve {
                points: vec![Point::new(0.3, 0.1)],
            }),
            ..FlatEntry::named("pitch")
        };
        let bucket = from_flat_list(&[entry], None);
        let record = &bucket["pitch"];
        assert_eq!(record.curve_mode, Some(CurveMode::Curve));
        assert!(record.exponent.is_none());
    }

    #[test]
    fn test_exponent_on_inversion_leaf_round_trips() {
        let tree = joystick_display_tree();
        let pitch = tree.children[0].find_by_name("flight_move_pitch").unwrap();

        let mut bucket = Bucket::new();
        let exponent = record(None, Some(CurveMode::Exponent), Some(2.0), &[]);
        bucket.insert(pitch.path.clone(), exponent);

        let list = to_flat_list(&bucket).unwrap();
        let rebuilt = from_flat_list(&list, Some(&tree));
        assert_eq!(rebuilt, bucket);
        assert_eq!(rebuilt[&pitch.path].exponent, Some(2.0));
    }

    #[test]
    fn test_entry_values_share_one_key() {
        let tree = joystick_display_tree();
        let inversion = &tree.children[0];
        let pitch = inversion.find_by_name("flight_move_pitch").unwrap();
        let throttle = inversion.find_by_name("flight_throttle_abs").unwrap();

        let mut bucket = Bucket::new();
        let pitch_record = record(Some(true), Some(CurveMode::Exponent), Some(2.0), &[]);
        let throttle_record = record(None, Some(CurveMode::Curve), None, &[(0.2, 0.1), (0.7, 0.6)]);
        bucket.insert(pitch.path.clone(), pitch_record);
        bucket.insert(throttle.path.clone(), throttle_record);

        let list = to_flat_list(&bucket).unwrap();
        let rebuilt = from_flat_list(&list, Some(&tree));
        assert_eq!(rebuilt, bucket);
        assert!(rebuilt.keys().all(|k| !k.contains("sensitivity_curves")));
    }

    #[test]
    fn test_unknown_name_uses_bare_key() {
        assert_eq!(resolve_path(None, "mystery"), "mystery");
        let tree = joystick_display_tree();
        assert_eq!(resolve_path(Some(&tree), "mystery"), "mystery");
    }
}
