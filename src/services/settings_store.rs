//! Path-keyed settings with ancestor inheritance.
//!
//! The store holds one bucket per device class and instance. A bucket maps
//! node paths to the settings explicitly made at that node. Resolution is
//! purely structural: it walks path prefixes in the bucket and never looks at
//! the option tree, so a container provides a value to its descendants only
//! if it was itself set.

use std::collections::BTreeMap;

use crate::models::node::{short_name, PATH_SEPARATOR};
use crate::models::{
    DeviceClass, DeviceSelection, Node, Resolved, SettingKind, SettingValue, SettingsRecord,
};

/// Settings for one device class instance, keyed by node path.
pub type Bucket = BTreeMap<String, SettingsRecord>;

/// In-memory settings for every device class and instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    keyboard: Bucket,
    gamepad: BTreeMap<u32, Bucket>,
    joystick: BTreeMap<u32, Bucket>,
}

impl SettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for a selection, if anything was ever written to it.
    #[must_use]
    pub fn bucket(&self, selection: DeviceSelection) -> Option<&Bucket> {
        match selection.class {
            DeviceClass::Keyboard => Some(&self.keyboard),
            DeviceClass::Gamepad => self.gamepad.get(&selection.instance),
            DeviceClass::Joystick => self.joystick.get(&selection.instance),
        }
    }

    /// Bucket for a selection, created on first use.
    pub fn bucket_mut(&mut self, selection: DeviceSelection) -> &mut Bucket {
        match selection.class {
            DeviceClass::Keyboard => &mut self.keyboard,
            DeviceClass::Gamepad => self.gamepad.entry(selection.instance).or_default(),
            DeviceClass::Joystick => self.joystick.entry(selection.instance).or_default(),
        }
    }

    /// Every non-empty bucket with its selection, keyboard first, instances ascending.
    #[must_use]
    pub fn buckets(&self) -> Vec<(DeviceSelection, &Bucket)> {
        let mut out = Vec::new();
        if !self.keyboard.is_empty() {
            out.push((DeviceSelection::keyboard(), &self.keyboard));
        }
        for (class, instances) in [
            (DeviceClass::Gamepad, &self.gamepad),
            (DeviceClass::Joystick, &self.joystick),
        ] {
            for (instance, bucket) in instances {
                if !bucket.is_empty() {
                    out.push((DeviceSelection::new(class, *instance), bucket));
                }
            }
        }
        out
    }

    /// Returns true if no bucket holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets().is_empty()
    }

    /// Record stored at exactly `path`.
    #[must_use]
    pub fn record(&self, selection: DeviceSelection, path: &str) -> Option<&SettingsRecord> {
        self.bucket(selection)?.get(path)
    }

    /// Looks up a setting made at `path`.
    ///
    /// Tries the exact path first, then the path's final segment alone. The
    /// second lookup finds records imported under an option's short name.
    #[must_use]
    pub fn get_direct(
        &self,
        selection: DeviceSelection,
        path: &str,
        kind: SettingKind,
    ) -> Option<SettingValue> {
        let bucket = self.bucket(selection)?;
        if let Some(value) = bucket.get(path).and_then(|r| r.get(kind)) {
            return Some(value);
        }
        let name = short_name(path);
        if name == path {
            return None;
        }
        bucket.get(name).and_then(|r| r.get(kind))
    }

    /// Resolves a setting, falling back to the nearest ancestor that set it.
    ///
    /// # Examples
    ///
    /// ```
    /// use joymapper::models::{DeviceSelection, SettingKind, SettingValue};
    /// use joymapper::services::SettingsStore;
    ///
    /// let mut store = SettingsStore::new();
    /// let sel = DeviceSelection::keyboard();
    /// store.set(sel, "a.b.c", SettingValue::Exponent(2.0));
    ///
    /// let default = SettingValue::Exponent(1.0);
    /// let resolved = store.get_with_inheritance(sel, "a.b.c.d", SettingKind::Exponent, default);
    /// assert_eq!(resolved.value, SettingValue::Exponent(2.0));
    /// assert!(resolved.inherited);
    /// assert_eq!(resolved.inherited_from.as_deref(), Some("c"));
    /// ```
    #[must_use]
    pub fn get_with_inheritance(
        &self,
        selection: DeviceSelection,
        path: &str,
        kind: SettingKind,
        default: SettingValue,
    ) -> Resolved<SettingValue> {
        if let Some(value) = self.get_direct(selection, path, kind) {
            return Resolved::direct(value);
        }

        for ancestor in ancestors(path) {
            if let Some(value) = self.get_direct(selection, ancestor, kind) {
                return Resolved {
                    value,
                    inherited: true,
                    inherited_from: Some(short_name(ancestor).to_string()),
                };
            }
        }

        Resolved::fallback(default)
    }

    /// Writes one setting at `path`, keeping the record's other fields.
    pub fn set(&mut self, selection: DeviceSelection, path: &str, value: SettingValue) {
        self.bucket_mut(selection)
            .entry(path.to_string())
            .or_default()
            .set(value);
    }

    /// Removes the record at `path` (descendants keep theirs).
    ///
    /// Returns true if a record was removed.
    pub fn reset_node(&mut self, selection: DeviceSelection, path: &str) -> bool {
        match selection.class {
            DeviceClass::Keyboard => self.keyboard.remove(path).is_some(),
            DeviceClass::Gamepad => self
                .gamepad
                .get_mut(&selection.instance)
                .is_some_and(|b| b.remove(path).is_some()),
            DeviceClass::Joystick => self
                .joystick
                .get_mut(&selection.instance)
                .is_some_and(|b| b.remove(path).is_some()),
        }
    }

    /// Sets `value` on every strict descendant of `node`.
    ///
    /// The node itself is not written; a leaf is a no-op. Returns the number
    /// of records written.
    pub fn propagate_to_descendants(
        &mut self,
        selection: DeviceSelection,
        node: &Node,
        value: &SettingValue,
    ) -> usize {
        let descendants = node.descendants();
        for descendant in &descendants {
            self.set(selection, &descendant.path, value.clone());
        }
        descendants.len()
    }
}

/// Ancestor paths of `path`, nearest first.
///
/// ```
/// use joymapper::services::settings_store::ancestors;
///
/// let chain: Vec<_> = ancestors("a.b.c").collect();
/// assert_eq!(chain, ["a.b", "a"]);
/// ```
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.char_indices()
        .rev()
        .filter(|(_, c)| *c == PATH_SEPARATOR)
        .map(move |(i, _)| &path[..i])
}
