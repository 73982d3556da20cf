//! Editing session: one loaded profile and everything derived from it.
//!
//! A [`Session`] replaces ambient global state. It owns the built option
//! trees, their display trees, the settings store, the current device
//! selection and the debounced sync. Independent sessions never share data.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::DEFAULT_SYNC_DEBOUNCE_MS;
use crate::models::{DeviceClass, DeviceSelection, Node, Resolved, SettingKind, SettingValue};
use crate::services::display::{build_display_tree, DisplayOptions};
use crate::services::flat_format::{from_flat_list, to_flat_list, FlatEntry, FlatGroup};
use crate::services::hierarchy::{DeviceTree, DeviceTrees};
use crate::services::settings_store::SettingsStore;
use crate::services::sync::{SyncScheduler, SyncSink};

/// Session construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Which display sections to build
    pub display: DisplayOptions,
    /// Sync debounce interval
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            display: DisplayOptions::default(),
            debounce: Duration::from_millis(DEFAULT_SYNC_DEBOUNCE_MS),
        }
    }
}

impl SessionOptions {
    /// Options taken from the application config.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            display: config.display_options(),
            debounce: config.debounce(),
        }
    }
}

/// State for one loaded profile.
#[derive(Debug, Clone)]
pub struct Session {
    trees: DeviceTrees,
    display: BTreeMap<DeviceClass, Node>,
    store: SettingsStore,
    selection: DeviceSelection,
    dirty: bool,
    sync: SyncScheduler,
}

impl Session {
    /// Creates a session over built trees with an empty store.
    #[must_use]
    pub fn new(trees: DeviceTrees, options: SessionOptions) -> Self {
        let display = trees
            .iter()
            .filter_map(|tree| {
                build_display_tree(&tree.root, tree.class, options.display)
                    .map(|node| (tree.class, node))
            })
            .collect();

        Self {
            trees,
            display,
            store: SettingsStore::new(),
            selection: DeviceSelection::keyboard(),
            dirty: false,
            sync: SyncScheduler::new(options.debounce),
        }
    }

    /// Creates a session from the application config.
    ///
    /// The configured default profile supplies the trees; without one, or if
    /// it cannot be read, the built-in trees are used.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let trees = DeviceTrees::load_or_fallback(config.paths.default_profile.as_deref());
        Self::new(trees, SessionOptions::from_config(config))
    }

    /// Built tree for a class.
    #[must_use]
    pub fn tree(&self, class: DeviceClass) -> &DeviceTree {
        self.trees.tree(class)
    }

    /// Display tree for a class; `None` when the class has no editable options.
    #[must_use]
    pub fn display_tree(&self, class: DeviceClass) -> Option<&Node> {
        self.display.get(&class)
    }

    /// Current device selection.
    #[must_use]
    pub const fn selection(&self) -> DeviceSelection {
        self.selection
    }

    /// Selects the device class and instance that later operations act on.
    pub fn select(&mut self, class: DeviceClass, instance: u32) -> Result<()> {
        let selection = DeviceSelection::new(class, instance);
        let available = self.trees.tree(class).instances;
        if selection.instance > available {
            anyhow::bail!(
                "{} instance {} out of range (1..={})",
                class.display_name(),
                selection.instance,
                available
            );
        }
        self.selection = selection;
        Ok(())
    }

    /// Settings store.
    #[must_use]
    pub const fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Replaces the store wholesale, as on profile load. Clears the dirty flag.
    pub fn replace_store(&mut self, store: SettingsStore) {
        self.store = store;
        self.dirty = false;
        self.sync.cancel();
    }

    /// Returns true if there are edits not yet saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Setting made at `path` in the current selection.
    #[must_use]
    pub fn get_direct(&self, path: &str, kind: SettingKind) -> Option<SettingValue> {
        self.store.get_direct(self.selection, path, kind)
    }

    /// Effective setting at `path`, inherited from ancestors when unset.
    #[must_use]
    pub fn get_with_inheritance(
        &self,
        path: &str,
        kind: SettingKind,
        default: SettingValue,
    ) -> Resolved<SettingValue> {
        self.store
            .get_with_inheritance(self.selection, path, kind, default)
    }

    /// Writes a setting, marks the session dirty and restarts the sync timer.
    pub fn set(&mut self, path: &str, value: SettingValue, now: Instant) {
        debug!(device = %self.selection, path, setting = value.kind().as_str(), "set");
        self.store.set(self.selection, path, value);
        self.touch(now);
    }

    /// Reverts one node to inherited or default resolution.
    pub fn reset_node(&mut self, path: &str, now: Instant) -> bool {
        let removed = self.store.reset_node(self.selection, path);
        if removed {
            self.touch(now);
        }
        removed
    }

    /// Writes `value` on every strict descendant of the display node at `path`.
    pub fn propagate_to_descendants(
        &mut self,
        path: &str,
        value: &SettingValue,
        now: Instant,
    ) -> Result<usize> {
        let class = self.selection.class;
        let node = self
            .display
            .get(&class)
            .and_then(|tree| tree.find(path))
            .with_context(|| format!("No {} option at '{}'", class.display_name(), path))?;

        let written = self
            .store
            .propagate_to_descendants(self.selection, node, value);
        if written > 0 {
            self.touch(now);
        }
        Ok(written)
    }

    /// Flat list for the current selection; `None` if nothing is set.
    #[must_use]
    pub fn to_flat_list(&self) -> Option<Vec<FlatEntry>> {
        self.store.bucket(self.selection).and_then(to_flat_list)
    }

    /// Flat lists for every bucket with something to persist.
    #[must_use]
    pub fn to_flat_groups(&self) -> Vec<FlatGroup> {
        self.store
            .buckets()
            .into_iter()
            .filter_map(|(selection, bucket)| {
                to_flat_list(bucket).map(|options| FlatGroup {
                    device_class: selection.class,
                    instance: selection.instance,
                    options,
                })
            })
            .collect()
    }

    /// Loads flat entries into the current selection's bucket.
    ///
    /// Records for the resolved paths are replaced; other paths are kept.
    pub fn from_flat_list(&mut self, entries: &[FlatEntry]) {
        let rebuilt = from_flat_list(entries, self.display.get(&self.selection.class));
        self.store.bucket_mut(self.selection).extend(rebuilt);
    }

    /// Loads every group into its own bucket without changing the selection.
    pub fn apply_flat_groups(&mut self, groups: &[FlatGroup]) {
        for group in groups {
            let selection = DeviceSelection::new(group.device_class, group.instance);
            let rebuilt = from_flat_list(&group.options, self.display.get(&group.device_class));
            self.store.bucket_mut(selection).extend(rebuilt);
        }
    }

    /// Fires the pending sync if its debounce window has passed.
    ///
    /// The export is read now, so a burst of edits is delivered once with
    /// its final state. Sink failures are logged and leave the store as is.
    /// Returns true if the sink was called.
    pub fn poll_sync(&mut self, now: Instant, sink: &mut dyn SyncSink) -> bool {
        if !self.sync.poll(now) {
            return false;
        }

        let groups = self.to_flat_groups();
        debug!(groups = groups.len(), "firing sync");
        if let Err(e) = sink.sync(&groups) {
            warn!(error = %format!("{e:#}"), "sync failed");
        }
        true
    }

    /// Returns true if a sync is waiting for its debounce window.
    #[must_use]
    pub const fn sync_pending(&self) -> bool {
        self.sync.is_pending()
    }

    fn touch(&mut self, now: Instant) {
        self.dirty = true;
        self.sync.schedule(now);
    }
}
