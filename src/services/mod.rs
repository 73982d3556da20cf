//! Service layer for business logic.
//!
//! This module contains the engine proper: curve evaluation, tree building
//! and display shaping, the settings store and its flat format, and the
//! session that ties them together.

pub mod curve_math;
pub mod display;
pub mod flat_format;
pub mod hierarchy;
pub mod profiles;
pub mod session;
pub mod settings_store;
pub mod sync;

// Re-export commonly used types and functions
pub use display::{build_display_tree, DisplayOptions};
pub use flat_format::{from_flat_list, to_flat_list, FlatCurve, FlatEntry, FlatGroup};
pub use hierarchy::{DeviceTree, DeviceTrees};
pub use profiles::ProfileService;
pub use session::{Session, SessionOptions};
pub use settings_store::{Bucket, SettingsStore};
pub use sync::{SyncScheduler, SyncSink};
