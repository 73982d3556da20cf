//! Data models for option trees, curves and per-path settings.
//!
//! Models are independent of parsing, display shaping and persistence.

pub mod curve;
pub mod device;
pub mod node;
pub mod settings;

// Re-export all model types
pub use curve::{Curve, CurvePreset, Point};
pub use device::{DeviceClass, DeviceSelection};
pub use node::{Capability, Node, SectionType, Visibility};
pub use settings::{
    CurveMode, Resolved, SettingKind, SettingValue, SettingsRecord, IDENTITY_EXPONENT,
};
