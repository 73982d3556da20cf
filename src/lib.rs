//! JoyMapper Library
//!
//! Core functionality for editing axis inversion and response curves of
//! Star Citizen control profiles: option-tree parsing, display shaping,
//! per-device settings with hierarchical inheritance, curve math, and the
//! flat sync format.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod parser;
pub mod services;
