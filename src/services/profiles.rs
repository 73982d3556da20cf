//! Profile file I/O service.
//!
//! This module centralizes all `.sccontrols` file operations, providing a
//! consistent interface for loading, saving, and listing profiles.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::CONTROLS_FILE_EXTENSION;
use crate::parser::ControlsFile;
use crate::services::session::Session;
use crate::services::settings_store::SettingsStore;

/// Service for managing profile file I/O operations.
pub struct ProfileService;

impl ProfileService {
    /// Loads a profile from a `.sccontrols` file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the profile file to load
    ///
    /// # Returns
    ///
    /// * `Ok(ControlsFile)` - Successfully parsed profile
    /// * `Err(...)` - File not found, parse error, or I/O error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use joymapper::services::ProfileService;
    ///
    /// let profile = ProfileService::load(Path::new("hotas.sccontrols"))?;
    /// println!("{}", profile.profile_name);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<ControlsFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        ControlsFile::from_json(&content)
            .with_context(|| format!("Failed to load profile from {}", path.display()))
    }

    /// Saves a profile to a `.sccontrols` file.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile to save
    /// * `path` - Path where the profile should be saved
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Profile successfully saved
    /// * `Err(...)` - I/O error, permission error, or atomic rename failure
    pub fn save(profile: &ControlsFile, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = profile.to_json()?;
        let temp_path = path.with_extension(format!("{CONTROLS_FILE_EXTENSION}.tmp"));

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp profile {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to save profile to {}", path.display()))?;

        debug!(path = %path.display(), "saved profile");
        Ok(())
    }

    /// Lists profile files in a directory, sorted by path.
    ///
    /// A missing directory yields an empty list.
    pub fn list(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read profile directory {}", dir.display()))?;

        let mut profiles = Vec::new();
        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(CONTROLS_FILE_EXTENSION)
            {
                profiles.push(path);
            }
        }
        profiles.sort();
        Ok(profiles)
    }

    /// Path for a named profile inside `dir`.
    ///
    /// ```
    /// use std::path::Path;
    /// use joymapper::services::ProfileService;
    ///
    /// let path = ProfileService::path_for(Path::new("/profiles"), "My HOTAS");
    /// assert_eq!(path, Path::new("/profiles/my_hotas.sccontrols"));
    /// ```
    #[must_use]
    pub fn path_for(dir: &Path, profile_name: &str) -> PathBuf {
        dir.join(format!(
            "{}.{CONTROLS_FILE_EXTENSION}",
            sanitize_filename(profile_name)
        ))
    }

    /// Captures a session's settings as a profile.
    ///
    /// The saved form keeps only inversion; see [`ControlsFile::from_flat_groups`].
    #[must_use]
    pub fn snapshot(session: &Session, profile_name: &str) -> ControlsFile {
        ControlsFile::from_flat_groups(profile_name, &session.to_flat_groups())
    }

    /// Saves a session as a named profile and clears its dirty flag.
    ///
    /// Returns the profile that was written.
    pub fn save_session(
        session: &mut Session,
        profile_name: &str,
        path: &Path,
    ) -> Result<ControlsFile> {
        let profile = Self::snapshot(session, profile_name);
        Self::save(&profile, path)?;
        session.mark_saved();
        Ok(profile)
    }

    /// Replaces a session's settings with a profile's.
    pub fn apply(session: &mut Session, profile: &ControlsFile) {
        session.replace_store(SettingsStore::new());
        session.apply_flat_groups(&profile.to_flat_groups());
        debug!(profile = %profile.profile_name, "applied profile");
    }
}

/// Sanitizes a profile name for use as a filename.
///
/// Replaces problematic characters with underscores and converts to lowercase.
///
/// # Examples
///
/// ```
/// # use joymapper::services::profiles::sanitize_filename;
/// assert_eq!(sanitize_filename("My Profile"), "my_profile");
/// assert_eq!(sanitize_filename("HOTAS/Left:Stick"), "hotas_left_stick");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\', ':', ' '], "_").to_lowercase()
}
