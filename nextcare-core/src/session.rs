//! Session profile store
//!
//! Holds the signed-in patient's current profile. Callers receive a store at
//! construction and pass profiles to the scoring functions as plain values;
//! scoring never reads the store.

use crate::profile::PatientProfile;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage for the current patient profile
pub trait SessionStore {
    /// The saved profile, or `None` when nobody is signed in
    fn current_profile(&self) -> Result<Option<PatientProfile>>;

    /// Replace the saved profile
    fn save_profile(&mut self, profile: &PatientProfile) -> Result<()>;

    /// Forget the saved profile (sign out)
    fn clear(&mut self) -> Result<()>;
}

/// In-process store; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    profile: Option<PatientProfile>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn current_profile(&self) -> Result<Option<PatientProfile>> {
        Ok(self.profile.clone())
    }

    fn save_profile(&mut self, profile: &PatientProfile) -> Result<()> {
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.profile = None;
        Ok(())
    }
}

/// Get the `.nextcare` directory under a root
pub fn nextcare_dir(root: &Path) -> PathBuf {
    root.join(".nextcare")
}

/// JSON file store at `<root>/.nextcare/session.json`
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: &Path) -> Self {
        FileSessionStore {
            path: nextcare_dir(root).join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn current_profile(&self) -> Result<Option<PatientProfile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session: {}", self.path.display()))?;
        let profile = PatientProfile::from_json(&json)
            .with_context(|| format!("corrupt session file: {}", self.path.display()))?;
        Ok(Some(profile))
    }

    fn save_profile(&mut self, profile: &PatientProfile) -> Result<()> {
        atomic_write(&self.path, &profile.to_json()?)?;
        log::debug!("saved session profile to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove session: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Write data to file atomically using temp file + rename
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents)
        .with_context(|| format!("failed to write temp file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
