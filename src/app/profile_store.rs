// TuneSift - app/profile_store.rs
//
// Persistence of mined corpus profiles between the build and classify runs.
//
// Design principles:
// - The profile is saved atomically (write temp, rename final) so a crash
//   during save never corrupts the previous good profile.
// - Unlike a UI session, a profile that cannot be loaded is fatal: without
//   it nothing can be scored, so every failure surfaces as a typed error.
// - The on-disk envelope carries a schema version; a mismatch is rejected
//   rather than guessed at.

use crate::core::model::CorpusProfile;
use crate::platform::fs;
use crate::util::constants::{MAX_PROFILE_FILE_SIZE, PROFILE_SCHEMA_VERSION};
use crate::util::error::{ProfileLoadError, ProfileSaveError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Capability to persist and recover a corpus profile.
pub trait ProfileStore {
    fn save(&mut self, profile: &CorpusProfile) -> Result<(), ProfileSaveError>;
    fn load(&self) -> Result<CorpusProfile, ProfileLoadError>;
}

// =============================================================================
// On-disk envelope
// =============================================================================

/// Versioned wrapper written around the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    /// Schema version; must equal `PROFILE_SCHEMA_VERSION` to be accepted.
    pub version: u32,

    /// When the profile was mined.
    pub created_at: DateTime<Utc>,

    pub profile: CorpusProfile,
}

/// Only the version field, read first so an incompatible layout reports
/// its version instead of a confusing field error.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

// =============================================================================
// JSON file store
// =============================================================================

/// Profile stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full envelope, including its creation timestamp.
    pub fn load_stored(&self) -> Result<StoredProfile, ProfileLoadError> {
        let path = &self.path;
        if !path.exists() {
            return Err(ProfileLoadError::NotFound { path: path.clone() });
        }

        let io_err = |e| ProfileLoadError::Io {
            path: path.clone(),
            source: e,
        };
        let content = fs::read_capped(path, MAX_PROFILE_FILE_SIZE)
            .map_err(io_err)?
            .ok_or_else(|| ProfileLoadError::FileTooLarge {
                path: path.clone(),
                size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
                max_size: MAX_PROFILE_FILE_SIZE,
            })?;

        let malformed = |e| ProfileLoadError::Malformed {
            path: path.clone(),
            source: e,
        };
        let probe: VersionProbe = serde_json::from_str(&content).map_err(malformed)?;
        if probe.version != PROFILE_SCHEMA_VERSION {
            return Err(ProfileLoadError::UnsupportedVersion {
                path: path.clone(),
                found: probe.version,
                expected: PROFILE_SCHEMA_VERSION,
            });
        }

        let stored: StoredProfile = serde_json::from_str(&content).map_err(malformed)?;
        tracing::debug!(
            path = %path.display(),
            created_at = %stored.created_at,
            categories = stored.profile.categories.len(),
            tags = stored.profile.tags.len(),
            desc_words = stored.profile.desc_words.len(),
            "Profile loaded"
        );
        Ok(stored)
    }
}

impl ProfileStore for JsonProfileStore {
    fn save(&mut self, profile: &CorpusProfile) -> Result<(), ProfileSaveError> {
        let stored = StoredProfile {
            version: PROFILE_SCHEMA_VERSION,
            created_at: Utc::now(),
            profile: profile.clone(),
        };
        let json =
            serde_json::to_string_pretty(&stored).map_err(|e| ProfileSaveError::Serialise {
                path: self.path.clone(),
                source: e,
            })?;

        fs::write_atomic(&self.path, json.as_bytes()).map_err(|e| ProfileSaveError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::info!(path = %self.path.display(), "Profile saved");
        Ok(())
    }

    fn load(&self) -> Result<CorpusProfile, ProfileLoadError> {
        self.load_stored().map(|stored| stored.profile)
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Profile held in memory; used by tests and single-process pipelines.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profile: Option<CorpusProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn save(&mut self, profile: &CorpusProfile) -> Result<(), ProfileSaveError> {
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn load(&self) -> Result<CorpusProfile, ProfileLoadError> {
        self.profile.clone().ok_or_else(|| ProfileLoadError::NotFound {
            path: PathBuf::from("<memory>"),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
