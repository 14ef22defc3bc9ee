// TuneSift - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every subsystem owns an enum; all of them fold into `TuneSiftError`.
// Malformed individual records are NOT errors: they are logged and skipped.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TuneSift operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TuneSiftError {
    /// Mining a reference profile failed.
    Build(BuildError),

    /// A persisted profile could not be loaded.
    ProfileLoad(ProfileLoadError),

    /// A profile could not be persisted.
    ProfileSave(ProfileSaveError),

    /// Reading records or a watch history failed.
    Input(InputError),

    /// The manual review exchange was malformed.
    Review(ReviewError),

    /// Writing output tables failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TuneSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(e) => write!(f, "Profile build error: {e}"),
            Self::ProfileLoad(e) => write!(f, "Profile load error: {e}"),
            Self::ProfileSave(e) => write!(f, "Profile save error: {e}"),
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Review(e) => write!(f, "Review error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TuneSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Build(e) => Some(e),
            Self::ProfileLoad(e) => Some(e),
            Self::ProfileSave(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Review(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile build errors
// ---------------------------------------------------------------------------

/// Errors raised while mining a reference corpus.
#[derive(Debug)]
pub enum BuildError {
    /// The reference corpus held no usable records. `skipped` counts
    /// records that were present but dropped as malformed.
    EmptyCorpus { skipped: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCorpus { skipped: 0 } => {
                write!(f, "Reference corpus is empty; nothing to mine")
            }
            Self::EmptyCorpus { skipped } => write!(
                f,
                "Reference corpus has no usable records ({skipped} skipped as malformed)"
            ),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<BuildError> for TuneSiftError {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

// ---------------------------------------------------------------------------
// Profile store errors
// ---------------------------------------------------------------------------

/// Errors raised when a persisted profile cannot be loaded.
/// Fatal to classification: without a profile nothing can be scored.
#[derive(Debug)]
pub enum ProfileLoadError {
    /// No profile has been stored at this location yet.
    NotFound { path: PathBuf },

    /// The backing store exists but could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The stored profile is not valid JSON or does not match the schema.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The stored profile was written with an incompatible schema version.
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// The stored profile exceeds the maximum accepted size.
    FileTooLarge { path: PathBuf, size: u64, max_size: u64 },
}

impl fmt::Display for ProfileLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(
                f,
                "No profile at '{}'. Run `tunesift build-profile` first.",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Cannot read profile '{}': {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "Profile '{}' is malformed: {source}", path.display())
            }
            Self::UnsupportedVersion {
                path,
                found,
                expected,
            } => write!(
                f,
                "Profile '{}' has schema version {found}, expected {expected}. \
                 Rebuild it with `tunesift build-profile`.",
                path.display()
            ),
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Profile '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ProfileLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ProfileLoadError> for TuneSiftError {
    fn from(e: ProfileLoadError) -> Self {
        Self::ProfileLoad(e)
    }
}

/// Errors raised when a profile cannot be persisted.
#[derive(Debug)]
pub enum ProfileSaveError {
    /// Writing the profile file (or its directory) failed.
    Io { path: PathBuf, source: io::Error },

    /// The profile could not be serialised.
    Serialise {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ProfileSaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot write profile '{}': {source}", path.display())
            }
            Self::Serialise { path, source } => {
                write!(f, "Cannot serialise profile '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ProfileSaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialise { source, .. } => Some(source),
        }
    }
}

impl From<ProfileSaveError> for TuneSiftError {
    fn from(e: ProfileSaveError) -> Self {
        Self::ProfileSave(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors reading record tables or watch histories.
#[derive(Debug)]
pub enum InputError {
    /// I/O error opening or reading an input file.
    Io { path: PathBuf, source: io::Error },

    /// CSV structure error (not a per-row field problem).
    Csv { path: PathBuf, source: csv::Error },

    /// JSON document could not be parsed.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required column is missing from a table header.
    MissingColumn { path: PathBuf, column: &'static str },

    /// A glob pattern given as input was invalid.
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// An input pattern matched no files.
    NoMatches { pattern: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot read '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV error in '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON error in '{}': {source}", path.display())
            }
            Self::MissingColumn { path, column } => {
                write!(f, "'{}' has no '{column}' column", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid input pattern '{pattern}': {source}")
            }
            Self::NoMatches { pattern } => {
                write!(f, "Input pattern '{pattern}' matched no files")
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<InputError> for TuneSiftError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Review errors
// ---------------------------------------------------------------------------

/// Errors in the manual review exchange. Missing decisions are never an
/// error; only a mapping that cannot be interpreted is.
#[derive(Debug)]
pub enum ReviewError {
    /// The review table lacks a required column.
    MissingColumn { column: &'static str },

    /// A row has a decision but no video id.
    EmptyVideoId { row: usize },

    /// A decision cell holds something other than Y or N.
    InvalidDecision {
        row: usize,
        video_id: String,
        value: String,
    },

    /// The same video id appears twice with contradicting decisions.
    ConflictingDecision { video_id: String },

    /// CSV structure error.
    Csv { source: csv::Error },

    /// The review file could not be opened.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { column } => {
                write!(f, "Review table has no '{column}' column")
            }
            Self::EmptyVideoId { row } => {
                write!(f, "Review row {row} has a decision but no video id")
            }
            Self::InvalidDecision {
                row,
                video_id,
                value,
            } => write!(
                f,
                "Review row {row} ('{video_id}'): decision '{value}' is not Y or N"
            ),
            Self::ConflictingDecision { video_id } => {
                write!(f, "Video '{video_id}' was reviewed as both Y and N")
            }
            Self::Csv { source } => write!(f, "Review table CSV error: {source}"),
            Self::Io { path, source } => {
                write!(f, "Cannot read review file '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ReviewError> for TuneSiftError {
    fn from(e: ReviewError) -> Self {
        Self::Review(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing output tables.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for TuneSiftError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for TuneSiftError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for TuneSift results.
pub type Result<T> = std::result::Result<T, TuneSiftError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_empty_corpus_message_mentions_skipped_records() {
        let none = BuildError::EmptyCorpus { skipped: 0 }.to_string();
        assert!(none.contains("empty"));

        let some = BuildError::EmptyCorpus { skipped: 4 }.to_string();
        assert!(some.contains("4 skipped"));
    }

    #[test]
    fn test_top_level_error_preserves_source_chain() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: TuneSiftError = ProfileLoadError::Io {
            path: PathBuf::from("profile.json"),
            source: io,
        }
        .into();

        assert!(err.to_string().starts_with("Profile load error"));
        let inner = err.source().expect("top-level error must expose its cause");
        assert!(inner.source().is_some(), "io cause must survive the chain");
    }
}
