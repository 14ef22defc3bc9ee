// TuneSift - platform/config.rs
//
// Platform data directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::classifier::ClassifierConfig;
use crate::core::profile::ProfileConfig;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for TuneSift data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/tunesift/ or %APPDATA%\TuneSift\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the default persisted profile.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Where `build-profile` writes and `classify` reads when no explicit
    /// profile path is given.
    pub fn default_profile_path(&self) -> PathBuf {
        self.data_dir.join(constants::PROFILE_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[profile]` section.
    pub profile: ProfileSection,
    /// `[classifier]` section.
    pub classifier: ClassifierSection,
    /// `[provider]` section.
    pub provider: ProviderSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[profile]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    pub k_categories: Option<usize>,
    pub k_tags: Option<usize>,
    pub k_desc_words: Option<usize>,
    /// Replacement stopword list, one word per line.
    pub stopwords_file: Option<String>,
}

/// `[classifier]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub canonical_music_category: Option<u32>,
    pub shorts_duration_threshold_seconds: Option<u64>,
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
}

/// `[provider]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Ids per metadata request.
    pub batch_size: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time. Invalid
/// values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Profile --
    pub profile: ProfileConfig,
    /// Stopword list replacing the built-in English list.
    pub stopwords_file: Option<PathBuf>,

    // -- Classifier --
    pub classifier: ClassifierConfig,
    /// Worker threads for batch classification (0 = rayon default).
    pub worker_threads: usize,

    // -- Provider --
    pub provider_batch_size: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: ProfileConfig::default(),
            stopwords_file: None,
            classifier: ClassifierConfig::default(),
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            provider_batch_size: constants::DEFAULT_PROVIDER_BATCH_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Load and validate a config file at an explicit path.
///
/// An unreadable or unparseable file yields defaults plus a warning; the
/// application still runs but the user is told why their settings were
/// ignored.
pub fn load_config_file(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Check one optional value against an inclusive range, recording a warning
/// and keeping `target` untouched when it falls outside.
fn apply_in_range<T>(
    value: Option<T>,
    range: std::ops::RangeInclusive<T>,
    target: &mut T,
    key: &str,
    warnings: &mut Vec<String>,
) where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let Some(v) = value else {
        return;
    };
    if range.contains(&v) {
        *target = v;
    } else {
        warnings.push(format!(
            "{key} = {v} is out of range ({}-{}). Using default ({}).",
            range.start(),
            range.end(),
            target,
        ));
    }
}

fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Profile --
    apply_in_range(
        raw.profile.k_categories,
        1..=constants::ABSOLUTE_MAX_K_CATEGORIES,
        &mut config.profile.k_categories,
        "[profile] k_categories",
        warnings,
    );
    apply_in_range(
        raw.profile.k_tags,
        1..=constants::ABSOLUTE_MAX_K_TERMS,
        &mut config.profile.k_tags,
        "[profile] k_tags",
        warnings,
    );
    apply_in_range(
        raw.profile.k_desc_words,
        1..=constants::ABSOLUTE_MAX_K_TERMS,
        &mut config.profile.k_desc_words,
        "[profile] k_desc_words",
        warnings,
    );
    if let Some(file) = raw.profile.stopwords_file.filter(|f| !f.is_empty()) {
        config.stopwords_file = Some(PathBuf::from(file));
    }

    // -- Classifier --
    if let Some(category) = raw.classifier.canonical_music_category {
        config.classifier.canonical_music_category = category;
    }
    apply_in_range(
        raw.classifier.shorts_duration_threshold_seconds,
        0..=constants::MAX_SHORTS_THRESHOLD_SECS,
        &mut config.classifier.shorts_threshold_secs,
        "[classifier] shorts_duration_threshold_seconds",
        warnings,
    );
    apply_in_range(
        raw.classifier.worker_threads,
        0..=constants::MAX_WORKER_THREADS,
        &mut config.worker_threads,
        "[classifier] worker_threads",
        warnings,
    );

    // -- Provider --
    apply_in_range(
        raw.provider.batch_size,
        1..=constants::MAX_PROVIDER_BATCH_SIZE,
        &mut config.provider_batch_size,
        "[provider] batch_size",
        warnings,
    );

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file.filter(|f| !f.is_empty()) {
        config.log_file = Some(PathBuf::from(file));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.profile, ProfileConfig::default());
        assert_eq!(config.classifier, ClassifierConfig::default());
        assert_eq!(config.provider_batch_size, constants::DEFAULT_PROVIDER_BATCH_SIZE);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[profile]
k_categories = 5
k_tags = 100
k_desc_words = 40
stopwords_file = "/tmp/stop.txt"

[classifier]
canonical_music_category = 24
shorts_duration_threshold_seconds = 90
worker_threads = 4

[provider]
batch_size = 25

[logging]
level = "DEBUG"
file = "/tmp/tunesift.log"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.profile.k_categories, 5);
        assert_eq!(config.profile.k_tags, 100);
        assert_eq!(config.profile.k_desc_words, 40);
        assert_eq!(config.stopwords_file, Some(PathBuf::from("/tmp/stop.txt")));
        assert_eq!(config.classifier.canonical_music_category, 24);
        assert_eq!(config.classifier.shorts_threshold_secs, 90);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.provider_batch_size, 25);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/tunesift.log")));
    }

    #[test]
    fn test_out_of_range_values_warn_and_keep_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[profile]
k_categories = 0
k_tags = 1000000

[classifier]
shorts_duration_threshold_seconds = 100000

[provider]
batch_size = 0

[logging]
level = "verbose"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 5, "warnings: {warnings:?}");
        assert!(warnings[0].contains("k_categories"));
        assert_eq!(config.profile, ProfileConfig::default());
        assert_eq!(
            config.classifier.shorts_threshold_secs,
            constants::DEFAULT_SHORTS_THRESHOLD_SECS
        );
        assert_eq!(config.provider_batch_size, constants::DEFAULT_PROVIDER_BATCH_SIZE);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_gives_defaults_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[profile\nk_tags = ");
        let (config, warnings) = load_config_file(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Failed to parse"));
        assert_eq!(config.profile, ProfileConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[future]\nsetting = true\n[profile]\nk_tags = 10\n");
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.profile.k_tags, 10);
    }
}
