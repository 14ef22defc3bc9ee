// TuneSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TuneSift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TuneSift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Profile mining
// =============================================================================

/// Default number of most frequent categories kept in a profile.
pub const DEFAULT_K_CATEGORIES: usize = 3;

/// Default number of most frequent tags kept in a profile.
pub const DEFAULT_K_TAGS: usize = 750;

/// Default number of most frequent description words kept in a profile.
pub const DEFAULT_K_DESC_WORDS: usize = 250;

/// Hard upper bound on `k_categories`. The hosting platform only defines a
/// few dozen categories, so anything larger is a configuration mistake.
pub const ABSOLUTE_MAX_K_CATEGORIES: usize = 100;

/// Hard upper bound on `k_tags` and `k_desc_words`.
pub const ABSOLUTE_MAX_K_TERMS: usize = 100_000;

/// Maximum size of a user-supplied stopwords file in bytes.
pub const MAX_STOPWORDS_FILE_SIZE: u64 = 1024 * 1024; // 1 MB

// =============================================================================
// Classification
// =============================================================================

/// Category the hosting platform assigns to music content.
pub const DEFAULT_CANONICAL_MUSIC_CATEGORY: u32 = 10;

/// Videos at or below this many seconds are treated as shorts.
pub const DEFAULT_SHORTS_THRESHOLD_SECS: u64 = 60;

/// Upper bound on the shorts threshold (one day).
pub const MAX_SHORTS_THRESHOLD_SECS: u64 = 86_400;

/// Default number of worker threads for parallel classification.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Hard upper bound on configured worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

// =============================================================================
// Metadata provider
// =============================================================================

/// Ids per metadata request; the hosting API accepts at most 50 per call.
pub const DEFAULT_PROVIDER_BATCH_SIZE: usize = 50;

/// Hard upper bound on the configured provider batch size.
pub const MAX_PROVIDER_BATCH_SIZE: usize = 500;

// =============================================================================
// Profile store
// =============================================================================

/// Schema version of the persisted profile envelope.
///
/// Increment whenever the on-disk layout changes incompatibly. Older files
/// are rejected with `ProfileLoadError::UnsupportedVersion`.
pub const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Maximum size of a persisted profile file in bytes.
pub const MAX_PROFILE_FILE_SIZE: u64 = 64 * 1024 * 1024; // 64 MB

// =============================================================================
// Review exchange
// =============================================================================

/// Column in the review sheet holding the human decision.
pub const REVIEW_DECISION_COLUMN: &str = "Is_Music_Manual";

/// Column identifying the video in every exchanged table.
pub const VIDEO_ID_COLUMN: &str = "VideoID";

/// Value pre-filled into the decision column of a fresh review sheet.
pub const REVIEW_DEFAULT_DECISION: &str = "N";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum number of title characters included in per-record debug output.
pub const DEBUG_MAX_TITLE_PREVIEW: usize = 80;

// =============================================================================
// Output files
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default persisted profile file name (stored in the platform data directory).
pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Per-record classification table written by `classify`.
pub const CLASSIFIED_FILE_NAME: &str = "classified.csv";

/// Records labelled Music without review.
pub const MUSIC_FILE_NAME: &str = "music.csv";

/// Review sheet holding the Maybe bucket.
pub const REVIEW_FILE_NAME: &str = "review.csv";

/// Full classification results including excluded shorts.
pub const RESULTS_FILE_NAME: &str = "results.json";
