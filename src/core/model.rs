// TuneSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Video record (input to mining and classification)
// =============================================================================

/// Metadata for one video, as produced by a metadata provider.
///
/// Read-only to the core. Fields the provider could not interpret are
/// `None` rather than errors: a non-integer category or an unparsable
/// duration simply never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable external identifier; unique key across every table.
    pub video_id: String,

    pub title: String,

    /// Platform category. `None` when absent or not an integer.
    pub category_id: Option<u32>,

    /// Raw publish timestamp as delivered by the provider.
    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default)]
    pub channel_title: Option<String>,

    /// Free-text description. `None` when the provider had none.
    pub description: Option<String>,

    /// Ordered tags. `None` when the video carries no tags at all.
    pub tags: Option<Vec<String>>,

    /// Length in whole seconds. `None` when unknown or unparsable.
    pub duration_secs: Option<u64>,
}

impl VideoRecord {
    /// Minimal record with only an id and title; used by tests and fakes.
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            category_id: None,
            published_at: None,
            channel_title: None,
            description: None,
            tags: None,
            duration_secs: None,
        }
    }
}

// =============================================================================
// Corpus profile (output of mining, input to scoring)
// =============================================================================

/// Statistical picture of what a music video looks like, mined from a
/// reference corpus.
///
/// Each list is sorted by count descending with ties in first-seen order,
/// holds no duplicate keys, and is complete on its own (the three lists are
/// never cross-filtered). Scoring only uses the keys as sets; the counts and
/// order are kept for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusProfile {
    /// `(category_id, count)` pairs.
    pub categories: Vec<(u32, usize)>,

    /// `(case-folded tag, count)` pairs.
    pub tags: Vec<(String, usize)>,

    /// `(case-folded description word, count)` pairs, stopwords and
    /// punctuation-only tokens excluded.
    pub desc_words: Vec<(String, usize)>,
}

impl CorpusProfile {
    /// Human-readable multi-line summary showing at most `limit` entries
    /// per list.
    pub fn describe(&self, limit: usize) -> String {
        fn section<K: std::fmt::Display>(
            out: &mut String,
            name: &str,
            items: &[(K, usize)],
            limit: usize,
        ) {
            out.push_str(&format!("{name} ({} kept)\n", items.len()));
            for (key, count) in items.iter().take(limit) {
                out.push_str(&format!("  {count:>7}  {key}\n"));
            }
            if items.len() > limit {
                out.push_str(&format!("  ... {} more\n", items.len() - limit));
            }
        }

        let mut out = String::new();
        section(&mut out, "Categories", &self.categories, limit);
        section(&mut out, "Tags", &self.tags, limit);
        section(&mut out, "Description words", &self.desc_words, limit);
        out
    }
}

// =============================================================================
// Classification
// =============================================================================

/// The three independent boolean tests of a candidate against a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signals {
    pub category: bool,
    pub tags: bool,
    pub description: bool,
}

impl Signals {
    /// True when every signal fired.
    pub fn all(&self) -> bool {
        self.category && self.tags && self.description
    }

    /// True when no signal fired.
    pub fn none(&self) -> bool {
        !self.category && !self.tags && !self.description
    }
}

/// Verdict for one record.
///
/// `Music`, `NotMusic` and `Maybe` form the tri-state verdict; a short is
/// excluded by the pre-filter before any rule is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Music,
    NotMusic,
    Maybe,
    ExcludedAsShort,
}

impl Label {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Label] {
        &[
            Label::Music,
            Label::Maybe,
            Label::NotMusic,
            Label::ExcludedAsShort,
        ]
    }

    /// Label as written to output tables.
    pub fn label(&self) -> &'static str {
        match self {
            Label::Music => "Music",
            Label::NotMusic => "NotMusic",
            Label::Maybe => "Maybe",
            Label::ExcludedAsShort => "ExcludedAsShort",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one record. Created once per record per run and
/// never updated; a re-run produces fresh results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub video_id: String,
    pub category_check: bool,
    pub tags_check: bool,
    pub description_check: bool,
    pub label: Label,
}

impl ClassificationResult {
    pub fn new(video_id: &str, signals: Signals, label: Label) -> Self {
        Self {
            video_id: video_id.to_string(),
            category_check: signals.category,
            tags_check: signals.tags,
            description_check: signals.description,
            label,
        }
    }

    pub fn signals(&self) -> Signals {
        Signals {
            category: self.category_check,
            tags: self.tags_check,
            description: self.description_check,
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// Human decisions on the Maybe bucket, keyed by video id.
///
/// An id with no entry is unreviewed and is treated as not music.
pub type ReviewDecisions = HashMap<String, bool>;

/// Whether a merged database reflects a completed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeStatus {
    /// No decisions were supplied; every Maybe item is still unresolved.
    Pending,
    /// Decisions were supplied; unreviewed items were excluded.
    Final,
}

/// Authoritative set of music videos after review, deduplicated by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalDatabase {
    pub records: Vec<VideoRecord>,
    pub status: MergeStatus,
}

impl FinalDatabase {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.records.iter().any(|r| r.video_id == video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_all_and_none() {
        let all = Signals {
            category: true,
            tags: true,
            description: true,
        };
        assert!(all.all());
        assert!(!all.none());

        let none = Signals::default();
        assert!(none.none());
        assert!(!none.all());

        let partial = Signals {
            tags: true,
            ..Default::default()
        };
        assert!(!partial.all());
        assert!(!partial.none());
    }

    #[test]
    fn test_result_round_trips_signals() {
        let signals = Signals {
            category: false,
            tags: true,
            description: true,
        };
        let result = ClassificationResult::new("abc", signals, Label::Maybe);
        assert_eq!(result.signals(), signals);
        assert_eq!(result.label.to_string(), "Maybe");
    }

    #[test]
    fn test_describe_truncates_long_lists() {
        let profile = CorpusProfile {
            categories: vec![(10, 5), (24, 2)],
            tags: vec![
                ("pop".to_string(), 3),
                ("rock".to_string(), 2),
                ("jazz".to_string(), 1),
            ],
            desc_words: vec![],
        };
        let text = profile.describe(2);
        assert!(text.contains("Categories (2 kept)"));
        assert!(text.contains("pop"));
        assert!(!text.contains("jazz"));
        assert!(text.contains("... 1 more"));
        assert!(text.contains("Description words (0 kept)"));
    }
}
