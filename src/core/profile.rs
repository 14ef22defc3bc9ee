// TuneSift - core/profile.rs
//
// Reference-profile mining: tallies categories, tags, and description words
// over a corpus known to contain music videos and keeps the top-k of each.
// Core layer: accepts records already in memory, never touches the filesystem.
// Persistence is handled by app::profile_store.

use crate::core::model::{CorpusProfile, VideoRecord};
use crate::core::text::{self, StopWords};
use crate::util::constants;
use crate::util::error::BuildError;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;

/// How many entries of each list a mined profile keeps.
///
/// These are tuning knobs, not part of the classification contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileConfig {
    pub k_categories: usize,
    pub k_tags: usize,
    pub k_desc_words: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            k_categories: constants::DEFAULT_K_CATEGORIES,
            k_tags: constants::DEFAULT_K_TAGS,
            k_desc_words: constants::DEFAULT_K_DESC_WORDS,
        }
    }
}

/// Statistics gathered while mining, for logging and the CLI summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningReport {
    /// Records that contributed to the tallies.
    pub records_used: usize,

    /// Records dropped because their category was missing or not an integer.
    pub records_skipped: usize,

    /// Share of used records (0-100) whose category made the top-k list.
    pub category_coverage_pct: f64,

    /// Distinct tags seen before truncation.
    pub distinct_tags: usize,

    /// Distinct description words seen before truncation.
    pub distinct_desc_words: usize,
}

// =============================================================================
// Tallying
// =============================================================================

/// Frequency counter that remembers first-seen order so ties stay stable.
struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Top `k` by count descending. `sort_by_key` is stable, so entries with
    /// equal counts keep their first-seen order.
    fn top(mut self, k: usize) -> Vec<(K, usize)> {
        self.entries.sort_by_key(|(_, count)| Reverse(*count));
        self.entries.truncate(k);
        self.entries
    }
}

// =============================================================================
// Mining
// =============================================================================

/// Mine `corpus` into a profile.
///
/// Fails with `BuildError::EmptyCorpus` when there is nothing usable to mine.
/// Deterministic: the same records in the same order always give the same
/// profile.
pub fn build(
    corpus: &[VideoRecord],
    config: &ProfileConfig,
    stopwords: &StopWords,
) -> Result<CorpusProfile, BuildError> {
    build_with_report(corpus, config, stopwords).map(|(profile, _)| profile)
}

/// Same as [`build`], also returning mining statistics.
pub fn build_with_report(
    corpus: &[VideoRecord],
    config: &ProfileConfig,
    stopwords: &StopWords,
) -> Result<(CorpusProfile, MiningReport), BuildError> {
    if corpus.is_empty() {
        return Err(BuildError::EmptyCorpus { skipped: 0 });
    }

    let mut categories: Tally<u32> = Tally::new();
    let mut tags: Tally<String> = Tally::new();
    let mut words: Tally<String> = Tally::new();
    let mut used = 0usize;
    let mut skipped = 0usize;

    for record in corpus {
        let Some(category_id) = record.category_id else {
            tracing::warn!(
                video_id = %record.video_id,
                "Reference record has no integer category; skipped from mining"
            );
            skipped += 1;
            continue;
        };
        used += 1;
        categories.add(category_id);

        for tag in record.tags.iter().flatten() {
            let folded = text::case_fold(tag.trim());
            if !folded.is_empty() {
                tags.add(folded);
            }
        }

        if let Some(description) = &record.description {
            for token in text::tokens(description) {
                if !stopwords.contains(&token) && !text::is_punctuation_only(&token) {
                    words.add(token);
                }
            }
        }
    }

    if used == 0 {
        return Err(BuildError::EmptyCorpus { skipped });
    }

    let distinct_tags = tags.distinct();
    let distinct_desc_words = words.distinct();

    let profile = CorpusProfile {
        categories: categories.top(config.k_categories),
        tags: tags.top(config.k_tags),
        desc_words: words.top(config.k_desc_words),
    };

    let covered: usize = profile.categories.iter().map(|(_, count)| count).sum();
    let report = MiningReport {
        records_used: used,
        records_skipped: skipped,
        category_coverage_pct: covered as f64 / used as f64 * 100.0,
        distinct_tags,
        distinct_desc_words,
    };

    tracing::info!(
        records = used,
        skipped,
        categories = profile.categories.len(),
        tags = profile.tags.len(),
        desc_words = profile.desc_words.len(),
        coverage_pct = report.category_coverage_pct,
        "Reference profile mined"
    );

    Ok((profile, report))
}

// =============================================================================
// Tests
// =============================================================================
