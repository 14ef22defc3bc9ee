// TuneSift - core/scorer.rs
//
// Evaluates a candidate record against a mined profile, producing the three
// independent signals. Pure: no I/O, no mutation, safe to share across
// worker threads.

use crate::core::model::{CorpusProfile, Signals, VideoRecord};
use crate::core::text::{self, StopWords};
use std::collections::HashSet;

/// Set view of a `CorpusProfile`, prepared once per classification pass.
#[derive(Debug, Clone)]
pub struct SignalScorer {
    categories: HashSet<u32>,
    tags: HashSet<String>,
    desc_words: HashSet<String>,
    stopwords: StopWords,
}

impl SignalScorer {
    pub fn new(profile: &CorpusProfile, stopwords: StopWords) -> Self {
        Self {
            categories: profile.categories.iter().map(|(id, _)| *id).collect(),
            tags: profile.tags.iter().map(|(tag, _)| tag.clone()).collect(),
            desc_words: profile
                .desc_words
                .iter()
                .map(|(word, _)| word.clone())
                .collect(),
            stopwords,
        }
    }

    /// Score one record. Missing fields never match.
    pub fn score(&self, video: &VideoRecord) -> Signals {
        Signals {
            category: self.category_check(video),
            tags: self.tags_check(video),
            description: self.description_check(video),
        }
    }

    fn category_check(&self, video: &VideoRecord) -> bool {
        video
            .category_id
            .is_some_and(|id| self.categories.contains(&id))
    }

    fn tags_check(&self, video: &VideoRecord) -> bool {
        video
            .tags
            .iter()
            .flatten()
            .any(|tag| self.tags.contains(&text::case_fold(tag.trim())))
    }

    fn description_check(&self, video: &VideoRecord) -> bool {
        let Some(description) = &video.description else {
            return false;
        };
        text::tokens(description)
            .iter()
            .filter(|token| !self.stopwords.contains(token.as_str()))
            .any(|token| self.desc_words.contains(token.as_str()))
    }
}

/// Convenience for one-off scoring; prefer building a `SignalScorer` once
/// when scoring many records.
pub fn score(video: &VideoRecord, profile: &CorpusProfile, stopwords: &StopWords) -> Signals {
    SignalScorer::new(profile, stopwords.clone()).score(video)
}
