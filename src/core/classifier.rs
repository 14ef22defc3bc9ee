// TuneSift - core/classifier.rs
//
// Reduces the three signals plus the canonical-category override into a
// verdict, after a shorts pre-filter. Also hosts the batch pass that fans
// records out over a rayon pool and partitions them into buckets.
//
// Rule order per record:
//   1. duration <= threshold (or unknown)         -> ExcludedAsShort, terminal
//   2. category == canonical OR all three signals -> Music
//   3. no signal at all                           -> NotMusic
//   4. anything else                              -> Maybe (deferred to review)

use crate::core::model::{ClassificationResult, Label, Signals, VideoRecord};
use crate::core::scorer::SignalScorer;
use crate::util::constants;
use rayon::prelude::*;

/// Classification parameters. One classifier covers every variant of the
/// rule; only these values differ between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Category the platform uses for music; always wins when present.
    pub canonical_music_category: u32,

    /// Videos this long or shorter are excluded before any rule runs.
    pub shorts_threshold_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            canonical_music_category: constants::DEFAULT_CANONICAL_MUSIC_CATEGORY,
            shorts_threshold_secs: constants::DEFAULT_SHORTS_THRESHOLD_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// True when `video` is removed by the shorts pre-filter. A record whose
    /// length is unknown is never shown to exceed the threshold, so it is
    /// excluded as well.
    pub fn is_short(&self, video: &VideoRecord) -> bool {
        video
            .duration_secs
            .map_or(true, |secs| secs <= self.config.shorts_threshold_secs)
    }

    /// Verdict for one record given its signals.
    pub fn classify(&self, video: &VideoRecord, signals: Signals) -> Label {
        if self.is_short(video) {
            return Label::ExcludedAsShort;
        }
        if video.category_id == Some(self.config.canonical_music_category) || signals.all() {
            Label::Music
        } else if signals.none() {
            Label::NotMusic
        } else {
            Label::Maybe
        }
    }

    /// Score and classify one record. Shorts are not scored and carry all
    /// checks `false`.
    pub fn evaluate(&self, video: &VideoRecord, scorer: &SignalScorer) -> ClassificationResult {
        if self.is_short(video) {
            return ClassificationResult::new(
                &video.video_id,
                Signals::default(),
                Label::ExcludedAsShort,
            );
        }
        let signals = scorer.score(video);
        let label = self.classify(video, signals);
        tracing::trace!(
            video_id = %video.video_id,
            title = %video
                .title
                .chars()
                .take(constants::DEBUG_MAX_TITLE_PREVIEW)
                .collect::<String>(),
            category = signals.category,
            tags = signals.tags,
            description = signals.description,
            label = %label,
            "Record classified"
        );
        ClassificationResult::new(&video.video_id, signals, label)
    }
}

// =============================================================================
// Batch pass
// =============================================================================

/// Classify every record in parallel against a shared read-only scorer.
///
/// The output is index-aligned with `records`, independent of which worker
/// finished first.
pub fn classify_batch(
    records: &[VideoRecord],
    scorer: &SignalScorer,
    classifier: &Classifier,
) -> Vec<ClassificationResult> {
    let results: Vec<ClassificationResult> = records
        .par_iter()
        .map(|record| classifier.evaluate(record, scorer))
        .collect();

    tracing::debug!(records = results.len(), "Batch classification complete");
    results
}

/// Records split by verdict, each bucket in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub music: Vec<VideoRecord>,
    pub maybe: Vec<VideoRecord>,
    pub not_music: Vec<VideoRecord>,
    pub excluded_shorts: Vec<VideoRecord>,
}

impl Buckets {
    /// Split `records` using index-aligned `results` from [`classify_batch`].
    ///
    /// Pairs are matched by position and checked by video id; a mismatched
    /// pair is logged and dropped rather than filed under the wrong verdict.
    pub fn partition(records: &[VideoRecord], results: &[ClassificationResult]) -> Self {
        let mut buckets = Self::default();
        for (record, result) in records.iter().zip(results) {
            if record.video_id != result.video_id {
                tracing::warn!(
                    record = %record.video_id,
                    result = %result.video_id,
                    "Result does not belong to record; dropped"
                );
                continue;
            }
            let bucket = match result.label {
                Label::Music => &mut buckets.music,
                Label::Maybe => &mut buckets.maybe,
                Label::NotMusic => &mut buckets.not_music,
                Label::ExcludedAsShort => &mut buckets.excluded_shorts,
            };
            bucket.push(record.clone());
        }
        buckets
    }

    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Music => self.music.len(),
            Label::Maybe => self.maybe.len(),
            Label::NotMusic => self.not_music.len(),
            Label::ExcludedAsShort => self.excluded_shorts.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::CorpusProfile;
    use crate::core::text::StopWords;

    const ALL: Signals = Signals {
        category: true,
        tags: true,
        description: true,
    };

    fn video(category: Option<u32>, duration: Option<u64>) -> VideoRecord {
        VideoRecord {
            category_id: category,
            duration_secs: duration,
            ..VideoRecord::new("v", "title")
        }
    }

    fn every_signal_combination() -> Vec<Signals> {
        let mut out = Vec::new();
        for category in [false, true] {
            for tags in [false, true] {
                for description in [false, true] {
                    out.push(Signals {
                        category,
                        tags,
                        description,
                    });
                }
            }
        }
        out
    }

    #[test]
    fn test_canonical_category_is_always_music() {
        let c = Classifier::default();
        for signals in every_signal_combination() {
            assert_eq!(c.classify(&video(Some(10), Some(61)), signals), Label::Music);
        }
    }

    #[test]
    fn test_shorts_are_excluded_regardless_of_signals() {
        let c = Classifier::default();
        for duration in [0, 1, 59, 60] {
            for signals in every_signal_combination() {
                assert_eq!(
                    c.classify(&video(Some(10), Some(duration)), signals),
                    Label::ExcludedAsShort
                );
            }
        }
    }

    #[test]
    fn test_unknown_duration_is_excluded() {
        let c = Classifier::default();
        assert_eq!(c.classify(&video(Some(10), None), ALL), Label::ExcludedAsShort);
    }

    #[test]
    fn test_no_signals_is_not_music() {
        let c = Classifier::default();
        assert_eq!(
            c.classify(&video(Some(22), Some(200)), Signals::default()),
            Label::NotMusic
        );
        assert_eq!(
            c.classify(&video(None, Some(200)), Signals::default()),
            Label::NotMusic
        );
    }

    #[test]
    fn test_all_signals_is_music() {
        let c = Classifier::default();
        assert_eq!(c.classify(&video(Some(24), Some(180)), ALL), Label::Music);
    }

    #[test]
    fn test_partial_signals_are_maybe() {
        let c = Classifier::default();
        for signals in every_signal_combination() {
            if signals.all() || signals.none() {
                continue;
            }
            assert_eq!(c.classify(&video(Some(25), Some(200)), signals), Label::Maybe);
        }
    }

    #[test]
    fn test_custom_config() {
        let c = Classifier::new(ClassifierConfig {
            canonical_music_category: 24,
            shorts_threshold_secs: 120,
        });
        assert_eq!(
            c.classify(&video(Some(24), Some(121)), Signals::default()),
            Label::Music
        );
        assert_eq!(
            c.classify(&video(Some(10), Some(121)), Signals::default()),
            Label::NotMusic
        );
        assert_eq!(
            c.classify(&video(Some(24), Some(120)), ALL),
            Label::ExcludedAsShort
        );
    }

    fn batch_fixture() -> (Vec<VideoRecord>, SignalScorer) {
        let profile = CorpusProfile {
            categories: vec![(10, 5), (24, 2)],
            tags: vec![("pop".to_string(), 3)],
            desc_words: vec![("official".to_string(), 2)],
        };
        let scorer = SignalScorer::new(&profile, StopWords::english());
        let mk = |id: &str, cat: u32, dur: u64, tags: &[&str], desc: &str| VideoRecord {
            category_id: Some(cat),
            duration_secs: Some(dur),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            description: Some(desc.to_string()),
            ..VideoRecord::new(id, id)
        };
        let records = vec![
            mk("music", 10, 200, &[], ""),
            mk("short", 10, 30, &["pop"], "official"),
            mk("maybe", 22, 200, &["pop"], "nothing"),
            mk("not", 22, 200, &["vlog"], "daily life"),
            mk("all", 24, 200, &["pop"], "official"),
        ];
        (records, scorer)
    }

    #[test]
    fn test_batch_preserves_input_order_and_partitions() {
        let (records, scorer) = batch_fixture();
        let results = classify_batch(&records, &scorer, &Classifier::default());

        let ids: Vec<&str> = results.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["music", "short", "maybe", "not", "all"]);

        let labels: Vec<Label> = results.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                Label::Music,
                Label::ExcludedAsShort,
                Label::Maybe,
                Label::NotMusic,
                Label::Music
            ]
        );

        // The short was never scored.
        assert_eq!(results[1].signals(), Signals::default());

        let buckets = Buckets::partition(&records, &results);
        assert_eq!(buckets.count(Label::Music), 2);
        assert_eq!(buckets.music[0].video_id, "music");
        assert_eq!(buckets.music[1].video_id, "all");
        assert_eq!(buckets.count(Label::Maybe), 1);
        assert_eq!(buckets.count(Label::NotMusic), 1);
        assert_eq!(buckets.count(Label::ExcludedAsShort), 1);
    }

    #[test]
    fn test_batch_is_deterministic() {
        let (records, scorer) = batch_fixture();
        let classifier = Classifier::default();
        let first = classify_batch(&records, &scorer, &classifier);
        for _ in 0..5 {
            assert_eq!(classify_batch(&records, &scorer, &classifier), first);
        }
    }

    #[test]
    fn test_partition_drops_mismatched_pairs() {
        let (records, _) = batch_fixture();
        let results = vec![ClassificationResult::new(
            "someone-else",
            Signals::default(),
            Label::Music,
        )];
        let buckets = Buckets::partition(&records, &results);
        assert!(buckets.music.is_empty());
    }
}
