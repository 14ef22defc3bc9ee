// TuneSift - app/pipeline.rs
//
// End-to-end orchestration of the four stages behind the CLI subcommands:
//   history        watch-history JSON  -> watched.csv
//   build-profile  reference tables    -> persisted profile
//   classify       details + profile   -> classified / music / review / results
//   merge          music + review      -> final database
//
// Every stage reads its inputs from disk, calls into the core layer, and
// writes its outputs. Per-record problems are logged and skipped; only
// whole-input failures are returned as errors.

use crate::app::profile_store::ProfileStore;
use crate::app::provider::{self, CsvMetadataProvider};
use crate::app::review_io;
use crate::core::classifier::{self, Buckets, Classifier, ClassifierConfig};
use crate::core::export;
use crate::core::history::{self, WatchSpan, WatchedVideo};
use crate::core::model::{
    ClassificationResult, CorpusProfile, FinalDatabase, Label, MergeStatus, VideoRecord,
};
use crate::core::profile::{self, MiningReport, ProfileConfig};
use crate::core::review;
use crate::core::scorer::SignalScorer;
use crate::core::text::StopWords;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{ConfigError, ExportError, InputError, Result, TuneSiftError};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Shared helpers
// =============================================================================

/// Stopwords from the configured file, or the built-in English list.
pub fn load_stopwords(config: &AppConfig) -> Result<StopWords> {
    let Some(path) = config.stopwords_file.as_deref() else {
        return Ok(StopWords::english());
    };

    let content = fs::read_capped(path, constants::MAX_STOPWORDS_FILE_SIZE)
        .map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .ok_or_else(|| ConfigError::ValueOutOfRange {
            field: "[profile] stopwords_file".to_string(),
            value: path.display().to_string(),
            expected: format!(
                "a file of at most {} bytes",
                constants::MAX_STOPWORDS_FILE_SIZE
            ),
        })?;

    let stopwords = StopWords::parse(&content);
    tracing::info!(
        path = %path.display(),
        words = stopwords.len(),
        "Custom stopword list loaded"
    );
    Ok(stopwords)
}

/// Create (truncating) an output file behind a buffered writer.
fn create_output(path: &Path) -> std::result::Result<BufWriter<std::fs::File>, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Flush a buffered output so write errors surface here instead of on drop.
fn finish_output(
    mut writer: BufWriter<std::fs::File>,
    path: &Path,
) -> std::result::Result<(), ExportError> {
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_records_to(path: &Path, records: &[VideoRecord]) -> Result<usize> {
    let mut out = create_output(path)?;
    let count = export::write_records_csv(records, &mut out, path)?;
    finish_output(out, path)?;
    Ok(count)
}

// =============================================================================
// history
// =============================================================================

/// Extract distinct watched videos from a Takeout history file and, when
/// `out` is given, write them as a table whose `VideoID` column feeds
/// `classify --ids`.
pub fn extract_history(
    history_path: &Path,
    out: Option<&Path>,
) -> Result<(Vec<WatchedVideo>, Option<WatchSpan>)> {
    let json = fs::read_file_lossy(history_path).map_err(|e| InputError::Io {
        path: history_path.to_path_buf(),
        source: e,
    })?;
    let videos = history::parse_watch_history(&json, history_path)?;
    let span = history::watch_span(&videos);

    if let Some(span) = span {
        tracing::info!(
            earliest = %span.earliest,
            latest = %span.latest,
            days = span.days(),
            months = span.approx_months(),
            "Watch history span"
        );
    }

    if let Some(out_path) = out {
        let mut writer = create_output(out_path)?;
        let count = export::write_watched_csv(&videos, &mut writer, out_path)?;
        finish_output(writer, out_path)?;
        tracing::info!(path = %out_path.display(), rows = count, "Watched videos written");
    }

    Ok((videos, span))
}

// =============================================================================
// build-profile
// =============================================================================

/// Read the reference corpus, mine a profile, and persist it through `store`.
pub fn mine_profile(
    corpus_patterns: &[String],
    config: &ProfileConfig,
    stopwords: &StopWords,
    store: &mut dyn ProfileStore,
) -> Result<(CorpusProfile, MiningReport)> {
    let corpus = provider::read_corpus(corpus_patterns)?;
    let (profile, report) = profile::build_with_report(&corpus, config, stopwords)?;
    store.save(&profile)?;
    Ok((profile, report))
}

// =============================================================================
// classify
// =============================================================================

/// Records of one classification run with their index-aligned results.
#[derive(Debug, Clone)]
pub struct ClassificationRun {
    pub records: Vec<VideoRecord>,
    pub results: Vec<ClassificationResult>,
    pub buckets: Buckets,
}

impl ClassificationRun {
    /// Maybe-bucket records paired with their results, for the review sheet.
    pub fn review_items(&self) -> Vec<(&VideoRecord, &ClassificationResult)> {
        self.records
            .iter()
            .zip(&self.results)
            .filter(|(_, result)| result.label == Label::Maybe)
            .collect()
    }
}

/// Classify `records` against `profile`.
///
/// `worker_threads == 0` uses rayon's global pool; any other value runs the
/// batch on a dedicated pool of that size.
pub fn classify_records(
    records: Vec<VideoRecord>,
    profile: &CorpusProfile,
    stopwords: StopWords,
    classifier_config: ClassifierConfig,
    worker_threads: usize,
) -> ClassificationRun {
    let scorer = SignalScorer::new(profile, stopwords);
    let classifier = Classifier::new(classifier_config);

    let run_batch = || classifier::classify_batch(&records, &scorer, &classifier);
    let results = if worker_threads == 0 {
        run_batch()
    } else {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .build()
        {
            Ok(pool) => pool.install(run_batch),
            Err(e) => {
                tracing::warn!(
                    threads = worker_threads,
                    error = %e,
                    "Cannot build worker pool; using the global pool"
                );
                run_batch()
            }
        }
    };

    let buckets = Buckets::partition(&records, &results);
    tracing::info!(
        records = records.len(),
        music = buckets.count(Label::Music),
        maybe = buckets.count(Label::Maybe),
        not_music = buckets.count(Label::NotMusic),
        shorts = buckets.count(Label::ExcludedAsShort),
        "Classification complete"
    );

    ClassificationRun {
        records,
        results,
        buckets,
    }
}

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub classified: PathBuf,
    pub music: PathBuf,
    pub review: PathBuf,
    pub results: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            classified: dir.join(constants::CLASSIFIED_FILE_NAME),
            music: dir.join(constants::MUSIC_FILE_NAME),
            review: dir.join(constants::REVIEW_FILE_NAME),
            results: dir.join(constants::RESULTS_FILE_NAME),
        }
    }
}

/// Write the four classification outputs into `out_dir`.
pub fn write_outputs(run: &ClassificationRun, out_dir: &Path) -> Result<OutputPaths> {
    std::fs::create_dir_all(out_dir).map_err(|e| TuneSiftError::Io {
        path: out_dir.to_path_buf(),
        operation: "create output directory",
        source: e,
    })?;
    let paths = OutputPaths::in_dir(out_dir);

    let mut out = create_output(&paths.classified)?;
    let classified =
        export::write_classification_csv(&run.records, &run.results, &mut out, &paths.classified)?;
    finish_output(out, &paths.classified)?;

    let music = write_records_to(&paths.music, &run.buckets.music)?;

    let mut out = create_output(&paths.review)?;
    let review = export::write_review_sheet(&run.review_items(), &mut out, &paths.review)?;
    finish_output(out, &paths.review)?;

    let mut out = create_output(&paths.results)?;
    export::write_results_json(&run.results, &mut out, &paths.results)?;
    finish_output(out, &paths.results)?;

    tracing::info!(
        dir = %out_dir.display(),
        classified,
        music,
        review,
        "Classification outputs written"
    );
    Ok(paths)
}

/// Full `classify` stage: look up metadata, classify, write outputs.
///
/// With `ids` the details table is queried for those ids in that order;
/// without, every row of the table is classified.
pub fn classify_from_details(
    details_path: &Path,
    ids: Option<&[String]>,
    profile: &CorpusProfile,
    config: &AppConfig,
    stopwords: StopWords,
    out_dir: &Path,
) -> Result<(ClassificationRun, OutputPaths)> {
    let details = CsvMetadataProvider::from_path(details_path, config.provider_batch_size)?;
    let wanted = match ids {
        Some(ids) => ids.to_vec(),
        None => details.ids(),
    };
    let records = provider::fetch_all(&details, &wanted)?;

    let run = classify_records(
        records,
        profile,
        stopwords,
        config.classifier,
        config.worker_threads,
    );
    let paths = write_outputs(&run, out_dir)?;
    Ok((run, paths))
}

// =============================================================================
// merge
// =============================================================================

/// Merge the music table with the Maybe items admitted in the review sheet
/// and write the final database to `out`.
///
/// `decisions` is usually the reviewed copy of `review.csv`. Without it the
/// result holds the music table only and is marked pending.
pub fn finalize(
    music_path: &Path,
    maybe_path: &Path,
    decisions: Option<&Path>,
    out: &Path,
) -> Result<FinalDatabase> {
    let music = provider::read_records_file(music_path)?;
    let maybe = provider::read_records_file(maybe_path)?;
    let decisions = decisions
        .map(review_io::read_decisions_file)
        .transpose()?;

    let database = review::merge(&music, &maybe, decisions.as_ref());
    let rows = write_records_to(out, &database.records)?;

    if database.status == MergeStatus::Pending {
        tracing::warn!(
            path = %out.display(),
            maybe = maybe.len(),
            "No review decisions supplied; the database is pending review"
        );
    }
    tracing::info!(path = %out.display(), rows, "Final database written");
    Ok(database)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::profile_store::InMemoryProfileStore;
    use tempfile::TempDir;

    fn rec(id: &str, category: u32, duration: u64, tags: &[&str], desc: &str) -> VideoRecord {
        VideoRecord {
            category_id: Some(category),
            duration_secs: Some(duration),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            description: Some(desc.to_string()),
            ..VideoRecord::new(id, format!("title {id}"))
        }
    }

    fn profile() -> CorpusProfile {
        CorpusProfile {
            categories: vec![(10, 4), (24, 1)],
            tags: vec![("pop".to_string(), 3)],
            desc_words: vec![("official".to_string(), 3)],
        }
    }

    fn sample_records() -> Vec<VideoRecord> {
        vec![
            rec("music", 10, 200, &["rock"], "live"),
            rec("maybe", 22, 200, &["pop"], "a vlog"),
            rec("not", 22, 200, &["vlog"], "daily"),
            rec("short", 10, 40, &["pop"], "official"),
        ]
    }

    #[test]
    fn test_classify_records_on_dedicated_pool() {
        let global = classify_records(
            sample_records(),
            &profile(),
            StopWords::english(),
            ClassifierConfig::default(),
            0,
        );
        let pooled = classify_records(
            sample_records(),
            &profile(),
            StopWords::english(),
            ClassifierConfig::default(),
            2,
        );
        assert_eq!(global.results, pooled.results);
        assert_eq!(global.buckets.count(Label::Music), 1);
        assert_eq!(global.review_items().len(), 1);
        assert_eq!(global.review_items()[0].0.video_id, "maybe");
    }

    #[test]
    fn test_write_outputs_creates_all_files() {
        let dir = TempDir::new().unwrap();
        let run = classify_records(
            sample_records(),
            &profile(),
            StopWords::english(),
            ClassifierConfig::default(),
            0,
        );
        let paths = write_outputs(&run, &dir.path().join("out")).unwrap();

        let classified = std::fs::read_to_string(&paths.classified).unwrap();
        assert_eq!(classified.lines().count(), 4, "header plus three non-short rows");

        let review = std::fs::read_to_string(&paths.review).unwrap();
        assert!(review.contains("maybe"));
        assert!(!review.contains("title music"));

        let music = provider::read_records_file(&paths.music).unwrap();
        assert_eq!(music.len(), 1);
        assert_eq!(music[0], run.buckets.music[0]);

        let results: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.results).unwrap()).unwrap();
        assert_eq!(results.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_mine_profile_saves_to_store() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("ref.csv");
        std::fs::write(
            &corpus,
            "VideoID,CategoryID,Tags,Description\na,10,pop|dance,Official video\nb,10,pop,lyrics\n",
        )
        .unwrap();

        let mut store = InMemoryProfileStore::new();
        let (profile, report) = mine_profile(
            &[corpus.display().to_string()],
            &ProfileConfig::default(),
            &StopWords::english(),
            &mut store,
        )
        .unwrap();

        assert_eq!(report.records_used, 2);
        assert_eq!(profile.tags[0], ("pop".to_string(), 2));
        assert_eq!(store.load().unwrap(), profile);
    }

    #[test]
    fn test_mine_profile_empty_corpus_fails() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("ref.csv");
        std::fs::write(&corpus, "VideoID,CategoryID\n").unwrap();

        let mut store = InMemoryProfileStore::new();
        let result = mine_profile(
            &[corpus.display().to_string()],
            &ProfileConfig::default(),
            &StopWords::english(),
            &mut store,
        );
        assert!(matches!(result, Err(TuneSiftError::Build(_))));
        assert!(store.load().is_err(), "nothing is saved on failure");
    }

    #[test]
    fn test_custom_stopwords_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "# custom\nofficial\n").unwrap();

        let config = AppConfig {
            stopwords_file: Some(path),
            ..AppConfig::default()
        };
        let stopwords = load_stopwords(&config).unwrap();
        assert!(stopwords.contains("official"));
        assert!(!stopwords.contains("the"));

        let missing = AppConfig {
            stopwords_file: Some(dir.path().join("absent.txt")),
            ..AppConfig::default()
        };
        assert!(matches!(
            load_stopwords(&missing),
            Err(TuneSiftError::Config(ConfigError::Io { .. }))
        ));
    }
}
