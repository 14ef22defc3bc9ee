// TuneSift - app/provider.rs
//
// Metadata providers: turn video ids into `VideoRecord`s.
//
// The live hosting API is out of scope; records come from details tables
// written by an earlier fetch (or by `core::export::write_records_csv`).
// The batch limit mirrors the API's per-request cap so any future network
// provider slots in behind the same trait.

use crate::core::duration::parse_duration_secs;
use crate::core::model::VideoRecord;
use crate::util::constants;
use crate::util::error::InputError;
use rayon::prelude::*;
use regex::Regex;
use std::cell::Cell;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Capability to look up metadata for a batch of video ids.
pub trait MetadataProvider {
    /// Maximum ids accepted by one `fetch_batch` call.
    fn batch_limit(&self) -> usize;

    /// Records for the known ids among `ids`, in request order. Unknown ids
    /// are omitted, not errors.
    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<VideoRecord>, InputError>;
}

/// Fetch every id, chunked to the provider's batch limit, concatenating
/// results in request order.
pub fn fetch_all<P: MetadataProvider + ?Sized>(
    provider: &P,
    ids: &[String],
) -> Result<Vec<VideoRecord>, InputError> {
    let limit = provider.batch_limit().max(1);
    let mut records = Vec::with_capacity(ids.len());

    for (batch_no, chunk) in ids.chunks(limit).enumerate() {
        let batch = provider.fetch_batch(chunk)?;
        tracing::debug!(
            batch = batch_no,
            requested = chunk.len(),
            returned = batch.len(),
            "Metadata batch fetched"
        );
        records.extend(batch);
    }

    let missing = ids.len().saturating_sub(records.len());
    if missing > 0 {
        tracing::warn!(
            requested = ids.len(),
            missing,
            "Some video ids have no metadata and were skipped"
        );
    }
    Ok(records)
}

// =============================================================================
// Record table parsing
// =============================================================================

/// Quoted items of a Python-style list literal: `['a', "b's"]`.
fn python_list_items() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#)
            .expect("tag list regex is valid")
    })
}

/// Parse a `Tags` cell.
///
/// Accepts a JSON array, a Python-style list literal, or `|`-separated
/// values. An empty cell means the video has no tags.
pub fn parse_tags(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
            return Some(tags);
        }
        let tags = python_list_items()
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().replace("\\'", "'").replace("\\\"", "\""))
            .collect();
        return Some(tags);
    }

    Some(raw.split('|').map(|t| t.trim().to_string()).collect())
}

/// Column positions of a record table, resolved from its header.
struct RecordColumns {
    video_id: usize,
    title: Option<usize>,
    category_id: Option<usize>,
    published_at: Option<usize>,
    channel_title: Option<usize>,
    duration: Option<usize>,
    description: Option<usize>,
    tags: Option<usize>,
}

impl RecordColumns {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self, InputError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let video_id = find(constants::VIDEO_ID_COLUMN).ok_or_else(|| {
            InputError::MissingColumn {
                path: path.to_path_buf(),
                column: constants::VIDEO_ID_COLUMN,
            }
        })?;
        Ok(Self {
            video_id,
            title: find("Title"),
            category_id: find("CategoryID"),
            published_at: find("PublishDate"),
            channel_title: find("ChannelTitle"),
            duration: find("Duration"),
            description: find("Description"),
            tags: find("Tags"),
        })
    }
}

fn cell(row: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Category ids sometimes arrive as floats (`10.0`) from spreadsheet tools.
fn parse_category(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
            .map(|f| f as u32)
    })
}

/// Read a record table.
///
/// Only `VideoID` is required; absent columns and unparsable cells become
/// `None`. Rows without a video id are skipped with a warning.
pub fn read_records_csv<R: Read>(reader: R, path: &Path) -> Result<Vec<VideoRecord>, InputError> {
    let csv_err = |e| InputError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().map_err(csv_err)?.clone();
    let cols = RecordColumns::resolve(&headers, path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (row_no, row) in csv_reader.records().enumerate() {
        let row = row.map_err(csv_err)?;
        let Some(video_id) = cell(&row, Some(cols.video_id)) else {
            tracing::warn!(path = %path.display(), row = row_no + 1, "Row without VideoID skipped");
            skipped += 1;
            continue;
        };

        records.push(VideoRecord {
            video_id: video_id.to_string(),
            title: cell(&row, cols.title).unwrap_or_default().to_string(),
            category_id: cell(&row, cols.category_id).and_then(parse_category),
            published_at: cell(&row, cols.published_at).map(str::to_string),
            channel_title: cell(&row, cols.channel_title).map(str::to_string),
            description: cell(&row, cols.description).map(str::to_string),
            tags: cell(&row, cols.tags).and_then(parse_tags),
            duration_secs: cell(&row, cols.duration).and_then(parse_duration_secs),
        });
    }

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        skipped,
        "Record table read"
    );
    Ok(records)
}

/// Open and read one record table from disk.
pub fn read_records_file(path: &Path) -> Result<Vec<VideoRecord>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_records_csv(std::io::BufReader::new(file), path)
}

/// Read the `VideoID` column of any table (e.g. the output of `history`).
pub fn read_id_list(path: &Path) -> Result<Vec<String>, InputError> {
    Ok(read_records_file(path)?
        .into_iter()
        .map(|r| r.video_id)
        .collect())
}

// =============================================================================
// Input expansion
// =============================================================================

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand input arguments into file paths, in argument order.
///
/// Plain paths are taken as given; arguments with glob characters are
/// expanded (sorted), and a pattern matching nothing is an error.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, InputError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !has_glob_chars(pattern) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(|e| InputError::InvalidPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        let before = paths.len();
        for entry in entries {
            let path = entry.map_err(|e| InputError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            return Err(InputError::NoMatches {
                pattern: pattern.clone(),
            });
        }
    }
    Ok(paths)
}

/// Read and concatenate every reference table matched by `patterns`.
///
/// Files are read in parallel; records keep file order, then row order.
pub fn read_corpus(patterns: &[String]) -> Result<Vec<VideoRecord>, InputError> {
    let paths = expand_inputs(patterns)?;
    tracing::info!(files = paths.len(), "Reading reference corpus");

    let tables: Vec<Vec<VideoRecord>> = paths
        .par_iter()
        .map(|path| read_records_file(path))
        .collect::<Result<_, _>>()?;

    Ok(tables.into_iter().flatten().collect())
}

// =============================================================================
// Providers
// =============================================================================

/// Records indexed by video id, shared by both providers.
#[derive(Debug, Clone, Default)]
struct RecordIndex {
    records: Vec<VideoRecord>,
    by_id: HashMap<String, usize>,
}

impl RecordIndex {
    fn build(records: Vec<VideoRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if index.by_id.contains_key(&record.video_id) {
                tracing::warn!(video_id = %record.video_id, "Duplicate metadata row ignored");
                continue;
            }
            index.by_id.insert(record.video_id.clone(), index.records.len());
            index.records.push(record);
        }
        index
    }

    fn lookup(&self, ids: &[String]) -> Vec<VideoRecord> {
        ids.iter()
            .filter_map(|id| {
                let found = self.by_id.get(id).map(|&i| self.records[i].clone());
                if found.is_none() {
                    tracing::debug!(video_id = %id, "No metadata for video");
                }
                found
            })
            .collect()
    }
}

/// Provider backed by a details table loaded once at construction.
#[derive(Debug, Clone)]
pub struct CsvMetadataProvider {
    index: RecordIndex,
    batch_limit: usize,
}

impl CsvMetadataProvider {
    pub fn from_path(path: &Path, batch_limit: usize) -> Result<Self, InputError> {
        let records = read_records_file(path)?;
        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "Metadata table loaded"
        );
        Ok(Self::from_records(records, batch_limit))
    }

    pub fn from_records(records: Vec<VideoRecord>, batch_limit: usize) -> Self {
        Self {
            index: RecordIndex::build(records),
            batch_limit,
        }
    }

    /// Every id in the table, in file order.
    pub fn ids(&self) -> Vec<String> {
        self.index
            .records
            .iter()
            .map(|r| r.video_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.records.is_empty()
    }
}

impl MetadataProvider for CsvMetadataProvider {
    fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<VideoRecord>, InputError> {
        Ok(self.index.lookup(ids))
    }
}

/// In-memory provider that counts the batches it serves.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    index: RecordIndex,
    batch_limit: usize,
    batches_served: Cell<usize>,
}

impl InMemoryProvider {
    pub fn new(records: Vec<VideoRecord>, batch_limit: usize) -> Self {
        Self {
            index: RecordIndex::build(records),
            batch_limit,
            batches_served: Cell::new(0),
        }
    }

    pub fn batches_served(&self) -> usize {
        self.batches_served.get()
    }
}

impl MetadataProvider for InMemoryProvider {
    fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<VideoRecord>, InputError> {
        assert!(
            ids.len() <= self.batch_limit.max(1),
            "batch of {} exceeds limit {}",
            ids.len(),
            self.batch_limit
        );
        self.batches_served.set(self.batches_served.get() + 1);
        Ok(self.index.lookup(ids))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DETAILS: &str = "\
VideoID,Title,CategoryID,PublishDate,ChannelTitle,Duration,Description,Tags
v1,Artist - Song,10,2020-01-01T00:00:00Z,ArtistVEVO,PT3M30S,Official video,\"['pop', 'dance']\"
v2,Vlog day 3,22,,Someone,PT12M,\"daily life\",\"[\"\"vlog\"\"]\"
,Orphan row,10,,,PT3M,,
v3,Mystery,n/a,,,not-a-duration,,rock|indie
";

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_tags_formats() {
        assert_eq!(
            parse_tags(r#"["pop", "rock"]"#),
            Some(vec!["pop".to_string(), "rock".to_string()])
        );
        assert_eq!(
            parse_tags(r#"['pop', "rock n' roll", 'it\'s']"#),
            Some(ids(&["pop", "rock n' roll", "it's"]))
        );
        assert_eq!(parse_tags("pop | rock"), Some(ids(&["pop", "rock"])));
        assert_eq!(parse_tags("[]"), Some(vec![]));
        assert_eq!(parse_tags("   "), None);
    }

    #[test]
    fn test_read_records_csv() {
        let records = read_records_csv(DETAILS.as_bytes(), Path::new("d.csv")).unwrap();
        assert_eq!(records.len(), 3, "row without VideoID is skipped");

        let v1 = &records[0];
        assert_eq!(v1.video_id, "v1");
        assert_eq!(v1.category_id, Some(10));
        assert_eq!(v1.duration_secs, Some(210));
        assert_eq!(v1.channel_title.as_deref(), Some("ArtistVEVO"));
        assert_eq!(v1.tags, Some(ids(&["pop", "dance"])));

        assert_eq!(records[1].tags, Some(ids(&["vlog"])));
        assert!(records[1].published_at.is_none());

        let v3 = &records[2];
        assert_eq!(v3.category_id, None);
        assert_eq!(v3.duration_secs, None);
        assert!(v3.description.is_none());
        assert_eq!(v3.tags, Some(ids(&["rock", "indie"])));
    }

    #[test]
    fn test_float_category_is_accepted() {
        let csv = "VideoID,CategoryID\na,10.0\nb,10.5\n";
        let records = read_records_csv(csv.as_bytes(), Path::new("x.csv")).unwrap();
        assert_eq!(records[0].category_id, Some(10));
        assert_eq!(records[1].category_id, None);
    }

    #[test]
    fn test_missing_video_id_column() {
        let result = read_records_csv("Title\nx\n".as_bytes(), Path::new("x.csv"));
        assert!(matches!(
            result,
            Err(InputError::MissingColumn {
                column: "VideoID",
                ..
            })
        ));
    }

    #[test]
    fn test_fetch_all_chunks_and_keeps_request_order() {
        let records = read_records_csv(DETAILS.as_bytes(), Path::new("d.csv")).unwrap();
        let provider = InMemoryProvider::new(records, 2);

        let fetched = fetch_all(&provider, &ids(&["v3", "unknown", "v1", "v2", "v1"])).unwrap();
        let got: Vec<&str> = fetched.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(got, vec!["v3", "v1", "v2", "v1"]);
        assert_eq!(provider.batches_served(), 3);
    }

    #[test]
    fn test_csv_provider_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("details.csv");
        std::fs::write(&path, DETAILS).unwrap();

        let provider = CsvMetadataProvider::from_path(&path, 50).unwrap();
        assert_eq!(provider.len(), 3);
        assert_eq!(provider.ids(), ids(&["v1", "v2", "v3"]));
        let fetched = fetch_all(&provider, &ids(&["v2"])).unwrap();
        assert_eq!(fetched[0].title, "Vlog day 3");
    }

    #[test]
    fn test_expand_inputs() {
        let dir = TempDir::new().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "VideoID\n").unwrap();
        }
        let pattern = format!("{}/*.csv", dir.path().display());
        let plain = dir.path().join("notes.txt").display().to_string();

        let paths = expand_inputs(&[pattern, plain]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv", "notes.txt"]);

        let none = format!("{}/*.json", dir.path().display());
        assert!(matches!(
            expand_inputs(&[none]),
            Err(InputError::NoMatches { .. })
        ));
    }

    #[test]
    fn test_read_corpus_concatenates_in_file_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1.csv"), "VideoID,Title\na,A\nb,B\n").unwrap();
        std::fs::write(dir.path().join("2.csv"), "VideoID,Title\nc,C\n").unwrap();

        let corpus = read_corpus(&[format!("{}/*.csv", dir.path().display())]).unwrap();
        let got: Vec<&str> = corpus.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
    }
}
