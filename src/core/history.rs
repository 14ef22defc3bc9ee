// TuneSift - core/history.rs
//
// Watch-history extraction from a Takeout `watch-history.json` export:
// video ids from watch URLs, shorts filtering by hashtag, and the date span
// the history covers.
// Core layer: accepts the document as a string; the caller reads the file.

use crate::util::error::InputError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Prefix Takeout puts in front of every watched title.
const WATCHED_PREFIX: &str = "Watched ";

/// One entry of the raw Takeout array. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct RawHistoryItem {
    title: Option<String>,
    #[serde(rename = "titleUrl")]
    title_url: Option<String>,
    time: Option<String>,
}

/// A distinct video found in the watch history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedVideo {
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// Timestamp of the first entry seen for this video (Takeout lists the
    /// most recent watch first).
    pub watched_at: Option<DateTime<Utc>>,
    pub watch_count: usize,
}

/// Date range covered by a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSpan {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

impl WatchSpan {
    pub fn days(&self) -> i64 {
        (self.latest.date_naive() - self.earliest.date_naive()).num_days()
    }

    /// Whole 30-day months covered.
    pub fn approx_months(&self) -> i64 {
        self.days() / 30
    }
}

// =============================================================================
// URL parsing
// =============================================================================

fn is_video_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video id from a watch URL.
///
/// Recognised forms:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>&...`
/// - `https://www.youtube.com/embed/<id>`
/// - `https://www.youtube.com/v/<id>?version=3`
/// - `https://www.youtube.com/shorts/<id>`
///
/// The `m.` and `music.` hosts are accepted as well. Returns `None` for
/// anything else.
pub fn video_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let (host, path_and_query) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    let host = host.to_ascii_lowercase();
    let host = ["www.", "m.", "music."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(&host)
        .to_string();

    let path_and_query = path_and_query.split('#').next().unwrap_or("");
    let (path, query) = match path_and_query.split_once('?') {
        Some((p, q)) => (p, q),
        None => (path_and_query, ""),
    };

    let id = match host.as_str() {
        "youtu.be" => path.trim_start_matches('/').split('/').next(),
        "youtube.com" => {
            if path == "/watch" {
                query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == "v")
                    .map(|(_, value)| value)
            } else {
                ["/embed/", "/v/", "/shorts/"]
                    .iter()
                    .find_map(|prefix| path.strip_prefix(prefix))
                    .and_then(|tail| tail.split('/').next())
            }
        }
        _ => None,
    }?;

    is_video_id(id).then(|| id.to_string())
}

/// True when any hashtag in `title` mentions "short" (`#shorts`,
/// `#ytshort`, `#Shorts`). Text before the first `#` is not a hashtag and is
/// ignored, so a title like "Short Film" is kept.
pub fn is_shorts_title(title: &str) -> bool {
    title
        .split('#')
        .skip(1)
        .any(|tag| tag.to_lowercase().contains("short"))
}

// =============================================================================
// History parsing
// =============================================================================

/// Parse a Takeout watch-history JSON document into distinct videos.
///
/// Entries without a URL (removed videos), with an unrecognised URL, or
/// whose title marks them as shorts are dropped. Repeated watches of the
/// same video collapse into one entry with a `watch_count`, in first-seen
/// order. `source_path` is used for error messages only.
pub fn parse_watch_history(
    json: &str,
    source_path: &Path,
) -> Result<Vec<WatchedVideo>, InputError> {
    let items: Vec<RawHistoryItem> =
        serde_json::from_str(json).map_err(|e| InputError::Json {
            path: source_path.to_path_buf(),
            source: e,
        })?;

    let total = items.len();
    let mut videos: Vec<WatchedVideo> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unrecognised = 0usize;
    let mut shorts = 0usize;

    for item in items {
        let Some(url) = item.title_url else {
            unrecognised += 1;
            continue;
        };
        let Some(video_id) = video_id_from_url(&url) else {
            tracing::debug!(url = %url, "Unrecognised watch URL skipped");
            unrecognised += 1;
            continue;
        };

        if let Some(&pos) = index.get(&video_id) {
            videos[pos].watch_count += 1;
            continue;
        }

        let raw_title = item.title.unwrap_or_default();
        let title = raw_title
            .strip_prefix(WATCHED_PREFIX)
            .unwrap_or(&raw_title)
            .to_string();
        if is_shorts_title(&title) {
            shorts += 1;
            continue;
        }

        let watched_at = item
            .time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));

        index.insert(video_id.clone(), videos.len());
        videos.push(WatchedVideo {
            video_id,
            title,
            url,
            watched_at,
            watch_count: 1,
        });
    }

    tracing::info!(
        entries = total,
        videos = videos.len(),
        unrecognised,
        shorts,
        "Watch history parsed"
    );

    Ok(videos)
}

/// Earliest and latest watch timestamps, if any entry has one.
pub fn watch_span(videos: &[WatchedVideo]) -> Option<WatchSpan> {
    let mut stamps = videos.iter().filter_map(|v| v.watched_at);
    let first = stamps.next()?;
    let (earliest, latest) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    Some(WatchSpan { earliest, latest })
}

// =============================================================================
// Tests
// =============================================================================
