// TuneSift - app/review_io.rs
//
// Reading a filled-in review sheet back into decisions.
//
// The sheet is the one written by `core::export::write_review_sheet`; any
// extra columns a reviewer adds are ignored. Only `VideoID` and the
// decision column are read.

use crate::core::model::ReviewDecisions;
use crate::util::constants::{REVIEW_DECISION_COLUMN, VIDEO_ID_COLUMN};
use crate::util::error::ReviewError;
use std::io::Read;
use std::path::Path;

fn parse_decision(raw: &str) -> Option<Option<bool>> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "" => Some(None),
        "Y" => Some(Some(true)),
        "N" => Some(Some(false)),
        _ => None,
    }
}

/// Parse review decisions from CSV.
///
/// Decisions are `Y` or `N`, case-insensitive and trimmed. An empty cell
/// leaves the video unreviewed. A video listed twice must carry the same
/// decision both times.
pub fn read_decisions<R: Read>(reader: R) -> Result<ReviewDecisions, ReviewError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| ReviewError::Csv { source: e })?
        .clone();

    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(ReviewError::MissingColumn { column: name })
    };
    let id_col = find(VIDEO_ID_COLUMN)?;
    let decision_col = find(REVIEW_DECISION_COLUMN)?;

    let mut decisions = ReviewDecisions::new();
    let mut undecided = 0usize;
    for (i, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|e| ReviewError::Csv { source: e })?;
        let row_no = i + 1;
        let video_id = row.get(id_col).unwrap_or("").trim();
        let raw = row.get(decision_col).unwrap_or("");

        let Some(decision) = parse_decision(raw) else {
            return Err(ReviewError::InvalidDecision {
                row: row_no,
                video_id: video_id.to_string(),
                value: raw.trim().to_string(),
            });
        };
        let Some(decision) = decision else {
            undecided += 1;
            continue;
        };
        if video_id.is_empty() {
            return Err(ReviewError::EmptyVideoId { row: row_no });
        }

        match decisions.insert(video_id.to_string(), decision) {
            Some(previous) if previous != decision => {
                return Err(ReviewError::ConflictingDecision {
                    video_id: video_id.to_string(),
                });
            }
            _ => {}
        }
    }

    let admitted = decisions.values().filter(|&&d| d).count();
    tracing::info!(
        decisions = decisions.len(),
        admitted,
        undecided,
        "Review decisions read"
    );
    Ok(decisions)
}

/// Open a review sheet from disk and parse its decisions.
pub fn read_decisions_file(path: &Path) -> Result<ReviewDecisions, ReviewError> {
    let file = std::fs::File::open(path).map_err(|e| ReviewError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_decisions(std::io::BufReader::new(file))
}
