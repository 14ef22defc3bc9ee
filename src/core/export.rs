// TuneSift - core/export.rs
//
// CSV and JSON export of records, classification results, review sheets,
// and extracted watch histories.
// Core layer: writes to any Write trait object.
//
// The record columns match what app::provider reads back, so every table
// written here can be fed into a later stage.

use crate::core::history::WatchedVideo;
use crate::core::model::{ClassificationResult, Label, VideoRecord};
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Column order shared by every record table.
pub const RECORD_HEADER: [&str; 8] = [
    "VideoID",
    "Title",
    "CategoryID",
    "PublishDate",
    "ChannelTitle",
    "Duration",
    "Description",
    "Tags",
];

/// Columns of the per-record classification table.
pub const CLASSIFICATION_HEADER: [&str; 9] = [
    "VideoID",
    "Title",
    "CategoryID",
    "Description",
    "Tags",
    "CategoryCheck",
    "TagsCheck",
    "DescriptionCheck",
    "Label",
];

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> ExportError + '_ {
    move |e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Tags as a JSON array; empty cell when the record has no tags.
fn encode_tags(record: &VideoRecord, path: &Path) -> Result<String, ExportError> {
    match &record.tags {
        Some(tags) => serde_json::to_string(tags).map_err(|e| ExportError::Json {
            path: path.to_path_buf(),
            source: e,
        }),
        None => Ok(String::new()),
    }
}

fn record_fields(record: &VideoRecord, path: &Path) -> Result<Vec<String>, ExportError> {
    Ok(vec![
        record.video_id.clone(),
        record.title.clone(),
        record.category_id.map(|c| c.to_string()).unwrap_or_default(),
        record.published_at.clone().unwrap_or_default(),
        record.channel_title.clone().unwrap_or_default(),
        record
            .duration_secs
            .map(|d| d.to_string())
            .unwrap_or_default(),
        record.description.clone().unwrap_or_default(),
        encode_tags(record, path)?,
    ])
}

/// Export records using the shared record columns.
pub fn write_records_csv<W: Write>(
    records: &[VideoRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(RECORD_HEADER)
        .map_err(csv_error(export_path))?;

    for record in records {
        csv_writer
            .write_record(record_fields(record, export_path)?)
            .map_err(csv_error(export_path))?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// Export one row per non-excluded record with its checks and label.
///
/// `records` and `results` are index-aligned (see `classify_batch`); shorts
/// are left out.
pub fn write_classification_csv<W: Write>(
    records: &[VideoRecord],
    results: &[ClassificationResult],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(CLASSIFICATION_HEADER)
        .map_err(csv_error(export_path))?;

    let mut count = 0;
    for (record, result) in records.iter().zip(results) {
        if result.label == Label::ExcludedAsShort {
            continue;
        }
        let category = record.category_id.map(|c| c.to_string()).unwrap_or_default();
        let tags = encode_tags(record, export_path)?;
        csv_writer
            .write_record([
                record.video_id.as_str(),
                record.title.as_str(),
                category.as_str(),
                record.description.as_deref().unwrap_or(""),
                tags.as_str(),
                flag(result.category_check),
                flag(result.tags_check),
                flag(result.description_check),
                result.label.label(),
            ])
            .map_err(csv_error(export_path))?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(count)
}

/// Export a review sheet: record columns, the three checks, and a decision
/// column pre-filled with `N` for the reviewer to flip.
pub fn write_review_sheet<W: Write>(
    items: &[(&VideoRecord, &ClassificationResult)],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = RECORD_HEADER.to_vec();
    header.extend([
        "CategoryCheck",
        "TagsCheck",
        "DescriptionCheck",
        constants::REVIEW_DECISION_COLUMN,
    ]);
    csv_writer
        .write_record(&header)
        .map_err(csv_error(export_path))?;

    for (record, result) in items {
        let mut row = record_fields(record, export_path)?;
        row.extend([
            flag(result.category_check).to_string(),
            flag(result.tags_check).to_string(),
            flag(result.description_check).to_string(),
            constants::REVIEW_DEFAULT_DECISION.to_string(),
        ]);
        csv_writer
            .write_record(&row)
            .map_err(csv_error(export_path))?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(items.len())
}

/// Export classification results (shorts included) as a JSON array.
pub fn write_results_json<W: Write>(
    results: &[ClassificationResult],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, results).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(results.len())
}

/// Export an extracted watch history, one row per distinct video.
pub fn write_watched_csv<W: Write>(
    videos: &[WatchedVideo],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["VideoID", "Title", "URL", "WatchDate", "WatchCount"])
        .map_err(csv_error(export_path))?;

    for video in videos {
        let watched = video
            .watched_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let count = video.watch_count.to_string();
        csv_writer
            .write_record([
                video.video_id.as_str(),
                video.title.as_str(),
                video.url.as_str(),
                watched.as_str(),
                count.as_str(),
            ])
            .map_err(csv_error(export_path))?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(videos.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Label, Signals};
    use std::path::PathBuf;

    fn make_record(id: &str, tags: Option<&[&str]>) -> VideoRecord {
        VideoRecord {
            category_id: Some(10),
            duration_secs: Some(215),
            description: Some("Official video, \"quoted\"\nsecond line".to_string()),
            tags: tags.map(|t| t.iter().map(|s| s.to_string()).collect()),
            ..VideoRecord::new(id, format!("Song {id}"))
        }
    }

    fn out() -> PathBuf {
        PathBuf::from("out.csv")
    }

    #[test]
    fn test_records_csv() {
        let records = vec![make_record("a", Some(&["pop", "rock"])), make_record("b", None)];
        let mut buf = Vec::new();
        let count = write_records_csv(&records, &mut buf, &out()).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("VideoID,Title,CategoryID,PublishDate"));
        assert!(output.contains(r#""[""pop"",""rock""]""#));
        assert!(output.contains("Song b"));
    }

    #[test]
    fn test_classification_csv_skips_shorts() {
        let records = vec![make_record("a", None), make_record("b", None)];
        let results = vec![
            ClassificationResult::new(
                "a",
                Signals {
                    category: true,
                    tags: false,
                    description: true,
                },
                Label::Maybe,
            ),
            ClassificationResult::new("b", Signals::default(), Label::ExcludedAsShort),
        ];
        let mut buf = Vec::new();
        let count = write_classification_csv(&records, &results, &mut buf, &out()).unwrap();
        assert_eq!(count, 1);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains(",1,0,1,Maybe"));
        assert!(!output.contains("Song b"));
    }

    #[test]
    fn test_review_sheet_defaults_to_no() {
        let record = make_record("a", Some(&["pop"]));
        let result = ClassificationResult::new(
            "a",
            Signals {
                tags: true,
                ..Default::default()
            },
            Label::Maybe,
        );
        let mut buf = Vec::new();
        write_review_sheet(&[(&record, &result)], &mut buf, &out()).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let header = output.lines().next().unwrap();
        assert!(header.ends_with("CategoryCheck,TagsCheck,DescriptionCheck,Is_Music_Manual"));
        assert!(output.trim_end().ends_with(",0,1,0,N"));
    }

    #[test]
    fn test_results_json() {
        let results = vec![ClassificationResult::new("a", Signals::default(), Label::NotMusic)];
        let mut buf = Vec::new();
        let count = write_results_json(&results, &mut buf, &PathBuf::from("r.json")).unwrap();
        assert_eq!(count, 1);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"NotMusic\""));
        assert!(output.contains("\"video_id\": \"a\""));
    }
}
