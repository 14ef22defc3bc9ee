// TuneSift - core/review.rs
//
// Folds human decisions on the Maybe bucket into the final music database.
// Core layer: decisions arrive already parsed (see app::review_io).
//
// An unreviewed Maybe item is excluded. Merging with no decisions at all
// still succeeds but is marked Pending.

use crate::core::model::{FinalDatabase, MergeStatus, ReviewDecisions, VideoRecord};
use std::collections::HashSet;

/// Merge the auto-detected music with the Maybe items a reviewer admitted.
///
/// The result keeps `auto_music` first, then admitted Maybe items, both in
/// input order, deduplicated by video id with the first occurrence winning.
/// Merging the output again with the same inputs yields the same database.
pub fn merge(
    auto_music: &[VideoRecord],
    maybe_bucket: &[VideoRecord],
    decisions: Option<&ReviewDecisions>,
) -> FinalDatabase {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::with_capacity(auto_music.len());

    for record in auto_music {
        if seen.insert(record.video_id.as_str()) {
            records.push(record.clone());
        } else {
            tracing::debug!(video_id = %record.video_id, "Duplicate music record dropped");
        }
    }

    let status = match decisions {
        Some(_) => MergeStatus::Final,
        None => MergeStatus::Pending,
    };

    let mut admitted = 0usize;
    let mut unreviewed = 0usize;
    if let Some(decisions) = decisions {
        for record in maybe_bucket {
            match decisions.get(&record.video_id) {
                Some(true) => {
                    if seen.insert(record.video_id.as_str()) {
                        records.push(record.clone());
                        admitted += 1;
                    }
                }
                Some(false) => {}
                None => unreviewed += 1,
            }
        }
    }

    tracing::info!(
        music = auto_music.len(),
        maybe = maybe_bucket.len(),
        admitted,
        unreviewed,
        total = records.len(),
        status = ?status,
        "Review merge complete"
    );

    FinalDatabase { records, status }
}
