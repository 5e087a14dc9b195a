//! Bulk search with cross-query deduplication.
//!
//! Phase 1: parallel map — one search task per query name over the shared
//! snapshot. Phase 2: strictly sequential reduce in original name-then-record
//! order, so the first occurrence of each identity key always wins. The
//! reduce must not be parallelized: reordering it would change which query's
//! copy of a duplicate record survives.

use donorwatch_core::ContributionRecord;
use indexmap::IndexSet;
use rayon::prelude::*;

use crate::query::{search, MatchQuery, ScoredMatch};

/// Identity key used to collapse repeated records across query names:
/// `sub_id` when present, else name + transaction date.
pub fn dedup_key(record: &ContributionRecord) -> String {
    match &record.sub_id {
        Some(id) => id.clone(),
        None => {
            let date = record.date_iso().unwrap_or_else(|| "none".to_string());
            format!("{}_{}", record.name, date)
        }
    }
}

/// Run one search per name and merge the results, deduplicated by
/// [`dedup_key`] with first occurrence winning.
pub fn bulk_search(
    records: &[ContributionRecord],
    names: &[String],
    city: &str,
) -> Vec<ScoredMatch> {
    // Map phase: searches are pure over the immutable snapshot, so each
    // name runs independently. collect() preserves input name order.
    let per_name: Vec<Vec<ScoredMatch>> = names
        .par_iter()
        .map(|name| search(records, &MatchQuery::new(name.as_str(), city)))
        .collect();

    // Reduce phase: sequential, first occurrence wins.
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut merged = Vec::new();
    for matches in per_name {
        for m in matches {
            if seen.insert(dedup_key(&m.record)) {
                merged.push(m);
            }
        }
    }
    merged
}
