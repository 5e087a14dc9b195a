//! Single-query search over a record snapshot.

use donorwatch_core::ContributionRecord;
use serde::{Deserialize, Serialize};

use crate::matcher::{CityPredicate, NamePredicate};
use crate::score::token_set_ratio;

/// Score floor accepted on [`MatchQuery`]. Advisory only — see `min_score`.
pub const DEFAULT_MIN_SCORE: u32 = 90;

/// One search request: a free-text donor name and an optional city filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchQuery {
    pub name: String,
    /// Case-insensitive city substring; empty = no city filter.
    #[serde(default)]
    pub city: String,
    /// Accepted as configuration but not enforced as an exclusion
    /// threshold: only token containment excludes records, and the score
    /// is used for ordering. Kept so callers can pass it through until the
    /// intended behavior is settled.
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

fn default_min_score() -> u32 {
    DEFAULT_MIN_SCORE
}

impl MatchQuery {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// A record that survived filtering, with its ranking score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(flatten)]
    pub record: ContributionRecord,
    pub score: u32,
}

/// Run one query against the snapshot, returning matches ranked by score.
///
/// City filter first, then token containment, then scoring against the full
/// query string. The sort is stable and descending: equal scores keep their
/// original snapshot order.
pub fn search(records: &[ContributionRecord], query: &MatchQuery) -> Vec<ScoredMatch> {
    let name_pred = NamePredicate::new(&query.name);
    let city_pred = CityPredicate::new(&query.city);

    let mut matches: Vec<ScoredMatch> = records
        .iter()
        .filter(|r| city_pred.matches(&r.city))
        .filter(|r| name_pred.matches(&r.name))
        .map(|r| ScoredMatch {
            record: r.clone(),
            score: token_set_ratio(&query.name, &r.name),
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, city: &str, sub_id: &str) -> ContributionRecord {
        ContributionRecord {
            committee_id: "C00000001".to_string(),
            name: name.to_string(),
            city: city.to_string(),
            state: "TX".to_string(),
            occupation: "ENGINEER".to_string(),
            employer: "ACME".to_string(),
            transaction_date: None,
            transaction_amount: Some(250.0),
            entity_type: "IND".to_string(),
            sub_id: Some(sub_id.to_string()),
            other_id: None,
        }
    }

    #[test]
    fn token_match_is_order_independent_with_city() {
        let records = vec![record("JOHN SMITH", "DALLAS", "1")];
        let results = search(&records, &MatchQuery::new("SMITH JOHN", "dallas"));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 100);
    }

    #[test]
    fn all_tokens_must_be_present() {
        let records = vec![
            record("JOHN SMITH", "DALLAS", "1"),
            record("JOHN DOE", "DALLAS", "2"),
        ];
        let results = search(&records, &MatchQuery::new("john smith", ""));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.name, "JOHN SMITH");
    }

    #[test]
    fn city_filter_excludes_other_cities() {
        let records = vec![
            record("JOHN SMITH", "DALLAS", "1"),
            record("JOHN SMITH", "AUSTIN", "2"),
        ];
        let results = search(&records, &MatchQuery::new("smith", "dal"));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.city, "DALLAS");
    }

    #[test]
    fn empty_query_returns_whole_snapshot() {
        let records = vec![
            record("JOHN SMITH", "DALLAS", "1"),
            record("JANE DOE", "AUSTIN", "2"),
            record("", "HOUSTON", "3"),
        ];
        let results = search(&records, &MatchQuery::new("", ""));

        assert_eq!(results.len(), 3);
    }

    #[test]
    fn results_sorted_descending_by_score() {
        let records = vec![
            record("JOHN SMITHSON", "DALLAS", "1"),
            record("JOHN SMITH", "DALLAS", "2"),
        ];
        let results = search(&records, &MatchQuery::new("john smith", ""));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.name, "JOHN SMITH");
        assert_eq!(results[0].score, 100);
        assert!(results[1].score < 100);
    }

    #[test]
    fn equal_scores_keep_snapshot_order() {
        // All three score 100 against "smith" (token-set subset), so the
        // stable sort must preserve snapshot order.
        let records = vec![
            record("SMITH ADAM", "DALLAS", "1"),
            record("SMITH", "DALLAS", "2"),
            record("SMITH ADAM", "DALLAS", "3"),
        ];
        let results = search(&records, &MatchQuery::new("smith", ""));

        let order: Vec<&str> = results
            .iter()
            .map(|m| m.record.sub_id.as_deref().unwrap())
            .collect();
        assert_eq!(order, vec!["1", "2", "3"]);
        assert!(results.iter().all(|m| m.score == 100));
    }

    #[test]
    fn min_score_does_not_exclude() {
        let records = vec![record("SMITHERS-JOHNSON, BARTHOLOMEW", "DALLAS", "1")];
        let mut query = MatchQuery::new("smith john", "");
        query.min_score = 99;

        // Token containment passes, so the record stays even though its
        // score is below min_score.
        let results = search(&records, &query);
        assert_eq!(results.len(), 1);
        assert!(results[0].score < 99);
    }
}
