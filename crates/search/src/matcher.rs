//! Per-record containment predicates.
//!
//! The query engine composes these explicitly, record by record, instead of
//! filtering whole columns at once — each predicate is independently
//! testable and carries its own matching policy.

/// Name predicate: every whitespace-delimited query token must appear as a
/// substring of the candidate name (case-insensitive, order-independent).
#[derive(Debug, Clone)]
pub struct NamePredicate {
    tokens: Vec<String>,
}

impl NamePredicate {
    pub fn new(query: &str) -> Self {
        Self {
            tokens: query
                .split_whitespace()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// True when the query produced no tokens (empty or whitespace-only).
    /// Such a predicate matches every candidate: "all tokens present" is
    /// vacuously true over an empty token set.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Test if every token is contained in the candidate name.
    pub fn matches(&self, candidate_name: &str) -> bool {
        let target = candidate_name.to_lowercase();
        self.tokens.iter().all(|t| target.contains(t.as_str()))
    }
}

/// City predicate: case-insensitive substring match, empty filter matches all.
#[derive(Debug, Clone)]
pub struct CityPredicate {
    filter: String,
}

impl CityPredicate {
    pub fn new(filter: &str) -> Self {
        Self {
            filter: filter.to_lowercase(),
        }
    }

    pub fn matches(&self, candidate_city: &str) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        candidate_city.to_lowercase().contains(&self.filter)
    }
}
