use donorwatch_core::ContributionRecord;
use donorwatch_rules::Rule;

/// Immutable snapshot shared by every handler.
///
/// Loaded once at startup; search and rule evaluation are pure functions
/// over it, so no interior locking is needed.
pub struct AppState {
    pub records: Vec<ContributionRecord>,
    pub rules: Vec<Rule>,
}
