use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized individual-contribution line item.
///
/// Records are produced once per snapshot load by the ingest crate and are
/// immutable afterwards. The store only ever contains individual donors:
/// organizational rows (`ENTITY_TP != "IND"` or a non-empty `OTHER_ID`) are
/// dropped at ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributionRecord {
    /// Filing committee identifier (`CMTE_ID`).
    pub committee_id: String,
    /// Donor name, uppercased and trimmed. Empty if the source field was blank.
    pub name: String,
    /// Donor city, uppercased and trimmed. Empty if the source field was blank.
    pub city: String,
    pub state: String,
    pub occupation: String,
    pub employer: String,
    /// Transaction date, `None` when the source value was unparseable.
    pub transaction_date: Option<NaiveDate>,
    /// Transaction amount in dollars, `None` when unparseable.
    pub transaction_amount: Option<f64>,
    /// Entity type code from the source file (always `IND` after ingest).
    pub entity_type: String,
    /// FEC-unique row identifier. The dedup key of choice when present.
    pub sub_id: Option<String>,
    /// Conduit committee identifier; always empty/absent for stored records.
    pub other_id: Option<String>,
}

impl ContributionRecord {
    /// Transaction date as an ISO-8601 string, or `None`.
    pub fn date_iso(&self) -> Option<String> {
        self.transaction_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}
