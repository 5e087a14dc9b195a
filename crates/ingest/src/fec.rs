use std::path::Path;

use chrono::NaiveDate;
use donorwatch_core::{ContributionRecord, DonorwatchError};
use tracing::{info, warn};

// Column positions in the FEC "contributions by individuals" file layout.
// The file is pipe-delimited with no header row.
const CMTE_ID: usize = 0;
const ENTITY_TP: usize = 6;
const NAME: usize = 7;
const CITY: usize = 8;
const STATE: usize = 9;
const EMPLOYER: usize = 11;
const OCCUPATION: usize = 12;
const TRANSACTION_DT: usize = 13;
const TRANSACTION_AMT: usize = 14;
const OTHER_ID: usize = 15;
const SUB_ID: usize = 20;

/// Minimum field count for a row to be usable (through SUB_ID).
const MIN_FIELDS: usize = 21;

pub struct FecImporter;

impl FecImporter {
    /// Read a pipe-delimited FEC individual-contributions file into records.
    ///
    /// Only individual donors survive: rows whose entity type is not `IND`
    /// or that carry a conduit `OTHER_ID` are dropped. Malformed rows are
    /// skipped with a warning; they never abort the load.
    pub fn import(path: &Path) -> Result<Vec<ContributionRecord>, DonorwatchError> {
        let file = std::fs::File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        let mut skipped = 0u64;
        let mut dropped = 0u64;

        for (line_no, row) in reader.records().enumerate() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };

            if row.len() < MIN_FIELDS {
                warn!(line = line_no + 1, fields = row.len(), "skipping short row");
                skipped += 1;
                continue;
            }

            // Individual donors only; conduit records carry an OTHER_ID.
            if row.get(ENTITY_TP).map(str::trim) != Some("IND") {
                dropped += 1;
                continue;
            }
            if !field(&row, OTHER_ID).is_empty() {
                dropped += 1;
                continue;
            }

            records.push(ContributionRecord {
                committee_id: field(&row, CMTE_ID),
                name: upper_trimmed(&row, NAME),
                city: upper_trimmed(&row, CITY),
                state: field(&row, STATE),
                occupation: field(&row, OCCUPATION),
                employer: field(&row, EMPLOYER),
                transaction_date: parse_date(row.get(TRANSACTION_DT).unwrap_or("")),
                transaction_amount: parse_amount(row.get(TRANSACTION_AMT).unwrap_or("")),
                entity_type: field(&row, ENTITY_TP),
                sub_id: non_empty(field(&row, SUB_ID)),
                other_id: None,
            });
        }

        info!(
            records = records.len(),
            dropped_non_individual = dropped,
            skipped_malformed = skipped,
            path = %path.display(),
            "loaded contribution snapshot"
        );
        Ok(records)
    }
}

fn field(row: &csv::StringRecord, idx: usize) -> String {
    row.get(idx).unwrap_or("").trim().to_string()
}

fn upper_trimmed(row: &csv::StringRecord, idx: usize) -> String {
    row.get(idx).unwrap_or("").trim().to_uppercase()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// FEC dates are MMDDYYYY. Anything unparseable becomes `None`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m%d%Y").ok()
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|a| a.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Layout: CMTE|AMNDT|RPT|PGI|IMAGE|TP|ENTITY|NAME|CITY|STATE|ZIP|EMPLOYER|
    //         OCCUPATION|DT|AMT|OTHER_ID|TRAN_ID|FILE_NUM|MEMO_CD|MEMO_TEXT|SUB_ID
    fn line(entity: &str, name: &str, city: &str, dt: &str, amt: &str, other: &str, sub: &str) -> String {
        format!(
            "C00401224|N|M3|P|201702069042410893|15|{entity}|{name}|{city}|TX|75001|ACME CORP|ENGINEER|{dt}|{amt}|{other}|SA11AI.109|1148803|||{sub}"
        )
    }

    fn import_str(contents: &str) -> Vec<ContributionRecord> {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        FecImporter::import(f.path()).unwrap()
    }

    #[test]
    fn parses_individual_row() {
        let records = import_str(&line("IND", "smith, john", "dallas", "01152018", "250", "", "4020820181532341437"));
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.committee_id, "C00401224");
        assert_eq!(r.name, "SMITH, JOHN");
        assert_eq!(r.city, "DALLAS");
        assert_eq!(r.state, "TX");
        assert_eq!(r.transaction_date, NaiveDate::from_ymd_opt(2018, 1, 15));
        assert_eq!(r.transaction_amount, Some(250.0));
        assert_eq!(r.sub_id.as_deref(), Some("4020820181532341437"));
    }

    #[test]
    fn drops_organizations_and_conduits() {
        let contents = [
            line("ORG", "MEGA PAC", "AUSTIN", "01152018", "5000", "", "1"),
            line("IND", "DOE, JANE", "AUSTIN", "01152018", "100", "C00123456", "2"),
            line("IND", "DOE, JANE", "AUSTIN", "01152018", "100", "", "3"),
        ]
        .join("\n");

        let records = import_str(&contents);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sub_id.as_deref(), Some("3"));
    }

    #[test]
    fn bad_date_and_amount_become_none() {
        let records = import_str(&line("IND", "DOE, JANE", "AUSTIN", "99999999", "abc", "", "4"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_date, None);
        assert_eq!(records[0].transaction_amount, None);
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let contents = format!(
            "only|three|fields\n{}",
            line("IND", "DOE, JANE", "AUSTIN", "01152018", "100", "", "5")
        );
        let records = import_str(&contents);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn blank_name_survives_as_empty_string() {
        let records = import_str(&line("IND", "  ", "AUSTIN", "01152018", "100", "", "6"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "");
    }
}
