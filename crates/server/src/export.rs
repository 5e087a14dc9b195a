//! CSV rendering of deduplicated search results.

use donorwatch_search::ScoredMatch;

/// Render matches as a CSV document: header row plus one line per record,
/// score included. Absent dates and amounts become empty cells.
pub fn to_csv(matches: &[ScoredMatch]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "committee_id",
        "name",
        "city",
        "state",
        "occupation",
        "employer",
        "transaction_date",
        "transaction_amount",
        "entity_type",
        "sub_id",
        "score",
    ])?;

    for m in matches {
        let r = &m.record;
        let date = r.date_iso().unwrap_or_default();
        let amount = r.transaction_amount.map(|a| a.to_string()).unwrap_or_default();
        let score = m.score.to_string();
        writer.write_record([
            r.committee_id.as_str(),
            r.name.as_str(),
            r.city.as_str(),
            r.state.as_str(),
            r.occupation.as_str(),
            r.employer.as_str(),
            date.as_str(),
            amount.as_str(),
            r.entity_type.as_str(),
            r.sub_id.as_deref().unwrap_or(""),
            score.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}
