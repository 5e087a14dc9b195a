use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use donorwatch_rules::{scan, Violation};
use donorwatch_search::{bulk_search, ScoredMatch};

use crate::export;
use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

// ── Search ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchRequest {
    pub names: Vec<String>,
    #[serde(default)]
    pub city: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredMatch>,
    pub count: usize,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let results = bulk_search(&state.records, &req.names, &req.city);
    Json(SearchResponse {
        count: results.len(),
        results,
    })
}

// ── Upload & export ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CityParam {
    #[serde(default)]
    pub city: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityParam>,
    multipart: Multipart,
) -> Result<Json<SearchResponse>, ApiError> {
    let names = names_from_multipart(multipart).await?;
    let results = bulk_search(&state.records, &names, &params.city);
    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityParam>,
    multipart: Multipart,
) -> Result<([(header::HeaderName, &'static str); 2], String), ApiError> {
    let names = names_from_multipart(multipart).await?;
    let results = bulk_search(&state.records, &names, &params.city);

    let csv = export::to_csv(&results).map_err(|e| {
        tracing::warn!(error = %e, "CSV export failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to render CSV export.".to_string(),
            }),
        )
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contributions.csv",
            ),
        ],
        csv,
    ))
}

/// Pull the uploaded name file out of the multipart body.
async fn names_from_multipart(mut multipart: Multipart) -> Result<Vec<String>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Malformed multipart upload."))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| bad_request("Failed to read uploaded file."))?;

        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| bad_request("Unable to decode file. Please upload UTF-8 text."))?;

        let names = names_from_text(&filename, &text);
        if names.is_empty() {
            return Err(bad_request("No names found in uploaded file."));
        }
        return Ok(names);
    }

    Err(bad_request("Missing `file` field in upload."))
}

/// A `.csv` upload contributes the first column of each row; anything else
/// is treated as plain text with one name per line.
fn names_from_text(filename: &str, text: &str) -> Vec<String> {
    if filename.ends_with(".csv") {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        reader
            .records()
            .filter_map(|row| row.ok())
            .filter_map(|row| row.get(0).map(|s| s.trim().to_string()))
            .filter(|name| !name.is_empty())
            .collect()
    } else {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ── Compliance scan ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct ComplianceResponse {
    pub violations: Vec<Violation>,
    pub count: usize,
    /// (record, rule) evaluations skipped because the rule errored —
    /// non-zero means some rules are silently contributing nothing.
    pub errored_rule_evaluations: usize,
}

pub async fn compliance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<ComplianceResponse> {
    let matches = bulk_search(&state.records, &req.names, &req.city);
    let report = scan(matches.iter().map(|m| &m.record), &state.rules);

    Json(ComplianceResponse {
        count: report.violations.len(),
        violations: report.violations,
        errored_rule_evaluations: report.errored,
    })
}

// ── Tests ─────────────────────────────────────────────────────────
