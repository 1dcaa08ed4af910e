//! Submission board endpoints.
//!
//! Public endpoints: participants identify themselves by a free-form name.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::competition::{Competition, RoundInfo};
use crate::export::ARCHIVE_FILE_NAME;
use crate::leaderboard::{LeaderboardEntry, LeaderboardSummary};
use crate::record::format_time;
use crate::scoring::ScoringStrategy;

pub type SharedCompetition = Arc<Competition>;

/// Default for `GET /leaderboard/top`
pub const DEFAULT_TOP_N: usize = 3;

// ============================================================================
// ROUND ENDPOINTS
// ============================================================================

pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /round
///
/// Metric, required row count, expected columns and dataset links.
pub async fn get_round(State(competition): State<SharedCompetition>) -> Json<RoundInfo> {
    Json(competition.info())
}

/// GET /example_submission.csv
pub async fn example_submission(
    State(competition): State<SharedCompetition>,
) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"example_submission.csv\"",
            ),
        ],
        competition.example_submission(),
    )
}

// ============================================================================
// SUBMIT ENDPOINT
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub name: Option<String>,
    pub score: Option<f64>,
    /// Score rendered with the metric's precision
    pub score_display: Option<String>,
    pub metric: Option<ScoringStrategy>,
    pub submitted_at: Option<String>,
    pub error: Option<String>,
}

impl SubmitResponse {
    fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            name: None,
            score: None,
            score_display: None,
            metric: None,
            submitted_at: None,
            error: Some(error.into()),
        }
    }
}

type SubmitResult = Result<Json<SubmitResponse>, (StatusCode, Json<SubmitResponse>)>;

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<SubmitResponse>) {
    (status, Json(SubmitResponse::rejected(message)))
}

/// POST /submit
///
/// Multipart form with a `name` text field and a `file` CSV part.
/// Validation failures are 422 with the reason; storage failures are 500.
pub async fn submit(
    State(competition): State<SharedCompetition>,
    mut multipart: Multipart,
) -> SubmitResult {
    let mut name: Option<String> = None;
    let mut blob: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(reject(
                    e.status(),
                    format!("Malformed upload: {}", e.body_text()),
                ))
            }
        };
        match field.name() {
            Some("name") => match field.text().await {
                Ok(text) => name = Some(text),
                Err(e) => return Err(reject(e.status(), format!("Invalid name: {}", e))),
            },
            Some("file") => match field.bytes().await {
                Ok(bytes) => blob = Some(bytes.to_vec()),
                Err(e) => return Err(reject(e.status(), format!("Invalid file: {}", e))),
            },
            _ => {}
        }
    }

    let Some(name) = name else {
        return Err(reject(StatusCode::BAD_REQUEST, "Missing 'name' field"));
    };
    let Some(blob) = blob else {
        return Err(reject(StatusCode::BAD_REQUEST, "Missing 'file' field"));
    };

    let worker = competition.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.submit(&name, &blob)).await;

    match outcome {
        Ok(Ok(record)) => {
            let strategy = competition.strategy();
            Ok(Json(SubmitResponse {
                success: true,
                score_display: Some(strategy.format_score(record.score)),
                score: Some(record.score),
                metric: Some(strategy),
                submitted_at: Some(format_time(&record.submitted_at)),
                name: Some(record.name),
                error: None,
            }))
        }
        Ok(Err(e)) if e.is_validation() => {
            Err(reject(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Ok(Err(e)) => {
            error!("Submission could not be stored: {}", e);
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Your submission was valid but could not be saved. Please try again.",
            ))
        }
        Err(e) => {
            error!("Submission task failed: {}", e);
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

// ============================================================================
// LEADERBOARD ENDPOINTS
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub metric: ScoringStrategy,
    pub entries: Vec<LeaderboardEntry>,
    pub top_scorer: Option<LeaderboardEntry>,
    pub summary: LeaderboardSummary,
    /// Present when some or all stored submissions could not be read
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}

async fn leaderboard_response(
    competition: SharedCompetition,
    limit: Option<usize>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, String)> {
    let metric = competition.strategy();
    let view = tokio::task::spawn_blocking(move || competition.leaderboard())
        .await
        .map_err(|e| {
            error!("Leaderboard task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    if let Some(notice) = &view.notice {
        warn!("Serving leaderboard with notice: {}", notice);
    }

    let board = &view.leaderboard;
    let entries = match limit {
        Some(n) => board.top(n).to_vec(),
        None => board.entries().to_vec(),
    };
    Ok(Json(LeaderboardResponse {
        metric,
        entries,
        top_scorer: board.top_scorer().cloned(),
        summary: board.summary(),
        notice: view.notice,
    }))
}

/// GET /leaderboard
///
/// One row per participant with their best score, recomputed on every request.
pub async fn get_leaderboard(
    State(competition): State<SharedCompetition>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, String)> {
    leaderboard_response(competition, None).await
}

/// GET /leaderboard/top?n=3
pub async fn get_top(
    State(competition): State<SharedCompetition>,
    Query(query): Query<TopQuery>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, String)> {
    leaderboard_response(competition, Some(query.n.unwrap_or(DEFAULT_TOP_N))).await
}

// ============================================================================
// EXPORT ENDPOINT
// ============================================================================

/// GET /submissions.zip
pub async fn download_submissions(
    State(competition): State<SharedCompetition>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let archive = tokio::task::spawn_blocking(move || competition.export_archive())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            error!("Export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not build archive: {}", e),
            )
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME),
            ),
        ],
        archive,
    ))
}
