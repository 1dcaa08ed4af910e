//! Challenge HTTP server
//!
//! ```text
//! GET  /health                  - Health check
//! GET  /round                   - Public round description
//! GET  /example_submission.csv  - Submission template
//! POST /submit                  - Multipart upload (fields: name, file)
//! GET  /leaderboard             - Full ranked leaderboard
//! GET  /leaderboard/top?n=3     - Top N entries
//! GET  /submissions.zip         - Archive of all stored submissions
//! ```
//!
//! Store access is blocking I/O and runs on the blocking thread pool.

pub mod routes;

use crate::competition::Competition;
use crate::config::ChallengeConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router around a round
pub fn router(competition: Arc<Competition>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/round", get(routes::get_round))
        .route("/example_submission.csv", get(routes::example_submission))
        .route("/submit", post(routes::submit))
        .route("/leaderboard", get(routes::get_leaderboard))
        .route("/leaderboard/top", get(routes::get_top))
        .route("/submissions.zip", get(routes::download_submissions))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(competition)
}

pub async fn run_server(config: ChallengeConfig) -> anyhow::Result<()> {
    let competition = Arc::new(Competition::open(&config)?);
    let round = competition.info();
    let app = router(competition, config.server.max_upload_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║               Weekly AI Challenge - Submission Board         ║");
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Round:        {:46}║", round.name);
    info!("║  Metric:       {:46}║", round.metric_label);
    info!("║  Rows:         {:46}║", round.required_length);
    info!("║  Listening on: {:46}║", addr);
    info!("╚══════════════════════════════════════════════════════════════╝");

    axum::serve(listener, app).await?;

    Ok(())
}
