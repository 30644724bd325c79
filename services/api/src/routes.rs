use crate::infra::{AppState, MatchRequest};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::info;
use wahlmatch::config::DisplayConfig;
use wahlmatch::error::AppError;
use wahlmatch::workflows::matching::{rank, score, top_result, Party, ScoredResult, Thesis};
use wahlmatch::workflows::share::SHARE_FILE_NAME;

#[derive(Debug, Serialize)]
pub(crate) struct MatchResponse {
    pub(crate) answered: usize,
    pub(crate) total: usize,
    pub(crate) results: Vec<ScoredResult>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/parties", get(parties_endpoint))
        .route("/api/v1/theses", get(theses_endpoint))
        .route("/api/v1/config", get(display_config_endpoint))
        .route("/api/v1/match", post(match_endpoint))
        .route("/api/v1/match/share-card", post(share_card_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn parties_endpoint(State(state): State<AppState>) -> Json<Vec<Party>> {
    Json(state.dataset.parties().to_vec())
}

pub(crate) async fn theses_endpoint(State(state): State<AppState>) -> Json<Vec<Thesis>> {
    Json(state.dataset.theses().to_vec())
}

pub(crate) async fn display_config_endpoint(State(state): State<AppState>) -> Json<DisplayConfig> {
    Json(state.display.as_ref().clone())
}

pub(crate) async fn match_endpoint(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let (answers, weights) = request.inputs()?;
    let results = score(
        state.dataset.parties(),
        state.dataset.theses(),
        &answers,
        &weights,
    );
    let results = if request.ranked { rank(results) } else { results };

    let answered = state
        .dataset
        .theses()
        .iter()
        .filter(|thesis| answers.contains_key(&thesis.id))
        .count();

    Ok(Json(MatchResponse {
        answered,
        total: state.dataset.theses().len(),
        results,
    }))
}

pub(crate) async fn share_card_endpoint(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (answers, weights) = request.inputs()?;
    let results = score(
        state.dataset.parties(),
        state.dataset.theses(),
        &answers,
        &weights,
    );
    let top = top_result(&results);
    let card = state
        .renderer
        .render_png(top, &state.display, state.backgrounds.as_ref())?;

    if let Some(top) = top {
        info!(party = %top.party.id, percentage = top.percentage, "share card rendered");
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{SHARE_FILE_NAME}\""),
            ),
        ],
        card,
    ))
}
