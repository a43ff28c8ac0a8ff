use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::db::Database;
use crate::predictor::features::HistoricalFeatures;
use crate::predictor::{team_stats, Outcome, PredictError, PredictionPipeline, TrainingReport};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub pipeline: Arc<PredictionPipeline>,
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/matches", get(matches_handler))
        .route("/api/stats/:team", get(team_stats_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/predict/upcoming", post(predict_upcoming_handler))
        .route("/api/retrain", post(retrain_handler))
        .route("/api/model", get(model_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Map a pipeline error to a user-facing status code. Data-quality errors
/// are 422 (the request was fine, the data was not); an untrained model is
/// 503 because a later retry can succeed.
fn predict_error_status(err: &PredictError) -> StatusCode {
    match err {
        PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PredictError::InsufficientData { .. }
        | PredictError::InsufficientLabelDiversity
        | PredictError::NoValidData => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::ModelNotTrained | PredictError::ModelNotReady => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    error!("Internal error: {e:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
}

/// GET /api/matches
async fn matches_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .list_matches(200)
        .map(Json)
        .map_err(internal_error)
}

/// GET /api/stats/:team
async fn team_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let matches = state
        .db
        .list_finished_matches_for_team(&team)
        .map_err(internal_error)?;
    Ok(Json(team_stats::compute_stats(&team, &matches)))
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    home_goals: f64,
    away_goals: f64,
    #[serde(default)]
    matchday: f64,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    outcome: Outcome,
}

/// POST /api/predict — classify a historical-variant feature row
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !req.home_goals.is_finite() || !req.away_goals.is_finite() || !req.matchday.is_finite() {
        return Err((StatusCode::BAD_REQUEST, "Invalid input data".to_string()));
    }
    let features = HistoricalFeatures {
        home_goals: req.home_goals,
        away_goals: req.away_goals,
        matchday: req.matchday,
    };
    state
        .pipeline
        .predict_historical(features)
        .map(|outcome| Json(PredictResponse { outcome }))
        .map_err(|e| (predict_error_status(&e), e.to_string()))
}

#[derive(Debug, Deserialize)]
struct PredictUpcomingRequest {
    home_team: String,
    away_team: String,
    #[serde(default)]
    matchday: u32,
}

/// POST /api/predict/upcoming — forecast an unplayed fixture
async fn predict_upcoming_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictUpcomingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.home_team.trim().is_empty() || req.away_team.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Team names must not be empty".to_string()));
    }
    let historical = state.db.list_finished_matches().map_err(internal_error)?;
    state
        .pipeline
        .predict_upcoming(&req.home_team, &req.away_team, req.matchday, &historical)
        .map(Json)
        .map_err(|e| (predict_error_status(&e), e.to_string()))
}

/// POST /api/retrain — retrain from all stored finished matches
async fn retrain_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let matches = state.db.list_finished_matches().map_err(internal_error)?;
    state
        .pipeline
        .train_and_evaluate(&matches)
        .map(Json)
        .map_err(|e| (predict_error_status(&e), e.to_string()))
}

#[derive(Debug, Serialize)]
struct ModelStatus {
    ready: bool,
    report: Option<TrainingReport>,
}

/// GET /api/model — current model status and last training report
async fn model_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ModelStatus {
        ready: state.pipeline.is_ready(),
        report: state.pipeline.current_report(),
    })
}
