//! HTTP API: request/response types, handlers and router.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument, warn};

use crate::error::{GameError, GameErrorKind};
use crate::games::maze::{Grid, Match, Position};
use crate::match_service::MatchService;

/// Request for starting a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    /// Player name (1–100 characters).
    pub player_name: String,
    /// Grid side N.
    pub rows_columns: i64,
    /// Existing player to attach the match to.
    #[serde(default)]
    pub player_id: Option<String>,
}

/// Response for a started match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    /// The generated grid as cell codes.
    pub grid: Grid,
    /// The stored match.
    pub player_data: Match,
}

/// Request for a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Identifier of the match to move in.
    #[serde(alias = "matchId")]
    pub player_id: String,
    /// Target column. Values outside `i32` are rejected as out of bounds.
    pub x: i64,
    /// Target row. Values outside `i32` are rejected as out of bounds.
    pub y: i64,
}

/// Response for a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Whether the move was applied.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The match, when the request resolved to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_data: Option<Match>,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: MatchService,
}

impl AppState {
    /// Wraps a service for the router.
    pub fn new(service: MatchService) -> Self {
        Self { service }
    }
}

/// Error response for non-move endpoints: `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        warn!(%status, kind = %self.0.kind(), "Request failed");
        (
            status,
            Json(serde_json::json!({ "error": self.0.public_message() })),
        )
            .into_response()
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: GameErrorKind) -> StatusCode {
    match kind {
        GameErrorKind::InvalidDimension
        | GameErrorKind::InvalidPlayerName
        | GameErrorKind::InvalidIdFormat => StatusCode::BAD_REQUEST,
        GameErrorKind::NotFound => StatusCode::NOT_FOUND,
        GameErrorKind::OutOfBounds
        | GameErrorKind::Obstacle
        | GameErrorKind::IllegalStep
        | GameErrorKind::AlreadyFinished => StatusCode::UNPROCESSABLE_ENTITY,
        GameErrorKind::PersistenceFailure | GameErrorKind::Unexpected => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Builds the application router.
pub fn router(service: MatchService, allowed_origins: &[String], timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    };

    let trace_layer =
        TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health))
        .route("/api/init", post(init_handler))
        .route("/api/move", post(move_handler))
        .route("/api/matches", get(list_matches_handler))
        .route("/api/matches/{match_id}", get(get_match_handler))
        .route("/api/players/{name}/latest", get(latest_match_handler))
        .with_state(AppState::new(service))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(cors),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "service": "maze_walking" }))
}

/// Starts a match.
#[instrument(skip(state, req), fields(player = %req.player_name, size = req.rows_columns))]
pub async fn init_handler(
    State(state): State<AppState>,
    Json(req): Json<InitRequest>,
) -> Result<Json<InitResponse>, ApiError> {
    let created = state
        .service
        .init_match(req.player_name, req.rows_columns, req.player_id)
        .await?;
    info!(match_id = %created.match_id(), "Init succeeded");
    Ok(Json(InitResponse {
        grid: created.grid().clone(),
        player_data: created,
    }))
}

/// Applies a move.
///
/// Game-logic rejections are `200 OK` with `success: false`; only internal
/// failures change the status code. An unreadable body is a `400` in the same
/// response shape.
#[instrument(skip_all)]
pub async fn move_handler(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> (StatusCode, Json<MoveResponse>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unreadable move request");
            return (
                StatusCode::BAD_REQUEST,
                Json(MoveResponse {
                    success: false,
                    message: rejection.body_text(),
                    player_data: None,
                }),
            );
        }
    };
    debug!(match_id = %req.player_id, x = req.x, y = req.y, "Move requested");

    let target = Position::saturating(req.x, req.y);
    match state.service.make_move(&req.player_id, target).await {
        Ok(report) => (
            StatusCode::OK,
            Json(MoveResponse {
                success: true,
                message: report.message().clone(),
                player_data: Some(report.updated().clone()),
            }),
        ),
        Err(failure) => {
            let status = if failure.error().is_rejection() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(MoveResponse {
                    success: false,
                    message: failure.error().public_message(),
                    player_data: failure.current().clone(),
                }),
            )
        }
    }
}

/// Lists all matches.
#[instrument(skip(state))]
pub async fn list_matches_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let matches = state.service.list_matches().await?;
    Ok(Json(serde_json::json!({
        "count": matches.len(),
        "matches": matches,
    })))
}

/// Gets one match.
#[instrument(skip(state))]
pub async fn get_match_handler(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Match>, ApiError> {
    Ok(Json(state.service.get_match(&match_id).await?))
}

/// Gets a player's most recent match.
#[instrument(skip(state))]
pub async fn latest_match_handler(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Match>, ApiError> {
    Ok(Json(state.service.latest_match_for(&name).await?))
}
