//! HTTP routes
//!
//! JSON API over the engine plus the static pages of the web client. Routes
//! under `/admin` sit behind HTTP basic authentication.

use crate::admin::AdminService;
use crate::error::{GameError, HistoryError};
use crate::game::GameEngine;
use crate::history::HistoryStore;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{error, warn};
use shared::{
    ActionResponse, AutoSwitchRequest, ErrorResponse, ModelRequest, SubmitRequest, TimerRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Login accepted on the admin routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub user: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Checks an `Authorization: Basic ...` header value.
    pub fn verify(&self, header_value: &str) -> bool {
        let Some(encoded) = header_value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        match decoded.split_once(':') {
            Some((user, password)) => user == self.user && password == self.password,
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub game: Arc<GameEngine>,
    pub admin: AdminService,
    pub history: Arc<HistoryStore>,
    pub credentials: Arc<AdminCredentials>,
    pub pages: Arc<PathBuf>,
}

impl AppState {
    pub fn new(game: Arc<GameEngine>, credentials: AdminCredentials, pages: PathBuf) -> Self {
        Self {
            admin: AdminService::new(Arc::clone(&game)),
            history: Arc::clone(game.history()),
            game,
            credentials: Arc::new(credentials),
            pages: Arc::new(pages),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] JsonRejection),

    #[error("invalid history index {0:?}")]
    InvalidHistoryIndex(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MalformedRequest(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request".to_string())
            }
            ApiError::InvalidHistoryIndex(_) => {
                (StatusCode::BAD_REQUEST, "Index invalide".to_string())
            }
            ApiError::Game(GameError::InvalidIndex { .. }) => {
                (StatusCode::BAD_REQUEST, "Index modèle invalide".to_string())
            }
            ApiError::History(HistoryError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Dessin introuvable".to_string())
            }
            ApiError::Game(GameError::History(_)) | ApiError::History(_) => {
                error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erreur d'enregistrement, réessaie.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/", get(admin_page))
        .route("/admin/timer", post(set_timer))
        .route("/admin/model", post(force_model))
        .route("/admin/skip", post(skip_model))
        .route("/admin/autoswitch", post(set_auto_switch))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/", get(dashboard_page))
        .route("/history", get(history_page))
        .route("/view/:index", get(view_page))
        .route("/api/state", get(get_state))
        .route("/api/submit", post(submit))
        .route("/api/history", get(get_full_history))
        .route("/api/history/:index", get(get_history_item))
        .merge(admin)
        .with_state(state)
}

async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| state.credentials.verify(value));

    if !authorized {
        warn!("Rejected admin request to {}", request.uri());
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"Authorization Required\"")],
        )
            .into_response();
    }

    next.run(request).await
}

async fn serve_page(state: &AppState, name: &str) -> Response {
    let path = state.pages.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!("Page {} unavailable: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "page not found").into_response()
        }
    }
}

async fn dashboard_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "dashboard.html").await
}

async fn history_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "history.html").await
}

// The page fetches the entry itself through the API
async fn view_page(State(state): State<AppState>, Path(_index): Path<String>) -> Response {
    serve_page(&state, "view.html").await
}

async fn admin_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "admin.html").await
}

async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.game.snapshot().await)
}

async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected submission: {}", rejection);
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ActionResponse::failed("Bad request")),
            )
                .into_response());
        }
    };

    let outcome = state.game.submit(request.grid, request.name).await?;
    Ok(Json(ActionResponse::from(outcome)).into_response())
}

async fn get_full_history(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.history.all().await)
}

async fn get_history_item(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Response, ApiError> {
    let index: i64 = index
        .parse()
        .map_err(|_| ApiError::InvalidHistoryIndex(index.clone()))?;

    // Negative indices are well-formed but never found
    let index = usize::try_from(index).unwrap_or(usize::MAX);
    let entry = state.history.get(index).await?;

    Ok(Json(entry).into_response())
}

async fn set_timer(
    State(state): State<AppState>,
    payload: Result<Json<TimerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(request) = payload?;
    let applied = state.admin.set_timer(request.duration_sec).await;
    Ok(Json(ActionResponse::ok(format!(
        "Timer mis à jour ({}s) et réinitialisé.",
        applied.as_secs()
    ))))
}

async fn force_model(
    State(state): State<AppState>,
    payload: Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(request) = payload?;
    state.admin.force_model(request.model_index).await?;
    Ok(Json(ActionResponse::ok("Modèle changé avec succès.")))
}

async fn skip_model(State(state): State<AppState>) -> Json<ActionResponse> {
    let next = state.admin.skip_model().await;
    Json(ActionResponse::ok(format!("Passé au dessin suivant ({}).", next)))
}

async fn set_auto_switch(
    State(state): State<AppState>,
    payload: Result<Json<AutoSwitchRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(request) = payload?;
    state.admin.set_auto_switch(request.enabled).await;

    let mode = if request.enabled { "activé" } else { "désactivé" };
    Ok(Json(ActionResponse::ok(format!("Mode Auto-Switch {}", mode))))
}
