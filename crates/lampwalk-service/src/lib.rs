// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! HTTP boundary for lampwalk.
//!
//! Routes:
//! - `GET /` serves a minimal page that posts arrangements and replays traces.
//! - `GET /example` serves a sample arrangement document.
//! - `POST /simulate` evaluates an arrangement and returns its verdicts.
//!
//! Evaluation is CPU-bound, so each request runs on the blocking pool under
//! a wall-clock budget. When the budget runs out the request's cancel token
//! is tripped and the caller gets `503 Cancelled`; the worker stops at its
//! next snapshot boundary.

mod page;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use lampwalk_app_core::ServicePrefs;
use lampwalk_core::{CancelToken, ErrorKind, EvaluationConfig, SimError};
use lampwalk_proto::{
    run_request, ErrorBody, SimulateRequest, SimulateResponse, EXAMPLE_ARRANGEMENT_JSON,
};

pub use page::INDEX_HTML;

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Evaluation settings used when a request does not override them.
    pub defaults: EvaluationConfig,
    /// Wall-clock budget per evaluation.
    pub eval_timeout: Duration,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// State derived from persisted preferences.
    pub fn from_prefs(prefs: &ServicePrefs) -> Self {
        Self {
            defaults: prefs.evaluation,
            eval_timeout: Duration::from_millis(prefs.eval_timeout_ms),
            max_body_bytes: prefs.max_body_bytes,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_prefs(&ServicePrefs::default())
    }
}

/// HTTP status for each error kind.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArrangement | ErrorKind::InvalidLamp | ErrorKind::InvalidArgument => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::SimulationDivergent => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Error response: a status plus an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Status that will be sent.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Body that will be sent.
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }

    fn rejected(rejection: &JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            body: ErrorBody {
                error: ErrorKind::InvalidArrangement.as_str().to_owned(),
                message: rejection.body_text(),
                lamp_index: None,
            },
        }
    }

    fn timed_out(budget: Duration) -> Self {
        Self {
            status: status_for(ErrorKind::Cancelled),
            body: ErrorBody {
                error: ErrorKind::Cancelled.as_str().to_owned(),
                message: format!("evaluation exceeded {} ms", budget.as_millis()),
                lamp_index: None,
            },
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: "Internal".to_owned(),
                message,
                lamp_index: None,
            },
        }
    }
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        Self {
            status: status_for(err.kind()),
            body: ErrorBody::from(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Router with every route, the body limit and request tracing installed.
pub fn router(state: AppState) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route("/", get(index))
        .route("/example", get(example))
        .route("/simulate", post(simulate))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /example`
pub async fn example() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        EXAMPLE_ARRANGEMENT_JSON,
    )
}

/// `POST /simulate`
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| {
        debug!(%rejection, "simulate body rejected");
        ApiError::rejected(&rejection)
    })?;

    let individuals = req.individuals.len();
    let token = CancelToken::new();
    let worker_token = token.clone();
    let defaults = state.defaults;
    let task =
        tokio::task::spawn_blocking(move || run_request(&req, defaults, Some(worker_token)));

    match tokio::time::timeout(state.eval_timeout, task).await {
        Ok(Ok(Ok(resp))) => {
            info!(
                individuals,
                success = resp.success,
                rule = %resp.rule,
                step = resp.step_seconds,
                "simulate"
            );
            Ok(Json(resp))
        }
        Ok(Ok(Err(err))) => {
            warn!(kind = %err.kind(), %err, "simulate failed");
            Err(err.into())
        }
        Ok(Err(join)) => {
            error!(?join, "evaluation task failed");
            Err(ApiError::internal(join.to_string()))
        }
        Err(_) => {
            token.cancel();
            warn!(
                individuals,
                budget_ms = state.eval_timeout.as_millis() as u64,
                "simulate timed out; cancelling"
            );
            Err(ApiError::timed_out(state.eval_timeout))
        }
    }
}
