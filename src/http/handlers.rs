use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::state::AppState;
use crate::call::{CallSnapshot, QuickAction, TranscriptEntry};
use crate::context::CallContextSnapshot;
use crate::moderation::{Decision, ModerationError, NewVoiceRequest};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CallActionResponse {
    pub phase: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CallStatusResponse {
    pub session: CallSnapshot,
    pub context: CallContextSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct QuickActionRequest {
    pub action: QuickAction,
}

#[derive(Debug, Serialize)]
pub struct MuteResponse {
    pub recording_indicator: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    pub officer_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Call Session Handlers
// ============================================================================

/// POST /call/start
/// Start a new call session
pub async fn start_call(State(state): State<AppState>) -> impl IntoResponse {
    info!("Call start requested");

    if let Err(e) = state.controller.start_session().await {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let snapshot = state.controller.snapshot().await;
    (
        StatusCode::OK,
        Json(CallActionResponse {
            phase: snapshot.phase.label().to_string(),
            message: "Call session started".to_string(),
        }),
    )
        .into_response()
}

/// POST /call/end
/// End the call; always succeeds
pub async fn end_call(State(state): State<AppState>) -> impl IntoResponse {
    info!("Call end requested");

    state.controller.end_session().await;

    (
        StatusCode::OK,
        Json(CallActionResponse {
            phase: "idle".to_string(),
            message: "Call ended".to_string(),
        }),
    )
        .into_response()
}

/// POST /call/retry
/// Retry a failed call
pub async fn retry_call(State(state): State<AppState>) -> impl IntoResponse {
    info!("Call retry requested");

    if let Err(e) = state.controller.retry().await {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let snapshot = state.controller.snapshot().await;
    (
        StatusCode::OK,
        Json(CallActionResponse {
            phase: snapshot.phase.label().to_string(),
            message: "Retrying call".to_string(),
        }),
    )
        .into_response()
}

/// POST /call/mute
/// Flip the display-only recording indicator
pub async fn toggle_mute(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.toggle_mute().await {
        Ok(recording_indicator) => (
            StatusCode::OK,
            Json(MuteResponse {
                recording_indicator,
                message: "Display indicator toggled; the assistant still hears you".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /call/quick-action
/// Echo a quick-action phrase into the transcript
pub async fn quick_action(
    State(state): State<AppState>,
    Json(req): Json<QuickActionRequest>,
) -> impl IntoResponse {
    match state.controller.send_quick_action(req.action).await {
        Ok(()) => {
            let snapshot = state.controller.snapshot().await;
            (
                StatusCode::OK,
                Json(CallActionResponse {
                    phase: snapshot.phase.label().to_string(),
                    message: "Quick action sent".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /call/status
/// Session snapshot plus the context mirror
pub async fn call_status(State(state): State<AppState>) -> impl IntoResponse {
    let response = CallStatusResponse {
        session: state.controller.snapshot().await,
        context: state.context.snapshot(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /call/transcript
/// Accumulated transcript for the current session
pub async fn call_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let transcript: Vec<TranscriptEntry> = state.controller.transcript().await;
    (StatusCode::OK, Json(transcript)).into_response()
}

// ============================================================================
// Voice Request Moderation Handlers
// ============================================================================

/// GET /voice-requests
/// All voice-agent requests, newest first
pub async fn list_requests(State(state): State<AppState>) -> impl IntoResponse {
    let requests = state.requests.list().await;
    (StatusCode::OK, Json(requests)).into_response()
}

/// GET /voice-requests/counts
/// Stat-card counts
pub async fn request_counts(State(state): State<AppState>) -> impl IntoResponse {
    let counts = state.requests.counts().await;
    (StatusCode::OK, Json(counts)).into_response()
}

/// POST /voice-requests
/// File a request on a citizen's behalf
pub async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<NewVoiceRequest>,
) -> impl IntoResponse {
    match state.requests.submit(req).await {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(e) => {
            error!("Failed to file voice request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /voice-requests/:id/decision
/// Approve or reject a pending request
pub async fn decide_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> impl IntoResponse {
    match state
        .requests
        .decide(id, req.decision, req.officer_notes)
        .await
    {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e @ ModerationError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e @ ModerationError::AlreadyDecided(_)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /widget/visibility?path=/citizen
/// Whether the embedded voice widget should be shown on a route
pub async fn widget_visibility(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(VisibilityResponse {
            visible: state.widget.is_visible(&query.path),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
