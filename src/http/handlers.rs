use super::state::AppState;
use crate::session::{Advance, InterviewSession, SessionError, SessionSnapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CreateInterviewRequest {
    /// Optional question override (default: the configured deck)
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CreateInterviewResponse {
    pub interview_id: Uuid,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    /// True when the deck was already on its last question
    pub complete: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTranscriptRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct WaveformResponse {
    pub trace: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct ClosedResponse {
    pub interview_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn not_found(interview_id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Interview {} not found", interview_id),
        }),
    )
        .into_response()
}

fn session_error(e: SessionError) -> Response {
    let status = match &e {
        SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SessionError::Capture(_) => StatusCode::BAD_GATEWAY,
        SessionError::EmptyDeck => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

async fn find_session(
    state: &AppState,
    interview_id: Uuid,
) -> Option<Arc<Mutex<InterviewSession>>> {
    let sessions = state.sessions.read().await;
    sessions.get(&interview_id).cloned()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews
/// Create a new interview session
pub async fn create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterviewRequest>,
) -> impl IntoResponse {
    let interview_id = Uuid::new_v4();

    let session = match state.build_session(interview_id, req.questions) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build session: {}", e);
            return session_error(e);
        }
    };

    let snapshot = session.snapshot();
    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(interview_id, Arc::new(Mutex::new(session)));
    }

    info!("Interview {} created", interview_id);

    (
        StatusCode::CREATED,
        Json(CreateInterviewResponse {
            interview_id,
            snapshot,
        }),
    )
        .into_response()
}

/// POST /interviews/:interview_id/record/start
/// Acquire the microphone and begin recording
pub async fn start_recording(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let mut session = session.lock().await;
    match session.start_recording().await {
        Ok(()) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        Err(e) => {
            error!("Failed to start recording for {}: {}", interview_id, e);
            session_error(e)
        }
    }
}

/// POST /interviews/:interview_id/record/stop
/// Stop recording and run finalization
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let mut session = session.lock().await;
    match session.stop_recording().await {
        Ok(()) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        Err(e) => {
            error!("Failed to stop recording for {}: {}", interview_id, e);
            session_error(e)
        }
    }
}

/// POST /interviews/:interview_id/question/next
/// Advance to the next question (clears the transcript)
pub async fn next_question(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let mut session = session.lock().await;
    match session.next_question() {
        Ok(advance) => (
            StatusCode::OK,
            Json(NextQuestionResponse {
                complete: matches!(advance, Advance::Complete),
                snapshot: session.snapshot(),
            }),
        )
            .into_response(),
        Err(e) => session_error(e),
    }
}

/// GET /interviews/:interview_id
/// Current session snapshot
pub async fn get_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let session = session.lock().await;
    (StatusCode::OK, Json(session.snapshot())).into_response()
}

/// GET /interviews/:interview_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let session = session.lock().await;
    (
        StatusCode::OK,
        Json(TranscriptResponse {
            transcript: session.transcript(),
        }),
    )
        .into_response()
}

/// PUT /interviews/:interview_id/transcript
/// Manual transcript edit (replacement semantics)
pub async fn update_transcript(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<UpdateTranscriptRequest>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let session = session.lock().await;
    session.set_transcript(req.transcript);
    (
        StatusCode::OK,
        Json(TranscriptResponse {
            transcript: session.transcript(),
        }),
    )
        .into_response()
}

/// GET /interviews/:interview_id/waveform
/// Current amplitude trace (empty while not recording)
pub async fn get_waveform(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = find_session(&state, interview_id).await else {
        return not_found(interview_id);
    };

    let session = session.lock().await;
    (
        StatusCode::OK,
        Json(WaveformResponse {
            trace: session.waveform_trace(),
        }),
    )
        .into_response()
}

/// DELETE /interviews/:interview_id
/// Tear the session down, releasing any live capture
pub async fn delete_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&interview_id)
    };

    match session {
        Some(session) => {
            session.lock().await.close();
            info!("Interview {} closed", interview_id);
            (
                StatusCode::OK,
                Json(ClosedResponse {
                    interview_id,
                    status: "closed".to_string(),
                }),
            )
                .into_response()
        }
        None => not_found(interview_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
