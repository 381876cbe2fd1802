use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/interviews", post(handlers::create_interview))
        .route(
            "/interviews/:interview_id",
            get(handlers::get_interview).delete(handlers::delete_interview),
        )
        // Recording control
        .route(
            "/interviews/:interview_id/record/start",
            post(handlers::start_recording),
        )
        .route(
            "/interviews/:interview_id/record/stop",
            post(handlers::stop_recording),
        )
        .route(
            "/interviews/:interview_id/question/next",
            post(handlers::next_question),
        )
        // Transcript and waveform
        .route(
            "/interviews/:interview_id/transcript",
            get(handlers::get_transcript).put(handlers::update_transcript),
        )
        .route(
            "/interviews/:interview_id/waveform",
            get(handlers::get_waveform),
        )
        // Request logging + CORS for the browser front end
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
