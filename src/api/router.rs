use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, user, session, booking};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Profiles
        .route("/api/v1/users", post(user::register))
        .route("/api/v1/users/me", get(user::get_me).put(user::update_me))
        .route("/api/v1/users/me/role", put(user::select_role))
        .route("/api/v1/users/me/stats", get(user::dashboard_stats))

        // Sessions
        .route("/api/v1/sessions", get(session::list_sessions).post(session::create_session))
        .route("/api/v1/sessions/{session_id}", get(session::get_session).put(session::update_session).delete(session::delete_session))
        .route("/api/v1/sessions/{session_id}/reconcile", post(session::reconcile_session))
        .route("/api/v1/hosts/me/sessions", get(session::list_my_sessions))

        // Bookings
        .route("/api/v1/sessions/{session_id}/book", post(booking::create_booking))
        .route("/api/v1/sessions/{session_id}/bookings", get(booking::list_session_bookings))
        .route("/api/v1/bookings/me", get(booking::list_my_bookings))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
