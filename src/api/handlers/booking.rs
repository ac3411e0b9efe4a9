use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_booking: user {} on session {}", user.id, session_id);

    let session = state.session_service.get(&session_id).await?;
    if session.host_id == user.id {
        return Err(AppError::Forbidden("Hosts cannot book their own session".into()));
    }

    let created = state.ledger.create(&user.id, &user.name, &session_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let overview = state.booking_queries.list_for_user(&user.id, Utc::now()).await?;
    Ok(Json(overview))
}

pub async fn list_session_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.session_service.require_owned(&user, &session_id).await?;
    let bookings = state.booking_queries.list_for_session(&session_id).await?;
    Ok(Json(bookings))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_queries.find(&booking_id).await?;
    if booking.user_id != user.id && booking.host_id != user.id {
        return Err(AppError::Forbidden("Only the booker or the session's host may cancel".into()));
    }

    let cancelled = state.ledger.cancel(&booking_id).await?;
    Ok(Json(cancelled))
}
