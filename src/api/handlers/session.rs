use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::SessionListQuery;
use crate::api::dtos::responses::SessionView;
use crate::domain::services::session_service::{SessionChanges, SessionDraft};
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SessionDraft>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.session_service.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(SessionView::from(created))))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.session_service.list_available(query.category.as_deref()).await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect::<Vec<_>>()))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_service.get(&session_id).await?;
    Ok(Json(SessionView::from(session)))
}

pub async fn list_my_sessions(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    if !user.is_host() {
        return Err(AppError::Forbidden("Only hosts have sessions".into()));
    }
    let sessions = state.session_service.list_for_host(&user.id).await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect::<Vec<_>>()))
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<String>,
    Json(payload): Json<SessionChanges>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.session_service.update(&user, &session_id, payload).await?;
    Ok(Json(SessionView::from(updated)))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.session_service.delete(&user, &session_id).await?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn reconcile_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.session_service.require_owned(&user, &session_id).await?;
    let outcome = state.ledger.reconcile(&session_id).await?;
    Ok(Json(outcome))
}
