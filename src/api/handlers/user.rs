use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AuthUser, Identity};
use crate::api::dtos::requests::{RegisterRequest, SelectRoleRequest, UpdateProfileRequest};
use crate::api::dtos::responses::DashboardStatsResponse;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profile_service.register(&uid, &payload.name, &payload.email).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user)
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let skills = payload.skills.map(|s| s.into_list());
    let updated = state.profile_service.update_profile(&user.id, payload.name, payload.bio, skills).await?;
    Ok(Json(updated))
}

pub async fn select_role(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SelectRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.profile_service.select_role(&user.id, payload.role).await?;
    Ok(Json(updated))
}

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_queries.stats_for_user(&user.id, Utc::now()).await?;
    let host = if user.is_host() {
        Some(state.session_service.host_stats(&user.id).await?)
    } else {
        None
    };
    Ok(Json(DashboardStatsResponse { bookings, host }))
}
