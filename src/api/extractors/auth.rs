use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::user::UserProfile;
use std::sync::Arc;
use tracing::{Span, error};

/// Header carrying the uid the upstream auth provider verified.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Verified identity without a profile lookup. Used by registration.
pub struct Identity(pub String);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts.headers.get(USER_ID_HEADER)
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .trim()
            .to_string();

        if uid.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Span::current().record("user_id", &uid);
        Ok(Identity(uid))
    }
}

/// Identity with its stored profile. Unknown uids are rejected.
pub struct AuthUser(pub UserProfile);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Identity(uid) = Identity::from_request_parts(parts, state).await?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        match app_state.user_repo.find_by_id(&uid).await {
            Ok(Some(profile)) => Ok(AuthUser(profile)),
            Ok(None) => Err(StatusCode::UNAUTHORIZED),
            Err(e) => {
                error!("Profile lookup failed for {}: {}", uid, e);
                Err(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}
