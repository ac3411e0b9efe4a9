use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::models::{
    session::{NewSessionParams, Session, SessionStatus},
    user::UserProfile,
};
use crate::domain::ports::{BookingRepository, SessionRepository};
use crate::domain::services::validation::{
    check_capacity, check_duration, check_price, normalize_meeting_url, normalize_time, parse_date, require_text,
};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub max_bookings: i32,
    pub meeting_url: Option<String>,
}

/// Partial edit. `meeting_url: Some("")` clears the link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<f64>,
    pub max_bookings: Option<i32>,
    pub meeting_url: Option<String>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct HostStats {
    pub active_sessions: usize,
    pub total_bookings: i64,
}

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { sessions, bookings }
    }

    pub async fn create(&self, host: &UserProfile, draft: SessionDraft) -> Result<Session, AppError> {
        if !host.is_host() {
            return Err(AppError::Forbidden("Only hosts can create sessions".into()));
        }

        let session = Session::new(NewSessionParams {
            title: require_text("Title", &draft.title)?,
            description: draft.description.trim().to_string(),
            category: require_text("Category", &draft.category)?,
            host_id: host.id.clone(),
            host_name: host.name.clone(),
            date: parse_date(&draft.date)?,
            time: normalize_time(&draft.time)?,
            duration_minutes: check_duration(draft.duration_minutes)?,
            price: check_price(draft.price)?,
            max_bookings: check_capacity(draft.max_bookings)?,
            meeting_url: normalize_meeting_url(draft.meeting_url)?,
        });

        let created = self.sessions.create(&session).await?;
        info!("Session {} created by host {}", created.id, host.id);
        Ok(created)
    }

    pub async fn get(&self, session_id: &str) -> Result<Session, AppError> {
        self.sessions.find_by_id(session_id).await?
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    /// Loads a session the caller hosts. Sessions of other hosts are reported as forbidden.
    pub async fn require_owned(&self, host: &UserProfile, session_id: &str) -> Result<Session, AppError> {
        let session = self.get(session_id).await?;
        if session.host_id != host.id {
            return Err(AppError::Forbidden("Only the session's host may do that".into()));
        }
        Ok(session)
    }

    /// Edits to the title or schedule are copied onto the session's confirmed bookings.
    pub async fn update(&self, host: &UserProfile, session_id: &str, changes: SessionChanges) -> Result<Session, AppError> {
        let mut session = self.require_owned(host, session_id).await?;
        let before = (session.title.clone(), session.date, session.time.clone());

        if let Some(title) = changes.title { session.title = require_text("Title", &title)?; }
        if let Some(description) = changes.description { session.description = description.trim().to_string(); }
        if let Some(category) = changes.category { session.category = require_text("Category", &category)?; }
        if let Some(date) = changes.date { session.date = parse_date(&date)?; }
        if let Some(time) = changes.time { session.time = normalize_time(&time)?; }
        if let Some(duration) = changes.duration_minutes { session.duration_minutes = check_duration(duration)?; }
        if let Some(price) = changes.price { session.price = check_price(price)?; }
        if let Some(cap) = changes.max_bookings { session.max_bookings = check_capacity(cap)?; }
        if changes.meeting_url.is_some() { session.meeting_url = normalize_meeting_url(changes.meeting_url)?; }
        if let Some(status) = changes.status { session.status = status; }

        let updated = self.sessions.update(&session).await?;
        info!("Session {} updated", session_id);

        if before != (updated.title.clone(), updated.date, updated.time.clone()) {
            let refreshed = self.bookings.refresh_session_details(&updated).await?;
            info!("Copied new details of session {} onto {} bookings", session_id, refreshed);
        }
        Ok(updated)
    }

    pub async fn delete(&self, host: &UserProfile, session_id: &str) -> Result<(), AppError> {
        let session = self.require_owned(host, session_id).await?;

        let confirmed = self.bookings.count_confirmed(session_id).await?;
        if confirmed > 0 || session.current_bookings > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete session with {} confirmed bookings", confirmed.max(session.current_bookings as i64)
            )));
        }

        // Refused by storage if a booking lands after the checks above.
        self.sessions.delete(session_id).await?;
        info!("Session {} deleted", session_id);
        Ok(())
    }

    pub async fn list_available(&self, category: Option<&str>) -> Result<Vec<Session>, AppError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.sessions.list_active(category).await
    }

    pub async fn list_for_host(&self, host_id: &str) -> Result<Vec<Session>, AppError> {
        self.sessions.list_by_host(host_id).await
    }

    pub async fn host_stats(&self, host_id: &str) -> Result<HostStats, AppError> {
        let sessions = self.sessions.list_by_host(host_id).await?;
        Ok(sessions.iter()
            .filter(|s| s.is_active())
            .fold(HostStats::default(), |mut stats, s| {
                stats.active_sessions += 1;
                stats.total_bookings += s.current_bookings as i64;
                stats
            }))
    }
}
