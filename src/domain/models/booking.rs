use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::{session::Session, starts_at};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub session_id: String,
    pub session_title: String,
    pub user_id: String,
    pub user_name: String,
    pub host_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    /// A confirmed booking against `session`, with the session's title and schedule copied in.
    pub fn confirmed(session: &Session, user_id: String, user_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            session_title: session.title.clone(),
            user_id,
            user_name,
            host_id: session.host_id.clone(),
            date: session.date,
            time: session.time.clone(),
            status: BookingStatus::Confirmed,
            booked_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        starts_at(self.date, &self.time)
    }
}

/// Filter for booking queries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self { user_id: Some(user_id.to_string()), ..Self::default() }
    }

    pub fn confirmed_for_session(session_id: &str) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            status: Some(BookingStatus::Confirmed),
            ..Self::default()
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_id.as_deref().is_none_or(|u| u == booking.user_id)
            && self.session_id.as_deref().is_none_or(|s| s == booking.session_id)
            && self.status.is_none_or(|s| s == booking.status)
    }
}
