use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: String,
    pub host_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub max_bookings: i32,
    pub current_bookings: i32,
    pub status: SessionStatus,
    pub meeting_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new session. Host identity comes from the caller's profile.
#[derive(Debug, Clone)]
pub struct NewSessionParams {
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: String,
    pub host_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub max_bookings: i32,
    pub meeting_url: Option<String>,
}

impl Session {
    pub fn new(params: NewSessionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            description: params.description,
            category: params.category,
            host_id: params.host_id,
            host_name: params.host_name,
            date: params.date,
            time: params.time,
            duration_minutes: params.duration_minutes,
            price: params.price,
            max_bookings: params.max_bookings,
            current_bookings: 0,
            status: SessionStatus::Active,
            meeting_url: params.meeting_url,
            created_at: Utc::now(),
        }
    }

    pub fn spots_left(&self) -> i32 {
        self.max_bookings - self.current_bookings
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
