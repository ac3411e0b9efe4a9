use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Host,
    Attendee,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Option<UserRole>,
    pub bio: String,
    pub skills: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// `id` is the uid issued by the external auth provider. The role is picked later.
    pub fn new(id: String, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            role: None,
            bio: String::new(),
            skills: Json(Vec::new()),
            created_at: Utc::now(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Some(UserRole::Host)
    }
}
