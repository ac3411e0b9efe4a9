use std::sync::Arc;

use sqlx::types::Json;
use tracing::info;

use crate::domain::models::user::{UserProfile, UserRole};
use crate::domain::ports::UserRepository;
use crate::domain::services::validation::{check_email, normalize_skills, require_text};
use crate::error::AppError;

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// `uid` is the identity issued by the external auth provider.
    pub async fn register(&self, uid: &str, name: &str, email: &str) -> Result<UserProfile, AppError> {
        let uid = require_text("User id", uid)?;
        let profile = UserProfile::new(uid, require_text("Name", name)?, check_email(email)?);

        let created = self.users.create(&profile).await?;
        info!("Registered profile {}", created.id);
        Ok(created)
    }

    pub async fn get(&self, uid: &str) -> Result<UserProfile, AppError> {
        self.users.find_by_id(uid).await?
            .ok_or_else(|| AppError::NotFound("User profile not found".into()))
    }

    pub async fn select_role(&self, uid: &str, role: UserRole) -> Result<UserProfile, AppError> {
        let mut profile = self.get(uid).await?;
        profile.role = Some(role);
        let updated = self.users.update(&profile).await?;
        info!("Profile {} selected role {:?}", uid, role);
        Ok(updated)
    }

    pub async fn update_profile(
        &self,
        uid: &str,
        name: Option<String>,
        bio: Option<String>,
        skills: Option<Vec<String>>,
    ) -> Result<UserProfile, AppError> {
        let mut profile = self.get(uid).await?;

        if let Some(name) = name { profile.name = require_text("Name", &name)?; }
        if let Some(bio) = bio { profile.bio = bio.trim().to_string(); }
        if let Some(skills) = skills { profile.skills = Json(normalize_skills(skills)); }

        self.users.update(&profile).await
    }
}
