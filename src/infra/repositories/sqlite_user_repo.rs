use crate::domain::{models::user::UserProfile, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, AppError> {
        sqlx::query_as::<_, UserProfile>(
            "INSERT INTO users (id, name, email, role, bio, skills, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role)
            .bind(&user.bio)
            .bind(&user.skills)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                    AppError::Conflict("Profile already exists".into())
                } else {
                    AppError::from(e)
                }
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, AppError> {
        sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn update(&self, user: &UserProfile) -> Result<UserProfile, AppError> {
        sqlx::query_as::<_, UserProfile>(
            "UPDATE users SET name = ?, role = ?, bio = ?, skills = ? WHERE id = ? RETURNING *"
        )
            .bind(&user.name)
            .bind(user.role)
            .bind(&user.bio)
            .bind(&user.skills)
            .bind(&user.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".into()))
    }
}
