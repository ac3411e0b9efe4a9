use crate::domain::{models::session::{Session, SessionStatus}, ports::SessionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (id, title, description, category, host_id, host_name, date, time, duration_minutes, price, max_bookings, current_bookings, status, meeting_url, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&session.id)
            .bind(&session.title)
            .bind(&session.description)
            .bind(&session.category)
            .bind(&session.host_id)
            .bind(&session.host_name)
            .bind(session.date)
            .bind(&session.time)
            .bind(session.duration_minutes)
            .bind(session.price)
            .bind(session.max_bookings)
            .bind(session.current_bookings)
            .bind(session.status)
            .bind(&session.meeting_url)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_active(&self, category: Option<&str>) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE status = ? AND (? IS NULL OR category = ?) ORDER BY date ASC, time ASC"
        )
            .bind(SessionStatus::Active)
            .bind(category)
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE host_id = ? ORDER BY date ASC, time ASC")
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_ids(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM sessions")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn update(&self, session: &Session) -> Result<Session, AppError> {
        let updated = sqlx::query_as::<_, Session>(
            r#"UPDATE sessions SET title=?, description=?, category=?, date=?, time=?, duration_minutes=?, price=?, max_bookings=?, status=?, meeting_url=?
               WHERE id=? AND current_bookings <= ?
               RETURNING *"#
        )
            .bind(&session.title)
            .bind(&session.description)
            .bind(&session.category)
            .bind(session.date)
            .bind(&session.time)
            .bind(session.duration_minutes)
            .bind(session.price)
            .bind(session.max_bookings)
            .bind(session.status)
            .bind(&session.meeting_url)
            .bind(&session.id)
            .bind(session.max_bookings)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(s) => Ok(s),
            None if self.exists(&session.id).await? => Err(AppError::Conflict(format!(
                "Cannot reduce capacity to {}: more bookings already exist", session.max_bookings
            ))),
            None => Err(AppError::SessionNotFound(session.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND current_bookings = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        if self.exists(id).await? {
            Err(AppError::Conflict("Cannot delete session with reserved spots".into()))
        } else {
            Err(AppError::SessionNotFound(id.to_string()))
        }
    }
}
