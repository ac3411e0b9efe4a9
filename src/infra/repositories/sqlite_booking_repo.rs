use crate::domain::models::{booking::{Booking, BookingFilter, BookingStatus}, session::{Session, SessionStatus}};
use crate::domain::ports::{BookingRepository, Reconciliation, StatusUpdate};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqlitePool, Row};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn insert(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            "UPDATE sessions SET current_bookings = current_bookings + 1
             WHERE id = ? AND status = ? AND current_bookings < max_bookings"
        )
            .bind(&booking.session_id).bind(SessionStatus::Active)
            .execute(&mut *tx)
            .await?;

        if reserved.rows_affected() == 0 {
            let status: Option<(SessionStatus,)> = sqlx::query_as("SELECT status FROM sessions WHERE id = ?")
                .bind(&booking.session_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match status {
                None => AppError::SessionNotFound(booking.session_id.clone()),
                Some((SessionStatus::Cancelled,)) => AppError::SessionNotActive(booking.session_id.clone()),
                Some((SessionStatus::Active,)) => AppError::SessionFull(booking.session_id.clone()),
            });
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, session_id, session_title, user_id, user_name, host_id, date, time, status, booked_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.session_id).bind(&booking.session_title)
            .bind(&booking.user_id).bind(&booking.user_name).bind(&booking.host_id)
            .bind(booking.date).bind(&booking.time).bind(booking.status).bind(booking.booked_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                // idx_bookings_one_confirmed; dropping the transaction rolls the spot back.
                if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                    AppError::DuplicateBooking {
                        user_id: booking.user_id.clone(),
                        session_id: booking.session_id.clone(),
                    }
                } else {
                    AppError::from(e)
                }
            })?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::from)
    }

    async fn query(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE (? IS NULL OR user_id = ?) AND (? IS NULL OR session_id = ?) AND (? IS NULL OR status = ?)
             ORDER BY booked_at ASC"
        )
            .bind(&filter.user_id).bind(&filter.user_id)
            .bind(&filter.session_id).bind(&filter.session_id)
            .bind(filter.status).bind(filter.status)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn count_confirmed(&self, session_id: &str) -> Result<i64, AppError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE session_id = ? AND status = ?")
            .bind(session_id).bind(BookingStatus::Confirmed)
            .fetch_one(&self.pool).await?;
        Ok(result.get::<i64, _>("count"))
    }

    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<StatusUpdate, AppError> {
        let mut tx = self.pool.begin().await?;

        let flipped: Option<(String,)> = sqlx::query_as(
            "UPDATE bookings SET status = ? WHERE id = ? AND status = ? AND status != ? RETURNING session_id"
        )
            .bind(status).bind(id).bind(BookingStatus::Confirmed).bind(status)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((session_id,)) = flipped else {
            let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM bookings WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            return Ok(if found.is_some() { StatusUpdate::Unchanged } else { StatusUpdate::NotFound });
        };

        // No row when the session is gone.
        sqlx::query("UPDATE sessions SET current_bookings = MAX(current_bookings - 1, 0) WHERE id = ?")
            .bind(&session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(StatusUpdate::Updated)
    }

    async fn recount(&self, session_id: &str) -> Result<Reconciliation, AppError> {
        let mut tx = self.pool.begin().await?;

        // Takes the write lock before counting.
        let locked: Option<(i32, i32)> = sqlx::query_as(
            "UPDATE sessions SET current_bookings = current_bookings WHERE id = ? RETURNING current_bookings, max_bookings"
        )
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((previous, max_bookings)) = locked else {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        };

        let (confirmed,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE session_id = ? AND status = ?")
            .bind(session_id).bind(BookingStatus::Confirmed)
            .fetch_one(&mut *tx)
            .await?;

        let current = confirmed.clamp(0, max_bookings as i64) as i32;
        if current != previous {
            sqlx::query("UPDATE sessions SET current_bookings = ? WHERE id = ?")
                .bind(current).bind(session_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Reconciliation { session_id: session_id.to_string(), previous, confirmed, current })
    }

    async fn refresh_session_details(&self, session: &Session) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET session_title = ?, date = ?, time = ?
             WHERE session_id = ? AND status = ? AND (session_title != ? OR date != ? OR time != ?)"
        )
            .bind(&session.title).bind(session.date).bind(&session.time)
            .bind(&session.id).bind(BookingStatus::Confirmed)
            .bind(&session.title).bind(session.date).bind(&session.time)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
