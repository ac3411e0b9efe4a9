use crate::domain::models::{
    booking::{Booking, BookingFilter, BookingStatus},
    session::Session,
    user::UserProfile,
};
use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;

/// Outcome of a booking status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    /// The booking exists but was not in a state that allows the transition.
    Unchanged,
    NotFound,
}

/// Result of recomputing one session's counter from its confirmed bookings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reconciliation {
    pub session_id: String,
    pub previous: i32,
    pub confirmed: i64,
    pub current: i32,
}

impl Reconciliation {
    pub fn drifted(&self) -> bool {
        self.previous != self.current
    }

    pub fn overbooked(&self) -> bool {
        self.confirmed > self.current as i64
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError>;
    async fn list_active(&self, category: Option<&str>) -> Result<Vec<Session>, AppError>;
    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Session>, AppError>;
    async fn list_ids(&self) -> Result<Vec<String>, AppError>;
    /// Writes host-editable fields and status. Never touches `current_bookings`, and fails with
    /// `Conflict` if `max_bookings` would drop below it.
    async fn update(&self, session: &Session) -> Result<Session, AppError>;
    /// Removes the session only while `current_bookings` is zero; otherwise `Conflict`.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Booking writes also own the session's `current_bookings` counter: each write below moves the
/// booking row and the counter in one storage unit, so no reader ever sees one without the other.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts a confirmed booking and takes one spot on its session.
    ///
    /// Fails with `SessionNotFound`, `SessionNotActive`, `SessionFull` or `DuplicateBooking`,
    /// in that order of precedence, leaving nothing written.
    async fn insert(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn query(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    async fn count_confirmed(&self, session_id: &str) -> Result<i64, AppError>;
    /// Only bookings that are still confirmed can transition. A cancellation gives the spot back
    /// (floored at zero) if the session still exists.
    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<StatusUpdate, AppError>;
    /// Sets the session's counter to its confirmed bookings, clamped to `[0, max_bookings]`.
    async fn recount(&self, session_id: &str) -> Result<Reconciliation, AppError>;
    /// Copies the session's title and schedule onto its confirmed bookings. Returns how many changed.
    async fn refresh_session_details(&self, session: &Session) -> Result<u64, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, AppError>;
    async fn update(&self, user: &UserProfile) -> Result<UserProfile, AppError>;
}
