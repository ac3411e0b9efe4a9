use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::LedgerOptions;
use crate::domain::models::booking::{Booking, BookingFilter, BookingStatus};
use crate::domain::ports::{BookingRepository, Reconciliation, SessionRepository, StatusUpdate};
use crate::error::AppError;

/// Creates and cancels bookings while keeping each session's `current_bookings` equal to its
/// number of confirmed bookings, within `[0, max_bookings]`.
///
/// The capacity and duplicate checks run twice: once here against a fresh read, for a precise
/// error, and again inside the storage write that inserts the booking and takes the spot. Only
/// the second one is authoritative, so concurrent ledgers over one store cannot overbook.
pub struct BookingLedger {
    sessions: Arc<dyn SessionRepository>,
    bookings: Arc<dyn BookingRepository>,
    options: LedgerOptions,
}

impl BookingLedger {
    pub fn new(sessions: Arc<dyn SessionRepository>, bookings: Arc<dyn BookingRepository>, options: LedgerOptions) -> Self {
        Self { sessions, bookings, options }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, AppError>>) -> Result<T, AppError> {
        tokio::time::timeout(self.options.storage_timeout, call)
            .await
            .map_err(|_| AppError::StorageUnavailable(format!(
                "storage call exceeded {}ms", self.options.storage_timeout.as_millis()
            )))?
    }

    pub async fn create(&self, user_id: &str, user_name: &str, session_id: &str) -> Result<Booking, AppError> {
        let session = self.bounded(self.sessions.find_by_id(session_id)).await?
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;

        if !session.is_active() {
            return Err(AppError::SessionNotActive(session_id.to_string()));
        }
        if session.spots_left() <= 0 {
            return Err(AppError::SessionFull(session_id.to_string()));
        }

        let filter = BookingFilter {
            user_id: Some(user_id.to_string()),
            ..BookingFilter::confirmed_for_session(session_id)
        };
        if !self.bounded(self.bookings.query(&filter)).await?.is_empty() {
            return Err(AppError::DuplicateBooking {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
            });
        }

        let booking = Booking::confirmed(&session, user_id.to_string(), user_name.to_string());
        let created = self.bounded(self.bookings.insert(&booking)).await.inspect_err(|e| {
            debug!("Booking on session {} refused at write time: {}", session_id, e);
        })?;

        info!(
            booking_id = %created.id,
            session_id = %session_id,
            user_id = %user_id,
            "Booking confirmed"
        );
        Ok(created)
    }

    /// Cancelling an already-cancelled booking is a no-op. Returns the booking as cancelled.
    pub async fn cancel(&self, booking_id: &str) -> Result<Booking, AppError> {
        let mut booking = self.bounded(self.bookings.find_by_id(booking_id)).await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if booking.status == BookingStatus::Cancelled {
            debug!("Booking {} already cancelled", booking_id);
            return Ok(booking);
        }

        match self.bounded(self.bookings.update_status(booking_id, BookingStatus::Cancelled)).await? {
            StatusUpdate::NotFound => return Err(AppError::BookingNotFound(booking_id.to_string())),
            StatusUpdate::Unchanged => debug!("Booking {} was cancelled concurrently", booking_id),
            StatusUpdate::Updated => info!(booking_id = %booking_id, session_id = %booking.session_id, "Booking cancelled"),
        }

        booking.status = BookingStatus::Cancelled;
        Ok(booking)
    }

    /// Recomputes the counter from the confirmed bookings, clamped to `[0, max_bookings]`.
    pub async fn reconcile(&self, session_id: &str) -> Result<Reconciliation, AppError> {
        let outcome = self.bounded(self.bookings.recount(session_id)).await?;

        if outcome.overbooked() {
            warn!(
                "Session {} is overbooked: {} confirmed bookings for {} spots",
                session_id, outcome.confirmed, outcome.current
            );
        }
        if outcome.drifted() {
            warn!(
                "Repaired booking counter on session {}: {} -> {}",
                session_id, outcome.previous, outcome.current
            );
        }
        Ok(outcome)
    }

    /// Reconciles every session and returns the ones whose counter had to change.
    pub async fn reconcile_all(&self) -> Result<Vec<Reconciliation>, AppError> {
        let ids = self.bounded(self.sessions.list_ids()).await?;
        let mut repaired = Vec::new();

        for id in ids {
            match self.reconcile(&id).await {
                Ok(outcome) if outcome.drifted() => repaired.push(outcome),
                Ok(_) => {}
                Err(AppError::SessionNotFound(_)) => debug!("Session {} deleted during reconciliation", id),
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => error!("Reconciliation of session {} failed: {}", id, e),
            }
        }
        Ok(repaired)
    }
}
