use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::booking::{Booking, BookingFilter};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Default)]
pub struct BookingOverview {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct BookingStats {
    pub upcoming: usize,
    pub completed: usize,
}

/// Confirmed bookings that start after `now` are upcoming, soonest first. Everything else
/// (cancelled, or already started) is past, most recent first. Ties fall back to `booked_at`.
pub fn partition_bookings(bookings: Vec<Booking>, now: DateTime<Utc>) -> BookingOverview {
    let (mut upcoming, mut past): (Vec<Booking>, Vec<Booking>) = bookings
        .into_iter()
        .partition(|b| b.is_confirmed() && b.starts_at() > now);

    upcoming.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()).then(a.booked_at.cmp(&b.booked_at)));
    past.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()).then(b.booked_at.cmp(&a.booked_at)));

    BookingOverview { upcoming, past }
}

pub fn booking_stats(bookings: &[Booking], now: DateTime<Utc>) -> BookingStats {
    bookings.iter()
        .filter(|b| b.is_confirmed())
        .fold(BookingStats::default(), |mut stats, b| {
            if b.starts_at() > now {
                stats.upcoming += 1;
            } else {
                stats.completed += 1;
            }
            stats
        })
}

pub struct BookingQueryService {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingQueryService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn list_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<BookingOverview, AppError> {
        let bookings = self.bookings.query(&BookingFilter::for_user(user_id)).await?;
        Ok(partition_bookings(bookings, now))
    }

    pub async fn stats_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<BookingStats, AppError> {
        let bookings = self.bookings.query(&BookingFilter::for_user(user_id)).await?;
        Ok(booking_stats(&bookings, now))
    }

    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<Booking>, AppError> {
        let filter = BookingFilter {
            session_id: Some(session_id.to_string()),
            ..BookingFilter::default()
        };
        self.bookings.query(&filter).await
    }

    pub async fn find(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.bookings.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
    }
}
