use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::domain::models::{
    booking::{Booking, BookingFilter, BookingStatus},
    session::{Session, SessionStatus},
    user::UserProfile,
};
use crate::domain::ports::{BookingRepository, Reconciliation, SessionRepository, StatusUpdate, UserRepository};
use crate::error::AppError;

/// Process-local document store. Every write that must be conditional goes through a DashMap
/// entry guard, so checks and writes on one key are atomic. Booking writes also hold their
/// session's guard, which makes the booking and the counter change together.
pub struct InMemoryStore {
    sessions: DashMap<String, Session>,
    bookings: DashMap<String, Booking>,
    users: DashMap<String, UserProfile>,
    // (user_id, session_id) -> id of the confirmed booking
    confirmed_pairs: DashMap<(String, String), String>,
    online: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            bookings: DashMap::new(),
            users: DashMap::new(),
            confirmed_pairs: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    /// Simulates losing the backend. While offline every call fails with `StorageUnavailable`.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), AppError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::StorageUnavailable("in-memory store is offline".into()))
        }
    }

    /// Overwrites a session verbatim, counter included. Used to seed drifted state.
    pub fn put_session(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    fn confirmed_on(&self, session_id: &str) -> i64 {
        let filter = BookingFilter::confirmed_for_session(session_id);
        self.bookings.iter().filter(|b| filter.matches(b.value())).count() as i64
    }
}

fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        self.ensure_online()?;
        match self.sessions.entry(session.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("Session {} already exists", session.id))),
            Entry::Vacant(slot) => Ok(slot.insert(session.clone()).value().clone()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError> {
        self.ensure_online()?;
        Ok(self.sessions.get(id).map(|s| s.value().clone()))
    }

    async fn list_active(&self, category: Option<&str>) -> Result<Vec<Session>, AppError> {
        self.ensure_online()?;
        let mut sessions: Vec<Session> = self.sessions.iter()
            .filter(|s| s.status == SessionStatus::Active)
            .filter(|s| category.is_none_or(|c| c == s.category))
            .map(|s| s.value().clone())
            .collect();
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Session>, AppError> {
        self.ensure_online()?;
        let mut sessions: Vec<Session> = self.sessions.iter()
            .filter(|s| s.host_id == host_id)
            .map(|s| s.value().clone())
            .collect();
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    async fn list_ids(&self) -> Result<Vec<String>, AppError> {
        self.ensure_online()?;
        Ok(self.sessions.iter().map(|s| s.key().clone()).collect())
    }

    async fn update(&self, session: &Session) -> Result<Session, AppError> {
        self.ensure_online()?;
        let mut stored = self.sessions.get_mut(&session.id)
            .ok_or_else(|| AppError::SessionNotFound(session.id.clone()))?;

        if session.max_bookings < stored.current_bookings {
            return Err(AppError::Conflict(format!(
                "Cannot reduce capacity to {}: {} bookings already exist", session.max_bookings, stored.current_bookings
            )));
        }

        stored.title = session.title.clone();
        stored.description = session.description.clone();
        stored.category = session.category.clone();
        stored.date = session.date;
        stored.time = session.time.clone();
        stored.duration_minutes = session.duration_minutes;
        stored.price = session.price;
        stored.max_bookings = session.max_bookings;
        stored.status = session.status;
        stored.meeting_url = session.meeting_url.clone();
        Ok(stored.value().clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.ensure_online()?;
        if self.sessions.remove_if(id, |_, s| s.current_bookings == 0).is_some() {
            return Ok(());
        }
        match self.sessions.get(id) {
            Some(s) => Err(AppError::Conflict(format!(
                "Cannot delete session with {} reserved spots", s.current_bookings
            ))),
            None => Err(AppError::SessionNotFound(id.to_string())),
        }
    }
}

// Lock order: a session guard is always taken before any booking or pair guard.
#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<Booking, AppError> {
        self.ensure_online()?;
        let mut session = self.sessions.get_mut(&booking.session_id)
            .ok_or_else(|| AppError::SessionNotFound(booking.session_id.clone()))?;

        if !session.is_active() {
            return Err(AppError::SessionNotActive(booking.session_id.clone()));
        }
        if session.spots_left() <= 0 {
            return Err(AppError::SessionFull(booking.session_id.clone()));
        }

        let key = (booking.user_id.clone(), booking.session_id.clone());
        match self.confirmed_pairs.entry(key) {
            Entry::Occupied(_) => Err(AppError::DuplicateBooking {
                user_id: booking.user_id.clone(),
                session_id: booking.session_id.clone(),
            }),
            Entry::Vacant(slot) => {
                self.bookings.insert(booking.id.clone(), booking.clone());
                slot.insert(booking.id.clone());
                session.current_bookings += 1;
                Ok(booking.clone())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        self.ensure_online()?;
        Ok(self.bookings.get(id).map(|b| b.value().clone()))
    }

    async fn query(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        self.ensure_online()?;
        let mut bookings: Vec<Booking> = self.bookings.iter()
            .filter(|b| filter.matches(b.value()))
            .map(|b| b.value().clone())
            .collect();
        bookings.sort_by_key(|b| b.booked_at);
        Ok(bookings)
    }

    async fn count_confirmed(&self, session_id: &str) -> Result<i64, AppError> {
        self.ensure_online()?;
        Ok(self.confirmed_on(session_id))
    }

    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<StatusUpdate, AppError> {
        self.ensure_online()?;
        let Some(session_id) = self.bookings.get(id).map(|b| b.session_id.clone()) else {
            return Ok(StatusUpdate::NotFound);
        };
        if status == BookingStatus::Confirmed {
            return Ok(StatusUpdate::Unchanged);
        }

        // Held across the flip so a recount sees both writes or neither.
        let mut session = self.sessions.get_mut(&session_id);

        let Some(mut stored) = self.bookings.get_mut(id) else {
            return Ok(StatusUpdate::NotFound);
        };
        if stored.status != BookingStatus::Confirmed {
            return Ok(StatusUpdate::Unchanged);
        }
        stored.status = status;
        let key = (stored.user_id.clone(), stored.session_id.clone());
        drop(stored);
        self.confirmed_pairs.remove_if(&key, |_, booking_id| booking_id == id);

        if let Some(session) = session.as_mut() {
            session.current_bookings = (session.current_bookings - 1).max(0);
        }
        Ok(StatusUpdate::Updated)
    }

    async fn recount(&self, session_id: &str) -> Result<Reconciliation, AppError> {
        self.ensure_online()?;
        let mut session = self.sessions.get_mut(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;

        let confirmed = self.confirmed_on(session_id);
        let previous = session.current_bookings;
        session.current_bookings = confirmed.clamp(0, session.max_bookings as i64) as i32;

        Ok(Reconciliation {
            session_id: session_id.to_string(),
            previous,
            confirmed,
            current: session.current_bookings,
        })
    }

    async fn refresh_session_details(&self, session: &Session) -> Result<u64, AppError> {
        self.ensure_online()?;
        let filter = BookingFilter::confirmed_for_session(&session.id);
        let mut changed = 0;
        for mut booking in self.bookings.iter_mut() {
            if !filter.matches(booking.value()) {
                continue;
            }
            if booking.session_title != session.title || booking.date != session.date || booking.time != session.time {
                booking.session_title = session.title.clone();
                booking.date = session.date;
                booking.time = session.time.clone();
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, AppError> {
        self.ensure_online()?;
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict("Profile already exists".into())),
            Entry::Vacant(slot) => Ok(slot.insert(user.clone()).value().clone()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, AppError> {
        self.ensure_online()?;
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn update(&self, user: &UserProfile) -> Result<UserProfile, AppError> {
        self.ensure_online()?;
        let mut stored = self.users.get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;
        stored.name = user.name.clone();
        stored.role = user.role;
        stored.bio = user.bio.clone();
        stored.skills = user.skills.clone();
        Ok(stored.value().clone())
    }
}
