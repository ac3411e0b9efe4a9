use crate::domain::models::session::Session;
use crate::domain::services::{booking_query::BookingStats, session_service::HostStats};
use serde::Serialize;

#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub spots_left: i32,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        let spots_left = session.spots_left().max(0);
        Self { session, spots_left }
    }
}

#[derive(Serialize)]
pub struct DashboardStatsResponse {
    #[serde(flatten)]
    pub bookings: BookingStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostStats>,
}
