pub mod booking;
pub mod session;
pub mod user;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Start instant of a scheduled slot. Times are `HH:MM` and read as UTC; an unparsable time
/// falls back to midnight so the calendar date still orders correctly.
pub fn starts_at(date: NaiveDate, time: &str) -> DateTime<Utc> {
    let time = NaiveTime::parse_from_str(time, "%H:%M").unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}
