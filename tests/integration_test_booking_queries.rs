mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use std::collections::HashSet;

async fn bookings_split_into_upcoming_and_past(app: &TestApp) {
    let today = Utc::now().date_naive();
    let in_two_days = app.seed_session("host-1", today + Duration::days(2), "09:00", 5).await;
    let tomorrow = app.seed_session("host-1", today + Duration::days(1), "18:00", 5).await;
    let last_week = app.seed_session("host-1", today - Duration::days(7), "10:00", 5).await;
    let yesterday = app.seed_session("host-1", today - Duration::days(1), "10:00", 5).await;
    let cancelled_future = app.seed_session("host-1", today + Duration::days(3), "10:00", 5).await;
    let someone_else = app.seed_session("host-1", today + Duration::days(4), "10:00", 5).await;

    let ledger = &app.state.ledger;
    for session in [&in_two_days, &tomorrow, &last_week, &yesterday, &cancelled_future] {
        ledger.create("alice", "Alice", &session.id).await.unwrap();
    }
    ledger.create("bob", "Bob", &someone_else.id).await.unwrap();

    let to_cancel = app.state.booking_queries.list_for_session(&cancelled_future.id).await.unwrap();
    ledger.cancel(&to_cancel[0].id).await.unwrap();

    let overview = app.state.booking_queries.list_for_user("alice", Utc::now()).await.unwrap();

    let upcoming: Vec<&str> = overview.upcoming.iter().map(|b| b.session_id.as_str()).collect();
    let past: Vec<&str> = overview.past.iter().map(|b| b.session_id.as_str()).collect();

    assert_eq!(upcoming, vec![tomorrow.id.as_str(), in_two_days.id.as_str()]);
    assert_eq!(past, vec![cancelled_future.id.as_str(), yesterday.id.as_str(), last_week.id.as_str()]);

    let mut seen = HashSet::new();
    for b in overview.upcoming.iter().chain(overview.past.iter()) {
        assert_eq!(b.user_id, "alice");
        assert!(seen.insert(b.id.clone()), "booking {} listed twice", b.id);
    }
    assert_eq!(seen.len(), 5);

    let stats = app.state.booking_queries.stats_for_user("alice", Utc::now()).await.unwrap();
    assert_eq!(stats.upcoming, 2);
    assert_eq!(stats.completed, 2);
}

async fn unknown_user_gets_empty_lists(app: &TestApp) {
    let overview = app.state.booking_queries.list_for_user("nobody", Utc::now()).await.unwrap();
    assert!(overview.upcoming.is_empty());
    assert!(overview.past.is_empty());
}

#[tokio::test]
async fn test_bookings_split_sqlite() {
    bookings_split_into_upcoming_and_past(&TestApp::new().await).await;
}

#[tokio::test]
async fn test_bookings_split_memory() {
    bookings_split_into_upcoming_and_past(&TestApp::in_memory()).await;
}

#[tokio::test]
async fn test_unknown_user_sqlite() {
    unknown_user_gets_empty_lists(&TestApp::new().await).await;
}

#[tokio::test]
async fn test_unknown_user_memory() {
    unknown_user_gets_empty_lists(&TestApp::in_memory()).await;
}
