mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use session_booking::background::run_reconciliation_pass;
use session_booking::error::AppError;

fn next_week() -> chrono::NaiveDate {
    (Utc::now() + Duration::days(7)).date_naive()
}

async fn drift_is_repaired(app: &TestApp) {
    let session = app.seed_session("host-1", next_week(), "10:00", 5).await;
    app.state.ledger.create("alice", "Alice", &session.id).await.unwrap();
    app.force_counter(&session.id, 4).await;

    let outcome = app.state.ledger.reconcile(&session.id).await.unwrap();

    assert_eq!(outcome.previous, 4);
    assert_eq!(outcome.confirmed, 1);
    assert_eq!(outcome.current, 1);
    assert!(outcome.drifted());
    assert_eq!(app.current_bookings(&session.id).await, 1);
}

async fn consistent_session_is_untouched(app: &TestApp) {
    let session = app.seed_session("host-1", next_week(), "10:00", 5).await;
    app.state.ledger.create("alice", "Alice", &session.id).await.unwrap();
    app.state.ledger.create("bob", "Bob", &session.id).await.unwrap();

    let outcome = app.state.ledger.reconcile(&session.id).await.unwrap();

    assert!(!outcome.drifted());
    assert_eq!(outcome.current, 2);
}

async fn sweep_reports_only_drifted(app: &TestApp) {
    let clean = app.seed_session("host-1", next_week(), "10:00", 5).await;
    let drifted = app.seed_session("host-1", next_week(), "11:00", 5).await;
    app.state.ledger.create("alice", "Alice", &clean.id).await.unwrap();
    app.state.ledger.create("alice", "Alice", &drifted.id).await.unwrap();
    app.force_counter(&drifted.id, 0).await;

    let repaired = app.state.ledger.reconcile_all().await.unwrap();

    assert_eq!(repaired.len(), 1);
    assert_eq!(repaired[0].session_id, drifted.id);
    assert_eq!(app.current_bookings(&drifted.id).await, 1);
    assert_eq!(app.current_bookings(&clean.id).await, 1);

    run_reconciliation_pass(&app.state).await;
    assert!(app.state.ledger.reconcile_all().await.unwrap().is_empty());
}

async fn unknown_session(app: &TestApp) {
    let result = app.state.ledger.reconcile("no-such-session").await;
    assert!(matches!(result, Err(AppError::SessionNotFound(_))));
}

#[tokio::test]
async fn test_drift_repaired_sqlite() {
    drift_is_repaired(&TestApp::new().await).await;
}

#[tokio::test]
async fn test_drift_repaired_memory() {
    drift_is_repaired(&TestApp::in_memory()).await;
}

#[tokio::test]
async fn test_consistent_session_untouched_sqlite() {
    consistent_session_is_untouched(&TestApp::new().await).await;
}

#[tokio::test]
async fn test_consistent_session_untouched_memory() {
    consistent_session_is_untouched(&TestApp::in_memory()).await;
}

#[tokio::test]
async fn test_sweep_reports_only_drifted_sqlite() {
    sweep_reports_only_drifted(&TestApp::new().await).await;
}

#[tokio::test]
async fn test_sweep_reports_only_drifted_memory() {
    sweep_reports_only_drifted(&TestApp::in_memory()).await;
}

#[tokio::test]
async fn test_reconcile_unknown_session() {
    unknown_session(&TestApp::in_memory()).await;
}

#[tokio::test]
async fn test_overbooked_counter_is_clamped() {
    let app = TestApp::in_memory();
    let mut session = app.seed_session("host-1", next_week(), "10:00", 3).await;
    for user in ["a", "b", "c"] {
        app.state.ledger.create(user, user, &session.id).await.unwrap();
    }

    // Capacity lowered underneath three confirmed bookings.
    session.max_bookings = 2;
    session.current_bookings = 2;
    app.store.as_ref().unwrap().put_session(session.clone());

    let outcome = app.state.ledger.reconcile(&session.id).await.unwrap();

    assert_eq!(outcome.confirmed, 3);
    assert_eq!(outcome.current, 2);
    assert_eq!(app.current_bookings(&session.id).await, 2);
}
