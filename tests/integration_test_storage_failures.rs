mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use session_booking::error::AppError;

fn next_week() -> chrono::NaiveDate {
    (Utc::now() + Duration::days(7)).date_naive()
}

#[tokio::test]
async fn test_ledger_reports_storage_unavailable() {
    let app = TestApp::in_memory();
    let store = app.store.clone().unwrap();
    let session = app.seed_session("host-1", next_week(), "10:00", 2).await;
    let booking = app.state.ledger.create("alice", "Alice", &session.id).await.unwrap();

    store.set_online(false);

    let created = app.state.ledger.create("bob", "Bob", &session.id).await;
    assert!(matches!(created, Err(AppError::StorageUnavailable(_))), "got {:?}", created);
    assert!(created.unwrap_err().is_transient());

    let cancelled = app.state.ledger.cancel(&booking.id).await;
    assert!(matches!(cancelled, Err(AppError::StorageUnavailable(_))));

    let listed = app.state.booking_queries.list_for_user("alice", Utc::now()).await;
    assert!(matches!(listed, Err(AppError::StorageUnavailable(_))));

    let swept = app.state.ledger.reconcile_all().await;
    assert!(matches!(swept, Err(AppError::StorageUnavailable(_))));

    store.set_online(true);

    assert_eq!(app.current_bookings(&session.id).await, 1);
    assert_eq!(app.confirmed_count(&session.id).await, 1);
    app.state.ledger.create("bob", "Bob", &session.id).await.unwrap();
    assert_eq!(app.current_bookings(&session.id).await, 2);
}

#[tokio::test]
async fn test_api_maps_storage_outage_to_503() {
    let app = TestApp::in_memory();
    app.register_with_role("host-1", "Hana", "host").await;
    let session_id = app.create_session("host-1", 3).await;

    app.store.as_ref().unwrap().set_online(false);

    let (status, _) = app.request("GET", &format!("/api/v1/sessions/{}", session_id), None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = app.request("GET", "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Storage temporarily unavailable");

    // Profile lookup in the extractor fails first.
    let (status, _) = app.request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some("host-1"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
