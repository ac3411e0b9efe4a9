#![allow(dead_code)]

use session_booking::{
    api::router::create_router,
    config::Config,
    domain::models::session::{NewSessionParams, Session},
    domain::ports::{BookingRepository, SessionRepository},
    infra::factory::sqlite_state,
    infra::repositories::memory_store::InMemoryStore,
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    /// Set for the SQLite variant.
    pub pool: Option<SqlitePool>,
    /// Set for the in-memory variant.
    pub store: Option<Arc<InMemoryStore>>,
    pub db_filename: Option<String>,
}

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        port: 0,
        storage_timeout_ms: 5000,
        reconcile_interval_secs: 0,
    }
}

impl TestApp {
    /// App backed by a fresh SQLite file.
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let state = Arc::new(sqlite_state(&test_config(&db_url), pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            pool: Some(pool),
            store: None,
            db_filename: Some(db_filename),
        }
    }

    /// App backed by the in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = Arc::new(AppState::new(
            test_config("memory"),
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            pool: None,
            store: Some(store),
            db_filename: None,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, uid: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header("X-User-Id", uid);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn register(&self, uid: &str, name: &str) -> Value {
        let (status, body) = self.request(
            "POST",
            "/api/v1/users",
            Some(uid),
            Some(json!({ "name": name, "email": format!("{}@example.com", uid) })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    pub async fn register_with_role(&self, uid: &str, name: &str, role: &str) -> Value {
        self.register(uid, name).await;
        let (status, body) = self.request("PUT", "/api/v1/users/me/role", Some(uid), Some(json!({ "role": role }))).await;
        assert_eq!(status, StatusCode::OK, "role selection failed: {}", body);
        body
    }

    /// Creates a session through the API and returns its id.
    pub async fn create_session(&self, host_uid: &str, max_bookings: i32) -> String {
        let date = (Utc::now() + Duration::days(7)).format("%Y-%m-%d").to_string();
        let (status, body) = self.request(
            "POST",
            "/api/v1/sessions",
            Some(host_uid),
            Some(session_payload("Rust Office Hours", &date, "10:00", max_bookings)),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "session creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Writes a session straight into storage, bypassing validation. Used for past dates.
    pub async fn seed_session(&self, host_id: &str, date: NaiveDate, time: &str, max_bookings: i32) -> Session {
        let session = Session::new(NewSessionParams {
            title: format!("Session at {} {}", date, time),
            description: String::new(),
            category: "testing".to_string(),
            host_id: host_id.to_string(),
            host_name: "Host".to_string(),
            date,
            time: time.to_string(),
            duration_minutes: 60,
            price: 0.0,
            max_bookings,
            meeting_url: None,
        });
        self.state.session_repo.create(&session).await.unwrap()
    }

    pub async fn current_bookings(&self, session_id: &str) -> i32 {
        self.state.session_repo.find_by_id(session_id).await.unwrap().unwrap().current_bookings
    }

    pub async fn confirmed_count(&self, session_id: &str) -> i64 {
        self.state.booking_repo.count_confirmed(session_id).await.unwrap()
    }

    /// Overwrites the stored counter without touching bookings.
    pub async fn force_counter(&self, session_id: &str, value: i32) {
        if let Some(pool) = &self.pool {
            sqlx::query("UPDATE sessions SET current_bookings = ? WHERE id = ?")
                .bind(value)
                .bind(session_id)
                .execute(pool)
                .await
                .unwrap();
        } else if let Some(store) = &self.store {
            let mut session = self.state.session_repo.find_by_id(session_id).await.unwrap().unwrap();
            session.current_bookings = value;
            store.put_session(session);
        }
    }
}

pub fn session_payload(title: &str, date: &str, time: &str, max_bookings: i32) -> Value {
    json!({
        "title": title,
        "description": "Bring your questions",
        "category": "programming",
        "date": date,
        "time": time,
        "duration_minutes": 60,
        "price": 25.0,
        "max_bookings": max_bookings,
        "meeting_url": "https://meet.example.com/rust"
    })
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(db_filename) = &self.db_filename {
            let _ = std::fs::remove_file(db_filename);
            let _ = std::fs::remove_file(format!("{}-wal", db_filename));
            let _ = std::fs::remove_file(format!("{}-shm", db_filename));
        }
    }
}
