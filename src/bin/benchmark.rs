use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use uuid::Uuid;

const DURATION_SECS: u64 = 10;
const BASE_URL: &str = "http://localhost:3000";
const SPOTS: i32 = 25;
const BOOKERS: usize = 500;

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Booking Contention Benchmark".bold().green());
    println!("Target URL: {}", BASE_URL);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:3000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let host_id = register(&client, "host", Some("host")).await;
    let session_id = setup_session(&client, &host_id).await;

    let mut bookers = Vec::with_capacity(BOOKERS);
    for i in 0..BOOKERS {
        bookers.push(register(&client, &format!("booker-{}", i), None).await);
    }
    println!("{}", "✅ Data created successfully.".green());
    println!("   Session ID: {}", session_id);
    println!("   Spots: {}, Bookers: {}", SPOTS, BOOKERS);

    run_contention(&client, &session_id, bookers).await;
    verify_counter(&client, &session_id).await;

    println!("\n{}", "=".repeat(60));
    println!("Benchmarking Endpoint: {}", "List Sessions (Public Read)".cyan().bold());
    println!("{}", "=".repeat(60));
    println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
    println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

    let url = format!("{}/api/v1/sessions", BASE_URL);
    for rps in [10, 50, 200, 1000] {
        run_read_stage(&client, &url, rps).await;
    }
}

async fn register(client: &Client, label: &str, role: Option<&str>) -> String {
    let uid = format!("bench-{}-{}", label, Uuid::new_v4());
    let res = client.post(format!("{}/api/v1/users", BASE_URL))
        .header("X-User-Id", &uid)
        .json(&json!({
            "name": label,
            "email": format!("{}@bench.local", uid)
        }))
        .send()
        .await
        .expect("Failed to send register request");

    if !res.status().is_success() {
        panic!("Failed to register {}: status {}", label, res.status());
    }

    if let Some(role) = role {
        let res = client.put(format!("{}/api/v1/users/me/role", BASE_URL))
            .header("X-User-Id", &uid)
            .json(&json!({ "role": role }))
            .send()
            .await
            .expect("Failed to send role request");
        if !res.status().is_success() {
            panic!("Failed to select role for {}: status {}", label, res.status());
        }
    }

    uid
}

async fn setup_session(client: &Client, host_id: &str) -> String {
    let date = (Utc::now() + ChronoDuration::days(7)).format("%Y-%m-%d").to_string();
    let res = client.post(format!("{}/api/v1/sessions", BASE_URL))
        .header("X-User-Id", host_id)
        .json(&json!({
            "title": "Benchmark Workshop",
            "description": "Load testing",
            "category": "benchmark",
            "date": date,
            "time": "10:00",
            "duration_minutes": 60,
            "price": 0.0,
            "max_bookings": SPOTS
        }))
        .send()
        .await
        .expect("Failed to create session");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create session. Status: {}. Body: {}", status, txt);
    }

    let body: Value = res.json().await.expect("Failed to parse session response");
    body["id"].as_str().expect("No session id").to_string()
}

/// Fires every booker at the same session at once and checks that exactly the capacity wins.
async fn run_contention(client: &Client, session_id: &str, bookers: Vec<String>) {
    println!("\n{}", "=".repeat(60));
    println!("Contention: {} concurrent bookings for {} spots", bookers.len(), SPOTS);
    println!("{}", "=".repeat(60));

    let url = format!("{}/api/v1/sessions/{}/book", BASE_URL, session_id);
    let mut set = JoinSet::new();
    for uid in bookers {
        let client = client.clone();
        let url = url.clone();
        set.spawn(async move {
            let start = Instant::now();
            let status = client.post(&url)
                .header("X-User-Id", uid)
                .send()
                .await
                .map(|r| r.status())
                .ok();
            (start.elapsed(), status)
        });
    }

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let (mut created, mut full, mut other) = (0, 0, 0);
    while let Some(res) = set.join_next().await {
        let (latency, status) = res.unwrap();
        histogram.record(latency.as_micros() as u64).unwrap();
        match status {
            Some(StatusCode::CREATED) => created += 1,
            Some(StatusCode::CONFLICT) => full += 1,
            _ => other += 1,
        }
    }

    println!("Created: {}  Full: {}  Other: {}", created, full, other);
    println!(
        "Mean: {:.2} ms  P50: {:.2} ms  P99: {:.2} ms",
        histogram.mean() / 1000.0,
        histogram.value_at_quantile(0.5) as f64 / 1000.0,
        histogram.value_at_quantile(0.99) as f64 / 1000.0,
    );

    if created == SPOTS as usize {
        println!("{}", "✅ Capacity held under contention.".green().bold());
    } else {
        println!("{}", format!("❌ Expected {} bookings, got {}", SPOTS, created).red().bold());
    }
}

async fn verify_counter(client: &Client, session_id: &str) {
    let res = client.get(format!("{}/api/v1/sessions/{}", BASE_URL, session_id))
        .send()
        .await
        .expect("Failed to fetch session");
    let body: Value = res.json().await.expect("Failed to parse session");
    let current = body["current_bookings"].as_i64().unwrap_or(-1);
    let spots_left = body["spots_left"].as_i64().unwrap_or(-1);
    println!("Counter after burst: current_bookings={} spots_left={}", current, spots_left);
}

async fn run_read_stage(client: &Client, url: &str, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = url.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let success = match client.get(&url).send().await {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };
                let _ = tx.send((req_start.elapsed(), success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
