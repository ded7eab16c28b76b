//! In-process stand-in for the search service, scripted per test.
//!
//! Mirrors the real server's wire behavior: submissions hand out a search id,
//! progress polls walk a scripted snapshot sequence and keep serving the final
//! entry once reached, reports land under `reports/<name>_report_<stamp>.json`.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use dashmap::DashMap;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
struct AppState {
    /// Snapshot scripts waiting to be claimed by the next submission.
    queued: Arc<Mutex<VecDeque<Vec<Value>>>>,
    /// Per-search snapshot feed; the final entry stays put, as the real
    /// server keeps serving a search's last recorded state.
    scripts: Arc<DashMap<String, VecDeque<Value>>>,
    submits: Arc<AtomicUsize>,
    reports: Arc<AtomicUsize>,
    polls: Arc<DashMap<String, usize>>,
}

#[derive(Clone)]
pub struct StubServer {
    addr: SocketAddr,
    state: AppState,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = AppState {
            queued: Arc::new(Mutex::new(VecDeque::new())),
            scripts: Arc::new(DashMap::new()),
            submits: Arc::new(AtomicUsize::new(0)),
            reports: Arc::new(AtomicUsize::new(0)),
            polls: Arc::new(DashMap::new()),
        };

        let app = Router::new()
            .route("/", get(home))
            .route("/osint", post(submit))
            .route("/progress/{search_id}", get(progress))
            .route("/generate-report", post(report))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener address");
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                eprintln!("stub server stopped: {err}");
            }
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the snapshot sequence the next submitted search will play back.
    pub fn script_next_search(&self, snapshots: Vec<Value>) {
        self.state.queued.lock().unwrap().push_back(snapshots);
    }

    /// Drop all recorded progress for a search, as a server restart would.
    pub fn forget_search(&self, search_id: &str) {
        self.state.scripts.remove(search_id);
    }

    pub fn submits(&self) -> usize {
        self.state.submits.load(Ordering::SeqCst)
    }

    pub fn reports(&self) -> usize {
        self.state.reports.load(Ordering::SeqCst)
    }

    pub fn polls_for(&self, search_id: &str) -> usize {
        self.state
            .polls
            .get(search_id)
            .map(|entry| *entry)
            .unwrap_or(0)
    }
}

async fn home() -> &'static str {
    "Flask is up and running"
}

async fn submit(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.submits.fetch_add(1, Ordering::SeqCst);

    let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name and city required" })),
        ));
    }

    let script = state.queued.lock().unwrap().pop_front().unwrap_or_default();
    let search_id = Uuid::new_v4().to_string();
    state.scripts.insert(search_id.clone(), script.into());
    Ok(Json(json!({ "searchId": search_id })))
}

async fn progress(
    State(state): State<AppState>,
    Path(search_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    *state.polls.entry(search_id.clone()).or_insert(0) += 1;

    let Some(mut entry) = state.scripts.get_mut(&search_id) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Search ID not found" })),
        ));
    };

    let snapshot = if entry.len() > 1 {
        entry.pop_front().expect("non-empty script")
    } else {
        // Empty scripts model a search that never gets anywhere.
        entry.front().cloned().unwrap_or_else(|| {
            running(50, "Processing search results...")
        })
    };
    Ok(Json(snapshot))
}

async fn report(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.reports.fetch_add(1, Ordering::SeqCst);

    let Some(person) = body.get("personData").filter(|v| !v.is_null()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing person data" })),
        ));
    };

    let name = person
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("person")
        .replace(' ', "_");
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    Ok(Json(
        json!({ "reportPath": format!("reports/{name}_report_{stamp}.json") }),
    ))
}

pub fn running(percentage: u8, stage: &str) -> Value {
    json!({
        "percentage": percentage,
        "stage": stage,
        "status": "running",
        "result": null,
        "error": null,
    })
}

pub fn completed(result: Value) -> Value {
    json!({
        "percentage": 100,
        "stage": "Complete!",
        "status": "completed",
        "result": result,
        "error": null,
    })
}

pub fn failed(message: &str) -> Value {
    json!({
        "percentage": 0,
        "stage": "Search failed",
        "status": "error",
        "error": message,
        "result": null,
    })
}

pub fn jane_doe() -> Value {
    json!({
        "name": "Jane Doe",
        "location": "Springfield",
        "confidence": "85%",
        "lastUpdated": "2026-08-24",
        "summary": "Local baker, active on two social networks.",
    })
}
