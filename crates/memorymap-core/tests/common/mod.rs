//! In-process mock of the diary backend.
//!
//! Every request is recorded (method, path, query, bearer header, JSON body)
//! and answered from a small in-memory table of entries.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use memorymap_core::analytics::Analytics;
use memorymap_core::config::MemoryMapConfig;
use memorymap_core::pages::PageContext;
use memorymap_core::store::{MemoryStore, SharedStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct Backend {
    pub requests: Mutex<Vec<Recorded>>,
    pub entries: Mutex<Vec<Value>>,
    pub fail_deletes: AtomicBool,
    pub slow_lists: AtomicBool,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn seed(&self, entries: Vec<Value>) {
        *self.entries.lock().unwrap() = entries;
    }
}

pub struct MockServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

pub async fn start() -> MockServer {
    let backend = Arc::new(Backend::default());
    let state = backend.clone();
    let app = axum::Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let backend = state.clone();
            async move { handle(backend, method, uri, headers, body).await }
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockServer {
        base_url: format!("http://{addr}"),
        backend,
    }
}

impl MockServer {
    pub fn config(&self) -> MemoryMapConfig {
        let mut config = MemoryMapConfig::default_config();
        config.api.base_url = self.base_url.clone();
        config.api.timeout_secs = Some(10);
        config
    }

    pub fn context(&self, store: SharedStore) -> PageContext {
        PageContext::new(&self.config(), store, Arc::new(Analytics::disabled())).unwrap()
    }

    pub fn context_with_token(&self, token: &str) -> PageContext {
        self.context(Arc::new(MemoryStore::with_token(token)))
    }
}

pub fn entry(id: &str, title: &str, content: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "created_at": "2024-05-01T10:00:00Z",
        "user_id": "u1",
    })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn handle(
    backend: Arc<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body_json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    backend.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body_json.clone(),
    });

    let diary_id = path.strip_prefix("/api/v1/diary/").filter(|s| !s.is_empty());

    match (method.as_str(), path.as_str(), diary_id) {
        ("GET", "/", _) => reply(StatusCode::OK, json!({"message": "MemoryMap API", "status": "ok"})),

        ("GET", "/api/v1/diary/", _) => {
            if backend.slow_lists.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            let entries = backend.entries.lock().unwrap().clone();
            let count = entries.len();
            reply(StatusCode::OK, json!({"entries": entries, "count": count}))
        }
        ("POST", "/api/v1/diary/", _) => {
            let id = format!("e{}", backend.entries.lock().unwrap().len() + 1);
            let mut stored = body_json.clone();
            stored["id"] = json!(id);
            backend.entries.lock().unwrap().push(stored);
            reply(
                StatusCode::CREATED,
                json!({"entry_id": id, "message": "Diary entry created successfully"}),
            )
        }
        ("GET", _, Some(id)) => {
            let found = backend
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e["id"] == id)
                .cloned();
            match found {
                Some(e) => reply(StatusCode::OK, json!({"entry": e})),
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Diary entry not found"})),
            }
        }
        ("DELETE", _, Some(_)) => {
            if backend.fail_deletes.load(Ordering::SeqCst) {
                reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"detail": "Database unavailable"}),
                )
            } else {
                // Deleted entries keep being listed, like a lagging replica.
                reply(StatusCode::OK, json!({"message": "Diary entry deleted successfully"}))
            }
        }

        ("POST", "/api/v1/emotion/analyze", _) => reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [
                {"loc": ["body", "text"], "msg": "text too short"},
                {"loc": ["body"], "msg": "try again"}
            ]}),
        ),

        ("POST", "/api/v1/quotes/generate", _) => reply(
            StatusCode::OK,
            json!({
                "id": "q1",
                "quote": "Joy is not in things; it is in us.",
                "author": "Richard Wagner",
                "emotion": body_json["emotion"],
                "colors": {"primary": "#FFD700"},
                "timestamp": "2024-05-01T10:00:00Z"
            }),
        ),
        ("GET", "/api/v1/quotes/history", _) => reply(StatusCode::OK, json!({"quotes": []})),
        ("GET", p, _) if p.starts_with("/api/v1/quotes/colors/") => {
            let emotion = p.trim_start_matches("/api/v1/quotes/colors/");
            reply(
                StatusCode::OK,
                json!({"emotion": emotion, "colors": {"primary": "#87CEEB", "text": "#1A1A1A"}}),
            )
        }

        ("POST", "/emotion/image/generate", _) => reply(
            StatusCode::OK,
            json!({"image_url": "https://images.example.com/calm-lake.png"}),
        ),

        ("GET", "/api/v1/profile/me", _) => reply(
            StatusCode::OK,
            json!({"id": "u1", "full_name": "Ada Lovelace", "email": "ada@example.com"}),
        ),
        ("PUT", "/api/v1/profile/me", _) => {
            let mut profile = json!({"id": "u1", "full_name": "Ada Lovelace", "email": "ada@example.com"});
            if let (Some(target), Some(patch)) = (profile.as_object_mut(), body_json.as_object()) {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
            }
            reply(StatusCode::OK, profile)
        }

        ("POST", "/api/v1/auth/login", _) => {
            if body_json["password"] == "secret" {
                reply(
                    StatusCode::OK,
                    json!({"access_token": "tok-123", "token_type": "bearer"}),
                )
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Incorrect email or password"}),
                )
            }
        }

        ("GET", "/coaching/insights", _) => reply(
            StatusCode::OK,
            json!({"insights": {
                "total_entries": 3,
                "emotion_distribution": {"joy": 2, "sadness": 1},
                "most_common_emotions": ["joy", "sadness"]
            }}),
        ),

        _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not Found"})),
    }
}
