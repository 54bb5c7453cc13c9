//! Fire-and-forget usage analytics.
//!
//! Events come from a fixed taxonomy ([`AnalyticsEvent`]) and are handed to a
//! background writer task over an unbounded channel, so [`Analytics::log`]
//! never blocks and never fails. Sinks: `tracing` (an `info` event on the
//! `memorymap::analytics` target), `jsonl` (one [`RecordedEvent`] per line,
//! append-only) or `none`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    Login { method: String },
    SignUp { method: String },
    Logout,
    DiaryEntryCreated { word_count: usize, emotion: Option<String> },
    DiaryAnalysis { analysis_type: String, success: bool },
    EmotionAnalysisUsed { text_length: usize, result: Option<String> },
    LocationExtractionUsed { locations_found: usize },
    ImageGenerationUsed { prompt_length: usize, success: bool },
    ReflectiveQuestionsGenerated { question_count: usize },
    PersonalAdviceRequested { entry_count: usize },
    GalleryViewed { image_count: usize },
    ImageDownloaded { image_id: String },
    ImageFavorited { image_id: String, added: bool },
    MapViewed { memory_count: usize },
    MapMarkerClicked { memory_id: String },
    PageView { page_title: String, page_location: String },
    ErrorOccurred { error_type: String, error_message: String },
    ButtonClicked { button_name: String, location: String },
    Search { search_term: String, result_count: usize },
    PerformanceMetric { action: String, duration_ms: u64 },
    Custom {
        name: String,
        value: Value,
        params: Map<String, Value>,
    },
}

impl AnalyticsEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &str {
        match self {
            Self::Login { .. } => "login",
            Self::SignUp { .. } => "sign_up",
            Self::Logout => "logout",
            Self::DiaryEntryCreated { .. } => "diary_entry_created",
            Self::DiaryAnalysis { .. } => "diary_analysis",
            Self::EmotionAnalysisUsed { .. } => "emotion_analysis_used",
            Self::LocationExtractionUsed { .. } => "location_extraction_used",
            Self::ImageGenerationUsed { .. } => "image_generation_used",
            Self::ReflectiveQuestionsGenerated { .. } => "reflective_questions_generated",
            Self::PersonalAdviceRequested { .. } => "personal_advice_requested",
            Self::GalleryViewed { .. } => "gallery_viewed",
            Self::ImageDownloaded { .. } => "image_downloaded",
            Self::ImageFavorited { .. } => "image_favorited",
            Self::MapViewed { .. } => "map_viewed",
            Self::MapMarkerClicked { .. } => "map_marker_clicked",
            Self::PageView { .. } => "page_view",
            Self::ErrorOccurred { .. } => "error_occurred",
            Self::ButtonClicked { .. } => "button_clicked",
            Self::Search { .. } => "search",
            Self::PerformanceMetric { .. } => "performance_metric",
            Self::Custom { name, .. } => name.as_str(),
        }
    }

    pub fn params(&self) -> Map<String, Value> {
        let v = match self {
            Self::Login { method } | Self::SignUp { method } => json!({ "method": method }),
            Self::Logout => json!({}),
            Self::DiaryEntryCreated {
                word_count,
                emotion,
            } => json!({
                "word_count": word_count,
                "emotion": emotion,
                "content_type": "diary_entry",
            }),
            Self::DiaryAnalysis {
                analysis_type,
                success,
            } => json!({ "analysis_type": analysis_type, "success": success }),
            Self::EmotionAnalysisUsed {
                text_length,
                result,
            } => json!({ "text_length": text_length, "result": result }),
            Self::LocationExtractionUsed { locations_found } => {
                json!({ "locations_found": locations_found })
            }
            Self::ImageGenerationUsed {
                prompt_length,
                success,
            } => json!({ "prompt_length": prompt_length, "success": success }),
            Self::ReflectiveQuestionsGenerated { question_count } => {
                json!({ "question_count": question_count })
            }
            Self::PersonalAdviceRequested { entry_count } => json!({ "entry_count": entry_count }),
            Self::GalleryViewed { image_count } => json!({ "image_count": image_count }),
            Self::ImageDownloaded { image_id } => json!({ "image_id": image_id }),
            Self::ImageFavorited { image_id, added } => json!({
                "image_id": image_id,
                "action": if *added { "add" } else { "remove" },
            }),
            Self::MapViewed { memory_count } => json!({ "memory_count": memory_count }),
            Self::MapMarkerClicked { memory_id } => json!({ "memory_id": memory_id }),
            Self::PageView {
                page_title,
                page_location,
            } => json!({ "page_title": page_title, "page_location": page_location }),
            Self::ErrorOccurred {
                error_type,
                error_message,
            } => json!({ "error_type": error_type, "error_message": error_message }),
            Self::ButtonClicked {
                button_name,
                location,
            } => json!({ "button_name": button_name, "location": location }),
            Self::Search {
                search_term,
                result_count,
            } => json!({ "search_term": search_term, "result_count": result_count }),
            Self::PerformanceMetric {
                action,
                duration_ms,
            } => json!({
                "action": action,
                "duration": duration_ms,
                "timestamp": Utc::now().timestamp_millis(),
            }),
            Self::Custom { value, params, .. } => {
                let mut m = Map::new();
                m.insert("value".into(), value.clone());
                m.extend(params.clone());
                return m;
            }
        };
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    /// Page view for a route path.
    pub fn page_view(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PageView {
            page_title: title.into(),
            page_location: path.into(),
        }
    }

    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ErrorOccurred {
            error_type: kind.into(),
            error_message: message.into(),
        }
    }
}

/// User attached to subsequent events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsUser {
    pub user_id: String,
    pub properties: Map<String, Value>,
}

/// One logged event as written by the `jsonl` sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub id: Uuid,
    pub name: String,
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AnalyticsUser>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sink {
    Tracing,
    Jsonl(PathBuf),
    None,
}

pub struct Analytics {
    tx: Mutex<Option<mpsc::UnboundedSender<RecordedEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    user: RwLock<Option<AnalyticsUser>>,
}

impl Analytics {
    /// Build the service from config. Must be called inside a tokio runtime
    /// unless the sink resolves to `none`.
    pub fn init(config: &AnalyticsConfig) -> Result<Arc<Self>> {
        if !config.enabled {
            return Ok(Arc::new(Self::disabled()));
        }
        let sink = match config.sink.as_str() {
            "jsonl" => {
                let path = match &config.path {
                    Some(p) => PathBuf::from(p),
                    None => crate::config::MemoryMapConfig::default_config().analytics_path()?,
                };
                Sink::Jsonl(path)
            }
            "none" => Sink::None,
            _ => Sink::Tracing,
        };
        Ok(Arc::new(Self::with_sink(sink)))
    }

    /// A service that drops every event.
    pub fn disabled() -> Self {
        Self {
            tx: Mutex::new(None),
            worker: Mutex::new(None),
            user: RwLock::new(None),
        }
    }

    pub fn with_sink(sink: Sink) -> Self {
        if sink == Sink::None {
            return Self::disabled();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_writer(sink, rx));
        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            user: RwLock::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.tx.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Record an event. Never blocks, never fails.
    pub fn log(&self, event: AnalyticsEvent) {
        let guard = match self.tx.lock() {
            Ok(g) => g,
            Err(_) => return,
        };
        let Some(tx) = guard.as_ref() else {
            return;
        };
        let user = self.user.read().ok().and_then(|u| u.clone());
        let recorded = RecordedEvent {
            id: Uuid::now_v7(),
            name: event.name().to_string(),
            params: event.params(),
            user,
            timestamp: Utc::now(),
        };
        if tx.send(recorded).is_err() {
            tracing::debug!("analytics writer gone, event dropped");
        }
    }

    /// Attach a user to subsequent events. `user_type` defaults to `free`
    /// and `signup_date` to now.
    pub fn set_user(&self, user_id: impl Into<String>, mut properties: Map<String, Value>) {
        properties
            .entry("user_type")
            .or_insert_with(|| Value::String("free".into()));
        properties
            .entry("signup_date")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        if let Ok(mut u) = self.user.write() {
            *u = Some(AnalyticsUser {
                user_id: user_id.into(),
                properties,
            });
        }
    }

    pub fn clear_user(&self) {
        if let Ok(mut u) = self.user.write() {
            *u = None;
        }
    }

    pub fn track_performance(&self, action: impl Into<String>, started: Instant) {
        self.log(AnalyticsEvent::PerformanceMetric {
            action: action.into(),
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }

    pub fn track_custom(&self, name: impl Into<String>, value: Value, params: Map<String, Value>) {
        self.log(AnalyticsEvent::Custom {
            name: name.into(),
            value,
            params,
        });
    }

    /// Close the channel and wait for the writer to flush. Later events
    /// are dropped.
    pub async fn shutdown(&self) {
        let tx = self.tx.lock().ok().and_then(|mut g| g.take());
        drop(tx);
        let worker = self.worker.lock().ok().and_then(|mut g| g.take());
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                tracing::debug!("analytics writer ended abnormally: {e}");
            }
        }
    }
}

async fn run_writer(sink: Sink, mut rx: mpsc::UnboundedReceiver<RecordedEvent>) {
    while let Some(event) = rx.recv().await {
        match &sink {
            Sink::Tracing => {
                let params = Value::Object(event.params.clone());
                tracing::info!(
                    target: "memorymap::analytics",
                    event = %event.name,
                    user = event.user.as_ref().map(|u| u.user_id.as_str()).unwrap_or("-"),
                    %params,
                    "analytics"
                );
            }
            Sink::Jsonl(path) => {
                if let Err(e) = append_line(path, &event).await {
                    tracing::debug!("analytics: failed to write event: {e}");
                }
            }
            Sink::None => {}
        }
    }
}

async fn append_line(path: &PathBuf, event: &RecordedEvent) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

/// Read back a JSONL analytics file. Malformed lines are skipped.
pub fn read_events(path: &std::path::Path) -> Vec<RecordedEvent> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}
