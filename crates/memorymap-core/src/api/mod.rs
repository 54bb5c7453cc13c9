//! HTTP client for the MemoryMap backend.
//!
//! Every operation returns an [`ApiOutcome`]; transport errors, non-2xx
//! responses and client-side validation failures all end up as
//! `ApiOutcome::Failure` with a non-empty message. Nothing is retried or
//! cached. The bearer token is re-read from the local store on every call.

pub mod outcome;

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::ApiConfig;
use crate::error::{MemoryMapError, Result};
use crate::model::{
    validate_credentials, validate_feedback, validate_new_entry, validate_patch,
    validate_registration, Ack, Advice, AdviceRequest, Credentials, DiaryEntry, EmotionAnalysis,
    EmotionPalette, EntryCreated, EntryEnvelope, EntryList, EntryPatch, FeedbackSubmission,
    GeneratedImage, ImageRequest, InsightsEnvelope, LocationExtraction, NewEntry, Profile,
    ProfileUpdate, Quote, QuoteEmotion, QuoteHistory, QuoteRequest, Registration, TextRequest,
    TokenResponse,
};
use crate::store::{SharedStore, TokenStore};

pub use outcome::{ApiOutcome, CANCELLED_MESSAGE};

pub const DIARY_PATH: &str = "/api/v1/diary/";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, store: SharedStore) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenStore::new(store),
            cancel: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// A clone of this client whose requests resolve to a cancelled outcome
    /// as soon as `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    // -- diagnostics --

    pub async fn ping(&self) -> ApiOutcome<Value> {
        self.raw(Method::GET, "/", None).await
    }

    /// Issue an arbitrary request and return the parsed body untouched.
    pub async fn raw(&self, method: Method, path: &str, body: Option<&Value>) -> ApiOutcome<Value> {
        self.call(method, path, body, "Request failed").await
    }

    // -- diary --

    pub async fn create_entry(&self, entry: &NewEntry) -> ApiOutcome<EntryCreated> {
        if let Err(e) = validate_new_entry(entry) {
            return e.into();
        }
        self.call(Method::POST, DIARY_PATH, Some(entry), "Failed to create diary entry")
            .await
    }

    pub async fn list_entries(&self, limit: usize) -> ApiOutcome<EntryList> {
        let path = format!("{DIARY_PATH}?limit={limit}");
        self.call::<(), _>(Method::GET, &path, None, "Failed to get diary entries")
            .await
    }

    pub async fn get_entry(&self, id: &str) -> ApiOutcome<DiaryEntry> {
        let path = match entry_path(id) {
            Ok(p) => p,
            Err(e) => return e.into(),
        };
        self.call::<(), EntryEnvelope>(Method::GET, &path, None, "Failed to get diary entry")
            .await
            .map(|env| env.entry)
    }

    pub async fn update_entry(&self, id: &str, patch: &EntryPatch) -> ApiOutcome<Ack> {
        let path = match entry_path(id).and_then(|p| validate_patch(patch).map(|_| p)) {
            Ok(p) => p,
            Err(e) => return e.into(),
        };
        self.call(Method::PUT, &path, Some(patch), "Failed to update diary entry")
            .await
    }

    pub async fn delete_entry(&self, id: &str) -> ApiOutcome<Ack> {
        let path = match entry_path(id) {
            Ok(p) => p,
            Err(e) => return e.into(),
        };
        self.call::<(), _>(Method::DELETE, &path, None, "Failed to delete diary entry")
            .await
    }

    // -- emotion & quotes --

    pub async fn analyze_emotion(&self, text: &str) -> ApiOutcome<EmotionAnalysis> {
        if text.trim().is_empty() {
            return ApiOutcome::failure("Text is required");
        }
        let body = TextRequest {
            text: text.to_string(),
        };
        self.call(
            Method::POST,
            "/api/v1/emotion/analyze",
            Some(&body),
            "Emotion analysis failed",
        )
        .await
    }

    pub async fn generate_quote(&self, request: &QuoteRequest) -> ApiOutcome<Quote> {
        self.call(
            Method::POST,
            "/api/v1/quotes/generate",
            Some(request),
            "Failed to generate quote",
        )
        .await
    }

    pub async fn quote_history(&self, limit: usize) -> ApiOutcome<QuoteHistory> {
        let path = format!("/api/v1/quotes/history?limit={limit}");
        self.call::<(), _>(Method::GET, &path, None, "Failed to get quote history")
            .await
    }

    pub async fn quote_colors(&self, emotion: QuoteEmotion) -> ApiOutcome<EmotionPalette> {
        let path = format!("/api/v1/quotes/colors/{}", emotion.as_str());
        self.call::<(), _>(Method::GET, &path, None, "Failed to get emotion colors")
            .await
    }

    // -- profile --

    pub async fn get_profile(&self) -> ApiOutcome<Profile> {
        self.call::<(), _>(Method::GET, "/api/v1/profile/me", None, "Failed to load profile")
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiOutcome<Profile> {
        if update.is_empty() {
            return ApiOutcome::failure("Nothing to update");
        }
        self.call(
            Method::PUT,
            "/api/v1/profile/me",
            Some(update),
            "Failed to update profile",
        )
        .await
    }

    // -- auth --

    /// Log in and persist the returned token.
    pub async fn login(&self, creds: &Credentials) -> ApiOutcome<TokenResponse> {
        if let Err(e) = validate_credentials(creds) {
            return e.into();
        }
        let outcome: ApiOutcome<TokenResponse> = self
            .call(Method::POST, "/api/v1/auth/login", Some(creds), "Login failed")
            .await;
        if let ApiOutcome::Success { data } = &outcome {
            if let Err(e) = self.tokens.set(&data.access_token) {
                return ApiOutcome::failure(format!("Logged in but failed to save token: {e}"));
            }
            tracing::info!("logged in as {}", creds.email.trim());
        }
        outcome
    }

    pub async fn register(&self, reg: &Registration) -> ApiOutcome<Ack> {
        if let Err(e) = validate_registration(reg) {
            return e.into();
        }
        self.call(
            Method::POST,
            "/api/v1/auth/register",
            Some(reg),
            "Registration failed",
        )
        .await
    }

    /// Local only: forget the stored token.
    pub fn logout(&self) -> ApiOutcome<()> {
        self.tokens.clear().into()
    }

    // -- AI-assisted extras --

    pub async fn generate_image(&self, request: &ImageRequest) -> ApiOutcome<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return ApiOutcome::failure("Prompt is required");
        }
        self.call(
            Method::POST,
            "/emotion/image/generate",
            Some(request),
            "Image generation failed",
        )
        .await
    }

    pub async fn insights(&self) -> ApiOutcome<InsightsEnvelope> {
        self.call::<(), _>(Method::GET, "/coaching/insights", None, "Failed to load insights")
            .await
    }

    pub async fn coaching_advice(&self, question: &str) -> ApiOutcome<Advice> {
        if question.trim().is_empty() {
            return ApiOutcome::failure("Question is required");
        }
        let body = AdviceRequest {
            question: question.to_string(),
        };
        self.call(
            Method::POST,
            "/coaching/advice",
            Some(&body),
            "Failed to get advice",
        )
        .await
    }

    pub async fn extract_locations(&self, text: &str) -> ApiOutcome<LocationExtraction> {
        if text.trim().is_empty() {
            return ApiOutcome::failure("Text is required");
        }
        let body = TextRequest {
            text: text.to_string(),
        };
        self.call(
            Method::POST,
            "/api/v1/location/extract",
            Some(&body),
            "Location extraction failed",
        )
        .await
    }

    pub async fn submit_feedback(&self, feedback: &FeedbackSubmission) -> ApiOutcome<Value> {
        if let Err(e) = validate_feedback(feedback) {
            return e.into();
        }
        self.call(
            Method::POST,
            "/emotion/feedback/submit",
            Some(feedback),
            "Failed to submit feedback",
        )
        .await
    }

    // -- plumbing --

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> ApiOutcome<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let method_name = method.to_string();
        let fut = self.execute(method, path, body, fallback);
        let result = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(MemoryMapError::Cancelled),
                    r = fut => r,
                }
            }
            None => fut.await,
        };

        match &result {
            Err(MemoryMapError::Cancelled) => {
                tracing::debug!(method = %method_name, path, "request cancelled");
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(method = %method_name, path, "transient failure: {e}");
            }
            Err(e) => {
                tracing::warn!(method = %method_name, path, "request failed: {e}");
            }
            Ok(_) => {}
        }
        result.into()
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "api request");

        let mut req = self.http.request(method, &url);
        if let Some(token) = self.tokens.get() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(MemoryMapError::Api {
                status: status.as_u16(),
                message: error_message(&text, fallback),
            });
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    }
}

/// `/api/v1/diary/{id}` with the id percent-encoded as one path segment.
fn entry_path(id: &str) -> Result<String> {
    let id = id.trim();
    let invalid = || MemoryMapError::InvalidInput(format!("Invalid entry id '{id}'"));
    if id.is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(invalid());
    }
    let mut url = Url::parse("http://localhost").map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(DIARY_PATH.split('/').filter(|s| !s.is_empty()))
        .push(id);
    Ok(url.path().to_string())
}

/// Pull a human-readable message out of an error body: `detail` string,
/// FastAPI validation list (`detail[].msg`), `error`, `message`, else
/// `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return fallback.to_string(),
    };

    match value.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .collect();
            if !msgs.is_empty() {
                return msgs.join("; ");
            }
        }
        _ => {}
    }

    ["error", "message"]
        .iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
