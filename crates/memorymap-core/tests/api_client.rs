//! `ApiClient` against an in-process HTTP backend.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use memorymap_core::api::{ApiClient, ApiOutcome};
use memorymap_core::model::{
    Credentials, ImageRequest, NewEntry, ProfileUpdate, QuoteEmotion, QuoteRequest,
};
use memorymap_core::store::{KeyValueStore, MemoryStore, SharedStore};
use reqwest::Method;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn client(server: &common::MockServer, store: SharedStore) -> ApiClient {
    ApiClient::new(&server.config().api, store).unwrap()
}

#[tokio::test]
async fn test_success_data_equals_body() {
    let server = common::start().await;
    server
        .backend
        .seed(vec![common::entry("a", "First", "hello"), common::entry("b", "Second", "world")]);
    let api = client(&server, Arc::new(MemoryStore::new()));

    let raw = api.raw(Method::GET, "/api/v1/diary/", None).await;
    let body = raw.data().unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["entries"][0]["title"], "First");

    let typed = api.list_entries(100).await;
    let list = typed.data().unwrap();
    assert_eq!(list.count, 2);
    assert_eq!(list.entries[1].id, "b");

    let reqs = server.backend.requests();
    assert_eq!(reqs.last().unwrap().query.as_deref(), Some("limit=100"));
}

#[tokio::test]
async fn test_non_2xx_uses_detail() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));

    let outcome = api.get_entry("missing").await;
    assert_eq!(outcome, ApiOutcome::failure("Diary entry not found"));

    let outcome = api.analyze_emotion("hm").await;
    assert_eq!(outcome.error(), Some("text too short; try again"));
}

#[tokio::test]
async fn test_unknown_path_falls_back_to_detail() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let outcome = api.raw(Method::GET, "/nope", None).await;
    assert_eq!(outcome.error(), Some("Not Found"));
}

#[tokio::test]
async fn test_bearer_header_iff_token() {
    let server = common::start().await;
    let store: SharedStore = Arc::new(MemoryStore::new());
    let api = client(&server, store.clone());

    api.ping().await;
    api.tokens().set("abc").unwrap();
    api.ping().await;
    api.tokens().clear().unwrap();
    api.ping().await;

    let auth: Vec<Option<String>> = server
        .backend
        .requests()
        .into_iter()
        .map(|r| r.authorization)
        .collect();
    assert_eq!(auth, vec![None, Some("Bearer abc".to_string()), None]);
}

#[tokio::test]
async fn test_token_reread_from_shared_store() {
    let server = common::start().await;
    let store: SharedStore = Arc::new(MemoryStore::new());
    let api = client(&server, store.clone());

    // another component writes the token directly
    store.set("token", "from-elsewhere").unwrap();
    api.ping().await;
    assert_eq!(
        server.backend.requests()[0].authorization.as_deref(),
        Some("Bearer from-elsewhere")
    );
}

#[tokio::test]
async fn test_login_stores_token_and_failure_message() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));

    let bad = api
        .login(&Credentials {
            email: "ada@example.com".into(),
            password: "wrong".into(),
        })
        .await;
    assert_eq!(bad.error(), Some("Incorrect email or password"));
    assert!(!api.is_authenticated());

    let good = api
        .login(&Credentials {
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await;
    assert!(good.is_success());
    assert_eq!(api.tokens().get().as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn test_create_entry_posts_json() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::with_token("t")));
    let outcome = api
        .create_entry(&NewEntry {
            title: "Walk".into(),
            content: "By the sea".into(),
            location: Some("Brighton".into()),
            mood: None,
        })
        .await;
    assert_eq!(outcome.data().unwrap().entry_id, "e1");

    let req = server.backend.requests().pop().unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v1/diary/");
    assert_eq!(req.body, json!({"title": "Walk", "content": "By the sea", "location": "Brighton"}));
}

#[tokio::test]
async fn test_invalid_entry_never_sent() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let outcome = api.create_entry(&NewEntry::default()).await;
    assert_eq!(outcome.error(), Some("Title is required"));
    assert!(server.backend.requests().is_empty());
}

#[tokio::test]
async fn test_quote_request_shape() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let quote = api
        .generate_quote(&QuoteRequest::new(QuoteEmotion::Happy, ""))
        .await;
    assert_eq!(quote.data().unwrap().emotion, "HAPPY");
    assert_eq!(
        server.backend.requests()[0].body,
        json!({"emotion": "HAPPY", "diary_content": ""})
    );
}

#[tokio::test]
async fn test_profile_update_sends_only_changes() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let update = ProfileUpdate {
        bio: Some("Writer".into()),
        ..Default::default()
    };
    let outcome = api.update_profile(&update).await;
    assert_eq!(outcome.data().unwrap().bio.as_deref(), Some("Writer"));
    assert_eq!(server.backend.requests()[0].body, json!({"bio": "Writer"}));
}

#[tokio::test]
async fn test_cancellation_resolves_to_cancelled() {
    let server = common::start().await;
    server.backend.slow_lists.store(true, Ordering::SeqCst);
    let token = CancellationToken::new();
    let api = client(&server, Arc::new(MemoryStore::new())).with_cancellation(token.clone());

    let handle = tokio::spawn(async move { api.list_entries(10).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("cancelled request should resolve quickly")
        .unwrap();
    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_quote_colors_uses_uppercase_emotion() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let palette = api.quote_colors(QuoteEmotion::Peaceful).await;
    assert_eq!(palette.data().unwrap().colors.primary.as_deref(), Some("#87CEEB"));
    assert_eq!(
        server.backend.requests()[0].path,
        "/api/v1/quotes/colors/PEACEFUL"
    );
}

#[tokio::test]
async fn test_generate_image_requires_prompt() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));

    let blank = api
        .generate_image(&ImageRequest {
            prompt: "  ".into(),
            style: None,
        })
        .await;
    assert_eq!(blank.error(), Some("Prompt is required"));
    assert!(server.backend.requests().is_empty());

    let image = api
        .generate_image(&ImageRequest {
            prompt: "a calm lake at dawn".into(),
            style: Some("watercolor".into()),
        })
        .await;
    assert_eq!(
        image.data().unwrap().image_url,
        "https://images.example.com/calm-lake.png"
    );
    assert_eq!(
        server.backend.requests()[0].body,
        json!({"prompt": "a calm lake at dawn", "style": "watercolor"})
    );
}

#[tokio::test]
async fn test_entry_id_cannot_change_request_target() {
    let server = common::start().await;
    let api = client(&server, Arc::new(MemoryStore::new()));
    let outcome = api.get_entry("x?limit=1#top").await;
    assert_eq!(outcome.error(), Some("Diary entry not found"));

    let sent = &server.backend.requests()[0];
    assert_eq!(sent.path, "/api/v1/diary/x%3Flimit=1%23top");
    assert_eq!(sent.query, None);
}
