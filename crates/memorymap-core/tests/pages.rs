//! Page containers driven end to end against the in-process backend.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use memorymap_core::model::QuoteEmotion;
use memorymap_core::pages::{
    DashboardPage, DiaryForm, EmotionalMapPage, MemoriesPage, ProfilePage, QuotesPage,
};
use memorymap_core::pages::SubmitOutcome;
use memorymap_core::routes::Route;
use memorymap_core::view::ViewState;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_diary_form_submit_navigates_to_dashboard() {
    let server = common::start().await;
    let mut form = DiaryForm::new(server.context_with_token("t"));
    form.draft.title = "Morning".into();
    form.draft.content = "Coffee on the balcony".into();

    let outcome = form.submit().await;
    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Dashboard));
    assert_eq!(server.backend.count("POST", "/api/v1/diary/"), 1);
}

#[tokio::test]
async fn test_diary_form_empty_title_sends_nothing() {
    let server = common::start().await;
    let mut form = DiaryForm::new(server.context_with_token("t"));
    form.draft.content = "no title".into();

    let outcome = form.submit().await;
    assert_eq!(outcome, SubmitOutcome::Invalid("Title is required".into()));
    assert!(server.backend.requests().is_empty());
}

#[tokio::test]
async fn test_edit_form_loads_and_updates() {
    let server = common::start().await;
    server.backend.seed(vec![common::entry("a", "Old", "body")]);
    let mut form = DiaryForm::edit(server.context_with_token("t"), "a");
    form.load().await;
    assert_eq!(form.draft.title, "Old");

    // unchanged drafts do not hit the backend
    let outcome = form.submit().await;
    assert!(outcome.is_navigate());
    assert_eq!(server.backend.count("PUT", "/api/v1/diary/a"), 0);
}

#[tokio::test]
async fn test_optimistic_delete_not_resurrected() {
    let server = common::start().await;
    server.backend.seed(vec![
        common::entry("a", "One", "x"),
        common::entry("b", "Two", "y"),
        common::entry("c", "Three", "z"),
    ]);
    let mut page = MemoriesPage::new(server.context_with_token("t"));
    page.load().await;
    assert_eq!(page.entries().len(), 3);

    let outcome = page.delete("b").await;
    assert!(outcome.is_success());
    let ids: Vec<&str> = page.entries().iter().map(|t| t.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);

    // the backend still lists "b"
    page.load().await;
    let ids: Vec<&str> = page.entries().iter().map(|t| t.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(server.backend.count("DELETE", "/api/v1/diary/b"), 1);
}

#[tokio::test]
async fn test_failed_delete_reinstates_entry() {
    let server = common::start().await;
    server.backend.seed(vec![
        common::entry("a", "One", "x"),
        common::entry("b", "Two", "y"),
    ]);
    server.backend.fail_deletes.store(true, Ordering::SeqCst);
    let mut page = MemoriesPage::new(server.context_with_token("t"));
    page.load().await;

    let outcome = page.delete("a").await;
    assert_eq!(outcome.error(), Some("Database unavailable"));
    let ids: Vec<&str> = page.entries().iter().map(|t| t.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(page.notice.is_some());
}

#[tokio::test]
async fn test_happy_quote_single_post() {
    let server = common::start().await;
    let mut page = QuotesPage::new(server.context_with_token("t"));
    page.select_emotion(QuoteEmotion::Happy);

    let outcome = page.generate().await;
    assert!(outcome.is_success());
    assert_eq!(server.backend.count("POST", "/api/v1/quotes/generate"), 1);
    assert_eq!(server.backend.requests().len(), 1);

    let current = page.current.as_ref().unwrap();
    assert_eq!(current.quote, "Joy is not in things; it is in us.");
    assert_eq!(current.author, "Richard Wagner");
}

#[tokio::test]
async fn test_dashboard_concurrent_load() {
    let server = common::start().await;
    server.backend.seed(vec![common::entry("a", "One", "x")]);
    let mut page = DashboardPage::new(server.context_with_token("t"));
    page.load().await;

    let stats = page.stats();
    assert_eq!(stats.entry_count, 3);
    assert_eq!(stats.top_emotion.as_deref(), Some("joy"));
    assert_eq!(server.backend.count("GET", "/coaching/insights"), 1);
}

#[tokio::test]
async fn test_emotional_map_loads_layout() {
    let server = common::start().await;
    let mut page = EmotionalMapPage::new(server.context_with_token("t"));
    page.load().await;
    assert_eq!(page.layout().nodes.len(), 2);
    let list_query = server
        .backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/api/v1/diary/")
        .and_then(|r| r.query);
    assert_eq!(list_query.as_deref(), Some("limit=50"));
}

#[tokio::test]
async fn test_profile_save_round_trip() {
    let server = common::start().await;
    let mut page = ProfilePage::new(server.context_with_token("t"));
    page.load().await;
    assert!(page.begin_edit());
    page.draft_mut().unwrap().location = Some("Lisbon".into());

    let outcome = page.save().await;
    assert!(outcome.is_success());
    assert_eq!(
        page.profile.loaded().unwrap().location.as_deref(),
        Some("Lisbon")
    );
    assert!(!page.is_editing());
}

#[tokio::test]
async fn test_cancelled_load_leaves_state_untouched() {
    let server = common::start().await;
    server.backend.seed(vec![common::entry("a", "One", "x")]);
    server.backend.slow_lists.store(true, Ordering::SeqCst);

    let token = CancellationToken::new();
    let ctx = server.context_with_token("t").with_cancellation(token.clone());
    let api = ctx.api.clone();
    let mut page = MemoriesPage::new(ctx);

    let pending = tokio::spawn(async move { api.list_entries(100).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();
    let outcome = pending.await.unwrap();
    assert!(outcome.is_cancelled());

    page.apply_entries(outcome);
    assert_eq!(page.state, ViewState::Loading);
}
