//! Per-page state containers.
//!
//! Each container owns its state and talks to the backend only through the
//! [`ApiClient`] in its [`PageContext`]. Async methods fetch and then apply;
//! the `apply_*` methods are public so a front end that runs requests on a
//! worker task can feed results back in. Cancelled outcomes are ignored.

pub mod auth;
pub mod dashboard;
pub mod diary_form;
pub mod emotional_map;
pub mod gallery;
pub mod memories;
pub mod profile;
pub mod quotes;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analytics::Analytics;
use crate::api::ApiClient;
use crate::config::{MemoryMapConfig, QuotesConfig, UiConfig};
use crate::error::Result;
use crate::routes::Route;
use crate::store::SharedStore;

pub use auth::AuthFlow;
pub use dashboard::{DashboardPage, DashboardStats};
pub use diary_form::{DiaryDraft, DiaryForm, SaveRequest};
pub use emotional_map::EmotionalMapPage;
pub use gallery::GalleryPage;
pub use memories::{DeleteSummary, MemoriesPage, PendingDelete};
pub use profile::ProfilePage;
pub use quotes::{QuoteHistoryView, QuotesPage};

/// Everything a page needs from the outside world.
#[derive(Clone)]
pub struct PageContext {
    pub api: ApiClient,
    pub analytics: Arc<Analytics>,
    pub store: SharedStore,
    pub ui: UiConfig,
    pub quotes: QuotesConfig,
}

impl PageContext {
    pub fn new(
        config: &MemoryMapConfig,
        store: SharedStore,
        analytics: Arc<Analytics>,
    ) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(&config.api, store.clone())?,
            analytics,
            store,
            ui: config.ui.clone(),
            quotes: config.quotes.clone(),
        })
    }

    /// Same context, but every request is abandoned when `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            api: self.api.with_cancellation(token),
            ..self.clone()
        }
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Success; the shell should move to this route.
    Navigate(Route),
    /// Client-side validation blocked the submit. No request was sent.
    Invalid(String),
    /// The backend (or transport) rejected the submit.
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_navigate(&self) -> bool {
        matches!(self, Self::Navigate(_))
    }
}
