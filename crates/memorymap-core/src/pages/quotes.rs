use std::collections::BTreeSet;

use crate::analytics::AnalyticsEvent;
use crate::api::ApiOutcome;
use crate::filter::{filter_quotes, unique_emotions, QuoteQuery, QuoteSort};
use crate::model::{Quote, QuoteEmotion, QuoteHistory, QuoteRequest};
use crate::pages::PageContext;
use crate::store::FavoriteStore;
use crate::view::ViewState;

/// Longest context the prompt box accepts.
pub const MAX_PROMPT_CHARS: usize = 300;

/// Clipboard form of a quote.
pub fn share_text(quote: &Quote) -> String {
    let author = if quote.author.trim().is_empty() {
        "Anonymous"
    } else {
        quote.author.trim()
    };
    format!("\"{}\" - {author}", quote.quote)
}

pub struct QuotesPage {
    ctx: PageContext,
    favorites_store: FavoriteStore,
    pub emotion: QuoteEmotion,
    pub prompt: String,
    pub generating: bool,
    pub current: Option<Quote>,
    pub error: Option<String>,
    pub history: ViewState<Vec<Quote>>,
    favorites: BTreeSet<String>,
}

impl QuotesPage {
    pub fn new(ctx: PageContext) -> Self {
        let emotion = QuoteEmotion::parse_or_neutral(&ctx.quotes.default_emotion);
        let favorites_store = FavoriteStore::new(ctx.store.clone());
        let favorites = favorites_store.load();
        Self {
            ctx,
            favorites_store,
            emotion,
            prompt: String::new(),
            generating: false,
            current: None,
            error: None,
            history: ViewState::Loading,
            favorites,
        }
    }

    pub fn select_emotion(&mut self, emotion: QuoteEmotion) {
        self.emotion = emotion;
    }

    pub fn prompt_len(&self) -> usize {
        self.prompt.chars().count()
    }

    /// Validate the prompt and build the request. Marks the page as generating.
    pub fn begin_generate(&mut self) -> Result<QuoteRequest, String> {
        if self.prompt_len() > MAX_PROMPT_CHARS {
            let msg = format!("Context must be at most {MAX_PROMPT_CHARS} characters");
            self.error = Some(msg.clone());
            return Err(msg);
        }
        self.generating = true;
        self.error = None;
        Ok(QuoteRequest::new(self.emotion, self.prompt.trim()))
    }

    /// Ask the backend for one quote. A single POST per call.
    pub async fn generate(&mut self) -> ApiOutcome<Quote> {
        let request = match self.begin_generate() {
            Ok(r) => r,
            Err(msg) => return ApiOutcome::failure(msg),
        };
        let outcome = self.ctx.api.generate_quote(&request).await;
        self.apply_generated(outcome.clone());
        outcome
    }

    pub fn apply_generated(&mut self, outcome: ApiOutcome<Quote>) {
        self.generating = false;
        if outcome.is_cancelled() {
            return;
        }
        match outcome {
            ApiOutcome::Success { data } => {
                self.ctx.analytics.log(AnalyticsEvent::Custom {
                    name: "quote_generated".into(),
                    value: serde_json::Value::String(self.emotion.as_str().into()),
                    params: serde_json::Map::new(),
                });
                if let Some(history) = self.history.loaded_mut() {
                    history.insert(0, data.clone());
                } else if matches!(self.history, ViewState::Empty) {
                    self.history = ViewState::Loaded(vec![data.clone()]);
                }
                self.current = Some(data);
            }
            ApiOutcome::Failure { error } => {
                self.error = Some(format!("Failed to generate quote: {error}"));
            }
            ApiOutcome::Cancelled => {}
        }
    }

    pub async fn load_history(&mut self) {
        self.history = ViewState::Loading;
        let outcome = self.ctx.api.quote_history(self.ctx.quotes.history_limit).await;
        self.apply_history(outcome);
    }

    pub fn apply_history(&mut self, outcome: ApiOutcome<QuoteHistory>) {
        if outcome.is_cancelled() {
            return;
        }
        self.history = ViewState::from_outcome(outcome.map(|h| h.quotes), Vec::is_empty);
    }

    pub fn history(&self) -> &[Quote] {
        self.history.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    // -- favorites --

    pub fn is_favorite(&self, quote: &Quote) -> bool {
        self.favorites.contains(&quote.favorite_key())
    }

    /// Flip the favorite flag and persist it. Returns the new state.
    pub fn toggle_favorite(&mut self, quote: &Quote) -> crate::error::Result<bool> {
        let key = quote.favorite_key();
        let now = self.favorites_store.toggle(&key)?;
        if now {
            self.favorites.insert(key);
        } else {
            self.favorites.remove(&key);
        }
        Ok(now)
    }

    pub fn favorite_keys(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    /// History quotes that are marked favorite.
    pub fn favorites(&self) -> Vec<&Quote> {
        self.history()
            .iter()
            .filter(|q| self.is_favorite(q))
            .collect()
    }
}

/// Filter state for the saved-quotes tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteHistoryView {
    pub query: QuoteQuery,
    pub favorites_only: bool,
}

impl QuoteHistoryView {
    pub fn set_emotion(&mut self, emotion: Option<&str>) {
        self.query.emotion = emotion.map(str::to_string);
    }

    pub fn set_sort(&mut self, sort: QuoteSort) {
        self.query.sort = sort;
    }

    pub fn visible<'a>(&self, quotes: &'a [Quote], favorites: &BTreeSet<String>) -> Vec<&'a Quote> {
        filter_quotes(quotes, &self.query)
            .into_iter()
            .filter(|q| !self.favorites_only || favorites.contains(&q.favorite_key()))
            .collect()
    }

    /// Emotion choices for the filter, "all" first.
    pub fn emotion_options(quotes: &[Quote]) -> Vec<String> {
        let mut out = vec!["all".to_string()];
        out.extend(unique_emotions(quotes));
        out
    }
}
