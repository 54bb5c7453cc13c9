use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use memorymap_core::analytics::AnalyticsEvent;
use memorymap_core::api::ApiOutcome;
use memorymap_core::filter::{EntrySort, QuoteSort, TagFilter};
use memorymap_core::model::{Advice, DiaryEntry, Profile, Quote, QuoteEmotion};
use memorymap_core::pages::{
    DashboardPage, DiaryForm, EmotionalMapPage, MemoriesPage, PageContext, PendingDelete,
    ProfilePage, QuoteHistoryView, QuotesPage, SubmitOutcome,
};
use memorymap_core::routes::Route;
use memorymap_core::tagging::{ColorTag, TaggedEntry};
use memorymap_core::view::{RenderFailure, ViewState};
use tokio_util::sync::CancellationToken;

use super::event::{AsyncAction, AsyncResult, Dispatch};

/// Which screen is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Memories,
    Detail,
    Compose,
    Quotes,
    Map,
    Profile,
    Coach,
}

impl Screen {
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::Home | Route::Dashboard => Some(Self::Dashboard),
            Route::Memories => Some(Self::Memories),
            Route::NewEntry | Route::EditEntry(_) => Some(Self::Compose),
            Route::Quotes => Some(Self::Quotes),
            Route::EmotionalMap => Some(Self::Map),
            Route::Profile => Some(Self::Profile),
            Route::Coaching => Some(Self::Coach),
            _ => None,
        }
    }

    /// Header entries, in `Route::nav()` order.
    pub fn nav() -> Vec<Screen> {
        Route::nav()
            .iter()
            .filter_map(Screen::from_route)
            .collect()
    }
}

/// Input mode within the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Filter,
    /// Waiting for y/n on a delete.
    Confirm,
    /// Typing the quote context.
    Prompt,
    /// Typing a question for the coach.
    Question,
}

pub const COMPOSE_FIELDS: [&str; 4] = ["Title", "Content", "Location", "Mood"];
const CONTENT_FIELD: usize = 1;

pub const PROFILE_FIELDS: [&str; 4] = ["Full name", "Username", "Bio", "Location"];

const SPLASH_MIN: Duration = Duration::from_millis(1500);

/// Central application state.
pub struct App {
    ctx: PageContext,
    root: CancellationToken,
    screen_token: CancellationToken,

    pub screen: Screen,
    /// Where Esc goes from detail and compose.
    pub previous: Screen,
    pub input_mode: InputMode,
    pub should_quit: bool,
    /// Action produced while handling a result, sent by the run loop.
    pub follow_up: Option<AsyncAction>,
    pub base_url: String,

    // -- Splash --
    pub splash_until: Instant,
    pub first_load_done: bool,

    // -- Pages --
    pub dashboard: DashboardPage,
    pub memories: MemoriesPage,
    pub form: DiaryForm,
    pub quotes: QuotesPage,
    pub map: EmotionalMapPage,
    pub profile: ProfilePage,

    // -- Memories list --
    pub selected: usize,
    pub search_input: String,
    pub search_cursor: usize,
    pub confirm_delete: Vec<String>,
    pending_deletes: HashMap<String, PendingDelete>,

    // -- Detail --
    pub detail: ViewState<DiaryEntry>,
    pub detail_scroll: u16,

    // -- Compose --
    pub compose_field: usize,

    // -- Quotes --
    pub quote_view: QuoteHistoryView,
    pub quote_selected: usize,

    // -- Profile --
    pub profile_field: usize,

    // -- Coach --
    pub coach_input: String,
    pub advice: Option<ViewState<Advice>>,

    // -- Error handling --
    pub failure: Option<RenderFailure>,
    pub error_message: Option<String>,
    pub error_timer: u8, // ticks remaining
}

impl App {
    pub fn new(ctx: PageContext, root: CancellationToken) -> Self {
        let screen_token = root.child_token();
        let base_url = ctx.api.base_url().to_string();
        Self {
            dashboard: DashboardPage::new(ctx.clone()),
            memories: MemoriesPage::new(ctx.clone()),
            form: DiaryForm::new(ctx.clone()),
            quotes: QuotesPage::new(ctx.clone()),
            map: EmotionalMapPage::new(ctx.clone()),
            profile: ProfilePage::new(ctx.clone()),
            ctx,
            root,
            screen_token,

            screen: Screen::Dashboard,
            previous: Screen::Dashboard,
            input_mode: InputMode::Normal,
            should_quit: false,
            follow_up: None,
            base_url,

            splash_until: Instant::now() + SPLASH_MIN,
            first_load_done: false,

            selected: 0,
            search_input: String::new(),
            search_cursor: 0,
            confirm_delete: Vec::new(),
            pending_deletes: HashMap::new(),

            detail: ViewState::Loading,
            detail_scroll: 0,

            compose_field: 0,

            quote_view: QuoteHistoryView::default(),
            quote_selected: 0,

            profile_field: 0,

            coach_input: String::new(),
            advice: None,

            failure: None,
            error_message: None,
            error_timer: 0,
        }
    }

    /// Wrap an action with the token that may abandon it. Writes only stop
    /// when the whole app shuts down.
    pub fn dispatch(&self, action: AsyncAction) -> Dispatch {
        let token = if action.is_mutation() {
            self.root.child_token()
        } else {
            self.screen_token.clone()
        };
        Dispatch { action, token }
    }

    pub fn showing_splash(&self) -> bool {
        self.screen == Screen::Dashboard
            && (!self.first_load_done || Instant::now() < self.splash_until)
    }

    /// Leave the current screen, cancelling its requests, and return the
    /// fetch the new screen runs on mount.
    pub fn go(&mut self, screen: Screen) -> Option<AsyncAction> {
        self.screen_token.cancel();
        self.screen_token = self.root.child_token();
        if !matches!(self.screen, Screen::Detail | Screen::Compose) {
            self.previous = self.screen;
        }
        self.screen = screen;
        self.input_mode = InputMode::Normal;

        if let Some(route) = self.route() {
            self.ctx
                .analytics
                .log(AnalyticsEvent::page_view(route.title(), route.path()));
        }
        self.mount_action()
    }

    fn mount_action(&mut self) -> Option<AsyncAction> {
        match self.screen {
            Screen::Dashboard => {
                self.dashboard.entries = ViewState::Loading;
                self.dashboard.insights = ViewState::Loading;
                Some(AsyncAction::LoadDashboard)
            }
            Screen::Memories => Some(AsyncAction::LoadEntries {
                limit: self.memories.limit(),
            }),
            Screen::Detail => match &self.detail {
                ViewState::Loaded(entry) => Some(AsyncAction::LoadEntry {
                    id: entry.id.clone(),
                }),
                _ => None,
            },
            Screen::Compose | Screen::Coach => None,
            Screen::Quotes => Some(AsyncAction::LoadQuoteHistory {
                limit: self.ctx.quotes.history_limit,
            }),
            Screen::Map => {
                self.map.insights = ViewState::Loading;
                self.map.entries = ViewState::Loading;
                Some(AsyncAction::LoadMap {
                    limit: self.ctx.ui.map_entries_limit,
                })
            }
            Screen::Profile => {
                self.profile.cancel();
                self.profile.profile = ViewState::Loading;
                Some(AsyncAction::LoadProfile)
            }
        }
    }

    pub fn route(&self) -> Option<Route> {
        Some(match self.screen {
            Screen::Dashboard => Route::Dashboard,
            Screen::Memories => Route::Memories,
            Screen::Detail => return None,
            Screen::Compose => self.form.route(),
            Screen::Quotes => Route::Quotes,
            Screen::Map => Route::EmotionalMap,
            Screen::Profile => Route::Profile,
            Screen::Coach => Route::Coaching,
        })
    }

    fn toast(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
        self.error_timer = 100; // ~5s at 50ms tick
    }

    /// Drop every page and go back to the dashboard.
    fn reload(&mut self) -> Option<AsyncAction> {
        self.failure = None;
        self.dashboard = DashboardPage::new(self.ctx.clone());
        self.memories = MemoriesPage::new(self.ctx.clone());
        self.form = DiaryForm::new(self.ctx.clone());
        self.quotes = QuotesPage::new(self.ctx.clone());
        self.map = EmotionalMapPage::new(self.ctx.clone());
        self.profile = ProfilePage::new(self.ctx.clone());
        self.pending_deletes.clear();
        self.confirm_delete.clear();
        self.selected = 0;
        self.quote_selected = 0;
        self.advice = None;
        self.detail = ViewState::Loading;
        self.go(Screen::Dashboard)
    }

    /// Process an async result from the worker.
    pub fn handle_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Dashboard { entries, insights } => {
                if !entries.is_cancelled() {
                    self.first_load_done = true;
                }
                self.dashboard.apply_entries(entries);
                self.dashboard.apply_insights(insights);
            }
            AsyncResult::Entries(outcome) => {
                self.memories.apply_entries(outcome);
                self.clamp_selection();
            }
            AsyncResult::Entry(outcome) => {
                if !outcome.is_cancelled() {
                    // An entry always renders, even with an empty body.
                    self.detail = ViewState::from_outcome(outcome, |_| false);
                    self.detail_scroll = 0;
                }
            }
            AsyncResult::Deleted { id, outcome } => {
                if let Some(pending) = self.pending_deletes.remove(&id) {
                    self.memories.finish_delete(pending, &outcome);
                }
                if let Some(notice) = self.memories.notice.take() {
                    self.toast(notice);
                }
                self.clamp_selection();
            }
            AsyncResult::Saved(outcome) => match self.form.finish_submit(outcome) {
                SubmitOutcome::Navigate(route) => {
                    self.follow_up = Screen::from_route(&route).and_then(|s| self.go(s));
                }
                SubmitOutcome::Invalid(msg) | SubmitOutcome::Failed(msg) => {
                    self.toast(format!("Failed to save entry: {msg}"));
                }
            },
            AsyncResult::Analysis {
                text_length,
                outcome,
            } => self.form.apply_analysis(text_length, outcome),
            AsyncResult::Quote(outcome) => {
                self.quotes.apply_generated(outcome);
                self.quote_selected = 0;
            }
            AsyncResult::QuoteHistory(outcome) => {
                self.quotes.apply_history(outcome);
                let len = self.visible_quotes().len();
                self.quote_selected = self.quote_selected.min(len.saturating_sub(1));
            }
            AsyncResult::Map { insights, entries } => {
                self.map.apply_insights(insights);
                self.map.apply_entries(entries);
            }
            AsyncResult::Profile(outcome) => self.profile.apply_profile(outcome),
            AsyncResult::ProfileSaved(outcome) => {
                self.profile.apply_saved(outcome);
                if let Some(err) = self.profile.error.clone() {
                    self.toast(format!("Failed to update profile: {err}"));
                }
            }
            AsyncResult::Advice(outcome) => {
                if !outcome.is_cancelled() {
                    self.advice = Some(ViewState::from_outcome(outcome, |a| {
                        a.advice.trim().is_empty()
                    }));
                }
            }
        }
    }

    /// Handle a key event. Returns an optional async action to dispatch.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        if self.failure.is_some() {
            return self.handle_failure(key);
        }

        match self.input_mode {
            InputMode::Search => return self.handle_search(key),
            InputMode::Filter => return self.handle_filter(key),
            InputMode::Confirm => return self.handle_confirm(key),
            InputMode::Prompt => return self.handle_prompt(key),
            InputMode::Question => return self.handle_question(key),
            InputMode::Normal => {}
        }

        if self.screen == Screen::Compose {
            return self.handle_compose(key);
        }
        if self.screen == Screen::Profile && self.profile.is_editing() {
            return self.handle_profile_edit(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                return match Screen::nav().get(idx) {
                    Some(&screen) => self.go(screen),
                    None => None,
                };
            }
            KeyCode::Char('n') if self.screen != Screen::Quotes => {
                self.open_compose(None);
                return None;
            }
            KeyCode::Char('r') => return self.mount_action(),
            _ => {}
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard(key),
            Screen::Memories => self.handle_memories(key),
            Screen::Detail => self.handle_detail(key),
            Screen::Quotes => self.handle_quotes(key),
            Screen::Map => self.handle_map(key),
            Screen::Profile => self.handle_profile(key),
            Screen::Coach => self.handle_coach(key),
            Screen::Compose => None,
        }
    }

    fn handle_failure(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Char('r') => {
                self.failure = None;
                None
            }
            KeyCode::Char('R') => self.reload(),
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            _ => None,
        }
    }

    fn handle_dashboard(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Enter | KeyCode::Tab => self.go(Screen::Memories),
            _ => None,
        }
    }

    // -- Memories --

    pub fn visible_entries(&self) -> Vec<&TaggedEntry> {
        self.memories.visible()
    }

    fn current_entry(&self) -> Option<TaggedEntry> {
        self.visible_entries().get(self.selected).map(|t| (*t).clone())
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected as i32;
        let new = (current + delta).clamp(0, len as i32 - 1);
        self.selected = new as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_entries().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn handle_memories(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(20),
            KeyCode::PageUp => self.move_selection(-20),
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('G') => {
                self.selected = self.visible_entries().len().saturating_sub(1);
            }
            KeyCode::Enter => return self.open_detail(),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.search_input = self.memories.query.search.clone();
                self.search_cursor = self.search_input.chars().count();
            }
            KeyCode::Char('f') => self.input_mode = InputMode::Filter,
            KeyCode::Char('s') => {
                let next = self.memories.query.sort.next();
                self.memories.set_sort(next);
                self.selected = 0;
            }
            KeyCode::Char(' ') => {
                if let Some(t) = self.current_entry() {
                    self.memories.toggle_select(&t.entry.id);
                }
            }
            KeyCode::Char('a') => self.memories.select_all_visible(),
            KeyCode::Char('e') => {
                if let Some(t) = self.current_entry() {
                    self.open_compose(Some(&t.entry));
                }
            }
            KeyCode::Char('d') => {
                if let Some(t) = self.current_entry() {
                    self.ask_delete(vec![t.entry.id]);
                }
            }
            KeyCode::Char('D') => {
                let ids: Vec<String> = self.memories.selected.iter().cloned().collect();
                self.ask_delete(ids);
            }
            KeyCode::Esc => {
                if !self.memories.selected.is_empty() {
                    self.memories.clear_selection();
                } else if !self.memories.query.search.is_empty() {
                    self.memories.set_search("");
                    self.selected = 0;
                }
            }
            _ => {}
        }
        None
    }

    fn handle_search(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.memories.set_search(self.search_input.trim());
                self.selected = 0;
            }
            KeyCode::Backspace => {
                if self.search_cursor > 0 {
                    self.search_cursor -= 1;
                    remove_char(&mut self.search_input, self.search_cursor);
                }
            }
            KeyCode::Left => self.search_cursor = self.search_cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.search_cursor < self.search_input.chars().count() {
                    self.search_cursor += 1;
                }
            }
            KeyCode::Char(c) => {
                insert_char(&mut self.search_input, self.search_cursor, c);
                self.search_cursor += 1;
            }
            _ => {}
        }
        None
    }

    fn handle_filter(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let next = self.memories.query.tag.next();
                self.memories.set_tag(next);
                self.selected = 0;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let prev = prev_tag(self.memories.query.tag);
                self.memories.set_tag(prev);
                self.selected = 0;
            }
            _ => {}
        }
        None
    }

    fn ask_delete(&mut self, ids: Vec<String>) {
        if ids.is_empty() {
            return;
        }
        self.confirm_delete = ids;
        self.input_mode = InputMode::Confirm;
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.input_mode = InputMode::Normal;
                let mut ids = Vec::new();
                for id in std::mem::take(&mut self.confirm_delete) {
                    if let Some(pending) = self.memories.begin_delete(&id) {
                        self.pending_deletes.insert(id.clone(), pending);
                        ids.push(id);
                    }
                }
                self.clamp_selection();
                if self.screen == Screen::Detail {
                    self.follow_up = self.go(Screen::Memories);
                }
                if ids.is_empty() {
                    None
                } else {
                    Some(AsyncAction::DeleteEntries { ids })
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.confirm_delete.clear();
                None
            }
            _ => None,
        }
    }

    // -- Detail --

    fn open_detail(&mut self) -> Option<AsyncAction> {
        let entry = self.current_entry()?;
        self.detail = ViewState::Loaded(entry.entry);
        self.detail_scroll = 0;
        self.go(Screen::Detail)
    }

    fn handle_detail(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(20),
            KeyCode::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(20),
            KeyCode::Char('e') => {
                if let Some(entry) = self.detail.loaded().cloned() {
                    self.open_compose(Some(&entry));
                }
            }
            KeyCode::Char('d') => {
                if let Some(entry) = self.detail.loaded() {
                    let id = entry.id.clone();
                    self.ask_delete(vec![id]);
                }
            }
            KeyCode::Esc | KeyCode::Backspace => return self.go(self.previous),
            _ => {}
        }
        None
    }

    // -- Compose --

    /// Blank form, or a form pre-filled with `entry` for editing.
    fn open_compose(&mut self, entry: Option<&DiaryEntry>) {
        self.form = match entry {
            Some(e) => {
                let mut form = DiaryForm::edit(self.ctx.clone(), e.id.clone());
                form.apply_loaded(ApiOutcome::success(e.clone()));
                form
            }
            None => DiaryForm::new(self.ctx.clone()),
        };
        self.compose_field = 0;
        self.go(Screen::Compose);
    }

    fn compose_text(&mut self) -> Option<&mut String> {
        let draft = &mut self.form.draft;
        match self.compose_field {
            0 => Some(&mut draft.title),
            1 => Some(&mut draft.content),
            2 => Some(&mut draft.location),
            3 => Some(&mut draft.mood),
            _ => None,
        }
    }

    /// Move to another field. Leaving the content field runs analysis.
    fn move_compose_field(&mut self, forward: bool) -> Option<AsyncAction> {
        let leaving = self.compose_field;
        let n = COMPOSE_FIELDS.len();
        self.compose_field = if forward {
            (self.compose_field + 1) % n
        } else {
            (self.compose_field + n - 1) % n
        };
        if leaving != CONTENT_FIELD {
            return None;
        }
        if self.form.wants_analysis() {
            self.form.analyzing = true;
            Some(AsyncAction::AnalyzeDraft {
                text: self.form.draft.content.clone(),
            })
        } else {
            self.form.analysis = None;
            self.form.analysis_error = None;
            None
        }
    }

    fn handle_compose(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc => self.go(self.previous),
            KeyCode::Tab => self.move_compose_field(true),
            KeyCode::BackTab => self.move_compose_field(false),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.form.submitting {
                    return None;
                }
                match self.form.begin_submit() {
                    Ok(request) => Some(AsyncAction::SaveEntry { request }),
                    Err(msg) => {
                        self.toast(msg);
                        None
                    }
                }
            }
            KeyCode::Enter if self.compose_field == CONTENT_FIELD => {
                self.form.draft.content.push('\n');
                None
            }
            KeyCode::Enter => self.move_compose_field(true),
            KeyCode::Backspace => {
                if let Some(text) = self.compose_text() {
                    text.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.compose_text() {
                    text.push(c);
                }
                None
            }
            _ => None,
        }
    }

    // -- Quotes --

    pub fn visible_quotes(&self) -> Vec<&Quote> {
        self.quote_view
            .visible(self.quotes.history(), self.quotes.favorite_keys())
    }

    fn cycle_emotion(&mut self, forward: bool) {
        let all = QuoteEmotion::ALL;
        let idx = all.iter().position(|e| *e == self.quotes.emotion).unwrap_or(0);
        let next = if forward {
            (idx + 1) % all.len()
        } else {
            (idx + all.len() - 1) % all.len()
        };
        self.quotes.select_emotion(all[next]);
    }

    fn generate_quote(&mut self) -> Option<AsyncAction> {
        if self.quotes.generating {
            return None;
        }
        match self.quotes.begin_generate() {
            Ok(request) => Some(AsyncAction::GenerateQuote { request }),
            Err(msg) => {
                self.toast(msg);
                None
            }
        }
    }

    fn handle_quotes(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.cycle_emotion(true),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_emotion(false),
            KeyCode::Enter => return self.generate_quote(),
            KeyCode::Char('p') => self.input_mode = InputMode::Prompt,
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.visible_quotes().len();
                if len > 0 {
                    self.quote_selected = (self.quote_selected + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.quote_selected = self.quote_selected.saturating_sub(1);
            }
            KeyCode::Char('f') => {
                let quote = self.visible_quotes().get(self.quote_selected).map(|q| (*q).clone());
                if let Some(quote) = quote {
                    if let Err(e) = self.quotes.toggle_favorite(&quote) {
                        self.toast(format!("Failed to save favorites: {e}"));
                    }
                }
            }
            KeyCode::Char('v') => {
                self.quote_view.favorites_only = !self.quote_view.favorites_only;
                self.quote_selected = 0;
            }
            KeyCode::Char('o') => {
                let next = match self.quote_view.query.sort {
                    QuoteSort::Date => QuoteSort::Author,
                    QuoteSort::Author => QuoteSort::Emotion,
                    QuoteSort::Emotion => QuoteSort::Date,
                };
                self.quote_view.set_sort(next);
                self.quote_selected = 0;
            }
            KeyCode::Char('e') => {
                let options = QuoteHistoryView::emotion_options(self.quotes.history());
                let current = self
                    .quote_view
                    .query
                    .emotion
                    .clone()
                    .unwrap_or_else(|| "all".to_string());
                let idx = options.iter().position(|o| *o == current).unwrap_or(0);
                let next = options.get((idx + 1) % options.len().max(1)).cloned();
                self.quote_view.set_emotion(next.as_deref());
                self.quote_selected = 0;
            }
            _ => {}
        }
        None
    }

    fn handle_prompt(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                return self.generate_quote();
            }
            KeyCode::Backspace => {
                self.quotes.prompt.pop();
            }
            KeyCode::Char(c) => self.quotes.prompt.push(c),
            _ => {}
        }
        None
    }

    // -- Map --

    fn handle_map(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.map.select_next(),
            KeyCode::Esc => {
                if let Some(emotion) = self.map.selected().map(|n| n.emotion.clone()) {
                    self.map.toggle(&emotion);
                }
            }
            _ => {}
        }
        None
    }

    // -- Profile --

    fn handle_profile(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        if key.code == KeyCode::Char('e') && self.profile.begin_edit() {
            self.profile_field = 0;
        }
        None
    }

    fn profile_text(&mut self) -> Option<&mut String> {
        let field = self.profile_field;
        let draft: &mut Profile = self.profile.draft_mut()?;
        let slot = match field {
            0 => &mut draft.full_name,
            1 => &mut draft.username,
            2 => &mut draft.bio,
            3 => &mut draft.location,
            _ => return None,
        };
        Some(slot.get_or_insert_with(String::new))
    }

    fn handle_profile_edit(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc => self.profile.cancel(),
            KeyCode::Tab | KeyCode::Enter => {
                self.profile_field = (self.profile_field + 1) % PROFILE_FIELDS.len();
            }
            KeyCode::BackTab => {
                let n = PROFILE_FIELDS.len();
                self.profile_field = (self.profile_field + n - 1) % n;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.profile.saving {
                    return None;
                }
                let update = self.profile.pending_update();
                if update.is_empty() {
                    self.profile.cancel();
                    return None;
                }
                self.profile.saving = true;
                return Some(AsyncAction::SaveProfile { update });
            }
            KeyCode::Backspace => {
                if let Some(text) = self.profile_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.profile_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
        None
    }

    // -- Coach --

    fn handle_coach(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        if matches!(key.code, KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter) {
            self.input_mode = InputMode::Question;
        }
        None
    }

    fn handle_question(&mut self, key: KeyEvent) -> Option<AsyncAction> {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let question = self.coach_input.trim().to_string();
                if question.is_empty() {
                    return None;
                }
                self.input_mode = InputMode::Normal;
                self.advice = Some(ViewState::Loading);
                return Some(AsyncAction::AskCoach { question });
            }
            KeyCode::Backspace => {
                self.coach_input.pop();
            }
            KeyCode::Char(c) => self.coach_input.push(c),
            _ => {}
        }
        None
    }

    /// Tick the error timer down.
    pub fn tick_error(&mut self) {
        if self.error_timer > 0 {
            self.error_timer -= 1;
            if self.error_timer == 0 {
                self.error_message = None;
            }
        }
    }

    /// Sort label for the filter bar.
    pub fn sort_label(&self) -> String {
        match self.memories.query.sort {
            EntrySort::Newest => "newest".into(),
            EntrySort::Oldest => "oldest".into(),
            EntrySort::Title => "title".into(),
        }
    }
}

/// Cycle All <- each tag <- All, the reverse of `TagFilter::next`.
fn prev_tag(tag: TagFilter) -> TagFilter {
    let all = ColorTag::ALL;
    match tag {
        TagFilter::All => TagFilter::Only(all[all.len() - 1]),
        TagFilter::Only(t) => match all.iter().position(|x| *x == t) {
            Some(0) | None => TagFilter::All,
            Some(i) => TagFilter::Only(all[i - 1]),
        },
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn insert_char(s: &mut String, char_idx: usize, c: char) {
    let at = byte_index(s, char_idx);
    s.insert(at, c);
}

fn remove_char(s: &mut String, char_idx: usize) {
    let at = byte_index(s, char_idx);
    if at < s.len() {
        s.remove(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use memorymap_core::analytics::Analytics;
    use memorymap_core::config::MemoryMapConfig;
    use memorymap_core::model::{Ack, EntryList};
    use memorymap_core::pages::SaveRequest;
    use memorymap_core::store::{MemoryStore, SharedStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_app() -> App {
        let config = MemoryMapConfig::default_config();
        let store: SharedStore = Arc::new(MemoryStore::with_token("t"));
        let ctx = PageContext::new(&config, store, Arc::new(Analytics::disabled())).unwrap();
        App::new(ctx, CancellationToken::new())
    }

    fn entries(ids: &[&str]) -> EntryList {
        EntryList {
            entries: ids
                .iter()
                .map(|id| DiaryEntry::new(*id, format!("Entry {id}"), "text"))
                .collect(),
            count: ids.len(),
        }
    }

    fn app_with_memories(ids: &[&str]) -> App {
        let mut app = test_app();
        app.go(Screen::Memories);
        app.memories.set_sort(EntrySort::Title);
        app.handle_result(AsyncResult::Entries(ApiOutcome::success(entries(ids))));
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_initial_state() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);
        assert!(app.showing_splash());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_nav_follows_route_order() {
        assert_eq!(
            Screen::nav(),
            vec![
                Screen::Dashboard,
                Screen::Coach,
                Screen::Map,
                Screen::Memories,
                Screen::Quotes,
                Screen::Profile
            ]
        );
    }

    #[test]
    fn test_number_keys_switch_and_load() {
        let mut app = test_app();
        let action = app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.screen, Screen::Memories);
        assert!(matches!(action, Some(AsyncAction::LoadEntries { limit: 100 })));

        let action = app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.screen, Screen::Map);
        assert!(matches!(action, Some(AsyncAction::LoadMap { limit: 50 })));
    }

    #[test]
    fn test_leaving_screen_cancels_its_requests() {
        let mut app = test_app();
        let action = app.go(Screen::Memories).unwrap();
        let load = app.dispatch(action);
        let delete = app.dispatch(AsyncAction::DeleteEntries {
            ids: vec!["a".into()],
        });

        app.go(Screen::Quotes);
        assert!(load.token.is_cancelled());
        assert!(!delete.token.is_cancelled());
    }

    #[test]
    fn test_cancelled_result_ignored() {
        let mut app = test_app();
        app.go(Screen::Memories);
        app.handle_result(AsyncResult::Entries(ApiOutcome::cancelled()));
        assert_eq!(app.memories.state, ViewState::Loading);
    }

    #[test]
    fn test_selection_navigation() {
        let mut app = app_with_memories(&["a", "b", "c", "d", "e"]);
        assert_eq!(app.selected, 0);
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected, 2);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::Char('k')));
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected, 0);
        app.handle_key(key(KeyCode::Char('G')));
        assert_eq!(app.selected, 4);
    }

    #[test]
    fn test_search_applies_on_enter() {
        let mut app = app_with_memories(&["a", "b"]);
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        type_text(&mut app, "Entry b");
        assert_eq!(app.visible_entries().len(), 2);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.visible_entries().len(), 1);
    }

    #[test]
    fn test_search_input_editing() {
        let mut app = app_with_memories(&["a"]);
        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "héllo");
        assert_eq!(app.search_cursor, 5);
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.search_input, "hélo");
        assert_eq!(app.search_cursor, 3);
    }

    #[test]
    fn test_filter_cycling_both_ways() {
        let mut app = app_with_memories(&["a"]);
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.input_mode, InputMode::Filter);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.memories.query.tag, TagFilter::Only(ColorTag::Happy));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.memories.query.tag, TagFilter::All);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.memories.query.tag, TagFilter::Only(ColorTag::Challenging));
    }

    #[test]
    fn test_delete_confirm_flow() {
        let mut app = app_with_memories(&["a", "b"]);
        assert!(app.handle_key(key(KeyCode::Char('d'))).is_none());
        assert_eq!(app.input_mode, InputMode::Confirm);

        let action = app.handle_key(key(KeyCode::Char('y')));
        match action {
            Some(AsyncAction::DeleteEntries { ids }) => assert_eq!(ids, vec!["a"]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.visible_entries().len(), 1);

        app.handle_result(AsyncResult::Deleted {
            id: "a".into(),
            outcome: ApiOutcome::success(Ack::default()),
        });
        assert_eq!(app.visible_entries().len(), 1);
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_failed_delete_restores_and_toasts() {
        let mut app = app_with_memories(&["a", "b"]);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));

        app.handle_result(AsyncResult::Deleted {
            id: "a".into(),
            outcome: ApiOutcome::failure("Database unavailable"),
        });
        assert_eq!(app.visible_entries().len(), 2);
        assert!(app
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("Database unavailable")));
    }

    #[test]
    fn test_delete_declined() {
        let mut app = app_with_memories(&["a"]);
        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.handle_key(key(KeyCode::Char('n'))).is_none());
        assert_eq!(app.visible_entries().len(), 1);
        assert!(app.confirm_delete.is_empty());
    }

    #[test]
    fn test_compose_requires_title() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.screen, Screen::Compose);

        assert!(app.handle_key(ctrl('s')).is_none());
        assert_eq!(app.error_message.as_deref(), Some("Title is required"));
    }

    #[test]
    fn test_compose_save_sends_create() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('n')));
        type_text(&mut app, "Walk");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "By the sea");

        match app.handle_key(ctrl('s')) {
            Some(AsyncAction::SaveEntry {
                request: SaveRequest::Create(entry),
            }) => {
                assert_eq!(entry.title, "Walk");
                assert_eq!(entry.content, "By the sea");
            }
            other => panic!("unexpected {other:?}"),
        }
        // a second Ctrl+S while saving sends nothing
        assert!(app.handle_key(ctrl('s')).is_none());
    }

    #[test]
    fn test_leaving_content_triggers_analysis() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "hi");
        assert!(app.handle_key(key(KeyCode::Tab)).is_none());

        app.handle_key(key(KeyCode::BackTab));
        type_text(&mut app, " there, lovely day");
        match app.handle_key(key(KeyCode::Tab)) {
            Some(AsyncAction::AnalyzeDraft { text }) => assert_eq!(text, "hi there, lovely day"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_saved_navigates_to_dashboard() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_result(AsyncResult::Saved(ApiOutcome::success(())));
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(matches!(app.follow_up, Some(AsyncAction::LoadDashboard)));
    }

    #[test]
    fn test_save_failure_stays_on_compose() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_result(AsyncResult::Saved(ApiOutcome::failure("Title too long")));
        assert_eq!(app.screen, Screen::Compose);
        assert!(app.error_message.is_some());
    }

    #[test]
    fn test_quote_emotion_cycle_and_generate() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('5')));
        assert_eq!(app.screen, Screen::Quotes);
        assert_eq!(app.quotes.emotion, QuoteEmotion::Neutral);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.quotes.emotion, QuoteEmotion::Happy);

        match app.handle_key(key(KeyCode::Enter)) {
            Some(AsyncAction::GenerateQuote { request }) => assert_eq!(request.emotion, "HAPPY"),
            other => panic!("unexpected {other:?}"),
        }
        // one request at a time
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_quote_prompt_too_long() {
        let mut app = test_app();
        app.go(Screen::Quotes);
        app.quotes.prompt = "x".repeat(301);
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(app.error_message.is_some());
    }

    #[test]
    fn test_map_selection_cycles() {
        use memorymap_core::model::{EmotionalInsights, InsightsEnvelope};
        use std::collections::BTreeMap;

        let mut app = test_app();
        app.go(Screen::Map);
        let insights = EmotionalInsights {
            total_entries: 3,
            emotion_distribution: BTreeMap::from([("joy".to_string(), 2), ("sad".to_string(), 1)]),
            most_common_emotions: vec!["joy".into()],
        };
        app.handle_result(AsyncResult::Map {
            insights: ApiOutcome::success(InsightsEnvelope { insights }),
            entries: ApiOutcome::success(EntryList::default()),
        });

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.map.selected().map(|n| n.emotion.as_str()), Some("joy"));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.map.selected().map(|n| n.emotion.as_str()), Some("sad"));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.map.selected().is_none());
    }

    #[test]
    fn test_profile_edit_and_unchanged_save() {
        let mut app = test_app();
        app.go(Screen::Profile);
        app.handle_result(AsyncResult::Profile(ApiOutcome::success(Profile {
            full_name: Some("Ada".into()),
            ..Default::default()
        })));

        app.handle_key(key(KeyCode::Char('e')));
        assert!(app.profile.is_editing());
        // unchanged draft closes without a request
        assert!(app.handle_key(ctrl('s')).is_none());
        assert!(!app.profile.is_editing());

        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "Writer");
        match app.handle_key(ctrl('s')) {
            Some(AsyncAction::SaveProfile { update }) => {
                assert_eq!(update.bio.as_deref(), Some("Writer"));
                assert!(update.full_name.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_coach_question() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.screen, Screen::Coach);
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Question);
        type_text(&mut app, "Why am I tired?");
        match app.handle_key(key(KeyCode::Enter)) {
            Some(AsyncAction::AskCoach { question }) => assert_eq!(question, "Why am I tired?"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.advice, Some(ViewState::Loading));
    }

    #[test]
    fn test_render_failure_retry_and_reload() {
        let mut app = app_with_memories(&["a"]);
        app.failure = Some(RenderFailure::new("boom"));
        // other keys are swallowed
        assert!(app.handle_key(key(KeyCode::Char('4'))).is_none());

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.failure.is_none());
        assert_eq!(app.screen, Screen::Memories);

        app.failure = Some(RenderFailure::new("boom"));
        let action = app.handle_key(key(KeyCode::Char('R')));
        assert!(app.failure.is_none());
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(matches!(action, Some(AsyncAction::LoadDashboard)));
        assert!(app.memories.entries().is_empty());
    }

    #[test]
    fn test_first_dashboard_result_ends_splash_wait() {
        let mut app = test_app();
        app.handle_result(AsyncResult::Dashboard {
            entries: ApiOutcome::success(entries(&["a"])),
            insights: ApiOutcome::failure("Not Found"),
        });
        assert!(app.first_load_done);
        assert_eq!(app.dashboard.insights.error(), Some("Not Found"));
    }

    #[test]
    fn test_error_toast_timer() {
        let mut app = test_app();
        app.toast("test error");
        assert!(app.error_message.is_some());
        assert_eq!(app.error_timer, 100);

        for _ in 0..99 {
            app.tick_error();
        }
        assert!(app.error_message.is_some());

        app.tick_error();
        assert!(app.error_message.is_none());
        assert_eq!(app.error_timer, 0);
    }

    #[test]
    fn test_prev_tag_wraps() {
        assert_eq!(prev_tag(TagFilter::All), TagFilter::Only(ColorTag::Challenging));
        assert_eq!(prev_tag(TagFilter::Only(ColorTag::Happy)), TagFilter::All);
    }
}
