use crate::analytics::AnalyticsEvent;
use crate::api::{ApiClient, ApiOutcome, CANCELLED_MESSAGE};
use crate::model::{validate_new_entry, DiaryEntry, EmotionAnalysis, EntryPatch, NewEntry};
use crate::pages::{PageContext, SubmitOutcome};
use crate::routes::Route;

/// Content shorter than this is not sent for live analysis.
pub const MIN_ANALYSIS_CHARS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiaryDraft {
    pub title: String,
    pub content: String,
    pub location: String,
    pub mood: String,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

impl DiaryDraft {
    pub fn from_entry(entry: &DiaryEntry) -> Self {
        Self {
            title: entry.title.clone(),
            content: entry.content.clone(),
            location: entry.location.clone().unwrap_or_default(),
            mood: entry.mood.clone().unwrap_or_default(),
        }
    }

    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            title: self.title.trim().to_string(),
            content: self.content.clone(),
            location: non_empty(&self.location),
            mood: non_empty(&self.mood),
        }
    }

    /// Fields that differ from `original`.
    pub fn to_patch(&self, original: &DiaryDraft) -> EntryPatch {
        let changed = |a: &str, b: &str| if a != b { Some(b.trim().to_string()) } else { None };
        EntryPatch {
            title: changed(original.title.as_str(), self.title.as_str()),
            content: if original.content != self.content {
                Some(self.content.clone())
            } else {
                None
            },
            location: changed(original.location.as_str(), self.location.as_str()),
            mood: changed(original.mood.as_str(), self.mood.as_str()),
            deleted: None,
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// What submitting the form sends.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(NewEntry),
    Update { id: String, patch: EntryPatch },
    /// Editing with nothing changed; no request.
    Unchanged,
}

impl SaveRequest {
    pub async fn send(&self, api: &ApiClient) -> ApiOutcome<()> {
        match self {
            Self::Create(entry) => api.create_entry(entry).await.map(|_| ()),
            Self::Update { id, patch } => api.update_entry(id, patch).await.map(|_| ()),
            Self::Unchanged => ApiOutcome::success(()),
        }
    }
}

pub struct DiaryForm {
    ctx: PageContext,
    editing: Option<String>,
    original: DiaryDraft,
    pub draft: DiaryDraft,
    pub submitting: bool,
    pub error: Option<String>,
    pub analyzing: bool,
    pub analysis: Option<EmotionAnalysis>,
    pub analysis_error: Option<String>,
}

impl DiaryForm {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            editing: None,
            original: DiaryDraft::default(),
            draft: DiaryDraft::default(),
            submitting: false,
            error: None,
            analyzing: false,
            analysis: None,
            analysis_error: None,
        }
    }

    /// Form for an existing entry. Call [`load`](Self::load) to fill it.
    pub fn edit(ctx: PageContext, id: impl Into<String>) -> Self {
        Self {
            editing: Some(id.into()),
            ..Self::new(ctx)
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn route(&self) -> Route {
        match &self.editing {
            Some(id) => Route::EditEntry(id.clone()),
            None => Route::NewEntry,
        }
    }

    pub async fn load(&mut self) {
        let Some(id) = self.editing.clone() else {
            return;
        };
        let outcome = self.ctx.api.get_entry(&id).await;
        self.apply_loaded(outcome);
    }

    pub fn apply_loaded(&mut self, outcome: ApiOutcome<DiaryEntry>) {
        if outcome.is_cancelled() {
            return;
        }
        match outcome {
            ApiOutcome::Success { data } => {
                self.original = DiaryDraft::from_entry(&data);
                self.draft = self.original.clone();
                self.error = None;
            }
            ApiOutcome::Failure { error } => self.error = Some(error),
            ApiOutcome::Cancelled => {}
        }
    }

    /// Client-side checks, title first.
    pub fn validate(&self) -> Result<(), String> {
        validate_new_entry(&self.draft.to_new_entry()).map_err(|e| match e {
            crate::error::MemoryMapError::InvalidInput(msg) => msg,
            other => other.to_string(),
        })
    }

    /// The request a submit would send, after client-side validation.
    pub fn save_request(&self) -> Result<SaveRequest, String> {
        self.validate()?;
        Ok(match &self.editing {
            None => SaveRequest::Create(self.draft.to_new_entry()),
            Some(id) => {
                let patch = self.draft.to_patch(&self.original);
                if patch.is_empty() {
                    SaveRequest::Unchanged
                } else {
                    SaveRequest::Update {
                        id: id.clone(),
                        patch,
                    }
                }
            }
        })
    }

    /// Mark the form as submitting and hand back the request to send.
    /// Invalid drafts record the message and send nothing.
    pub fn begin_submit(&mut self) -> Result<SaveRequest, String> {
        match self.save_request() {
            Ok(request) => {
                self.submitting = true;
                self.error = None;
                Ok(request)
            }
            Err(msg) => {
                self.error = Some(msg.clone());
                Err(msg)
            }
        }
    }

    /// Create (or update when editing). Invalid drafts send nothing.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(r) => r,
            Err(msg) => return SubmitOutcome::Invalid(msg),
        };
        let outcome = request.send(&self.ctx.api).await;
        self.finish_submit(outcome)
    }

    pub fn finish_submit(&mut self, outcome: ApiOutcome<()>) -> SubmitOutcome {
        self.submitting = false;
        match outcome {
            ApiOutcome::Success { .. } => {
                if self.editing.is_none() {
                    self.ctx.analytics.log(AnalyticsEvent::DiaryEntryCreated {
                        word_count: self.draft.word_count(),
                        emotion: self
                            .analysis
                            .as_ref()
                            .and_then(|a| a.primary_emotion())
                            .map(str::to_string),
                    });
                }
                SubmitOutcome::Navigate(Route::Dashboard)
            }
            ApiOutcome::Failure { error } => {
                self.ctx
                    .analytics
                    .log(AnalyticsEvent::error("diary_submit", error.clone()));
                self.error = Some(error.clone());
                SubmitOutcome::Failed(error)
            }
            ApiOutcome::Cancelled => SubmitOutcome::Failed(CANCELLED_MESSAGE.to_string()),
        }
    }

    pub fn wants_analysis(&self) -> bool {
        self.draft.content.trim().chars().count() >= MIN_ANALYSIS_CHARS
    }

    /// Live emotion analysis of the draft content. Short content clears the
    /// previous result without a request.
    pub async fn analyze_draft(&mut self) {
        if !self.wants_analysis() {
            self.analysis = None;
            self.analysis_error = None;
            return;
        }
        self.analyzing = true;
        self.analysis_error = None;
        let text = self.draft.content.clone();
        let outcome = self.ctx.api.analyze_emotion(&text).await;
        self.apply_analysis(text.chars().count(), outcome);
    }

    pub fn apply_analysis(&mut self, text_length: usize, outcome: ApiOutcome<EmotionAnalysis>) {
        if outcome.is_cancelled() {
            self.analyzing = false;
            return;
        }
        self.analyzing = false;
        match outcome {
            ApiOutcome::Success { data } => {
                self.ctx.analytics.log(AnalyticsEvent::EmotionAnalysisUsed {
                    text_length,
                    result: data.primary_emotion().map(str::to_string),
                });
                self.analysis = Some(data);
            }
            ApiOutcome::Failure { error } => {
                self.analysis = None;
                self.analysis_error = Some(error);
            }
            ApiOutcome::Cancelled => {}
        }
    }
}
