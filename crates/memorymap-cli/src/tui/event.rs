use memorymap_core::api::ApiOutcome;
use memorymap_core::model::*;
use memorymap_core::pages::SaveRequest;
use tokio_util::sync::CancellationToken;

/// Actions the UI sends to the async worker task.
#[derive(Debug)]
pub enum AsyncAction {
    /// Recent entries and insights, fetched together.
    LoadDashboard,
    LoadEntries { limit: usize },
    LoadEntry { id: String },
    /// Delete entries one by one. Each answer comes back on its own.
    DeleteEntries { ids: Vec<String> },
    SaveEntry { request: SaveRequest },
    AnalyzeDraft { text: String },
    GenerateQuote { request: QuoteRequest },
    LoadQuoteHistory { limit: usize },
    /// Insights plus the entries used to list related memories.
    LoadMap { limit: usize },
    LoadProfile,
    SaveProfile { update: ProfileUpdate },
    AskCoach { question: String },
}

impl AsyncAction {
    /// Writes keep running when the screen that issued them goes away.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::DeleteEntries { .. } | Self::SaveEntry { .. } | Self::SaveProfile { .. }
        )
    }
}

/// An action plus the token that abandons it.
#[derive(Debug)]
pub struct Dispatch {
    pub action: AsyncAction,
    pub token: CancellationToken,
}

/// Results the async worker sends back to the UI.
#[derive(Debug)]
pub enum AsyncResult {
    Dashboard {
        entries: ApiOutcome<EntryList>,
        insights: ApiOutcome<InsightsEnvelope>,
    },
    Entries(ApiOutcome<EntryList>),
    Entry(ApiOutcome<DiaryEntry>),
    Deleted {
        id: String,
        outcome: ApiOutcome<Ack>,
    },
    Saved(ApiOutcome<()>),
    Analysis {
        text_length: usize,
        outcome: ApiOutcome<EmotionAnalysis>,
    },
    Quote(ApiOutcome<Quote>),
    QuoteHistory(ApiOutcome<QuoteHistory>),
    Map {
        insights: ApiOutcome<InsightsEnvelope>,
        entries: ApiOutcome<EntryList>,
    },
    Profile(ApiOutcome<Profile>),
    ProfileSaved(ApiOutcome<Profile>),
    Advice(ApiOutcome<Advice>),
}
