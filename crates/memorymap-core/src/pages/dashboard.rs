use std::collections::BTreeSet;
use std::time::Instant;

use crate::analytics::AnalyticsEvent;
use crate::api::ApiOutcome;
use crate::model::{DiaryEntry, EmotionalInsights, EntryList, InsightsEnvelope};
use crate::pages::PageContext;
use crate::view::ViewState;

pub const RECENT_ENTRIES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub entry_count: u64,
    pub distinct_locations: usize,
    pub top_emotion: Option<String>,
}

pub struct DashboardPage {
    ctx: PageContext,
    pub entries: ViewState<Vec<DiaryEntry>>,
    pub insights: ViewState<EmotionalInsights>,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            entries: ViewState::Loading,
            insights: ViewState::Loading,
        }
    }

    /// Fetch recent entries and insights concurrently.
    pub async fn load(&mut self) {
        self.entries = ViewState::Loading;
        self.insights = ViewState::Loading;
        self.ctx
            .analytics
            .log(AnalyticsEvent::page_view("Dashboard", "/dashboard"));

        let started = Instant::now();
        let api = &self.ctx.api;
        let (entries, insights) = tokio::join!(api.list_entries(RECENT_ENTRIES), api.insights());
        self.ctx.analytics.track_performance("dashboard_load", started);
        self.apply_entries(entries);
        self.apply_insights(insights);
    }

    pub fn apply_entries(&mut self, outcome: ApiOutcome<EntryList>) {
        if outcome.is_cancelled() {
            return;
        }
        let outcome = outcome.map(|l| {
            l.entries
                .into_iter()
                .filter(|e| !e.deleted)
                .collect::<Vec<_>>()
        });
        self.entries = ViewState::from_outcome(outcome, Vec::is_empty);
    }

    pub fn apply_insights(&mut self, outcome: ApiOutcome<InsightsEnvelope>) {
        if outcome.is_cancelled() {
            return;
        }
        self.insights =
            ViewState::from_outcome(outcome.map(|env| env.insights), EmotionalInsights::is_empty);
    }

    pub fn stats(&self) -> DashboardStats {
        let entries: &[DiaryEntry] = self.entries.loaded().map(Vec::as_slice).unwrap_or(&[]);
        let distinct_locations = entries
            .iter()
            .filter_map(|e| e.location.as_deref())
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect::<BTreeSet<_>>()
            .len();

        let insights = self.insights.loaded();
        let entry_count = insights
            .map(|i| i.total_entries)
            .filter(|n| *n > 0)
            .unwrap_or(entries.len() as u64);

        DashboardStats {
            entry_count,
            distinct_locations,
            top_emotion: insights.and_then(|i| i.top_emotion()).map(str::to_string),
        }
    }
}
