use crate::analytics::AnalyticsEvent;
use crate::api::ApiOutcome;
use crate::filter::{filter_gallery, EntrySort};
use crate::model::{DiaryEntry, EntryList};
use crate::pages::PageContext;
use crate::view::ViewState;

/// Entries that carry a generated image.
pub struct GalleryPage {
    ctx: PageContext,
    pub state: ViewState<Vec<DiaryEntry>>,
    pub search: String,
    pub sort: EntrySort,
}

impl GalleryPage {
    pub fn new(ctx: PageContext) -> Self {
        let sort = EntrySort::parse(&ctx.ui.default_sort).unwrap_or_default();
        Self {
            ctx,
            state: ViewState::Loading,
            search: String::new(),
            sort,
        }
    }

    pub async fn load(&mut self) {
        self.state = ViewState::Loading;
        let outcome = self.ctx.api.list_entries(self.ctx.ui.memories_limit).await;
        self.apply_entries(outcome);
    }

    pub fn apply_entries(&mut self, outcome: ApiOutcome<EntryList>) {
        if outcome.is_cancelled() {
            return;
        }
        let outcome = outcome.map(|list| {
            list.entries
                .into_iter()
                .filter(|e| !e.deleted && e.image_url().is_some())
                .collect::<Vec<_>>()
        });
        self.state = ViewState::from_outcome(outcome, Vec::is_empty);
        if let Some(images) = self.state.loaded() {
            self.ctx.analytics.log(AnalyticsEvent::GalleryViewed {
                image_count: images.len(),
            });
        }
    }

    pub fn visible(&self) -> Vec<&DiaryEntry> {
        let entries = self.state.loaded().map(Vec::as_slice).unwrap_or(&[]);
        filter_gallery(entries, &self.search, self.sort)
    }
}
