use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use crate::analytics::AnalyticsEvent;
use crate::api::{ApiOutcome, CANCELLED_MESSAGE};
use crate::filter::{filter_entries, EntryQuery, EntrySort, TagFilter};
use crate::model::{Ack, EntryList};
use crate::pages::PageContext;
use crate::tagging::{tag_all, TaggedEntry};
use crate::view::ViewState;

/// An entry removed optimistically, waiting for the backend's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub entry: TaggedEntry,
}

impl PendingDelete {
    pub fn id(&self) -> &str {
        &self.entry.entry.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteSummary {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

pub struct MemoriesPage {
    ctx: PageContext,
    pub state: ViewState<Vec<TaggedEntry>>,
    pub query: EntryQuery,
    pub selected: BTreeSet<String>,
    /// Last surfaced error from a failed mutation.
    pub notice: Option<String>,
    deleted: HashSet<String>,
    /// Removed locally, backend answer not in yet.
    pending: HashSet<String>,
    load_order: HashMap<String, usize>,
}

impl MemoriesPage {
    pub fn new(ctx: PageContext) -> Self {
        let sort = EntrySort::parse(&ctx.ui.default_sort).unwrap_or_default();
        Self {
            ctx,
            state: ViewState::Loading,
            query: EntryQuery {
                sort,
                ..Default::default()
            },
            selected: BTreeSet::new(),
            notice: None,
            deleted: HashSet::new(),
            pending: HashSet::new(),
            load_order: HashMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.ctx.ui.memories_limit
    }

    pub async fn load(&mut self) {
        self.state = ViewState::Loading;
        self.ctx
            .analytics
            .log(AnalyticsEvent::page_view("Memories", "/memories"));
        let started = Instant::now();
        let outcome = self.ctx.api.list_entries(self.limit()).await;
        self.ctx.analytics.track_performance("memories_load", started);
        self.apply_entries(outcome);
    }

    /// Store a fetched list. Soft-deleted rows, ids deleted in this
    /// session and ids with a delete in flight are dropped.
    pub fn apply_entries(&mut self, outcome: ApiOutcome<EntryList>) {
        if outcome.is_cancelled() {
            return;
        }
        let (deleted, pending) = (&self.deleted, &self.pending);
        let mut order = HashMap::new();
        let outcome = outcome.map(|list| {
            for (i, e) in list.entries.iter().enumerate() {
                order.insert(e.id.clone(), i);
            }
            tag_all(
                list.entries
                    .into_iter()
                    .filter(|e| !e.deleted && !deleted.contains(&e.id) && !pending.contains(&e.id))
                    .collect(),
            )
        });
        self.state = ViewState::from_outcome(outcome, Vec::is_empty);
        self.load_order = order;

        let entries = self.state.loaded().map(Vec::as_slice).unwrap_or(&[]);
        self.selected
            .retain(|id| entries.iter().any(|t| &t.entry.id == id));
    }

    pub fn entries(&self) -> &[TaggedEntry] {
        self.state.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries after search, tag filter and sort.
    pub fn visible(&self) -> Vec<&TaggedEntry> {
        filter_entries(self.entries(), &self.query)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
        if !self.query.search.trim().is_empty() {
            let result_count = self.visible().len();
            self.ctx.analytics.log(AnalyticsEvent::Search {
                search_term: self.query.search.trim().to_string(),
                result_count,
            });
        }
    }

    pub fn set_tag(&mut self, tag: TagFilter) {
        self.query.tag = tag;
    }

    pub fn set_sort(&mut self, sort: EntrySort) {
        self.query.sort = sort;
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted.contains(id)
    }

    // -- selection --

    pub fn toggle_select(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all_visible(&mut self) {
        let ids: Vec<String> = self.visible().iter().map(|t| t.entry.id.clone()).collect();
        self.selected.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // -- optimistic delete --

    /// Remove `id` from the list right away. `None` if it is not present.
    pub fn begin_delete(&mut self, id: &str) -> Option<PendingDelete> {
        let list = self.state.loaded_mut()?;
        let pos = list.iter().position(|t| t.entry.id == id)?;
        let entry = list.remove(pos);
        if list.is_empty() {
            self.state = ViewState::Empty;
        }
        self.selected.remove(id);
        self.pending.insert(entry.entry.id.clone());
        Some(PendingDelete { entry })
    }

    /// Apply the backend's answer: remember a successful delete so a
    /// refetch cannot bring the entry back, or put the entry back where it
    /// was and surface the error.
    pub fn finish_delete(&mut self, pending: PendingDelete, outcome: &ApiOutcome<Ack>) {
        self.pending.remove(pending.id());
        match outcome {
            ApiOutcome::Success { .. } => {
                self.deleted.insert(pending.id().to_string());
                self.notice = None;
            }
            ApiOutcome::Failure { error } => {
                tracing::warn!(id = pending.id(), "delete failed, restoring: {error}");
                self.notice = Some(format!("Could not delete \"{}\": {error}", pending.entry.entry.title));
                self.reinstate(pending.entry);
            }
            ApiOutcome::Cancelled => {}
        }
    }

    fn reinstate(&mut self, entry: TaggedEntry) {
        let rank = self.load_order.get(&entry.entry.id).copied().unwrap_or(usize::MAX);
        // A failed or in-flight refetch owns the view; the next load lists it.
        match self.state {
            ViewState::Loaded(_) => {}
            ViewState::Empty => self.state = ViewState::Loaded(Vec::new()),
            ViewState::Loading | ViewState::Failed(_) => return,
        }
        if let Some(list) = self.state.loaded_mut() {
            let order = &self.load_order;
            let pos = list
                .iter()
                .position(|t| order.get(&t.entry.id).copied().unwrap_or(usize::MAX) > rank)
                .unwrap_or(list.len());
            list.insert(pos, entry);
        }
    }

    pub async fn delete(&mut self, id: &str) -> ApiOutcome<Ack> {
        let Some(pending) = self.begin_delete(id) else {
            return ApiOutcome::failure(format!("Entry {id} is not in the list"));
        };
        let outcome = self.ctx.api.delete_entry(id).await;
        self.finish_delete(pending, &outcome);
        outcome
    }

    /// Delete every selected entry. All are removed from the list first,
    /// then the requests are issued one by one.
    pub async fn delete_selected(&mut self) -> DeleteSummary {
        let ids: Vec<String> = self.selected.iter().cloned().collect();
        let pending: Vec<PendingDelete> = ids.iter().filter_map(|id| self.begin_delete(id)).collect();

        let mut summary = DeleteSummary::default();
        for p in pending {
            let id = p.id().to_string();
            let outcome = self.ctx.api.delete_entry(&id).await;
            match &outcome {
                ApiOutcome::Success { .. } => summary.deleted.push(id.clone()),
                ApiOutcome::Failure { error } => summary.failed.push((id.clone(), error.clone())),
                ApiOutcome::Cancelled => {
                    summary.failed.push((id.clone(), CANCELLED_MESSAGE.to_string()))
                }
            }
            self.finish_delete(p, &outcome);
        }
        self.selected.clear();
        if !summary.failed.is_empty() {
            self.notice = Some(format!(
                "{} of {} deletions failed",
                summary.failed.len(),
                summary.failed.len() + summary.deleted.len()
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiaryEntry;
    use crate::pages::testing::offline_context;
    use crate::tagging::ColorTag;

    fn list() -> EntryList {
        EntryList {
            entries: vec![
                DiaryEntry::new("a", "Alpha", "one").with_mood("happy"),
                DiaryEntry::new("b", "Beta", "two").with_mood("calm"),
                DiaryEntry::new("c", "Gamma", "three").with_mood("sad"),
                DiaryEntry {
                    deleted: true,
                    ..DiaryEntry::new("d", "Delta", "gone")
                },
            ],
            count: 4,
        }
    }

    fn loaded_page() -> MemoriesPage {
        let mut page = MemoriesPage::new(offline_context());
        page.set_sort(EntrySort::Title);
        page.apply_entries(ApiOutcome::success(list()));
        page
    }

    fn ids(page: &MemoriesPage) -> Vec<&str> {
        page.entries().iter().map(|t| t.entry.id.as_str()).collect()
    }

    #[test]
    fn test_soft_deleted_filtered_and_tagged() {
        let page = loaded_page();
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
        assert_eq!(page.entries()[2].tag, ColorTag::Challenging);
    }

    #[test]
    fn test_empty_list_is_empty_state() {
        let mut page = MemoriesPage::new(offline_context());
        page.apply_entries(ApiOutcome::success(EntryList::default()));
        assert_eq!(page.state, ViewState::Empty);
    }

    #[test]
    fn test_visible_tag_filter() {
        let mut page = loaded_page();
        page.set_tag(TagFilter::Only(ColorTag::Peaceful));
        let v: Vec<&str> = page.visible().iter().map(|t| t.entry.id.as_str()).collect();
        assert_eq!(v, vec!["b"]);
    }

    #[test]
    fn test_successful_delete_survives_refetch() {
        let mut page = loaded_page();
        let pending = page.begin_delete("b").unwrap();
        assert_eq!(ids(&page), vec!["a", "c"]);

        page.finish_delete(pending, &ApiOutcome::success(Ack::default()));
        assert!(page.is_deleted("b"));

        // backend still returns it
        page.apply_entries(ApiOutcome::success(list()));
        assert_eq!(ids(&page), vec!["a", "c"]);
    }

    #[test]
    fn test_failed_delete_reinstates_in_place() {
        let mut page = loaded_page();
        let pending = page.begin_delete("b").unwrap();
        page.finish_delete(pending, &ApiOutcome::failure("Entry not found"));
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
        assert!(page.notice.as_deref().unwrap().contains("Entry not found"));
        assert!(!page.is_deleted("b"));
    }

    #[test]
    fn test_delete_last_entry_goes_empty_then_back() {
        let mut page = MemoriesPage::new(offline_context());
        page.apply_entries(ApiOutcome::success(EntryList {
            entries: vec![DiaryEntry::new("x", "Only", "one")],
            count: 1,
        }));
        let pending = page.begin_delete("x").unwrap();
        assert_eq!(page.state, ViewState::Empty);
        page.finish_delete(pending, &ApiOutcome::failure("nope"));
        assert_eq!(ids(&page), vec!["x"]);
    }

    #[test]
    fn test_cancelled_delete_not_applied() {
        let mut page = loaded_page();
        let pending = page.begin_delete("a").unwrap();
        page.finish_delete(pending, &ApiOutcome::cancelled());
        assert!(!page.is_deleted("a"));
        assert!(page.notice.is_none());
    }

    #[test]
    fn test_backend_error_reading_cancelled_still_reinstates() {
        let mut page = loaded_page();
        let pending = page.begin_delete("b").unwrap();
        let outcome: ApiOutcome<Ack> = crate::error::MemoryMapError::Api {
            status: 409,
            message: "request cancelled".into(),
        }
        .into();
        page.finish_delete(pending, &outcome);
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
        assert!(!page.is_deleted("b"));
        assert!(page.notice.as_deref().unwrap().contains("request cancelled"));
    }

    #[test]
    fn test_failed_refetch_then_failed_delete_keeps_error() {
        let mut page = loaded_page();
        let pending = page.begin_delete("b").unwrap();
        page.apply_entries(ApiOutcome::failure("Database unavailable"));

        page.finish_delete(pending, &ApiOutcome::failure("boom"));
        assert_eq!(page.state, ViewState::Failed("Database unavailable".into()));
        assert!(page.notice.as_deref().unwrap().contains("boom"));

        // the next successful load lists the entry again
        page.apply_entries(ApiOutcome::success(list()));
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_begin_delete_unknown_id() {
        let mut page = loaded_page();
        assert!(page.begin_delete("zzz").is_none());
        assert_eq!(ids(&page).len(), 3);
    }

    #[test]
    fn test_selection() {
        let mut page = loaded_page();
        page.toggle_select("a");
        page.toggle_select("c");
        page.toggle_select("a");
        assert_eq!(page.selected.iter().collect::<Vec<_>>(), vec!["c"]);
        page.select_all_visible();
        assert_eq!(page.selected.len(), 3);

        page.begin_delete("c");
        assert!(!page.selected.contains("c"));
    }

    #[tokio::test]
    async fn test_delete_selected_offline_restores_all() {
        let mut page = loaded_page();
        page.toggle_select("a");
        page.toggle_select("c");
        let summary = page.delete_selected().await;
        assert!(summary.deleted.is_empty());
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
        assert!(page.selected.is_empty());
        assert_eq!(page.notice.as_deref(), Some("2 of 2 deletions failed"));
    }

    #[test]
    fn test_refetch_during_pending_delete() {
        let mut page = loaded_page();
        let pending = page.begin_delete("b").unwrap();

        // a refresh lands before the DELETE answer
        page.apply_entries(ApiOutcome::success(list()));
        assert_eq!(ids(&page), vec!["a", "c"]);

        page.finish_delete(pending, &ApiOutcome::failure("boom"));
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
    }
}
