use crate::analytics::AnalyticsEvent;
use crate::api::ApiOutcome;
use crate::emotion_map::{layout, related_entries, render_svg, EmotionLayout, EmotionNode};
use crate::model::{DiaryEntry, EmotionalInsights, EntryList, InsightsEnvelope};
use crate::pages::PageContext;
use crate::view::ViewState;

pub struct EmotionalMapPage {
    ctx: PageContext,
    pub insights: ViewState<EmotionalInsights>,
    pub entries: ViewState<Vec<DiaryEntry>>,
    layout: EmotionLayout,
    selected: Option<String>,
}

impl EmotionalMapPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            insights: ViewState::Loading,
            entries: ViewState::Loading,
            layout: EmotionLayout::default(),
            selected: None,
        }
    }

    pub async fn load(&mut self) {
        self.insights = ViewState::Loading;
        self.entries = ViewState::Loading;
        let api = &self.ctx.api;
        let (insights, entries) = tokio::join!(
            api.insights(),
            api.list_entries(self.ctx.ui.map_entries_limit)
        );
        self.apply_insights(insights);
        self.apply_entries(entries);
    }

    pub fn apply_insights(&mut self, outcome: ApiOutcome<InsightsEnvelope>) {
        if outcome.is_cancelled() {
            return;
        }
        self.insights =
            ViewState::from_outcome(outcome.map(|env| env.insights), EmotionalInsights::is_empty);
        self.layout = self.insights.loaded().map(layout).unwrap_or_default();
        if let Some(sel) = &self.selected {
            if self.layout.node(sel).is_none() {
                self.selected = None;
            }
        }
        if let Some(insights) = self.insights.loaded() {
            self.ctx.analytics.log(AnalyticsEvent::MapViewed {
                memory_count: insights.total_entries as usize,
            });
        }
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

    pub fn layout(&self) -> &EmotionLayout {
        &self.layout
    }

    pub fn selected(&self) -> Option<&EmotionNode> {
        self.selected.as_deref().and_then(|e| self.layout.node(e))
    }

    /// Select `emotion`, or clear the selection when it is already selected.
    pub fn toggle(&mut self, emotion: &str) {
        if self.selected.as_deref() == Some(emotion) {
            self.selected = None;
            return;
        }
        if self.layout.node(emotion).is_some() {
            self.ctx.analytics.log(AnalyticsEvent::MapMarkerClicked {
                memory_id: emotion.to_string(),
            });
            self.selected = Some(emotion.to_string());
        }
    }

    /// Cycle the selection through nodes in layout order.
    pub fn select_next(&mut self) {
        let nodes = &self.layout.nodes;
        if nodes.is_empty() {
            return;
        }
        let next = match self.selected.as_deref() {
            Some(cur) => nodes
                .iter()
                .position(|n| n.emotion == cur)
                .map(|i| (i + 1) % nodes.len())
                .unwrap_or(0),
            None => 0,
        };
        let emotion = nodes[next].emotion.clone();
        self.toggle(&emotion);
    }

    /// Entries for the selected emotion.
    pub fn related(&self) -> Vec<&DiaryEntry> {
        let (Some(sel), Some(entries)) = (self.selected.as_deref(), self.entries.loaded()) else {
            return Vec::new();
        };
        related_entries(entries, sel)
    }

    pub fn svg(&self) -> String {
        render_svg(&self.layout, self.selected.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Affect, EmotionScore, EntryAnalysis};
    use crate::pages::testing::offline_context;
    use std::collections::BTreeMap;

    fn insights() -> InsightsEnvelope {
        let mut dist = BTreeMap::new();
        dist.insert("joy".to_string(), 4);
        dist.insert("sadness".to_string(), 2);
        InsightsEnvelope {
            insights: EmotionalInsights {
                total_entries: 6,
                emotion_distribution: dist,
                most_common_emotions: vec![],
            },
        }
    }

    fn entry_with(id: &str, label: &str) -> DiaryEntry {
        DiaryEntry::new(id, "t", "c").with_analysis(EntryAnalysis {
            affect: Some(Affect {
                primary_emotions: vec![EmotionScore {
                    label: label.into(),
                    score: 0.9,
                }],
            }),
            ..Default::default()
        })
    }

    fn loaded() -> EmotionalMapPage {
        let mut page = EmotionalMapPage::new(offline_context());
        page.apply_insights(ApiOutcome::success(insights()));
        page.apply_entries(ApiOutcome::success(EntryList {
            entries: vec![entry_with("1", "Joy"), entry_with("2", "sadness"), entry_with("3", "joy")],
            count: 3,
        }));
        page
    }

    #[test]
    fn test_layout_built_from_insights() {
        let page = loaded();
        assert_eq!(page.layout().nodes.len(), 2);
        assert_eq!(page.layout().max_count, 4);
    }

    #[test]
    fn test_toggle_and_related() {
        let mut page = loaded();
        assert!(page.related().is_empty());
        page.toggle("joy");
        assert_eq!(page.selected().unwrap().emotion, "joy");
        let ids: Vec<&str> = page.related().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        page.toggle("joy");
        assert!(page.selected().is_none());
    }

    #[test]
    fn test_toggle_unknown_emotion_ignored() {
        let mut page = loaded();
        page.toggle("anger");
        assert!(page.selected().is_none());
    }

    #[test]
    fn test_select_next_cycles() {
        let mut page = loaded();
        page.select_next();
        assert_eq!(page.selected().unwrap().emotion, "joy");
        page.select_next();
        assert_eq!(page.selected().unwrap().emotion, "sadness");
        page.select_next();
        assert_eq!(page.selected().unwrap().emotion, "joy");
    }

    #[test]
    fn test_empty_insights() {
        let mut page = EmotionalMapPage::new(offline_context());
        page.apply_insights(ApiOutcome::success(InsightsEnvelope::default()));
        assert_eq!(page.insights, ViewState::Empty);
        assert!(page.layout().is_empty());
    }

    #[test]
    fn test_svg_reflects_selection() {
        let mut page = loaded();
        page.toggle("sadness");
        let svg = page.svg();
        assert!(svg.contains("sadness"));
        assert!(svg.contains("You"));
    }
}
