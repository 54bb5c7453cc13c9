use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate emotion statistics over a user's entries. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalInsights {
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub emotion_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub most_common_emotions: Vec<String>,
}

impl EmotionalInsights {
    pub fn is_empty(&self) -> bool {
        self.emotion_distribution.is_empty()
    }

    /// Most common emotion: the backend's ranking if present, otherwise the
    /// largest bucket (ties go to the alphabetically first label).
    pub fn top_emotion(&self) -> Option<&str> {
        if let Some(first) = self.most_common_emotions.first() {
            return Some(first.as_str());
        }
        self.emotion_distribution
            .iter()
            .fold(None::<(&String, u64)>, |best, (k, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k, v)),
            })
            .map(|(k, _)| k.as_str())
    }

    pub fn max_count(&self) -> u64 {
        self.emotion_distribution.values().copied().max().unwrap_or(0)
    }
}

/// `GET /coaching/insights` wraps the insights in an envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsEnvelope {
    #[serde(default)]
    pub insights: EmotionalInsights,
}
