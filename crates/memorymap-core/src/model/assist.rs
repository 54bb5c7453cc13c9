//! Request/response shapes for the AI-assisted endpoints: emotion analysis,
//! image generation, coaching, location extraction and feedback.

use serde::{Deserialize, Serialize};

use crate::error::{MemoryMapError, Result};

/// Emotion analysis result. The backend shape varies between model
/// versions, so the body is kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionAnalysis(pub serde_json::Value);

impl EmotionAnalysis {
    /// Primary emotion label, looked up in the known result shapes:
    /// `affect.primary_emotions[0].label`, `analysis.affect...`,
    /// `primary_emotion`, `emotion`, `analysis.emotion`.
    pub fn primary_emotion(&self) -> Option<&str> {
        let v = &self.0;
        let candidates = [
            v.pointer("/affect/primary_emotions/0/label"),
            v.pointer("/analysis/affect/primary_emotions/0/label"),
            v.pointer("/primary_emotion"),
            v.pointer("/emotion"),
            v.pointer("/analysis/emotion"),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter_map(|c| c.as_str())
            .find(|s| !s.is_empty())
    }

    pub fn summary(&self) -> Option<&str> {
        self.0
            .pointer("/summary")
            .or_else(|| self.0.pointer("/analysis/summary"))
            .and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub relevant_entries: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationExtraction {
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub rating: u8,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub message: String,
}

pub fn validate_feedback(fb: &FeedbackSubmission) -> Result<()> {
    if !(1..=5).contains(&fb.rating) {
        return Err(MemoryMapError::InvalidInput(
            "Rating must be between 1 and 5".into(),
        ));
    }
    if fb.message.trim().is_empty() {
        return Err(MemoryMapError::InvalidInput("Message is required".into()));
    }
    Ok(())
}
