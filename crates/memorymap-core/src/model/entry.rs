use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MemoryMapError, Result};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 20_000;

fn check_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(MemoryMapError::InvalidInput("Title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(MemoryMapError::InvalidInput(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn check_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(MemoryMapError::InvalidInput("Content is required".into()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(MemoryMapError::InvalidInput(format!(
            "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a new entry before it is sent. Title is checked first.
pub fn validate_new_entry(entry: &NewEntry) -> Result<()> {
    check_title(&entry.title)?;
    check_content(&entry.content)
}

/// Validate a patch. Only the fields that are set are checked.
pub fn validate_patch(patch: &EntryPatch) -> Result<()> {
    if let Some(ref title) = patch.title {
        check_title(title)?;
    }
    if let Some(ref content) = patch.content {
        check_content(content)?;
    }
    if patch.is_empty() {
        return Err(MemoryMapError::InvalidInput("Nothing to update".into()));
    }
    Ok(())
}

/// A diary entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<EntryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<EntryMedia>,
}

impl DiaryEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            location: None,
            mood: None,
            created_at: None,
            updated_at: None,
            user_id: None,
            deleted: false,
            analysis: None,
            media: None,
        }
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn with_analysis(mut self, analysis: EntryAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.media = Some(EntryMedia {
            image_url: Some(url.into()),
        });
        self
    }

    pub fn summary(&self) -> Option<&str> {
        self.analysis.as_ref().and_then(|a| a.summary.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|m| m.image_url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// First `max` characters of the content, with an ellipsis when cut.
    pub fn excerpt(&self, max: usize) -> String {
        if self.content.chars().count() <= max {
            self.content.clone()
        } else {
            let cut: String = self.content.chars().take(max).collect();
            format!("{}...", cut.trim_end())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryAnalysis {
    /// Legacy single-label emotion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affect: Option<Affect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affect {
    #[serde(default)]
    pub primary_emotions: Vec<EmotionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Payload for `POST /api/v1/diary/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

/// Payload for `PUT /api/v1/diary/{id}`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.location.is_none()
            && self.mood.is_none()
            && self.deleted.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryList {
    #[serde(default)]
    pub entries: Vec<DiaryEntry>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEnvelope {
    pub entry: DiaryEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCreated {
    pub entry_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}
