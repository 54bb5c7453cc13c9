use serde::{Deserialize, Serialize};

/// Emotions the quote generator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteEmotion {
    Happy,
    Peaceful,
    Motivated,
    Grateful,
    Reflective,
    Hopeful,
    Calm,
    #[default]
    Neutral,
}

impl QuoteEmotion {
    pub const ALL: [QuoteEmotion; 8] = [
        Self::Happy,
        Self::Peaceful,
        Self::Motivated,
        Self::Grateful,
        Self::Reflective,
        Self::Hopeful,
        Self::Calm,
        Self::Neutral,
    ];

    /// Wire value (`HAPPY`, `PEACEFUL`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "HAPPY",
            Self::Peaceful => "PEACEFUL",
            Self::Motivated => "MOTIVATED",
            Self::Grateful => "GRATEFUL",
            Self::Reflective => "REFLECTIVE",
            Self::Hopeful => "HOPEFUL",
            Self::Calm => "CALM",
            Self::Neutral => "NEUTRAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Peaceful => "Peaceful",
            Self::Motivated => "Motivated",
            Self::Grateful => "Grateful",
            Self::Reflective => "Reflective",
            Self::Hopeful => "Hopeful",
            Self::Calm => "Calm",
            Self::Neutral => "Neutral",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Happy => "#FFD700",
            Self::Peaceful => "#98FB98",
            Self::Motivated => "#FF6B6B",
            Self::Grateful => "#32CD32",
            Self::Reflective => "#87CEEB",
            Self::Hopeful => "#00CED1",
            Self::Calm => "#DDA0DD",
            Self::Neutral => "#808080",
        }
    }

    /// Case-insensitive parse. `None` for labels outside the palette.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|e| e.as_str() == upper)
    }

    /// Like [`parse`](Self::parse) but falls back to `Neutral`.
    pub fn parse_or_neutral(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for QuoteEmotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteEmotion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|e| e.as_str()).collect();
            format!("unknown emotion '{s}', valid: {}", valid.join(", "))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub emotion: String,
    #[serde(default)]
    pub colors: QuoteColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Quote {
    /// Key under which the quote is stored in the favorites set: the backend
    /// id when present, otherwise the quote text itself.
    pub fn favorite_key(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{} | {}", self.quote, self.author),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub emotion: String,
    #[serde(default)]
    pub diary_content: String,
}

impl QuoteRequest {
    pub fn new(emotion: QuoteEmotion, diary_content: impl Into<String>) -> Self {
        Self {
            emotion: emotion.as_str().to_string(),
            diary_content: diary_content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteHistory {
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

/// `GET /api/v1/quotes/colors/{EMOTION}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionPalette {
    #[serde(default)]
    pub emotion: String,
    #[serde(default)]
    pub colors: QuoteColors,
}
