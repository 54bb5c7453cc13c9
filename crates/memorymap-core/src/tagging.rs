//! Keyword heuristic that maps a free-text emotion label to a color tag.
//!
//! Rows are checked in table order and the first row with a keyword that is
//! a substring of the lowercased label wins. Labels matching no row are
//! tagged [`ColorTag::Reflective`]. So "happy but challenging" is `Happy`.

use serde::{Deserialize, Serialize};

use crate::model::DiaryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Happy,
    Peaceful,
    Excited,
    Grateful,
    Creative,
    Challenging,
    Reflective,
}

/// Ordered keyword table. Order is the priority.
pub const TAG_KEYWORDS: &[(ColorTag, &[&str])] = &[
    (ColorTag::Happy, &["happy", "joy", "positive"]),
    (ColorTag::Peaceful, &["calm", "peaceful", "relaxed"]),
    (ColorTag::Excited, &["excited", "energetic", "enthusiastic"]),
    (ColorTag::Grateful, &["grateful", "thankful", "appreciative"]),
    (ColorTag::Creative, &["creative", "inspired", "imaginative"]),
    (
        ColorTag::Challenging,
        &["sad", "difficult", "challenging", "negative"],
    ),
    (
        ColorTag::Reflective,
        &["reflective", "thoughtful", "contemplative"],
    ),
];

impl ColorTag {
    pub const ALL: [ColorTag; 7] = [
        Self::Happy,
        Self::Peaceful,
        Self::Excited,
        Self::Reflective,
        Self::Grateful,
        Self::Creative,
        Self::Challenging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Peaceful => "peaceful",
            Self::Excited => "excited",
            Self::Grateful => "grateful",
            Self::Creative => "creative",
            Self::Challenging => "challenging",
            Self::Reflective => "reflective",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Peaceful => "Peaceful",
            Self::Excited => "Excited",
            Self::Grateful => "Grateful",
            Self::Creative => "Creative",
            Self::Challenging => "Challenging",
            Self::Reflective => "Reflective",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Happy => "#FFD700",
            Self::Peaceful => "#98FB98",
            Self::Excited => "#FF6B6B",
            Self::Reflective => "#87CEEB",
            Self::Grateful => "#32CD32",
            Self::Creative => "#9370DB",
            Self::Challenging => "#DC143C",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn color_tag(emotion: &str) -> ColorTag {
    let lower = emotion.to_lowercase();
    TAG_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(tag, _)| *tag)
        .unwrap_or(ColorTag::Reflective)
}

/// The label an entry's tag is derived from: first primary emotion, then
/// `mood`, then the legacy `analysis.emotion`. Only empty strings are
/// skipped; a blank label still wins and tags as reflective.
pub fn entry_emotion(entry: &DiaryEntry) -> Option<&str> {
    let primary = entry
        .analysis
        .as_ref()
        .and_then(|a| a.affect.as_ref())
        .and_then(|af| af.primary_emotions.first())
        .map(|e| e.label.as_str());
    let legacy = entry.analysis.as_ref().and_then(|a| a.emotion.as_deref());

    [primary, entry.mood.as_deref(), legacy]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
}

pub fn entry_tag(entry: &DiaryEntry) -> ColorTag {
    color_tag(entry_emotion(entry).unwrap_or(""))
}

/// An entry with its derived tag, computed once on load.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEntry {
    pub entry: DiaryEntry,
    pub tag: ColorTag,
}

impl TaggedEntry {
    pub fn new(entry: DiaryEntry) -> Self {
        let tag = entry_tag(&entry);
        Self { entry, tag }
    }
}

pub fn tag_all(entries: Vec<DiaryEntry>) -> Vec<TaggedEntry> {
    entries.into_iter().map(TaggedEntry::new).collect()
}

/// Palette used by the emotional map. Unknown labels are grey.
pub fn emotion_color(label: &str) -> &'static str {
    match label.trim().to_lowercase().as_str() {
        "happy" | "joy" => "#FFD700",
        "excited" => "#FF6B6B",
        "love" => "#FF69B4",
        "calm" => "#87CEEB",
        "peaceful" => "#98FB98",
        "sad" => "#4682B4",
        "angry" => "#DC143C",
        "anxious" => "#9370DB",
        "worried" => "#8B4513",
        "neutral" => "#808080",
        "confused" => "#DDA0DD",
        "grateful" => "#32CD32",
        "hopeful" => "#00CED1",
        _ => "#808080",
    }
}

/// `#RRGGBB` to an RGB triple. Anything else is `None`.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
