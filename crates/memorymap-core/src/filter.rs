use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{DiaryEntry, Quote};
use crate::tagging::{ColorTag, TaggedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl EntrySort {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Title,
            Self::Title => Self::Newest,
        }
    }
}

impl std::fmt::Display for EntrySort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
            Self::Title => write!(f, "title"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Only(ColorTag),
}

impl TagFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        ColorTag::parse(s).map(Self::Only)
    }

    pub fn matches(&self, tag: ColorTag) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => *t == tag,
        }
    }

    /// Cycle All -> each tag in display order -> All.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Only(ColorTag::ALL[0]),
            Self::Only(t) => {
                let idx = ColorTag::ALL.iter().position(|x| *x == t).unwrap_or(0);
                ColorTag::ALL
                    .get(idx + 1)
                    .map(|n| Self::Only(*n))
                    .unwrap_or(Self::All)
            }
        }
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(t) => write!(f, "{t}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    pub search: String,
    pub tag: TagFilter,
    pub sort: EntrySort,
}

/// True when the trimmed `term` is empty or occurs case-insensitively in
/// the entry's title, content or analysis summary.
pub fn entry_matches(entry: &DiaryEntry, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        Some(entry.title.as_str()),
        Some(entry.content.as_str()),
        entry.summary(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

fn cmp_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, newest_first: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_entries<T, F>(items: &mut [T], sort: EntrySort, entry_of: F)
where
    F: Fn(&T) -> &DiaryEntry,
{
    items.sort_by(|a, b| {
        let (a, b) = (entry_of(a), entry_of(b));
        match sort {
            EntrySort::Newest => cmp_dates(a.created_at, b.created_at, true),
            EntrySort::Oldest => cmp_dates(a.created_at, b.created_at, false),
            EntrySort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    });
}

/// Search AND tag filter, then a stable sort.
pub fn filter_entries<'a>(entries: &'a [TaggedEntry], query: &EntryQuery) -> Vec<&'a TaggedEntry> {
    let mut out: Vec<&TaggedEntry> = entries
        .iter()
        .filter(|t| entry_matches(&t.entry, &query.search))
        .filter(|t| query.tag.matches(t.tag))
        .collect();
    sort_entries(&mut out, query.sort, |t| &t.entry);
    out
}

/// Gallery view: entries with an image, search applied, then sorted.
pub fn filter_gallery<'a>(
    entries: &'a [DiaryEntry],
    search: &str,
    sort: EntrySort,
) -> Vec<&'a DiaryEntry> {
    let mut out: Vec<&DiaryEntry> = entries
        .iter()
        .filter(|e| e.image_url().is_some())
        .filter(|e| entry_matches(e, search))
        .collect();
    sort_entries(&mut out, sort, |e| *e);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSort {
    #[default]
    Date,
    Author,
    Emotion,
}

impl QuoteSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "author" => Some(Self::Author),
            "emotion" => Some(Self::Emotion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteQuery {
    pub search: String,
    /// `None` or "all" keeps every emotion.
    pub emotion: Option<String>,
    pub sort: QuoteSort,
}

/// Search over quote text and author, case-insensitive emotion equality,
/// then sort by date (newest first), author or emotion.
pub fn filter_quotes<'a>(quotes: &'a [Quote], query: &QuoteQuery) -> Vec<&'a Quote> {
    let term = query.search.trim().to_lowercase();
    let emotion = query
        .emotion
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("all"));

    let mut out: Vec<&Quote> = quotes
        .iter()
        .filter(|q| {
            term.is_empty()
                || q.quote.to_lowercase().contains(&term)
                || q.author.to_lowercase().contains(&term)
        })
        .filter(|q| emotion.map_or(true, |e| q.emotion.eq_ignore_ascii_case(e)))
        .collect();

    match query.sort {
        // RFC 3339 timestamps compare correctly as strings.
        QuoteSort::Date => out.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        QuoteSort::Author => out.sort_by(|a, b| a.author.to_lowercase().cmp(&b.author.to_lowercase())),
        QuoteSort::Emotion => out.sort_by(|a, b| a.emotion.to_lowercase().cmp(&b.emotion.to_lowercase())),
    }
    out
}

/// Distinct emotions in first-seen order, compared case-insensitively.
pub fn unique_emotions(quotes: &[Quote]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for q in quotes {
        if q.emotion.is_empty() {
            continue;
        }
        if !seen.iter().any(|s| s.eq_ignore_ascii_case(&q.emotion)) {
            seen.push(q.emotion.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryAnalysis;
    use crate::tagging::tag_all;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn sample() -> Vec<TaggedEntry> {
        tag_all(vec![
            DiaryEntry::new("1", "Morning run", "Felt energetic")
                .with_mood("excited")
                .with_created_at(at(2)),
            DiaryEntry::new("2", "Rainy day", "Stayed in with tea")
                .with_mood("calm")
                .with_created_at(at(5)),
            DiaryEntry::new("3", "apple picking", "With friends").with_mood("happy"),
            DiaryEntry::new("4", "Exam", "Hard one")
                .with_mood("sad")
                .with_created_at(at(1))
                .with_analysis(EntryAnalysis {
                    summary: Some("Stress about the RUN-up to finals".into()),
                    ..Default::default()
                }),
        ])
    }

    fn ids(v: &[&TaggedEntry]) -> Vec<String> {
        v.iter().map(|t| t.entry.id.clone()).collect()
    }

    #[test]
    fn test_blank_search_keeps_all() {
        let entries = sample();
        let query = EntryQuery {
            search: "   ".into(),
            ..Default::default()
        };
        assert_eq!(filter_entries(&entries, &query).len(), 4);
    }

    #[test]
    fn test_search_title_content_summary() {
        let entries = sample();
        let query = EntryQuery {
            search: " run ".into(),
            ..Default::default()
        };
        // title of 1, summary of 4
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["1", "4"]);

        let query = EntryQuery {
            search: "TEA".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["2"]);
    }

    #[test]
    fn test_search_ignores_location() {
        let entries = tag_all(vec![DiaryEntry::new("1", "t", "c").with_location("Paris")]);
        let query = EntryQuery {
            search: "paris".into(),
            ..Default::default()
        };
        assert!(filter_entries(&entries, &query).is_empty());
    }

    #[test]
    fn test_tag_filter() {
        let entries = sample();
        let query = EntryQuery {
            tag: TagFilter::Only(ColorTag::Peaceful),
            ..Default::default()
        };
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["2"]);

        let query = EntryQuery {
            tag: TagFilter::Only(ColorTag::Creative),
            ..Default::default()
        };
        assert!(filter_entries(&entries, &query).is_empty());
    }

    #[test]
    fn test_search_and_tag_combined() {
        let entries = sample();
        let query = EntryQuery {
            search: "run".into(),
            tag: TagFilter::Only(ColorTag::Challenging),
            ..Default::default()
        };
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["4"]);
    }

    #[test]
    fn test_sort_newest_missing_dates_last() {
        let entries = sample();
        let out = filter_entries(&entries, &EntryQuery::default());
        assert_eq!(ids(&out), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn test_sort_oldest() {
        let entries = sample();
        let query = EntryQuery {
            sort: EntrySort::Oldest,
            ..Default::default()
        };
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["4", "1", "2", "3"]);
    }

    #[test]
    fn test_sort_title_case_insensitive() {
        let entries = sample();
        let query = EntryQuery {
            sort: EntrySort::Title,
            ..Default::default()
        };
        assert_eq!(ids(&filter_entries(&entries, &query)), vec!["3", "4", "1", "2"]);
    }

    #[test]
    fn test_tag_filter_cycle() {
        let mut f = TagFilter::All;
        let mut seen = 0;
        loop {
            f = f.next();
            if f == TagFilter::All {
                break;
            }
            seen += 1;
        }
        assert_eq!(seen, ColorTag::ALL.len());
        assert_eq!(TagFilter::parse("ALL"), Some(TagFilter::All));
        assert_eq!(
            TagFilter::parse("happy"),
            Some(TagFilter::Only(ColorTag::Happy))
        );
    }

    #[test]
    fn test_gallery_only_with_images() {
        let entries = vec![
            DiaryEntry::new("1", "Sunset", "orange").with_image("https://img/1.png"),
            DiaryEntry::new("2", "No pic", "none"),
            DiaryEntry::new("3", "Sunrise", "pink").with_image("https://img/3.png"),
        ];
        let out = filter_gallery(&entries, "sun", EntrySort::Title);
        let got: Vec<&str> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(got, vec!["3", "1"]);
    }

    fn quote(q: &str, author: &str, emotion: &str, ts: Option<&str>) -> Quote {
        Quote {
            quote: q.into(),
            author: author.into(),
            emotion: emotion.into(),
            timestamp: ts.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_quotes() {
        let quotes = vec![
            quote("Stay hungry", "Jobs", "MOTIVATED", Some("2024-01-02T00:00:00Z")),
            quote("Breathe", "Hanh", "calm", Some("2024-01-03T00:00:00Z")),
            quote("Be kind", "Anon", "Calm", None),
        ];

        let all = filter_quotes(&quotes, &QuoteQuery::default());
        let texts: Vec<&str> = all.iter().map(|q| q.quote.as_str()).collect();
        assert_eq!(texts, vec!["Breathe", "Stay hungry", "Be kind"]);

        let calm = filter_quotes(
            &quotes,
            &QuoteQuery {
                emotion: Some("CALM".into()),
                sort: QuoteSort::Author,
                ..Default::default()
            },
        );
        let authors: Vec<&str> = calm.iter().map(|q| q.author.as_str()).collect();
        assert_eq!(authors, vec!["Anon", "Hanh"]);

        let by_author = filter_quotes(
            &quotes,
            &QuoteQuery {
                search: "jobs".into(),
                emotion: Some("all".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_author.len(), 1);
    }

    #[test]
    fn test_unique_emotions() {
        let quotes = vec![
            quote("a", "x", "calm", None),
            quote("b", "y", "CALM", None),
            quote("c", "z", "HAPPY", None),
            quote("d", "z", "", None),
        ];
        assert_eq!(unique_emotions(&quotes), vec!["calm", "HAPPY"]);
    }
}
