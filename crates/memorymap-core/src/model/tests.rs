use crate::model::entry::{validate_new_entry, validate_patch, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH};
use crate::model::*;

fn new_entry(title: &str, content: &str) -> NewEntry {
    NewEntry {
        title: title.to_string(),
        content: content.to_string(),
        location: None,
        mood: None,
    }
}

#[test]
fn test_entry_deserialize_minimal() {
    let json = r#"{"id":"e1","title":"Hello","content":"World"}"#;
    let entry: DiaryEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.id, "e1");
    assert!(!entry.deleted);
    assert!(entry.analysis.is_none());
    assert!(entry.created_at.is_none());
}

#[test]
fn test_entry_deserialize_full_backend_shape() {
    let json = r#"{
        "id": "e2",
        "user_id": "u1",
        "title": "Beach day",
        "content": "Sun and sea",
        "location": "Antalya",
        "mood": "happy",
        "created_at": "2024-05-01T10:00:00Z",
        "deleted": true,
        "analysis": {
            "summary": "A sunny day",
            "themes": ["travel"],
            "affect": {"primary_emotions": [{"label": "joy", "score": 0.91}]}
        },
        "media": {"image_url": "https://img.example/1.png"},
        "unknown_field": 42
    }"#;
    let entry: DiaryEntry = serde_json::from_str(json).unwrap();
    assert!(entry.deleted);
    assert_eq!(entry.summary(), Some("A sunny day"));
    assert_eq!(entry.image_url(), Some("https://img.example/1.png"));
    let affect = entry.analysis.as_ref().unwrap().affect.as_ref().unwrap();
    assert_eq!(affect.primary_emotions[0].label, "joy");
}

#[test]
fn test_image_url_empty_is_none() {
    let entry = DiaryEntry::new("e", "t", "c").with_image("");
    assert!(entry.image_url().is_none());
}

#[test]
fn test_excerpt_truncation() {
    let entry = DiaryEntry::new("e", "t", "x".repeat(300));
    let excerpt = entry.excerpt(100);
    assert!(excerpt.ends_with("..."));
    assert_eq!(excerpt.chars().count(), 103);

    let short = DiaryEntry::new("e", "t", "short");
    assert_eq!(short.excerpt(100), "short");
}

#[test]
fn test_validate_new_entry_ok() {
    assert!(validate_new_entry(&new_entry("Title", "Content")).is_ok());
}

#[test]
fn test_validate_new_entry_empty_title() {
    let err = validate_new_entry(&new_entry("   ", "Content")).unwrap_err();
    assert_eq!(err.to_string(), "Invalid input: Title is required");
}

#[test]
fn test_validate_new_entry_empty_content() {
    let err = validate_new_entry(&new_entry("Title", "")).unwrap_err();
    assert!(err.to_string().contains("Content is required"));
}

#[test]
fn test_validate_title_first() {
    let err = validate_new_entry(&new_entry("", "")).unwrap_err();
    assert!(err.to_string().contains("Title is required"));
}

#[test]
fn test_validate_length_limits() {
    let long_title = "t".repeat(MAX_TITLE_LENGTH + 1);
    assert!(validate_new_entry(&new_entry(&long_title, "c")).is_err());

    let ok_title = "t".repeat(MAX_TITLE_LENGTH);
    assert!(validate_new_entry(&new_entry(&ok_title, "c")).is_ok());

    let long_content = "c".repeat(MAX_CONTENT_LENGTH + 1);
    assert!(validate_new_entry(&new_entry("t", &long_content)).is_err());
}

#[test]
fn test_validate_patch() {
    assert!(validate_patch(&EntryPatch::default()).is_err());

    let patch = EntryPatch {
        mood: Some("calm".into()),
        ..Default::default()
    };
    assert!(validate_patch(&patch).is_ok());

    let bad = EntryPatch {
        title: Some("".into()),
        ..Default::default()
    };
    assert!(validate_patch(&bad).is_err());
}

#[test]
fn test_patch_only_sends_set_fields() {
    let patch = EntryPatch {
        title: Some("New".into()),
        ..Default::default()
    };
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json, serde_json::json!({"title": "New"}));
}

#[test]
fn test_new_entry_skips_empty_optionals() {
    let json = serde_json::to_value(new_entry("a", "b")).unwrap();
    assert_eq!(json, serde_json::json!({"title": "a", "content": "b"}));
}

#[test]
fn test_insights_top_emotion() {
    let json = r#"{"total_entries": 6, "emotion_distribution": {"joy": 3, "calm": 3, "sad": 1}}"#;
    let insights: EmotionalInsights = serde_json::from_str(json).unwrap();
    assert_eq!(insights.top_emotion(), Some("calm"));
    assert_eq!(insights.max_count(), 3);

    let ranked = EmotionalInsights {
        most_common_emotions: vec!["joy".into()],
        ..insights
    };
    assert_eq!(ranked.top_emotion(), Some("joy"));
    assert!(EmotionalInsights::default().top_emotion().is_none());
}

#[test]
fn test_quote_emotion_parse() {
    assert_eq!(QuoteEmotion::parse("happy"), Some(QuoteEmotion::Happy));
    assert_eq!(QuoteEmotion::parse(" CALM "), Some(QuoteEmotion::Calm));
    assert_eq!(QuoteEmotion::parse("furious"), None);
    assert_eq!(QuoteEmotion::parse_or_neutral("furious"), QuoteEmotion::Neutral);
    assert!("nope".parse::<QuoteEmotion>().is_err());
}

#[test]
fn test_quote_emotion_wire_format() {
    let json = serde_json::to_string(&QuoteEmotion::Motivated).unwrap();
    assert_eq!(json, "\"MOTIVATED\"");
    assert_eq!(QuoteEmotion::Happy.color(), "#FFD700");
    assert_eq!(QuoteEmotion::default(), QuoteEmotion::Neutral);
}

#[test]
fn test_quote_request_serialization() {
    let req = QuoteRequest::new(QuoteEmotion::Happy, "");
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"emotion": "HAPPY", "diary_content": ""})
    );
}

#[test]
fn test_quote_favorite_key() {
    let with_id = Quote {
        id: Some("q1".into()),
        quote: "Be here".into(),
        ..Default::default()
    };
    assert_eq!(with_id.favorite_key(), "q1");

    let without = Quote {
        quote: "Be here".into(),
        author: "Ram Dass".into(),
        ..Default::default()
    };
    assert_eq!(without.favorite_key(), "Be here | Ram Dass");
}

#[test]
fn test_profile_display_name() {
    let p = Profile {
        username: Some("ayse".into()),
        email: Some("a@b.co".into()),
        ..Default::default()
    };
    assert_eq!(p.display_name(), "ayse");
    assert_eq!(Profile::default().display_name(), "Anonymous");
}

#[test]
fn test_profile_update_diff() {
    let original = Profile {
        full_name: Some("Ayse".into()),
        bio: Some("old".into()),
        ..Default::default()
    };
    let mut draft = original.clone();
    assert!(ProfileUpdate::diff(&original, &draft).is_empty());

    draft.bio = Some("new".into());
    let update = ProfileUpdate::diff(&original, &draft);
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        serde_json::json!({"bio": "new"})
    );
}

#[test]
fn test_validate_credentials() {
    let ok = Credentials {
        email: "me@example.com".into(),
        password: "secret".into(),
    };
    assert!(validate_credentials(&ok).is_ok());

    let bad_email = Credentials {
        email: "nope".into(),
        password: "secret".into(),
    };
    assert!(validate_credentials(&bad_email).is_err());

    let no_password = Credentials {
        email: "me@example.com".into(),
        password: String::new(),
    };
    assert!(validate_credentials(&no_password)
        .unwrap_err()
        .to_string()
        .contains("Password is required"));
}

#[test]
fn test_validate_registration() {
    let reg = Registration {
        email: "me@example.com".into(),
        name: "Me".into(),
        password: "12345".into(),
    };
    assert!(validate_registration(&reg).is_err());

    let reg = Registration {
        password: "123456".into(),
        ..reg
    };
    assert!(validate_registration(&reg).is_ok());
}

#[test]
fn test_token_response_default_type() {
    let token: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
    assert_eq!(token.token_type, "bearer");
}

#[test]
fn test_emotion_analysis_primary() {
    let nested = EmotionAnalysis(serde_json::json!({
        "affect": {"primary_emotions": [{"label": "gratitude", "score": 0.8}]}
    }));
    assert_eq!(nested.primary_emotion(), Some("gratitude"));

    let flat = EmotionAnalysis(serde_json::json!({"emotion": "calm", "summary": "ok"}));
    assert_eq!(flat.primary_emotion(), Some("calm"));
    assert_eq!(flat.summary(), Some("ok"));

    assert!(EmotionAnalysis(serde_json::json!({})).primary_emotion().is_none());
}

#[test]
fn test_validate_feedback() {
    let mut fb = FeedbackSubmission {
        rating: 5,
        category: "ui".into(),
        message: "Lovely".into(),
    };
    assert!(validate_feedback(&fb).is_ok());
    fb.rating = 0;
    assert!(validate_feedback(&fb).is_err());
    fb.rating = 6;
    assert!(validate_feedback(&fb).is_err());
}
