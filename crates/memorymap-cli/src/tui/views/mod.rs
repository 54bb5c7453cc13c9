pub mod coach;
pub mod compose;
pub mod dashboard;
pub mod detail;
pub mod failure;
pub mod list;
pub mod map;
pub mod profile;
pub mod quotes;
pub mod splash;

use memorymap_core::model::DiaryEntry;
use memorymap_core::view::ViewState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};

use crate::tui::{
    app::{App, Screen},
    widgets::nav_bar::NavBar,
};

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let current = match app.screen {
        Screen::Detail | Screen::Compose => app.previous,
        other => other,
    };
    let active = Screen::nav().iter().position(|s| *s == current);
    frame.render_widget(NavBar { active }, area);
}

/// Placeholder line for a state that has nothing to show yet. `None` once
/// the state is loaded.
pub fn state_line<T>(state: &ViewState<T>, what: &str) -> Option<Line<'static>> {
    match state {
        ViewState::Loading => Some(Line::from(Span::styled(
            "  Loading...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))),
        ViewState::Empty => Some(Line::from(Span::styled(
            format!("  No {what} yet."),
            Style::default().fg(Color::DarkGray),
        ))),
        ViewState::Failed(err) => Some(Line::from(Span::styled(
            format!("  ✗ {err}"),
            Style::default().fg(Color::Red),
        ))),
        ViewState::Loaded(_) => None,
    }
}

pub fn entry_date(entry: &DiaryEntry) -> String {
    entry
        .created_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Cut `text` to `max` characters, marking the cut with an ellipsis.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
