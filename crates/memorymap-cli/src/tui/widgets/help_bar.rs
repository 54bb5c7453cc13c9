use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::tui::app::{InputMode, Screen};

/// Bottom help bar showing context-sensitive key bindings.
pub struct HelpBar<'a> {
    pub screen: &'a Screen,
    pub input_mode: &'a InputMode,
    /// Profile and compose screens take text input.
    pub editing: bool,
}

fn bindings(screen: &Screen, mode: &InputMode, editing: bool) -> &'static [(&'static str, &'static str)] {
    match (screen, mode) {
        (_, InputMode::Search) => &[("Enter", "search"), ("Esc", "cancel")],
        (_, InputMode::Filter) => &[("←/→", "cycle tag"), ("Enter/Esc", "confirm")],
        (_, InputMode::Confirm) => &[("y", "delete"), ("n/Esc", "keep")],
        (_, InputMode::Prompt) => &[("Enter", "generate"), ("Esc", "done")],
        (_, InputMode::Question) => &[("Enter", "ask"), ("Esc", "cancel")],
        (Screen::Dashboard, _) => &[
            ("1-6", "navigate"),
            ("Enter", "memories"),
            ("n", "new"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        (Screen::Memories, _) => &[
            ("j/k", "navigate"),
            ("Enter", "open"),
            ("/", "search"),
            ("f", "filter"),
            ("s", "sort"),
            ("Space", "select"),
            ("a", "select all"),
            ("d/D", "delete"),
            ("e", "edit"),
            ("n", "new"),
            ("q", "quit"),
        ],
        (Screen::Detail, _) => &[
            ("j/k", "scroll"),
            ("PgUp/PgDn", "page"),
            ("e", "edit"),
            ("d", "delete"),
            ("Esc", "back"),
            ("q", "quit"),
        ],
        (Screen::Compose, _) => &[
            ("Tab", "next field"),
            ("Shift+Tab", "prev field"),
            ("Ctrl+S", "save"),
            ("Esc", "cancel"),
        ],
        (Screen::Quotes, _) => &[
            ("←/→", "emotion"),
            ("Enter", "generate"),
            ("p", "context"),
            ("j/k", "history"),
            ("f", "favorite"),
            ("v", "favorites only"),
            ("e", "filter"),
            ("o", "sort"),
            ("q", "quit"),
        ],
        (Screen::Map, _) => &[("j/Tab", "next emotion"), ("Esc", "clear"), ("r", "refresh"), ("q", "quit")],
        (Screen::Profile, _) if editing => &[
            ("Tab", "next field"),
            ("Ctrl+S", "save"),
            ("Esc", "cancel"),
        ],
        (Screen::Profile, _) => &[("e", "edit"), ("r", "refresh"), ("q", "quit")],
        (Screen::Coach, _) => &[("i", "ask a question"), ("q", "quit")],
    }
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::DarkGray);
        let key_style = Style::default().fg(Color::Cyan);

        let keys = bindings(self.screen, self.input_mode, self.editing);
        let mut spans: Vec<Span> = Vec::with_capacity(keys.len() * 2);
        for (i, (key, what)) in keys.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            let sep = if i + 1 < keys.len() { "  " } else { "" };
            spans.push(Span::styled(format!(" {what}{sep}"), style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
