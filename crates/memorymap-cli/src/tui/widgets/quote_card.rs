use memorymap_core::model::{Quote, QuoteEmotion};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::hex_color;

/// One quote framed in its palette. The backend colors win; the emotion's
/// own color fills in when they are missing.
pub struct QuoteCard<'a> {
    pub quote: &'a Quote,
    pub favorite: bool,
}

impl Widget for QuoteCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let emotion = QuoteEmotion::parse_or_neutral(&self.quote.emotion);
        let colors = &self.quote.colors;
        let accent = hex_color(
            colors
                .accent
                .as_deref()
                .or(colors.primary.as_deref())
                .unwrap_or(emotion.color()),
        );
        let text = colors.text.as_deref().map(hex_color).unwrap_or(Color::White);

        let title = if self.favorite {
            format!(" ★ {} ", emotion.label())
        } else {
            format!(" {} ", emotion.label())
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("“{}”", self.quote.quote),
                Style::default().fg(text).add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("— {}", self.quote.author),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent))
                    .title(title),
            )
            .render(area, buf);
    }
}
