use memorymap_core::routes::Route;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Header with the numbered navigation entries. `active` indexes
/// `Route::nav()`.
pub struct NavBar {
    pub active: Option<usize>,
}

impl Widget for NavBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            " MemoryMap ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        for (i, route) in Route::nav().iter().enumerate() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{}", i + 1),
                Style::default().fg(Color::Cyan),
            ));
            let style = if self.active == Some(i) {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {}", route.title()), style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
