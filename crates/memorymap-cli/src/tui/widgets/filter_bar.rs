use memorymap_core::filter::TagFilter;
use memorymap_core::tagging::ColorTag;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::hex_color;

/// Tag filter chips plus the active sort order.
pub struct FilterBar<'a> {
    pub tag: TagFilter,
    pub sort: &'a str,
    pub selected: usize,
    pub active: bool,
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans: Vec<Span> = Vec::new();
        let prefix = if self.active { "Filter: " } else { "Tag: " };
        spans.push(Span::styled(prefix, Style::default().fg(Color::DarkGray)));

        let chips = std::iter::once(TagFilter::All).chain(ColorTag::ALL.into_iter().map(TagFilter::Only));
        for (i, chip) in chips.enumerate() {
            let (label, color) = match chip {
                TagFilter::All => ("All", Color::Cyan),
                TagFilter::Only(tag) => (tag.label(), hex_color(tag.color())),
            };

            let style = if chip == self.tag {
                if self.active {
                    Style::default()
                        .fg(Color::Black)
                        .bg(color)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                }
            } else {
                Style::default().fg(Color::DarkGray)
            };

            if i > 0 {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(format!(" {label} "), style));
        }

        spans.push(Span::styled("   sort: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(self.sort, Style::default().fg(Color::Magenta)));
        if self.selected > 0 {
            spans.push(Span::styled(
                format!("   {} selected", self.selected),
                Style::default().fg(Color::Yellow),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
