use anyhow::Result;
use memorymap_core::model::QuoteEmotion;
use memorymap_core::pages::quotes::MAX_PROMPT_CHARS;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{clip, state_line};
use crate::tui::{
    app::{App, InputMode},
    widgets::{help_bar::HelpBar, hex_color, quote_card::QuoteCard},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([
        Constraint::Length(1), // emotion picker
        Constraint::Length(3), // context prompt
        Constraint::Length(8), // current quote
        Constraint::Min(4),    // history
        Constraint::Length(1), // help bar
    ])
    .split(area);

    render_picker(frame, app, layout[0]);
    render_prompt(frame, app, layout[1]);
    render_current(frame, app, layout[2]);
    render_history(frame, app, layout[3]);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: false,
        },
        layout[4],
    );
    Ok(())
}

fn render_picker(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" Feeling: ", Style::default().fg(Color::DarkGray))];
    for emotion in QuoteEmotion::ALL {
        let color = hex_color(emotion.color());
        let style = if emotion == app.quotes.emotion {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::styled(format!(" {} ", emotion.label()), style));
    }
    frame.render_widget(Line::from(spans), area);
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.input_mode == InputMode::Prompt;
    let len = app.quotes.prompt_len();
    let counter_style = if len > MAX_PROMPT_CHARS {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Context (press p) ")
        .title_bottom(
            Line::from(Span::styled(format!(" {len}/{MAX_PROMPT_CHARS} "), counter_style))
                .right_aligned(),
        );
    let text = if app.quotes.prompt.is_empty() && !focused {
        Span::styled(
            "optional: what is on your mind?",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.quotes.prompt.as_str())
    };
    frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
}

fn render_current(frame: &mut Frame, app: &App, area: Rect) {
    let quotes = &app.quotes;
    if quotes.generating {
        let line = Line::from(Span::styled(
            "  Finding words for you...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    } else if let Some(err) = &quotes.error {
        let line = Line::from(Span::styled(format!("  ✗ {err}"), Style::default().fg(Color::Red)));
        frame.render_widget(line, area);
    } else if let Some(quote) = &quotes.current {
        frame.render_widget(
            QuoteCard {
                quote,
                favorite: quotes.is_favorite(quote),
            },
            area,
        );
    } else {
        let line = Line::from(Span::styled(
            "  Pick a feeling and press Enter.",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(line, area);
    }
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.quote_view;
    let mut title = String::from(" History");
    if view.favorites_only {
        title.push_str(" · favorites");
    }
    if let Some(emotion) = &view.query.emotion {
        title.push_str(&format!(" · {emotion}"));
    }
    title.push_str(&format!(" · by {:?} ", view.query.sort).to_lowercase());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    if let Some(line) = state_line(&app.quotes.history, "quotes") {
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let width = area.width.saturating_sub(30) as usize;
    let items: Vec<ListItem> = app
        .visible_quotes()
        .into_iter()
        .map(|quote| {
            let emotion = QuoteEmotion::parse_or_neutral(&quote.emotion);
            let star = if app.quotes.is_favorite(quote) { "★" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{star} "), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{:<9}", emotion.label()),
                    Style::default().fg(hex_color(emotion.color())),
                ),
                Span::raw(clip(&quote.quote, width.max(10))),
                Span::styled(
                    format!("  {}", quote.author),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    let mut state = ListState::default();
    state.select(Some(app.quote_selected));
    frame.render_stateful_widget(list, area, &mut state);
}
