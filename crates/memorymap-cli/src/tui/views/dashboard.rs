use anyhow::Result;
use memorymap_core::tagging::{emotion_color, entry_tag};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{clip, entry_date, state_line};
use crate::tui::{
    app::App,
    widgets::{help_bar::HelpBar, hex_color},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([
        Constraint::Length(3), // stats
        Constraint::Min(5),    // recent + emotions
        Constraint::Length(1), // help bar
    ])
    .split(area);

    render_stats(frame, app, layout[0]);

    let [recent, emotions] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
            .areas(layout[1]);
    render_recent(frame, app, recent);
    render_emotions(frame, app, emotions);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: false,
        },
        layout[2],
    );
    Ok(())
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.dashboard.stats();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);

    let top = stats.top_emotion.as_deref().unwrap_or("—");
    let line = Line::from(vec![
        Span::styled(" entries ", label),
        Span::styled(stats.entry_count.to_string(), value),
        Span::styled("  │  places ", label),
        Span::styled(stats.distinct_locations.to_string(), value),
        Span::styled("  │  feeling most ", label),
        Span::styled(
            top.to_string(),
            Style::default()
                .fg(hex_color(emotion_color(top)))
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Dashboard "),
    );
    frame.render_widget(widget, area);
}

fn render_recent(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match state_line(&app.dashboard.entries, "entries") {
        Some(line) => vec![line],
        None => app
            .dashboard
            .entries
            .loaded()
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|entry| {
                let tag = entry_tag(entry);
                Line::from(vec![
                    Span::styled(" ● ", Style::default().fg(hex_color(tag.color()))),
                    Span::styled(entry_date(entry), Style::default().fg(Color::DarkGray)),
                    Span::raw("  "),
                    Span::raw(clip(&entry.title, 48)),
                ])
            })
            .collect(),
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Recent entries "),
    );
    frame.render_widget(widget, area);
}

fn render_emotions(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(20).max(4) as u64;
    let lines: Vec<Line> = match state_line(&app.dashboard.insights, "insights") {
        Some(line) => vec![line],
        None => {
            let Some(insights) = app.dashboard.insights.loaded() else {
                return;
            };
            let max = insights.max_count().max(1);
            insights
                .emotion_distribution
                .iter()
                .map(|(emotion, &count)| {
                    let filled = (count * width / max).max(1) as usize;
                    Line::from(vec![
                        Span::raw(format!(" {:<10} ", clip(emotion, 10))),
                        Span::styled(
                            "█".repeat(filled),
                            Style::default().fg(hex_color(emotion_color(emotion))),
                        ),
                        Span::styled(format!(" {count}"), Style::default().fg(Color::DarkGray)),
                    ])
                })
                .collect()
        }
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Emotions "),
    );
    frame.render_widget(widget, area);
}
