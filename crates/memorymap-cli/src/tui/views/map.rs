use anyhow::Result;
use memorymap_core::emotion_map::{VIEW_HEIGHT, VIEW_WIDTH};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use super::{clip, entry_date, state_line};
use crate::tui::{
    app::App,
    widgets::{help_bar::HelpBar, hex_color},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).split(area);
    let [chart, side] = Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
        .areas(layout[0]);

    render_chart(frame, app, chart);
    render_related(frame, app, side);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: false,
        },
        layout[1],
    );
    Ok(())
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Emotional Map ");

    if let Some(line) = state_line(&app.map.insights, "emotions") {
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let layout = app.map.layout();
    let selected = app.map.selected().map(|n| n.emotion.as_str());
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, VIEW_WIDTH])
        .y_bounds([0.0, VIEW_HEIGHT])
        .paint(|ctx| {
            for node in &layout.nodes {
                // canvas y grows upwards
                let y = VIEW_HEIGHT - node.y;
                let color = if selected == Some(node.emotion.as_str()) {
                    Color::White
                } else {
                    hex_color(node.color)
                };
                ctx.draw(&Circle {
                    x: node.x,
                    y,
                    radius: node.size / 2.0,
                    color,
                });
                ctx.print(
                    node.x - node.emotion.len() as f64 * 4.0,
                    y,
                    Span::styled(
                        format!("{} {}", node.emotion, node.count),
                        Style::default().fg(hex_color(node.color)),
                    ),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn render_related(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    match app.map.selected() {
        None => lines.push(Line::from(Span::styled(
            " Press j or Tab to pick an emotion.",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(node) => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {}", node.emotion),
                    Style::default()
                        .fg(hex_color(node.color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} of {}", node.count, layout_total(app)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            lines.push(Line::from(""));
            let related = app.map.related();
            if let Some(line) = state_line(&app.map.entries, "entries") {
                lines.push(line);
            } else if related.is_empty() {
                lines.push(Line::from(Span::styled(
                    " No loaded entries carry this emotion.",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for entry in related {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {} ", entry_date(entry)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(clip(&entry.title, 30)),
                ]));
            }
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Related memories "),
    );
    frame.render_widget(widget, area);
}

fn layout_total(app: &App) -> u64 {
    app.map
        .insights
        .loaded()
        .map(|i| i.total_entries)
        .unwrap_or_default()
}
