use anyhow::Result;
use memorymap_core::model::DiaryEntry;
use memorymap_core::tagging::{emotion_color, entry_tag};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{entry_date, state_line};
use crate::tui::{
    app::{App, InputMode},
    widgets::{help_bar::HelpBar, hex_color},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let Some(entry) = app.detail.loaded() else {
        let line = state_line(&app.detail, "entry").unwrap_or_default();
        frame.render_widget(Paragraph::new(line), area);
        return Ok(());
    };

    let layout = Layout::vertical([
        Constraint::Length(2), // title
        Constraint::Length(1), // meta line
        Constraint::Min(5),    // content (scrollable)
        Constraint::Length(1), // help bar
    ])
    .split(area);

    let tag = entry_tag(entry);
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", tag.label()),
            Style::default()
                .fg(hex_color(tag.color()))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(&entry.title, Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let title_widget = Paragraph::new(title).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(title_widget, layout[0]);

    let dim = Style::default().fg(Color::DarkGray);
    let meta = Line::from(vec![
        Span::styled(format!(" {} ", entry_date(entry)), dim),
        Span::styled("│ location: ", dim),
        Span::raw(entry.location.clone().unwrap_or_else(|| "—".into())),
        Span::styled(" │ mood: ", dim),
        Span::styled(
            entry.mood.clone().unwrap_or_else(|| "—".into()),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    frame.render_widget(Paragraph::new(meta), layout[1]);

    render_content(frame, app, entry, layout[2]);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: false,
        },
        layout[3],
    );

    if app.input_mode == InputMode::Confirm {
        super::list::render_confirm(frame, app, area);
    }
    Ok(())
}

fn section(title: String) -> Line<'static> {
    Line::from(Span::styled(
        format!("─── {title} ───"),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_content(frame: &mut Frame, app: &App, entry: &DiaryEntry, area: Rect) {
    let mut lines: Vec<Line> = vec![section("Entry".into()), Line::from("")];
    lines.extend(entry.content.lines().map(|l| Line::from(l.to_string())));

    if let Some(analysis) = &entry.analysis {
        lines.push(Line::from(""));
        lines.push(section("Analysis".into()));
        lines.push(Line::from(""));
        if let Some(summary) = &analysis.summary {
            lines.push(Line::from(format!("  {summary}")));
        }
        if let Some(emotion) = &analysis.emotion {
            lines.push(Line::from(vec![
                Span::styled("  emotion: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    emotion.clone(),
                    Style::default().fg(hex_color(emotion_color(emotion))),
                ),
            ]));
        }
        if !analysis.themes.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  themes: {}", analysis.themes.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if let Some(affect) = &analysis.affect {
            for score in &affect.primary_emotions {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<12}", score.label),
                        Style::default().fg(hex_color(emotion_color(&score.label))),
                    ),
                    Span::styled(
                        format!("{:.0}%", score.score * 100.0),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
    }

    if let Some(url) = entry.image_url() {
        lines.push(Line::from(""));
        lines.push(section("Image".into()));
        lines.push(Line::from(Span::styled(
            format!("  {url}"),
            Style::default().fg(Color::Blue),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Memory (j/k to scroll) "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}
