use anyhow::Result;
use memorymap_core::model::Advice;
use memorymap_core::view::ViewState;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::state_line;
use crate::tui::{
    app::{App, InputMode},
    widgets::help_bar::HelpBar,
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(area);

    let focused = app.input_mode == InputMode::Question;
    let question = Paragraph::new(app.coach_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }))
            .title(" Ask your coach (press i) "),
    );
    frame.render_widget(question, layout[0]);
    if focused {
        let x = layout[0].x + 1 + app.coach_input.chars().count() as u16;
        frame.set_cursor_position((x.min(layout[0].right().saturating_sub(2)), layout[0].y + 1));
    }

    let lines = match &app.advice {
        None => vec![Line::from(Span::styled(
            " Ask anything about your entries: patterns, moods, what helped.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(state) => advice_lines(state),
    };
    let answer = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Advice "),
    );
    frame.render_widget(answer, layout[1]);

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

fn advice_lines(state: &ViewState<Advice>) -> Vec<Line<'_>> {
    if let Some(line) = state_line(state, "advice") {
        return vec![line];
    }
    let Some(advice) = state.loaded() else {
        return Vec::new();
    };

    let mut lines: Vec<Line> = advice.advice.lines().map(Line::from).collect();
    if !advice.relevant_entries.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" Based on {} of your entries", advice.relevant_entries.len()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(explanation) = &advice.explanation {
        let text = match explanation.as_str() {
            Some(s) => s.to_string(),
            None => explanation.to_string(),
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}
