use anyhow::Result;
use memorymap_core::tagging::emotion_color;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::{
    app::{App, COMPOSE_FIELDS},
    widgets::{help_bar::HelpBar, hex_color},
};

fn field_block(app: &App, index: usize) -> Block<'static> {
    let border = if app.compose_field == index {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", COMPOSE_FIELDS[index]))
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([
        Constraint::Length(3), // title
        Constraint::Min(5),    // content + analysis
        Constraint::Length(3), // location / mood
        Constraint::Length(1), // help bar
    ])
    .split(area);
    let [content_area, analysis_area] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
            .areas(layout[1]);
    let [location_area, mood_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(layout[2]);

    let draft = &app.form.draft;
    let heading = if app.form.editing().is_some() {
        " Edit entry "
    } else {
        " New entry "
    };

    frame.render_widget(
        Paragraph::new(draft.title.as_str()).block(field_block(app, 0).title_top(
            Line::from(Span::styled(heading, Style::default().fg(Color::Cyan))).right_aligned(),
        )),
        layout[0],
    );
    frame.render_widget(
        Paragraph::new(draft.content.as_str())
            .block(field_block(app, 1).title_bottom(format!(" {} words ", draft.word_count())))
            .wrap(Wrap { trim: false }),
        content_area,
    );
    frame.render_widget(
        Paragraph::new(draft.location.as_str()).block(field_block(app, 2)),
        location_area,
    );
    frame.render_widget(
        Paragraph::new(draft.mood.as_str()).block(field_block(app, 3)),
        mood_area,
    );

    render_analysis(frame, app, analysis_area);
    place_cursor(frame, app, [layout[0], content_area, location_area, mood_area]);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: true,
        },
        layout[3],
    );
    Ok(())
}

fn render_analysis(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let mut lines: Vec<Line> = Vec::new();

    if form.submitting {
        lines.push(Line::from(Span::styled(
            " Saving...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    } else if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" ✗ {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    if form.analyzing {
        lines.push(Line::from(Span::styled(
            " Analyzing...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(err) = &form.analysis_error {
        lines.push(Line::from(Span::styled(
            format!(" ✗ {err}"),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(analysis) = &form.analysis {
        if let Some(emotion) = analysis.primary_emotion() {
            lines.push(Line::from(vec![
                Span::styled(" feeling ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    emotion.to_string(),
                    Style::default()
                        .fg(hex_color(emotion_color(emotion)))
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
        if let Some(summary) = analysis.summary() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(" {summary}")));
        }
    } else {
        lines.push(Line::from(Span::styled(
            " Leave the content field to analyze it.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Emotion "),
    );
    frame.render_widget(widget, area);
}

fn place_cursor(frame: &mut Frame, app: &App, areas: [Rect; 4]) {
    let draft = &app.form.draft;
    let text = match app.compose_field {
        0 => &draft.title,
        1 => &draft.content,
        2 => &draft.location,
        _ => &draft.mood,
    };
    let area = areas[app.compose_field.min(3)];
    let inner_width = area.width.saturating_sub(2) as usize;
    if inner_width == 0 || area.height < 3 {
        return;
    }

    // Approximate position for wrapped text (last line)
    let last_line = text.split('\n').next_back().unwrap_or("");
    let line_count = text.split('\n').count().max(1);
    let cursor_x = area.x + 1 + (last_line.chars().count() % inner_width) as u16;
    let cursor_y = area.y + 1 + (line_count as u16).saturating_sub(1);
    frame.set_cursor_position((
        cursor_x.min(area.right() - 2),
        cursor_y.min(area.bottom() - 2),
    ));
}
