use anyhow::Result;
use memorymap_core::model::Profile;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state_line;
use crate::tui::{
    app::{App, PROFILE_FIELDS},
    widgets::help_bar::HelpBar,
};

fn editable_values(p: &Profile) -> [&str; 4] {
    [
        p.full_name.as_deref().unwrap_or(""),
        p.username.as_deref().unwrap_or(""),
        p.bio.as_deref().unwrap_or(""),
        p.location.as_deref().unwrap_or(""),
    ]
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).split(area);
    let page = &app.profile;

    let mut title = String::from(" Profile ");
    if page.saving {
        title = " Profile · saving... ".into();
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if page.is_editing() {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(title);

    let lines = match (state_line(&page.profile, "profile"), page.profile.loaded()) {
        (Some(line), _) => vec![line],
        (None, Some(profile)) => profile_lines(app, profile),
        (None, None) => Vec::new(),
    };
    frame.render_widget(Paragraph::new(lines).block(block), layout[0]);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: page.is_editing(),
        },
        layout[1],
    );
    Ok(())
}

fn profile_lines<'a>(app: &'a App, profile: &'a Profile) -> Vec<Line<'a>> {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", profile.display_name()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let shown = app.profile.draft().unwrap_or(profile);
    let editing = app.profile.is_editing();
    for (i, (name, value)) in PROFILE_FIELDS
        .iter()
        .zip(editable_values(shown))
        .enumerate()
    {
        let focused = editing && i == app.profile_field;
        let value_style = if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
        } else {
            Style::default()
        };
        let value = if value.is_empty() && !focused { "—" } else { value };
        lines.push(Line::from(vec![
            Span::styled(format!(" {name:<10} "), label),
            Span::styled(value.to_string(), value_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!(" {:<10} ", "Email"), label),
        Span::raw(profile.email.as_deref().unwrap_or("—")),
    ]));
    if let Some(since) = &profile.created_at {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<10} ", "Joined"), label),
            Span::raw(since.as_str()),
        ]));
    }
    if let Some(err) = &app.profile.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" ✗ {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}
