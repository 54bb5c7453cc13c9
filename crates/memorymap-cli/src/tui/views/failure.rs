use memorymap_core::view::{RecoveryAction, RenderFailure};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Fallback shown when a view fails to render.
pub fn render(frame: &mut Frame, area: Rect, failure: &RenderFailure) {
    let [center_y] = Layout::vertical([Constraint::Length(9)])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(center_y);

    let key_style = Style::default().fg(Color::Cyan);
    let style = Style::default().fg(Color::DarkGray);
    let mut actions = Vec::new();
    for action in failure.actions() {
        let (key, label) = match action {
            RecoveryAction::Retry => ("r", " try again  "),
            RecoveryAction::Reload => ("R", " reload  "),
        };
        actions.push(Span::styled(key, key_style));
        actions.push(Span::styled(label, style));
    }
    actions.push(Span::styled("q", key_style));
    actions.push(Span::styled(" quit", style));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            failure.message.clone(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(actions),
    ];

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(Span::styled(
                format!(" {} ", failure.title()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(widget, center);
}
