use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const LOGO: &[&str] = &[
    r" __  __                                 __  __             ",
    r"|  \/  | ___ _ __ ___   ___  _ __ _   _|  \/  | __ _ _ __  ",
    r"| |\/| |/ _ \ '_ ` _ \ / _ \| '__| | | | |\/| |/ _` | '_ \ ",
    r"| |  | |  __/ | | | | | (_) | |  | |_| | |  | | (_| | |_) |",
    r"|_|  |_|\___|_| |_| |_|\___/|_|   \__, |_|  |_|\__,_| .__/ ",
    r"                                  |___/             |_|    ",
];

pub fn render(frame: &mut Frame, area: Rect, base_url: &str, loaded: bool) {
    let block_height = LOGO.len() as u16 + 6;
    let block_width = 62;

    let [center_y] = Layout::vertical([Constraint::Length(block_height)])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Length(block_width)])
        .flex(Flex::Center)
        .areas(center_y);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|row| {
            Line::from(Span::styled(
                *row,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "            Your diary, mapped by how it felt",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("            backend ", Style::default().fg(Color::DarkGray)),
        Span::styled(base_url, Style::default().fg(Color::Magenta)),
    ]));
    lines.push(Line::from(""));

    let status = if loaded {
        Span::styled("                    Ready", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            "              Loading your memories...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };
    lines.push(Line::from(status));

    frame.render_widget(Paragraph::new(lines), center);
}
