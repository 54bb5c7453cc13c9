use anyhow::Result;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use super::{clip, entry_date, state_line};
use crate::tui::{
    app::{App, InputMode},
    widgets::{filter_bar::FilterBar, help_bar::HelpBar, hex_color, search_input::SearchInput},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Result<()> {
    let layout = Layout::vertical([
        Constraint::Length(3), // search bar
        Constraint::Length(1), // filter bar
        Constraint::Min(5),    // table
        Constraint::Length(1), // help bar
    ])
    .split(area);

    frame.render_widget(
        SearchInput {
            text: &app.search_input,
            cursor: app.search_cursor,
            focused: app.input_mode == InputMode::Search,
        },
        layout[0],
    );

    let sort = app.sort_label();
    frame.render_widget(
        FilterBar {
            tag: app.memories.query.tag,
            sort: &sort,
            selected: app.memories.selected.len(),
            active: app.input_mode == InputMode::Filter,
        },
        layout[1],
    );

    render_table(frame, app, layout[2]);

    frame.render_widget(
        HelpBar {
            screen: &app.screen,
            input_mode: &app.input_mode,
            editing: false,
        },
        layout[3],
    );

    if app.input_mode == InputMode::Confirm {
        render_confirm(frame, app, area);
    }
    Ok(())
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(line) = state_line(&app.memories.state, "memories") {
        frame.render_widget(line, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Tag"),
        Cell::from("Title"),
        Cell::from("Date"),
        Cell::from("Location"),
        Cell::from("Mood"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let visible = app.visible_entries();
    let rows: Vec<Row> = if visible.is_empty() {
        vec![Row::new(vec![Cell::from(Span::styled(
            "  No memories match. Press Esc to clear the search or f to change the tag.",
            Style::default().fg(Color::DarkGray),
        ))])]
    } else {
        visible
            .iter()
            .map(|tagged| {
                let entry = &tagged.entry;
                let mark = if app.memories.selected.contains(&entry.id) {
                    "●"
                } else {
                    " "
                };
                Row::new(vec![
                    Cell::from(Span::styled(mark, Style::default().fg(Color::Yellow))),
                    Cell::from(Span::styled(
                        tagged.tag.label(),
                        Style::default().fg(hex_color(tagged.tag.color())),
                    )),
                    Cell::from(clip(&entry.title, 60)),
                    Cell::from(Span::styled(
                        entry_date(entry),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Cell::from(clip(entry.location.as_deref().unwrap_or(""), 20)),
                    Cell::from(Span::styled(
                        entry.mood.clone().unwrap_or_default(),
                        Style::default().fg(Color::Magenta),
                    )),
                ])
            })
            .collect()
    };

    let widths = [
        Constraint::Length(1),
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(12),
    ];

    let title = if app.memories.query.search.is_empty() {
        format!(" Memories ({}) ", visible.len())
    } else {
        format!(
            " Results for \"{}\" ({}) ",
            app.memories.query.search,
            visible.len()
        )
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let [dialog] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(area);
    let [dialog] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Center)
        .areas(dialog);

    let n = app.confirm_delete.len();
    let what = if n == 1 {
        "this memory".to_string()
    } else {
        format!("{n} memories")
    };
    frame.render_widget(Clear, dialog);
    let widget = Paragraph::new(Line::from(vec![
        Span::raw(format!(" Delete {what}? ")),
        Span::styled("y", Style::default().fg(Color::Cyan)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Confirm "),
    );
    frame.render_widget(widget, dialog);
}
