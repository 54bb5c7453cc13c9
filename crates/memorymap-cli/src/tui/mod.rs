pub mod app;
pub mod event;
mod views;
mod widgets;

use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self as ct_event, Event};
use memorymap_core::config::MemoryMapConfig;
use memorymap_core::pages::PageContext;
use memorymap_core::view::supervise;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use self::app::{App, Screen};
use self::event::{AsyncAction, AsyncResult, Dispatch};

/// Entry point for the interactive TUI mode.
pub async fn run_tui(config: &MemoryMapConfig) -> Result<()> {
    let session = crate::open_session(config)?;
    if !session.ctx.api.is_authenticated() {
        bail!("Not authenticated. Run `memorymap login` first.");
    }

    // Channels for async communication
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Dispatch>();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<AsyncResult>();

    // Spawn async worker
    let root = CancellationToken::new();
    tokio::spawn(worker_loop(session.ctx.clone(), action_rx, result_tx));

    let mut app = App::new(session.ctx.clone(), root.clone());

    // Fire initial dashboard load
    if let Some(action) = app.go(Screen::Dashboard) {
        action_tx.send(app.dispatch(action))?;
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, &mut app, &action_tx, &mut result_rx);

    // Restore terminal
    ratatui::restore();

    root.cancel();
    session.analytics.shutdown().await;
    result
}

fn run_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    action_tx: &mpsc::UnboundedSender<Dispatch>,
    result_rx: &mut mpsc::UnboundedReceiver<AsyncResult>,
) -> Result<()> {
    loop {
        // Draw
        terminal.draw(|frame| render(frame, app))?;

        // Poll for async results (non-blocking)
        while let Ok(result) = result_rx.try_recv() {
            app.handle_result(result);
        }

        // A save or delete may have moved us to another screen
        if let Some(action) = app.follow_up.take() {
            let _ = action_tx.send(app.dispatch(action));
        }

        // Poll for keyboard events (50ms timeout for responsive UI)
        if ct_event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = ct_event::read()? {
                if let Some(action) = app.handle_key(key) {
                    let _ = action_tx.send(app.dispatch(action));
                }
                if let Some(action) = app.follow_up.take() {
                    let _ = action_tx.send(app.dispatch(action));
                }
            }
        }

        // Tick error timer
        app.tick_error();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if app.showing_splash() {
        views::splash::render(frame, area, &app.base_url, app.first_load_done);
        return;
    }

    if let Some(failure) = &app.failure {
        views::failure::render(frame, area, failure);
        return;
    }

    let [header, body] = ratatui::layout::Layout::vertical([
        ratatui::layout::Constraint::Length(1),
        ratatui::layout::Constraint::Min(3),
    ])
    .areas(area);
    views::render_header(frame, app, header);

    let view: &App = app;
    let outcome = supervise(|| {
        let app = view;
        match app.screen {
            Screen::Dashboard => views::dashboard::render(frame, app, body),
            Screen::Memories => views::list::render(frame, app, body),
            Screen::Detail => views::detail::render(frame, app, body),
            Screen::Compose => views::compose::render(frame, app, body),
            Screen::Quotes => views::quotes::render(frame, app, body),
            Screen::Map => views::map::render(frame, app, body),
            Screen::Profile => views::profile::render(frame, app, body),
            Screen::Coach => views::coach::render(frame, app, body),
        }
    });
    if let Some(failure) = outcome.failure() {
        app.failure = Some(failure.clone());
        return;
    }

    // Render error toast overlay if present
    if let Some(ref msg) = app.error_message {
        render_error_toast(frame, msg);
    }
}

fn render_error_toast(frame: &mut Frame, msg: &str) {
    use ratatui::{
        layout::{Constraint, Flex, Layout},
        style::{Color, Style},
        widgets::{Block, Borders, Clear, Paragraph},
    };

    let area = frame.area();
    let [toast_area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);
    let [toast_area] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::End)
        .areas(toast_area);

    frame.render_widget(Clear, toast_area);
    let toast = Paragraph::new(format!(" ✗ {msg}"))
        .style(Style::default().fg(Color::White).bg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
    frame.render_widget(toast, toast_area);
}

/// Async worker loop: each dispatch runs on its own task against a client
/// bound to the dispatch's cancellation token.
async fn worker_loop(
    ctx: PageContext,
    mut action_rx: mpsc::UnboundedReceiver<Dispatch>,
    result_tx: mpsc::UnboundedSender<AsyncResult>,
) {
    while let Some(Dispatch { action, token }) = action_rx.recv().await {
        let ctx = ctx.with_cancellation(token);
        let result_tx = result_tx.clone();
        tokio::spawn(async move {
            run_action(&ctx, action, &result_tx).await;
        });
    }
}

async fn run_action(
    ctx: &PageContext,
    action: AsyncAction,
    result_tx: &mpsc::UnboundedSender<AsyncResult>,
) {
    let api = &ctx.api;
    let result = match action {
        AsyncAction::LoadDashboard => {
            let (entries, insights) = tokio::join!(
                api.list_entries(memorymap_core::pages::dashboard::RECENT_ENTRIES),
                api.insights()
            );
            AsyncResult::Dashboard { entries, insights }
        }
        AsyncAction::LoadEntries { limit } => AsyncResult::Entries(api.list_entries(limit).await),
        AsyncAction::LoadEntry { id } => AsyncResult::Entry(api.get_entry(&id).await),
        AsyncAction::DeleteEntries { ids } => {
            for id in ids {
                let outcome = api.delete_entry(&id).await;
                if result_tx.send(AsyncResult::Deleted { id, outcome }).is_err() {
                    return; // UI closed
                }
            }
            return;
        }
        AsyncAction::SaveEntry { request } => AsyncResult::Saved(request.send(api).await),
        AsyncAction::AnalyzeDraft { text } => {
            let outcome = api.analyze_emotion(&text).await;
            AsyncResult::Analysis {
                text_length: text.chars().count(),
                outcome,
            }
        }
        AsyncAction::GenerateQuote { request } => {
            AsyncResult::Quote(api.generate_quote(&request).await)
        }
        AsyncAction::LoadQuoteHistory { limit } => {
            AsyncResult::QuoteHistory(api.quote_history(limit).await)
        }
        AsyncAction::LoadMap { limit } => {
            let (insights, entries) = tokio::join!(api.insights(), api.list_entries(limit));
            AsyncResult::Map { insights, entries }
        }
        AsyncAction::LoadProfile => AsyncResult::Profile(api.get_profile().await),
        AsyncAction::SaveProfile { update } => {
            AsyncResult::ProfileSaved(api.update_profile(&update).await)
        }
        AsyncAction::AskCoach { question } => {
            AsyncResult::Advice(api.coaching_advice(&question).await)
        }
    };
    let _ = result_tx.send(result);
}
