mod tui;

use std::io::{BufRead, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memorymap_core::analytics::Analytics;
use memorymap_core::api::ApiOutcome;
use memorymap_core::config::MemoryMapConfig;
use memorymap_core::filter::{EntrySort, QuoteQuery, QuoteSort, TagFilter};
use memorymap_core::model::*;
use memorymap_core::pages::{
    AuthFlow, DashboardPage, DiaryForm, EmotionalMapPage, GalleryPage, MemoriesPage, PageContext,
    ProfilePage, QuoteHistoryView, QuotesPage, SubmitOutcome,
};
use memorymap_core::routes::Route;
use memorymap_core::store::{FileStore, SharedStore};
use memorymap_core::tagging::{emotion_color, hex_rgb, ColorTag};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "memorymap",
    about = "MemoryMap: a diary that maps how you feel",
    version
)]
enum Cli {
    /// Sign in and remember the access token
    Login {
        #[arg(long)]
        email: String,
        /// Password (read from MEMORYMAP_PASSWORD or stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Check that the backend answers
    Ping {
        #[arg(long)]
        json: bool,
    },
    /// Write a new diary entry
    New {
        #[arg(short, long)]
        title: String,
        /// Entry text (read from stdin when omitted)
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        mood: Option<String>,
        /// Run emotion analysis on the text before saving
        #[arg(long)]
        analyze: bool,
    },
    /// List memories
    List {
        /// Search in title, content and summary
        #[arg(short, long)]
        search: Option<String>,
        /// Color tag (happy, peaceful, excited, reflective, grateful, creative, challenging)
        #[arg(short, long)]
        tag: Option<String>,
        /// Sort order (newest, oldest, title)
        #[arg(long)]
        sort: Option<String>,
        /// Maximum number of entries to fetch
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show one entry in full
    Get {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing entry
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        mood: Option<String>,
    },
    /// Delete entries
    Delete {
        /// One or more entry IDs
        ids: Vec<String>,
        /// Required when deleting more than one entry
        #[arg(long)]
        confirm: bool,
    },
    /// Analyze the emotion of a piece of text
    Analyze {
        /// Text to analyze (read from stdin when omitted)
        text: Option<String>,
        /// Also extract place names
        #[arg(long)]
        locations: bool,
        #[arg(long)]
        json: bool,
    },
    /// Generate, browse and favorite quotes
    Quote {
        #[command(subcommand)]
        action: QuoteCmd,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCmd,
    },
    /// Emotional insights across all entries
    Insights {
        #[arg(long)]
        json: bool,
    },
    /// Emotional map of your entries
    Map {
        /// Write the map as SVG to this file
        #[arg(long)]
        svg: Option<String>,
        /// Select an emotion and list related entries
        #[arg(short, long)]
        emotion: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Entries that have a generated image
    Gallery {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Generate an image from a text prompt
    Image {
        prompt: String,
        /// Art style hint, e.g. watercolor
        #[arg(short, long)]
        style: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Ask the AI coach a question about your diary
    Coach {
        question: String,
        #[arg(long)]
        json: bool,
    },
    /// Send feedback about the app
    Feedback {
        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "general")]
        category: String,
        message: String,
    },
    /// List application routes, or resolve a path to its page
    Routes {
        #[arg(long)]
        resolve: Option<String>,
    },
    /// Interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum QuoteCmd {
    /// Generate a quote for an emotion
    Generate {
        /// happy, peaceful, motivated, grateful, reflective, hopeful, calm, neutral
        #[arg(short, long)]
        emotion: Option<String>,
        /// Optional context from your diary
        #[arg(short, long)]
        prompt: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Previously generated quotes
    History {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        emotion: Option<String>,
        /// Sort order (date, author, emotion)
        #[arg(long)]
        sort: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        json: bool,
    },
    /// Toggle a quote as favorite (by quote ID or text)
    Favorite { key: String },
    /// List favorite quotes
    Favorites {
        #[arg(long)]
        json: bool,
    },
    /// Show the backend's color palette for an emotion
    Colors {
        emotion: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCmd {
    Show {
        #[arg(long)]
        json: bool,
    },
    Edit {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        picture: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli, Cli::Tui));

    let config = MemoryMapConfig::load(Some(&std::env::current_dir()?)).unwrap_or_else(|e| {
        tracing::warn!("falling back to default config: {e}");
        MemoryMapConfig::default_config()
    });

    let result = run(cli, &config).await;
    if let Err(ref err) = result {
        eprintln!("{}", format_api_error(err, &config));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(tui: bool) {
    let default = if tui { "memorymap=warn" } else { "memorymap=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Per-invocation wiring: local store, analytics and the page context.
struct Session {
    ctx: PageContext,
    analytics: Arc<Analytics>,
}

fn open_session(config: &MemoryMapConfig) -> Result<Session> {
    let path = config
        .store_path()
        .context("failed to resolve local store path")?;
    let store: SharedStore = Arc::new(FileStore::new(path));
    let analytics = Analytics::init(&config.analytics).context("failed to start analytics")?;
    let ctx = PageContext::new(config, store, analytics.clone())
        .context("failed to create API client")?;
    Ok(Session { ctx, analytics })
}

async fn run(cli: Cli, config: &MemoryMapConfig) -> Result<()> {
    if let Cli::Routes { resolve } = &cli {
        return cmd_routes(resolve.as_deref());
    }
    if matches!(cli, Cli::Tui) {
        return tui::run_tui(config).await;
    }

    let session = open_session(config)?;
    let ctx = session.ctx.clone();
    let result = match cli {
        Cli::Login { email, password } => cmd_login(&ctx, email, password).await,
        Cli::Register {
            email,
            name,
            password,
        } => cmd_register(&ctx, email, name, password).await,
        Cli::Logout => cmd_logout(&ctx),
        Cli::Ping { json } => cmd_ping(&ctx, json).await,
        Cli::New {
            title,
            content,
            location,
            mood,
            analyze,
        } => {
            let content = match content {
                Some(c) => c,
                None => read_stdin()?,
            };
            let draft = DraftArgs {
                title: Some(title),
                content: Some(content),
                location,
                mood,
            };
            cmd_new(&ctx, draft, analyze).await
        }
        Cli::List {
            search,
            tag,
            sort,
            limit,
            json,
        } => cmd_list(&ctx, search, tag, sort, limit, json).await,
        Cli::Get { id, json } => cmd_get(&ctx, &id, json).await,
        Cli::Edit {
            id,
            title,
            content,
            location,
            mood,
        } => {
            let draft = DraftArgs {
                title,
                content,
                location,
                mood,
            };
            cmd_edit(&ctx, &id, draft).await
        }
        Cli::Delete { ids, confirm } => cmd_delete(&ctx, &ids, confirm).await,
        Cli::Analyze {
            text,
            locations,
            json,
        } => {
            let text = match text {
                Some(t) => t,
                None => read_stdin()?,
            };
            cmd_analyze(&ctx, &text, locations, json).await
        }
        Cli::Quote { action } => match action {
            QuoteCmd::Generate {
                emotion,
                prompt,
                json,
            } => cmd_quote_generate(&ctx, emotion, prompt, json).await,
            QuoteCmd::History {
                search,
                emotion,
                sort,
                favorites,
                json,
            } => cmd_quote_history(&ctx, search, emotion, sort, favorites, json).await,
            QuoteCmd::Favorite { key } => cmd_quote_favorite(&ctx, &key).await,
            QuoteCmd::Favorites { json } => cmd_quote_favorites(&ctx, json).await,
            QuoteCmd::Colors { emotion, json } => cmd_quote_colors(&ctx, &emotion, json).await,
        },
        Cli::Profile { action } => match action {
            ProfileCmd::Show { json } => cmd_profile_show(&ctx, json).await,
            ProfileCmd::Edit {
                full_name,
                username,
                email,
                bio,
                location,
                picture,
            } => {
                let changes = ProfileUpdate {
                    full_name,
                    username,
                    email,
                    bio,
                    location,
                    profile_picture_url: picture,
                };
                cmd_profile_edit(&ctx, changes).await
            }
        },
        Cli::Insights { json } => cmd_insights(&ctx, json).await,
        Cli::Map { svg, emotion, json } => cmd_map(&ctx, svg, emotion, json).await,
        Cli::Gallery { search, sort, json } => cmd_gallery(&ctx, search, sort, json).await,
        Cli::Image {
            prompt,
            style,
            json,
        } => cmd_image(&ctx, prompt, style, json).await,
        Cli::Coach { question, json } => cmd_coach(&ctx, &question, json).await,
        Cli::Feedback {
            rating,
            category,
            message,
        } => cmd_feedback(&ctx, rating, category, message).await,
        Cli::Routes { .. } | Cli::Tui => Ok(()),
    };

    session.analytics.shutdown().await;
    result
}

/// Turn a failed outcome into an error carrying the backend's message.
fn require<T>(outcome: ApiOutcome<T>, what: &str) -> Result<T> {
    outcome
        .into_result()
        .map_err(|e| anyhow::anyhow!("{what}: {e}"))
}

/// Format transport errors with a hint about the configured backend.
fn format_api_error(err: &anyhow::Error, config: &MemoryMapConfig) -> String {
    let msg = format!("{:#}", err);
    let is_connection = msg.contains("connection refused")
        || msg.contains("Connection refused")
        || msg.contains("error sending request")
        || msg.contains("timed out")
        || msg.contains("dns error");
    let is_auth = msg.contains("Not authenticated")
        || msg.contains("Could not validate credentials")
        || msg.contains("401");
    if is_connection {
        format!(
            "{}\n\n  Cannot reach the MemoryMap API at {}.\n  Check {} in your config or set {}.\n",
            "Error: backend unavailable".red(),
            config.api.base_url,
            "[api] base_url".cyan(),
            "MEMORYMAP__API__BASE_URL".cyan()
        )
    } else if is_auth {
        format!(
            "{} {}\n\n  Sign in first: {}\n",
            "Error:".red(),
            msg,
            "memorymap login --email you@example.com".cyan()
        )
    } else {
        format!("{} {}", "Error:".red(), msg)
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    if let Ok(p) = std::env::var("MEMORYMAP_PASSWORD") {
        return Ok(p);
    }
    eprint!("Password: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn paint(text: &str, hex: &str) -> String {
    match hex_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

fn entry_date(entry: &DiaryEntry) -> String {
    entry
        .created_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn parse_tag(tag: Option<&str>) -> Result<TagFilter> {
    match tag {
        None => Ok(TagFilter::All),
        Some(t) => TagFilter::parse(t).ok_or_else(|| {
            let valid: Vec<&str> = ColorTag::ALL.iter().map(|t| t.as_str()).collect();
            anyhow::anyhow!("unknown tag: {t} (expected all, {})", valid.join(", "))
        }),
    }
}

fn parse_sort(sort: Option<&str>) -> Result<Option<EntrySort>> {
    sort.map(|s| {
        EntrySort::parse(s)
            .ok_or_else(|| anyhow::anyhow!("unknown sort: {s} (expected newest, oldest, title)"))
    })
    .transpose()
}

fn parse_quote_emotion(emotion: &str) -> Result<QuoteEmotion> {
    QuoteEmotion::parse(emotion).ok_or_else(|| {
        let valid: Vec<String> = QuoteEmotion::ALL
            .iter()
            .map(|e| e.as_str().to_lowercase())
            .collect();
        anyhow::anyhow!("unknown emotion: {emotion} (expected {})", valid.join(", "))
    })
}

// ---------------------------------------------------------------------------
// auth
// ---------------------------------------------------------------------------

async fn cmd_login(ctx: &PageContext, email: String, password: Option<String>) -> Result<()> {
    let creds = Credentials {
        email,
        password: resolve_password(password)?,
    };
    let mut flow = AuthFlow::new(ctx.clone());
    match flow.login(&creds).await {
        SubmitOutcome::Navigate(_) => {
            println!("{} {}", "Signed in as".green(), creds.email.trim().cyan());
            Ok(())
        }
        SubmitOutcome::Invalid(msg) | SubmitOutcome::Failed(msg) => {
            anyhow::bail!("login failed: {msg}")
        }
    }
}

async fn cmd_register(
    ctx: &PageContext,
    email: String,
    name: String,
    password: Option<String>,
) -> Result<()> {
    let reg = Registration {
        email,
        name,
        password: resolve_password(password)?,
    };
    let mut flow = AuthFlow::new(ctx.clone());
    match flow.register(&reg).await {
        SubmitOutcome::Navigate(_) => {
            let notice = flow.notice.unwrap_or_default();
            println!("{}", notice.green());
            println!("  Next: {}", "memorymap login --email <email>".cyan());
            Ok(())
        }
        SubmitOutcome::Invalid(msg) | SubmitOutcome::Failed(msg) => {
            anyhow::bail!("registration failed: {msg}")
        }
    }
}

fn cmd_logout(ctx: &PageContext) -> Result<()> {
    let mut flow = AuthFlow::new(ctx.clone());
    if !flow.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    match flow.logout() {
        SubmitOutcome::Navigate(_) => {
            println!("{}", "Signed out.".green());
            Ok(())
        }
        SubmitOutcome::Invalid(msg) | SubmitOutcome::Failed(msg) => {
            anyhow::bail!("logout failed: {msg}")
        }
    }
}

async fn cmd_ping(ctx: &PageContext, json: bool) -> Result<()> {
    let body = require(ctx.api.ping().await, "backend check failed")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    println!(
        "{} {}",
        "OK".green().bold(),
        ctx.api.base_url().cyan()
    );
    if let Some(message) = body.get("message").and_then(|m| m.as_str()) {
        println!("  {}", message.dimmed());
    }
    println!(
        "  {}  {}",
        "Signed in:".dimmed(),
        if ctx.api.is_authenticated() { "yes" } else { "no" }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// entries
// ---------------------------------------------------------------------------

/// Field overrides for creating or editing an entry.
struct DraftArgs {
    title: Option<String>,
    content: Option<String>,
    location: Option<String>,
    mood: Option<String>,
}

impl DraftArgs {
    fn apply(self, form: &mut DiaryForm) {
        if let Some(t) = self.title {
            form.draft.title = t;
        }
        if let Some(c) = self.content {
            form.draft.content = c;
        }
        if let Some(l) = self.location {
            form.draft.location = l;
        }
        if let Some(m) = self.mood {
            form.draft.mood = m;
        }
    }
}

fn finish_form(outcome: SubmitOutcome, done: &str) -> Result<()> {
    match outcome {
        SubmitOutcome::Navigate(_) => {
            println!("{}", done.green());
            Ok(())
        }
        SubmitOutcome::Invalid(msg) => anyhow::bail!("{msg}"),
        SubmitOutcome::Failed(msg) => anyhow::bail!("failed to save entry: {msg}"),
    }
}

async fn cmd_new(ctx: &PageContext, draft: DraftArgs, analyze: bool) -> Result<()> {
    let mut form = DiaryForm::new(ctx.clone());
    draft.apply(&mut form);

    if analyze && form.wants_analysis() {
        form.analyze_draft().await;
        if let Some(emotion) = form.analysis.as_ref().and_then(|a| a.primary_emotion()) {
            println!(
                "{} {}",
                "Detected emotion:".dimmed(),
                paint(emotion, emotion_color(emotion))
            );
        } else if let Some(err) = &form.analysis_error {
            tracing::warn!("emotion analysis failed: {err}");
        }
    }

    let outcome = form.submit().await;
    finish_form(outcome, "Entry saved.")
}

async fn cmd_edit(ctx: &PageContext, id: &str, draft: DraftArgs) -> Result<()> {
    let mut form = DiaryForm::edit(ctx.clone(), id);
    form.load().await;
    if let Some(err) = form.error.take() {
        anyhow::bail!("failed to load entry {id}: {err}");
    }
    draft.apply(&mut form);
    let outcome = form.submit().await;
    finish_form(outcome, "Entry updated.")
}

async fn cmd_list(
    ctx: &PageContext,
    search: Option<String>,
    tag: Option<String>,
    sort: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let tag = parse_tag(tag.as_deref())?;
    let sort = parse_sort(sort.as_deref())?;

    let mut page = match limit {
        Some(limit) => {
            let mut local = ctx.clone();
            local.ui.memories_limit = limit;
            MemoriesPage::new(local)
        }
        None => MemoriesPage::new(ctx.clone()),
    };
    page.load().await;
    if let Some(err) = page.state.error() {
        anyhow::bail!("failed to load memories: {err}");
    }
    if let Some(term) = search {
        page.set_search(term);
    }
    page.set_tag(tag);
    if let Some(sort) = sort {
        page.set_sort(sort);
    }

    let visible = page.visible();
    if json {
        let entries: Vec<&DiaryEntry> = visible.iter().map(|t| &t.entry).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if visible.is_empty() {
        if page.entries().is_empty() {
            println!("No memories yet. Write one with {}", "memorymap new".cyan());
        } else {
            println!("No memories match your search.");
        }
        return Ok(());
    }

    println!(
        "  {}  {}  {}  {}",
        format!("{:<24}", "ID").dimmed(),
        format!("{:<12}", "Tag").dimmed(),
        format!("{:<10}", "Date").dimmed(),
        "Title".dimmed(),
    );
    println!("{}", "─".repeat(78).dimmed());

    for tagged in &visible {
        let entry = &tagged.entry;
        let tag_cell = format!("{:<12}", tagged.tag.as_str());
        println!(
            "  {}  {}  {}  {}",
            format!("{:<24}", entry.id).cyan(),
            paint(&tag_cell, tagged.tag.color()),
            entry_date(entry),
            truncate(&entry.title, 40),
        );
    }

    println!("{}", "─".repeat(78).dimmed());
    println!(
        "  {} of {} memor{}",
        visible.len(),
        page.entries().len(),
        if page.entries().len() == 1 { "y" } else { "ies" }
    );
    Ok(())
}

async fn cmd_get(ctx: &PageContext, id: &str, json: bool) -> Result<()> {
    let entry = require(ctx.api.get_entry(id).await, "failed to load entry")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let tag = memorymap_core::tagging::entry_tag(&entry);
    println!("{}", entry.title.bold());
    println!(
        "{} {}",
        paint(tag.label(), tag.color()),
        entry_date(&entry).dimmed()
    );
    println!();
    println!("{}", entry.content);
    println!();

    println!("{}", "--- Details ---".dimmed());
    println!("  {}  {}", "ID:".dimmed(), entry.id.cyan());
    if let Some(at) = entry.created_at {
        println!(
            "  {}  {}",
            "Created:".dimmed(),
            at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(at) = entry.updated_at {
        println!(
            "  {}  {}",
            "Updated:".dimmed(),
            at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(location) = &entry.location {
        println!("  {}  {}", "Location:".dimmed(), location);
    }
    if let Some(mood) = &entry.mood {
        println!("  {}  {}", "Mood:".dimmed(), mood);
    }
    if let Some(url) = entry.image_url() {
        println!("  {}  {}", "Image:".dimmed(), url.cyan());
    }

    if let Some(analysis) = &entry.analysis {
        println!();
        println!("{}", "--- Analysis ---".dimmed());
        if let Some(summary) = &analysis.summary {
            println!("  {}", summary);
        }
        if !analysis.themes.is_empty() {
            println!("  {}  {}", "Themes:".dimmed(), analysis.themes.join(", "));
        }
        if let Some(affect) = &analysis.affect {
            for score in &affect.primary_emotions {
                println!(
                    "  {} {:.0}%",
                    paint(&format!("{:<12}", score.label), emotion_color(&score.label)),
                    score.score * 100.0
                );
            }
        }
    }
    Ok(())
}

async fn cmd_delete(ctx: &PageContext, ids: &[String], confirm: bool) -> Result<()> {
    match ids {
        [] => anyhow::bail!("give at least one entry ID"),
        [id] => {
            require(ctx.api.delete_entry(id).await, "failed to delete entry")?;
            println!("{} {}", "Deleted".green(), id.cyan());
            Ok(())
        }
        many => {
            if !confirm {
                println!("Would delete {} entries:", many.len());
                for id in many {
                    println!("  {}", id.cyan());
                }
                println!();
                println!("Re-run with {} to delete them.", "--confirm".cyan());
                return Ok(());
            }

            let mut page = MemoriesPage::new(ctx.clone());
            page.load().await;
            if let Some(err) = page.state.error() {
                anyhow::bail!("failed to load memories: {err}");
            }
            let mut missing = Vec::new();
            for id in many {
                if page.entries().iter().any(|t| &t.entry.id == id) {
                    page.selected.insert(id.clone());
                } else {
                    missing.push(id.as_str());
                }
            }

            let summary = page.delete_selected().await;
            for id in &summary.deleted {
                println!("{} {}", "Deleted".green(), id.cyan());
            }
            for (id, err) in &summary.failed {
                println!("{} {}: {}", "Failed".red(), id.cyan(), err);
            }
            for id in &missing {
                println!("{} {}: not in your memories", "Skipped".yellow(), id.cyan());
            }
            if !summary.failed.is_empty() {
                anyhow::bail!(
                    "{} of {} deletions failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.deleted.len()
                );
            }
            Ok(())
        }
    }
}

async fn cmd_analyze(ctx: &PageContext, text: &str, locations: bool, json: bool) -> Result<()> {
    let analysis = require(
        ctx.api.analyze_emotion(text).await,
        "emotion analysis failed",
    )?;
    let places = if locations {
        Some(require(
            ctx.api.extract_locations(text).await,
            "location extraction failed",
        )?)
    } else {
        None
    };

    if json {
        let mut out = serde_json::json!({ "analysis": analysis.0 });
        if let Some(p) = &places {
            out["locations"] = serde_json::json!(p.locations);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match analysis.primary_emotion() {
        Some(emotion) => {
            let tag = memorymap_core::tagging::color_tag(emotion);
            println!(
                "{} {}  {}",
                "Emotion:".dimmed(),
                paint(emotion, emotion_color(emotion)).bold(),
                format!("({})", tag.label()).dimmed()
            );
        }
        None => println!("{}", "No emotion detected.".dimmed()),
    }
    if let Some(summary) = analysis.summary() {
        println!("{} {}", "Summary:".dimmed(), summary);
    }
    if let Some(p) = places {
        if p.locations.is_empty() {
            println!("{} {}", "Locations:".dimmed(), "none".dimmed());
        } else {
            println!("{} {}", "Locations:".dimmed(), p.locations.join(", ").cyan());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// quotes
// ---------------------------------------------------------------------------

fn print_quote(quote: &Quote, favorite: bool) {
    let emotion = QuoteEmotion::parse_or_neutral(&quote.emotion);
    let color = quote.colors.primary.as_deref().unwrap_or(emotion.color());
    let author = if quote.author.trim().is_empty() {
        "Anonymous"
    } else {
        quote.author.trim()
    };
    println!(
        "{} {}",
        if favorite { "♥".red().to_string() } else { " ".to_string() },
        paint(&format!("\"{}\"", quote.quote), color).bold()
    );
    println!(
        "    - {}  {}",
        author.italic(),
        format!("[{}]", emotion.label()).dimmed()
    );
    if let Some(id) = &quote.id {
        println!("    {}", id.dimmed());
    }
}

async fn cmd_quote_generate(
    ctx: &PageContext,
    emotion: Option<String>,
    prompt: Option<String>,
    json: bool,
) -> Result<()> {
    let mut page = QuotesPage::new(ctx.clone());
    if let Some(e) = emotion {
        page.select_emotion(parse_quote_emotion(&e)?);
    }
    page.prompt = prompt.unwrap_or_default();

    let quote = require(page.generate().await, "failed to generate quote")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }
    print_quote(&quote, page.is_favorite(&quote));
    Ok(())
}

async fn cmd_quote_colors(ctx: &PageContext, emotion: &str, json: bool) -> Result<()> {
    let emotion = parse_quote_emotion(emotion)?;
    let palette = require(ctx.api.quote_colors(emotion).await, "failed to load colors")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&palette)?);
        return Ok(());
    }
    println!("{}", paint(emotion.label(), emotion.color()).bold());
    let colors = &palette.colors;
    for (name, hex) in [
        ("primary", &colors.primary),
        ("secondary", &colors.secondary),
        ("accent", &colors.accent),
        ("background", &colors.background),
        ("text", &colors.text),
    ] {
        if let Some(hex) = hex {
            println!("  {:<11} {} {}", name, paint("██", hex), hex.dimmed());
        }
    }
    Ok(())
}

async fn load_quotes(ctx: &PageContext) -> Result<QuotesPage> {
    let mut page = QuotesPage::new(ctx.clone());
    page.load_history().await;
    if let Some(err) = page.history.error() {
        anyhow::bail!("failed to load quote history: {err}");
    }
    Ok(page)
}

async fn cmd_quote_history(
    ctx: &PageContext,
    search: Option<String>,
    emotion: Option<String>,
    sort: Option<String>,
    favorites_only: bool,
    json: bool,
) -> Result<()> {
    let sort = match sort.as_deref() {
        Some(s) => QuoteSort::parse(s)
            .ok_or_else(|| anyhow::anyhow!("unknown sort: {s} (expected date, author, emotion)"))?,
        None => QuoteSort::default(),
    };
    let page = load_quotes(ctx).await?;

    let mut view = QuoteHistoryView {
        query: QuoteQuery {
            search: search.unwrap_or_default(),
            ..Default::default()
        },
        favorites_only,
    };
    view.set_emotion(emotion.as_deref());
    view.set_sort(sort);
    let visible = view.visible(page.history(), page.favorite_keys());

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }
    if visible.is_empty() {
        if page.history().is_empty() {
            println!(
                "No quotes yet. Generate one with {}",
                "memorymap quote generate".cyan()
            );
        } else {
            println!("No quotes match your filters.");
        }
        return Ok(());
    }
    for quote in &visible {
        print_quote(quote, page.is_favorite(quote));
        println!();
    }
    println!(
        "  {} of {} quotes",
        visible.len(),
        page.history().len()
    );
    Ok(())
}

async fn cmd_quote_favorite(ctx: &PageContext, key: &str) -> Result<()> {
    let mut page = load_quotes(ctx).await?;
    let quote = page
        .history()
        .iter()
        .find(|q| q.id.as_deref() == Some(key) || q.favorite_key() == key)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no quote in your history matches {key}"))?;

    let now_favorite = page
        .toggle_favorite(&quote)
        .context("failed to save favorites")?;
    if now_favorite {
        println!("{} {}", "♥ Added to favorites:".red(), truncate(&quote.quote, 60));
    } else {
        println!("Removed from favorites: {}", truncate(&quote.quote, 60));
    }
    Ok(())
}

async fn cmd_quote_favorites(ctx: &PageContext, json: bool) -> Result<()> {
    let page = load_quotes(ctx).await?;
    let favorites = page.favorites();
    if json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
        return Ok(());
    }
    if favorites.is_empty() {
        println!("No favorite quotes yet.");
        return Ok(());
    }
    for quote in favorites {
        print_quote(quote, true);
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// profile
// ---------------------------------------------------------------------------

async fn load_profile(ctx: &PageContext) -> Result<ProfilePage> {
    let mut page = ProfilePage::new(ctx.clone());
    page.load().await;
    if let Some(err) = page.profile.error() {
        anyhow::bail!("failed to load profile: {err}");
    }
    Ok(page)
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.display_name().bold());
    let rows = [
        ("Username:", &profile.username),
        ("Email:", &profile.email),
        ("Location:", &profile.location),
        ("Bio:", &profile.bio),
        ("Picture:", &profile.profile_picture_url),
        ("Member since:", &profile.created_at),
    ];
    for (label, value) in rows {
        if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            println!("  {}  {}", format!("{:<13}", label).dimmed(), v);
        }
    }
}

async fn cmd_profile_show(ctx: &PageContext, json: bool) -> Result<()> {
    let page = load_profile(ctx).await?;
    let Some(profile) = page.profile.loaded() else {
        anyhow::bail!("profile unavailable");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }
    print_profile(profile);
    Ok(())
}

async fn cmd_profile_edit(ctx: &PageContext, changes: ProfileUpdate) -> Result<()> {
    let mut page = load_profile(ctx).await?;
    if !page.begin_edit() {
        anyhow::bail!("profile unavailable");
    }
    if let Some(draft) = page.draft_mut() {
        let fields = [
            (changes.full_name, &mut draft.full_name),
            (changes.username, &mut draft.username),
            (changes.email, &mut draft.email),
            (changes.bio, &mut draft.bio),
            (changes.location, &mut draft.location),
            (changes.profile_picture_url, &mut draft.profile_picture_url),
        ];
        for (value, slot) in fields {
            if value.is_some() {
                *slot = value;
            }
        }
    }

    if page.pending_update().is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    let profile = require(page.save().await, "failed to update profile")?;
    println!("{}", "Profile updated.".green());
    print_profile(&profile);
    Ok(())
}

// ---------------------------------------------------------------------------
// insights, map, gallery
// ---------------------------------------------------------------------------

fn bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.max(1))
}

async fn cmd_insights(ctx: &PageContext, json: bool) -> Result<()> {
    let mut page = DashboardPage::new(ctx.clone());
    page.load().await;
    if let Some(err) = page.insights.error() {
        anyhow::bail!("failed to load insights: {err}");
    }

    if json {
        let body = serde_json::json!({
            "insights": page.insights.loaded(),
            "stats": {
                "entry_count": page.stats().entry_count,
                "distinct_locations": page.stats().distinct_locations,
                "top_emotion": page.stats().top_emotion,
            }
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let stats = page.stats();
    println!("{}", "Your diary".bold());
    println!("  {}  {}", format!("{:<12}", "Entries:").dimmed(), stats.entry_count);
    println!(
        "  {}  {}",
        format!("{:<12}", "Places:").dimmed(),
        stats.distinct_locations
    );
    if let Some(top) = &stats.top_emotion {
        println!(
            "  {}  {}",
            format!("{:<12}", "Top emotion:").dimmed(),
            paint(top, emotion_color(top))
        );
    }

    match page.insights.loaded() {
        Some(insights) => {
            println!();
            println!("{}", "--- Emotions ---".dimmed());
            let max = insights.max_count();
            let mut rows: Vec<(&String, &u64)> = insights.emotion_distribution.iter().collect();
            rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (emotion, count) in rows {
                println!(
                    "  {} {} {}",
                    format!("{:<12}", emotion),
                    paint(&bar(*count, max, 30), emotion_color(emotion)),
                    count.to_string().dimmed()
                );
            }
        }
        None => {
            println!();
            println!("{}", "No emotional data yet.".dimmed());
        }
    }
    Ok(())
}

async fn cmd_map(
    ctx: &PageContext,
    svg: Option<String>,
    emotion: Option<String>,
    json: bool,
) -> Result<()> {
    let mut page = EmotionalMapPage::new(ctx.clone());
    page.load().await;
    if let Some(err) = page.insights.error() {
        anyhow::bail!("failed to load emotional map: {err}");
    }
    if let Some(e) = emotion.as_deref() {
        page.toggle(e);
        if page.selected().is_none() {
            anyhow::bail!("no entries with emotion {e}");
        }
    }

    if let Some(path) = &svg {
        std::fs::write(path, page.svg()).with_context(|| format!("failed to write {path}"))?;
        println!("{} {}", "Wrote".green(), path.cyan());
    }

    let layout = page.layout();
    if json {
        let nodes: Vec<serde_json::Value> = layout
            .nodes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "emotion": n.emotion,
                    "count": n.count,
                    "x": n.x,
                    "y": n.y,
                    "size": n.size,
                    "color": n.color,
                })
            })
            .collect();
        let related: Vec<&str> = page.related().iter().map(|e| e.id.as_str()).collect();
        let body = serde_json::json!({
            "nodes": nodes,
            "selected": page.selected().map(|n| n.emotion.clone()),
            "related": related,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if layout.is_empty() {
        println!("No emotional data yet. Write a few entries first.");
        return Ok(());
    }
    if svg.is_none() || emotion.is_some() {
        for node in &layout.nodes {
            let marker = if page.selected().map(|s| &s.emotion) == Some(&node.emotion) {
                "●"
            } else {
                "○"
            };
            println!(
                "  {} {} {} {}",
                paint(marker, node.color),
                format!("{:<12}", node.emotion),
                paint(&bar(node.count, layout.max_count, 30), node.color),
                node.count.to_string().dimmed()
            );
        }
    }

    if let Some(node) = page.selected() {
        let related = page.related();
        println!();
        println!(
            "{} ({})",
            format!("--- Entries feeling {} ---", node.emotion).dimmed(),
            related.len().to_string().cyan()
        );
        for entry in related {
            println!(
                "  {}  {}  {}",
                format!("{:<24}", entry.id).cyan(),
                entry_date(entry),
                truncate(&entry.title, 40)
            );
        }
    }
    Ok(())
}

async fn cmd_gallery(
    ctx: &PageContext,
    search: Option<String>,
    sort: Option<String>,
    json: bool,
) -> Result<()> {
    let sort = parse_sort(sort.as_deref())?;
    let mut page = GalleryPage::new(ctx.clone());
    page.load().await;
    if let Some(err) = page.state.error() {
        anyhow::bail!("failed to load gallery: {err}");
    }
    page.search = search.unwrap_or_default();
    if let Some(sort) = sort {
        page.sort = sort;
    }

    let visible = page.visible();
    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }
    if visible.is_empty() {
        println!("No images yet.");
        return Ok(());
    }
    for entry in &visible {
        println!(
            "  {}  {}  {}",
            entry_date(entry),
            truncate(&entry.title, 36).bold(),
            entry.image_url().unwrap_or_default().cyan()
        );
    }
    println!("{}", "─".repeat(78).dimmed());
    println!("  {} image{}", visible.len(), if visible.len() == 1 { "" } else { "s" });
    Ok(())
}

// ---------------------------------------------------------------------------
// coach, feedback, routes
// ---------------------------------------------------------------------------

async fn cmd_image(
    ctx: &PageContext,
    prompt: String,
    style: Option<String>,
    json: bool,
) -> Result<()> {
    let request = ImageRequest { prompt, style };
    let image = require(ctx.api.generate_image(&request).await, "image generation failed")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&image)?);
        return Ok(());
    }
    println!("{} {}", "Image:".green(), image.image_url.cyan());
    Ok(())
}

async fn cmd_coach(ctx: &PageContext, question: &str, json: bool) -> Result<()> {
    let advice = require(ctx.api.coaching_advice(question).await, "coach unavailable")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
        return Ok(());
    }
    println!("{}", advice.advice);
    if !advice.relevant_entries.is_empty() {
        println!();
        println!(
            "{} ({})",
            "--- Based on ---".dimmed(),
            advice.relevant_entries.len().to_string().cyan()
        );
        for entry in &advice.relevant_entries {
            let title = entry
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("(untitled)");
            println!("  {}", title);
        }
    }
    if let Some(explanation) = advice.explanation.as_ref().and_then(|e| e.as_str()) {
        println!();
        println!("{}", explanation.dimmed());
    }
    Ok(())
}

async fn cmd_feedback(
    ctx: &PageContext,
    rating: u8,
    category: String,
    message: String,
) -> Result<()> {
    let feedback = FeedbackSubmission {
        rating,
        category,
        message,
    };
    require(
        ctx.api.submit_feedback(&feedback).await,
        "failed to send feedback",
    )?;
    println!("{}", "Thanks for your feedback!".green());
    Ok(())
}

fn cmd_routes(resolve: Option<&str>) -> Result<()> {
    if let Some(path) = resolve {
        let route = Route::parse(path);
        println!("{} {}", route.title().bold(), route.path().cyan());
        if matches!(route, Route::NotFound(_)) {
            println!("  {}", "No page at this path.".yellow());
        } else if route.requires_auth() {
            println!("  {}", "requires sign-in".dimmed());
        }
        return Ok(());
    }

    println!(
        "  {}  {}",
        format!("{:<18}", "Path").dimmed(),
        "Page".dimmed()
    );
    println!("{}", "─".repeat(50).dimmed());
    let routes = Route::FIXED
        .iter()
        .cloned()
        .chain(std::iter::once(Route::EditEntry(":id".into())));
    for route in routes {
        println!(
            "  {}  {}{}",
            format!("{:<18}", route.path()).cyan(),
            route.title(),
            if route.requires_auth() {
                "".to_string()
            } else {
                " (public)".dimmed().to_string()
            }
        );
    }
    Ok(())
}
