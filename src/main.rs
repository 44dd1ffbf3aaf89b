mod app;
mod client;
mod config;
mod generator;
mod logging;
mod parser;
mod prompts;
mod roadmap;
mod slug;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::client::{GenerateError, OllamaClient};
use crate::config::{Config, ConfigLoadStatus};
use crate::logging::LoggingContext;
use crate::store::{RoadmapStore, SqliteSlot};

#[derive(Parser)]
#[command(
    name = "roadmap",
    version,
    about = "Generate learning roadmaps and practice questions with a local language model"
)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a roadmap with practice questions for a topic
    Generate {
        /// Topic to learn, e.g. "Machine Learning"
        topic: String,
        /// Title to save the roadmap under (defaults to the topic)
        #[arg(long)]
        title: Option<String>,
        /// Print the roadmap without saving it
        #[arg(long)]
        no_save: bool,
    },
    /// List saved roadmaps, newest first
    List,
    /// Show a saved roadmap
    Show {
        /// Slug of the roadmap, as printed by `list`
        slug: String,
    },
    /// Delete every saved roadmap with this exact title
    Delete {
        /// Title of the roadmap(s) to delete
        title: String,
    },
    /// Browse saved roadmaps interactively (default)
    Browse,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Initialize logging before anything else
    let logging = match logging::init() {
        Ok(ctx) => {
            logging::cleanup_old_logs(&ctx.log_directory);
            Some(ctx)
        }
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    let loaded_config = config::load_config(cli.config.as_deref());
    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );
    if let Some(ctx) = &logging {
        logging::apply_level(&ctx.reload_handle, &loaded_config.config.logging.level);
    }
    if let ConfigLoadStatus::Error(message) = &loaded_config.status {
        eprintln!("Warning: {} (using default settings)", message);
    }

    let command = cli.command.unwrap_or(Commands::Browse);
    let result = run(command, &loaded_config.config, logging.as_ref());

    if let Err(e) = &result {
        warn!(error = %format!("{:#}", e), "command_failed");
    }

    if let Some(ctx) = &logging {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    result
}

fn run(command: Commands, config: &Config, logging: Option<&LoggingContext>) -> Result<()> {
    match command {
        Commands::Generate {
            topic,
            title,
            no_save,
        } => cmd_generate(config, &topic, title, no_save),
        Commands::List => cmd_list(config),
        Commands::Show { slug } => cmd_show(config, &slug),
        Commands::Delete { title } => cmd_delete(config, &title),
        Commands::Browse => cmd_browse(config, logging),
    }
}

fn open_store(config: &Config) -> Result<RoadmapStore<SqliteSlot>> {
    let path = config.database_path();
    let slot = SqliteSlot::open(&path)
        .with_context(|| format!("Failed to open roadmap storage at {}", path.display()))?;
    Ok(RoadmapStore::new(slot))
}

/// What to tell the user when generation fails.
fn generation_failure_message(error: &GenerateError, config: &Config) -> String {
    match error {
        GenerateError::Transport(detail) => format!(
            "Failed to generate roadmap. Make sure the model server at {} is running and reachable. ({})",
            config.model.endpoint, detail
        ),
        GenerateError::Unparseable(kind) => format!(
            "Failed to parse the model's {}. Please try again.",
            kind.label()
        ),
    }
}

fn cmd_generate(config: &Config, topic: &str, title: Option<String>, no_save: bool) -> Result<()> {
    let topic = topic.trim();
    if topic.is_empty() {
        bail!("Topic cannot be empty");
    }
    let title = title.unwrap_or_else(|| topic.to_string());
    if !no_save && title.trim().is_empty() {
        bail!("Title cannot be empty");
    }

    let client = OllamaClient::new(&config.model)
        .map_err(|e| anyhow::anyhow!(generation_failure_message(&e, config)))?;

    eprintln!(
        "Generating a roadmap for \"{}\" with {}...",
        topic, config.model.name
    );
    info!(topic, model = %config.model.name, "generate_start");

    let generation = generator::generate(&client, topic)
        .map_err(|e| anyhow::anyhow!(generation_failure_message(&e, config)))?;
    info!(
        topic = %generation.topic,
        steps = generation.steps.len(),
        questions_ok = generation.questions.is_ok(),
        "generate_done"
    );

    if let Err(e) = &generation.questions {
        eprintln!(
            "Warning: {} The roadmap steps are kept without practice questions.",
            generation_failure_message(e, config)
        );
    }

    let roadmap = generation.into_roadmap(title);
    println!("{}", ui::plain_text(&ui::roadmap_lines(&roadmap)));

    if no_save {
        return Ok(());
    }

    let mut store = open_store(config)?;
    store
        .save(&roadmap)
        .context("Failed to save roadmap; it is printed above so nothing is lost")?;

    println!();
    println!("Saved. View it again with: roadmap show {}", roadmap.slug());
    Ok(())
}

fn cmd_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let loaded = store.list();

    if let Some(e) = &loaded.error {
        eprintln!("Failed to load saved roadmaps: {}", e);
    } else if loaded.roadmaps.is_empty() {
        println!("No roadmaps yet. Create your first one with: roadmap generate <topic>");
    }

    for roadmap in &loaded.roadmaps {
        println!(
            "{}  ·  {}  ·  {}",
            roadmap.title,
            ui::summary_line(roadmap),
            roadmap.slug()
        );
    }

    Ok(())
}

fn cmd_show(config: &Config, slug: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(roadmap) = store
        .find_by_slug(slug)
        .context("Failed to load saved roadmaps")?
    else {
        bail!("Roadmap not found: {}", slug);
    };

    println!("{}", ui::plain_text(&ui::roadmap_lines(&roadmap)));
    Ok(())
}

fn cmd_delete(config: &Config, title: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let removed = store
        .delete_by_title(title)
        .context("Failed to delete roadmap")?;

    match removed {
        0 => println!("No roadmap titled \"{}\"", title),
        1 => println!("Deleted \"{}\"", title),
        n => println!("Deleted {} roadmaps titled \"{}\"", n, title),
    }
    Ok(())
}

fn cmd_browse(config: &Config, logging: Option<&LoggingContext>) -> Result<()> {
    let store = open_store(config)?;
    let app = App::new(
        store,
        logging.map(|ctx| ctx.session_id.clone()),
        logging.map(|ctx| ctx.log_directory.clone()),
    );

    // Setup terminal
    enable_raw_mode()?;
    let terminal = restore_on_error(enter_terminal, || {
        let _ = restore_terminal();
    })?;

    let result = run_app(terminal, app);

    restore_terminal()?;

    result
}

fn enter_terminal() -> io::Result<DefaultTerminal> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Runs `setup`, calling `restore` before returning its error.
fn restore_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> io::Result<T> {
    setup().inspect_err(|_| restore())
}

fn run_app(mut terminal: DefaultTerminal, mut app: App<SqliteSlot>) -> Result<()> {
    info!(count = app.roadmaps.len(), "dashboard_open");

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        if crossterm::event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = crossterm::event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code, key.modifiers);
        }
    }

    Ok(())
}
