//! Fighter arena terminal client.
//!
//! Pick an arena level, choose or create a fighter, and fight generated
//! enemies turn by turn. Characters live on the remote arena API.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! cargo run -p arena -- --headless --character 4 --level 2
//! ```

mod app;
mod events;
mod headless;
mod ui;

use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_api::{ArenaApi, Registration, TokenStore};
use arena_core::persist::{load_progress, save_progress};
use arena_core::{ArenaConfig, ArenaProgress, ArenaSession, Level, SessionConfig, SessionError, Strategy};

use app::{read_image, App, PendingRequest};
use events::{handle_event, EventResult};
use ui::render;

/// Parsed command line.
#[derive(Debug, Default)]
struct Options {
    help: bool,
    headless: bool,
    token: Option<String>,
    registration: Option<Registration>,
    level: Option<Level>,
    character: Option<u64>,
    auto: Option<Strategy>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut register = false;
        let mut email = None;
        let mut pseudo = None;
        let mut password = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |name: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("{name} needs a value"))
            };
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--headless" => options.headless = true,
                "--register" => register = true,
                "--token" => options.token = Some(value("--token")?),
                "--email" => email = Some(value("--email")?),
                "--pseudo" => pseudo = Some(value("--pseudo")?),
                "--password" => password = Some(value("--password")?),
                "--level" => {
                    let raw = value("--level")?;
                    options.level = Some(raw.parse().map_err(|e| format!("--level: {e}"))?);
                }
                "--character" => {
                    let raw = value("--character")?;
                    options.character =
                        Some(raw.parse().map_err(|_| format!("--character: invalid id '{raw}'"))?);
                }
                "--auto" => {
                    let raw = value("--auto")?;
                    options.auto = Some(parse_strategy(&raw)?);
                }
                other => return Err(format!("unknown argument '{other}'")),
            }
        }

        if register {
            match (email, pseudo, password) {
                (Some(email), Some(pseudo), Some(password)) => {
                    options.registration = Some(Registration::new(email, pseudo, password));
                }
                _ => return Err("--register needs --email, --pseudo and --password".to_string()),
            }
        }

        Ok(options)
    }
}

fn parse_strategy(raw: &str) -> Result<Strategy, String> {
    match raw {
        "normal" => Ok(Strategy::AlwaysNormal),
        "special" => Ok(Strategy::AlwaysSpecial),
        "alternate" => Ok(Strategy::Alternate),
        other => Err(format!("--auto: unknown strategy '{other}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if options.help {
        print_help();
        return Ok(());
    }

    let config = ArenaConfig::from_env();

    // The TUI owns the terminal, so it logs to a file
    let _log_guard = if options.headless {
        init_stderr_logging();
        None
    } else {
        Some(init_file_logging(&config.log_dir)?)
    };

    let tokens = TokenStore::new(&config.token_path);
    let mut api = ArenaApi::new(config.api.clone()).context("failed to build API client")?;

    if let Some(token) = &options.token {
        tokens
            .save(token)
            .await
            .with_context(|| format!("failed to store token in {}", tokens.path().display()))?;
        println!("Token saved to {}", tokens.path().display());
    }

    if let Some(registration) = &options.registration {
        let response = api
            .register(registration)
            .await
            .context("registration failed")?;
        println!("Registered {}", registration.pseudo);
        if let Some(token) = response.get("token").and_then(|t| t.as_str()) {
            tokens.save(token).await.context("failed to store token")?;
            println!("Token saved to {}", tokens.path().display());
        } else {
            println!("Log in through the arena website, then run: arena --token <JWT>");
        }
        return Ok(());
    }

    api.set_token(tokens.load().await.context("failed to read stored token")?);

    let progress = match load_progress(&config.progress_path).await {
        Ok(progress) => progress,
        Err(e) => {
            tracing::warn!(error = %e, "could not load progress, starting fresh");
            ArenaProgress::new()
        }
    };

    if options.headless {
        let headless_config = headless::HeadlessConfig {
            character: options.character,
            level: options.level.unwrap_or(Level::FIRST),
            pacing: config.pacing,
            progress_path: config.progress_path.clone(),
            auto: options.auto,
        };
        return headless::run_headless(api, tokens, progress, headless_config).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        api,
        tokens,
        progress,
        config.progress_path.clone(),
        config.pacing,
    );
    if let Some(level) = options.level.filter(|l| app.progress.is_unlocked(*l)) {
        app.level_index = level.get() as usize - 1;
        app.chosen_level = level;
    }

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "arena exited with an error");
    }
    result
}

fn init_file_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::never(dir, "arena.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> anyhow::Result<()> {
    loop {
        // Render
        terminal.draw(|f| render(f, &app, Instant::now()))?;

        // Network and disk work happens between frames
        if let Some(request) = app.take_pending() {
            if !matches!(request, PendingRequest::SaveProgress) {
                app.set_status("Loading...");
                terminal.draw(|f| render(f, &app, Instant::now()))?;
            }
            process_request(&mut app, request).await;
            continue;
        }

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(50))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev, Instant::now()) == EventResult::Quit {
                return Ok(());
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

async fn process_request(app: &mut App, request: PendingRequest) {
    match request {
        PendingRequest::LoadRoster => match app.api.list_characters().await {
            Ok(characters) => {
                app.clear_status();
                app.roster_loaded(characters);
            }
            Err(e) => handle_api_error(app, e).await,
        },
        PendingRequest::OpenArena {
            character_id,
            level,
        } => {
            let config = SessionConfig::new(level)
                .with_character(character_id)
                .with_pacing(app.pacing);
            match ArenaSession::open(&app.api, &app.tokens, config).await {
                Ok(session) => app.arena_opened(session),
                Err(SessionError::NotAuthenticated) => app.auth_lost(),
                Err(e) => app.set_status(format!("Could not enter the arena: {e}")),
            }
        }
        PendingRequest::SaveCharacter { id, form } => {
            let mut payload = form.to_form();
            let image_path = form.image_path.trim();
            if !image_path.is_empty() {
                match read_image(Path::new(image_path)).await {
                    Ok(image) => payload = payload.with_image(image),
                    Err(e) => {
                        app.form_error(format!("Could not read image: {e}"));
                        return;
                    }
                }
            }
            let result = match id {
                Some(id) => app.api.update_character(id, &payload).await,
                None => app.api.create_character(&payload).await,
            };
            match result {
                Ok(character) => app.character_saved(character),
                Err(e @ (arena_api::Error::NotAuthenticated | arena_api::Error::NoToken)) => {
                    handle_api_error(app, e).await
                }
                Err(e) => {
                    app.clear_status();
                    app.form_error(e.to_string());
                }
            }
        }
        PendingRequest::DeleteCharacter(id) => match app.api.delete_character(id).await {
            Ok(()) => {
                app.set_status("Fighter deleted");
                app.request(PendingRequest::LoadRoster);
            }
            Err(e) => handle_api_error(app, e).await,
        },
        PendingRequest::SaveProgress => {
            if let Err(e) = save_progress(&app.progress_path, &app.progress).await {
                tracing::warn!(error = %e, "failed to save progress");
                app.set_status(format!("Could not save progress: {e}"));
            }
        }
    }
}

/// A rejected or missing token sends the user to the login screen.
async fn handle_api_error(app: &mut App, error: arena_api::Error) {
    match error {
        arena_api::Error::NotAuthenticated | arena_api::Error::NoToken => {
            if let Err(e) = app.tokens.clear().await {
                tracing::warn!(error = %e, "failed to clear stored token");
            }
            app.auth_lost();
        }
        other => {
            tracing::warn!(error = %other, "request failed");
            app.set_status(format!("Error: {other}"));
        }
    }
}

fn print_help() {
    println!("Fighter Arena - turn-based fights against generated enemies");
    println!();
    println!("USAGE:");
    println!("  arena [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help            Show this help message");
    println!("  --token <JWT>         Store a bearer token for the arena API");
    println!("  --register            Create an account (needs the three options below)");
    println!("    --email <EMAIL>");
    println!("    --pseudo <NAME>");
    println!("    --password <PASSWORD>");
    println!("  --level <N>           Arena level to start at (default: 1)");
    println!("  --headless            Run in headless mode (text-only, no TUI)");
    println!();
    println!("HEADLESS OPTIONS (only with --headless):");
    println!("  --character <ID>      Fighter to load (required)");
    println!("  --auto <STRATEGY>     Play the fight automatically: normal, special, alternate");
    println!();
    println!("ENVIRONMENT:");
    println!("  ARENA_API_URL         API base URL");
    println!("  ARENA_TOKEN_PATH      Token file location");
    println!("  ARENA_PROGRESS_PATH   Progress file location");
    println!("  ARENA_LOG_DIR         Log directory");
    println!("  ARENA_FAST=1          Resolve attacks without delays");
    println!("  RUST_LOG              Log filter (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("  arena                                   # Interactive TUI mode");
    println!("  arena --token eyJhbGciOi...             # Save a token, then play");
    println!("  arena --headless --character 4 --auto alternate");
}
