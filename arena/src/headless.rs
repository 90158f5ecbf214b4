//! Headless mode for the arena.
//!
//! A line-oriented interface for scripts and automated testing. Combat log
//! lines are printed as the blows land, so a paced fight prints over time.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use arena_api::{ArenaApi, TokenStore};
use arena_core::levels::{self, ArenaProgress};
use arena_core::persist::save_progress;
use arena_core::{
    ArenaSession, AttackKind, HeadlessArena, Level, Pacing, Roller, SessionConfig, SessionError,
    Side, Strategy,
};

/// What the headless fight needs beyond the API client.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub character: Option<u64>,
    pub level: Level,
    pub pacing: Pacing,
    pub progress_path: PathBuf,
    /// Play the whole fight with this strategy instead of reading stdin.
    pub auto: Option<Strategy>,
}

/// Run the arena in headless mode.
///
/// Protocol:
/// - `start`, `attack`, `special`, `restart`, `next` drive the fight
/// - Lines starting with `#` are commands (status, levels, help, quit)
/// - Status and errors are prefixed with `[STATUS]` and `[ERROR]`
pub async fn run_headless(
    api: ArenaApi,
    tokens: TokenStore,
    mut progress: ArenaProgress,
    config: HeadlessConfig,
) -> anyhow::Result<()> {
    if !progress.is_unlocked(config.level) {
        bail!(
            "level {} is locked (highest unlocked: {})",
            config.level,
            progress.highest_unlocked()
        );
    }

    let session_config = SessionConfig::new(config.level)
        .with_selection(config.character)
        .with_pacing(config.pacing);
    let session = match ArenaSession::open(&api, &tokens, session_config).await {
        Ok(session) => session,
        Err(SessionError::NotAuthenticated) => {
            println!("[ERROR] Not authenticated. Store a token with: arena --token <JWT>");
            bail!("not authenticated");
        }
        Err(SessionError::NoCharacterSelected) => {
            println!("[ERROR] No character selected. Pass --character <ID>");
            bail!("no character selected");
        }
        Err(e) => return Err(e).context("failed to open the arena"),
    };

    let (character, arena) = session.into_parts();
    let mut fight = HeadlessArena::new(arena);

    println!("=== Arena Headless Mode ===");
    println!("Fighter: {} (id {})", character.name, character.id);
    print_status(&fight);
    println!();

    if let Some(strategy) = config.auto {
        let outcome = play_auto(&mut fight, strategy, &mut std::io::stdout())
            .await
            .context("automatic fight failed")?;
        println!(
            "[RESULT] {} after {} turns ({} hits)",
            winner_label(outcome.winner),
            outcome.turns,
            outcome.hits
        );
        record_result(&mut fight, &mut progress, &config.progress_path).await;
        return Ok(());
    }

    print_logs(&mut fight);
    print_help();
    println!();

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Handle commands
        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "status" => print_status(&fight),
                "levels" => print_levels(&progress),
                "help" => print_help(),
                other => println!("[ERROR] Unknown command: #{other}"),
            }
            continue;
        }

        match line {
            "start" => match fight.start() {
                Ok(()) => print_logs(&mut fight),
                Err(e) => println!("[ERROR] {e}"),
            },
            "attack" | "special" => {
                let kind = if line == "special" {
                    AttackKind::Special
                } else {
                    AttackKind::Normal
                };
                if let Err(e) = fight.attack(kind) {
                    println!("[ERROR] {e}");
                    continue;
                }
                while fight.advance().await.is_some() {
                    print_logs(&mut fight);
                }
                record_result(&mut fight, &mut progress, &config.progress_path).await;
            }
            "restart" => {
                fight.restart();
                print_logs(&mut fight);
            }
            "next" => match fight.next_level() {
                Ok(level) => {
                    println!("[LEVEL] {}", levels::describe(level).name);
                    print_logs(&mut fight);
                }
                Err(e) => println!("[ERROR] {e}"),
            },
            other => println!("[ERROR] Unknown action: {other} (try #help)"),
        }
    }

    Ok(())
}

fn print_logs(fight: &mut HeadlessArena) {
    for log in fight.new_logs() {
        println!("{}", log.message);
    }
}

fn write_logs<R: Roller>(fight: &mut HeadlessArena<R>, out: &mut impl Write) -> std::io::Result<()> {
    for log in fight.new_logs() {
        writeln!(out, "{}", log.message)?;
    }
    out.flush()
}

/// How an automatic fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AutoOutcome {
    winner: Side,
    turns: usize,
    hits: usize,
}

/// Play the fight with `strategy`, writing each log line as its blow lands.
async fn play_auto<R: Roller>(
    fight: &mut HeadlessArena<R>,
    strategy: Strategy,
    out: &mut impl Write,
) -> anyhow::Result<AutoOutcome> {
    let mut hits = 0;
    while let Some(fired) = fight.advance().await {
        hits += fired.len();
        write_logs(fight, out)?;
    }

    let session = fight.arena().session();
    if !session.is_fighting() && session.winner().is_none() {
        fight.start()?;
    }
    write_logs(fight, out)?;

    let mut turns = 0;
    let winner = loop {
        if let Some(winner) = fight.arena().session().winner() {
            break winner;
        }
        fight.attack(strategy.choose(turns))?;
        while let Some(fired) = fight.advance().await {
            hits += fired.len();
            write_logs(fight, out)?;
        }
        turns += 1;
    };

    tracing::info!(?winner, turns, hits, "automatic fight finished");
    Ok(AutoOutcome {
        winner,
        turns,
        hits,
    })
}

/// Save progress after a won fight.
async fn record_result(
    fight: &mut HeadlessArena,
    progress: &mut ArenaProgress,
    path: &std::path::Path,
) {
    let Some(winner) = fight.arena().session().winner() else {
        return;
    };
    println!("[STATUS] {}", winner_label(winner));
    if winner != Side::Player {
        return;
    }

    let level = fight.level();
    if progress.record_victory(level) {
        println!("[STATUS] Level {} unlocked", level.next());
    }
    if let Err(e) = save_progress(path, progress).await {
        tracing::warn!(error = %e, "failed to save progress");
        println!("[ERROR] Could not save progress: {e}");
    }
}

fn winner_label(winner: Side) -> &'static str {
    match winner {
        Side::Player => "Victory",
        Side::Enemy => "Defeat",
    }
}

fn print_status(fight: &HeadlessArena) {
    let session = fight.arena().session();
    let level = levels::describe(fight.level());
    println!("[STATUS]");
    println!(
        "  Level: {} - {} ({})",
        level.level, level.name, level.difficulty
    );
    println!(
        "  {}: {}/{}",
        session.player().name,
        session.player().health(),
        session.player().max_health()
    );
    println!(
        "  {}: {}/{}",
        session.enemy().name,
        session.enemy().health(),
        session.enemy().max_health()
    );
    println!("  Phase: {:?}", session.phase());
}

fn print_levels(progress: &ArenaProgress) {
    println!("[LEVELS]");
    for level in levels::catalog() {
        let marker = if progress.is_completed(level.level) {
            "done"
        } else if progress.is_unlocked(level.level) {
            "open"
        } else {
            "locked"
        };
        println!(
            "  {}. {} [{}] {} - {}",
            level.level, level.name, marker, level.difficulty, level.environment
        );
    }
}

fn print_help() {
    println!("Actions:");
    println!("  start     - Begin the fight");
    println!("  attack    - Normal attack");
    println!("  special   - Special attack");
    println!("  restart   - Fight a new enemy at this level");
    println!("  next      - Move on to the next level after a victory");
    println!("Commands:");
    println!("  #status   - Show fighters and turn");
    println!("  #levels   - Show level progress");
    println!("  #help     - Show this help");
    println!("  #quit     - Exit");
}
