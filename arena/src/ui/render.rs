//! Render orchestration for the arena TUI

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use arena_core::{AttackKind, Phase, Side};

use crate::app::{App, ArenaView, Screen, ScreenKind};
use crate::ui::layout::{centered_rect_fixed, AppLayout, ArenaLayout};
use crate::ui::widgets::{
    CharacterFormWidget, CombatLogWidget, FighterPanelWidget, LevelListWidget, RosterWidget,
};

/// Main render function
pub fn render(frame: &mut Frame, app: &App, now: Instant) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);

    match &app.screen {
        Screen::Levels => {
            let levels = app.levels();
            let widget = LevelListWidget::new(&levels, &app.progress, &app.theme)
                .selected(app.level_index);
            frame.render_widget(widget, layout.content_area);
        }
        Screen::Roster => {
            let image_url = app
                .selected_roster_character()
                .and_then(|c| app.api.image_url(c));
            let widget = RosterWidget::new(&app.roster, &app.theme)
                .selected(app.roster_index)
                .image_url(image_url);
            frame.render_widget(widget, layout.content_area);
        }
        Screen::Form(form) => {
            frame.render_widget(CharacterFormWidget::new(form, &app.theme), layout.content_area);
        }
        Screen::Arena(view) => render_arena(frame, app, view, layout.content_area, now),
        Screen::NotAuthenticated => render_not_authenticated(frame, app, layout.content_area),
    }

    render_status_bar(frame, app, layout.status_bar);
    render_hotkey_bar(frame, app, layout.hotkey_bar);

    if app.show_help {
        render_help_overlay(frame, app, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.screen {
        Screen::Arena(view) => {
            let level = arena_core::levels::describe(view.level());
            format!(" ⚔ {} - Level {} ⚔ ", level.name, level.level)
        }
        _ => " ⚔ Fighter Arena ⚔ ".to_string(),
    };

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_arena(frame: &mut Frame, app: &App, view: &ArenaView, area: Rect, now: Instant) {
    let layout = ArenaLayout::calculate(area);
    let combat = view.session.combat();
    let phase = view.phase();

    let banner = match phase {
        Phase::NotStarted => Span::styled("Press s to start the fight", app.theme.system_style()),
        Phase::PlayerTurn => Span::styled("YOUR TURN", app.theme.turn_style(true)),
        Phase::Striking(AttackKind::Normal) => Span::styled("Attacking...", app.theme.turn_style(true)),
        Phase::Striking(AttackKind::Special) => {
            Span::styled("Special attack...", app.theme.turn_style(true))
        }
        Phase::EnemyTurn => Span::styled("Enemy's turn", app.theme.turn_style(false)),
        Phase::Finished(Side::Player) => Span::styled("VICTORY!", app.theme.turn_style(true)),
        Phase::Finished(Side::Enemy) => Span::styled("DEFEAT", app.theme.turn_style(false)),
    };
    frame.render_widget(
        Paragraph::new(Line::from(banner)).alignment(Alignment::Center),
        layout.turn_banner,
    );

    let callout = view.callout.as_ref();
    let player = FighterPanelWidget::new(combat.player(), &view.player_bar, &app.theme, now)
        .callout(callout.filter(|c| c.target == Side::Player))
        .active(matches!(phase, Phase::PlayerTurn | Phase::Striking(_)));
    frame.render_widget(player, layout.player_area);

    let enemy = FighterPanelWidget::new(combat.enemy(), &view.enemy_bar, &app.theme, now)
        .callout(callout.filter(|c| c.target == Side::Enemy))
        .active(phase == Phase::EnemyTurn);
    frame.render_widget(enemy, layout.enemy_area);

    let log = CombatLogWidget::new(combat.logs(), &app.theme).scroll_back(view.log_scroll);
    frame.render_widget(log, layout.log_area);
}

fn render_not_authenticated(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(64, 12, area);

    let text = vec![
        Line::from(Span::styled(
            "Not authenticated",
            app.theme.callout_style(false),
        )),
        Line::from(""),
        Line::from("No valid token is stored. Log in with one of:"),
        Line::from(""),
        Line::from("  arena --token <JWT>"),
        Line::from("  arena --register --email <E> --pseudo <P> --password <PW>"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Token file: {}", app.tokens.path().display()),
            app.theme.system_style(),
        )),
    ];

    let block = Block::default()
        .title(" Login Required ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        popup_area,
    );
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    if let Screen::Arena(view) = &app.screen {
        let combat = view.session.combat();
        let ratio = combat.player().health_ratio();
        spans.push(Span::styled(
            format!(
                "HP: {}/{}",
                combat.player().health(),
                combat.player().max_health()
            ),
            Style::default().fg(app.theme.hp_color(ratio)),
        ));
        spans.push(Span::raw(" | "));
    }

    spans.push(Span::styled(
        format!("Unlocked: {}", app.progress.highest_unlocked()),
        app.theme.text_style(),
    ));

    if let Some(message) = app.status() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the hotkey bar
fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match app.screen_kind() {
        ScreenKind::Levels => &[("↑↓", "Select"), ("Enter", "Play"), ("?", "Help"), ("q", "Quit")],
        ScreenKind::Roster => &[
            ("↑↓", "Select"),
            ("Enter", "Fight"),
            ("n", "New"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("r", "Reload"),
            ("Esc", "Back"),
        ],
        ScreenKind::Form => &[
            ("Tab", "Next field"),
            ("←→", "Adjust"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
        ScreenKind::Arena => &[
            ("s", "Start"),
            ("a", "Attack"),
            ("x", "Special"),
            ("r", "Restart"),
            ("n", "Next level"),
            ("Esc", "Leave"),
        ],
        ScreenKind::NotAuthenticated => &[("q", "Quit")],
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::styled(format!(" {action}  "), app.theme.system_style()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(52, 20, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Fighter Arena - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Fighting:"),
        Line::from("  s / Enter   Start the fight"),
        Line::from("  a           Normal attack"),
        Line::from("  x           Special attack (x1.2 damage)"),
        Line::from("  r           Restart against a new enemy"),
        Line::from("  n           Next level after a victory"),
        Line::from("  PgUp/PgDn   Scroll the combat log"),
        Line::from(""),
        heading("Roster:"),
        Line::from("  n / e / d   New, edit, delete a fighter"),
        Line::from(""),
        heading("Anywhere:"),
        Line::from("  ?           Toggle this help"),
        Line::from("  Ctrl+c      Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use arena_api::{ApiConfig, ArenaApi, TokenStore};
    use arena_core::testing::sample_character;
    use arena_core::{ArenaProgress, ArenaSession, Level, Pacing};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, Terminal};

    fn app(token: Option<&str>) -> App {
        let mut api = ArenaApi::new(ApiConfig::new("http://127.0.0.1:9")).unwrap();
        api.set_token(token.map(str::to_string));
        App::new(
            api,
            TokenStore::new("/tmp/arena-token"),
            ArenaProgress::new(),
            PathBuf::from("/tmp/progress.json"),
            Pacing::instant(),
        )
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, app, Instant::now()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_login_instructions() {
        let text = screen_text(&app(None));
        assert!(text.contains("Not authenticated"));
        assert!(text.contains("--token"));
    }

    #[test]
    fn test_render_arena_shows_both_fighters() {
        let mut app = app(Some("jwt"));
        let session = ArenaSession::from_character(
            sample_character("Vex"),
            Level::FIRST,
            Pacing::instant(),
            StdRng::seed_from_u64(3),
        );
        app.arena_opened(session);

        let text = screen_text(&app);
        assert!(text.contains("Vex"));
        assert!(text.contains("Enemy Level 1"));
        assert!(text.contains("HP: 200/200"));
        assert!(text.contains("A wild Enemy Level 1 appears!"));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = app(Some("jwt"));
        app.show_help = true;
        let text = screen_text(&app);
        assert!(text.contains("Fighter Arena - Help"));
    }
}
