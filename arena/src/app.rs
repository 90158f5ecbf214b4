//! Main application state and logic

use std::path::{Path, PathBuf};
use std::time::Instant;

use arena_api::{ArenaApi, Character, CharacterForm, ImageUpload, TokenStore, STAT_MAX, STAT_MIN};
use arena_core::animation::{DamageCallout, HealthBar};
use arena_core::levels::{self, ArenaLevel, ArenaProgress};
use arena_core::{ArenaSession, AttackKind, Hit, Level, Pacing, Phase, Side};

use crate::ui::theme::ArenaTheme;

/// Work that needs the network or the disk. The main loop takes it with
/// [`App::take_pending`] and reports the outcome back to the app.
#[derive(Debug, Clone)]
pub enum PendingRequest {
    LoadRoster,
    OpenArena { character_id: u64, level: Level },
    SaveCharacter { id: Option<u64>, form: FormState },
    DeleteCharacter(u64),
    SaveProgress,
}

/// Which screen is showing, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Levels,
    Roster,
    Form,
    Arena,
    NotAuthenticated,
}

pub enum Screen {
    Levels,
    Roster,
    Form(FormState),
    Arena(Box<ArenaView>),
    NotAuthenticated,
}

/// Field labels of the character form, in focus order after name and image.
pub const STAT_LABELS: [&str; 5] = ["Strength", "Speed", "Durability", "Power", "Combat"];

const NAME_FIELD: usize = 0;
const IMAGE_FIELD: usize = 1;
const FIRST_STAT_FIELD: usize = 2;
const SUBMIT_FIELD: usize = FIRST_STAT_FIELD + STAT_LABELS.len();
const FIELD_COUNT: usize = SUBMIT_FIELD + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Image,
    Stat(usize),
    Submit,
}

/// Character create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Id of the character being edited, `None` when creating.
    pub editing: Option<u64>,
    pub name: String,
    /// Local path of an image to upload.
    pub image_path: String,
    pub stats: [u32; 5],
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        let defaults = CharacterForm::new("");
        Self {
            editing: None,
            name: String::new(),
            image_path: String::new(),
            stats: defaults.stats().map(|(_, value)| value),
            focus: NAME_FIELD,
            error: None,
        }
    }

    pub fn from_character(character: &Character) -> Self {
        let form = CharacterForm::from_character(character);
        Self {
            editing: Some(character.id),
            name: form.name.clone(),
            stats: form.stats().map(|(_, value)| value),
            ..Self::new()
        }
    }

    pub fn focused_field(&self) -> FormField {
        match self.focus {
            NAME_FIELD => FormField::Name,
            IMAGE_FIELD => FormField::Image,
            SUBMIT_FIELD => FormField::Submit,
            n => FormField::Stat(n - FIRST_STAT_FIELD),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// Nudge the focused stat, staying within the allowed range.
    pub fn adjust(&mut self, delta: i64) {
        if let FormField::Stat(index) = self.focused_field() {
            let value = i64::from(self.stats[index]) + delta;
            self.stats[index] = value.clamp(i64::from(STAT_MIN), i64::from(STAT_MAX)) as u32;
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.focused_field() {
            FormField::Name => self.name.push(c),
            FormField::Image => self.image_path.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focused_field() {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Image => {
                self.image_path.pop();
            }
            _ => {}
        }
    }

    /// The API payload, without the image.
    pub fn to_form(&self) -> CharacterForm {
        let [strength, speed, durability, power, combat] = self.stats;
        CharacterForm {
            strength,
            speed,
            durability,
            power,
            combat,
            ..CharacterForm::new(self.name.trim())
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an image file for upload, guessing its type from the extension.
pub async fn read_image(path: &Path) -> std::io::Result<ImageUpload> {
    let bytes = tokio::fs::read(path).await?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageUpload {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// The arena screen: a session plus what is drawn for it.
pub struct ArenaView {
    pub session: ArenaSession,
    pub player_bar: HealthBar,
    pub enemy_bar: HealthBar,
    pub callout: Option<DamageCallout>,
    /// Combat log lines scrolled up from the newest entry.
    pub log_scroll: usize,
    victory_recorded: bool,
}

impl ArenaView {
    pub fn new(session: ArenaSession) -> Self {
        let combat = session.combat();
        let player_bar = HealthBar::new(combat.player().health(), combat.player().max_health());
        let enemy_bar = HealthBar::new(combat.enemy().health(), combat.enemy().max_health());
        Self {
            session,
            player_bar,
            enemy_bar,
            callout: None,
            log_scroll: 0,
            victory_recorded: false,
        }
    }

    /// Fire due steps and start the matching animations.
    pub fn tick(&mut self, now: Instant) -> Vec<Hit> {
        let hits = self.session.tick(now);
        for hit in &hits {
            match hit.target() {
                Side::Enemy => self.enemy_bar.set_target(hit.remaining, now),
                Side::Player => self.player_bar.set_target(hit.remaining, now),
            }
            self.callout = Some(DamageCallout::from_hit(hit, now));
        }
        if self
            .callout
            .is_some_and(|callout| !callout.is_visible(now))
        {
            self.callout = None;
        }
        hits
    }

    /// Animate the bars back to full after a restart.
    fn refresh_bars(&mut self, now: Instant) {
        let combat = self.session.combat();
        self.player_bar.set_target(combat.player().health(), now);
        self.enemy_bar
            .reset(combat.enemy().health(), combat.enemy().max_health());
        self.callout = None;
        self.log_scroll = 0;
        self.victory_recorded = false;
    }

    pub fn restart(&mut self, now: Instant) {
        self.session.restart();
        self.refresh_bars(now);
    }

    pub fn next_level(&mut self, now: Instant) -> Option<Level> {
        let level = self.session.next_level().ok()?;
        self.refresh_bars(now);
        Some(level)
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        let max = self.session.combat().logs().len().saturating_sub(1);
        self.log_scroll = (self.log_scroll + lines).min(max);
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(lines);
    }

    pub fn level(&self) -> Level {
        self.session.level()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }
}

/// Main application state
pub struct App {
    pub api: ArenaApi,
    pub tokens: TokenStore,
    pub progress: ArenaProgress,
    pub progress_path: PathBuf,
    pub pacing: Pacing,
    pub theme: ArenaTheme,
    pub screen: Screen,

    pub roster: Vec<Character>,
    pub roster_index: usize,
    pub level_index: usize,
    pub chosen_level: Level,
    pub selected_character: Option<u64>,

    pub show_help: bool,
    pub should_quit: bool,
    pending: Option<PendingRequest>,
    status_message: Option<String>,
}

impl App {
    pub fn new(
        api: ArenaApi,
        tokens: TokenStore,
        progress: ArenaProgress,
        progress_path: PathBuf,
        pacing: Pacing,
    ) -> Self {
        let screen = if api.token().is_some() {
            Screen::Levels
        } else {
            Screen::NotAuthenticated
        };
        Self {
            api,
            tokens,
            progress,
            progress_path,
            pacing,
            theme: ArenaTheme::default(),
            screen,
            roster: Vec::new(),
            roster_index: 0,
            level_index: 0,
            chosen_level: Level::FIRST,
            selected_character: None,
            show_help: false,
            should_quit: false,
            pending: None,
            status_message: None,
        }
    }

    pub fn screen_kind(&self) -> ScreenKind {
        match self.screen {
            Screen::Levels => ScreenKind::Levels,
            Screen::Roster => ScreenKind::Roster,
            Screen::Form(_) => ScreenKind::Form,
            Screen::Arena(_) => ScreenKind::Arena,
            Screen::NotAuthenticated => ScreenKind::NotAuthenticated,
        }
    }

    // ------------------------------------------------------------------
    // Status and pending work
    // ------------------------------------------------------------------

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn request(&mut self, request: PendingRequest) {
        tracing::debug!(?request, "queued request");
        self.pending = Some(request);
    }

    pub fn take_pending(&mut self) -> Option<PendingRequest> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The stored token was rejected or is missing.
    pub fn auth_lost(&mut self) {
        tracing::warn!("authentication lost");
        self.api.set_token(None);
        self.screen = Screen::NotAuthenticated;
        self.set_status("Not authenticated");
    }

    // ------------------------------------------------------------------
    // Level select
    // ------------------------------------------------------------------

    /// Catalog levels plus any unlocked level beyond them.
    pub fn levels(&self) -> Vec<ArenaLevel> {
        let mut list = levels::catalog();
        let mut next = list.last().map(|l| l.level.next()).unwrap_or(Level::FIRST);
        while self.progress.is_unlocked(next) {
            list.push(levels::describe(next));
            next = next.next();
        }
        list
    }

    pub fn level_up(&mut self) {
        self.level_index = self.level_index.saturating_sub(1);
    }

    pub fn level_down(&mut self) {
        let count = self.levels().len();
        if self.level_index + 1 < count {
            self.level_index += 1;
        }
    }

    pub fn select_level(&mut self) {
        let Some(level) = self.levels().get(self.level_index).map(|l| l.level) else {
            return;
        };
        if !self.progress.is_unlocked(level) {
            self.set_status(format!("Level {level} is locked"));
            return;
        }
        self.chosen_level = level;
        self.show_roster();
    }

    pub fn show_levels(&mut self) {
        self.screen = Screen::Levels;
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    pub fn show_roster(&mut self) {
        self.screen = Screen::Roster;
        self.request(PendingRequest::LoadRoster);
    }

    pub fn roster_loaded(&mut self, characters: Vec<Character>) {
        tracing::debug!(count = characters.len(), "roster loaded");
        self.roster = characters;
        if self.roster_index >= self.roster.len() {
            self.roster_index = self.roster.len().saturating_sub(1);
        }
        if self.roster.is_empty() && self.screen_kind() == ScreenKind::Roster {
            self.screen = Screen::Form(FormState::new());
            self.set_status("Create a fighter to enter the arena");
        }
    }

    pub fn selected_roster_character(&self) -> Option<&Character> {
        self.roster.get(self.roster_index)
    }

    pub fn roster_up(&mut self) {
        self.roster_index = self.roster_index.saturating_sub(1);
    }

    pub fn roster_down(&mut self) {
        if self.roster_index + 1 < self.roster.len() {
            self.roster_index += 1;
        }
    }

    /// Pick the highlighted fighter and enter the arena.
    pub fn choose_character(&mut self) {
        let Some(id) = self.selected_roster_character().map(|c| c.id) else {
            self.set_status("No character selected");
            return;
        };
        self.selected_character = Some(id);
        self.request(PendingRequest::OpenArena {
            character_id: id,
            level: self.chosen_level,
        });
    }

    pub fn new_character(&mut self) {
        self.screen = Screen::Form(FormState::new());
    }

    pub fn edit_character(&mut self) {
        if let Some(character) = self.selected_roster_character() {
            self.screen = Screen::Form(FormState::from_character(character));
        }
    }

    pub fn delete_character(&mut self) {
        if let Some(id) = self.selected_roster_character().map(|c| c.id) {
            self.request(PendingRequest::DeleteCharacter(id));
        }
    }

    // ------------------------------------------------------------------
    // Character form
    // ------------------------------------------------------------------

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        match &mut self.screen {
            Screen::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn submit_form(&mut self) {
        let Some(form) = self.form_mut() else {
            return;
        };
        if let Err(e) = form.to_form().validate() {
            form.error = Some(e.to_string());
            return;
        }
        form.error = None;
        let request = PendingRequest::SaveCharacter {
            id: form.editing,
            form: form.clone(),
        };
        self.request(request);
    }

    pub fn form_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.form_mut() {
            Some(form) => form.error = Some(message),
            None => self.set_status(message),
        }
    }

    pub fn character_saved(&mut self, character: Character) {
        self.set_status(format!("Saved {}", character.name));
        self.show_roster();
    }

    // ------------------------------------------------------------------
    // Arena
    // ------------------------------------------------------------------

    pub fn arena_mut(&mut self) -> Option<&mut ArenaView> {
        match &mut self.screen {
            Screen::Arena(view) => Some(view),
            _ => None,
        }
    }

    pub fn arena_opened(&mut self, session: ArenaSession) {
        self.clear_status();
        self.screen = Screen::Arena(Box::new(ArenaView::new(session)));
    }

    pub fn start_fight(&mut self) {
        if let Some(view) = self.arena_mut() {
            if let Err(e) = view.session.start() {
                tracing::debug!(error = %e, "start ignored");
            }
        }
    }

    /// Attack keys are ignored unless it is the player's turn.
    pub fn attack(&mut self, kind: AttackKind, now: Instant) {
        if let Some(view) = self.arena_mut() {
            if !view.session.combat().can_attack() {
                return;
            }
            if let Err(e) = view.session.attack(kind, now) {
                tracing::debug!(error = %e, "attack ignored");
            }
        }
    }

    pub fn restart_fight(&mut self, now: Instant) {
        if let Some(view) = self.arena_mut() {
            view.restart(now);
        }
    }

    pub fn next_level(&mut self, now: Instant) {
        let advanced = self.arena_mut().and_then(|view| view.next_level(now));
        match advanced {
            Some(level) => {
                self.chosen_level = level;
                self.set_status(format!("Level {level}"));
            }
            None => self.set_status("Win the fight to reach the next level"),
        }
    }

    pub fn leave_arena(&mut self) {
        self.screen = Screen::Levels;
    }

    /// Advance timers. Records victories in the progress file.
    pub fn tick(&mut self, now: Instant) {
        let Some(view) = self.arena_mut() else {
            return;
        };
        view.tick(now);

        let won = view.session.combat().winner() == Some(Side::Player);
        if won && !view.victory_recorded {
            view.victory_recorded = true;
            let level = view.level();
            if self.progress.record_victory(level) {
                self.set_status(format!("Victory! Level {} unlocked", level.next()));
            } else {
                self.set_status("Victory!");
            }
            self.request(PendingRequest::SaveProgress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_api::ApiConfig;
    use arena_core::testing::sample_character;

    fn app() -> App {
        let api = ArenaApi::new(ApiConfig::new("http://127.0.0.1:9"))
            .unwrap()
            .with_token("jwt");
        App::new(
            api,
            TokenStore::new("/nonexistent/token"),
            ArenaProgress::new(),
            PathBuf::from("/nonexistent/progress.json"),
            Pacing::instant(),
        )
    }

    #[test]
    fn test_starts_on_levels_with_token() {
        let app = app();
        assert_eq!(app.screen_kind(), ScreenKind::Levels);
        assert_eq!(app.levels().len(), 5);
    }

    #[test]
    fn test_starts_unauthenticated_without_token() {
        let api = ArenaApi::new(ApiConfig::new("http://127.0.0.1:9")).unwrap();
        let app = App::new(
            api,
            TokenStore::new("/nonexistent/token"),
            ArenaProgress::new(),
            PathBuf::new(),
            Pacing::default(),
        );
        assert_eq!(app.screen_kind(), ScreenKind::NotAuthenticated);
    }

    #[test]
    fn test_locked_level_is_refused() {
        let mut app = app();
        app.level_down();
        app.select_level();
        assert_eq!(app.screen_kind(), ScreenKind::Levels);
        assert!(app.status().unwrap().contains("locked"));
        assert!(!app.has_pending());
    }

    #[test]
    fn test_select_level_loads_roster() {
        let mut app = app();
        app.select_level();
        assert_eq!(app.screen_kind(), ScreenKind::Roster);
        assert!(matches!(app.take_pending(), Some(PendingRequest::LoadRoster)));
    }

    #[test]
    fn test_empty_roster_redirects_to_form() {
        let mut app = app();
        app.select_level();
        app.roster_loaded(Vec::new());
        assert_eq!(app.screen_kind(), ScreenKind::Form);
    }

    #[test]
    fn test_choose_character_requests_arena() {
        let mut app = app();
        app.select_level();
        app.take_pending();
        app.roster_loaded(vec![sample_character("Vex")]);
        app.choose_character();
        match app.take_pending() {
            Some(PendingRequest::OpenArena {
                character_id,
                level,
            }) => {
                assert_eq!(character_id, 1);
                assert_eq!(level, Level::FIRST);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_form_editing() {
        let mut form = FormState::new();
        assert_eq!(form.stats, [50; 5]);
        for c in "Brakka".chars() {
            form.input_char(c);
        }
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focused_field(), FormField::Stat(0));
        form.adjust(80);
        assert_eq!(form.stats[0], 100);
        form.adjust(-150);
        assert_eq!(form.stats[0], 0);
        form.focus_prev();
        form.focus_prev();
        form.backspace();
        assert_eq!(form.name, "Brakk");
        assert_eq!(form.to_form().strength, 0);
    }

    #[test]
    fn test_submit_blank_form_shows_error() {
        let mut app = app();
        app.new_character();
        app.submit_form();
        assert!(!app.has_pending());
        assert_eq!(
            app.form_mut().unwrap().error.as_deref(),
            Some("name must not be empty")
        );
    }

    #[tokio::test]
    async fn test_read_image_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Portrait.PNG");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let image = read_image(&path).await.unwrap();
        assert_eq!(image.file_name, "Portrait.PNG");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes.len(), 4);

        assert!(read_image(&dir.path().join("missing.png")).await.is_err());
    }

    #[test]
    fn test_victory_is_recorded_once() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        // 2100 health outlasts any level 1 enemy, so the player always wins
        let mut character = sample_character("Vex");
        character.durability = 1000;
        let session = ArenaSession::from_character(
            character,
            Level::FIRST,
            Pacing::instant(),
            StdRng::seed_from_u64(17),
        );
        let mut app = app();
        app.arena_opened(session);
        app.start_fight();

        let now = Instant::now();
        for _ in 0..100 {
            app.attack(AttackKind::Special, now);
            app.tick(now);
        }

        let winner = app.arena_mut().unwrap().session.combat().winner();
        assert_eq!(winner, Some(Side::Player));
        assert!(app.progress.is_completed(Level::FIRST));
        assert!(app.progress.is_unlocked(Level::FIRST.next()));
        assert!(matches!(app.take_pending(), Some(PendingRequest::SaveProgress)));

        // Further ticks after the win do not record it again
        app.tick(now);
        app.tick(now);
        assert!(!app.has_pending());
    }
}
