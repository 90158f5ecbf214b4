//! Event handling for the arena TUI

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use arena_core::AttackKind;

use crate::app::{App, PendingRequest, ScreenKind};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event, now: Instant) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key, now),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Mouse wheel scrolls the combat log
fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    let Some(view) = app.arena_mut() else {
        return EventResult::Continue;
    };
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            view.scroll_log_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            view.scroll_log_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    let screen = app.screen_kind();

    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return EventResult::NeedsRedraw;
    }

    // '?' is typed text inside the form
    if key.code == KeyCode::Char('?') && screen != ScreenKind::Form {
        app.show_help = true;
        return EventResult::NeedsRedraw;
    }

    match screen {
        ScreenKind::Levels => handle_levels_key(app, key),
        ScreenKind::Roster => handle_roster_key(app, key),
        ScreenKind::Form => handle_form_key(app, key),
        ScreenKind::Arena => handle_arena_key(app, key, now),
        ScreenKind::NotAuthenticated => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => EventResult::Quit,
            _ => EventResult::Continue,
        },
    }
}

fn handle_levels_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.level_up(),
        KeyCode::Down | KeyCode::Char('j') => app.level_down(),
        KeyCode::Enter => app.select_level(),
        KeyCode::Char('q') | KeyCode::Esc => return EventResult::Quit,
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_roster_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.roster_up(),
        KeyCode::Down | KeyCode::Char('j') => app.roster_down(),
        KeyCode::Enter => app.choose_character(),
        KeyCode::Char('n') => app.new_character(),
        KeyCode::Char('e') => app.edit_character(),
        KeyCode::Char('d') => app.delete_character(),
        KeyCode::Char('r') => app.request(PendingRequest::LoadRoster),
        KeyCode::Esc => app.show_levels(),
        KeyCode::Char('q') => return EventResult::Quit,
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> EventResult {
    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
        10
    } else {
        1
    };

    match key.code {
        KeyCode::Esc => {
            app.show_roster();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Enter => {
            app.submit_form();
            return EventResult::NeedsRedraw;
        }
        _ => {}
    }

    let Some(form) = app.form_mut() else {
        return EventResult::Continue;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left => form.adjust(-step),
        KeyCode::Right => form.adjust(step),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_arena_key(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    match key.code {
        KeyCode::Char('s') | KeyCode::Enter => app.start_fight(),
        KeyCode::Char('a') => app.attack(AttackKind::Normal, now),
        KeyCode::Char('x') => app.attack(AttackKind::Special, now),
        KeyCode::Char('r') => app.restart_fight(now),
        KeyCode::Char('n') => app.next_level(now),
        KeyCode::PageUp => {
            if let Some(view) = app.arena_mut() {
                view.scroll_log_up(5);
            }
        }
        KeyCode::PageDown => {
            if let Some(view) = app.arena_mut() {
                view.scroll_log_down(5);
            }
        }
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => app.leave_arena(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}
