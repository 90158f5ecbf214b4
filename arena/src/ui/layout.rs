//! Layout calculations for the arena TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas shared by every screen.
pub struct AppLayout {
    pub title_area: Rect,
    pub content_area: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(8),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Hotkey bar
            ])
            .split(area);

        Self {
            title_area: chunks[0],
            content_area: chunks[1],
            status_bar: chunks[2],
            hotkey_bar: chunks[3],
        }
    }
}

/// Arena screen: both fighters side by side above the combat log.
pub struct ArenaLayout {
    pub turn_banner: Rect,
    pub player_area: Rect,
    pub enemy_area: Rect,
    pub log_area: Rect,
}

impl ArenaLayout {
    pub fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Turn banner
                Constraint::Length(10), // Fighters
                Constraint::Min(4),     // Log
            ])
            .split(area);

        let fighters = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        Self {
            turn_banner: rows[0],
            player_area: fighters[0],
            enemy_area: fighters[1],
            log_area: rows[2],
        }
    }
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
