//! Color theme and styling for the arena TUI

use ratatui::style::{Color, Modifier, Style};

use arena_core::CombatLog;

/// Arena UI color theme
#[derive(Debug, Clone)]
pub struct ArenaTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // HP colors
    pub hp_healthy: Color,
    pub hp_wounded: Color,
    pub hp_critical: Color,

    // Log colors
    pub player_text: Color,
    pub enemy_text: Color,
    pub critical_text: Color,
    pub heal_text: Color,
    pub system_text: Color,

    // Level select
    pub locked: Color,
    pub completed: Color,

    // Turn indicators
    pub player_turn: Color,
    pub enemy_turn: Color,
}

impl Default for ArenaTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            hp_healthy: Color::Green,
            hp_wounded: Color::Yellow,
            hp_critical: Color::Red,

            player_text: Color::Cyan,
            enemy_text: Color::LightRed,
            critical_text: Color::Yellow,
            heal_text: Color::LightGreen,
            system_text: Color::DarkGray,

            locked: Color::DarkGray,
            completed: Color::Green,

            player_turn: Color::LightGreen,
            enemy_turn: Color::LightRed,
        }
    }
}

impl ArenaTheme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Style for a combat log entry: heals first, then criticals, then by side.
    pub fn log_style(&self, log: &CombatLog) -> Style {
        if log.is_heal {
            Style::default().fg(self.heal_text)
        } else if log.is_critical {
            Style::default()
                .fg(self.critical_text)
                .add_modifier(Modifier::BOLD)
        } else if log.is_player() {
            Style::default().fg(self.player_text)
        } else {
            Style::default().fg(self.enemy_text)
        }
    }

    /// Get HP bar color based on ratio
    pub fn hp_color(&self, ratio: f64) -> Color {
        if ratio > 0.5 {
            self.hp_healthy
        } else if ratio > 0.25 {
            self.hp_wounded
        } else {
            self.hp_critical
        }
    }

    /// Style for the floating damage number.
    pub fn callout_style(&self, is_critical: bool) -> Style {
        let style = Style::default().fg(self.hp_critical).add_modifier(Modifier::BOLD);
        if is_critical {
            style.fg(self.critical_text).add_modifier(Modifier::SLOW_BLINK)
        } else {
            style
        }
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Style for the turn banner
    pub fn turn_style(&self, is_player: bool) -> Style {
        let color = if is_player {
            self.player_turn
        } else {
            self.enemy_turn
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn level_style(&self, unlocked: bool, completed: bool, selected: bool) -> Style {
        let style = if !unlocked {
            Style::default().fg(self.locked)
        } else if completed {
            Style::default().fg(self.completed)
        } else {
            self.text_style()
        };
        if selected {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}
