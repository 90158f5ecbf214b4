//! Level select list

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use arena_core::levels::{ArenaLevel, ArenaProgress};

use crate::ui::theme::ArenaTheme;

pub struct LevelListWidget<'a> {
    levels: &'a [ArenaLevel],
    progress: &'a ArenaProgress,
    selected: usize,
    theme: &'a ArenaTheme,
}

impl<'a> LevelListWidget<'a> {
    pub fn new(levels: &'a [ArenaLevel], progress: &'a ArenaProgress, theme: &'a ArenaTheme) -> Self {
        Self {
            levels,
            progress,
            selected: 0,
            theme,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }
}

impl Widget for LevelListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Choose an Arena ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let lines: Vec<Line> = self
            .levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                let unlocked = self.progress.is_unlocked(level.level);
                let completed = self.progress.is_completed(level.level);
                let marker = if !unlocked {
                    "[locked]"
                } else if completed {
                    "[done]  "
                } else {
                    "        "
                };
                let style = self.theme.level_style(unlocked, completed, i == self.selected);
                Line::from(vec![
                    Span::styled(format!(" {marker} "), style),
                    Span::styled(format!("{:>3}. {:<20}", level.level.to_string(), level.name), style),
                    Span::styled(format!(" {:<7}", level.difficulty), style),
                    Span::styled(format!(" {}", level.environment), Style::default()),
                ])
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
