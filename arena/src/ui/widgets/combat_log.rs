//! Combat log display widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use arena_core::CombatLog;

use crate::ui::theme::ArenaTheme;

/// Widget for the combat log, newest entry at the bottom.
pub struct CombatLogWidget<'a> {
    logs: &'a [CombatLog],
    theme: &'a ArenaTheme,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
}

impl<'a> CombatLogWidget<'a> {
    pub fn new(logs: &'a [CombatLog], theme: &'a ArenaTheme) -> Self {
        Self {
            logs,
            theme,
            scroll_back: 0,
        }
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }
}

impl Widget for CombatLogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Combat Log ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .logs
            .iter()
            .map(|log| {
                let marker = if log.is_player() { "> " } else { "< " };
                Line::from(vec![
                    Span::styled(marker, self.theme.system_style()),
                    Span::styled(log.message.clone(), self.theme.log_style(log)),
                ])
            })
            .collect();

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = max_scroll.saturating_sub(self.scroll_back);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::Side;

    #[test]
    fn test_renders_messages_in_order() {
        let theme = ArenaTheme::default();
        let logs = vec![
            CombatLog::new("A wild Enemy Level 1 appears!", Side::Enemy),
            CombatLog::new("The fight begins!", Side::Player),
        ];
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        CombatLogWidget::new(&logs, &theme).render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(row(1).contains("A wild Enemy Level 1 appears!"));
        assert!(row(2).contains("The fight begins!"));
    }
}
