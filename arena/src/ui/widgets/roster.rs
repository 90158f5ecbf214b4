//! Character roster with a detail pane for the highlighted fighter

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use arena_api::Character;
use arena_core::Fighter;

use crate::ui::theme::ArenaTheme;
use crate::ui::widgets::StatRadarWidget;

pub struct RosterWidget<'a> {
    characters: &'a [Character],
    selected: usize,
    theme: &'a ArenaTheme,
    image_url: Option<String>,
}

impl<'a> RosterWidget<'a> {
    pub fn new(characters: &'a [Character], theme: &'a ArenaTheme) -> Self {
        Self {
            characters,
            selected: 0,
            theme,
            image_url: None,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    /// Resolved image location of the highlighted character.
    pub fn image_url(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }
}

impl Widget for RosterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let list_block = Block::default()
            .title(" Your Fighters ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let names: Vec<Line> = if self.characters.is_empty() {
            vec![Line::from(Span::styled("Loading...", self.theme.system_style()))]
        } else {
            self.characters
                .iter()
                .enumerate()
                .map(|(i, character)| {
                    let style = if i == self.selected {
                        self.theme.text_style().add_modifier(Modifier::REVERSED)
                    } else {
                        self.theme.text_style()
                    };
                    Line::from(Span::styled(format!(" {} ", character.name), style))
                })
                .collect()
        };
        Paragraph::new(names).block(list_block).render(chunks[0], buf);

        let detail_block = Block::default()
            .title(" Details ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let Some(character) = self.characters.get(self.selected) else {
            detail_block.render(chunks[1], buf);
            return;
        };

        let fighter = Fighter::from_character(character);
        let mut lines = vec![
            Line::from(Span::styled(
                character.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Max HP: {}", fighter.max_health())),
            Line::from(""),
        ];
        for (label, value) in fighter.attributes.labeled() {
            lines.push(Line::from(format!("{label:<11}{value}")));
        }
        if let Some(url) = self.image_url {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Image: {url}"),
                self.theme.system_style(),
            )));
        }

        let detail_area = detail_block.inner(chunks[1]);
        detail_block.render(chunks[1], buf);
        let detail_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(lines.len() as u16), Constraint::Min(0)])
            .split(detail_area);

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(detail_rows[0], buf);
        let stats = fighter.attributes.labeled().map(|(_, value)| value);
        StatRadarWidget::new(stats, self.theme).render(detail_rows[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::testing::sample_character;

    #[test]
    fn test_details_include_stat_chart() {
        let theme = ArenaTheme::default();
        let roster = vec![sample_character("Vex"), sample_character("Mora")];
        let area = Rect::new(0, 0, 80, 30);
        let mut buf = Buffer::empty(area);
        RosterWidget::new(&roster, &theme)
            .selected(1)
            .render(area, &mut buf);

        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        assert!(text.contains("Max HP: 200"));
        assert!(text.contains("Mora"));
        assert!(text.contains("STR"));
        assert!(text.contains("CMB"));
    }
}
