//! Fighter panel with animated health gauge

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use arena_core::animation::{DamageCallout, HealthBar};
use arena_core::Fighter;

use crate::ui::theme::ArenaTheme;

/// One fighter: name, health gauge, attributes and the latest damage taken.
pub struct FighterPanelWidget<'a> {
    fighter: &'a Fighter,
    bar: &'a HealthBar,
    theme: &'a ArenaTheme,
    now: Instant,
    callout: Option<&'a DamageCallout>,
    active: bool,
}

impl<'a> FighterPanelWidget<'a> {
    pub fn new(fighter: &'a Fighter, bar: &'a HealthBar, theme: &'a ArenaTheme, now: Instant) -> Self {
        Self {
            fighter,
            bar,
            theme,
            now,
            callout: None,
            active: false,
        }
    }

    pub fn callout(mut self, callout: Option<&'a DamageCallout>) -> Self {
        self.callout = callout;
        self
    }

    /// Highlight the border when it is this fighter's turn.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl Widget for FighterPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.fighter.name),
                self.theme.title_style(self.active),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.active));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // HP gauge
                Constraint::Length(1), // Damage callout
                Constraint::Min(0),    // Attributes
            ])
            .split(inner);

        let ratio = self.bar.ratio(self.now);
        let label = format!("HP: {}/{}", self.bar.value(self.now), self.bar.max());
        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.hp_color(ratio)))
            .ratio(ratio)
            .label(label)
            .render(chunks[0], buf);

        if let Some(callout) = self.callout.filter(|c| c.is_visible(self.now)) {
            let text = if callout.is_critical {
                format!("{} CRITICAL!", callout.label())
            } else {
                callout.label()
            };
            Paragraph::new(Line::from(Span::styled(
                text,
                self.theme.callout_style(callout.is_critical),
            )))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }

        let attributes: Vec<Line> = self
            .fighter
            .attributes
            .labeled()
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:<11}"), Style::default().add_modifier(Modifier::DIM)),
                    Span::styled(
                        value.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();
        Paragraph::new(attributes).render(chunks[2], buf);
    }
}
