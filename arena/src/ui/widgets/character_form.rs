//! Character create/edit form

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph, Widget},
};

use arena_api::STAT_MAX;

use crate::app::{FormField, FormState, STAT_LABELS};
use crate::ui::theme::ArenaTheme;
use crate::ui::widgets::StatRadarWidget;

pub struct CharacterFormWidget<'a> {
    form: &'a FormState,
    theme: &'a ArenaTheme,
}

impl<'a> CharacterFormWidget<'a> {
    pub fn new(form: &'a FormState, theme: &'a ArenaTheme) -> Self {
        Self { form, theme }
    }

    fn text_field(&self, label: &str, value: &str, placeholder: &str, focused: bool) -> Paragraph<'static> {
        let block = Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(focused));

        let line = if value.is_empty() {
            Line::from(Span::styled(
                placeholder.to_string(),
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else if focused {
            Line::from(vec![
                Span::styled(value.to_string(), self.theme.text_style()),
                Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ])
        } else {
            Line::from(Span::styled(value.to_string(), self.theme.text_style()))
        };

        Paragraph::new(line).block(block)
    }
}

impl Widget for CharacterFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.form.editing.is_some() {
            " Edit Fighter "
        } else {
            " New Fighter "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));
        let mut inner = block.inner(area);
        block.render(area, buf);

        // Chart the stats beside the fields when there is room
        if inner.width >= 72 {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(40), Constraint::Length(32)])
                .split(inner);
            inner = columns[0];
            StatRadarWidget::new(self.form.stats, self.theme)
                .block(Block::default().title(" Stats ").borders(Borders::LEFT))
                .render(columns[1], buf);
        }

        let mut constraints = vec![Constraint::Length(3), Constraint::Length(3)];
        constraints.extend(STAT_LABELS.iter().map(|_| Constraint::Length(1)));
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // submit
        constraints.push(Constraint::Min(0)); // error
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let focus = self.form.focused_field();

        self.text_field("Name", &self.form.name, "Fighter name", focus == FormField::Name)
            .render(rows[0], buf);
        self.text_field(
            "Image",
            &self.form.image_path,
            "Path to an image (optional)",
            focus == FormField::Image,
        )
        .render(rows[1], buf);

        for (i, label) in STAT_LABELS.iter().enumerate() {
            let value = self.form.stats[i];
            let focused = focus == FormField::Stat(i);
            let label_style = if focused {
                self.theme.title_style(true)
            } else {
                self.theme.text_style()
            };
            LineGauge::default()
                .label(Span::styled(format!("{label:<11}{value:>4} "), label_style))
                .filled_style(self.theme.border_style(focused))
                .line_set(symbols::line::THICK)
                .ratio(f64::from(value) / f64::from(STAT_MAX))
                .render(rows[2 + i], buf);
        }

        let submit_row = rows[2 + STAT_LABELS.len() + 1];
        let submit_style = if focus == FormField::Submit {
            self.theme.title_style(true).add_modifier(Modifier::REVERSED)
        } else {
            self.theme.text_style()
        };
        Paragraph::new(Line::from(Span::styled("[ Save ]", submit_style))).render(submit_row, buf);

        if let Some(error) = &self.form.error {
            let error_row = rows[2 + STAT_LABELS.len() + 2];
            Paragraph::new(Line::from(Span::styled(
                error.clone(),
                self.theme.callout_style(false),
            )))
            .render(error_row, buf);
        }
    }
}
