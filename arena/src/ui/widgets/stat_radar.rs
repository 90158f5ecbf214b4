//! Radar chart of the five fighter stats

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Widget,
    },
};

use arena_api::STAT_MAX;

use crate::ui::theme::ArenaTheme;

/// Axis labels, clockwise from the top. Same order as `Attributes::labeled`.
const AXES: [&str; 5] = ["STR", "SPD", "DUR", "POW", "CMB"];

const LABEL_RADIUS: f64 = 1.15;

/// Pentagon chart with one axis per stat, scaled to `STAT_MAX`.
pub struct StatRadarWidget<'a> {
    stats: [u32; 5],
    theme: &'a ArenaTheme,
    block: Option<Block<'a>>,
}

impl<'a> StatRadarWidget<'a> {
    pub fn new(stats: [u32; 5], theme: &'a ArenaTheme) -> Self {
        Self {
            stats,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Unit-circle position of axis `i`.
fn vertex(i: usize) -> (f64, f64) {
    let angle = FRAC_PI_2 - TAU * i as f64 / AXES.len() as f64;
    (angle.cos(), angle.sin())
}

/// Points of the stat polygon, each axis scaled by its stat.
fn stat_points(stats: &[u32; 5]) -> [(f64, f64); 5] {
    std::array::from_fn(|i| {
        let ratio = f64::from(stats[i].min(STAT_MAX)) / f64::from(STAT_MAX);
        let (x, y) = vertex(i);
        (x * ratio, y * ratio)
    })
}

fn draw_polygon(ctx: &mut Context, points: &[(f64, f64); 5], color: Color) {
    for (i, &(x1, y1)) in points.iter().enumerate() {
        let (x2, y2) = points[(i + 1) % points.len()];
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

impl Widget for StatRadarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = Color::DarkGray;
        let fill = self.theme.hp_color(1.0);
        let label_style = self.theme.system_style();
        let outline: [(f64, f64); 5] = std::array::from_fn(vertex);
        let stats = stat_points(&self.stats);

        let mut canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-1.6, 1.6])
            .y_bounds([-1.3, 1.3])
            .paint(move |ctx| {
                for &(x, y) in &outline {
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: 0.0,
                        x2: x,
                        y2: y,
                        color: grid,
                    });
                }
                draw_polygon(ctx, &outline, grid);
                ctx.layer();
                draw_polygon(ctx, &stats, fill);

                for (i, label) in AXES.iter().enumerate() {
                    let (x, y) = vertex(i);
                    // Labels are printed left to right, so pull left-side ones back
                    let shift = if x < -0.1 { -0.4 } else if x > 0.1 { 0.05 } else { -0.15 };
                    ctx.print(
                        x * LABEL_RADIUS + shift,
                        y * LABEL_RADIUS,
                        Span::styled(*label, label_style),
                    );
                }
            });
        if let Some(block) = self.block {
            canvas = canvas.block(block);
        }
        canvas.render(area, buf);
    }
}
