//! Plotters-powered bracket chart widget for Ratatui.
//!
//! One bar per AGI bracket, height = number of returns. The bracket the median
//! was interpolated in is drawn in a different colour. Tick labels sit on the
//! bar edges and show the income boundary at that edge.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{BRACKET_COUNT, BracketScheme};

/// A lightweight, render-only chart description.
pub struct BracketChart<'a> {
    pub counts: &'a [f64; BRACKET_COUNT],
    pub scheme: &'a BracketScheme,
    /// Bracket (0-based) to highlight.
    pub highlight: Option<usize>,
}

impl<'a> Widget for BracketChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let y_max = self.counts.iter().copied().fold(0.0_f64, f64::max);
        let y_max = if y_max.is_finite() && y_max > 0.0 { y_max * 1.1 } else { 1.0 };
        let boundaries = self.scheme.boundaries();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0.0..BRACKET_COUNT as f64, 0.0..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("AGI")
                .y_desc("returns")
                .x_labels(BRACKET_COUNT + 1)
                .y_labels(5)
                .x_label_formatter(&|v| boundary_label(&boundaries, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(0, 255, 255); // cyan
            let median_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(self.counts.iter().enumerate().map(|(idx, &count)| {
                let color = if self.highlight == Some(idx) { median_color } else { bar_color };
                let x0 = idx as f64 + 0.1;
                let x1 = idx as f64 + 0.9;
                Rectangle::new([(x0, 0.0), (x1, count)], color.filled())
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Short income label for the bar edge at `x` (e.g. `25k`, `10M`).
fn boundary_label(boundaries: &[f64; BRACKET_COUNT + 1], x: f64) -> String {
    let idx = x.round();
    if !(0.0..=BRACKET_COUNT as f64).contains(&idx) || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    short_money(boundaries[idx as usize])
}

fn short_money(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.0}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_boundaries() {
        let b = BracketScheme::IRS_AGI.boundaries();
        assert_eq!(boundary_label(&b, 0.0), "1");
        assert_eq!(boundary_label(&b, 1.0), "25k");
        assert_eq!(boundary_label(&b, 5.0), "200k");
        assert_eq!(boundary_label(&b, 6.0), "10M");
        assert_eq!(boundary_label(&b, 2.5), "");
        assert_eq!(boundary_label(&b, 7.0), "");
    }
}
