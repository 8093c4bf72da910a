//! Grouped vertical bar chart.

use image::Rgb;

use super::canvas::{Canvas, BLACK, GRID};
use super::font::text_width;
use crate::auditor::utility::format_metric;

const MARGIN_LEFT: u32 = 90;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 70;
const MARGIN_BOTTOM: u32 = 80;
const Y_TICKS: u32 = 5;

/// One bar. A non-finite value is drawn as an empty outline labelled `NaN`.
#[derive(Debug, Clone)]
pub struct Bar {
    pub value: f64,
    pub color: Rgb<u8>,
}

/// Bars sharing one category label on the x axis.
#[derive(Debug, Clone)]
pub struct BarGroup {
    pub label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, Default)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub groups: Vec<BarGroup>,
    pub legend: Vec<(String, Rgb<u8>)>,
    /// Print integer values without decimals above the bars
    pub integer_values: bool,
}

impl BarChart {
    /// Largest finite bar value, or 0 when there is none.
    fn max_value(&self) -> f64 {
        self.groups
            .iter()
            .flat_map(|g| g.bars.iter())
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    fn value_label(&self, value: f64) -> String {
        if self.integer_values && value.is_finite() {
            format!("{:.0}", value)
        } else {
            format_metric(value)
        }
    }

    pub fn render(&self, width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height);

        let plot_left = MARGIN_LEFT as i64;
        let plot_right = width.saturating_sub(MARGIN_RIGHT) as i64;
        let plot_top = MARGIN_TOP as i64;
        let plot_bottom = height.saturating_sub(MARGIN_BOTTOM) as i64;
        let plot_height = (plot_bottom - plot_top).max(1) as f64;

        canvas.text_centered(width as i64 / 2, 20, &self.title, 3, BLACK);

        // Y axis grid and tick labels
        let y_max = nice_ceiling(self.max_value());
        let to_y = |v: f64| plot_bottom - ((v / y_max) * plot_height).round() as i64;
        for tick in 0..=Y_TICKS {
            let value = y_max * tick as f64 / Y_TICKS as f64;
            let y = to_y(value);
            if tick > 0 {
                canvas.hline(plot_left + 1, plot_right, y, GRID);
            }
            canvas.hline(plot_left - 5, plot_left, y, BLACK);
            let label = tick_label(value, y_max);
            canvas.text_right(plot_left - 10, y - 6, &label, 2, BLACK);
        }

        canvas.vline(plot_left, plot_top, plot_bottom, BLACK);
        canvas.hline(plot_left, plot_right, plot_bottom, BLACK);

        // Bars
        let n_groups = self.groups.len().max(1) as i64;
        let slot = (plot_right - plot_left) / n_groups;
        for (i, group) in self.groups.iter().enumerate() {
            let slot_left = plot_left + slot * i as i64;
            let center = slot_left + slot / 2;
            let n_bars = group.bars.len().max(1) as i64;
            let bar_width = ((slot * 7 / 10) / n_bars).max(1);
            let mut x = center - bar_width * n_bars / 2;

            for bar in &group.bars {
                let label = self.value_label(bar.value);
                if bar.value.is_finite() {
                    let top = to_y(bar.value.max(0.0));
                    let h = (plot_bottom - top).max(0) as u32;
                    canvas.fill_rect(x, top, bar_width as u32, h, bar.color);
                    canvas.text_centered(x + bar_width / 2, top - 18, &label, 2, BLACK);
                } else {
                    let top = plot_top + (plot_height / 2.0) as i64;
                    canvas.stroke_rect(x, top, bar_width as u32, (plot_bottom - top + 1) as u32, bar.color);
                    canvas.text_centered(x + bar_width / 2, top - 18, &label, 2, BLACK);
                }
                x += bar_width;
            }

            canvas.text_centered(center, plot_bottom + 12, &group.label, 2, BLACK);
        }

        canvas.text_centered((plot_left + plot_right) / 2, height as i64 - 35, &self.x_label, 2, BLACK);
        canvas.text_vertical(15, (plot_top + plot_bottom) / 2, &self.y_label, 2, BLACK);

        self.draw_legend(&mut canvas, plot_right, plot_top);
        canvas
    }

    fn draw_legend(&self, canvas: &mut Canvas, plot_right: i64, plot_top: i64) {
        if self.legend.is_empty() {
            return;
        }
        let widest = self
            .legend
            .iter()
            .map(|(name, _)| text_width(name, 2))
            .max()
            .unwrap_or(0) as i64;
        let box_width = widest + 50;
        let left = plot_right - box_width - 10;
        let mut y = plot_top + 10;

        canvas.stroke_rect(left, y - 8, box_width as u32, (self.legend.len() as u32) * 24 + 8, BLACK);
        for (name, color) in &self.legend {
            canvas.fill_rect(left + 8, y, 20, 14, *color);
            canvas.text(left + 36, y, name, 2, BLACK);
            y += 24;
        }
    }
}

/// Round `value` up to 1, 2 or 5 times a power of ten.
pub fn nice_ceiling(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|step| step * magnitude)
        .find(|candidate| *candidate >= value)
        .unwrap_or(10.0 * magnitude)
}

fn tick_label(value: f64, y_max: f64) -> String {
    if y_max >= Y_TICKS as f64 * 2.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{BLUE, ORANGE};

    #[test]
    fn test_nice_ceiling() {
        assert_eq!(nice_ceiling(0.0), 1.0);
        assert_eq!(nice_ceiling(f64::NAN), 1.0);
        assert_eq!(nice_ceiling(0.37), 0.5);
        assert_eq!(nice_ceiling(1.0), 1.0);
        assert_eq!(nice_ceiling(1234.0), 2000.0);
        assert_eq!(nice_ceiling(6.0), 10.0);
    }

    #[test]
    fn test_render_fills_bar_color() {
        let chart = BarChart {
            title: "Test".to_string(),
            groups: vec![BarGroup {
                label: "A".to_string(),
                bars: vec![Bar { value: 1.0, color: BLUE }],
            }],
            ..Default::default()
        };
        let canvas = chart.render(400, 300);
        let blue = canvas.image().pixels().filter(|p| **p == BLUE).count();
        assert!(blue > 100);
    }

    #[test]
    fn test_nan_bar_is_outline_only() {
        let chart = BarChart {
            groups: vec![BarGroup {
                label: "A".to_string(),
                bars: vec![Bar { value: f64::NAN, color: ORANGE }],
            }],
            ..Default::default()
        };
        let canvas = chart.render(400, 300);
        let orange = canvas.image().pixels().filter(|p| **p == ORANGE).count();

        // Outline pixels only: far fewer than a filled bar of the same box
        assert!(orange > 0);
        assert!(orange < 1500);
    }
}
