//! Bar chart of recent weekly ridership, rendered to PNG.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbImage, RgbaImage, imageops};
use plotters::coord::types::RangedCoordu64;
use plotters::prelude::*;
use plotters::style::register_font;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::week::{RECENT_WEEKS, WeeklyTotal, recent_window};

/// Plot size before the border: 6x3 inches at 96 DPI.
pub const PLOT_WIDTH: u32 = 576;
pub const PLOT_HEIGHT: u32 = 288;

/// White padding added on every side of the plot.
pub const BORDER: u32 = 20;

const TITLE: &str = "Halifax Transit passengers by week ending";
const Y_DESC: &str = "Passengers";
const FONT_FAMILY: &str = "sans-serif";
const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Each week occupies this many x units; the bar is centred in its slot.
const SLOT: i32 = 10;
const BAR_INSET: i32 = 2;

/// Major y ticks only; minor grid lines are off.
const Y_LABELS: usize = 5;

/// Renders the last [`RECENT_WEEKS`] weeks as a PNG bar chart.
///
/// Bars start at 95% of the smallest count rather than zero so that
/// week-to-week changes stay visible.
///
/// # Errors
///
/// Returns [`Error::Render`] if there is nothing to chart or drawing/encoding fails.
#[instrument(skip(weeks), fields(weeks = weeks.len()))]
pub fn render(weeks: &[WeeklyTotal]) -> Result<Vec<u8>> {
    let window = recent_window(weeks, RECENT_WEEKS);
    if window.is_empty() {
        return Err(Error::render("no weeks to chart"));
    }

    register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
        .map_err(|_| Error::render("embedded chart font is not a valid TrueType font"))?;

    let mut pixels = vec![0u8; (PLOT_WIDTH * PLOT_HEIGHT * 3) as usize];
    draw_plot(&mut pixels, window)?;

    let plot = RgbImage::from_raw(PLOT_WIDTH, PLOT_HEIGHT, pixels)
        .ok_or_else(|| Error::render("plot buffer does not match the plot size"))?;
    let png = encode_with_border(plot)?;

    debug!(bytes = png.len(), "Rendered chart");
    Ok(png)
}

fn draw_plot(pixels: &mut [u8], window: &[WeeklyTotal]) -> Result<()> {
    let (baseline, upper) = y_bounds(window);
    let labels: Vec<String> = window
        .iter()
        .map(|w| w.end.format("%b %d").to_string())
        .collect();
    let slots = window.len() as i32;
    let centres: Vec<i32> = (0..slots).map(|i| i * SLOT + SLOT / 2).collect();

    let root = BitMapBackend::with_buffer(pixels, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT_FAMILY, 16))
        .margin(8)
        .x_label_area_size(24)
        .y_label_area_size(48)
        .build_cartesian_2d(
            (0..slots * SLOT).with_key_points(centres),
            (baseline..upper).with_key_points(y_ticks(baseline, upper)),
        )
        .map_err(draw_error)?;

    let x_label = |x: &i32| -> String {
        if x.rem_euclid(SLOT) != SLOT / 2 {
            return String::new();
        }
        labels
            .get((x / SLOT) as usize)
            .cloned()
            .unwrap_or_default()
    };
    let y_label = |y: &u64| tick_label(*y);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_labels(Y_LABELS)
        .max_light_lines(0)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .y_desc(Y_DESC)
        .label_style((FONT_FAMILY, 12))
        .axis_desc_style((FONT_FAMILY, 12))
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(window.iter().enumerate().map(|(i, week)| {
            let left = i as i32 * SLOT + BAR_INSET;
            let right = (i as i32 + 1) * SLOT - BAR_INSET;
            Rectangle::new(
                [(left, baseline), (right, week.count.max(baseline))],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

/// Lower bar baseline and y-axis upper bound, both truncated to integers.
fn y_bounds(window: &[WeeklyTotal]) -> (u64, u64) {
    let min = window.iter().map(|w| w.count).min().unwrap_or(0);
    let max = window.iter().map(|w| w.count).max().unwrap_or(0);

    let baseline = (min as f64 * 0.95) as u64;
    let upper = (max as f64 * 1.05) as u64;
    (baseline, upper.max(baseline + 1))
}

/// Major y ticks from plotters' key points, keeping the first tick of each
/// distinct label so truncated `<n>k` labels never repeat.
fn y_ticks(baseline: u64, upper: u64) -> Vec<u64> {
    let mut labels: Vec<String> = Vec::new();
    RangedCoordu64::from(baseline..upper)
        .key_points(Y_LABELS)
        .into_iter()
        .filter(|&v| {
            let label = tick_label(v);
            if labels.contains(&label) {
                return false;
            }
            labels.push(label);
            true
        })
        .collect()
}

/// Abbreviates thousands: `4500` -> `4k`, `999` -> `999`.
pub fn tick_label(value: u64) -> String {
    if value >= 1000 {
        format!("{}k", value / 1000)
    } else {
        value.to_string()
    }
}

fn encode_with_border(plot: RgbImage) -> Result<Vec<u8>> {
    let mut canvas = RgbaImage::from_pixel(
        PLOT_WIDTH + 2 * BORDER,
        PLOT_HEIGHT + 2 * BORDER,
        Rgba([255, 255, 255, 255]),
    );
    let plot = DynamicImage::ImageRgb8(plot).into_rgba8();
    imageops::overlay(&mut canvas, &plot, i64::from(BORDER), i64::from(BORDER));

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut png, ImageOutputFormat::Png)
        .map_err(|e| Error::render_with_source("encoding chart as png", e))?;
    Ok(png.into_inner())
}

fn draw_error<E: std::fmt::Display>(e: E) -> Error {
    Error::render(format!("drawing chart: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(counts: &[u64]) -> Vec<WeeklyTotal> {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let start = first + chrono::Duration::weeks(i as i64);
                WeeklyTotal::new(start, start + chrono::Duration::days(6), count)
            })
            .collect()
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(0), "0");
        assert_eq!(tick_label(999), "999");
        assert_eq!(tick_label(1000), "1k");
        assert_eq!(tick_label(4500), "4k");
        assert_eq!(tick_label(12_999), "12k");
    }

    #[test]
    fn test_y_bounds_pad_around_the_data() {
        assert_eq!(y_bounds(&series(&[4000, 5000])), (3800, 5250));
        assert_eq!(y_bounds(&series(&[333])), (316, 349));
    }

    #[test]
    fn test_y_bounds_never_collapse() {
        assert_eq!(y_bounds(&series(&[0, 0])), (0, 1));
        assert_eq!(y_bounds(&series(&[10])), (9, 10));
    }

    #[test]
    fn test_y_ticks_have_distinct_labels() {
        for (baseline, upper) in [(4275, 5250), (3800, 5250), (0, 1), (316, 349), (61_750, 72_450)] {
            let ticks = y_ticks(baseline, upper);
            assert!(!ticks.is_empty(), "{baseline}..{upper}");
            assert!(ticks.len() <= Y_LABELS, "{baseline}..{upper}: {ticks:?}");

            let mut labels: Vec<String> = ticks.iter().map(|&v| tick_label(v)).collect();
            let count = labels.len();
            labels.dedup();
            assert_eq!(labels.len(), count, "{baseline}..{upper}: {ticks:?}");
        }
    }

    #[test]
    fn test_render_empty_is_an_error() {
        let err = render(&[]).unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
    }

    #[test]
    fn test_render_produces_bordered_png() {
        let png = render(&series(&[5000, 4500, 4800])).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(img.width(), PLOT_WIDTH + 2 * BORDER);
        assert_eq!(img.height(), PLOT_HEIGHT + 2 * BORDER);

        let white = Rgba([255, 255, 255, 255]);
        for (x, y) in [(0, 0), (img.width() - 1, img.height() - 1), (BORDER - 1, BORDER - 1)] {
            assert_eq!(*img.get_pixel(x, y), white, "pixel ({x}, {y})");
        }

        let bar = Rgba([31, 119, 180, 255]);
        assert!(img.pixels().any(|p| *p == bar));
    }

    #[test]
    fn test_render_uses_at_most_eight_weeks() {
        let counts: Vec<u64> = (1..=12).map(|i| i * 1000).collect();
        let weeks = series(&counts);

        let all = render(&weeks).unwrap();
        assert_eq!(all, render(&weeks[4..]).unwrap());
        assert_ne!(all, render(&weeks[5..]).unwrap());
    }
}
