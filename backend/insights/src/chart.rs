/// Chart sinks: turn three parallel series into a visual artifact.
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use moodline_core::{MoodError, MOOD_SCALE};

use crate::aggregate::ChartSeries;

/// Output formats the HTTP layer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Svg,
    Json,
}

pub trait ChartRenderer: Send + Sync {
    /// MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str;

    fn render(&self, series: &ChartSeries) -> Result<Vec<u8>, MoodError>;
}

/// Pretty-printed JSON of the raw series.
pub struct JsonChart;

impl ChartRenderer for JsonChart {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, series: &ChartSeries) -> Result<Vec<u8>, MoodError> {
        serde_json::to_vec_pretty(series).map_err(|e| MoodError::Render(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SVG line chart
// ---------------------------------------------------------------------------

const MARGIN: f64 = 48.0;
/// Upper bound on Y-axis labels, whatever the value range.
const MAX_Y_TICKS: usize = 10;
const MAX_COLOR: &str = "#e4572e";
const MIN_COLOR: &str = "#2e86ab";
const AVG_COLOR: &str = "#3bb273";

/// Time-axis line chart with one polyline per series.
pub struct SvgChart {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChart {
    fn default() -> Self {
        Self { width: 800, height: 400 }
    }
}

struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    first_day: NaiveDate,
    span_days: f64,
    y_lo: f64,
    y_hi: f64,
}

impl Frame {
    fn x(&self, date: NaiveDate) -> f64 {
        if self.span_days == 0.0 {
            return (self.left + self.right) / 2.0;
        }
        let offset = (date - self.first_day).num_days() as f64;
        self.left + offset / self.span_days * (self.right - self.left)
    }

    fn y(&self, value: f64) -> f64 {
        self.bottom - (value - self.y_lo) / (self.y_hi - self.y_lo) * (self.bottom - self.top)
    }

    /// Integer-aligned tick values, at most `MAX_Y_TICKS + 1` of them.
    fn y_ticks(&self) -> Vec<f64> {
        let step = ((self.y_hi - self.y_lo) / MAX_Y_TICKS as f64).ceil().max(1.0);
        let first = (self.y_lo / step).ceil() * step;
        (0..=MAX_Y_TICKS)
            .map(|i| first + i as f64 * step)
            .take_while(|tick| *tick <= self.y_hi)
            .collect()
    }
}

impl SvgChart {
    fn frame(&self, series: &ChartSeries) -> Option<Frame> {
        let first_day = *series.dates.iter().min()?;
        let last_day = *series.dates.iter().max()?;

        // Always show the conventional scale; widen it for out-of-range values.
        let observed = series.max.iter().chain(&series.min).copied();
        let (y_lo, y_hi) = observed.fold(
            (*MOOD_SCALE.start() as f64, *MOOD_SCALE.end() as f64),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        );

        Some(Frame {
            left: MARGIN,
            right: f64::from(self.width) - MARGIN / 2.0,
            top: MARGIN / 2.0,
            bottom: f64::from(self.height) - MARGIN,
            first_day,
            span_days: (last_day - first_day).num_days() as f64,
            y_lo,
            y_hi,
        })
    }

    /// Points are joined in date order regardless of the series order.
    fn polyline(out: &mut String, frame: &Frame, dates: &[NaiveDate], values: &[f64], color: &str) {
        let mut pairs: Vec<(NaiveDate, f64)> = dates.iter().copied().zip(values.iter().copied()).collect();
        pairs.sort_by_key(|(d, _)| *d);
        let points: Vec<String> = pairs
            .iter()
            .map(|(d, v)| format!("{:.1},{:.1}", frame.x(*d), frame.y(*v)))
            .collect();
        let _ = writeln!(
            out,
            r#"  <polyline fill="none" stroke="{color}" stroke-width="2" points="{}"/>"#,
            points.join(" ")
        );
        for point in &points {
            if let Some((x, y)) = point.split_once(',') {
                let _ = writeln!(out, r#"  <circle cx="{x}" cy="{y}" r="3" fill="{color}"/>"#);
            }
        }
    }
}

impl ChartRenderer for SvgChart {
    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, series: &ChartSeries) -> Result<Vec<u8>, MoodError> {
        let (w, h) = (self.width, self.height);
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#
        );
        let _ = writeln!(out, r#"  <rect width="{w}" height="{h}" fill="white"/>"#);

        let Some(frame) = self.frame(series) else {
            let _ = writeln!(
                out,
                r##"  <text x="{}" y="{}" text-anchor="middle" fill="#666">no moods recorded yet</text>"##,
                w / 2,
                h / 2
            );
            out.push_str("</svg>\n");
            return Ok(out.into_bytes());
        };

        // Axes.
        let _ = writeln!(
            out,
            r#"  <path d="M{l:.1},{t:.1} V{b:.1} H{r:.1}" fill="none" stroke="black"/>"#,
            l = frame.left,
            t = frame.top,
            b = frame.bottom,
            r = frame.right
        );

        for tick in frame.y_ticks() {
            let y = frame.y(tick);
            let _ = writeln!(
                out,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="end">{tick}</text>"#,
                frame.left - 6.0,
                y + 4.0
            );
        }

        // X labels for the first and last day.
        let first_x = frame.x(frame.first_day);
        let _ = writeln!(
            out,
            r#"  <text x="{first_x:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            frame.bottom + 18.0,
            frame.first_day
        );
        if frame.span_days > 0.0 {
            let last_day = frame.first_day + chrono::Days::new(frame.span_days as u64);
            let _ = writeln!(
                out,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle">{last_day}</text>"#,
                frame.x(last_day),
                frame.bottom + 18.0
            );
        }

        Self::polyline(&mut out, &frame, &series.dates, &series.max, MAX_COLOR);
        Self::polyline(&mut out, &frame, &series.dates, &series.min, MIN_COLOR);
        Self::polyline(&mut out, &frame, &series.dates, &series.average, AVG_COLOR);

        out.push_str("</svg>\n");
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> ChartSeries {
        ChartSeries {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ],
            max: vec![4.0, 5.0],
            min: vec![1.0, 2.0],
            average: vec![2.5, 3.5],
        }
    }

    #[test]
    fn svg_has_three_polylines() {
        let bytes = SvgChart::default().render(&series()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-03"));
    }

    #[test]
    fn svg_handles_empty_series() {
        let svg = String::from_utf8(SvgChart::default().render(&ChartSeries::default()).unwrap()).unwrap();
        assert!(svg.contains("no moods recorded yet"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn single_day_is_centered() {
        let chart = SvgChart { width: 400, height: 200 };
        let series = ChartSeries {
            dates: vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
            max: vec![3.0],
            min: vec![3.0],
            average: vec![3.0],
        };
        let frame = chart.frame(&series).unwrap();
        assert_eq!(frame.x(series.dates[0]), (frame.left + frame.right) / 2.0);
    }

    #[test]
    fn conventional_scale_ticks_every_integer() {
        let frame = SvgChart::default().frame(&series()).unwrap();
        assert_eq!(frame.y_ticks(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn extreme_values_keep_the_chart_small() {
        let series = ChartSeries {
            dates: vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
            max: vec![i64::MAX as f64],
            min: vec![i64::MIN as f64],
            average: vec![0.0],
        };
        let frame = SvgChart::default().frame(&series).unwrap();
        assert!(frame.y_ticks().len() <= MAX_Y_TICKS + 1);

        let bytes = SvgChart::default().render(&series).unwrap();
        assert!(bytes.len() < 8 * 1024, "svg was {} bytes", bytes.len());
    }

    #[test]
    fn polyline_follows_dates_not_input_order() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let series = ChartSeries {
            dates: vec![day(3), day(1), day(2)],
            max: vec![3.0, 1.0, 2.0],
            min: vec![3.0, 1.0, 2.0],
            average: vec![3.0, 1.0, 2.0],
        };
        let svg = String::from_utf8(SvgChart::default().render(&series).unwrap()).unwrap();
        let line = svg.lines().find(|l| l.contains("<polyline")).unwrap();
        let points = line.split("points=\"").nth(1).unwrap().trim_end_matches("\"/>");
        let xs: Vec<f64> = points
            .split(' ')
            .map(|p| p.split_once(',').unwrap().0.parse().unwrap())
            .collect();
        assert_eq!(xs.len(), 3);
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "x not increasing: {xs:?}");
    }

    #[test]
    fn json_chart_round_trips_series() {
        let bytes = JsonChart.render(&series()).unwrap();
        let decoded: ChartSeries = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, series());
        assert_eq!(JsonChart.content_type(), "application/json");
    }
}
