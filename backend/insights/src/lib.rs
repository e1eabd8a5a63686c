//! `moodline-insights`: turns the raw mood history into charts.
//!
//! Provides:
//! - Per-day min/max/average aggregation over the full history
//! - Parallel chart series derived from the daily summaries
//! - SVG and JSON renderers behind the `ChartRenderer` trait

pub mod aggregate;
pub mod chart;

pub use aggregate::{daily_summaries, BucketOrder, ChartSeries};
pub use chart::{ChartFormat, ChartRenderer, JsonChart, SvgChart};
