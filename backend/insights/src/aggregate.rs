/// Daily mood aggregation.
///
/// Buckets are keyed by UTC calendar day and assigned an index the first time
/// a day is seen. Each bucket keeps a running min, max, sum and count; the
/// average is `sum / count`. Nothing is cached: callers pass the complete
/// history every time.
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use moodline_core::{DailySummary, Mood};

/// Order of the aggregated days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// Ascending calendar order.
    #[default]
    Chronological,
    /// Order in which each day first appears in the input.
    FirstSeen,
}

struct Bucket {
    date: NaiveDate,
    min: i64,
    max: i64,
    sum: i128,
    count: u64,
}

impl Bucket {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            min: i64::MAX,
            max: i64::MIN,
            sum: 0,
            count: 0,
        }
    }

    fn add(&mut self, value: i64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += i128::from(value);
        self.count += 1;
    }

    fn summary(&self) -> DailySummary {
        DailySummary {
            date: self.date,
            min: self.min,
            max: self.max,
            average: self.sum as f64 / self.count as f64,
        }
    }
}

/// Aggregate moods into one summary per distinct UTC day.
pub fn daily_summaries(moods: &[Mood], order: BucketOrder) -> Vec<DailySummary> {
    let mut index_of: HashMap<NaiveDate, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for mood in moods {
        let day = mood.day();
        let index = *index_of.entry(day).or_insert_with(|| {
            buckets.push(Bucket::new(day));
            buckets.len() - 1
        });
        buckets[index].add(mood.value);
    }

    let mut summaries: Vec<DailySummary> = buckets.iter().map(Bucket::summary).collect();
    if order == BucketOrder::Chronological {
        summaries.sort_by_key(|s| s.date);
    }
    summaries
}

/// Three parallel series indexed by date, as a chart sink expects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub dates: Vec<NaiveDate>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    pub average: Vec<f64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
}

impl From<&[DailySummary]> for ChartSeries {
    fn from(summaries: &[DailySummary]) -> Self {
        Self {
            dates: summaries.iter().map(|s| s.date).collect(),
            max: summaries.iter().map(|s| s.max as f64).collect(),
            min: summaries.iter().map(|s| s.min as f64).collect(),
            average: summaries.iter().map(|s| s.average).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn mood(value: i64, y: i32, m: u32, d: u32, h: u32) -> Mood {
        Mood::new("U1", value, Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_history_yields_nothing() {
        assert!(daily_summaries(&[], BucketOrder::Chronological).is_empty());
        assert!(daily_summaries(&[], BucketOrder::FirstSeen).is_empty());
    }

    #[test]
    fn single_record_day() {
        let summaries = daily_summaries(&[mood(4, 2024, 1, 2, 9)], BucketOrder::Chronological);
        assert_eq!(
            summaries,
            vec![DailySummary { date: date(2024, 1, 2), min: 4, max: 4, average: 4.0 }]
        );
    }

    #[test]
    fn two_records_same_day() {
        let summaries = daily_summaries(
            &[mood(2, 2024, 1, 2, 9), mood(5, 2024, 1, 2, 21)],
            BucketOrder::Chronological,
        );
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].min, 2);
        assert_eq!(summaries[0].max, 5);
        assert_eq!(summaries[0].average, 3.5);
    }

    #[test]
    fn day_boundary_is_utc_midnight() {
        let summaries = daily_summaries(
            &[mood(1, 2024, 3, 1, 23), mood(3, 2024, 3, 2, 0)],
            BucketOrder::Chronological,
        );
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].date, date(2024, 3, 1));
        assert_eq!(summaries[1].date, date(2024, 3, 2));
    }

    #[test]
    fn order_options() {
        let moods = [
            mood(1, 2024, 5, 3, 8),
            mood(2, 2024, 5, 1, 8),
            mood(3, 2024, 5, 3, 20),
            mood(4, 2024, 5, 2, 8),
        ];

        let chronological: Vec<NaiveDate> = daily_summaries(&moods, BucketOrder::Chronological)
            .into_iter()
            .map(|s| s.date)
            .collect();
        assert_eq!(chronological, vec![date(2024, 5, 1), date(2024, 5, 2), date(2024, 5, 3)]);

        let first_seen: Vec<NaiveDate> = daily_summaries(&moods, BucketOrder::FirstSeen)
            .into_iter()
            .map(|s| s.date)
            .collect();
        assert_eq!(first_seen, vec![date(2024, 5, 3), date(2024, 5, 1), date(2024, 5, 2)]);
    }

    #[test]
    fn one_summary_per_day_and_bounds_hold() {
        let mut moods = Vec::new();
        for day in 1..=10u32 {
            for (i, hour) in [1u32, 7, 13, 19].iter().enumerate() {
                let value = ((day as i64 * 7 + i as i64 * 3) % 9) - 2;
                moods.push(mood(value, 2023, 12, day, *hour));
            }
        }
        // Reverse so input is not already grouped chronologically.
        moods.reverse();

        let summaries = daily_summaries(&moods, BucketOrder::FirstSeen);
        assert_eq!(summaries.len(), 10);
        for s in &summaries {
            assert!(s.min as f64 <= s.average && s.average <= s.max as f64, "{s:?}");
        }
    }

    #[test]
    fn series_are_parallel() {
        let summaries = daily_summaries(
            &[mood(1, 2024, 1, 1, 0), mood(3, 2024, 1, 1, 1), mood(5, 2024, 1, 2, 0)],
            BucketOrder::Chronological,
        );
        let series = ChartSeries::from(summaries.as_slice());
        assert_eq!(series.len(), 2);
        assert_eq!(series.max, vec![3.0, 5.0]);
        assert_eq!(series.min, vec![1.0, 5.0]);
        assert_eq!(series.average, vec![2.0, 5.0]);
    }
}
