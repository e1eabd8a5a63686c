use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The conventional mood scale: 0 is "miserable", 5 is "pumped".
pub const MOOD_SCALE: RangeInclusive<i64> = 0..=5;

/// A subscriber eligible to receive broadcast prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Identifier assigned by the messaging platform. Unique across users.
    pub external_user_id: String,
}

impl User {
    pub fn new(external_user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_user_id: external_user_id.into(),
        }
    }
}

/// One point-in-time, self-reported mood observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub id: Uuid,
    /// Reporting user. Not a foreign key: unregistered users may log moods.
    pub external_user_id: String,
    pub value: i64,
    pub timestamp: DateTime<Utc>,
}

impl Mood {
    pub fn new(external_user_id: impl Into<String>, value: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_user_id: external_user_id.into(),
            value,
            timestamp,
        }
    }

    /// UTC calendar day this observation is bucketed under.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// One calendar day's aggregate of mood observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min: i64,
    pub max: i64,
    pub average: f64,
}
