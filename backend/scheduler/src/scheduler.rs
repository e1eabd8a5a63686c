use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::time::Duration;
use tracing::{error, info, warn};

use moodline_core::MoodError;

use crate::broadcast::BroadcastDispatcher;

/// Runs the feeling-check broadcast at each fire time of a cron schedule (UTC).
pub struct BroadcastScheduler {
    schedule: Schedule,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl BroadcastScheduler {
    /// `expression` uses the six-field form: `sec min hour dom mon dow`.
    pub fn new(expression: &str, dispatcher: Arc<BroadcastDispatcher>) -> Result<Self, MoodError> {
        let schedule = Schedule::from_str(expression)
            .map_err(|e| MoodError::Config(format!("invalid broadcast schedule '{expression}': {e}")))?;
        Ok(Self { schedule, dispatcher })
    }

    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Loop until `shutdown` resolves or the schedule has no further fire times.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Broadcast scheduler started");

        loop {
            let now = Utc::now();
            let Some(next) = self.next_fire(now) else {
                warn!("Broadcast schedule has no upcoming fire times, stopping");
                break;
            };
            let until = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next = %next, "Next feeling check scheduled");

            tokio::select! {
                _ = tokio::time::sleep(until) => {
                    match self.dispatcher.run().await {
                        Ok(report) => info!(
                            attempted = report.attempted,
                            sent = report.sent,
                            failed = report.failed,
                            "Scheduled broadcast complete"
                        ),
                        Err(e) => error!(error = %e, "Scheduled broadcast failed"),
                    }
                }
                _ = &mut shutdown => {
                    info!("Broadcast scheduler shutting down");
                    break;
                }
            }
        }
    }
}
