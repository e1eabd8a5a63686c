use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use moodline_channels::InboundHandler;
use moodline_commands::{build_default_dispatcher, EventRouter, ScalePolicy};
use moodline_core::{
    DailySummary, EventOutcome, InboundEvent, MessageSink, Mood, MoodError, StoreError, User,
};
use moodline_insights::{
    daily_summaries, BucketOrder, ChartFormat, ChartRenderer, ChartSeries, JsonChart, SvgChart,
};
use moodline_scheduler::{BroadcastDispatcher, BroadcastReport};
use moodline_store::{MoodStore, UserStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceOptions {
    pub scale_policy: ScalePolicy,
    pub summary_order: BucketOrder,
}

/// A rendered chart and its MIME type.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct MoodService {
    users: Arc<dyn UserStore>,
    moods: Arc<dyn MoodStore>,
    router: EventRouter,
    broadcaster: Arc<BroadcastDispatcher>,
    summary_order: BucketOrder,
}

impl MoodService {
    pub fn new(
        users: Arc<dyn UserStore>,
        moods: Arc<dyn MoodStore>,
        sink: Arc<dyn MessageSink>,
        options: ServiceOptions,
    ) -> Self {
        let dispatcher = build_default_dispatcher(users.clone(), moods.clone(), options.scale_policy);
        Self {
            router: EventRouter::new(dispatcher, sink.clone()),
            broadcaster: Arc::new(BroadcastDispatcher::new(users.clone(), sink)),
            users,
            moods,
            summary_order: options.summary_order,
        }
    }

    /// Convenience for a single backend holding both collections.
    pub fn with_store<S>(store: Arc<S>, sink: Arc<dyn MessageSink>, options: ServiceOptions) -> Self
    where
        S: UserStore + MoodStore + 'static,
    {
        Self::new(store.clone(), store, sink, options)
    }

    /// Interpret, store and reply for every event; one outcome per event, in input order.
    pub async fn handle_event_batch(&self, events: &[InboundEvent]) -> Vec<EventOutcome> {
        self.router.handle_batch(events).await
    }

    /// Recompute the per-day aggregate from the full mood history.
    #[instrument(skip(self))]
    pub async fn compute_daily_summaries(&self) -> Result<Vec<DailySummary>, StoreError> {
        let moods = self.moods.find_all_moods().await?;
        Ok(daily_summaries(&moods, self.summary_order))
    }

    /// Push the feeling-check prompt to every registered user.
    pub async fn broadcast_feeling_check(&self) -> Result<BroadcastReport, MoodError> {
        self.broadcaster.run().await
    }

    pub async fn register_user(&self, external_user_id: &str) -> Result<User, StoreError> {
        moodline_commands::register_user(self.users.as_ref(), external_user_id).await
    }

    pub async fn log_mood(
        &self,
        external_user_id: &str,
        value: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Mood, StoreError> {
        moodline_commands::log_mood(self.moods.as_ref(), external_user_id, value, timestamp).await
    }

    /// Shared handle for the cron loop.
    pub fn broadcaster(&self) -> Arc<BroadcastDispatcher> {
        self.broadcaster.clone()
    }

    pub async fn render_chart(&self, format: ChartFormat) -> Result<RenderedChart, MoodError> {
        let summaries = self
            .compute_daily_summaries()
            .await
            .map_err(|source| MoodError::Fetch { what: "moods", source })?;
        let series = ChartSeries::from(summaries.as_slice());
        let renderer: Box<dyn ChartRenderer> = match format {
            ChartFormat::Svg => Box::new(SvgChart::default()),
            ChartFormat::Json => Box::new(JsonChart),
        };
        Ok(RenderedChart {
            content_type: renderer.content_type(),
            bytes: renderer.render(&series)?,
        })
    }
}

#[async_trait]
impl InboundHandler for MoodService {
    async fn handle_batch(&self, events: Vec<InboundEvent>) -> Vec<EventOutcome> {
        self.handle_event_batch(&events).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use tokio::sync::Mutex;

    use moodline_core::{OutboundMessage, SendError};
    use moodline_store::InMemoryStore;

    use super::*;

    /// Records replies and pushes; pushes to listed users fail.
    #[derive(Default)]
    pub(crate) struct FakeLine {
        pub replies: Mutex<Vec<(String, String)>>,
        pub pushes: Mutex<Vec<String>>,
        pub unreachable: Vec<String>,
    }

    #[async_trait]
    impl MessageSink for FakeLine {
        fn name(&self) -> &str {
            "fake-line"
        }

        async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> Result<(), SendError> {
            self.replies
                .lock()
                .await
                .push((reply_token.to_string(), message.text.clone()));
            Ok(())
        }

        async fn push(&self, to: &str, _message: &OutboundMessage) -> Result<(), SendError> {
            self.pushes.lock().await.push(to.to_string());
            if self.unreachable.iter().any(|u| u == to) {
                return Err(SendError::Rejected { status: 403, body: "blocked".into() });
            }
            Ok(())
        }
    }

    fn service(sink: Arc<FakeLine>) -> MoodService {
        MoodService::with_store(Arc::new(InMemoryStore::new()), sink, ServiceOptions::default())
    }

    #[tokio::test]
    async fn batch_with_malformed_event_replies_to_all() {
        let sink = Arc::new(FakeLine::default());
        let svc = service(sink.clone());

        let outcomes = svc
            .handle_event_batch(&[
                InboundEvent::new("t1", "U1", "register"),
                InboundEvent::new("t2", "U1", "hello"),
                InboundEvent::new("t3", "U1", "5: pumped,energized"),
            ])
            .await;

        let replies: Vec<&str> = outcomes.iter().map(|o| o.reply.as_str()).collect();
        assert_eq!(replies, vec!["OK", "err: invalid msg", "Got it! It's marked in the books!"]);
        assert_eq!(sink.replies.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_one_user() {
        let svc = service(Arc::new(FakeLine::default()));
        svc.register_user("U1").await.unwrap();
        let err = svc.register_user("U1").await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(svc.users.find_all_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summaries_from_logged_moods() {
        let svc = service(Arc::new(FakeLine::default()));
        let day = |h| Utc.with_ymd_and_hms(2024, 2, 10, h, 0, 0).unwrap();
        svc.log_mood("U1", 2, day(8)).await.unwrap();
        svc.log_mood("U2", 5, day(20)).await.unwrap();

        let summaries = svc.compute_daily_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!((summaries[0].min, summaries[0].max, summaries[0].average), (2, 5, 3.5));
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone_despite_a_failure() {
        let sink = Arc::new(FakeLine { unreachable: vec!["U2".into()], ..Default::default() });
        let svc = service(sink.clone());
        for id in ["U1", "U2", "U3"] {
            svc.register_user(id).await.unwrap();
        }

        let report = svc.broadcast_feeling_check().await.unwrap();
        assert_eq!((report.attempted, report.sent, report.failed), (3, 2, 1));
        assert_eq!(sink.pushes.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn chart_formats() {
        let svc = service(Arc::new(FakeLine::default()));
        svc.log_mood("U1", 3, Utc::now()).await.unwrap();

        let svg = svc.render_chart(ChartFormat::Svg).await.unwrap();
        assert_eq!(svg.content_type, "image/svg+xml");
        assert!(String::from_utf8(svg.bytes).unwrap().contains("<polyline"));

        let json = svc.render_chart(ChartFormat::Json).await.unwrap();
        let series: ChartSeries = serde_json::from_slice(&json.bytes).unwrap();
        assert_eq!(series.len(), 1);
    }
}
