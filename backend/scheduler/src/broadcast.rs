/// Feeling-check broadcast: push the daily prompt to every registered user.
///
/// Only the user fetch can fail the run. Each push is attempted independently;
/// failures are logged and counted in the [`BroadcastReport`].
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use moodline_core::{MessageSink, MoodError, OutboundMessage};
use moodline_store::UserStore;

pub const FEELING_CHECK_PROMPT: &str = "How are you feeling today?";

/// Quick-reply options; each is sent back verbatim and parses as its leading digit.
pub const FEELING_CHECK_OPTIONS: [&str; 6] = [
    "0: Miserable,nervous",
    "1: Sad,unhappy",
    "2: down,worried",
    "3: good,alright",
    "4: happy,excited",
    "5: pumped,energized",
];

/// Pushes in flight at once.
const PUSH_CONCURRENCY: usize = 8;

pub fn feeling_check_message() -> OutboundMessage {
    OutboundMessage::text(FEELING_CHECK_PROMPT).with_quick_replies(FEELING_CHECK_OPTIONS)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushFailure {
    pub external_user_id: String,
    pub error: String,
}

/// Summary of one broadcast run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PushFailure>,
}

pub struct BroadcastDispatcher {
    users: Arc<dyn UserStore>,
    sink: Arc<dyn MessageSink>,
}

impl BroadcastDispatcher {
    pub fn new(users: Arc<dyn UserStore>, sink: Arc<dyn MessageSink>) -> Self {
        Self { users, sink }
    }

    pub async fn run(&self) -> Result<BroadcastReport, MoodError> {
        let users = self
            .users
            .find_all_users()
            .await
            .map_err(|source| MoodError::Fetch { what: "users", source })?;

        let message = feeling_check_message();
        info!(recipients = users.len(), sink = self.sink.name(), "Broadcasting feeling check");

        let results: Vec<(String, Result<(), String>)> = stream::iter(users)
            .map(|user| {
                let message = &message;
                async move {
                    let result = self
                        .sink
                        .push(&user.external_user_id, message)
                        .await
                        .map_err(|e| e.to_string());
                    (user.external_user_id, result)
                }
            })
            .buffer_unordered(PUSH_CONCURRENCY)
            .collect()
            .await;

        let mut report = BroadcastReport { attempted: results.len(), ..Default::default() };
        for (external_user_id, result) in results {
            match result {
                Ok(()) => report.sent += 1,
                Err(error) => {
                    warn!(user = %external_user_id, error = %error, "Feeling check push failed");
                    report.failures.push(PushFailure { external_user_id, error });
                }
            }
        }
        report.failed = report.failures.len();
        report.failures.sort_by(|a, b| a.external_user_id.cmp(&b.external_user_id));

        info!(
            attempted = report.attempted,
            sent = report.sent,
            failed = report.failed,
            "Feeling check broadcast finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use moodline_core::{SendError, StoreError, User};
    use moodline_store::InMemoryStore;

    use super::*;

    #[derive(Default)]
    struct PushRecorder {
        pushed: Mutex<Vec<(String, OutboundMessage)>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl MessageSink for PushRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn reply(&self, _reply_token: &str, _message: &OutboundMessage) -> Result<(), SendError> {
            Ok(())
        }

        async fn push(&self, to: &str, message: &OutboundMessage) -> Result<(), SendError> {
            self.pushed.lock().await.push((to.to_string(), message.clone()));
            if self.reject.iter().any(|r| r == to) {
                return Err(SendError::Rejected { status: 400, body: "blocked".into() });
            }
            Ok(())
        }
    }

    struct UnreachableUsers;

    #[async_trait]
    impl UserStore for UnreachableUsers {
        async fn create_user(&self, _user: User) -> Result<(), StoreError> {
            Err(StoreError::backend("down"))
        }
        async fn find_all_users(&self) -> Result<Vec<User>, StoreError> {
            Err(StoreError::backend("down"))
        }
    }

    async fn store_with(ids: &[&str]) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for id in ids {
            store.create_user(User::new(*id)).await.unwrap();
        }
        store
    }

    #[test]
    fn options_parse_as_their_leading_digit() {
        for (i, option) in FEELING_CHECK_OPTIONS.iter().enumerate() {
            let (digit, _) = option.split_once(':').unwrap();
            assert_eq!(digit.parse::<usize>().unwrap(), i);
        }
        let message = feeling_check_message();
        assert_eq!(message.text, FEELING_CHECK_PROMPT);
        assert_eq!(message.quick_replies.len(), 6);
    }

    #[tokio::test]
    async fn one_failed_push_does_not_stop_the_rest() {
        let store = store_with(&["U1", "U2", "U3"]).await;
        let sink = Arc::new(PushRecorder { reject: vec!["U2".into()], ..Default::default() });

        let report = BroadcastDispatcher::new(store, sink.clone()).run().await.unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].external_user_id, "U2");

        let mut pushed: Vec<String> = sink.pushed.lock().await.iter().map(|(to, _)| to.clone()).collect();
        pushed.sort();
        assert_eq!(pushed, vec!["U1", "U2", "U3"]);
    }

    #[tokio::test]
    async fn every_push_carries_the_quick_replies() {
        let store = store_with(&["U1"]).await;
        let sink = Arc::new(PushRecorder::default());
        BroadcastDispatcher::new(store, sink.clone()).run().await.unwrap();
        assert_eq!(sink.pushed.lock().await[0].1, feeling_check_message());
    }

    #[tokio::test]
    async fn no_users_is_an_empty_success() {
        let store = Arc::new(InMemoryStore::new());
        let report = BroadcastDispatcher::new(store, Arc::new(PushRecorder::default()))
            .run()
            .await
            .unwrap();
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_run() {
        let sink = Arc::new(PushRecorder::default());
        let err = BroadcastDispatcher::new(Arc::new(UnreachableUsers), sink.clone())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, MoodError::Fetch { what: "users", .. }));
        assert!(sink.pushed.lock().await.is_empty());
    }
}
