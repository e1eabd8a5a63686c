/// Inbound event routing: interpret, dispatch and reply for a whole webhook batch.
///
/// Events from different senders are handled concurrently; events from the
/// same sender run one after another in submission order, so two mood logs
/// from one user in a single batch are never reordered.
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use moodline_core::{EventOutcome, InboundEvent, MessageSink, OutboundMessage, ReplyStatus};

use crate::detection::interpret;
use crate::dispatch::{CommandContext, CommandDispatcher};

pub struct EventRouter {
    dispatcher: CommandDispatcher,
    sink: Arc<dyn MessageSink>,
}

impl EventRouter {
    pub fn new(dispatcher: CommandDispatcher, sink: Arc<dyn MessageSink>) -> Self {
        Self { dispatcher, sink }
    }

    /// Handle every event of a batch. Returns one outcome per event, in input order.
    pub async fn handle_batch(&self, events: &[InboundEvent]) -> Vec<EventOutcome> {
        if events.is_empty() {
            return Vec::new();
        }

        let lanes = lanes_by_sender(events);
        info!(events = events.len(), senders = lanes.len(), "Handling event batch");

        let lane_results = join_all(lanes.into_iter().map(|lane| async move {
            let mut done = Vec::with_capacity(lane.len());
            for index in lane {
                done.push((index, self.handle_event(&events[index]).await));
            }
            done
        }))
        .await;

        let mut slots: Vec<Option<EventOutcome>> = vec![None; events.len()];
        for (index, outcome) in lane_results.into_iter().flatten() {
            slots[index] = Some(outcome);
        }
        slots.into_iter().flatten().collect()
    }

    /// Handle a single event: at most one store write and one reply.
    pub async fn handle_event(&self, event: &InboundEvent) -> EventOutcome {
        let command = interpret(&event.text);
        let ctx = CommandContext { sender_id: event.source_user_id.clone() };
        let response = self.dispatcher.dispatch(&ctx, &command).await;

        if !response.succeeded {
            warn!(
                sender = %event.source_user_id,
                reply = %response.text,
                "Command failed"
            );
        }

        let delivery = match self
            .sink
            .reply(&event.reply_token, &OutboundMessage::text(&response.text))
            .await
        {
            Ok(()) => ReplyStatus::Sent,
            Err(err) => {
                warn!(sink = self.sink.name(), sender = %event.source_user_id, error = %err, "Reply failed");
                ReplyStatus::Failed(err.to_string())
            }
        };

        EventOutcome {
            reply_token: event.reply_token.clone(),
            source_user_id: event.source_user_id.clone(),
            reply: response.text,
            succeeded: response.succeeded,
            delivery,
        }
    }
}

/// Group event indices by sender, keeping first-seen sender order and
/// submission order within each sender.
fn lanes_by_sender(events: &[InboundEvent]) -> Vec<Vec<usize>> {
    let mut lane_of: HashMap<&str, usize> = HashMap::new();
    let mut lanes: Vec<Vec<usize>> = Vec::new();
    for (index, event) in events.iter().enumerate() {
        let lane = *lane_of.entry(event.source_user_id.as_str()).or_insert_with(|| {
            lanes.push(Vec::new());
            lanes.len() - 1
        });
        lanes[lane].push(index);
    }
    lanes
}
