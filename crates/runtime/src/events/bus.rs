//! Broadcast channels that fan session output out to viewers and services.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use boss_core::SessionEvent;

use super::types::StateBroadcast;

/// Channel an [`Event`] is published on.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Snapshots for viewers
    State,
    /// Raw notices from the session
    Session,
}

/// Anything the worker publishes. The variant decides the topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    State(Box<StateBroadcast>),
    Session(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::State(_) => Topic::State,
            Event::Session(_) => Topic::Session,
        }
    }
}

/// One broadcast channel per [`Topic`].
///
/// Publishing is fire-and-forget: a topic without subscribers drops the
/// event, and slow subscribers lag instead of blocking the worker.
#[derive(Clone)]
pub struct EventBus {
    state: broadcast::Sender<Event>,
    session: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 128;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// `capacity` is per topic; a lagging receiver loses the oldest events.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: broadcast::channel(capacity).0,
            session: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::State => &self.state,
            Topic::Session => &self.session,
        }
    }

    /// Sends `event` on its topic. Never blocks.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(?topic, "event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// One receiver per requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
