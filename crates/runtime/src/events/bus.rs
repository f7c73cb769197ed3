//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{AbilityEvent, EconomyEvent, PedestalEvent, PersistenceEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Grants, passive toggles and drain charges
    Economy,
    /// Active ability uses and rejections
    Ability,
    /// Pedestal lifecycle
    Pedestal,
    /// Repository saves and load failures
    Persistence,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Economy,
        Topic::Ability,
        Topic::Pedestal,
        Topic::Persistence,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Economy(EconomyEvent),
    Ability(AbilityEvent),
    Pedestal(PedestalEvent),
    Persistence(PersistenceEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Economy(_) => Topic::Economy,
            Event::Ability(_) => Topic::Ability,
            Event::Pedestal(_) => Topic::Pedestal,
            Event::Persistence(_) => Topic::Persistence,
        }
    }
}

impl From<EconomyEvent> for Event {
    fn from(event: EconomyEvent) -> Self {
        Event::Economy(event)
    }
}

impl From<AbilityEvent> for Event {
    fn from(event: AbilityEvent) -> Self {
        Event::Ability(event)
    }
}

impl From<PedestalEvent> for Event {
    fn from(event: PedestalEvent) -> Self {
        Event::Pedestal(event)
    }
}

impl From<PersistenceEvent> for Event {
    fn from(event: PersistenceEvent) -> Self {
        Event::Persistence(event)
    }
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front. Publishing never
/// blocks; events sent while a topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; 4]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Topic::ALL.map(|_| broadcast::channel(capacity).0)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels[topic.index()].send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels[topic.index()].subscribe()
    }

    /// Subscribe to multiple topics
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

#[cfg(test)]
mod tests {
    use essence_core::{BlockPos, PlayerId, ZoneId};

    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut pedestal_rx = bus.subscribe(Topic::Pedestal);
        let mut economy_rx = bus.subscribe(Topic::Economy);

        bus.publish(PersistenceEvent::Saved {
            player: PlayerId(1),
        });
        let removed = PedestalEvent::Removed {
            block: BlockPos::new(ZoneId(0), 1, 2, 3),
        };
        bus.publish(removed.clone());

        assert_eq!(pedestal_rx.recv().await.unwrap(), Event::Pedestal(removed));
        assert!(economy_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(EconomyEvent::Drained {
            player: PlayerId(7),
            amount: 1.0,
        });
    }

    #[test]
    fn subscribe_multiple_returns_each_topic() {
        let bus = EventBus::new();
        let receivers = bus.subscribe_multiple(&[Topic::Ability, Topic::Economy]);
        assert_eq!(receivers.len(), 2);
        assert!(receivers.contains_key(&Topic::Ability));
    }
}
