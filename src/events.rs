//! Example-query relay: a typed publish/subscribe channel.
//!
//! DESIGN
//! ======
//! Panels that list suggested queries publish `RelayEvent::ExampleQuery`
//! without holding a reference to the conversation store. A store attaches
//! once per mounted session; the returned `Subscription` aborts the
//! forwarding task when dropped, so remounting never double-handles events.
//!
//! The forwarder takes the pending flag synchronously (`try_begin`) as each
//! event arrives and only then spawns the network round trip. An event that
//! lands while a send is pending is dropped, exactly like a direct `send`.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::chat::ConversationStore;

const RELAY_CAPACITY: usize = 16;

/// Suggested queries shown beside the chat.
pub const EXAMPLE_QUERIES: [&str; 5] = [
    "Compare the average annual rainfall in Punjab and Haryana for the last 5 years",
    "What are the top 5 crops by production volume in Maharashtra?",
    "Show me the production trend of wheat in Uttar Pradesh over the last decade",
    "Identify the district with highest rice production in West Bengal",
    "Analyze the correlation between rainfall and crop production in Karnataka",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    ExampleQuery(String),
}

/// Cloneable publish handle. All clones feed the same subscribers.
#[derive(Clone, Debug)]
pub struct EventRelay {
    tx: broadcast::Sender<RelayEvent>,
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRelay {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(RELAY_CAPACITY);
        Self { tx }
    }

    /// Publish a suggested query. Returns how many subscribers received it.
    pub fn publish_example_query(&self, text: impl Into<String>) -> usize {
        match self.tx.send(RelayEvent::ExampleQuery(text.into())) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("example query published with no subscribers");
                0
            }
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Forward every published example query into `store`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn attach(&self, store: &ConversationStore) -> Subscription {
        let mut rx = self.subscribe();
        let store = store.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(RelayEvent::ExampleQuery(text)) => {
                        if let Some(pending) = store.try_begin(&text) {
                            tokio::spawn(pending.resolve());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, session_id = %store.session_id(), "example queries dropped by lagging relay");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription { handle: Some(handle) }
    }
}

/// Live relay subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop forwarding and wait until the receiver is gone.
    pub async fn unsubscribe(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "relay forwarder ended abnormally");
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
