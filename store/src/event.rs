//! Change notification for record-store mutations.
//!
//! Delivery is best-effort: a slow subscriber may observe a lagged receiver
//! instead of every individual event, which is fine because subscribers
//! react by re-reading the full log, not by replaying events.

use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 64;

/// Published after every successful mutation commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// The log changed; `revision` increases monotonically per mutation.
    Changed { revision: u64 },
}

/// Fan-out handle for [`StoreEvent`]s, shared by all backends.
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Publish a change. A send error only means nobody is listening.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
