//! Change notifications, scoped per group.
//!
//! Transport-agnostic: whatever listens to the backend (websocket, SSE,
//! polling) publishes into the feed, and each view holds an explicit
//! subscription it can drop. Nothing implicit survives a page dismount.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{
    RwLock,
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::debug;
use uuid::Uuid;

/// Handle identifying one subscription, used for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

impl SubscriptionToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    ExpensesChanged,
    SettlementsChanged,
    MembersChanged,
    SettlementCompleted { settlement_id: Uuid },
}

struct Subscriber {
    token: SubscriptionToken,
    sender: UnboundedSender<GroupEvent>,
}

/// Registry mapping group id to its subscribers.
#[derive(Default, Clone)]
pub struct ChangeFeed {
    inner: Arc<RwLock<HashMap<Uuid, Vec<Subscriber>>>>,
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in a group. The token unsubscribes; the receiver
    /// yields every event published for the group.
    pub async fn subscribe(
        &self,
        group_id: Uuid,
    ) -> (SubscriptionToken, UnboundedReceiver<GroupEvent>) {
        let (tx, rx) = unbounded_channel();
        let token = SubscriptionToken::new();

        let mut guard = self.inner.write().await;
        guard.entry(group_id).or_default().push(Subscriber {
            token,
            sender: tx,
        });
        debug!(%group_id, ?token, "subscribed");

        (token, rx)
    }

    /// Removes one subscription. Idempotent.
    pub async fn unsubscribe(&self, group_id: Uuid, token: SubscriptionToken) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&group_id) {
            subscribers.retain(|s| s.token != token);
            if subscribers.is_empty() {
                guard.remove(&group_id);
            }
            debug!(%group_id, ?token, "unsubscribed");
        }
    }

    /// Delivers an event to every subscriber of a group, dropping dead
    /// subscribers whose receiver is gone.
    pub async fn publish(&self, group_id: Uuid, event: GroupEvent) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&group_id) {
            let before = subscribers.len();
            subscribers.retain(|s| s.sender.send(event.clone()).is_ok());
            if subscribers.len() != before {
                debug!(
                    %group_id,
                    dropped = before - subscribers.len(),
                    "cleaned up dead subscribers"
                );
            }
            if subscribers.is_empty() {
                guard.remove(&group_id);
            }
        }
    }

    pub async fn subscriber_count(&self, group_id: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&group_id).map(Vec::len).unwrap_or(0)
    }
}
