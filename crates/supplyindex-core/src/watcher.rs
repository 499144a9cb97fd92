//! Tip watcher — bridges a source's tip subscription to the coordinator.
//!
//! Every notification is forwarded as-is: no deduplication, no back-off,
//! no filtering of stale heights. The coordinator tolerates all of that.

use tokio::sync::mpsc;

use crate::source::TipSubscription;

/// Forwards tip heights from a [`TipSubscription`] into the coordinator's
/// queue, starting with the height already known at subscription time.
pub struct TipWatcher {
    subscription: TipSubscription,
    forward: mpsc::UnboundedSender<u64>,
}

impl TipWatcher {
    pub fn new(subscription: TipSubscription, forward: mpsc::UnboundedSender<u64>) -> Self {
        Self {
            subscription,
            forward,
        }
    }

    /// Forward notifications until the subscription or the coordinator
    /// goes away.
    pub async fn run(mut self) {
        if let Some(height) = self.subscription.current {
            tracing::debug!(height, "initial tip known at startup");
            if self.forward.send(height).is_err() {
                return;
            }
        }
        while let Some(height) = self.subscription.updates.recv().await {
            tracing::trace!(height, "tip notification");
            if self.forward.send(height).is_err() {
                return;
            }
        }
        tracing::debug!("tip subscription ended");
    }
}
