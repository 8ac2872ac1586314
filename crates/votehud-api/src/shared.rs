//! Single-slot cell carrying the latest cooldown snapshot
//!
//! The fetch side publishes whole snapshots; the frame loop reads whichever
//! snapshot is current without ever waiting on the network.

use std::sync::Arc;
use tokio::sync::watch;
use votehud_util::EpochMillis;

use crate::CooldownStore;

/// What to do with the current snapshot when a fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Reset to the absent state so stale data never outlives its correctness
    #[default]
    Discard,

    /// Keep the last good snapshot and only flag the error
    RetainLastGood,
}

/// Shared latest-snapshot cell
#[derive(Clone)]
pub struct SharedCooldowns {
    sender: Arc<watch::Sender<Arc<CooldownStore>>>,
    receiver: watch::Receiver<Arc<CooldownStore>>,
}

impl SharedCooldowns {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(Arc::new(CooldownStore::uninitialized()));
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// The current snapshot
    pub fn current(&self) -> Arc<CooldownStore> {
        self.receiver.borrow().clone()
    }

    /// Replace the snapshot wholesale
    pub fn publish(&self, store: CooldownStore) {
        self.sender.send_replace(Arc::new(store));
    }

    /// Record a failed fetch according to `policy`
    pub fn publish_failure(&self, policy: FailurePolicy, at: EpochMillis, reason: &str) {
        self.sender.send_modify(|current| {
            let next = match policy {
                FailurePolicy::RetainLastGood if !current.is_absent() => {
                    current.with_error(at, reason)
                }
                _ => CooldownStore::failed(at, reason),
            };
            *current = Arc::new(next);
        });
    }
}

impl Default for SharedCooldowns {
    fn default() -> Self {
        Self::new()
    }
}
