//! # Tracking Registry Server
//!
//! `RegistryActor` owns the authoritative table of active subscriptions. It is
//! the only place that ever holds a [`TrackingHandle`].
//!
//! **Concurrency Model**:
//! All mutations arrive as [`RegistryRequest`] messages and are handled one at
//! a time, so `TryAdd` is an atomic check-and-insert and `Remove` cannot race
//! a concurrent `TryAdd` for the same key. No locks are involved.
//!
//! ## Handle ids
//!
//! Every accepted `TryAdd` gets a fresh id from a monotonically increasing
//! counter. A tracker that ends on its own sends `Release` with its id; the
//! entry is removed only while it still holds that id. A tracker cancelled by
//! `Remove` whose key was immediately re-added therefore cannot evict its
//! successor.

use super::handle::{HandleId, TrackingHandle, TrackingLease};
use super::messages::RegistryRequest;
use crate::model::{OrderId, TrackingKey, UserId};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct RegistryActor {
    receiver: mpsc::Receiver<RegistryRequest>,
    subscriptions: HashMap<UserId, BTreeMap<OrderId, TrackingHandle>>,
    next_handle_id: HandleId,
}

impl RegistryActor {
    pub(crate) fn new(receiver: mpsc::Receiver<RegistryRequest>) -> Self {
        Self {
            receiver,
            subscriptions: HashMap::new(),
            next_handle_id: 1,
        }
    }

    /// Runs the event loop until every client is dropped.
    ///
    /// Any handles still present at that point are fired on the way out so no
    /// tracker outlives the registry.
    pub async fn run(mut self) {
        info!("Registry started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RegistryRequest::TryAdd { key, respond_to } => {
                    let lease = self.try_add(key);
                    // Caller went away: nobody will run a tracker for this handle.
                    if let Err(Some(lease)) = respond_to.send(lease) {
                        warn!(key = %lease.key, "Add abandoned by caller");
                        self.release(&lease.key, lease.handle_id);
                    }
                }
                RegistryRequest::Remove { key, respond_to } => {
                    let removed = self.remove(&key);
                    let _ = respond_to.send(removed);
                }
                RegistryRequest::RemoveAll { user, respond_to } => {
                    let removed = self.remove_all(&user);
                    let _ = respond_to.send(removed > 0);
                }
                RegistryRequest::List { user, respond_to } => {
                    let orders = self.list(&user);
                    debug!(%user, count = orders.len(), "List");
                    let _ = respond_to.send(orders);
                }
                RegistryRequest::Release {
                    key,
                    handle_id,
                    respond_to,
                } => {
                    let released = self.release(&key, handle_id);
                    let _ = respond_to.send(released);
                }
                RegistryRequest::CancelEverything { respond_to } => {
                    let cancelled = self.cancel_everything();
                    let _ = respond_to.send(cancelled);
                }
            }
        }

        let leftover = self.cancel_everything();
        info!(leftover, "Registry shutdown");
    }

    fn size(&self) -> usize {
        self.subscriptions.values().map(BTreeMap::len).sum()
    }

    fn try_add(&mut self, key: TrackingKey) -> Option<TrackingLease> {
        let orders = self.subscriptions.entry(key.user.clone()).or_default();
        if orders.contains_key(&key.order) {
            debug!(%key, "Already tracked");
            return None;
        }

        let id = self.next_handle_id;
        self.next_handle_id += 1;
        let (handle, lease) = TrackingHandle::new(id, key.clone());
        orders.insert(key.order.clone(), handle);
        info!(%key, handle_id = id, size = self.size(), "Added");
        Some(lease)
    }

    fn remove(&mut self, key: &TrackingKey) -> bool {
        let Some(orders) = self.subscriptions.get_mut(&key.user) else {
            debug!(%key, "Remove of untracked key");
            return false;
        };
        let Some(handle) = orders.remove(&key.order) else {
            debug!(%key, "Remove of untracked key");
            return false;
        };
        if orders.is_empty() {
            self.subscriptions.remove(&key.user);
        }

        let handle_id = handle.id();
        handle.fire();
        info!(%key, handle_id, size = self.size(), "Removed");
        true
    }

    fn remove_all(&mut self, user: &UserId) -> usize {
        let Some(orders) = self.subscriptions.remove(user) else {
            return 0;
        };
        let count = orders.len();
        for handle in orders.into_values() {
            handle.fire();
        }
        info!(%user, count, size = self.size(), "Removed all");
        count
    }

    fn list(&self, user: &UserId) -> Vec<OrderId> {
        self.subscriptions
            .get(user)
            .map(|orders| orders.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn release(&mut self, key: &TrackingKey, handle_id: HandleId) -> bool {
        let Some(orders) = self.subscriptions.get_mut(&key.user) else {
            return false;
        };
        match orders.get(&key.order) {
            Some(handle) if handle.id() == handle_id => {}
            Some(handle) => {
                warn!(%key, stale = handle_id, current = handle.id(), "Ignoring stale release");
                return false;
            }
            None => return false,
        }

        // The tracker is already finishing; dropping the handle unfired is enough.
        orders.remove(&key.order);
        if orders.is_empty() {
            self.subscriptions.remove(&key.user);
        }
        info!(%key, handle_id, size = self.size(), "Released");
        true
    }

    fn cancel_everything(&mut self) -> usize {
        let mut count = 0;
        for (_, orders) in self.subscriptions.drain() {
            for handle in orders.into_values() {
                handle.fire();
                count += 1;
            }
        }
        count
    }
}
