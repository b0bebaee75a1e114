//! # Order Tracker
//!
//! One `OrderTracker` follows one (user, order) pair from the first query to a
//! terminal state.
//!
//! ## State Machine
//!
//! ```text
//! Starting ──┬── query failed ───────────▶ Failed
//!            ├── no items ───────────────▶ NotFound
//!            ├── every item ready ───────▶ AlreadyComplete
//!            └── otherwise ──▶ Active ──┬─ all ready ──▶ Completed
//!                                       └─ cancelled ──▶ Cancelled
//! ```
//!
//! Every suspension point (query, send, interval wait) races the cancellation
//! signal, so a stop takes effect immediately and nothing is sent afterwards.
//! A cancelled tracker never notifies.
//!
//! The tracker does not touch the registry. Deregistration is done by the
//! supervisor once `run` returns, whatever the outcome (see
//! [`supervise`](super::supervise)).

use super::TrackerError;
use crate::clients::{NotificationService, OrderQueryService, QueryError};
use crate::messages;
use crate::model::{diff, OrderItem, ReadySet, StatusEvent, StatusSnapshot, TrackingKey};
use crate::registry_actor::{CancelSignal, HandleId, TrackingLease};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Terminal states of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    NotFound,
    AlreadyComplete,
    Completed,
    Cancelled,
    Failed,
}

/// Shared dependencies handed to every tracker.
#[derive(Clone)]
pub struct TrackerContext {
    pub source: Arc<dyn OrderQueryService>,
    pub notifier: Arc<dyn NotificationService>,
    pub ready: Arc<ReadySet>,
    pub poll_interval: Duration,
}

pub struct OrderTracker {
    key: TrackingKey,
    handle_id: HandleId,
    signal: CancelSignal,
    ctx: TrackerContext,
}

impl OrderTracker {
    pub fn new(lease: TrackingLease, ctx: TrackerContext) -> Self {
        Self {
            key: lease.key,
            handle_id: lease.handle_id,
            signal: lease.signal,
            ctx,
        }
    }

    pub fn key(&self) -> &TrackingKey {
        &self.key
    }

    pub fn handle_id(&self) -> HandleId {
        self.handle_id
    }

    /// Drives the tracker to a terminal state.
    pub async fn run(mut self) -> TrackerOutcome {
        info!("Tracker started");
        let outcome = match self.track().await {
            Ok(outcome) => outcome,
            Err(TrackerError::Cancelled) => TrackerOutcome::Cancelled,
            Err(e) => {
                warn!(error = %e, "Tracker failed");
                TrackerOutcome::Failed
            }
        };
        info!(?outcome, "Tracker stopped");
        outcome
    }

    async fn track(&mut self) -> Result<TrackerOutcome, TrackerError> {
        let order = self.key.order.clone();

        // Starting
        let items = match self.query().await? {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Initial query failed");
                self.notify(messages::order_not_found(&order)).await?;
                return Ok(TrackerOutcome::Failed);
            }
        };
        if items.is_empty() {
            self.notify(messages::order_not_found(&order)).await?;
            return Ok(TrackerOutcome::NotFound);
        }

        let mut snapshot = StatusSnapshot::from_items(&items);
        if self.ctx.ready.all_ready(&snapshot) {
            self.notify(messages::already_complete(&order)).await?;
            return Ok(TrackerOutcome::AlreadyComplete);
        }
        self.notify(messages::tracking_started(&order, &snapshot)).await?;
        info!(items = snapshot.len(), "Tracking active");

        // Active
        loop {
            self.wait_interval().await?;

            let current = match self.query().await? {
                Ok(items) => StatusSnapshot::from_items(&items),
                Err(e) => {
                    warn!(error = %e, "Poll failed, keeping last snapshot");
                    continue;
                }
            };

            let events = diff(&snapshot, &current, &self.ctx.ready);
            debug!(events = events.len(), "Polled");
            let mut complete = false;
            for event in events {
                match event {
                    StatusEvent::ItemReady(product) => {
                        info!(%product, "Item ready");
                        self.notify(messages::item_ready(&order, &product)).await?;
                    }
                    StatusEvent::OrderComplete => complete = true,
                }
            }
            snapshot = current;

            if complete {
                self.notify(messages::order_complete(&order)).await?;
                return Ok(TrackerOutcome::Completed);
            }
        }
    }

    /// Queries the source unless cancelled first.
    ///
    /// The outer `Err` is cancellation; the inner result is the query outcome.
    async fn query(&mut self) -> Result<Result<Vec<OrderItem>, QueryError>, TrackerError> {
        tokio::select! {
            biased;
            _ = self.signal.cancelled() => Err(TrackerError::Cancelled),
            result = self.ctx.source.query(&self.key.order) => Ok(result),
        }
    }

    /// Sends a notification unless cancelled first. Send failures are logged
    /// and otherwise ignored.
    async fn notify(&mut self, text: String) -> Result<(), TrackerError> {
        let result = tokio::select! {
            biased;
            _ = self.signal.cancelled() => return Err(TrackerError::Cancelled),
            result = self.ctx.notifier.send(&self.key.user, &text) => result,
        };
        if let Err(e) = result {
            warn!(error = %e, "Notification failed");
        }
        Ok(())
    }

    async fn wait_interval(&mut self) -> Result<(), TrackerError> {
        tokio::select! {
            biased;
            _ = self.signal.cancelled() => Err(TrackerError::Cancelled),
            _ = tokio::time::sleep(self.ctx.poll_interval) => Ok(()),
        }
    }
}
