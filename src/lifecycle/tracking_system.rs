use crate::clients::{NotificationService, OrderQueryService, RegistryClient};
use crate::config::TrackingConfig;
use crate::cooldown::{CooldownDecision, CooldownGuard};
use crate::model::{OrderId, OrderItem, PendingItems, StatusReport, TrackingKey, UserId};
use crate::registry_actor::RegistryError;
use crate::tracker_actor::{supervise, OrderTracker, TrackerContext, TrackerOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, warn};

/// Errors surfaced by [`TrackingSystem`].
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Registry task failed: {0}")]
    RegistryTask(String),
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A tracker was spawned.
    Started,
    /// The user already tracks this order. Nothing changed.
    AlreadyTracked,
    /// The user started another order too recently. Nothing changed.
    CoolingDown { remaining: Duration },
}

/// The tracking engine: registry, cooldown, and supervised trackers.
///
/// `TrackingSystem` is responsible for:
/// - **Lifecycle Management**: spawning the registry actor and every tracker,
///   and draining them on shutdown
/// - **Dependency Wiring**: handing the order source, notifier and ready set
///   to each tracker
/// - **Admission**: cooldown first, then the registry's atomic insert
///
/// # Example
///
/// ```ignore
/// let system = TrackingSystem::new(&config.tracking, source, notifier);
///
/// system.start_tracking(user.clone(), OrderId::from("123")).await?;
/// let orders = system.list_tracked(user).await?;
///
/// system.shutdown().await?;
/// ```
pub struct TrackingSystem {
    registry: RegistryClient,
    cooldown: CooldownGuard,
    cooldown_window: Duration,
    tracker_ctx: TrackerContext,
    supervisors: Mutex<JoinSet<TrackerOutcome>>,
    registry_handle: JoinHandle<()>,
}

impl TrackingSystem {
    /// Spawns the registry actor and returns a ready system.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        config: &TrackingConfig,
        source: Arc<dyn OrderQueryService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        let (registry_actor, registry) = crate::registry_actor::new(config.registry_buffer);
        let registry_handle = tokio::spawn(registry_actor.run());

        Self {
            registry,
            cooldown: CooldownGuard::new(),
            cooldown_window: config.cooldown,
            tracker_ctx: TrackerContext {
                source,
                notifier,
                ready: Arc::new(config.ready_set()),
                poll_interval: config.poll_interval,
            },
            supervisors: Mutex::new(JoinSet::new()),
            registry_handle,
        }
    }

    /// Admits a new subscription and spawns its tracker.
    ///
    /// The cooldown is checked (and armed) before the registry is touched, so
    /// a blocked start has no effect at all. An armed cooldown stays armed
    /// even if the registry then reports the order as already tracked.
    #[instrument(skip(self))]
    pub async fn start_tracking(
        &self,
        user: UserId,
        order: OrderId,
    ) -> Result<StartOutcome, SystemError> {
        if let CooldownDecision::Blocked { remaining } =
            self.cooldown.check_and_arm(&user, self.cooldown_window)
        {
            return Ok(StartOutcome::CoolingDown { remaining });
        }

        let key = TrackingKey::new(user, order);
        let Some(lease) = self.registry.try_add(key).await? else {
            return Ok(StartOutcome::AlreadyTracked);
        };

        let tracker = OrderTracker::new(lease, self.tracker_ctx.clone());
        let mut supervisors = self.supervisors.lock().unwrap_or_else(|e| e.into_inner());
        while let Some(finished) = supervisors.try_join_next() {
            if let Err(e) = finished {
                error!(error = %e, "Supervisor task failed");
            }
        }
        supervisors.spawn(supervise(tracker, self.registry.clone()));
        debug!(running = supervisors.len(), "Tracker spawned");
        Ok(StartOutcome::Started)
    }

    /// Cancels one subscription. `false` if it was not tracked.
    #[instrument(skip(self))]
    pub async fn stop_tracking(&self, user: UserId, order: OrderId) -> Result<bool, SystemError> {
        Ok(self.registry.remove(TrackingKey::new(user, order)).await?)
    }

    /// Cancels every subscription of the user. `false` if there were none.
    ///
    /// Returns once the handles are fired; the trackers wind down on their own.
    #[instrument(skip(self))]
    pub async fn stop_all_tracking(&self, user: UserId) -> Result<bool, SystemError> {
        Ok(self.registry.remove_all(user).await?)
    }

    /// Orders the user currently tracks, sorted.
    pub async fn list_tracked(&self, user: UserId) -> Result<Vec<OrderId>, SystemError> {
        Ok(self.registry.list(user).await?)
    }

    /// One-off status query. Never touches the registry's entries or the
    /// cooldown.
    ///
    /// With an order, only that order is queried, tracked or not. Without one,
    /// every tracked order is queried in list order and orders whose query
    /// fails are left out.
    #[instrument(skip(self))]
    pub async fn query_status(
        &self,
        user: UserId,
        order: Option<OrderId>,
    ) -> Result<StatusReport, SystemError> {
        if let Some(order) = order {
            return Ok(match self.pending_items(&order).await {
                Some(items) => StatusReport::Order(PendingItems { order, items }),
                None => StatusReport::Unavailable(order),
            });
        }

        let orders = self.registry.list(user).await?;
        if orders.is_empty() {
            return Ok(StatusReport::NothingTracked);
        }

        let mut report = Vec::with_capacity(orders.len());
        for order in orders {
            if let Some(items) = self.pending_items(&order).await {
                report.push(PendingItems { order, items });
            }
        }
        Ok(StatusReport::Tracked(report))
    }

    async fn pending_items(&self, order: &OrderId) -> Option<Vec<OrderItem>> {
        match self.tracker_ctx.source.query(order).await {
            Ok(items) => Some(
                items
                    .into_iter()
                    .filter(|item| !self.tracker_ctx.ready.contains(&item.status))
                    .collect(),
            ),
            Err(e) => {
                warn!(%order, error = %e, "Status query failed");
                None
            }
        }
    }

    /// Gracefully shuts down the engine.
    ///
    /// 1. Fires every registered handle
    /// 2. Waits for every supervisor, so each tracker has stopped and released
    /// 3. Drops the registry client and waits for the actor to exit
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down tracking system...");

        let cancelled = self.registry.cancel_everything().await?;
        let mut supervisors = self
            .supervisors
            .into_inner()
            .unwrap_or_else(|e| e.into_inner());
        info!(cancelled, running = supervisors.len(), "Draining trackers");

        while let Some(finished) = supervisors.join_next().await {
            match finished {
                Ok(outcome) => debug!(?outcome, "Tracker drained"),
                Err(e) => error!(error = %e, "Supervisor task failed"),
            }
        }

        drop(self.registry);
        drop(self.tracker_ctx);
        if let Err(e) = self.registry_handle.await {
            error!("Registry task failed: {:?}", e);
            return Err(SystemError::RegistryTask(e.to_string()));
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
