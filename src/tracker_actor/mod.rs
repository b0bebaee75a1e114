//! Per-order polling units and their supervision.

pub mod error;
pub mod tracker;

pub use error::*;
pub use tracker::*;

use crate::clients::RegistryClient;
use tokio::task::JoinError;
use tracing::{debug, error, info_span, warn, Instrument};

/// Runs a tracker in its own task and deregisters it afterwards.
///
/// The tracker's task is awaited rather than trusted: a panic inside it is
/// reported as [`TrackerOutcome::Failed`]. Either way the handle is released
/// exactly once, using the tracker's handle id so that a newer subscription
/// for the same key stays registered.
pub async fn supervise(tracker: OrderTracker, registry: RegistryClient) -> TrackerOutcome {
    let key = tracker.key().clone();
    let handle_id = tracker.handle_id();
    let span = info_span!("tracker", user = %key.user, order = %key.order, handle_id);

    let outcome = match tokio::spawn(tracker.run().instrument(span.clone())).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let e = join_failure(e);
            error!(parent: &span, error = %e, "Tracker task failed");
            TrackerOutcome::Failed
        }
    };

    match registry.release(key, handle_id).await {
        Ok(true) => debug!(parent: &span, "Handle released"),
        Ok(false) => debug!(parent: &span, "Handle already removed"),
        Err(e) => warn!(parent: &span, error = %e, "Release failed"),
    }
    outcome
}

fn join_failure(e: JoinError) -> TrackerError {
    if e.is_panic() {
        let payload = e.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        TrackerError::Panicked(message)
    } else {
        TrackerError::Aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{NotificationService, NotifyError, OrderQueryService, QueryError};
    use crate::framework::mock::{MockNotifier, MockOrderSource};
    use crate::messages;
    use crate::model::{OrderId, OrderItem, ReadySet, TrackingKey, UserId};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    const INTERVAL: Duration = Duration::from_secs(60);

    fn ctx(source: &MockOrderSource, notifier: &MockNotifier) -> TrackerContext {
        TrackerContext {
            source: Arc::new(source.clone()),
            notifier: Arc::new(notifier.clone()),
            ready: Arc::new(ReadySet::default()),
            poll_interval: INTERVAL,
        }
    }

    async fn start(registry: &RegistryClient, order: &str, ctx: TrackerContext) -> OrderTracker {
        let key = TrackingKey::new(UserId::from("u1"), OrderId::from(order));
        let lease = registry.try_add(key).await.unwrap().unwrap();
        OrderTracker::new(lease, ctx)
    }

    fn spawn_registry() -> RegistryClient {
        let (actor, client) = crate::registry_actor::new(8);
        tokio::spawn(actor.run());
        client
    }

    fn user() -> UserId {
        UserId::from("u1")
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_order_is_not_found() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source.expect_query("9").return_empty();

        let tracker = start(&registry, "9", ctx(&source, &notifier)).await;
        assert_eq!(supervise(tracker, registry.clone()).await, TrackerOutcome::NotFound);

        assert_eq!(
            notifier.messages_for(&user()),
            vec![messages::order_not_found(&OrderId::from("9"))]
        );
        assert!(registry.list(user()).await.unwrap().is_empty());
        source.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_failure_reads_as_not_found() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source.expect_query("9").return_err("gateway down");

        let tracker = start(&registry, "9", ctx(&source, &notifier)).await;
        assert_eq!(supervise(tracker, registry.clone()).await, TrackerOutcome::Failed);

        assert_eq!(
            notifier.messages_for(&user()),
            vec![messages::order_not_found(&OrderId::from("9"))]
        );
        assert!(registry.list(user()).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_ready_is_already_complete() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source
            .expect_query("5")
            .return_items([("A", "Teslim Edildi"), ("B", "Teslime hazır")]);

        let tracker = start(&registry, "5", ctx(&source, &notifier)).await;
        assert_eq!(
            supervise(tracker, registry.clone()).await,
            TrackerOutcome::AlreadyComplete
        );
        assert_eq!(
            notifier.messages_for(&user()),
            vec![messages::already_complete(&OrderId::from("5"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_keep_snapshot() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source.expect_query("1").return_items([("A", "Hazırlanıyor")]);
        source.expect_query("1").return_err("timeout");
        source.expect_query("1").return_err("timeout");
        source.expect_query("1").return_items([("A", "Teslime Hazır")]);

        let tracker = start(&registry, "1", ctx(&source, &notifier)).await;
        assert_eq!(supervise(tracker, registry.clone()).await, TrackerOutcome::Completed);

        let order = OrderId::from("1");
        assert_eq!(
            notifier.messages_for(&user()),
            vec![
                messages::tracking_started(&order, &[("A", "Hazırlanıyor")].into_iter().collect()),
                messages::item_ready(&order, "A"),
                messages::order_complete(&order),
            ]
        );
        assert_eq!(source.queries("1"), 4);
        source.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_sends_do_not_stop_tracking() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        notifier.fail_sends(true);
        source.expect_query("1").return_items([("A", "Hazırlanıyor")]);
        source.expect_query("1").return_items([("A", "Teslime Hazır")]);

        let tracker = start(&registry, "1", ctx(&source, &notifier)).await;
        assert_eq!(supervise(tracker, registry.clone()).await, TrackerOutcome::Completed);
        assert_eq!(notifier.sent().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_is_silent() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source.expect_query("1").return_items([("A", "Hazırlanıyor")]);

        let tracker = start(&registry, "1", ctx(&source, &notifier)).await;
        let task = tokio::spawn(supervise(tracker, registry.clone()));

        notifier.wait_for(1).await;
        assert!(registry.remove(TrackingKey::new(user(), OrderId::from("1"))).await.unwrap());
        assert_eq!(task.await.unwrap(), TrackerOutcome::Cancelled);

        // Only the "tracking started" message, and no poll after the cancel
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(source.queries("1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_query() {
        let registry = spawn_registry();
        let (source, notifier) = (MockOrderSource::new(), MockNotifier::new());
        source.expect_query("1").return_pending();

        let tracker = start(&registry, "1", ctx(&source, &notifier)).await;
        let task = tokio::spawn(supervise(tracker, registry.clone()));

        while source.queries("1") == 0 {
            tokio::task::yield_now().await;
        }
        registry.remove(TrackingKey::new(user(), OrderId::from("1"))).await.unwrap();
        assert_eq!(task.await.unwrap(), TrackerOutcome::Cancelled);
        assert!(notifier.sent().is_empty());
    }

    struct PanickingSource;

    #[async_trait]
    impl OrderQueryService for PanickingSource {
        async fn query(&self, _order: &OrderId) -> Result<Vec<OrderItem>, QueryError> {
            panic!("source exploded");
        }
    }

    struct SilentNotifier;

    #[async_trait]
    impl NotificationService for SilentNotifier {
        async fn send(&self, _user: &UserId, _text: &str) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_panic_is_contained_and_released() {
        let registry = spawn_registry();
        let ctx = TrackerContext {
            source: Arc::new(PanickingSource),
            notifier: Arc::new(SilentNotifier),
            ready: Arc::new(ReadySet::default()),
            poll_interval: INTERVAL,
        };

        let tracker = start(&registry, "1", ctx).await;
        assert_eq!(supervise(tracker, registry.clone()).await, TrackerOutcome::Failed);
        assert!(registry.list(user()).await.unwrap().is_empty());
    }

    #[test]
    fn test_join_failure_extracts_panic_message() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _guard = rt.enter();
        let err = rt
            .block_on(tokio::spawn(async { panic!("boom") }))
            .unwrap_err();
        assert_eq!(join_failure(err), TrackerError::Panicked("boom".to_string()));
    }
}
