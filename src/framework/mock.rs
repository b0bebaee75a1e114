//! # Mock Framework
//!
//! Test doubles for the two external collaborators.
//!
//! - [`MockOrderSource`]: scripted replies per order, queued with a fluent
//!   builder and checked with [`MockOrderSource::verify`].
//! - [`MockNotifier`]: records every message and lets a test wait until a given
//!   number has arrived.
//!
//! Both are cheap to clone; clones share state, so a test keeps one copy and
//! hands another to the system under test.

use crate::clients::{NotificationService, NotifyError, OrderQueryService, QueryError};
use crate::model::{OrderId, OrderItem, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

// =============================================================================
// ORDER SOURCE
// =============================================================================

/// Scripted reply for one query.
#[derive(Debug, Clone)]
enum Reply {
    Items(Vec<OrderItem>),
    Err(String),
    /// Never resolves. Used to park a tracker inside a query.
    Pending,
}

#[derive(Default)]
struct SourceState {
    expectations: HashMap<OrderId, VecDeque<Reply>>,
    queries: HashMap<OrderId, usize>,
}

/// An order source driven by per-order expectation queues.
///
/// Each query pops the next reply for its order. A query with nothing queued
/// fails with [`QueryError::Unavailable`], which trackers treat as transient.
///
/// # Example
/// ```ignore
/// let source = MockOrderSource::new();
/// source.expect_query("123").return_items(vec![OrderItem::new("A", "Hazırlanıyor")]);
/// source.expect_query("123").return_err("gateway down");
/// // hand `Arc::new(source.clone())` to the system ...
/// source.verify();
/// ```
#[derive(Clone, Default)]
pub struct MockOrderSource {
    state: Arc<Mutex<SourceState>>,
}

impl MockOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next unanswered query of `order`.
    pub fn expect_query(&self, order: impl Into<OrderId>) -> QueryExpectationBuilder {
        QueryExpectationBuilder {
            order: order.into(),
            state: self.state.clone(),
        }
    }

    /// Number of queries received for `order` so far.
    pub fn queries(&self, order: impl Into<OrderId>) -> usize {
        self.lock().queries.get(&order.into()).copied().unwrap_or(0)
    }

    /// Panics if any queued reply was never consumed.
    pub fn verify(&self) {
        let state = self.lock();
        let remaining: usize = state.expectations.values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl OrderQueryService for MockOrderSource {
    async fn query(&self, order: &OrderId) -> Result<Vec<OrderItem>, QueryError> {
        let reply = {
            let mut state = self.lock();
            *state.queries.entry(order.clone()).or_default() += 1;
            state
                .expectations
                .get_mut(order)
                .and_then(VecDeque::pop_front)
        };

        match reply {
            Some(Reply::Items(items)) => Ok(items),
            Some(Reply::Err(msg)) => Err(QueryError::Unavailable(msg)),
            Some(Reply::Pending) => std::future::pending().await,
            None => Err(QueryError::Unavailable(format!("no reply queued for {}", order))),
        }
    }
}

/// Builder for query expectations.
pub struct QueryExpectationBuilder {
    order: OrderId,
    state: Arc<Mutex<SourceState>>,
}

impl QueryExpectationBuilder {
    /// Answers with `(product, status)` pairs.
    pub fn return_items<P, S>(self, items: impl IntoIterator<Item = (P, S)>)
    where
        P: Into<String>,
        S: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|(p, s)| OrderItem::new(p, s))
            .collect();
        self.push(Reply::Items(items));
    }

    /// Answers with an order that has no items.
    pub fn return_empty(self) {
        self.push(Reply::Items(Vec::new()));
    }

    /// Fails the query.
    pub fn return_err(self, message: impl Into<String>) {
        self.push(Reply::Err(message.into()));
    }

    /// Never answers.
    pub fn return_pending(self) {
        self.push(Reply::Pending);
    }

    fn push(self, reply: Reply) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.expectations.entry(self.order).or_default().push_back(reply);
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

#[derive(Default)]
struct NotifierState {
    sent: Mutex<Vec<(UserId, String)>>,
    failing: AtomicBool,
    arrived: Notify,
}

/// A notifier that records every attempted message.
///
/// Attempts are recorded even while [`MockNotifier::fail_sends`] is on; the
/// caller just sees an error.
#[derive(Clone, Default)]
pub struct MockNotifier {
    inner: Arc<NotifierState>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn fail_sends(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything sent so far, in send order.
    pub fn sent(&self) -> Vec<(UserId, String)> {
        self.lock().clone()
    }

    /// Texts sent to one user, in send order.
    pub fn messages_for(&self, user: &UserId) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(to, _)| to == user)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Waits until at least `count` messages have been recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<(UserId, String)> {
        loop {
            // Registered before the check so a send in between is not missed.
            let arrived = self.inner.arrived.notified();
            {
                let sent = self.lock();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            arrived.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(UserId, String)>> {
        self.inner.sent.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NotificationService for MockNotifier {
    async fn send(&self, user: &UserId, text: &str) -> Result<(), NotifyError> {
        self.lock().push((user.clone(), text.to_string()));
        self.inner.arrived.notify_waiters();

        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Failed("mock configured to fail".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_source_replies_in_order() {
        let source = MockOrderSource::new();
        source.expect_query("1").return_items([("A", "Hazırlanıyor")]);
        source.expect_query("1").return_err("down");
        source.expect_query("1").return_empty();

        let order = OrderId::from("1");
        assert_eq!(
            source.query(&order).await.unwrap(),
            vec![OrderItem::new("A", "Hazırlanıyor")]
        );
        assert!(source.query(&order).await.is_err());
        assert!(source.query(&order).await.unwrap().is_empty());
        // Exhausted queue
        assert!(matches!(
            source.query(&order).await,
            Err(QueryError::Unavailable(_))
        ));

        assert_eq!(source.queries("1"), 4);
        source.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_panics_on_leftovers() {
        let source = MockOrderSource::new();
        source.expect_query("1").return_empty();
        source.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_never_answers() {
        let source = MockOrderSource::new();
        source.expect_query("1").return_pending();
        let order = OrderId::from("1");
        let result = tokio::time::timeout(Duration::from_secs(3600), source.query(&order)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_notifier_records_and_waits() {
        let notifier = MockNotifier::new();
        let user = UserId::from("u1");

        let waiter = {
            let notifier = notifier.clone();
            tokio::spawn(async move { notifier.wait_for(2).await })
        };

        notifier.send(&user, "one").await.unwrap();
        notifier.fail_sends(true);
        assert!(notifier.send(&user, "two").await.is_err());

        let sent = waiter.await.unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(notifier.messages_for(&user), vec!["one", "two"]);
        assert!(notifier.messages_for(&UserId::from("u2")).is_empty());
    }
}
