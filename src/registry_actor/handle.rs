//! Cancellation handles shared between the registry and a tracker.
//!
//! Each accepted subscription creates one `oneshot` pair:
//!
//! - [`TrackingHandle`] keeps the sender. It lives only inside the registry.
//! - [`TrackingLease`] carries the receiver and goes to the tracker task.
//!
//! Firing consumes the sender, so a handle can fire at most once. Dropping an
//! unfired handle closes the channel, which the tracker observes exactly like
//! an explicit cancel.

use crate::model::TrackingKey;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Distinguishes successive handles for the same key.
pub type HandleId = u64;

/// Registry-owned cancellation control for one tracker.
#[derive(Debug)]
pub struct TrackingHandle {
    id: HandleId,
    cancel: oneshot::Sender<()>,
}

impl TrackingHandle {
    pub(crate) fn new(id: HandleId, key: TrackingKey) -> (Self, TrackingLease) {
        let (cancel, receiver) = oneshot::channel();
        let handle = Self { id, cancel };
        let lease = TrackingLease {
            key,
            handle_id: id,
            signal: CancelSignal {
                receiver,
                fired: false,
            },
        };
        (handle, lease)
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Fires the cancellation signal. The tracker may already be gone.
    pub fn fire(self) {
        let _ = self.cancel.send(());
    }
}

/// What a tracker receives when its subscription is accepted.
#[derive(Debug)]
pub struct TrackingLease {
    pub key: TrackingKey,
    pub handle_id: HandleId,
    pub signal: CancelSignal,
}

/// Tracker-side view of the cancellation channel.
#[derive(Debug)]
pub struct CancelSignal {
    receiver: oneshot::Receiver<()>,
    fired: bool,
}

impl CancelSignal {
    /// Resolves once the handle fires or is dropped.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the signal
    /// untouched, so it can sit in one arm of a `tokio::select!`.
    pub async fn cancelled(&mut self) {
        if !self.fired {
            let _ = (&mut self.receiver).await;
            self.fired = true;
        }
    }

    pub fn is_cancelled(&mut self) -> bool {
        if !self.fired && !matches!(self.receiver.try_recv(), Err(TryRecvError::Empty)) {
            self.fired = true;
        }
        self.fired
    }
}
