//! Requests understood by the registry actor.

use super::handle::{HandleId, TrackingLease};
use crate::framework::Response;
use crate::model::{OrderId, TrackingKey, UserId};

/// Internal message type sent to the registry actor.
///
/// Every variant is answered exactly once on its `respond_to` channel. The actor
/// handles one message at a time, which is what makes each operation atomic.
#[derive(Debug)]
pub enum RegistryRequest {
    /// Inserts a fresh handle unless the key is already tracked.
    TryAdd {
        key: TrackingKey,
        respond_to: Response<Option<TrackingLease>>,
    },
    /// Fires and removes the handle for the key.
    Remove {
        key: TrackingKey,
        respond_to: Response<bool>,
    },
    /// Fires and removes every handle of the user.
    RemoveAll {
        user: UserId,
        respond_to: Response<bool>,
    },
    /// Sorted order ids the user currently tracks.
    List {
        user: UserId,
        respond_to: Response<Vec<OrderId>>,
    },
    /// Removes the key only while it still holds `handle_id`.
    Release {
        key: TrackingKey,
        handle_id: HandleId,
        respond_to: Response<bool>,
    },
    /// Fires and removes every handle of every user. Answers with the count.
    CancelEverything { respond_to: Response<usize> },
}
