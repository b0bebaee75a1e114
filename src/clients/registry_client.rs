use crate::framework::call;
use crate::model::{OrderId, TrackingKey, UserId};
use crate::registry_actor::messages::RegistryRequest;
use crate::registry_actor::{HandleId, RegistryError, TrackingLease};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Client for interacting with the tracking registry.
#[derive(Clone)]
pub struct RegistryClient {
    sender: mpsc::Sender<RegistryRequest>,
}

impl RegistryClient {
    pub fn new(sender: mpsc::Sender<RegistryRequest>) -> Self {
        Self { sender }
    }

    /// Registers the key. `None` means it was already tracked.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn try_add(&self, key: TrackingKey) -> Result<Option<TrackingLease>, RegistryError> {
        debug!("Sending request");
        Ok(call(&self.sender, |respond_to| RegistryRequest::TryAdd { key, respond_to }).await?)
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove(&self, key: TrackingKey) -> Result<bool, RegistryError> {
        debug!("Sending request");
        Ok(call(&self.sender, |respond_to| RegistryRequest::Remove { key, respond_to }).await?)
    }

    #[instrument(skip(self))]
    pub async fn remove_all(&self, user: UserId) -> Result<bool, RegistryError> {
        debug!("Sending request");
        Ok(call(&self.sender, |respond_to| RegistryRequest::RemoveAll { user, respond_to }).await?)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user: UserId) -> Result<Vec<OrderId>, RegistryError> {
        Ok(call(&self.sender, |respond_to| RegistryRequest::List { user, respond_to }).await?)
    }

    /// Removes the key only if it still holds `handle_id`.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn release(&self, key: TrackingKey, handle_id: HandleId) -> Result<bool, RegistryError> {
        debug!("Sending request");
        Ok(call(&self.sender, |respond_to| RegistryRequest::Release {
            key,
            handle_id,
            respond_to,
        })
        .await?)
    }

    /// Fires every handle and empties the registry. Returns how many were fired.
    #[instrument(skip(self))]
    pub async fn cancel_everything(&self) -> Result<usize, RegistryError> {
        debug!("Sending request");
        Ok(call(&self.sender, |respond_to| RegistryRequest::CancelEverything { respond_to }).await?)
    }
}
