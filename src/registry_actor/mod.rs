//! The authoritative set of active subscriptions.

pub mod actor;
pub mod error;
pub mod handle;
pub mod messages;

pub use actor::RegistryActor;
pub use error::*;
pub use handle::*;

use crate::clients::RegistryClient;
use tokio::sync::mpsc;

/// Creates a new registry actor and its client.
pub fn new(buffer_size: usize) -> (RegistryActor, RegistryClient) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (RegistryActor::new(receiver), RegistryClient::new(sender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, TrackingKey, UserId};

    fn key(user: &str, order: &str) -> TrackingKey {
        TrackingKey::new(UserId::from(user), OrderId::from(order))
    }

    fn spawn_registry() -> RegistryClient {
        let (actor, client) = new(8);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_try_add_rejects_duplicates() {
        let registry = spawn_registry();

        let lease = registry.try_add(key("u1", "123")).await.unwrap();
        assert!(lease.is_some());
        assert!(registry.try_add(key("u1", "123")).await.unwrap().is_none());
        // Same order id under another user is a separate key
        assert!(registry.try_add(key("u2", "123")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_fires_cancellation() {
        let registry = spawn_registry();
        let mut lease = registry.try_add(key("u1", "123")).await.unwrap().unwrap();

        assert!(registry.remove(key("u1", "123")).await.unwrap());
        lease.signal.cancelled().await;
        assert!(registry.list(UserId::from("u1")).await.unwrap().is_empty());

        assert!(!registry.remove(key("u1", "123")).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_all_is_scoped_to_user() {
        let registry = spawn_registry();
        let mut a = registry.try_add(key("u1", "1")).await.unwrap().unwrap();
        let mut b = registry.try_add(key("u1", "2")).await.unwrap().unwrap();
        let mut other = registry.try_add(key("u2", "1")).await.unwrap().unwrap();

        assert!(registry.remove_all(UserId::from("u1")).await.unwrap());
        assert!(a.signal.is_cancelled());
        assert!(b.signal.is_cancelled());
        assert!(!other.signal.is_cancelled());

        assert!(!registry.remove_all(UserId::from("u1")).await.unwrap());
        assert_eq!(
            registry.list(UserId::from("u2")).await.unwrap(),
            vec![OrderId::from("1")]
        );
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = spawn_registry();
        for order in ["300", "100", "200"] {
            registry.try_add(key("u1", order)).await.unwrap();
        }
        assert_eq!(
            registry.list(UserId::from("u1")).await.unwrap(),
            vec![OrderId::from("100"), OrderId::from("200"), OrderId::from("300")]
        );
        assert!(registry.list(UserId::from("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_release_keeps_newer_handle() {
        let registry = spawn_registry();
        let old = registry.try_add(key("u1", "123")).await.unwrap().unwrap();
        assert!(registry.remove(key("u1", "123")).await.unwrap());
        let new = registry.try_add(key("u1", "123")).await.unwrap().unwrap();
        assert_ne!(old.handle_id, new.handle_id);

        assert!(!registry.release(old.key.clone(), old.handle_id).await.unwrap());
        assert_eq!(
            registry.list(UserId::from("u1")).await.unwrap(),
            vec![OrderId::from("123")]
        );

        assert!(registry.release(new.key.clone(), new.handle_id).await.unwrap());
        assert!(registry.list(UserId::from("u1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_add_is_rolled_back() {
        let registry = spawn_registry();

        // Queue the request, then drop the caller before the answer arrives
        tokio::select! {
            biased;
            _ = registry.try_add(key("u1", "123")) => panic!("add answered before the registry ran"),
            _ = std::future::ready(()) => {}
        }

        assert!(registry.list(UserId::from("u1")).await.unwrap().is_empty());
        assert!(registry.try_add(key("u1", "123")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cancel_everything() {
        let registry = spawn_registry();
        let mut a = registry.try_add(key("u1", "1")).await.unwrap().unwrap();
        let mut b = registry.try_add(key("u2", "2")).await.unwrap().unwrap();

        assert_eq!(registry.cancel_everything().await.unwrap(), 2);
        assert!(a.signal.is_cancelled());
        assert!(b.signal.is_cancelled());
        assert_eq!(registry.cancel_everything().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dropped_registry_reports_error() {
        let (actor, client) = new(1);
        drop(actor);
        let err = client.list(UserId::from("u1")).await.unwrap_err();
        assert!(matches!(err, RegistryError::ActorCommunicationError(_)));
    }
}
