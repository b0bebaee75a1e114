//! # Core Actor Plumbing
//!
//! This module defines the request/response building blocks shared by every actor
//! in the crate.
//!
//! ## Key Types
//!
//! - [`Response`]: The one-shot channel an actor answers on.
//! - [`FrameworkError`]: Failures of the channel itself (ActorClosed, ActorDropped).
//! - [`call`]: Sends a request and awaits its answer.

use tokio::sync::{mpsc, oneshot};

// =============================================================================
// 1. ERRORS
// =============================================================================

/// Errors that can occur within the actor plumbing itself.
///
/// These never describe a domain outcome. A registry that rejects a duplicate
/// subscription answers `None`; it does not produce a `FrameworkError`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}

// =============================================================================
// 2. MESSAGES
// =============================================================================

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<T>;

// =============================================================================
// 3. CLIENT SIDE
// =============================================================================

/// Sends one request to an actor and waits for its answer.
///
/// # Architecture Note
/// Every typed client method follows the same three steps: create a `oneshot`
/// pair, wrap the sender into the request enum, await the receiver. `build`
/// receives the responder and returns the message to send, so a client method
/// shrinks to a single expression:
///
/// ```rust,ignore
/// call(&self.sender, |respond_to| RegistryRequest::List { user, respond_to }).await
/// ```
pub async fn call<M, T>(
    sender: &mpsc::Sender<M>,
    build: impl FnOnce(Response<T>) -> M,
) -> Result<T, FrameworkError> {
    let (respond_to, response) = oneshot::channel();
    sender
        .send(build(respond_to))
        .await
        .map_err(|_| FrameworkError::ActorClosed)?;
    response.await.map_err(|_| FrameworkError::ActorDropped)
}
