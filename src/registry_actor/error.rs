//! Error types for the tracking registry.

use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur while talking to the registry.
///
/// Domain outcomes such as "already tracked" are plain return values; this
/// enum only covers the registry being unreachable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for RegistryError {
    fn from(e: FrameworkError) -> Self {
        RegistryError::ActorCommunicationError(e.to_string())
    }
}
