//! Typed clients: the registry actor's handle and the external collaborators.

pub mod notifier;
pub mod order_source;
pub mod registry_client;

pub use notifier::*;
pub use order_source::*;
pub use registry_client::*;
