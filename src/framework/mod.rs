//! Actor plumbing and test doubles.
//!
//! This module provides the small set of building blocks every actor in the crate
//! shares, plus in-memory stand-ins for the external services.
//!
//! # Main Components
//!
//! - [`Response`] - One-shot channel an actor answers on
//! - [`call`] - Send a request and await the answer
//! - [`FrameworkError`] - Common channel errors
//!
//! # Testing
//!
//! See [`mock`] module for in-memory order sources and notifiers.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
