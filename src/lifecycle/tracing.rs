//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the
//! `tracing` crate. Log levels come from the `RUST_LOG` environment variable;
//! the compact format hides the module prefix (`with_target(false)`).
//!
//! ## What Gets Traced
//!
//! - **Registry**: every add, remove, release (with `handle_id` and `size`)
//! - **Trackers**: start, state transitions, transient poll failures, exit
//! - **Clients**: one span per call via `#[instrument]`
//!
//! ## Usage Examples
//!
//! ```bash
//! RUST_LOG=info order-tracker config.toml
//! RUST_LOG=order_tracker=debug order-tracker config.toml
//! ```
//!
//! ## Workflow Trace Example
//!
//! A user starting order 123 whose first item becomes ready on the next poll,
//! with `RUST_LOG=info`:
//!
//! ```text
//! INFO Added key=905551112233/123 handle_id=1 size=1
//! INFO tracker: Tracker started user=905551112233 order=123 handle_id=1
//! INFO tracker: Tracking active items=2
//! INFO tracker: Item ready product="Item1"
//! ```
//!
//! Every tracker line carries the `tracker` span, so `user` and `order` never
//! have to be repeated by hand.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
