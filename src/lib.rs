//! # Order Tracker
//!
//! > **Per-user order status tracking over a chat channel.**
//!
//! A user sends an order number; the crate polls the food court's order source
//! in the background and messages the user as each product becomes ready, then
//! once more when the whole order is complete.
//!
//! ## 🏗️ Design Philosophy
//!
//! The only shared mutable state is the set of active subscriptions and the
//! per-user cooldown. Everything else is either immutable (the ready set,
//! configuration) or owned by exactly one task (a tracker's last snapshot).
//!
//! - **Registry as an actor**: one task owns the subscription table and
//!   processes requests sequentially. Atomic check-and-insert comes for free.
//! - **Cancellation by handle**: every subscription owns a one-shot signal. The
//!   registry fires it; the tracker observes it at every await point.
//! - **Supervised trackers**: a tracker's task is awaited by a supervisor,
//!   which deregisters it no matter how it ended, panics included.
//!
//! ## 🚀 Core Concepts
//!
//! ### The Status Diff
//! [`diff`](model::diff::diff) is a pure function from two snapshots to a list of events.
//! All notification decisions are made there, so they are tested without any
//! runtime at all.
//!
//! ### Mocking
//! Trackers talk to the outside world only through two traits,
//! [`OrderQueryService`](clients::OrderQueryService) and
//! [`NotificationService`](clients::NotificationService). The [`framework::mock`]
//! module provides scripted doubles for both.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each layer defines its own `thiserror` enum. Domain outcomes such as "already
//! tracked" or "order not found" are return values, not errors.
//!
//! ### 2. Stale Release Protection
//! Handles carry an id. A tracker that finishes after its key was cancelled and
//! re-added releases with its old id, which the registry ignores.
//!
//! ### 3. Observability
//! `tracing` everywhere, with one span per tracker carrying `user`, `order` and
//! `handle_id`. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Plumbing ([`framework`])
//! Request/response helpers shared by actors, plus the test doubles.
//!
//! ### 2. The Data ([`model`])
//! Ids, snapshots, the ready set, and the diff.
//!
//! ### 3. The Actors ([`registry_actor`], [`tracker_actor`])
//! The subscription registry and the per-order polling state machine.
//! - **Key items**: [`RegistryActor`](registry_actor::RegistryActor),
//!   [`OrderTracker`](tracker_actor::OrderTracker),
//!   [`supervise`](tracker_actor::supervise).
//!
//! ### 4. The Interface ([`clients`])
//! The registry's typed client and the HTTP collaborators.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Key items**: [`TrackingSystem`](lifecycle::TrackingSystem),
//!   [`shutdown`](lifecycle::TrackingSystem::shutdown).
//!
//! ### 6. The Front Door ([`dispatcher`], [`messages`])
//! Command parsing and every text the user sees.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- order-tracker.toml
//! ```
//!
//! Then type `<phone> <message>` lines, e.g. `905551112233 12345`.

pub mod clients;
pub mod config;
pub mod cooldown;
pub mod dispatcher;
pub mod framework;
pub mod lifecycle;
pub mod messages;
pub mod model;
pub mod registry_actor;
pub mod tracker_actor;
