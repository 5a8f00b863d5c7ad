//! Timer and stopwatch engines.
//!
//! # Responsibility
//! - Run the shared countdown state machine on host-driven ticks.
//! - Raise the timer finish alert through the notification gateway.
//!
//! # Invariants
//! - Engines are single-owner; no state is shared between instances.
//! - Nothing here persists across process restarts.

pub mod engine;
pub mod tick;
pub mod timer;
