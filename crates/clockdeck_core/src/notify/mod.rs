//! Host notification boundary.
//!
//! # Responsibility
//! - Define the gateway contract core schedules alarms and timers through.
//! - Provide the outbox implementation used by the FFI layer and tests.
//!
//! # Invariants
//! - Notification ids are alarm ids (or the fixed timer id) in string form.
//! - Gateway failures are reported, never panicked on.

pub mod gateway;
pub mod outbox;
