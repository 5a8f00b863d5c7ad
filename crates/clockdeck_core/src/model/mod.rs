//! Domain model for alarms, countdowns and clock settings.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation next to the data it protects.
//!
//! # Invariants
//! - Every alarm is identified by a stable `AlarmId`.
//! - Countdown values are plain data; behavior lives in `crate::countdown`.

pub mod alarm;
pub mod countdown;
pub mod settings;
