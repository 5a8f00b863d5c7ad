//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, gateway and clock calls into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage and host notification details.

pub mod alarm_scheduler;
pub mod settings_service;
