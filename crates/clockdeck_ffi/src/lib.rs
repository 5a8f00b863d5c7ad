//! Flutter-facing bindings for ClockDeck core.

pub mod api;
