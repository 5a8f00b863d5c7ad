//! Outbox gateway: queues notification commands for the host to apply.
//!
//! # Responsibility
//! - Record schedule/cancel/present commands in call order.
//! - Mirror the host's permission state so refusals surface synchronously.
//!
//! # Invariants
//! - Refused commands are never queued.
//! - `drain` hands every queued command over exactly once.

use crate::notify::gateway::{
    GatewayError, GatewayResult, InstantNotification, NotificationGateway, ScheduledNotification,
};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// One pending host-side notification operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCommand {
    Schedule(ScheduledNotification),
    Cancel { id: String },
    CancelAll,
    Present(InstantNotification),
}

#[derive(Debug)]
struct OutboxState {
    permission_granted: bool,
    queue: VecDeque<NotificationCommand>,
}

/// In-process gateway backed by a command queue.
#[derive(Debug)]
pub struct OutboxGateway {
    state: Mutex<OutboxState>,
}

impl Default for OutboxGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboxGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OutboxState {
                permission_granted: true,
                queue: VecDeque::new(),
            }),
        }
    }

    /// Updates the permission state reported by the host.
    pub fn set_permission_granted(&self, granted: bool) {
        self.lock().permission_granted = granted;
    }

    pub fn permission_granted(&self) -> bool {
        self.lock().permission_granted
    }

    /// Takes all queued commands in call order.
    pub fn drain(&self) -> Vec<NotificationCommand> {
        self.lock().queue.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> MutexGuard<'_, OutboxState> {
        // The queue stays structurally valid even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push_permitted(&self, command: NotificationCommand) -> GatewayResult<()> {
        let mut state = self.lock();
        if !state.permission_granted {
            return Err(GatewayError::PermissionDenied);
        }
        state.queue.push_back(command);
        Ok(())
    }
}

impl NotificationGateway for OutboxGateway {
    fn schedule(&self, request: &ScheduledNotification) -> GatewayResult<()> {
        self.push_permitted(NotificationCommand::Schedule(request.clone()))
    }

    fn cancel(&self, id: &str) {
        self.lock().queue.push_back(NotificationCommand::Cancel {
            id: id.to_string(),
        });
    }

    fn cancel_all(&self) {
        let mut state = self.lock();
        // Anything still queued would be cancelled by the host anyway.
        state.queue.clear();
        state.queue.push_back(NotificationCommand::CancelAll);
    }

    fn present(&self, notification: &InstantNotification) -> GatewayResult<()> {
        self.push_permitted(NotificationCommand::Present(notification.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationCommand, OutboxGateway};
    use crate::notify::gateway::{
        GatewayError, InstantNotification, NotificationChannel, NotificationGateway,
    };

    fn finished() -> InstantNotification {
        InstantNotification {
            channel: NotificationChannel::Timer,
            title: "Timer Finished".to_string(),
            message: "done".to_string(),
        }
    }

    #[test]
    fn commands_drain_in_call_order() {
        let outbox = OutboxGateway::new();
        outbox.present(&finished()).expect("present");
        outbox.cancel("a");

        let drained = outbox.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], NotificationCommand::Present(_)));
        assert_eq!(
            drained[1],
            NotificationCommand::Cancel {
                id: "a".to_string()
            }
        );
        assert_eq!(outbox.pending_len(), 0);
    }

    #[test]
    fn denied_permission_refuses_without_queueing() {
        let outbox = OutboxGateway::new();
        outbox.set_permission_granted(false);
        assert_eq!(outbox.present(&finished()), Err(GatewayError::PermissionDenied));
        assert_eq!(outbox.pending_len(), 0);

        outbox.cancel("still-allowed");
        assert_eq!(outbox.pending_len(), 1);
    }

    #[test]
    fn cancel_all_supersedes_queued_commands() {
        let outbox = OutboxGateway::new();
        outbox.present(&finished()).expect("present");
        outbox.cancel_all();
        assert_eq!(outbox.drain(), vec![NotificationCommand::CancelAll]);
    }

    #[test]
    fn channel_descriptors_are_fixed() {
        assert_eq!(NotificationChannel::Alarm.id(), "alarm-channel");
        assert_eq!(NotificationChannel::Timer.id(), "timer-channel");
        assert_eq!(
            NotificationChannel::Timer.descriptor().name,
            "Timer Notifications"
        );
    }
}
