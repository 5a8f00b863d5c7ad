//! Notification gateway contract.
//!
//! The host OS owns delivery. Core only asks for a one-shot or daily wake
//! signal keyed by id, cancels it, or presents an immediate notification.

use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Delivery channel (Android channel / iOS category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Alarm,
    Timer,
}

/// Registration metadata the host needs to create a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub channel: NotificationChannel,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 2] = [Self::Alarm, Self::Timer];

    pub fn id(self) -> &'static str {
        self.descriptor().id
    }

    pub fn descriptor(self) -> ChannelDescriptor {
        match self {
            Self::Alarm => ChannelDescriptor {
                channel: self,
                id: "alarm-channel",
                name: "Alarm Notifications",
                description: "Notifications for alarms",
            },
            Self::Timer => ChannelDescriptor {
                channel: self,
                id: "timer-channel",
                name: "Timer Notifications",
                description: "Notifications for timers",
            },
        }
    }
}

/// A wake signal to deliver at `fire_at` local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub id: String,
    pub channel: NotificationChannel,
    pub title: String,
    pub message: String,
    pub fire_at: NaiveDateTime,
    pub repeat_daily: bool,
    pub sound: String,
}

/// A notification to show right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantNotification {
    pub channel: NotificationChannel,
    pub title: String,
    pub message: String,
}

/// Gateway refusal. Never fatal to core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    PermissionDenied,
    Unavailable(String),
    Rejected(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("notification permission denied"),
            Self::Unavailable(reason) => write!(f, "notification service unavailable: {reason}"),
            Self::Rejected(reason) => write!(f, "notification rejected: {reason}"),
        }
    }
}

impl Error for GatewayError {}

/// Host notification API as seen from core.
pub trait NotificationGateway {
    /// Registers (or replaces) the notification with `request.id`.
    fn schedule(&self, request: &ScheduledNotification) -> GatewayResult<()>;
    fn cancel(&self, id: &str);
    fn cancel_all(&self);
    fn present(&self, notification: &InstantNotification) -> GatewayResult<()>;
}

impl<G: NotificationGateway + ?Sized> NotificationGateway for &G {
    fn schedule(&self, request: &ScheduledNotification) -> GatewayResult<()> {
        (**self).schedule(request)
    }

    fn cancel(&self, id: &str) {
        (**self).cancel(id)
    }

    fn cancel_all(&self) {
        (**self).cancel_all()
    }

    fn present(&self, notification: &InstantNotification) -> GatewayResult<()> {
        (**self).present(notification)
    }
}

impl<G: NotificationGateway + ?Sized> NotificationGateway for Arc<G> {
    fn schedule(&self, request: &ScheduledNotification) -> GatewayResult<()> {
        (**self).schedule(request)
    }

    fn cancel(&self, id: &str) {
        (**self).cancel(id)
    }

    fn cancel_all(&self) {
        (**self).cancel_all()
    }

    fn present(&self, notification: &InstantNotification) -> GatewayResult<()> {
        (**self).present(notification)
    }
}
