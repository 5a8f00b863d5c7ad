//! Core domain logic for ClockDeck.
//! This crate is the single source of truth for alarm, timer and stopwatch invariants.

pub mod clock;
pub mod countdown;
pub mod db;
pub mod format;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::engine::{
    CountdownEngine, CountdownError, CountdownResult, SubscriptionId, TickOutcome,
};
pub use countdown::tick::{HostTickSource, TickSource, TickToken};
pub use countdown::timer::{TimerSession, TIMER_FINISHED_MESSAGE, TIMER_FINISHED_TITLE};
pub use format::{
    format_clock, format_date, format_duration, format_stopwatch, format_time_until,
    format_timer, format_utc_offset, format_world_clock, DurationFormat, FormatOptions,
    HourFormat, HoursField, WorldClockCity, WORLD_CLOCK_CITIES,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::alarm::{Alarm, AlarmDraft, AlarmId, AlarmTime, AlarmValidationError};
pub use model::countdown::{
    CountdownMode, CountdownSnapshot, CountdownStatus, LapRecord, LapStats, TimerDuration,
    TimerPreset, DEFAULT_TIMER_DURATION, TIMER_PRESETS,
};
pub use model::settings::{ClockSettings, ColorTheme, FontSize};
pub use notify::gateway::{
    ChannelDescriptor, GatewayError, GatewayResult, InstantNotification, NotificationChannel,
    NotificationGateway, ScheduledNotification,
};
pub use notify::outbox::{NotificationCommand, OutboxGateway};
pub use repo::alarm_repo::{AlarmRepository, KvAlarmRepository};
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore};
pub use repo::settings_repo::{KvSettingsRepository, SettingsRepository};
pub use repo::{RepoError, RepoResult};
pub use service::alarm_scheduler::{
    next_fire_instant, AlarmChange, AlarmScheduler, AlarmServiceError, AlarmWarning,
    ReconcileReport, ScheduleState,
};
pub use service::settings_service::{SettingsService, SettingsWarning};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
