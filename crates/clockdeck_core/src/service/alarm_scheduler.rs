//! Alarm use-case service and notification reconciliation.
//!
//! # Responsibility
//! - Own the in-memory alarm list and persist it as one unit after each mutation.
//! - Keep exactly one gateway registration per active alarm and none for
//!   inactive or deleted alarms.
//! - Re-arm repeating alarms and retire one-shot alarms after they fire.
//!
//! # Invariants
//! - In-memory state is authoritative; a failed save is reported as a warning
//!   and never rolls back the mutation.
//! - A refused gateway registration leaves the alarm active but unscheduled
//!   so `retry_scheduling`/`on_foreground` can try again.
//! - A fire instant equal to "now" counts as passed and moves to tomorrow.
//! - Each registration instant is persisted on the alarm, so a one-shot
//!   alarm that fired while the process was down is retired on `load`.

use crate::clock::Clock;
use crate::format::format_time_until;
use crate::model::alarm::{Alarm, AlarmDraft, AlarmId, AlarmTime, AlarmValidationError};
use crate::notify::gateway::{
    GatewayError, NotificationChannel, NotificationGateway, ScheduledNotification,
};
use crate::repo::alarm_repo::AlarmRepository;
use crate::repo::RepoError;
use chrono::{NaiveDateTime, TimeDelta};
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ALARM_NOTIFICATION_TITLE: &str = "Alarm";

/// Next instant strictly after `now` at which `time` occurs.
pub fn next_fire_instant(time: AlarmTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time.to_naive_time());
    if today <= now {
        today + TimeDelta::days(1)
    } else {
        today
    }
}

/// Hard failure of an alarm operation. No state changes when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmServiceError {
    NotFound(AlarmId),
    Validation(AlarmValidationError),
}

impl Display for AlarmServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "alarm not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AlarmServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<AlarmValidationError> for AlarmServiceError {
    fn from(value: AlarmValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Non-fatal condition raised alongside a successful mutation.
#[derive(Debug)]
pub enum AlarmWarning {
    SchedulingFailed {
        alarm_id: AlarmId,
        error: GatewayError,
    },
    PersistenceFailed(RepoError),
}

impl Display for AlarmWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchedulingFailed { alarm_id, error } => {
                write!(f, "scheduling failed for alarm {alarm_id}: {error}")
            }
            Self::PersistenceFailed(err) => write!(f, "saving alarms failed: {err}"),
        }
    }
}

/// Per-alarm scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    Unscheduled,
    Scheduled { fire_at: NaiveDateTime },
}

/// Result of a successful alarm mutation.
#[derive(Debug)]
pub struct AlarmChange {
    pub alarm: Alarm,
    pub schedule: ScheduleState,
    pub warnings: Vec<AlarmWarning>,
}

/// Result of a foreground reconciliation sweep.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// One-shot alarms whose instant passed; now inactive.
    pub deactivated: Vec<AlarmId>,
    /// Alarms that got a fresh registration.
    pub rescheduled: Vec<AlarmId>,
    pub warnings: Vec<AlarmWarning>,
}

/// Alarm list owner and notification reconciler.
pub struct AlarmScheduler<R: AlarmRepository, G: NotificationGateway, C: Clock> {
    repo: R,
    gateway: G,
    clock: C,
    alarms: Vec<Alarm>,
    scheduled: BTreeMap<AlarmId, NaiveDateTime>,
}

impl<R: AlarmRepository, G: NotificationGateway, C: Clock> AlarmScheduler<R, G, C> {
    /// Creates an empty scheduler. Call `load` to restore persisted alarms.
    pub fn new(repo: R, gateway: G, clock: C) -> Self {
        Self {
            repo,
            gateway,
            clock,
            alarms: Vec::new(),
            scheduled: BTreeMap::new(),
        }
    }

    /// Restores alarms from the repository and re-registers active ones.
    ///
    /// Clears every host registration first so stale ids from earlier
    /// sessions cannot survive. One-shot alarms whose persisted instant has
    /// passed are deactivated instead of re-armed.
    pub fn load(&mut self) -> Vec<AlarmWarning> {
        let mut warnings = Vec::new();
        match self.repo.load_alarms() {
            Ok(alarms) => self.alarms = alarms,
            Err(err) => {
                error!(
                    "event=alarms_load module=alarm status=error error_code=persistence_failed error={}",
                    err
                );
                warnings.push(AlarmWarning::PersistenceFailed(err));
            }
        }

        self.gateway.cancel_all();
        self.scheduled.clear();
        let restored = self.alarms.clone();
        let now = self.clock.now();
        let mut retired = 0usize;
        for index in 0..self.alarms.len() {
            let alarm = &mut self.alarms[index];
            let passed = alarm.scheduled_for.is_some_and(|fire_at| fire_at <= now);
            alarm.scheduled_for = None;
            if !alarm.is_active {
                continue;
            }
            if passed && !alarm.repeat_daily {
                alarm.is_active = false;
                retired += 1;
                continue;
            }
            if let Err(warning) = self.register(index) {
                warnings.push(warning);
            }
        }
        if self.alarms != restored {
            self.persist_into(&mut warnings);
        }
        info!(
            "event=alarms_load module=alarm status=ok count={} scheduled={} retired={}",
            self.alarms.len(),
            self.scheduled.len(),
            retired
        );
        warnings
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn schedule_state(&self, id: AlarmId) -> ScheduleState {
        match self.scheduled.get(&id) {
            Some(fire_at) => ScheduleState::Scheduled { fire_at: *fire_at },
            None => ScheduleState::Unscheduled,
        }
    }

    /// Label such as `7h 30m` until the alarm's registered instant.
    pub fn time_until(&self, id: AlarmId) -> Option<String> {
        self.scheduled
            .get(&id)
            .map(|fire_at| format_time_until(self.clock.now(), *fire_at))
    }

    /// Adds a new active alarm and schedules it.
    pub fn create(&mut self, draft: &AlarmDraft) -> Result<AlarmChange, AlarmServiceError> {
        let alarm = Alarm::from_draft(draft)?;
        info!(
            "event=alarm_create module=alarm status=ok alarm_id={} time={} repeat={}",
            alarm.id, alarm.time, alarm.repeat_daily
        );
        self.alarms.push(alarm);
        let index = self.alarms.len() - 1;

        let mut warnings = Vec::new();
        if let Err(warning) = self.register(index) {
            warnings.push(warning);
        }
        self.persist_into(&mut warnings);
        Ok(self.change(index, warnings))
    }

    /// Edits time, title, sound and repeat. Active alarms are rescheduled.
    pub fn update(
        &mut self,
        id: AlarmId,
        draft: &AlarmDraft,
    ) -> Result<AlarmChange, AlarmServiceError> {
        let index = self.index_of(id)?;
        self.alarms[index].apply_draft(draft)?;

        let mut warnings = Vec::new();
        if self.alarms[index].is_active {
            if let Err(warning) = self.register(index) {
                warnings.push(warning);
            }
        }
        self.persist_into(&mut warnings);
        Ok(self.change(index, warnings))
    }

    /// Activates or deactivates an alarm.
    ///
    /// Activating an already scheduled alarm keeps its registration.
    pub fn set_active(
        &mut self,
        id: AlarmId,
        active: bool,
    ) -> Result<AlarmChange, AlarmServiceError> {
        let index = self.index_of(id)?;
        let mut warnings = Vec::new();

        let before = self.alarms[index].clone();
        if active {
            self.alarms[index].is_active = true;
            if !self.scheduled.contains_key(&id) {
                if let Err(warning) = self.register(index) {
                    warnings.push(warning);
                }
            }
        } else {
            self.unregister(id);
            self.alarms[index].is_active = false;
        }
        if self.alarms[index] != before {
            self.persist_into(&mut warnings);
        }
        Ok(self.change(index, warnings))
    }

    pub fn toggle(&mut self, id: AlarmId) -> Result<AlarmChange, AlarmServiceError> {
        let index = self.index_of(id)?;
        let active = !self.alarms[index].is_active;
        self.set_active(id, active)
    }

    /// Removes the alarm and its registration.
    pub fn delete(&mut self, id: AlarmId) -> Result<Vec<AlarmWarning>, AlarmServiceError> {
        let index = self.index_of(id)?;
        self.unregister(id);
        self.alarms.remove(index);
        info!("event=alarm_delete module=alarm status=ok alarm_id={}", id);

        let mut warnings = Vec::new();
        self.persist_into(&mut warnings);
        Ok(warnings)
    }

    /// Tries again to register an active alarm that is not scheduled.
    pub fn retry_scheduling(&mut self, id: AlarmId) -> Result<AlarmChange, AlarmServiceError> {
        let index = self.index_of(id)?;
        let mut warnings = Vec::new();
        if self.alarms[index].is_active && !self.scheduled.contains_key(&id) {
            match self.register(index) {
                Ok(_) => self.persist_into(&mut warnings),
                Err(warning) => warnings.push(warning),
            }
        }
        Ok(self.change(index, warnings))
    }

    /// Handles the host's acknowledgment that an alarm went off.
    ///
    /// Repeating alarms are re-armed for the next day; one-shot alarms
    /// deactivate themselves.
    pub fn handle_fired(&mut self, id: AlarmId) -> Result<AlarmChange, AlarmServiceError> {
        let index = self.index_of(id)?;
        let mut warnings = Vec::new();
        if !self.alarms[index].is_active {
            return Ok(self.change(index, warnings));
        }

        info!(
            "event=alarm_fired module=alarm status=ok alarm_id={} repeat={}",
            id, self.alarms[index].repeat_daily
        );
        if self.alarms[index].repeat_daily {
            if let Err(warning) = self.register(index) {
                warnings.push(warning);
            }
        } else {
            self.unregister(id);
            self.alarms[index].is_active = false;
        }
        self.persist_into(&mut warnings);
        Ok(self.change(index, warnings))
    }

    /// Foreground sweep: retires passed one-shot alarms, re-arms passed
    /// repeating alarms and retries unscheduled active alarms.
    pub fn on_foreground(&mut self) -> ReconcileReport {
        let now = self.clock.now();
        let mut report = ReconcileReport::default();

        for index in 0..self.alarms.len() {
            let alarm = &self.alarms[index];
            if !alarm.is_active {
                continue;
            }
            let (id, repeat_daily) = (alarm.id, alarm.repeat_daily);
            match self.scheduled.get(&id).copied() {
                Some(fire_at) if fire_at > now => {}
                Some(_) if !repeat_daily => {
                    self.unregister(id);
                    self.alarms[index].is_active = false;
                    report.deactivated.push(id);
                }
                _ => match self.register(index) {
                    Ok(_) => report.rescheduled.push(id),
                    Err(warning) => report.warnings.push(warning),
                },
            }
        }

        if !report.deactivated.is_empty() || !report.rescheduled.is_empty() {
            self.persist_into(&mut report.warnings);
        }
        info!(
            "event=alarms_reconcile module=alarm status=ok deactivated={} rescheduled={} warnings={}",
            report.deactivated.len(),
            report.rescheduled.len(),
            report.warnings.len()
        );
        report
    }

    fn index_of(&self, id: AlarmId) -> Result<usize, AlarmServiceError> {
        self.alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or(AlarmServiceError::NotFound(id))
    }

    fn change(&self, index: usize, warnings: Vec<AlarmWarning>) -> AlarmChange {
        let alarm = self.alarms[index].clone();
        let schedule = self.schedule_state(alarm.id);
        AlarmChange {
            alarm,
            schedule,
            warnings,
        }
    }

    /// Replaces any registration of the alarm at `index` with a fresh one.
    fn register(&mut self, index: usize) -> Result<NaiveDateTime, AlarmWarning> {
        let alarm = &self.alarms[index];
        let id = alarm.id;
        let fire_at = next_fire_instant(alarm.time, self.clock.now());
        let request = ScheduledNotification {
            id: alarm.notification_id(),
            channel: NotificationChannel::Alarm,
            title: ALARM_NOTIFICATION_TITLE.to_string(),
            message: alarm.title.clone(),
            fire_at,
            repeat_daily: alarm.repeat_daily,
            sound: alarm.sound.clone(),
        };

        self.unregister(id);
        match self.gateway.schedule(&request) {
            Ok(()) => {
                self.scheduled.insert(id, fire_at);
                self.alarms[index].scheduled_for = Some(fire_at);
                info!(
                    "event=alarm_schedule module=alarm status=ok alarm_id={} fire_at={}",
                    id, fire_at
                );
                Ok(fire_at)
            }
            Err(err) => {
                warn!(
                    "event=alarm_schedule module=alarm status=error alarm_id={} error_code=scheduling_failed error={}",
                    id, err
                );
                Err(AlarmWarning::SchedulingFailed {
                    alarm_id: id,
                    error: err,
                })
            }
        }
    }

    fn unregister(&mut self, id: AlarmId) {
        if self.scheduled.remove(&id).is_some() {
            self.gateway.cancel(&id.to_string());
        }
        if let Some(alarm) = self.alarms.iter_mut().find(|alarm| alarm.id == id) {
            alarm.scheduled_for = None;
        }
    }

    fn persist_into(&self, warnings: &mut Vec<AlarmWarning>) {
        if let Err(err) = self.repo.save_alarms(&self.alarms) {
            error!(
                "event=alarms_save module=alarm status=error error_code=persistence_failed count={} error={}",
                self.alarms.len(),
                err
            );
            warnings.push(AlarmWarning::PersistenceFailed(err));
        }
    }
}
