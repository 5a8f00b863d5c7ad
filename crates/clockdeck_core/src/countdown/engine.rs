//! Tick-driven countdown/stopwatch state machine.
//!
//! # Responsibility
//! - Track elapsed (stopwatch) or remaining (timer) time across
//!   start/pause/resume/reset/lap.
//! - Own exactly one periodic tick registration while running.
//! - Publish an immutable snapshot to subscribers after every change.
//!
//! # Invariants
//! - Time advances only in `Running`, and only for the active tick token.
//! - At most one tick registration is held per engine.
//! - `pause`, `reset` and finishing cancel the tick before returning.
//! - A stopwatch never enters `Finished`; a finished timer stays finished
//!   until `reset`.
//! - Start from `Idle` zeroes a stopwatch.
//!
//! # Known limitation
//! - `on_tick` applies the mode's fixed interval per delivery and inherits
//!   the tick source's drift. Callers that measure real elapsed time use
//!   `advance` instead.

use crate::countdown::tick::{TickSource, TickToken};
use crate::model::countdown::{
    CountdownMode, CountdownSnapshot, CountdownStatus, LapRecord, LapStats, TimerDuration,
    TimerPreset, DEFAULT_TIMER_DURATION,
};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type CountdownResult<T> = Result<T, CountdownError>;

/// Rejected engine operation. No state changes when returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownError {
    /// Timer start with a zero configured duration.
    InvalidDuration,
    InvalidTransition {
        status: CountdownStatus,
        operation: &'static str,
    },
    UnsupportedInMode {
        mode: CountdownMode,
        operation: &'static str,
    },
}

impl Display for CountdownError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration => f.write_str("please set a valid time for the timer"),
            Self::InvalidTransition { status, operation } => {
                write!(f, "cannot {operation} while {status}")
            }
            Self::UnsupportedInMode { mode, operation } => {
                write!(f, "{operation} is not available for a {mode}")
            }
        }
    }
}

impl Error for CountdownError {}

/// Result of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token or engine not running.
    Ignored,
    Advanced,
    /// Timer reached zero on this tick.
    Finished,
}

pub type SubscriptionId = u64;
type Listener = Box<dyn FnMut(&CountdownSnapshot) + Send>;

/// Shared engine for the timer and stopwatch screens.
pub struct CountdownEngine<S: TickSource> {
    mode: CountdownMode,
    status: CountdownStatus,
    elapsed_ms: u64,
    remaining_ms: u64,
    run_total_ms: u64,
    configured: TimerDuration,
    laps: Vec<LapRecord>,
    ticks: S,
    active_tick: Option<TickToken>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl<S: TickSource> CountdownEngine<S> {
    pub fn stopwatch(ticks: S) -> Self {
        Self::new(CountdownMode::Stopwatch, ticks)
    }

    pub fn timer(ticks: S) -> Self {
        Self::new(CountdownMode::Timer, ticks)
    }

    fn new(mode: CountdownMode, ticks: S) -> Self {
        Self {
            mode,
            status: CountdownStatus::Idle,
            elapsed_ms: 0,
            remaining_ms: 0,
            run_total_ms: 0,
            configured: DEFAULT_TIMER_DURATION,
            laps: Vec::new(),
            ticks,
            active_tick: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn mode(&self) -> CountdownMode {
        self.mode
    }

    pub fn status(&self) -> CountdownStatus {
        self.status
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn lap_stats(&self) -> Option<LapStats> {
        LapStats::from_laps(&self.laps)
    }

    pub fn configured(&self) -> TimerDuration {
        self.configured
    }

    /// Token of the tick registration currently held, if running.
    pub fn active_tick(&self) -> Option<TickToken> {
        self.active_tick
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.mode.tick_interval_ms())
    }

    pub fn tick_source(&self) -> &S {
        &self.ticks
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            mode: self.mode,
            status: self.status,
            elapsed_ms: self.elapsed_ms,
            remaining_ms: self.remaining_ms,
            run_total_ms: self.run_total_ms,
            configured: self.configured,
            laps: self.laps.clone(),
        }
    }

    /// Registers a listener called with a fresh snapshot after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CountdownSnapshot) + Send + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Sets the timer length used by the next start from `Idle`.
    pub fn set_duration(&mut self, duration: TimerDuration) -> CountdownResult<()> {
        self.require_mode(CountdownMode::Timer, "set duration")?;
        self.require_status(CountdownStatus::Idle, "set duration")?;
        self.configured = duration;
        self.remaining_ms = 0;
        self.publish();
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: &TimerPreset) -> CountdownResult<()> {
        self.set_duration(preset.duration)
    }

    /// Starts from `Idle`, or resumes from `Paused`. A no-op while running.
    pub fn start(&mut self) -> CountdownResult<()> {
        match self.status {
            CountdownStatus::Running => Ok(()),
            CountdownStatus::Paused => self.resume(),
            CountdownStatus::Finished => Err(CountdownError::InvalidTransition {
                status: self.status,
                operation: "start",
            }),
            CountdownStatus::Idle => {
                match self.mode {
                    CountdownMode::Stopwatch => {
                        self.elapsed_ms = 0;
                        self.laps.clear();
                    }
                    CountdownMode::Timer => {
                        if self.remaining_ms == 0 {
                            let total = self.configured.total_ms();
                            if total == 0 {
                                return Err(CountdownError::InvalidDuration);
                            }
                            self.remaining_ms = total;
                        }
                        self.run_total_ms = self.remaining_ms;
                    }
                }
                self.begin_running();
                Ok(())
            }
        }
    }

    /// Stops time from advancing but keeps the accumulated value.
    pub fn pause(&mut self) -> CountdownResult<()> {
        self.require_status(CountdownStatus::Running, "pause")?;
        self.release_tick();
        self.transition(CountdownStatus::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> CountdownResult<()> {
        self.require_status(CountdownStatus::Paused, "resume")?;
        self.begin_running();
        Ok(())
    }

    /// Returns to `Idle` from any state. Keeps the configured timer length.
    pub fn reset(&mut self) {
        self.release_tick();
        self.elapsed_ms = 0;
        self.remaining_ms = 0;
        self.run_total_ms = 0;
        self.laps.clear();
        self.transition(CountdownStatus::Idle);
    }

    /// Records a stopwatch lap at the current reading.
    pub fn lap(&mut self) -> CountdownResult<LapRecord> {
        self.require_mode(CountdownMode::Stopwatch, "lap")?;
        self.require_status(CountdownStatus::Running, "lap")?;

        let previous = self.laps.last().map_or(0, |lap| lap.cumulative_ms);
        let record = LapRecord {
            index: self.laps.len() as u32 + 1,
            cumulative_ms: self.elapsed_ms,
            delta_ms: self.elapsed_ms - previous,
        };
        self.laps.push(record);
        self.publish();
        Ok(record)
    }

    /// Applies one fixed-interval tick for `token`.
    pub fn on_tick(&mut self, token: TickToken) -> TickOutcome {
        self.advance(token, self.mode.tick_interval_ms())
    }

    /// Applies `delta_ms` of measured time for `token`.
    pub fn advance(&mut self, token: TickToken, delta_ms: u64) -> TickOutcome {
        if self.status != CountdownStatus::Running || self.active_tick != Some(token) {
            debug!(
                "event=countdown_tick module=countdown status=ignored mode={} state={} token={}",
                self.mode,
                self.status,
                token.raw()
            );
            return TickOutcome::Ignored;
        }

        match self.mode {
            CountdownMode::Stopwatch => {
                self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
                self.publish();
                TickOutcome::Advanced
            }
            CountdownMode::Timer => {
                self.remaining_ms = self.remaining_ms.saturating_sub(delta_ms);
                if self.remaining_ms > 0 {
                    self.publish();
                    return TickOutcome::Advanced;
                }
                self.release_tick();
                self.transition(CountdownStatus::Finished);
                info!(
                    "event=timer_finished module=countdown status=ok run_total_ms={}",
                    self.run_total_ms
                );
                TickOutcome::Finished
            }
        }
    }

    fn begin_running(&mut self) {
        // Never hold two registrations, even if a caller skipped a state.
        self.release_tick();
        let token = self.ticks.register(self.tick_interval());
        self.active_tick = Some(token);
        self.transition(CountdownStatus::Running);
    }

    fn release_tick(&mut self) {
        if let Some(token) = self.active_tick.take() {
            self.ticks.cancel(token);
        }
    }

    fn transition(&mut self, to: CountdownStatus) {
        debug!(
            "event=countdown_transition module=countdown mode={} from={} to={}",
            self.mode, self.status, to
        );
        self.status = to;
        self.publish();
    }

    fn publish(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    fn require_status(
        &self,
        expected: CountdownStatus,
        operation: &'static str,
    ) -> CountdownResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(CountdownError::InvalidTransition {
                status: self.status,
                operation,
            })
        }
    }

    fn require_mode(&self, expected: CountdownMode, operation: &'static str) -> CountdownResult<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(CountdownError::UnsupportedInMode {
                mode: self.mode,
                operation,
            })
        }
    }
}

impl<S: TickSource> Drop for CountdownEngine<S> {
    fn drop(&mut self) {
        self.release_tick();
    }
}
