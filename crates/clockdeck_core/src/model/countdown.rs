//! Countdown (timer) and stopwatch value types.
//!
//! # Invariants
//! - Lap indexes start at 1 and follow insertion order.
//! - For every lap list, the deltas sum to the last lap's cumulative value.

use std::fmt::{Display, Formatter};

/// Which direction an engine counts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownMode {
    /// Counts elapsed time up from zero.
    Stopwatch,
    /// Counts remaining time down to zero.
    Timer,
}

impl CountdownMode {
    /// Fixed tick granularity for this mode.
    pub fn tick_interval_ms(self) -> u64 {
        match self {
            Self::Stopwatch => 10,
            Self::Timer => 1_000,
        }
    }
}

impl Display for CountdownMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopwatch => f.write_str("stopwatch"),
            Self::Timer => f.write_str("timer"),
        }
    }
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Idle,
    Running,
    /// Holds the accumulated value; a stopped stopwatch is also `Paused`.
    Paused,
    /// Timer reached zero. Left only through reset.
    Finished,
}

impl Display for CountdownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running => f.write_str("running"),
            Self::Paused => f.write_str("paused"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// Configured timer length as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimerDuration {
    pub const fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn total_ms(self) -> u64 {
        let seconds = u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds);
        seconds * 1_000
    }

    pub fn is_zero(self) -> bool {
        self.total_ms() == 0
    }
}

/// Length a fresh timer starts with.
pub const DEFAULT_TIMER_DURATION: TimerDuration = TimerDuration::new(0, 5, 0);

/// Named quick-pick timer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPreset {
    pub label: &'static str,
    pub duration: TimerDuration,
}

pub const TIMER_PRESETS: [TimerPreset; 8] = [
    TimerPreset {
        label: "1 min",
        duration: TimerDuration::new(0, 1, 0),
    },
    TimerPreset {
        label: "3 min",
        duration: TimerDuration::new(0, 3, 0),
    },
    TimerPreset {
        label: "5 min",
        duration: TimerDuration::new(0, 5, 0),
    },
    TimerPreset {
        label: "10 min",
        duration: TimerDuration::new(0, 10, 0),
    },
    TimerPreset {
        label: "15 min",
        duration: TimerDuration::new(0, 15, 0),
    },
    TimerPreset {
        label: "30 min",
        duration: TimerDuration::new(0, 30, 0),
    },
    TimerPreset {
        label: "45 min",
        duration: TimerDuration::new(0, 45, 0),
    },
    TimerPreset {
        label: "1 hour",
        duration: TimerDuration::new(1, 0, 0),
    },
];

/// One recorded stopwatch lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapRecord {
    pub index: u32,
    /// Stopwatch reading when the lap was taken.
    pub cumulative_ms: u64,
    /// Time since the previous lap (or since start for lap 1).
    pub delta_ms: u64,
}

/// Derived lap ranking. Only defined for two or more laps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapStats {
    pub fastest: LapRecord,
    pub slowest: LapRecord,
    /// Floor of the mean lap delta.
    pub average_ms: u64,
}

impl LapStats {
    /// Returns `None` for fewer than two laps; ties resolve to the earliest lap.
    pub fn from_laps(laps: &[LapRecord]) -> Option<Self> {
        if laps.len() < 2 {
            return None;
        }
        let mut fastest = laps[0];
        let mut slowest = laps[0];
        let mut total: u64 = 0;
        for lap in laps {
            if lap.delta_ms < fastest.delta_ms {
                fastest = *lap;
            }
            if lap.delta_ms > slowest.delta_ms {
                slowest = *lap;
            }
            total = total.saturating_add(lap.delta_ms);
        }
        Some(Self {
            fastest,
            slowest,
            average_ms: total / laps.len() as u64,
        })
    }
}

/// Immutable view of an engine published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub mode: CountdownMode,
    pub status: CountdownStatus,
    /// Stopwatch reading; always zero in timer mode.
    pub elapsed_ms: u64,
    /// Timer reading; always zero in stopwatch mode.
    pub remaining_ms: u64,
    /// Length of the current timer run, zero when none is loaded.
    pub run_total_ms: u64,
    pub configured: TimerDuration,
    pub laps: Vec<LapRecord>,
}

impl CountdownSnapshot {
    pub fn is_running(&self) -> bool {
        self.status == CountdownStatus::Running
    }

    pub fn lap_stats(&self) -> Option<LapStats> {
        LapStats::from_laps(&self.laps)
    }

    /// Share of the current timer run already elapsed, in percent.
    pub fn progress_percent(&self) -> f64 {
        if self.run_total_ms == 0 {
            return 0.0;
        }
        let done = self.run_total_ms.saturating_sub(self.remaining_ms);
        done as f64 * 100.0 / self.run_total_ms as f64
    }
}
