//! Display string formatting for clock faces, durations and labels.
//!
//! # Responsibility
//! - Convert wall-clock times and millisecond durations into UI strings.
//! - Render the fixed world clock cities in their own zones.
//!
//! # Invariants
//! - All functions are pure and infallible; inputs are pre-validated.
//! - Every numeric field except a leading unbounded one is zero-padded to 2 digits.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

pub const ALARM_TIME_PASSED: &str = "Alarm time passed";

/// 12- or 24-hour clock rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourFormat {
    H12,
    H24,
}

/// Options for clock-face formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub hour_format: HourFormat,
    pub show_seconds: bool,
    /// Appends `.cc` centiseconds; clock faces normally leave this off.
    pub show_milliseconds: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            hour_format: HourFormat::H12,
            show_seconds: true,
            show_milliseconds: false,
        }
    }
}

/// How the leading hours field of a duration is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursField {
    /// `HH:MM:SS` even below one hour.
    Always,
    /// `HH:MM:SS` from one hour up, `MM:SS` below.
    WhenNonZero,
    /// Minutes absorb the hours and may exceed 59.
    Never,
}

/// Options for duration formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationFormat {
    pub hours: HoursField,
    pub show_centiseconds: bool,
}

impl DurationFormat {
    pub const TIMER: Self = Self {
        hours: HoursField::Always,
        show_centiseconds: false,
    };
    pub const STOPWATCH: Self = Self {
        hours: HoursField::Never,
        show_centiseconds: true,
    };
    pub const COMPACT: Self = Self {
        hours: HoursField::WhenNonZero,
        show_centiseconds: false,
    };
}

/// Formats a wall-clock time, e.g. `07:05:09 AM` or `19:05`.
pub fn format_clock<T: Timelike>(time: &T, options: &FormatOptions) -> String {
    let mut out = match options.hour_format {
        HourFormat::H24 => format!("{:02}:{:02}", time.hour(), time.minute()),
        HourFormat::H12 => {
            let (_, hour12) = time.hour12();
            format!("{:02}:{:02}", hour12, time.minute())
        }
    };
    if options.show_seconds {
        out.push_str(&format!(":{:02}", time.second()));
    }
    if options.show_milliseconds {
        let centis = (time.nanosecond() % 1_000_000_000) / 10_000_000;
        out.push_str(&format!(".{centis:02}"));
    }
    if options.hour_format == HourFormat::H12 {
        let (is_pm, _) = time.hour12();
        out.push_str(if is_pm { " PM" } else { " AM" });
    }
    out
}

/// City row on the world clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldClockCity {
    pub name: &'static str,
    pub zone: Tz,
}

pub const WORLD_CLOCK_CITIES: [WorldClockCity; 6] = [
    WorldClockCity {
        name: "New York",
        zone: chrono_tz::America::New_York,
    },
    WorldClockCity {
        name: "London",
        zone: chrono_tz::Europe::London,
    },
    WorldClockCity {
        name: "Tokyo",
        zone: chrono_tz::Asia::Tokyo,
    },
    WorldClockCity {
        name: "Sydney",
        zone: chrono_tz::Australia::Sydney,
    },
    WorldClockCity {
        name: "Dubai",
        zone: chrono_tz::Asia::Dubai,
    },
    WorldClockCity {
        name: "Los Angeles",
        zone: chrono_tz::America::Los_Angeles,
    },
];

/// `HH:MM` in `zone`, honouring only the hour format of `options`.
pub fn format_world_clock(now_utc: DateTime<Utc>, zone: Tz, options: &FormatOptions) -> String {
    let face = FormatOptions {
        show_seconds: false,
        show_milliseconds: false,
        ..*options
    };
    format_clock(&now_utc.with_timezone(&zone), &face)
}

/// Formats a duration in milliseconds.
pub fn format_duration(total_ms: u64, format: &DurationFormat) -> String {
    let total_seconds = total_ms / 1_000;
    let hours = total_seconds / 3_600;
    let seconds = total_seconds % 60;

    let with_hours = match format.hours {
        HoursField::Always => true,
        HoursField::WhenNonZero => hours > 0,
        HoursField::Never => false,
    };
    let mut out = if with_hours {
        let minutes = (total_seconds % 3_600) / 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{:02}:{seconds:02}", total_seconds / 60)
    };
    if format.show_centiseconds {
        out.push_str(&format!(".{:02}", (total_ms % 1_000) / 10));
    }
    out
}

/// Timer face: `HH:MM:SS`.
pub fn format_timer(total_ms: u64) -> String {
    format_duration(total_ms, &DurationFormat::TIMER)
}

/// Stopwatch face: `MM:SS.cc`.
pub fn format_stopwatch(total_ms: u64) -> String {
    format_duration(total_ms, &DurationFormat::STOPWATCH)
}

/// Countdown label to an upcoming instant: `3h 12m` or `45m`.
pub fn format_time_until(now: NaiveDateTime, target: NaiveDateTime) -> String {
    let diff_ms = (target - now).num_milliseconds();
    if diff_ms <= 0 {
        return ALARM_TIME_PASSED.to_string();
    }
    let hours = diff_ms / 3_600_000;
    let minutes = (diff_ms % 3_600_000) / 60_000;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Long date, e.g. `Monday, October 19, 2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Zone offset label, e.g. `UTC+05:30` or `UTC-08:00`.
pub fn format_utc_offset(offset: FixedOffset) -> String {
    let east = offset.local_minus_utc();
    let sign = if east < 0 { '-' } else { '+' };
    let minutes = east.unsigned_abs() / 60;
    format!("UTC{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).expect("valid time")
    }

    #[test]
    fn timer_always_shows_hours() {
        assert_eq!(format_timer(3_661_000), "01:01:01");
        assert_eq!(format_timer(300_000), "00:05:00");
        assert_eq!(format_timer(0), "00:00:00");
    }

    #[test]
    fn stopwatch_never_shows_hours() {
        assert_eq!(format_stopwatch(65_000), "01:05.00");
        assert_eq!(format_stopwatch(12_345), "00:12.34");
        assert_eq!(format_stopwatch(3_723_450), "62:03.45");
    }

    #[test]
    fn compact_drops_hours_below_one_hour() {
        assert_eq!(format_duration(59_999, &DurationFormat::COMPACT), "00:59");
        assert_eq!(format_duration(3_600_000, &DurationFormat::COMPACT), "01:00:00");
    }

    #[test]
    fn twelve_hour_clock_renders_midnight_as_twelve() {
        let options = FormatOptions::default();
        assert_eq!(format_clock(&at(0, 5, 9), &options), "12:05:09 AM");
        assert_eq!(format_clock(&at(12, 0, 0), &options), "12:00:00 PM");
        assert_eq!(format_clock(&at(19, 30, 0), &options), "07:30:00 PM");
    }

    #[test]
    fn twenty_four_hour_clock_without_seconds() {
        let options = FormatOptions {
            hour_format: HourFormat::H24,
            show_seconds: false,
            show_milliseconds: false,
        };
        assert_eq!(format_clock(&at(0, 5, 9), &options), "00:05");
        assert_eq!(format_clock(&at(23, 59, 59), &options), "23:59");
    }

    #[test]
    fn time_until_labels() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|date| date.and_hms_opt(6, 0, 0))
            .expect("valid now");
        assert_eq!(
            format_time_until(now, now + chrono::TimeDelta::minutes(192)),
            "3h 12m"
        );
        assert_eq!(
            format_time_until(now, now + chrono::TimeDelta::seconds(45 * 60 + 30)),
            "45m"
        );
        assert_eq!(format_time_until(now, now), ALARM_TIME_PASSED);
    }

    #[test]
    fn date_and_offset_labels() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        assert_eq!(format_date(date), "Monday, October 19, 2026");

        let india = FixedOffset::east_opt(5 * 3_600 + 30 * 60).expect("valid offset");
        assert_eq!(format_utc_offset(india), "UTC+05:30");
        let pacific = FixedOffset::west_opt(8 * 3_600).expect("valid offset");
        assert_eq!(format_utc_offset(pacific), "UTC-08:00");
    }

    fn utc(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid instant")
            .and_utc()
    }

    fn world_clock(now: DateTime<Utc>, options: &FormatOptions) -> Vec<String> {
        WORLD_CLOCK_CITIES
            .iter()
            .map(|city| format_world_clock(now, city.zone, options))
            .collect()
    }

    #[test]
    fn world_clock_uses_each_city_zone() {
        let h24 = FormatOptions {
            hour_format: HourFormat::H24,
            ..FormatOptions::default()
        };
        assert_eq!(
            world_clock(utc(1, 15, 12), &h24),
            ["07:00", "12:00", "21:00", "23:00", "16:00", "04:00"]
        );
        assert_eq!(
            world_clock(utc(7, 15, 12), &h24),
            ["08:00", "13:00", "21:00", "22:00", "16:00", "05:00"]
        );
    }

    #[test]
    fn world_clock_follows_twelve_hour_setting_without_seconds() {
        let options = FormatOptions {
            show_milliseconds: true,
            ..FormatOptions::default()
        };
        let tokyo = format_world_clock(utc(1, 15, 12), chrono_tz::Asia::Tokyo, &options);
        assert_eq!(tokyo, "09:00 PM");
        assert_eq!(WORLD_CLOCK_CITIES[0].zone.name(), "America/New_York");
    }
}
