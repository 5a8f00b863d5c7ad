//! Alarm domain model.
//!
//! # Responsibility
//! - Define the persisted alarm definition and its wall-clock time of day.
//! - Validate user input before it reaches the scheduler or the store.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - `time` is always a valid `hour 0..=23`, `minute 0..=59` pair.
//! - `title` is trimmed, non-empty and at most `MAX_TITLE_CHARS` characters.

use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one alarm definition.
pub type AlarmId = Uuid;

pub const DEFAULT_ALARM_TITLE: &str = "Alarm";
pub const DEFAULT_ALARM_SOUND: &str = "default";
pub const MAX_TITLE_CHARS: usize = 100;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid time-of-day regex"));

/// Validation failure for alarm input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmValidationError {
    InvalidHour(u8),
    InvalidMinute(u8),
    InvalidTimeString(String),
    TitleTooLong { chars: usize, max: usize },
}

impl Display for AlarmValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHour(hour) => write!(f, "hour must be within 0..=23, got {hour}"),
            Self::InvalidMinute(minute) => {
                write!(f, "minute must be within 0..=59, got {minute}")
            }
            Self::InvalidTimeString(value) => {
                write!(f, "time must use HH:MM format, got `{value}`")
            }
            Self::TitleTooLong { chars, max } => {
                write!(f, "title has {chars} characters; at most {max} allowed")
            }
        }
    }
}

impl Error for AlarmValidationError {}

/// Wall-clock time of day for an alarm, minute precision.
///
/// Persisted as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, AlarmValidationError> {
        if hour > 23 {
            return Err(AlarmValidationError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(AlarmValidationError::InvalidMinute(minute));
        }
        Ok(Self { hour, minute })
    }

    /// Parses `"H:MM"` or `"HH:MM"`.
    pub fn parse(value: &str) -> Result<Self, AlarmValidationError> {
        let invalid = || AlarmValidationError::InvalidTimeString(value.to_string());
        let captures = TIME_OF_DAY_RE.captures(value).ok_or_else(invalid)?;
        let hour = captures[1].parse::<u8>().map_err(|_| invalid())?;
        let minute = captures[2].parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl Display for AlarmTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for AlarmTime {
    type Error = AlarmValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AlarmTime> for String {
    fn from(value: AlarmTime) -> Self {
        value.to_string()
    }
}

/// Persisted alarm definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: AlarmId,
    pub time: AlarmTime,
    pub title: String,
    /// When false no notification may be scheduled for this alarm.
    pub is_active: bool,
    #[serde(default = "default_sound")]
    pub sound: String,
    /// Re-arm for the following day after each firing.
    #[serde(rename = "repeat")]
    pub repeat_daily: bool,
    /// Instant of the last host registration; cleared when unscheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<NaiveDateTime>,
}

impl Alarm {
    /// Builds a new active alarm from validated draft input.
    pub fn from_draft(draft: &AlarmDraft) -> Result<Self, AlarmValidationError> {
        let mut alarm = Self {
            id: Uuid::new_v4(),
            time: draft.time,
            title: String::new(),
            is_active: true,
            sound: String::new(),
            repeat_daily: draft.repeat_daily,
            scheduled_for: None,
        };
        alarm.apply_draft(draft)?;
        Ok(alarm)
    }

    /// Replaces editable fields, keeping `id`, `is_active` and `scheduled_for`.
    pub fn apply_draft(&mut self, draft: &AlarmDraft) -> Result<(), AlarmValidationError> {
        let title = normalize_title(&draft.title)?;
        self.time = draft.time;
        self.title = title;
        self.sound = normalize_sound(&draft.sound);
        self.repeat_daily = draft.repeat_daily;
        Ok(())
    }

    /// Checks persisted or caller-built state against model invariants.
    pub fn validate(&self) -> Result<(), AlarmValidationError> {
        AlarmTime::new(self.time.hour, self.time.minute)?;
        let chars = self.title.chars().count();
        if chars > MAX_TITLE_CHARS {
            return Err(AlarmValidationError::TitleTooLong {
                chars,
                max: MAX_TITLE_CHARS,
            });
        }
        Ok(())
    }

    /// Key used for the notification registration of this alarm.
    pub fn notification_id(&self) -> String {
        self.id.to_string()
    }
}

/// User input for creating or editing an alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDraft {
    pub time: AlarmTime,
    pub title: String,
    pub sound: String,
    pub repeat_daily: bool,
}

impl AlarmDraft {
    /// Draft with the form defaults: "Alarm", default sound, no repeat.
    pub fn at(time: AlarmTime) -> Self {
        Self {
            time,
            title: DEFAULT_ALARM_TITLE.to_string(),
            sound: DEFAULT_ALARM_SOUND.to_string(),
            repeat_daily: false,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn repeating(mut self, repeat_daily: bool) -> Self {
        self.repeat_daily = repeat_daily;
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }
}

fn normalize_title(value: &str) -> Result<String, AlarmValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_ALARM_TITLE.to_string());
    }
    let chars = trimmed.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(AlarmValidationError::TitleTooLong {
            chars,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

fn normalize_sound(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default_sound()
    } else {
        trimmed.to_string()
    }
}

fn default_sound() -> String {
    DEFAULT_ALARM_SOUND.to_string()
}

#[cfg(test)]
mod tests {
    use super::{Alarm, AlarmDraft, AlarmTime, AlarmValidationError, DEFAULT_ALARM_TITLE};
    use chrono::NaiveDate;

    #[test]
    fn alarm_time_rejects_out_of_range_fields() {
        assert_eq!(
            AlarmTime::new(24, 0),
            Err(AlarmValidationError::InvalidHour(24))
        );
        assert_eq!(
            AlarmTime::new(7, 60),
            Err(AlarmValidationError::InvalidMinute(60))
        );
        assert!(AlarmTime::new(23, 59).is_ok());
    }

    #[test]
    fn alarm_time_parses_and_displays_padded() {
        let time = AlarmTime::parse("7:05").expect("short hour should parse");
        assert_eq!((time.hour(), time.minute()), (7, 5));
        assert_eq!(time.to_string(), "07:05");

        assert!(matches!(
            AlarmTime::parse("07-05"),
            Err(AlarmValidationError::InvalidTimeString(_))
        ));
        assert_eq!(
            AlarmTime::parse("25:00"),
            Err(AlarmValidationError::InvalidHour(25))
        );
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        let draft = AlarmDraft::at(AlarmTime::new(6, 0).expect("valid")).titled("   ");
        let alarm = Alarm::from_draft(&draft).expect("draft should be valid");
        assert_eq!(alarm.title, DEFAULT_ALARM_TITLE);
        assert!(alarm.is_active);
        assert_eq!(alarm.sound, "default");
    }

    #[test]
    fn overlong_title_is_rejected() {
        let draft = AlarmDraft::at(AlarmTime::new(6, 0).expect("valid")).titled("x".repeat(101));
        let err = Alarm::from_draft(&draft).expect_err("title too long");
        assert!(matches!(err, AlarmValidationError::TitleTooLong { chars: 101, .. }));
    }

    #[test]
    fn apply_draft_keeps_identity_and_activity() {
        let mut alarm =
            Alarm::from_draft(&AlarmDraft::at(AlarmTime::new(6, 0).expect("valid")))
                .expect("valid");
        alarm.is_active = false;
        let id = alarm.id;

        let edit = AlarmDraft::at(AlarmTime::new(9, 15).expect("valid"))
            .titled("Standup")
            .repeating(true);
        alarm.apply_draft(&edit).expect("edit should apply");

        assert_eq!(alarm.id, id);
        assert!(!alarm.is_active);
        assert_eq!(alarm.time.to_string(), "09:15");
        assert!(alarm.repeat_daily);
    }

    #[test]
    fn registered_instant_round_trips_and_is_optional() {
        let mut alarm =
            Alarm::from_draft(&AlarmDraft::at(AlarmTime::new(7, 30).expect("valid")))
                .expect("valid");
        let json = serde_json::to_value(&alarm).expect("serialize");
        assert!(json.get("scheduledFor").is_none());

        alarm.scheduled_for = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|date| date.and_hms_opt(7, 30, 0));
        let json = serde_json::to_value(&alarm).expect("serialize");
        assert_eq!(json["scheduledFor"], "2026-10-19T07:30:00");
        let decoded: Alarm = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, alarm);
    }
}
