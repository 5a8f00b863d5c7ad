//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide runtime (alarms, settings, timer, stopwatch).
//! - Hand queued notification commands to the host, which applies them to
//!   the OS notification service.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutation returns an envelope; failures are messages, not errors.
//! - Tick tokens are opaque to Dart; it echoes back whatever it was given.

use chrono::{Local, Utc};
use clockdeck_core::db::open_db;
use clockdeck_core::{
    core_version as core_version_inner, format_clock, format_date, format_stopwatch,
    format_timer, format_utc_offset, format_world_clock, init_logging as init_logging_inner, ping as ping_inner,
    Alarm, AlarmChange, AlarmDraft, AlarmId, AlarmScheduler, AlarmServiceError, AlarmTime,
    AlarmWarning, Clock, ClockSettings, ColorTheme, CountdownEngine, CountdownMode,
    CountdownResult, CountdownSnapshot, FontSize, HostTickSource, KvAlarmRepository,
    KvSettingsRepository, NotificationChannel, NotificationCommand, OutboxGateway,
    ReconcileReport, SettingsService, SqliteKeyValueStore, SystemClock, TickOutcome, TickToken,
    TimerDuration, TimerSession, TIMER_PRESETS, WORLD_CLOCK_CITIES,
};
use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "clockdeck.sqlite3";
const FIRE_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static GATEWAY: Lazy<Arc<OutboxGateway>> = Lazy::new(|| Arc::new(OutboxGateway::new()));
static RUNTIME: Lazy<Mutex<Option<ClockRuntime>>> = Lazy::new(|| Mutex::new(None));

type AlarmService =
    AlarmScheduler<KvAlarmRepository<SqliteKeyValueStore>, Arc<OutboxGateway>, SystemClock>;
type Timer = TimerSession<HostTickSource, Arc<OutboxGateway>>;
type Stopwatch = CountdownEngine<HostTickSource>;

struct ClockRuntime {
    alarms: AlarmService,
    settings: SettingsService<KvSettingsRepository<SqliteKeyValueStore>>,
    timer: Timer,
    stopwatch: Stopwatch,
}

impl ClockRuntime {
    fn open(path: &Path) -> Result<Self, String> {
        let alarm_conn = open_db(path).map_err(|err| format!("alarm DB open failed: {err}"))?;
        let settings_conn =
            open_db(path).map_err(|err| format!("settings DB open failed: {err}"))?;

        let mut alarms = AlarmScheduler::new(
            KvAlarmRepository::new(SqliteKeyValueStore::new(alarm_conn)),
            Arc::clone(&GATEWAY),
            SystemClock,
        );
        let warnings = alarms.load();
        let (settings, settings_warning) = SettingsService::load(KvSettingsRepository::new(
            SqliteKeyValueStore::new(settings_conn),
        ));
        if !warnings.is_empty() || settings_warning.is_some() {
            warn!(
                "event=runtime_open module=ffi status=degraded alarm_warnings={} settings_warning={}",
                warnings.len(),
                settings_warning.is_some()
            );
        }
        info!(
            "event=runtime_open module=ffi status=ok alarms={}",
            alarms.alarms().len()
        );

        Ok(Self {
            alarms,
            settings,
            timer: TimerSession::new(HostTickSource::new(), Arc::clone(&GATEWAY)),
            stopwatch: CountdownEngine::stopwatch(HostTickSource::new()),
        })
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Alarm row for list and edit screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmItem {
    /// Stable alarm ID; also the notification id on the host.
    pub alarm_id: String,
    /// `HH:MM`, 24-hour.
    pub time: String,
    pub title: String,
    pub is_active: bool,
    pub sound: String,
    pub repeat_daily: bool,
    /// Whether the host currently holds a registration for this alarm.
    pub scheduled: bool,
    /// Label such as `7h 30m`; `None` when not scheduled.
    pub time_until: Option<String>,
}

/// Alarm list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmListResponse {
    pub items: Vec<AlarmItem>,
    pub message: String,
}

/// Envelope for single-alarm mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmActionResponse {
    /// Whether the mutation was applied.
    pub ok: bool,
    /// Alarm state after the mutation; `None` on failure or delete.
    pub alarm: Option<AlarmItem>,
    /// Non-fatal scheduling or persistence problems.
    pub warnings: Vec<String>,
    pub message: String,
}

impl AlarmActionResponse {
    fn success(
        message: impl Into<String>,
        alarm: Option<AlarmItem>,
        warnings: &[AlarmWarning],
    ) -> Self {
        Self {
            ok: true,
            alarm,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            alarm: None,
            warnings: Vec::new(),
            message: message.into(),
        }
    }
}

/// Result of a foreground reconciliation sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResponse {
    pub ok: bool,
    pub deactivated_ids: Vec<String>,
    pub rescheduled_ids: Vec<String>,
    pub warnings: Vec<String>,
    pub message: String,
}

impl ReconcileResponse {
    fn from_report(report: ReconcileReport) -> Self {
        Self {
            ok: true,
            deactivated_ids: report.deactivated.iter().map(ToString::to_string).collect(),
            rescheduled_ids: report.rescheduled.iter().map(ToString::to_string).collect(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
            message: "Alarms reconciled.".to_string(),
        }
    }

    fn empty(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            deactivated_ids: Vec::new(),
            rescheduled_ids: Vec::new(),
            warnings: Vec::new(),
            message: message.into(),
        }
    }
}

/// Lists all alarms in insertion order.
///
/// # FFI contract
/// - Sync call; opens the runtime on first use.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_list() -> AlarmListResponse {
    match with_runtime(|runtime| {
        runtime
            .alarms
            .alarms()
            .iter()
            .map(|alarm| to_alarm_item(&runtime.alarms, alarm))
            .collect::<Vec<_>>()
    }) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No alarms.".to_string()
            } else {
                format!("{} alarm(s).", items.len())
            };
            AlarmListResponse { items, message }
        }
        Err(err) => AlarmListResponse {
            items: Vec::new(),
            message: format!("alarm_list failed: {err}"),
        },
    }
}

/// Creates an active alarm and schedules it.
///
/// Input semantics:
/// - `time`: `HH:MM`, 24-hour.
/// - `title`: blank falls back to `Alarm`.
/// - `sound`: `None` or blank falls back to `default`.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_create(
    time: String,
    title: String,
    sound: Option<String>,
    repeat_daily: bool,
) -> AlarmActionResponse {
    let draft = match build_draft(&time, title, sound, repeat_daily) {
        Ok(draft) => draft,
        Err(err) => return AlarmActionResponse::failure(format!("alarm_create failed: {err}")),
    };
    alarm_action("alarm_create", "Alarm created.", |alarms| alarms.create(&draft))
}

/// Edits time, title, sound and repeat of an existing alarm.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_update(
    alarm_id: String,
    time: String,
    title: String,
    sound: Option<String>,
    repeat_daily: bool,
) -> AlarmActionResponse {
    let parsed = parse_alarm_id(&alarm_id)
        .and_then(|id| build_draft(&time, title, sound, repeat_daily).map(|draft| (id, draft)));
    let (id, draft) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return AlarmActionResponse::failure(format!("alarm_update failed: {err}")),
    };
    alarm_action("alarm_update", "Alarm updated.", |alarms| {
        alarms.update(id, &draft)
    })
}

/// Flips the active flag.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_toggle(alarm_id: String) -> AlarmActionResponse {
    with_alarm_id("alarm_toggle", &alarm_id, |id| {
        alarm_action("alarm_toggle", "Alarm toggled.", |alarms| alarms.toggle(id))
    })
}

/// Sets the active flag explicitly; idempotent.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_set_active(alarm_id: String, active: bool) -> AlarmActionResponse {
    with_alarm_id("alarm_set_active", &alarm_id, |id| {
        alarm_action("alarm_set_active", "Alarm updated.", |alarms| {
            alarms.set_active(id, active)
        })
    })
}

/// Deletes the alarm and cancels its registration.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_delete(alarm_id: String) -> AlarmActionResponse {
    with_alarm_id("alarm_delete", &alarm_id, |id| {
        match with_runtime(|runtime| runtime.alarms.delete(id)) {
            Ok(Ok(warnings)) => AlarmActionResponse::success("Alarm deleted.", None, &warnings),
            Ok(Err(err)) => AlarmActionResponse::failure(format!("alarm_delete failed: {err}")),
            Err(err) => AlarmActionResponse::failure(format!("alarm_delete failed: {err}")),
        }
    })
}

/// Retries registration of an active, unscheduled alarm.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_retry_scheduling(alarm_id: String) -> AlarmActionResponse {
    with_alarm_id("alarm_retry_scheduling", &alarm_id, |id| {
        alarm_action("alarm_retry_scheduling", "Scheduling retried.", |alarms| {
            alarms.retry_scheduling(id)
        })
    })
}

/// Host acknowledgment that the alarm notification was delivered.
///
/// Repeating alarms are re-armed for the next day; one-shot alarms become
/// inactive.
#[flutter_rust_bridge::frb(sync)]
pub fn alarm_fired(alarm_id: String) -> AlarmActionResponse {
    with_alarm_id("alarm_fired", &alarm_id, |id| {
        alarm_action("alarm_fired", "Alarm fire handled.", |alarms| {
            alarms.handle_fired(id)
        })
    })
}

/// Reconciles alarms when the app returns to the foreground.
#[flutter_rust_bridge::frb(sync)]
pub fn app_foreground() -> ReconcileResponse {
    match with_runtime(|runtime| runtime.alarms.on_foreground()) {
        Ok(report) => ReconcileResponse::from_report(report),
        Err(err) => ReconcileResponse::empty(false, format!("app_foreground failed: {err}")),
    }
}

/// Host notification command, drained in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCommandItem {
    /// `schedule|cancel|cancel_all|present`.
    pub kind: String,
    /// Registration id for `schedule` and `cancel`.
    pub notification_id: Option<String>,
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    /// Local wall-clock instant, `YYYY-MM-DDTHH:MM:SS`.
    pub fire_at_local: Option<String>,
    pub repeat_daily: bool,
    pub sound: Option<String>,
}

/// Notification channel the host must register at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelItem {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Takes every pending notification command.
///
/// # FFI contract
/// - Each command is returned exactly once.
/// - Does not open the runtime.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_drain() -> Vec<NotificationCommandItem> {
    GATEWAY.drain().into_iter().map(to_command_item).collect()
}

/// Records the OS permission state.
///
/// A grant also reconciles alarms so earlier refusals are retried.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_set_permission(granted: bool) -> ReconcileResponse {
    GATEWAY.set_permission_granted(granted);
    info!(
        "event=notification_permission module=ffi status=ok granted={}",
        granted
    );
    if !granted {
        return ReconcileResponse::empty(true, "Notification permission revoked.");
    }
    app_foreground()
}

#[flutter_rust_bridge::frb(sync)]
pub fn notification_channels() -> Vec<ChannelItem> {
    NotificationChannel::ALL
        .into_iter()
        .map(|channel| {
            let descriptor = channel.descriptor();
            ChannelItem {
                id: descriptor.id.to_string(),
                name: descriptor.name.to_string(),
                description: descriptor.description.to_string(),
            }
        })
        .collect()
}

/// One stopwatch lap row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapItem {
    pub index: u32,
    pub cumulative_ms: u64,
    pub delta_ms: u64,
    /// `MM:SS.cc`
    pub cumulative_display: String,
    /// `MM:SS.cc`
    pub delta_display: String,
}

/// Timer or stopwatch state after a call.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    /// Whether the requested operation was accepted.
    pub ok: bool,
    /// `timer|stopwatch`
    pub mode: String,
    /// `idle|running|paused|finished`
    pub status: String,
    /// Formatted face: `HH:MM:SS` for the timer, `MM:SS.cc` for the stopwatch.
    pub display: String,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    /// Elapsed share of the current timer run, 0-100.
    pub progress_percent: f64,
    /// Token to pass back on every tick; `None` when not running.
    pub tick_token: Option<u64>,
    pub tick_interval_ms: u64,
    pub laps: Vec<LapItem>,
    pub fastest_lap: Option<u32>,
    pub slowest_lap: Option<u32>,
    pub average_lap_ms: Option<u64>,
    pub message: String,
}

/// Timer preset button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerPresetItem {
    pub label: String,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_presets() -> Vec<TimerPresetItem> {
    TIMER_PRESETS
        .iter()
        .map(|preset| TimerPresetItem {
            label: preset.label.to_string(),
            hours: preset.duration.hours,
            minutes: preset.duration.minutes,
            seconds: preset.duration.seconds,
        })
        .collect()
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_state() -> CountdownState {
    timer_command("timer_state", |_| Ok(()))
}

/// Sets the timer length; accepted only while idle.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_set_duration(hours: u32, minutes: u32, seconds: u32) -> CountdownState {
    if minutes > 59 || seconds > 59 {
        return countdown_failure(
            "timer_set_duration",
            "minutes and seconds must be between 0 and 59",
        );
    }
    timer_command("timer_set_duration", |timer| {
        timer.set_duration(TimerDuration::new(hours, minutes, seconds))
    })
}

/// Loads a preset by label, e.g. `5 min`.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_apply_preset(label: String) -> CountdownState {
    let Some(preset) = TIMER_PRESETS
        .iter()
        .find(|preset| preset.label == label.trim())
    else {
        return countdown_failure("timer_apply_preset", format!("unknown preset `{label}`"));
    };
    timer_command("timer_apply_preset", |timer| timer.apply_preset(preset))
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_start() -> CountdownState {
    timer_command("timer_start", |timer| timer.start())
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_pause() -> CountdownState {
    timer_command("timer_pause", |timer| timer.pause())
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_resume() -> CountdownState {
    timer_command("timer_resume", |timer| timer.resume())
}

#[flutter_rust_bridge::frb(sync)]
pub fn timer_reset() -> CountdownState {
    timer_command("timer_reset", |timer| {
        timer.reset();
        Ok(())
    })
}

/// Delivers one host tick. Ticks with a stale token are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_tick(token: u64) -> CountdownState {
    timer_delivery("timer_tick", |timer| timer.on_tick(TickToken::from_raw(token)))
}

/// Applies `delta_ms` of host-measured time instead of one fixed interval.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_advance(token: u64, delta_ms: u64) -> CountdownState {
    timer_delivery("timer_advance", |timer| {
        timer.advance(TickToken::from_raw(token), delta_ms)
    })
}

fn timer_delivery(
    operation: &str,
    deliver: impl FnOnce(&mut Timer) -> TickOutcome,
) -> CountdownState {
    match with_runtime(|runtime| {
        let outcome = deliver(&mut runtime.timer);
        let mut state = to_countdown_state(&runtime.timer.snapshot(), runtime.timer.active_tick());
        if let Some(err) = runtime.timer.last_alert_error() {
            state.message = format!("timer finished; alert not shown: {err}");
        } else {
            state.message = tick_message(outcome).to_string();
        }
        state
    }) {
        Ok(state) => state,
        Err(err) => countdown_failure(operation, err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_state() -> CountdownState {
    stopwatch_command("stopwatch_state", |_| Ok(()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_start() -> CountdownState {
    stopwatch_command("stopwatch_start", |stopwatch| stopwatch.start())
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_pause() -> CountdownState {
    stopwatch_command("stopwatch_pause", |stopwatch| stopwatch.pause())
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_resume() -> CountdownState {
    stopwatch_command("stopwatch_resume", |stopwatch| stopwatch.resume())
}

/// Records a lap at the current reading; running only.
#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_lap() -> CountdownState {
    stopwatch_command("stopwatch_lap", |stopwatch| stopwatch.lap().map(|_| ()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_reset() -> CountdownState {
    stopwatch_command("stopwatch_reset", |stopwatch| {
        stopwatch.reset();
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_tick(token: u64) -> CountdownState {
    stopwatch_delivery("stopwatch_tick", |stopwatch| {
        stopwatch.on_tick(TickToken::from_raw(token))
    })
}

/// Applies `delta_ms` of host-measured time instead of one fixed interval.
#[flutter_rust_bridge::frb(sync)]
pub fn stopwatch_advance(token: u64, delta_ms: u64) -> CountdownState {
    stopwatch_delivery("stopwatch_advance", |stopwatch| {
        stopwatch.advance(TickToken::from_raw(token), delta_ms)
    })
}

fn stopwatch_delivery(
    operation: &str,
    deliver: impl FnOnce(&mut Stopwatch) -> TickOutcome,
) -> CountdownState {
    match with_runtime(|runtime| {
        let outcome = deliver(&mut runtime.stopwatch);
        let mut state = to_countdown_state(
            &runtime.stopwatch.snapshot(),
            runtime.stopwatch.active_tick(),
        );
        state.message = tick_message(outcome).to_string();
        state
    }) {
        Ok(state) => state,
        Err(err) => countdown_failure(operation, err),
    }
}

/// Clock screen preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsItem {
    pub is_24_hour: bool,
    pub show_seconds: bool,
    pub show_date: bool,
    pub digital_font: bool,
    /// `small|medium|large`
    pub font_size: String,
    /// Palette name, e.g. `blue`.
    pub color_theme: String,
}

/// Settings envelope with resolved display values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub ok: bool,
    pub settings: SettingsItem,
    pub font_points: u16,
    pub color_hex: String,
    /// Non-empty when saving or loading failed; values still apply.
    pub warning: String,
    pub message: String,
}

/// Palette entry for the theme picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorThemeItem {
    pub name: String,
    pub hex: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn settings_get() -> SettingsResponse {
    match with_runtime(|runtime| runtime.settings.settings()) {
        Ok(settings) => to_settings_response(settings, String::new(), "Settings loaded."),
        Err(err) => settings_failure(format!("settings_get failed: {err}")),
    }
}

/// Replaces all settings; saving is best-effort.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_update(settings: SettingsItem) -> SettingsResponse {
    let Some(font_size) = FontSize::parse(&settings.font_size) else {
        return settings_failure(format!(
            "settings_update failed: unknown font size `{}`",
            settings.font_size
        ));
    };
    let Some(color_theme) = ColorTheme::parse(&settings.color_theme) else {
        return settings_failure(format!(
            "settings_update failed: unknown color theme `{}`",
            settings.color_theme
        ));
    };
    let next = ClockSettings {
        is_24_hour: settings.is_24_hour,
        show_seconds: settings.show_seconds,
        show_date: settings.show_date,
        digital_font: settings.digital_font,
        font_size,
        color_theme,
    };
    match with_runtime(|runtime| {
        let warning = runtime.settings.replace(next);
        (runtime.settings.settings(), warning)
    }) {
        Ok((saved, warning)) => to_settings_response(
            saved,
            warning.map(|warning| warning.to_string()).unwrap_or_default(),
            "Settings updated.",
        ),
        Err(err) => settings_failure(format!("settings_update failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn color_themes() -> Vec<ColorThemeItem> {
    ColorTheme::ALL
        .into_iter()
        .map(|theme| ColorThemeItem {
            name: theme.label().to_string(),
            hex: theme.hex().to_string(),
        })
        .collect()
}

/// Current clock face strings under the saved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    /// Empty when the date line is hidden.
    pub date: String,
    pub utc_offset: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn clock_face() -> ClockFace {
    let settings = with_runtime(|runtime| runtime.settings.settings()).unwrap_or_default();
    let now = SystemClock.now();
    ClockFace {
        time: format_clock(&now, &settings.format_options()),
        date: if settings.show_date {
            format_date(now.date())
        } else {
            String::new()
        },
        utc_offset: format_utc_offset(*Local::now().offset()),
    }
}

/// World clock row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClockItem {
    pub city: String,
    /// IANA zone name, e.g. `Asia/Tokyo`.
    pub zone: String,
    /// `HH:MM`, with AM/PM under the 12-hour setting.
    pub time: String,
}

/// Current time in each world clock city under the saved hour format.
#[flutter_rust_bridge::frb(sync)]
pub fn world_clock() -> Vec<WorldClockItem> {
    let settings = with_runtime(|runtime| runtime.settings.settings()).unwrap_or_default();
    let options = settings.format_options();
    let now = Utc::now();
    WORLD_CLOCK_CITIES
        .iter()
        .map(|city| WorldClockItem {
            city: city.name.to_string(),
            zone: city.zone.name().to_string(),
            time: format_world_clock(now, city.zone, &options),
        })
        .collect()
}

fn with_runtime<T>(f: impl FnOnce(&mut ClockRuntime) -> T) -> Result<T, String> {
    let mut guard = lock_runtime();
    if guard.is_none() {
        *guard = Some(ClockRuntime::open(&resolve_db_path())?);
    }
    match guard.as_mut() {
        Some(runtime) => Ok(f(runtime)),
        None => Err("runtime unavailable".to_string()),
    }
}

fn lock_runtime() -> MutexGuard<'static, Option<ClockRuntime>> {
    // The runtime stays structurally valid even if a holder panicked.
    RUNTIME
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("CLOCKDECK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_alarm_id(raw: &str) -> Result<AlarmId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid alarm id `{raw}`: {err}"))
}

fn build_draft(
    time: &str,
    title: String,
    sound: Option<String>,
    repeat_daily: bool,
) -> Result<AlarmDraft, String> {
    let time = AlarmTime::parse(time).map_err(|err| err.to_string())?;
    let mut draft = AlarmDraft::at(time).titled(title).repeating(repeat_daily);
    if let Some(sound) = sound {
        draft = draft.with_sound(sound);
    }
    Ok(draft)
}

fn with_alarm_id(
    operation: &str,
    raw_id: &str,
    f: impl FnOnce(AlarmId) -> AlarmActionResponse,
) -> AlarmActionResponse {
    match parse_alarm_id(raw_id) {
        Ok(id) => f(id),
        Err(err) => AlarmActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn alarm_action(
    operation: &str,
    success_message: &str,
    f: impl FnOnce(&mut AlarmService) -> Result<AlarmChange, AlarmServiceError>,
) -> AlarmActionResponse {
    let outcome = with_runtime(|runtime| {
        f(&mut runtime.alarms).map(|change| {
            let item = to_alarm_item(&runtime.alarms, &change.alarm);
            (item, change.warnings)
        })
    });
    match outcome {
        Ok(Ok((item, warnings))) => {
            AlarmActionResponse::success(success_message, Some(item), &warnings)
        }
        Ok(Err(err)) => AlarmActionResponse::failure(format!("{operation} failed: {err}")),
        Err(err) => AlarmActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn to_alarm_item(alarms: &AlarmService, alarm: &Alarm) -> AlarmItem {
    let time_until = alarms.time_until(alarm.id);
    AlarmItem {
        alarm_id: alarm.id.to_string(),
        time: alarm.time.to_string(),
        title: alarm.title.clone(),
        is_active: alarm.is_active,
        sound: alarm.sound.clone(),
        repeat_daily: alarm.repeat_daily,
        scheduled: time_until.is_some(),
        time_until,
    }
}

fn to_command_item(command: NotificationCommand) -> NotificationCommandItem {
    let empty = NotificationCommandItem {
        kind: String::new(),
        notification_id: None,
        channel_id: None,
        title: None,
        message: None,
        fire_at_local: None,
        repeat_daily: false,
        sound: None,
    };
    match command {
        NotificationCommand::Schedule(request) => NotificationCommandItem {
            kind: "schedule".to_string(),
            notification_id: Some(request.id),
            channel_id: Some(request.channel.id().to_string()),
            title: Some(request.title),
            message: Some(request.message),
            fire_at_local: Some(request.fire_at.format(FIRE_AT_FORMAT).to_string()),
            repeat_daily: request.repeat_daily,
            sound: Some(request.sound),
        },
        NotificationCommand::Cancel { id } => NotificationCommandItem {
            kind: "cancel".to_string(),
            notification_id: Some(id),
            ..empty
        },
        NotificationCommand::CancelAll => NotificationCommandItem {
            kind: "cancel_all".to_string(),
            ..empty
        },
        NotificationCommand::Present(alert) => NotificationCommandItem {
            kind: "present".to_string(),
            channel_id: Some(alert.channel.id().to_string()),
            title: Some(alert.title),
            message: Some(alert.message),
            ..empty
        },
    }
}

fn timer_command(
    operation: &str,
    f: impl FnOnce(&mut Timer) -> CountdownResult<()>,
) -> CountdownState {
    match with_runtime(|runtime| {
        let result = f(&mut runtime.timer);
        let state = to_countdown_state(&runtime.timer.snapshot(), runtime.timer.active_tick());
        (result, state)
    }) {
        Ok((result, state)) => finish_command(operation, result, state),
        Err(err) => countdown_failure(operation, err),
    }
}

fn stopwatch_command(
    operation: &str,
    f: impl FnOnce(&mut Stopwatch) -> CountdownResult<()>,
) -> CountdownState {
    match with_runtime(|runtime| {
        let result = f(&mut runtime.stopwatch);
        let state = to_countdown_state(
            &runtime.stopwatch.snapshot(),
            runtime.stopwatch.active_tick(),
        );
        (result, state)
    }) {
        Ok((result, state)) => finish_command(operation, result, state),
        Err(err) => countdown_failure(operation, err),
    }
}

fn finish_command(
    operation: &str,
    result: CountdownResult<()>,
    mut state: CountdownState,
) -> CountdownState {
    match result {
        Ok(()) => state.message = "ok".to_string(),
        Err(err) => {
            state.ok = false;
            state.message = format!("{operation} failed: {err}");
        }
    }
    state
}

fn to_countdown_state(snapshot: &CountdownSnapshot, token: Option<TickToken>) -> CountdownState {
    let stats = snapshot.lap_stats();
    let display = match snapshot.mode {
        CountdownMode::Timer => {
            let shown = if snapshot.remaining_ms == 0 && snapshot.run_total_ms == 0 {
                snapshot.configured.total_ms()
            } else {
                snapshot.remaining_ms
            };
            format_timer(shown)
        }
        CountdownMode::Stopwatch => format_stopwatch(snapshot.elapsed_ms),
    };
    CountdownState {
        ok: true,
        mode: snapshot.mode.to_string(),
        status: snapshot.status.to_string(),
        display,
        elapsed_ms: snapshot.elapsed_ms,
        remaining_ms: snapshot.remaining_ms,
        progress_percent: snapshot.progress_percent(),
        tick_token: token.map(TickToken::raw),
        tick_interval_ms: snapshot.mode.tick_interval_ms(),
        laps: snapshot
            .laps
            .iter()
            .map(|lap| LapItem {
                index: lap.index,
                cumulative_ms: lap.cumulative_ms,
                delta_ms: lap.delta_ms,
                cumulative_display: format_stopwatch(lap.cumulative_ms),
                delta_display: format_stopwatch(lap.delta_ms),
            })
            .collect(),
        fastest_lap: stats.map(|stats| stats.fastest.index),
        slowest_lap: stats.map(|stats| stats.slowest.index),
        average_lap_ms: stats.map(|stats| stats.average_ms),
        message: String::new(),
    }
}

fn countdown_failure(operation: &str, err: impl std::fmt::Display) -> CountdownState {
    CountdownState {
        ok: false,
        mode: String::new(),
        status: String::new(),
        display: String::new(),
        elapsed_ms: 0,
        remaining_ms: 0,
        progress_percent: 0.0,
        tick_token: None,
        tick_interval_ms: 0,
        laps: Vec::new(),
        fastest_lap: None,
        slowest_lap: None,
        average_lap_ms: None,
        message: format!("{operation} failed: {err}"),
    }
}

fn tick_message(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Ignored => "ignored",
        TickOutcome::Advanced => "advanced",
        TickOutcome::Finished => "finished",
    }
}

fn to_settings_item(settings: ClockSettings) -> SettingsItem {
    SettingsItem {
        is_24_hour: settings.is_24_hour,
        show_seconds: settings.show_seconds,
        show_date: settings.show_date,
        digital_font: settings.digital_font,
        font_size: settings.font_size.label().to_string(),
        color_theme: settings.color_theme.label().to_string(),
    }
}

fn to_settings_response(
    settings: ClockSettings,
    warning: String,
    message: &str,
) -> SettingsResponse {
    SettingsResponse {
        ok: true,
        settings: to_settings_item(settings),
        font_points: settings.font_size.points(),
        color_hex: settings.color_theme.hex().to_string(),
        warning,
        message: message.to_string(),
    }
}

fn settings_failure(message: String) -> SettingsResponse {
    let defaults = ClockSettings::default();
    SettingsResponse {
        ok: false,
        message,
        ..to_settings_response(defaults, String::new(), "")
    }
}
