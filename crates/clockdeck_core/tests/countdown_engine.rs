use clockdeck_core::{
    format_stopwatch, format_timer, CountdownEngine, CountdownError, CountdownStatus,
    HostTickSource, NotificationChannel, NotificationCommand, OutboxGateway, TickOutcome,
    TimerDuration, TimerSession, DEFAULT_TIMER_DURATION, TIMER_PRESETS,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn five_minute_timer_finishes_exactly_once() {
    let mut timer = CountdownEngine::timer(HostTickSource::new());
    timer.set_duration(TimerDuration::new(0, 5, 0)).unwrap();
    timer.start().unwrap();
    let token = timer.active_tick().unwrap();
    assert_eq!(timer.tick_interval(), Duration::from_secs(1));
    assert_eq!(format_timer(timer.remaining_ms()), "00:05:00");

    let mut finished = 0;
    for _ in 0..300 {
        if timer.on_tick(token) == TickOutcome::Finished {
            finished += 1;
        }
    }
    assert_eq!(finished, 1);
    assert_eq!(timer.status(), CountdownStatus::Finished);
    assert_eq!(timer.remaining_ms(), 0);
    assert_eq!(timer.active_tick(), None);
    assert_eq!(timer.tick_source().active_count(), 0);
    assert_eq!(timer.snapshot().progress_percent(), 100.0);

    assert_eq!(timer.on_tick(token), TickOutcome::Ignored);
    assert_eq!(timer.remaining_ms(), 0);
    assert!(matches!(
        timer.start(),
        Err(CountdownError::InvalidTransition {
            status: CountdownStatus::Finished,
            ..
        })
    ));

    timer.reset();
    assert_eq!(timer.status(), CountdownStatus::Idle);
    timer.start().unwrap();
    assert_eq!(timer.remaining_ms(), 300_000);
}

#[test]
fn fresh_timer_starts_with_five_minutes() {
    let mut timer = CountdownEngine::timer(HostTickSource::new());
    assert_eq!(timer.configured(), DEFAULT_TIMER_DURATION);
    timer.start().unwrap();
    assert_eq!(timer.remaining_ms(), 300_000);
    assert_eq!(format_timer(timer.remaining_ms()), "00:05:00");
}

#[test]
fn zero_duration_timer_refuses_to_start() {
    let mut timer = CountdownEngine::timer(HostTickSource::new());
    timer.set_duration(TimerDuration::default()).unwrap();
    assert_eq!(timer.start(), Err(CountdownError::InvalidDuration));
    assert_eq!(timer.status(), CountdownStatus::Idle);
    assert_eq!(timer.active_tick(), None);
    assert_eq!(timer.tick_source().total_registrations(), 0);
}

#[test]
fn reset_returns_to_idle_from_every_state() {
    let mut timer = CountdownEngine::timer(HostTickSource::new());
    timer.set_duration(TimerDuration::new(0, 0, 2)).unwrap();

    timer.reset();
    assert_eq!(timer.status(), CountdownStatus::Idle);

    timer.start().unwrap();
    timer.reset();
    assert_eq!(timer.status(), CountdownStatus::Idle);
    assert_eq!(timer.tick_source().active_count(), 0);

    timer.start().unwrap();
    timer.pause().unwrap();
    timer.reset();
    assert_eq!(timer.status(), CountdownStatus::Idle);
    assert_eq!(timer.remaining_ms(), 0);

    timer.start().unwrap();
    let token = timer.active_tick().unwrap();
    timer.on_tick(token);
    assert_eq!(timer.on_tick(token), TickOutcome::Finished);
    timer.reset();
    assert_eq!(timer.status(), CountdownStatus::Idle);
    assert_eq!(timer.configured(), TimerDuration::new(0, 0, 2));
}

#[test]
fn pause_and_resume_are_rejected_from_wrong_states() {
    let mut sw = CountdownEngine::stopwatch(HostTickSource::new());
    assert!(sw.pause().is_err());
    assert!(sw.resume().is_err());

    sw.start().unwrap();
    assert!(sw.resume().is_err());
    sw.pause().unwrap();
    assert!(sw.pause().is_err());
    assert_eq!(sw.status(), CountdownStatus::Paused);
}

#[test]
fn stopwatch_laps_track_deltas_and_stats() {
    let mut sw = CountdownEngine::stopwatch(HostTickSource::new());
    sw.start().unwrap();
    let token = sw.active_tick().unwrap();
    assert_eq!(sw.tick_interval(), Duration::from_millis(10));

    for _ in 0..150 {
        sw.on_tick(token);
    }
    let first = sw.lap().unwrap();
    for _ in 0..270 {
        sw.on_tick(token);
    }
    let second = sw.lap().unwrap();

    assert_eq!((first.index, first.cumulative_ms, first.delta_ms), (1, 1_500, 1_500));
    assert_eq!((second.index, second.cumulative_ms, second.delta_ms), (2, 4_200, 2_700));
    assert_eq!(format_stopwatch(second.cumulative_ms), "00:04.20");

    let total: u64 = sw.laps().iter().map(|lap| lap.delta_ms).sum();
    assert_eq!(total, sw.laps().last().unwrap().cumulative_ms);

    let stats = sw.lap_stats().unwrap();
    assert_eq!(stats.fastest.index, 1);
    assert_eq!(stats.slowest.index, 2);
    assert_eq!(stats.average_ms, 2_100);

    sw.pause().unwrap();
    assert!(sw.lap().is_err());
    sw.reset();
    assert!(sw.laps().is_empty());
    assert_eq!(sw.elapsed_ms(), 0);
}

#[test]
fn single_lap_has_no_stats() {
    let mut sw = CountdownEngine::stopwatch(HostTickSource::new());
    sw.start().unwrap();
    sw.lap().unwrap();
    assert_eq!(sw.lap_stats(), None);
}

#[test]
fn presets_load_their_duration() {
    let mut timer = CountdownEngine::timer(HostTickSource::new());
    let preset = TIMER_PRESETS
        .iter()
        .find(|preset| preset.label == "5 min")
        .unwrap();
    timer.apply_preset(preset).unwrap();
    assert_eq!(timer.configured(), TimerDuration::new(0, 5, 0));
}

#[test]
fn timer_session_presents_finish_alert_once() {
    let gateway = Arc::new(OutboxGateway::new());
    let mut session = TimerSession::new(HostTickSource::new(), Arc::clone(&gateway));
    session.set_duration(TimerDuration::new(0, 0, 3)).unwrap();
    session.start().unwrap();
    let token = session.active_tick().unwrap();

    for _ in 0..5 {
        session.on_tick(token);
    }

    let commands = gateway.drain();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        NotificationCommand::Present(alert) => {
            assert_eq!(alert.channel, NotificationChannel::Timer);
            assert_eq!(alert.title, "Timer Finished");
            assert_eq!(alert.message, "Your timer has completed!");
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(session.last_alert_error().is_none());
}

#[test]
fn timer_session_finishes_even_when_alert_is_refused() {
    let gateway = Arc::new(OutboxGateway::new());
    gateway.set_permission_granted(false);
    let mut session = TimerSession::new(HostTickSource::new(), Arc::clone(&gateway));
    session.set_duration(TimerDuration::new(0, 0, 1)).unwrap();
    session.start().unwrap();
    let token = session.active_tick().unwrap();

    assert_eq!(session.on_tick(token), TickOutcome::Finished);
    assert_eq!(session.snapshot().status, CountdownStatus::Finished);
    assert!(session.last_alert_error().is_some());
    assert_eq!(gateway.pending_len(), 0);

    session.reset();
    assert!(session.last_alert_error().is_none());
}

#[test]
fn measured_delta_past_zero_finishes_once_and_saturates() {
    let gateway = Arc::new(OutboxGateway::new());
    let mut session = TimerSession::new(HostTickSource::new(), Arc::clone(&gateway));
    session.set_duration(TimerDuration::new(0, 0, 1)).unwrap();
    session.start().unwrap();
    let token = session.active_tick().unwrap();

    assert_eq!(session.advance(token, 1_500), TickOutcome::Finished);
    assert_eq!(session.snapshot().remaining_ms, 0);
    assert_eq!(session.snapshot().status, CountdownStatus::Finished);
    assert_eq!(session.advance(token, 1_500), TickOutcome::Ignored);
    assert_eq!(session.on_tick(token), TickOutcome::Ignored);
    assert_eq!(session.snapshot().remaining_ms, 0);
    assert_eq!(session.engine().tick_source().active_count(), 0);

    let presented = gateway
        .drain()
        .into_iter()
        .filter(|command| matches!(command, NotificationCommand::Present(_)))
        .count();
    assert_eq!(presented, 1);
}

#[test]
fn uneven_stopwatch_deltas_accumulate_exactly() {
    let mut sw = CountdownEngine::stopwatch(HostTickSource::new());
    sw.start().unwrap();
    let token = sw.active_tick().unwrap();

    assert_eq!(sw.advance(token, 37), TickOutcome::Advanced);
    assert_eq!(sw.advance(token, 13), TickOutcome::Advanced);
    assert_eq!(sw.elapsed_ms(), 50);
    let lap = sw.lap().unwrap();
    assert_eq!((lap.cumulative_ms, lap.delta_ms), (50, 50));

    assert_eq!(sw.on_tick(token), TickOutcome::Advanced);
    assert_eq!(sw.elapsed_ms(), 60);
}

#[test]
fn measured_delta_with_stale_token_is_ignored() {
    let mut sw = CountdownEngine::stopwatch(HostTickSource::new());
    sw.start().unwrap();
    let first = sw.active_tick().unwrap();
    sw.pause().unwrap();
    assert_eq!(sw.advance(first, 500), TickOutcome::Ignored);

    sw.resume().unwrap();
    assert_eq!(sw.advance(first, 500), TickOutcome::Ignored);
    assert_eq!(sw.elapsed_ms(), 0);

    let current = sw.active_tick().unwrap();
    assert_eq!(sw.advance(current, 500), TickOutcome::Advanced);
    assert_eq!(sw.elapsed_ms(), 500);
}
