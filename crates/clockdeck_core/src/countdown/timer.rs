//! Timer session: countdown engine plus the finish alert.
//!
//! # Invariants
//! - The finish notification is presented exactly once per run, on the
//!   tick that reaches zero.
//! - A refused finish notification does not change engine state; the UI
//!   still sees `Finished` through the snapshot.

use crate::countdown::engine::{CountdownEngine, CountdownResult, SubscriptionId, TickOutcome};
use crate::countdown::tick::{TickSource, TickToken};
use crate::model::countdown::{CountdownSnapshot, TimerDuration, TimerPreset};
use crate::notify::gateway::{
    GatewayError, InstantNotification, NotificationChannel, NotificationGateway,
};
use log::warn;

pub const TIMER_FINISHED_TITLE: &str = "Timer Finished";
pub const TIMER_FINISHED_MESSAGE: &str = "Your timer has completed!";

/// Timer screen state machine bound to a notification gateway.
pub struct TimerSession<S: TickSource, G: NotificationGateway> {
    engine: CountdownEngine<S>,
    gateway: G,
    last_alert_error: Option<GatewayError>,
}

impl<S: TickSource, G: NotificationGateway> TimerSession<S, G> {
    pub fn new(ticks: S, gateway: G) -> Self {
        Self {
            engine: CountdownEngine::timer(ticks),
            gateway,
            last_alert_error: None,
        }
    }

    pub fn engine(&self) -> &CountdownEngine<S> {
        &self.engine
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        self.engine.snapshot()
    }

    pub fn active_tick(&self) -> Option<TickToken> {
        self.engine.active_tick()
    }

    /// Gateway refusal from the most recent finish, if any.
    pub fn last_alert_error(&self) -> Option<&GatewayError> {
        self.last_alert_error.as_ref()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CountdownSnapshot) + Send + 'static,
    ) -> SubscriptionId {
        self.engine.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.engine.unsubscribe(id)
    }

    pub fn set_duration(&mut self, duration: TimerDuration) -> CountdownResult<()> {
        self.engine.set_duration(duration)
    }

    pub fn apply_preset(&mut self, preset: &TimerPreset) -> CountdownResult<()> {
        self.engine.apply_preset(preset)
    }

    pub fn start(&mut self) -> CountdownResult<()> {
        self.engine.start()
    }

    pub fn pause(&mut self) -> CountdownResult<()> {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> CountdownResult<()> {
        self.engine.resume()
    }

    pub fn reset(&mut self) {
        self.last_alert_error = None;
        self.engine.reset();
    }

    pub fn on_tick(&mut self, token: TickToken) -> TickOutcome {
        let outcome = self.engine.on_tick(token);
        self.after_tick(outcome)
    }

    pub fn advance(&mut self, token: TickToken, delta_ms: u64) -> TickOutcome {
        let outcome = self.engine.advance(token, delta_ms);
        self.after_tick(outcome)
    }

    fn after_tick(&mut self, outcome: TickOutcome) -> TickOutcome {
        if outcome == TickOutcome::Finished {
            let alert = InstantNotification {
                channel: NotificationChannel::Timer,
                title: TIMER_FINISHED_TITLE.to_string(),
                message: TIMER_FINISHED_MESSAGE.to_string(),
            };
            if let Err(err) = self.gateway.present(&alert) {
                warn!(
                    "event=timer_alert module=countdown status=error error_code=gateway_refused error={}",
                    err
                );
                self.last_alert_error = Some(err);
            }
        }
        outcome
    }
}
