//! Break timer implementation.
//!
//! The break timer is a wall-clock-based state machine. It does not use
//! internal threads - the caller (usually [`Session`](crate::Session)) is
//! responsible for calling `update()` periodically.
//!
//! ## Phases
//!
//! There is no stored mode. Every `update()` infers the phase from two
//! elapsed times:
//!
//! ```text
//! idle > break_duration            -> OnBreak      (restart active period, reset)
//! active <= minutes_till_break     -> Focused      (nothing to do)
//! active >  minutes_till_break     -> WindingDown  (desaturate, show indicator)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = BreakTimer::new(host);
//! // On every keystroke:
//! timer.log_activity();
//! // Every tick:
//! timer.update();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::WinddownConfig;
use crate::clock::{minutes_between, minutes_to_duration, Clock, SystemClock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::host::{EditorHost, Indicator};

/// Saturation changes at or below this are not sent to the host.
pub const SATURATION_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    OnBreak,
    Focused,
    WindingDown,
}

/// Saturation the editor should show after `active_minutes` of coding.
///
/// Linear from 1.0 at the break threshold down to 0.0 once the wind-down
/// duration has passed, and below zero after that. Not clamped.
pub fn target_saturation(config: &WinddownConfig, active_minutes: f64) -> f64 {
    let overtime_minutes = active_minutes - config.minutes_till_break;
    1.0 - overtime_minutes / config.winddown_duration_minutes
}

/// Core break timer.
///
/// Holds one coding session: when the current active period began, when
/// the user last did something, and what the host was last told to draw.
#[derive(Debug)]
pub struct BreakTimer<H, C = SystemClock> {
    config: WinddownConfig,
    /// Start of the current active period (end of the last break).
    first_active: DateTime<Utc>,
    /// Last registered activity.
    last_active: DateTime<Utc>,
    /// Last saturation sent to the host.
    current_saturation: f64,
    /// Created on the first wind-down tick.
    indicator: Option<Indicator>,
    indicator_visible: bool,
    host: H,
    clock: C,
}

impl<H: EditorHost> BreakTimer<H, SystemClock> {
    /// Create a timer with the default configuration on the system clock.
    pub fn new(host: H) -> Self {
        Self::with_clock(host, SystemClock)
    }
}

impl<H: EditorHost, C: Clock> BreakTimer<H, C> {
    pub fn with_clock(host: H, clock: C) -> Self {
        let now = clock.now();
        Self {
            config: WinddownConfig::default(),
            first_active: now,
            last_active: now,
            current_saturation: 1.0,
            indicator: None,
            indicator_visible: false,
            host,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &WinddownConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn first_active(&self) -> DateTime<Utc> {
        self.first_active
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn current_saturation(&self) -> f64 {
        self.current_saturation
    }

    pub fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    /// Minutes since the current active period began.
    pub fn active_minutes(&self) -> f64 {
        minutes_between(self.first_active, self.clock.now())
    }

    /// Minutes since the last registered activity.
    pub fn idle_minutes(&self) -> f64 {
        minutes_between(self.last_active, self.clock.now())
    }

    /// The phase the next `update()` would act on.
    pub fn phase(&self) -> Phase {
        self.phase_for(self.idle_minutes(), self.active_minutes())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.clock.now();
        let idle_minutes = minutes_between(self.last_active, now);
        let active_minutes = minutes_between(self.first_active, now);
        Event::StateSnapshot {
            phase: self.phase_for(idle_minutes, active_minutes),
            active_minutes,
            idle_minutes,
            minutes_until_winddown: (self.config.minutes_till_break - active_minutes).max(0.0),
            saturation: self.current_saturation,
            indicator_visible: self.indicator_visible,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Restore full saturation and hide the indicator.
    pub fn reset(&mut self) -> Event {
        let now = self.clock.now();
        self.reset_at(now)
    }

    /// Replace the configuration wholesale and evaluate once right away.
    ///
    /// Returns the `Configured` event followed by whatever the forced tick
    /// produced.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] and keeps the previous configuration
    /// if any value is non-finite or not positive.
    pub fn configure(&mut self, config: WinddownConfig) -> Result<Vec<Event>, ValidationError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejected break timer configuration");
            return Err(e);
        }
        debug!(?config, "break timer configured");
        let tick_period_ms = config.tick_period().as_millis() as u64;
        self.config = config;

        let mut events = vec![Event::Configured {
            tick_period_ms,
            at: self.clock.now(),
        }];
        events.extend(self.update());
        Ok(events)
    }

    /// Push the next wind-down `postpone_duration_minutes` into the future.
    pub fn postpone(&mut self) -> Event {
        let now = self.clock.now();
        let budget = self.config.minutes_till_break - self.config.postpone_duration_minutes;
        self.first_active = now - minutes_to_duration(budget);
        self.reset_at(now);
        info!(
            minutes = self.config.postpone_duration_minutes,
            "break postponed"
        );
        Event::Postponed {
            minutes_until_winddown: self.config.postpone_duration_minutes,
            at: now,
        }
    }

    /// Register user activity.
    pub fn log_activity(&mut self) -> Event {
        let now = self.clock.now();
        self.last_active = now;
        Event::ActivityLogged { at: now }
    }

    /// Evaluate the current phase and update the host.
    ///
    /// Returns `None` while the user is coding within budget. If a wind-down
    /// is still displayed when the user is back within budget (a raised
    /// `minutes_till_break`), the wind-down is cleared with a full reset and
    /// `Event::Reset` is returned instead.
    pub fn update(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let idle_minutes = minutes_between(self.last_active, now);
        let active_minutes = minutes_between(self.first_active, now);

        match self.phase_for(idle_minutes, active_minutes) {
            Phase::OnBreak => {
                // Fires on every idle tick; the active period only starts
                // counting once a tick sees the user back.
                if self.indicator_visible || self.current_saturation < 1.0 {
                    info!(idle_minutes, "break detected");
                }
                self.first_active = now;
                self.reset_at(now);
                Some(Event::BreakDetected { idle_minutes, at: now })
            }
            Phase::Focused => {
                if self.indicator_visible || self.current_saturation < 1.0 {
                    // Thresholds moved under a visible wind-down.
                    debug!(active_minutes, "back within budget, clearing wind-down");
                    return Some(self.reset_at(now));
                }
                None
            }
            Phase::WindingDown => Some(self.wind_down(active_minutes, now)),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn phase_for(&self, idle_minutes: f64, active_minutes: f64) -> Phase {
        if idle_minutes > self.config.break_duration_minutes {
            Phase::OnBreak
        } else if active_minutes <= self.config.minutes_till_break {
            Phase::Focused
        } else {
            Phase::WindingDown
        }
    }

    fn wind_down(&mut self, active_minutes: f64, now: DateTime<Utc>) -> Event {
        let overtime_minutes = active_minutes - self.config.minutes_till_break;
        let target = target_saturation(&self.config, active_minutes);
        let rendered = target.clamp(0.0, 1.0);

        if (self.current_saturation - rendered).abs() > SATURATION_EPSILON {
            self.current_saturation = rendered;
            self.host.set_saturation(rendered);
        }

        if !self.indicator_visible {
            info!(overtime_minutes, "wind-down started");
        }
        let text = self.config.break_prompt();
        let indicator = self
            .indicator
            .get_or_insert_with(|| Indicator::postpone(String::new()));
        indicator.text = text;
        self.host.show_indicator(indicator);
        self.indicator_visible = true;

        debug!(overtime_minutes, target, rendered = self.current_saturation, "winding down");
        Event::WindingDown {
            overtime_minutes,
            target_saturation: target,
            rendered_saturation: self.current_saturation,
            at: now,
        }
    }

    fn reset_at(&mut self, now: DateTime<Utc>) -> Event {
        self.host.reset_saturation();
        self.current_saturation = 1.0;
        if self.indicator.is_some() {
            self.host.hide_indicator();
        }
        self.indicator_visible = false;
        Event::Reset { at: now }
    }
}
