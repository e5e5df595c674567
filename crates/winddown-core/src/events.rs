use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of a break timer produces an Event.
/// Hosts may log them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        tick_period_ms: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        at: DateTime<Utc>,
    },
    /// Saturation restored and indicator hidden.
    Reset {
        at: DateTime<Utc>,
    },
    /// Idle longer than the break duration; the active period restarts.
    BreakDetected {
        idle_minutes: f64,
        at: DateTime<Utc>,
    },
    /// Past the break threshold.
    WindingDown {
        overtime_minutes: f64,
        /// Unclamped target, may be negative.
        target_saturation: f64,
        /// Value last handed to the host.
        rendered_saturation: f64,
        at: DateTime<Utc>,
    },
    Postponed {
        minutes_until_winddown: f64,
        at: DateTime<Utc>,
    },
    ActivityLogged {
        at: DateTime<Utc>,
    },
    Configured {
        tick_period_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        active_minutes: f64,
        idle_minutes: f64,
        minutes_until_winddown: f64,
        saturation: f64,
        indicator_visible: bool,
        at: DateTime<Utc>,
    },
}

