use std::path::Path;

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use winddown_core::{
    BreakTimer, Config, CoreError, Event, HostCall, ManualClock, RecordingHost, WinddownConfig,
    MAX_MINUTES,
};

use crate::terminal_host::saturation_bar;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Minutes to simulate
    #[arg(long, default_value = "40")]
    pub minutes: f64,
    /// Minutes between ticks (default: the configured tick period)
    #[arg(long)]
    pub step: Option<f64>,
    /// Stop typing after this many minutes
    #[arg(long)]
    pub idle_after: Option<f64>,
    /// Postpone the break at this minute
    #[arg(long)]
    pub postpone_at: Option<f64>,
    /// Override minutes till break
    #[arg(long)]
    pub minutes_till_break: Option<f64>,
    /// Print one JSON object per frame
    #[arg(long)]
    pub json: bool,
}

/// Everything that happened on one simulated tick.
#[derive(Debug, Serialize)]
struct Frame {
    minute: f64,
    events: Vec<Event>,
    host_calls: Vec<HostCall>,
}

fn timer_config(path: &Path, args: &SimulateArgs) -> Result<WinddownConfig, CoreError> {
    let mut timer = Config::load_from(path)?.timer;
    if let Some(minutes) = args.minutes_till_break {
        timer.minutes_till_break = minutes;
    }
    Ok(timer)
}

fn simulate(config: WinddownConfig, args: &SimulateArgs) -> Result<Vec<Frame>, CoreError> {
    let step = args
        .step
        .unwrap_or(1.0 / config.effective_frames_per_minute());
    // The manual clock moves in whole milliseconds; a shorter step rounds to zero.
    if !step.is_finite() || step * 60_000.0 < 0.5 || step > MAX_MINUTES {
        return Err(CoreError::Custom(format!(
            "step must be between one millisecond and {MAX_MINUTES} minutes, got {step}"
        )));
    }
    if !args.minutes.is_finite() || args.minutes < 0.0 || args.minutes > MAX_MINUTES {
        return Err(CoreError::Custom(format!(
            "minutes must be between 0 and {MAX_MINUTES}, got {}",
            args.minutes
        )));
    }

    let clock = ManualClock::new(Utc::now());
    let mut timer = BreakTimer::with_clock(RecordingHost::new(), clock.clone());
    timer.configure(config)?;
    timer.host_mut().take_calls();

    let mut frames = Vec::new();
    let mut postponed = false;
    let ticks = (args.minutes / step + 1e-9).floor() as u64;
    for tick in 1..=ticks {
        let minute = tick as f64 * step;
        clock.advance_minutes(step);

        let mut events = Vec::new();
        if args.idle_after.map_or(true, |idle| minute <= idle) {
            timer.log_activity();
        }
        if let Some(at) = args.postpone_at {
            if !postponed && minute >= at {
                events.push(timer.postpone());
                postponed = true;
            }
        }
        events.extend(timer.update());

        let host_calls = timer.host_mut().take_calls();
        if events.is_empty() && host_calls.is_empty() {
            continue;
        }
        frames.push(Frame {
            minute,
            events,
            host_calls,
        });
    }
    Ok(frames)
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::BreakDetected { idle_minutes, .. } => {
            Some(format!("on a break ({idle_minutes:.2} min idle)"))
        }
        Event::WindingDown {
            overtime_minutes,
            target_saturation,
            rendered_saturation,
            ..
        } => Some(format!(
            "winding down: {overtime_minutes:.2} min over, target {target_saturation:.2} {}",
            saturation_bar(*rendered_saturation)
        )),
        Event::Postponed {
            minutes_until_winddown,
            ..
        } => Some(format!("postponed, {minutes_until_winddown} min until wind-down")),
        Event::Reset { .. } => Some("wind-down cleared".to_string()),
        _ => None,
    }
}

pub fn run(path: &Path, args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = timer_config(path, &args)?;
    let frames = simulate(config, &args)?;

    for frame in &frames {
        if args.json {
            println!("{}", serde_json::to_string(frame)?);
            continue;
        }
        for line in frame.events.iter().filter_map(describe) {
            println!("[{:>7.2}m] {line}", frame.minute);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(minutes: f64) -> SimulateArgs {
        SimulateArgs {
            minutes,
            step: Some(0.25),
            idle_after: None,
            postpone_at: None,
            minutes_till_break: None,
            json: false,
        }
    }

    #[test]
    fn quiet_until_threshold() {
        let frames = simulate(WinddownConfig::default(), &args(25.0)).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn winddown_frames_follow_threshold() {
        let frames = simulate(WinddownConfig::default(), &args(30.0)).unwrap();
        assert_eq!(frames.len(), 20);
        assert!((frames[0].minute - 25.25).abs() < 1e-9);
        let last = frames.last().unwrap();
        assert!(last
            .host_calls
            .contains(&HostCall::SetSaturation { saturation: 0.0 }));
    }

    #[test]
    fn idle_produces_break() {
        let mut a = args(32.0);
        a.idle_after = Some(27.0);
        let frames = simulate(WinddownConfig::default(), &a).unwrap();
        assert!(frames
            .iter()
            .flat_map(|f| &f.events)
            .any(|e| matches!(e, Event::BreakDetected { .. })));
    }

    #[test]
    fn postpone_delays_next_winddown() {
        let mut a = args(40.0);
        a.postpone_at = Some(27.0);
        let frames = simulate(WinddownConfig::default(), &a).unwrap();
        let resumed = frames
            .iter()
            .filter(|f| f.minute > 27.0)
            .find(|f| f.events.iter().any(|e| matches!(e, Event::WindingDown { .. })))
            .unwrap();
        assert!((resumed.minute - 32.25).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_step() {
        let mut a = args(10.0);
        a.step = Some(0.0);
        assert!(simulate(WinddownConfig::default(), &a).is_err());
    }

    #[test]
    fn rejects_sub_millisecond_step() {
        let mut a = args(10.0);
        a.step = Some(1e-6);
        assert!(simulate(WinddownConfig::default(), &a).is_err());

        a.step = Some(1.0 / 60_000.0);
        assert!(simulate(WinddownConfig::default(), &a).is_ok());
    }

    #[test]
    fn rejects_oversized_threshold_before_postponing() {
        let mut a = args(2.0);
        a.postpone_at = Some(1.0);
        let config = WinddownConfig {
            minutes_till_break: 1e12,
            ..WinddownConfig::default()
        };
        assert!(matches!(
            simulate(config, &a),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn default_step_follows_frames_per_minute() {
        let mut a = args(26.0);
        a.step = None;
        let frames = simulate(WinddownConfig::default(), &a).unwrap();
        assert!((frames[0].minute - 25.25).abs() < 1e-9);
    }
}
