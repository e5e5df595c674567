use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest and highest number of evaluations per minute.
pub const MIN_FRAMES_PER_MINUTE: f64 = 1.0;
pub const MAX_FRAMES_PER_MINUTE: f64 = 60.0;

/// Upper bound for every duration field: one year of minutes.
pub const MAX_MINUTES: f64 = 525_600.0;

/// Thresholds driving the break timer. All durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinddownConfig {
    /// Update frequency. Clamped to 1..=60 when deriving the tick period.
    #[serde(default = "default_frames_per_minute")]
    pub frames_per_minute: f64,
    #[serde(default = "default_minutes_till_break")]
    pub minutes_till_break: f64,
    #[serde(default = "default_break_duration")]
    pub break_duration_minutes: f64,
    #[serde(default = "default_winddown_duration")]
    pub winddown_duration_minutes: f64,
    #[serde(default = "default_postpone_duration")]
    pub postpone_duration_minutes: f64,
}

fn default_frames_per_minute() -> f64 {
    4.0
}
fn default_minutes_till_break() -> f64 {
    25.0
}
fn default_break_duration() -> f64 {
    3.0
}
fn default_winddown_duration() -> f64 {
    5.0
}
fn default_postpone_duration() -> f64 {
    5.0
}

impl Default for WinddownConfig {
    fn default() -> Self {
        Self {
            frames_per_minute: default_frames_per_minute(),
            minutes_till_break: default_minutes_till_break(),
            break_duration_minutes: default_break_duration(),
            winddown_duration_minutes: default_winddown_duration(),
            postpone_duration_minutes: default_postpone_duration(),
        }
    }
}

impl WinddownConfig {
    /// Check that every value is finite and strictly positive, and that no
    /// duration exceeds [`MAX_MINUTES`].
    ///
    /// A zero wind-down duration would divide by zero when computing the
    /// overtime fraction, so it is rejected along with everything else.
    /// Durations are turned into timestamp offsets, which must stay inside
    /// chrono's date range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("frames_per_minute", self.frames_per_minute),
            ("minutes_till_break", self.minutes_till_break),
            ("break_duration_minutes", self.break_duration_minutes),
            ("winddown_duration_minutes", self.winddown_duration_minutes),
            ("postpone_duration_minutes", self.postpone_duration_minutes),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("must be a finite number, got {value}"),
                });
            }
            if value <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("must be greater than zero, got {value}"),
                });
            }
            if field != "frames_per_minute" && value > MAX_MINUTES {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("must be at most {MAX_MINUTES} minutes, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Frames per minute clamped to the supported range.
    pub fn effective_frames_per_minute(&self) -> f64 {
        self.frames_per_minute
            .clamp(MIN_FRAMES_PER_MINUTE, MAX_FRAMES_PER_MINUTE)
    }

    /// Interval between two evaluations: one minute split into frames.
    pub fn tick_period(&self) -> Duration {
        let ms = 60_000.0 / self.effective_frames_per_minute();
        Duration::from_millis(ms.round() as u64)
    }

    /// Status text shown while winding down.
    pub fn break_prompt(&self) -> String {
        format!(
            "You should take a break! (Click for {} more minutes)",
            self.postpone_duration_minutes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = WinddownConfig::default();
        assert_eq!(cfg.frames_per_minute, 4.0);
        assert_eq!(cfg.minutes_till_break, 25.0);
        assert_eq!(cfg.break_duration_minutes, 3.0);
        assert_eq!(cfg.winddown_duration_minutes, 5.0);
        assert_eq!(cfg.postpone_duration_minutes, 5.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn tick_period_divides_a_minute() {
        let cfg = WinddownConfig::default();
        assert_eq!(cfg.tick_period(), Duration::from_secs(15));
    }

    #[test]
    fn tick_period_clamps_frames_per_minute() {
        let fast = WinddownConfig {
            frames_per_minute: 600.0,
            ..WinddownConfig::default()
        };
        assert_eq!(fast.tick_period(), Duration::from_secs(1));

        let slow = WinddownConfig {
            frames_per_minute: 0.25,
            ..WinddownConfig::default()
        };
        assert_eq!(slow.tick_period(), Duration::from_secs(60));
    }

    #[test]
    fn zero_winddown_is_rejected() {
        let cfg = WinddownConfig {
            winddown_duration_minutes: 0.0,
            ..WinddownConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { ref field, .. } if field == "winddown_duration_minutes"
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let cfg = WinddownConfig {
            minutes_till_break: f64::NAN,
            ..WinddownConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = WinddownConfig {
            break_duration_minutes: f64::INFINITY,
            ..WinddownConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_values_are_rejected() {
        let cfg = WinddownConfig {
            postpone_duration_minutes: -1.0,
            ..WinddownConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn durations_beyond_a_year_are_rejected() {
        for minutes in [1e12, f64::MAX] {
            let cfg = WinddownConfig {
                minutes_till_break: minutes,
                ..WinddownConfig::default()
            };
            let err = cfg.validate().unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidValue { ref field, .. } if field == "minutes_till_break"
            ));
        }

        let at_limit = WinddownConfig {
            postpone_duration_minutes: MAX_MINUTES,
            ..WinddownConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        // Clamped rather than bounded.
        let fast = WinddownConfig {
            frames_per_minute: 1e12,
            ..WinddownConfig::default()
        };
        assert!(fast.validate().is_ok());
    }

    #[test]
    fn break_prompt_mentions_postpone_minutes() {
        let cfg = WinddownConfig::default();
        assert_eq!(
            cfg.break_prompt(),
            "You should take a break! (Click for 5 more minutes)"
        );
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: WinddownConfig = toml::from_str("minutes_till_break = 50.0").unwrap();
        assert_eq!(cfg.minutes_till_break, 50.0);
        assert_eq!(cfg.winddown_duration_minutes, 5.0);
    }
}
