//! The editor side of the break timer.
//!
//! The timer decides *what* should be visible; an [`EditorHost`] decides how
//! to draw it. Editors implement this trait over their colour and status-bar
//! APIs.

use serde::{Deserialize, Serialize};

/// Command bound to the indicator; invoking it should call `postpone()`.
pub const POSTPONE_COMMAND: &str = "winddown.postpone";

/// The on-screen break prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub text: String,
    /// Command the host runs when the user clicks the indicator.
    pub command: String,
}

impl Indicator {
    pub fn postpone(text: String) -> Self {
        Self {
            text,
            command: POSTPONE_COMMAND.to_string(),
        }
    }
}

/// Rendering collaborator driven by [`BreakTimer`](crate::BreakTimer).
pub trait EditorHost {
    /// Apply a desaturation factor; 1.0 is normal colour, 0.0 is grey.
    fn set_saturation(&mut self, saturation: f64);

    /// Restore the normal appearance.
    fn reset_saturation(&mut self);

    fn show_indicator(&mut self, indicator: &Indicator);

    fn hide_indicator(&mut self);
}

/// One call made on an [`EditorHost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    SetSaturation { saturation: f64 },
    ResetSaturation,
    ShowIndicator { text: String, command: String },
    HideIndicator,
}

/// Host that records every call instead of drawing anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Remove and return everything recorded so far.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Saturation values passed to `set_saturation`, in order.
    pub fn saturations(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::SetSaturation { saturation } => Some(*saturation),
                _ => None,
            })
            .collect()
    }

    /// Whether the last indicator call left it on screen.
    pub fn indicator_visible(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HostCall::ShowIndicator { .. } => Some(true),
                HostCall::HideIndicator => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl EditorHost for RecordingHost {
    fn set_saturation(&mut self, saturation: f64) {
        self.calls.push(HostCall::SetSaturation { saturation });
    }

    fn reset_saturation(&mut self) {
        self.calls.push(HostCall::ResetSaturation);
    }

    fn show_indicator(&mut self, indicator: &Indicator) {
        self.calls.push(HostCall::ShowIndicator {
            text: indicator.text.clone(),
            command: indicator.command.clone(),
        });
    }

    fn hide_indicator(&mut self) {
        self.calls.push(HostCall::HideIndicator);
    }
}
