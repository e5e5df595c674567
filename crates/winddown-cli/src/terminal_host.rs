//! Draws the break timer's output as terminal lines.

use winddown_core::{EditorHost, Indicator};

const BAR_WIDTH: usize = 20;

/// Prints saturation changes and the break prompt to stdout.
///
/// The timer re-shows the prompt on every overtime tick and resets on every
/// idle tick; only changes are printed.
#[derive(Debug, Default)]
pub struct TerminalHost {
    desaturated: bool,
    prompt: Option<String>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `[##########----------]` with one `#` per 5% saturation.
pub fn saturation_bar(saturation: f64) -> String {
    let filled = (saturation.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

impl EditorHost for TerminalHost {
    fn set_saturation(&mut self, saturation: f64) {
        self.desaturated = saturation < 1.0;
        println!("colour {} {:>3.0}%", saturation_bar(saturation), saturation * 100.0);
    }

    fn reset_saturation(&mut self) {
        if self.desaturated {
            self.desaturated = false;
            println!("colour {} 100%", saturation_bar(1.0));
        }
    }

    fn show_indicator(&mut self, indicator: &Indicator) {
        if self.prompt.as_deref() != Some(indicator.text.as_str()) {
            println!("{} (type `p` + Enter)", indicator.text);
            self.prompt = Some(indicator.text.clone());
        }
    }

    fn hide_indicator(&mut self) {
        if self.prompt.take().is_some() {
            println!("break prompt cleared");
        }
    }
}
