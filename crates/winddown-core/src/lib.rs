//! # Winddown Core Library
//!
//! Break-reminder timer for text editors. It tracks how long the user has
//! been coding since their last break and, once a threshold passes, fades
//! the editor towards grey while showing a prompt that offers a few more
//! minutes.
//!
//! ## Architecture
//!
//! - **Break Timer**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `update()`
//! - **Host**: Trait the editor implements to draw saturation and the prompt
//! - **Session**: Tokio task that ticks a break timer at its configured rate
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`BreakTimer`]: Core state machine
//! - [`EditorHost`]: Rendering collaborator
//! - [`Session`]: Repeating tick task bound to a timer
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod host;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use host::{EditorHost, HostCall, Indicator, RecordingHost, POSTPONE_COMMAND};
pub use runtime::Session;
pub use storage::Config;
pub use timer::{target_saturation, BreakTimer, Phase, WinddownConfig, MAX_MINUTES};
