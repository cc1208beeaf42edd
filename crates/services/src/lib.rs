#![forbid(unsafe_code)]

pub mod bridge;
pub mod error;
pub mod exercise;
pub mod host;
pub mod input;
pub mod scenario_exercise;

pub use mathplay_core::Clock;

pub use bridge::AdvanceSignalBridge;
pub use error::ExerciseError;
pub use exercise::{ExerciseContent, KeyOutcome, Submission};
pub use host::{HostSurface, RecordingHost, ScaffoldProgress};
pub use input::{InputBuffer, InputMode, InputRegistration, KeyToken, KeypadLayout, UnknownKey};
pub use scenario_exercise::{
    ScenarioExercise, build_scenario_exercise, mount_scenario_exercise, open_exercise,
};
