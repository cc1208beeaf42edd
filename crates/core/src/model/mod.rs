mod feedback;
mod ids;
mod settings;

pub use feedback::{Feedback, FeedbackKind, FeedbackMessages};
pub use ids::{AttemptId, ExerciseId};
pub use settings::{ExerciseSettings, RetryPolicy, SettingsError};
