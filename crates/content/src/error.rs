use mathplay_core::model::ExerciseId;
use thiserror::Error;

/// Errors surfaced while loading or looking up exercise content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("exercise not found: {0}")]
    NotFound(ExerciseId),

    #[error("duplicate exercise id: {0}")]
    DuplicateId(ExerciseId),

    #[error("exercise {exercise} has an empty title")]
    EmptyTitle { exercise: ExerciseId },

    #[error("scenario {index} of {exercise} needs choices for option input")]
    MissingChoices { exercise: ExerciseId, index: usize },

    #[error("scenario {index} of {exercise} has an invalid tolerance: {tolerance}")]
    InvalidTolerance {
        exercise: ExerciseId,
        index: usize,
        tolerance: f64,
    },

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
