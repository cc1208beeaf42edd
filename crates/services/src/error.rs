//! Shared error types for the services crate.

use thiserror::Error;

use content::ContentError;
use mathplay_core::AttemptError;

use crate::input::UnknownKey;

/// Errors emitted by `ExerciseContent`.
///
/// Everything except `Content` is a rejected UI event; callers drop it after logging.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("no challenge is on screen")]
    NoChallenge,
    #[error("exercise does not accept typed answers")]
    TextInputUnsupported,
    #[error("exercise does not own the keypad")]
    KeypadUnavailable,
    #[error("exercise has no option buttons")]
    OptionsUnsupported,
    #[error("no option at index {0}")]
    UnknownChoice(usize),
    #[error(transparent)]
    Key(#[from] UnknownKey),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ExerciseError {
    /// Rejections that leave the exercise untouched.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Content(_))
    }
}
