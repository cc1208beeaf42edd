use serde::{Deserialize, Serialize};

/// Kind of banner the host shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    /// Everything in the exercise has been practiced.
    Congrats,
}

/// Feedback banner content handed to the host. `None` on the host side clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    #[must_use]
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn correct(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Correct, message)
    }

    #[must_use]
    pub fn incorrect(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Incorrect, message)
    }

    #[must_use]
    pub fn congrats(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Congrats, message)
    }
}

/// Copy used for the feedback banners of one exercise.
///
/// Catalog entries may override any subset; missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackMessages {
    pub correct: String,
    pub incorrect: String,
    pub invalid_input: String,
    pub completed: String,
}

impl Default for FeedbackMessages {
    fn default() -> Self {
        Self {
            correct: "¡Muy bien! Respuesta correcta.".to_string(),
            incorrect: "Casi... inténtalo de nuevo.".to_string(),
            invalid_input: "Por favor, escribe un número.".to_string(),
            completed: "¡Completaste todos los ejercicios!".to_string(),
        }
    }
}

impl FeedbackMessages {
    #[must_use]
    pub fn for_verdict(&self, correct: bool) -> Feedback {
        if correct {
            Feedback::correct(&self.correct)
        } else {
            Feedback::incorrect(&self.incorrect)
        }
    }

    #[must_use]
    pub fn invalid_input(&self) -> Feedback {
        Feedback::incorrect(&self.invalid_input)
    }

    #[must_use]
    pub fn completed(&self) -> Feedback {
        Feedback::congrats(&self.completed)
    }
}
