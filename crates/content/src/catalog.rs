use std::collections::HashSet;
use std::path::Path;

use mathplay_core::model::{ExerciseId, ExerciseSettings, FeedbackMessages};
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::scenario::{AnswerKey, Scenario};

/// How the learner enters answers for an exercise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyle {
    /// Numeric keypad owned by the host.
    Keypad,
    /// Option buttons placed in the host's keypad area.
    Options,
    /// Free text (select boxes, tables) entered in the exercise body.
    #[default]
    Text,
}

/// A static exercise: identity, lifecycle settings and its scenario table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: ExerciseId,
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub input: InputStyle,
    #[serde(default)]
    pub settings: ExerciseSettings,
    #[serde(default)]
    pub messages: FeedbackMessages,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl ExerciseDefinition {
    fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() {
            return Err(ContentError::EmptyTitle {
                exercise: self.id.clone(),
            });
        }
        if self.input == InputStyle::Options {
            if let Some(index) = self.scenarios.iter().position(|s| s.choices.is_empty()) {
                return Err(ContentError::MissingChoices {
                    exercise: self.id.clone(),
                    index,
                });
            }
        }
        for (index, scenario) in self.scenarios.iter().enumerate() {
            if let AnswerKey::Numeric {
                tolerance: Some(tolerance),
                ..
            } = scenario.answer
            {
                if !tolerance.is_finite() || tolerance < 0.0 {
                    return Err(ContentError::InvalidTolerance {
                        exercise: self.id.clone(),
                        index,
                        tolerance,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Ordered collection of exercises, as stored in a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub exercises: Vec<ExerciseDefinition>,
}

impl Catalog {
    /// Parses and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Parse` for malformed JSON (including invalid settings) and
    /// the validation errors of [`Catalog::validate`].
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Io` when the file cannot be read, otherwise as
    /// [`Catalog::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks id uniqueness, titles, option choices and scenario tolerances.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentError` found.
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for exercise in &self.exercises {
            if !seen.insert(&exercise.id) {
                return Err(ContentError::DuplicateId(exercise.id.clone()));
            }
            exercise.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &ExerciseId) -> Option<&ExerciseDefinition> {
        self.exercises.iter().find(|exercise| &exercise.id == id)
    }
}
