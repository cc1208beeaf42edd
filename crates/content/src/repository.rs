use std::collections::HashMap;

use mathplay_core::model::ExerciseId;

use crate::catalog::{Catalog, ExerciseDefinition};
use crate::error::ContentError;
use crate::scenario::Scenario;

/// Listing entry for exercise pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseSummary {
    pub id: ExerciseId,
    pub title: String,
    pub scenario_count: usize,
}

/// Read access to static exercise content.
pub trait ScenarioRepository {
    /// Exercises in catalog order.
    fn list_exercises(&self) -> Vec<ExerciseSummary>;

    /// Fetch an exercise by id.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if missing.
    fn get_exercise(&self, id: &ExerciseId) -> Result<ExerciseDefinition, ContentError>;

    /// Fetch the scenario table of an exercise.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if missing.
    fn scenarios(&self, id: &ExerciseId) -> Result<Vec<Scenario>, ContentError> {
        self.get_exercise(id).map(|exercise| exercise.scenarios)
    }
}

/// Simple in-memory repository for the app and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScenarios {
    order: Vec<ExerciseId>,
    exercises: HashMap<ExerciseId, ExerciseDefinition>,
}

impl InMemoryScenarios {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from a validated catalog.
    ///
    /// # Errors
    ///
    /// Returns catalog validation errors.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, ContentError> {
        catalog.validate()?;
        let mut repo = Self::new();
        for exercise in catalog.exercises {
            repo.upsert(exercise);
        }
        Ok(repo)
    }

    /// Adds or replaces an exercise, keeping the position of a replaced one.
    pub fn upsert(&mut self, exercise: ExerciseDefinition) {
        if !self.exercises.contains_key(&exercise.id) {
            self.order.push(exercise.id.clone());
        }
        self.exercises.insert(exercise.id.clone(), exercise);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl ScenarioRepository for InMemoryScenarios {
    fn list_exercises(&self) -> Vec<ExerciseSummary> {
        self.order
            .iter()
            .filter_map(|id| self.exercises.get(id))
            .map(|exercise| ExerciseSummary {
                id: exercise.id.clone(),
                title: exercise.title.clone(),
                scenario_count: exercise.scenarios.len(),
            })
            .collect()
    }

    fn get_exercise(&self, id: &ExerciseId) -> Result<ExerciseDefinition, ContentError> {
        self.exercises
            .get(id)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(id.clone()))
    }
}
