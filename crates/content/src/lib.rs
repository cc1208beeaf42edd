#![forbid(unsafe_code)]

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod repository;
pub mod scenario;

pub use builtin::builtin_catalog;
pub use catalog::{Catalog, ExerciseDefinition, InputStyle};
pub use error::ContentError;
pub use repository::{ExerciseSummary, InMemoryScenarios, ScenarioRepository};
pub use scenario::{AnswerKey, Response, Scenario};
