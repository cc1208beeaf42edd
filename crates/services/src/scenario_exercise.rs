use std::rc::Rc;

use rand::Rng;
use rand::rngs::StdRng;

use content::{ExerciseDefinition, InputStyle, Response, Scenario, ScenarioRepository};
use mathplay_core::Clock;
use mathplay_core::model::ExerciseId;

use crate::error::ExerciseError;
use crate::exercise::ExerciseContent;
use crate::host::HostSurface;

/// Exercise whose challenges come from a static scenario table.
pub type ScenarioExercise<R = StdRng> = ExerciseContent<Scenario, Response, R>;

/// Builds a scenario exercise wired for the definition's input style. Not mounted yet.
#[must_use]
pub fn build_scenario_exercise<R: Rng>(
    definition: &ExerciseDefinition,
    host: Rc<dyn HostSurface>,
    rng: R,
    clock: Clock,
) -> ScenarioExercise<R> {
    let tolerance = definition.settings.tolerance();
    let exercise = ExerciseContent::new(
        definition.id.clone(),
        host,
        move |scenario: &Scenario, response: &Response| scenario.is_correct(response, tolerance),
        rng,
    )
    .with_settings(definition.settings.clone())
    .with_messages(definition.messages.clone())
    .with_clock(clock);

    let parse = |scenario: &Scenario, raw: &str| scenario.answer.parse_response(raw);
    match definition.input {
        InputStyle::Keypad => exercise.with_keypad(parse),
        InputStyle::Text => exercise.with_text_input(parse),
        InputStyle::Options => exercise.with_options(
            |scenario: &Scenario| scenario.choices.clone(),
            |scenario: &Scenario, index| {
                let label = scenario.choices.get(index)?;
                scenario.answer.parse_response(label).ok()
            },
        ),
    }
}

/// Builds and mounts a scenario exercise, drawing its first challenge.
#[must_use]
pub fn mount_scenario_exercise<R: Rng>(
    definition: &ExerciseDefinition,
    host: Rc<dyn HostSurface>,
    rng: R,
    clock: Clock,
    signal: Option<u64>,
) -> ScenarioExercise<R> {
    let mut exercise = build_scenario_exercise(definition, host, rng, clock);
    exercise.mount(definition.scenarios.clone(), signal);
    exercise
}

/// Looks up `id` in `repository` and mounts it.
///
/// # Errors
///
/// Returns `ExerciseError::Content` when the exercise does not exist.
pub fn open_exercise<R: Rng>(
    repository: &dyn ScenarioRepository,
    id: &ExerciseId,
    host: Rc<dyn HostSurface>,
    rng: R,
    clock: Clock,
    signal: Option<u64>,
) -> Result<ScenarioExercise<R>, ExerciseError> {
    let definition = repository.get_exercise(id)?;
    Ok(mount_scenario_exercise(&definition, host, rng, clock, signal))
}
