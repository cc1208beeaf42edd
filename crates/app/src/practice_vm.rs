use std::rc::Rc;

use chrono::{DateTime, Utc};
use content::{ExerciseDefinition, InputStyle};
use mathplay_core::Clock;
use mathplay_core::verify::exact_text;
use rand::rngs::StdRng;
use services::{ExerciseError, KeyOutcome, ScenarioExercise, Submission, mount_scenario_exercise};

use crate::console_host::ConsoleHost;

/// One typed line from the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PracticeIntent {
    Answer(String),
    Next,
    Quit,
    Help,
    Nothing,
}

impl PracticeIntent {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Nothing,
            ":next" | ":n" => Self::Next,
            ":quit" | ":q" => Self::Quit,
            ":help" | ":h" => Self::Help,
            answer => Self::Answer(answer.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unreadable,
}

impl From<Submission> for AnswerOutcome {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Verified(verdict) if verdict.correct => Self::Correct,
            Submission::Verified(_) => Self::Incorrect,
            Submission::Invalid(_) => Self::Unreadable,
        }
    }
}

/// Terminal view over a mounted scenario exercise.
pub struct PracticeVm {
    title: String,
    instructions: String,
    input: InputStyle,
    host: Rc<ConsoleHost>,
    exercise: ScenarioExercise,
}

impl PracticeVm {
    #[must_use]
    pub fn open(
        definition: &ExerciseDefinition,
        host: Rc<ConsoleHost>,
        rng: StdRng,
        clock: Clock,
    ) -> Self {
        let exercise = mount_scenario_exercise(definition, host.clone(), rng, clock, host.signal());
        Self {
            title: definition.title.clone(),
            instructions: definition.instructions.clone(),
            input: definition.input,
            host,
            exercise,
        }
    }

    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        self.exercise
            .challenge()
            .map(|scenario| scenario.prompt.as_str())
    }

    #[must_use]
    pub fn option_labels(&self) -> Vec<String> {
        self.host
            .custom_content()
            .map(|layout| layout.options)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.exercise.is_complete()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.exercise.next_deadline()
    }

    /// Lines describing the current screen.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("== {} ==", self.title)];
        if !self.instructions.is_empty() {
            lines.push(self.instructions.clone());
        }
        if self.is_complete() {
            lines.push("(sin problemas pendientes; :next o :quit)".to_string());
        } else if let Some(prompt) = self.prompt_text() {
            lines.push(format!("» {prompt}"));
        }
        for (i, label) in self.option_labels().iter().enumerate() {
            lines.push(format!("  {}) {label}", i + 1));
        }
        if self.host.keypad_owner().is_some() {
            lines.push("(teclado: números, coma decimal, signo menos)".to_string());
        }
        lines.push(self.status_line());
        lines
    }

    #[must_use]
    pub fn status_line(&self) -> String {
        let progress = self.host.progress();
        format!(
            "estrellas: {} · aciertos: {} · fallos: {}",
            progress.stars, progress.correct, progress.incorrect
        )
    }

    /// Routes a typed answer through the exercise's input channel.
    ///
    /// # Errors
    ///
    /// Returns the exercise's rejection, e.g. while the previous answer is still shown.
    pub fn answer(&mut self, raw: &str) -> Result<AnswerOutcome, ExerciseError> {
        match self.input {
            InputStyle::Options => {
                let index = self.choice_index(raw)?;
                let verdict = self.exercise.choose(index)?;
                Ok(if verdict.correct {
                    AnswerOutcome::Correct
                } else {
                    AnswerOutcome::Incorrect
                })
            }
            InputStyle::Keypad => {
                while !self.exercise.input_text().is_empty() {
                    self.exercise.press("backspace")?;
                }
                for key in raw.chars().filter(|c| !c.is_whitespace()) {
                    self.exercise.press(&key.to_string())?;
                }
                match self.exercise.press("check")? {
                    KeyOutcome::Submitted(submission) => Ok(submission.into()),
                    KeyOutcome::Edited | KeyOutcome::Ignored => Ok(AnswerOutcome::Unreadable),
                }
            }
            InputStyle::Text => self.exercise.submit_text(raw).map(AnswerOutcome::from),
        }
    }

    /// "Next" button. Returns `true` if a new challenge is on screen.
    pub fn next(&mut self) -> bool {
        self.host.advance();
        self.exercise.update(self.host.signal())
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        self.exercise.tick(now)
    }

    /// 1-based option number or the option label itself.
    fn choice_index(&self, raw: &str) -> Result<usize, ExerciseError> {
        let labels = self.option_labels();
        if let Ok(number) = raw.trim().parse::<usize>() {
            if (1..=labels.len()).contains(&number) {
                return Ok(number - 1);
            }
        }
        labels
            .iter()
            .position(|label| exact_text(label, raw))
            .ok_or(ExerciseError::UnknownChoice(labels.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content::builtin_catalog;
    use mathplay_core::model::ExerciseId;
    use mathplay_core::time::fixed_clock;
    use rand::SeedableRng;

    fn open(id: &str) -> (PracticeVm, Rc<ConsoleHost>) {
        let catalog = builtin_catalog().unwrap();
        let definition = catalog.get(&ExerciseId::new(id)).unwrap();
        let host = Rc::new(ConsoleHost::silent());
        let vm = PracticeVm::open(definition, host.clone(), StdRng::seed_from_u64(5), fixed_clock());
        (vm, host)
    }

    #[test]
    fn parses_intents() {
        assert_eq!(PracticeIntent::parse("  :next "), PracticeIntent::Next);
        assert_eq!(PracticeIntent::parse(":q"), PracticeIntent::Quit);
        assert_eq!(PracticeIntent::parse(""), PracticeIntent::Nothing);
        assert_eq!(
            PracticeIntent::parse(" 7,5 "),
            PracticeIntent::Answer("7,5".to_string())
        );
    }

    #[test]
    fn options_accept_number_or_label() {
        let (mut vm, host) = open("mayor-menor");
        assert_eq!(vm.option_labels(), vec!["<", "=", ">"]);
        let prompt = vm.prompt_text().unwrap().to_string();
        let expected = match prompt.as_str() {
            "48 __ 84" => "<",
            "305 __ 299" => ">",
            _ => "=",
        };
        let wrong = if expected == "<" { "3" } else { "1" };

        assert_eq!(vm.answer(wrong).unwrap(), AnswerOutcome::Incorrect);
        assert_eq!(vm.answer(expected).unwrap(), AnswerOutcome::Correct);
        assert!(matches!(vm.answer("?"), Err(ExerciseError::UnknownChoice(3))));
        assert_eq!(host.progress().attempts, 2);
    }

    #[test]
    fn keypad_answers_replace_previous_typing() {
        let (mut vm, host) = open("decimales");
        assert!(host.keypad_owner().is_some());
        assert_eq!(vm.answer("0").unwrap(), AnswerOutcome::Incorrect);
        assert_eq!(vm.answer("x").unwrap_err().to_string(), "unknown key: x");

        let answer = match vm.prompt_text().unwrap() {
            "3,5 + 4" => "7,5",
            "1,25 + 2,5" => "3,75",
            "0,6 + 0,7" => "1,3",
            _ => "7,6",
        };
        assert_eq!(vm.answer(answer).unwrap(), AnswerOutcome::Correct);
        assert_eq!(host.progress().correct, 1);
    }

    #[test]
    fn next_on_an_empty_exercise_stays_complete() {
        let (mut vm, host) = open("proximamente");
        assert!(vm.is_complete());
        assert!(vm.next());
        assert!(vm.is_complete());
        assert_eq!(host.progress().attempts, 1);
        assert!(vm.render().iter().any(|line| line.contains(":next")));
    }
}
