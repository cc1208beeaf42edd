//! The scaffold an exercise runs inside.
//!
//! The host shows feedback, counts attempts, owns the keypad, and drives the advance
//! signal. Exercises only talk to it through [`HostSurface`].

use std::cell::{Cell, RefCell};

use mathplay_core::model::{ExerciseId, Feedback, FeedbackKind};

use crate::input::KeypadLayout;

/// Callbacks an exercise may invoke on its host.
///
/// Methods take `&self`: hosts are shared through `Rc` and use interior mutability.
pub trait HostSurface {
    /// Replaces the feedback banner; `None` clears it.
    fn show_feedback(&self, feedback: Option<Feedback>);

    /// Reports one finished attempt.
    fn on_attempt(&self, correct: bool);

    /// Routes keypad key tokens to `owner`; `None` releases the keypad.
    fn register_keypad_handler(&self, owner: Option<ExerciseId>);

    /// Puts option buttons in the keypad area; `None` restores the keypad.
    fn set_custom_keypad_content(&self, layout: Option<KeypadLayout>);
}

/// Attempt counters shown by the scaffold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScaffoldProgress {
    pub attempts: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub stars: u32,
}

impl ScaffoldProgress {
    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
            self.stars += 1;
        } else {
            self.incorrect += 1;
        }
    }
}

/// In-process host that remembers every callback.
#[derive(Debug, Default)]
pub struct RecordingHost {
    feedback: RefCell<Vec<Option<Feedback>>>,
    attempts: RefCell<Vec<bool>>,
    progress: Cell<ScaffoldProgress>,
    keypad_owner: RefCell<Option<ExerciseId>>,
    custom_content: RefCell<Option<KeypadLayout>>,
    signal: Cell<Option<u64>>,
}

impl RecordingHost {
    /// Host with the advance counter started at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signal: Cell::new(Some(0)),
            ..Self::default()
        }
    }

    /// Host that never provides an advance signal.
    #[must_use]
    pub fn without_signal() -> Self {
        Self::default()
    }

    /// Bumps the advance counter ("next" button). Returns the new value.
    pub fn advance(&self) -> u64 {
        let next = self.signal.get().map_or(0, |value| value.saturating_add(1));
        self.signal.set(Some(next));
        next
    }

    #[must_use]
    pub fn signal(&self) -> Option<u64> {
        self.signal.get()
    }

    #[must_use]
    pub fn progress(&self) -> ScaffoldProgress {
        self.progress.get()
    }

    /// Outcomes passed to `on_attempt`, oldest first.
    #[must_use]
    pub fn attempts(&self) -> Vec<bool> {
        self.attempts.borrow().clone()
    }

    /// Every `show_feedback` call, oldest first.
    #[must_use]
    pub fn feedback_log(&self) -> Vec<Option<Feedback>> {
        self.feedback.borrow().clone()
    }

    /// Feedback currently on screen.
    #[must_use]
    pub fn current_feedback(&self) -> Option<Feedback> {
        self.feedback.borrow().last().cloned().flatten()
    }

    #[must_use]
    pub fn congrats_shown(&self) -> usize {
        self.feedback
            .borrow()
            .iter()
            .flatten()
            .filter(|feedback| feedback.kind == FeedbackKind::Congrats)
            .count()
    }

    #[must_use]
    pub fn keypad_owner(&self) -> Option<ExerciseId> {
        self.keypad_owner.borrow().clone()
    }

    #[must_use]
    pub fn custom_content(&self) -> Option<KeypadLayout> {
        self.custom_content.borrow().clone()
    }
}

impl HostSurface for RecordingHost {
    fn show_feedback(&self, feedback: Option<Feedback>) {
        self.feedback.borrow_mut().push(feedback);
    }

    fn on_attempt(&self, correct: bool) {
        self.attempts.borrow_mut().push(correct);
        let mut progress = self.progress.get();
        progress.record(correct);
        self.progress.set(progress);
    }

    fn register_keypad_handler(&self, owner: Option<ExerciseId>) {
        *self.keypad_owner.borrow_mut() = owner;
    }

    fn set_custom_keypad_content(&self, layout: Option<KeypadLayout>) {
        *self.custom_content.borrow_mut() = layout;
    }
}
