use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{AttemptId, RetryPolicy};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Transitions the attempt machine refuses. Callers driven by UI events treat these
/// as no-ops.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("the challenge is already solved")]
    AlreadySolved,
    #[error("nothing has been selected yet")]
    NoSelection,
    #[error("the previous answer is still being shown")]
    Pending,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Fresh challenge, no answer yet.
    Idle,
    /// An answer is chosen but not checked.
    Selected,
    /// Terminal for the current challenge.
    VerifiedCorrect,
    /// Wrong answer; reopens by timer or on the next selection.
    VerifiedIncorrect,
}

impl AttemptState {
    #[must_use]
    pub fn is_verified(self) -> bool {
        matches!(self, Self::VerifiedCorrect | Self::VerifiedIncorrect)
    }
}

/// Outcome of a successful `verify` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub attempt: AttemptId,
    pub correct: bool,
    /// When the attempt reopens by itself, for the auto-reset policy.
    pub retry_at: Option<DateTime<Utc>>,
}

/// Scheduled reopening of an incorrect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTimer {
    pub attempt: AttemptId,
    pub due_at: DateTime<Utc>,
}

impl RetryTimer {
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_at
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Lifecycle of the single in-flight answer to the current challenge.
///
/// ```text
/// Idle ──select──▶ Selected ──verify──▶ VerifiedCorrect (terminal)
///                     ▲   │
///                     │   └──verify──▶ VerifiedIncorrect
///                     └──── timer / select / resume ──┘
/// ```
///
/// The wrong selection survives the trip back to `Selected` so the learner can adjust it.
pub struct AttemptMachine<S> {
    policy: RetryPolicy,
    id: AttemptId,
    state: AttemptState,
    selection: Option<S>,
    is_correct: Option<bool>,
    pending: bool,
    timer: Option<RetryTimer>,
}

impl<S> AttemptMachine<S> {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            id: AttemptId::default(),
            state: AttemptState::Idle,
            selection: None,
            is_correct: None,
            pending: false,
            timer: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[must_use]
    pub fn selection(&self) -> Option<&S> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state.is_verified()
    }

    /// A wrong answer is on display and has not been reopened yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.state == AttemptState::VerifiedCorrect
    }

    /// Deadline of the armed retry timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.map(|timer| timer.due_at)
    }

    /// Starts over for a newly drawn challenge and drops any armed timer.
    pub fn reset(&mut self) {
        self.id = self.id.next();
        self.state = AttemptState::Idle;
        self.selection = None;
        self.is_correct = None;
        self.pending = false;
        self.timer = None;
    }

    /// Records the learner's answer.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadySolved` once the challenge was answered correctly.
    pub fn select(&mut self, value: S) -> Result<(), AttemptError> {
        self.reopen()?;
        self.selection = Some(value);
        self.state = AttemptState::Selected;
        Ok(())
    }

    /// Reopens a wrong attempt because the learner started editing their answer.
    ///
    /// Keeps the previous selection. Idle and selected attempts are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadySolved` once the challenge was answered correctly.
    pub fn resume(&mut self) -> Result<(), AttemptError> {
        self.reopen()
    }

    /// Checks the current selection.
    ///
    /// On a wrong answer the attempt stays pending; under [`RetryPolicy::AutoReset`] a
    /// timer bound to this attempt is armed at `now + delay`.
    ///
    /// # Errors
    ///
    /// - `AlreadySolved` once the challenge was answered correctly
    /// - `Pending` while a previous wrong answer has not been reopened
    /// - `NoSelection` when nothing was selected
    pub fn verify(
        &mut self,
        check: impl FnOnce(&S) -> bool,
        now: DateTime<Utc>,
    ) -> Result<Verdict, AttemptError> {
        match self.state {
            AttemptState::VerifiedCorrect => return Err(AttemptError::AlreadySolved),
            AttemptState::VerifiedIncorrect => return Err(AttemptError::Pending),
            AttemptState::Idle | AttemptState::Selected => {}
        }
        let Some(selection) = self.selection.as_ref() else {
            return Err(AttemptError::NoSelection);
        };

        let correct = check(selection);
        self.is_correct = Some(correct);
        if correct {
            self.state = AttemptState::VerifiedCorrect;
            self.pending = false;
            self.timer = None;
        } else {
            self.state = AttemptState::VerifiedIncorrect;
            self.pending = true;
            self.timer = self
                .policy
                .delay()
                .and_then(|delay| now.checked_add_signed(delay))
                .map(|due_at| RetryTimer {
                    attempt: self.id,
                    due_at,
                });
        }

        Ok(Verdict {
            attempt: self.id,
            correct,
            retry_at: self.next_deadline(),
        })
    }

    /// Counts unparseable input as a failed try without entering the timed path.
    ///
    /// The machine stays immediately retryable: `Selected` if an earlier selection
    /// exists, `Idle` otherwise.
    ///
    /// # Errors
    ///
    /// - `AlreadySolved` once the challenge was answered correctly
    /// - `Pending` while a previous wrong answer has not been reopened
    pub fn record_invalid_input(&mut self) -> Result<AttemptId, AttemptError> {
        match self.state {
            AttemptState::VerifiedCorrect => Err(AttemptError::AlreadySolved),
            AttemptState::VerifiedIncorrect => Err(AttemptError::Pending),
            AttemptState::Idle | AttemptState::Selected => {
                self.is_correct = Some(false);
                Ok(self.id)
            }
        }
    }

    /// Fires the retry timer when it is due. Returns `true` if the attempt reopened.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.timer else {
            return false;
        };
        if timer.attempt != self.id {
            self.timer = None;
            return false;
        }
        if !timer.is_due(now) || self.state != AttemptState::VerifiedIncorrect {
            return false;
        }
        self.timer = None;
        self.pending = false;
        self.state = AttemptState::Selected;
        true
    }

    /// Drops the armed retry timer without changing the state.
    pub fn cancel_retry(&mut self) -> Option<RetryTimer> {
        self.timer.take()
    }

    fn reopen(&mut self) -> Result<(), AttemptError> {
        match self.state {
            AttemptState::VerifiedCorrect => Err(AttemptError::AlreadySolved),
            AttemptState::VerifiedIncorrect => {
                self.timer = None;
                self.pending = false;
                self.is_correct = None;
                self.state = if self.selection.is_some() {
                    AttemptState::Selected
                } else {
                    AttemptState::Idle
                };
                Ok(())
            }
            AttemptState::Idle | AttemptState::Selected => Ok(()),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for AttemptMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptMachine")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("selection", &self.selection)
            .field("is_correct", &self.is_correct)
            .field("pending", &self.pending)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    const DELAY_MS: i64 = 1500;

    fn auto_machine() -> AttemptMachine<i32> {
        AttemptMachine::new(RetryPolicy::auto_reset(1500))
    }

    fn equals(expected: i32) -> impl FnOnce(&i32) -> bool {
        move |given| *given == expected
    }

    #[test]
    fn verify_without_selection_is_rejected() {
        let mut machine = auto_machine();
        assert_eq!(
            machine.verify(equals(3), fixed_now()),
            Err(AttemptError::NoSelection)
        );
        assert_eq!(machine.state(), AttemptState::Idle);
        assert_eq!(machine.is_correct(), None);
    }

    #[test]
    fn select_is_accepted_until_solved() {
        let mut machine = auto_machine();
        assert!(machine.select(1).is_ok());
        assert!(machine.select(2).is_ok());
        assert_eq!(machine.state(), AttemptState::Selected);

        let verdict = machine.verify(equals(5), fixed_now()).unwrap();
        assert!(!verdict.correct);
        assert_eq!(machine.state(), AttemptState::VerifiedIncorrect);
        assert!(machine.select(5).is_ok());
        assert_eq!(machine.state(), AttemptState::Selected);
        assert!(!machine.is_pending());
        assert_eq!(machine.next_deadline(), None);

        let verdict = machine.verify(equals(5), fixed_now()).unwrap();
        assert!(verdict.correct);
        assert_eq!(machine.state(), AttemptState::VerifiedCorrect);
        assert_eq!(machine.select(6), Err(AttemptError::AlreadySolved));
        assert_eq!(machine.selection(), Some(&5));
        assert_eq!(
            machine.verify(equals(5), fixed_now()),
            Err(AttemptError::AlreadySolved)
        );
    }

    #[test]
    fn auto_reset_reopens_exactly_at_the_delay() {
        let start = fixed_now();
        let mut machine = auto_machine();
        machine.select(4).unwrap();
        let verdict = machine.verify(equals(7), start).unwrap();
        let due = start + Duration::milliseconds(DELAY_MS);
        assert_eq!(verdict.retry_at, Some(due));

        assert!(!machine.poll(start));
        assert!(!machine.poll(due - Duration::milliseconds(1)));
        assert_eq!(machine.state(), AttemptState::VerifiedIncorrect);
        assert!(machine.is_pending());

        assert!(machine.poll(due));
        assert_eq!(machine.state(), AttemptState::Selected);
        assert_eq!(machine.selection(), Some(&4));
        assert!(!machine.is_pending());
        assert!(!machine.poll(due + Duration::seconds(10)));
    }

    #[test]
    fn pending_blocks_double_submission() {
        let mut machine = auto_machine();
        machine.select(1).unwrap();
        machine.verify(equals(2), fixed_now()).unwrap();
        assert_eq!(
            machine.verify(equals(2), fixed_now()),
            Err(AttemptError::Pending)
        );
    }

    #[test]
    fn manual_policy_waits_for_next_selection() {
        let mut machine = AttemptMachine::new(RetryPolicy::ManualReselect);
        machine.select(1).unwrap();
        let verdict = machine.verify(equals(2), fixed_now()).unwrap();
        assert_eq!(verdict.retry_at, None);

        assert!(!machine.poll(fixed_now() + Duration::days(1)));
        assert_eq!(machine.state(), AttemptState::VerifiedIncorrect);
        assert!(machine.is_pending());

        machine.resume().unwrap();
        assert_eq!(machine.state(), AttemptState::Selected);
        assert_eq!(machine.selection(), Some(&1));
        assert!(machine.verify(equals(1), fixed_now()).unwrap().correct);
    }

    #[test]
    fn reset_disarms_timer_of_previous_challenge() {
        let start = fixed_now();
        let mut machine = auto_machine();
        machine.select(1).unwrap();
        machine.verify(equals(2), start).unwrap();
        let old_id = machine.id();

        machine.reset();
        assert_ne!(machine.id(), old_id);
        assert_eq!(machine.next_deadline(), None);
        assert!(!machine.poll(start + Duration::seconds(5)));
        assert_eq!(machine.state(), AttemptState::Idle);
        assert_eq!(machine.selection(), None);
    }

    #[test]
    fn invalid_input_keeps_machine_retryable() {
        let mut machine = auto_machine();
        assert_eq!(machine.record_invalid_input(), Ok(machine.id()));
        assert_eq!(machine.state(), AttemptState::Idle);
        assert_eq!(machine.next_deadline(), None);
        assert!(!machine.is_pending());

        machine.select(3).unwrap();
        machine.record_invalid_input().unwrap();
        assert_eq!(machine.state(), AttemptState::Selected);
        assert!(machine.verify(equals(3), fixed_now()).unwrap().correct);
        assert_eq!(
            machine.record_invalid_input(),
            Err(AttemptError::AlreadySolved)
        );
    }

    #[test]
    fn cancel_retry_leaves_attempt_pending() {
        let mut machine = auto_machine();
        machine.select(1).unwrap();
        machine.verify(equals(2), fixed_now()).unwrap();
        assert!(machine.cancel_retry().is_some());
        assert!(!machine.poll(fixed_now() + Duration::seconds(5)));
        assert!(machine.is_pending());
    }
}
