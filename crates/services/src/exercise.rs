use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use mathplay_core::model::{ExerciseId, ExerciseSettings, FeedbackMessages};
use mathplay_core::{
    AttemptError, AttemptMachine, AttemptState, ChallengePool, Clock, Draw, InvalidInput,
    Verdict, Verifier,
};

use crate::bridge::AdvanceSignalBridge;
use crate::error::ExerciseError;
use crate::host::HostSurface;
use crate::input::{InputBuffer, InputMode, InputRegistration, KeyToken, KeypadLayout};

type Parser<C, S> = Box<dyn Fn(&C, &str) -> Result<S, InvalidInput>>;
type Labels<C> = Box<dyn Fn(&C) -> Vec<String>>;
type Pick<C, S> = Box<dyn Fn(&C, usize) -> Option<S>>;

/// Result of a typed submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The text parsed and was checked.
    Verified(Verdict),
    /// The text could not be read; counted as a failed attempt.
    Invalid(InvalidInput),
}

impl Submission {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Verified(verdict) if verdict.correct)
    }
}

/// What a keypad key did.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Edited,
    Ignored,
    Submitted(Submission),
}

/// One exercise on screen: a pool of challenges, the attempt on the current one and the
/// host it reports to.
///
/// The host drives it with `update` (advance signal), answer events (`select`/`verify`,
/// `submit_text`, `on_key`, `choose`) and `tick` for retry deadlines. Input channels
/// claimed from the host are released on `unmount` or drop.
pub struct ExerciseContent<C, S, R = StdRng> {
    id: ExerciseId,
    settings: ExerciseSettings,
    messages: FeedbackMessages,
    host: Rc<dyn HostSurface>,
    clock: Clock,
    pool: ChallengePool<C, R>,
    attempt: AttemptMachine<S>,
    bridge: AdvanceSignalBridge,
    verifier: Box<dyn Verifier<C, S>>,
    mode: InputMode,
    parser: Option<Parser<C, S>>,
    labels: Option<Labels<C>>,
    pick: Option<Pick<C, S>>,
    buffer: InputBuffer,
    registration: Option<InputRegistration>,
    current: Option<C>,
    last_submission: Option<String>,
    completion_reported: bool,
    mounted: bool,
}

impl<C, S, R> ExerciseContent<C, S, R>
where
    C: Clone + 'static,
    S: 'static,
    R: Rng,
{
    #[must_use]
    pub fn new(
        id: ExerciseId,
        host: Rc<dyn HostSurface>,
        verifier: impl Verifier<C, S> + 'static,
        rng: R,
    ) -> Self {
        let settings = ExerciseSettings::default();
        Self {
            id,
            attempt: AttemptMachine::new(settings.retry()),
            buffer: InputBuffer::new(settings.max_input_len()),
            settings,
            messages: FeedbackMessages::default(),
            host,
            clock: Clock::default(),
            pool: ChallengePool::new(Vec::new(), rng),
            bridge: AdvanceSignalBridge::new(),
            verifier: Box::new(verifier),
            mode: InputMode::Text,
            parser: None,
            labels: None,
            pick: None,
            registration: None,
            current: None,
            last_submission: None,
            completion_reported: false,
            mounted: false,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ExerciseSettings) -> Self {
        self.attempt = AttemptMachine::new(settings.retry());
        self.buffer = InputBuffer::new(settings.max_input_len());
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: FeedbackMessages) -> Self {
        self.messages = messages;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Answers are typed in the exercise body and read with `parser`.
    #[must_use]
    pub fn with_text_input(
        mut self,
        parser: impl Fn(&C, &str) -> Result<S, InvalidInput> + 'static,
    ) -> Self {
        self.mode = InputMode::Text;
        self.parser = Some(Box::new(parser));
        self
    }

    /// Claims the host keypad while mounted; the buffer is read with `parser` on `check`.
    #[must_use]
    pub fn with_keypad(
        mut self,
        parser: impl Fn(&C, &str) -> Result<S, InvalidInput> + 'static,
    ) -> Self {
        self.mode = InputMode::Keypad;
        self.parser = Some(Box::new(parser));
        self
    }

    /// Places one button per label in the keypad area; `pick` turns a pressed index into
    /// a selection.
    #[must_use]
    pub fn with_options(
        mut self,
        labels: impl Fn(&C) -> Vec<String> + 'static,
        pick: impl Fn(&C, usize) -> Option<S> + 'static,
    ) -> Self {
        self.mode = InputMode::Options;
        self.labels = Some(Box::new(labels));
        self.pick = Some(Box::new(pick));
        self
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────────
    //

    /// Loads `source`, claims input from the host and shows the first challenge.
    ///
    /// `signal` is taken as the advance baseline; it never triggers a draw by itself.
    pub fn mount(&mut self, source: Vec<C>, signal: Option<u64>) {
        if self.mounted {
            self.unmount();
        }
        debug!(exercise = %self.id, challenges = source.len(), "mounting exercise");
        self.pool.initialize(source);
        self.completion_reported = false;
        self.bridge = AdvanceSignalBridge::new();
        self.bridge.observe(signal);
        self.mounted = true;
        if self.mode == InputMode::Keypad {
            self.registration = Some(InputRegistration::keypad(
                Rc::clone(&self.host),
                self.id.clone(),
            ));
        }
        self.draw_next();
    }

    /// Swaps in another exercise's content. Does nothing when `id` is already loaded.
    ///
    /// `signal` becomes the new advance baseline, so a host may restart its counter for
    /// the new exercise. Returns `true` if the pool was re-initialized.
    pub fn load(&mut self, id: ExerciseId, source: Vec<C>, signal: Option<u64>) -> bool {
        if id == self.id {
            return false;
        }
        info!(from = %self.id, to = %id, "switching exercise");
        self.id = id;
        self.pool.initialize(source);
        self.completion_reported = false;
        self.bridge = AdvanceSignalBridge::new();
        self.bridge.observe(signal);
        if self.mounted {
            if self.mode == InputMode::Keypad {
                self.registration = None;
                self.registration = Some(InputRegistration::keypad(
                    Rc::clone(&self.host),
                    self.id.clone(),
                ));
            }
            self.draw_next();
        }
        true
    }

    /// Feeds the host's advance signal. Returns `true` if a new challenge was drawn.
    pub fn update(&mut self, signal: Option<u64>) -> bool {
        if !self.mounted {
            return false;
        }
        if self.bridge.observe(signal) {
            self.draw_next();
            true
        } else {
            false
        }
    }

    /// Starts a fresh attempt on the next challenge from the pool.
    ///
    /// When the pool has nothing to offer the host gets one `on_attempt(true)` and the
    /// congratulations banner.
    pub fn draw_next(&mut self) -> Option<&C> {
        self.attempt.reset();
        self.buffer.clear();
        self.last_submission = None;
        self.host.show_feedback(None);

        let refills = self.pool.refills();
        match self.pool.draw() {
            Draw::Challenge(challenge) => {
                if self.pool.refills() > refills {
                    info!(exercise = %self.id, pass = self.pool.refills(), "pool refilled");
                }
                info!(
                    exercise = %self.id,
                    attempt = %self.attempt.id(),
                    remaining = self.pool.remaining(),
                    "challenge drawn"
                );
                self.current = Some(challenge);
            }
            Draw::Exhausted => {
                self.current = None;
                if !self.completion_reported {
                    info!(exercise = %self.id, "no challenges left");
                    self.completion_reported = true;
                    self.host.on_attempt(true);
                }
                self.host.show_feedback(Some(self.messages.completed()));
            }
        }
        self.refresh_options();
        self.current.as_ref()
    }

    /// Releases host input and disarms the retry timer.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        debug!(exercise = %self.id, "unmounting exercise");
        self.registration = None;
        self.attempt.cancel_retry();
        self.mounted = false;
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────────
    //

    /// Records the learner's answer without checking it and clears the banner.
    ///
    /// # Errors
    ///
    /// `NoChallenge` without a challenge on screen, `AlreadySolved` once it was solved.
    pub fn select(&mut self, selection: S) -> Result<(), ExerciseError> {
        if self.current.is_none() {
            return Err(ExerciseError::NoChallenge);
        }
        self.attempt
            .select(selection)
            .inspect_err(|err| debug!(exercise = %self.id, %err, "selection rejected"))?;
        self.host.show_feedback(None);
        Ok(())
    }

    /// Checks the current selection and reports the attempt to the host.
    ///
    /// # Errors
    ///
    /// `NoChallenge` without a challenge on screen, otherwise the attempt guards
    /// (`NoSelection`, `Pending`, `AlreadySolved`). Rejected calls report nothing.
    pub fn verify(&mut self) -> Result<Verdict, ExerciseError> {
        let challenge = self.current.as_ref().ok_or(ExerciseError::NoChallenge)?;
        let verifier = &self.verifier;
        let verdict = self
            .attempt
            .verify(
                |selection| verifier.is_correct(challenge, selection),
                self.clock.now(),
            )
            .inspect_err(|err| debug!(exercise = %self.id, %err, "verify rejected"))?;

        debug!(
            exercise = %self.id,
            attempt = %verdict.attempt,
            correct = verdict.correct,
            retry_at = ?verdict.retry_at,
            "attempt verified"
        );
        self.host.on_attempt(verdict.correct);
        self.host
            .show_feedback(Some(self.messages.for_verdict(verdict.correct)));
        Ok(verdict)
    }

    /// Parses typed text, then selects and verifies it.
    ///
    /// Unreadable text counts as a failed attempt with the invalid-input banner and
    /// leaves the attempt open, also right after a wrong answer. Sending the same text
    /// again while the wrong answer is still shown is rejected as `Pending`.
    ///
    /// # Errors
    ///
    /// `TextInputUnsupported` for option exercises, plus the errors of `select` and
    /// `verify`.
    pub fn submit_text(&mut self, raw: &str) -> Result<Submission, ExerciseError> {
        let parser = self
            .parser
            .as_ref()
            .ok_or(ExerciseError::TextInputUnsupported)?;
        let challenge = self.current.as_ref().ok_or(ExerciseError::NoChallenge)?;
        let parsed = parser(challenge, raw);
        self.guard_resubmission(raw)?;

        match parsed {
            Ok(selection) => {
                self.select(selection)?;
                let verdict = self.verify()?;
                self.last_submission = Some(raw.to_string());
                Ok(Submission::Verified(verdict))
            }
            Err(invalid) => {
                let attempt = self
                    .attempt
                    .resume()
                    .and_then(|()| self.attempt.record_invalid_input())
                    .inspect_err(|err| debug!(exercise = %self.id, %err, "input rejected"))?;
                self.last_submission = None;
                debug!(exercise = %self.id, %attempt, %invalid, "invalid answer input");
                self.host.on_attempt(false);
                self.host.show_feedback(Some(self.messages.invalid_input()));
                Ok(Submission::Invalid(invalid))
            }
        }
    }

    /// Handles a key token from the host keypad.
    ///
    /// Editing keys change the buffer and reopen a wrong attempt; `check` submits the
    /// buffer.
    ///
    /// # Errors
    ///
    /// `KeypadUnavailable` unless the exercise owns the keypad, `AlreadySolved` for
    /// edits after a correct answer, `NoSelection` for `check` with nothing typed, plus
    /// the errors of `submit_text` for `check`.
    pub fn on_key(&mut self, key: KeyToken) -> Result<KeyOutcome, ExerciseError> {
        if self.mode != InputMode::Keypad || self.registration.is_none() {
            return Err(ExerciseError::KeypadUnavailable);
        }
        if key == KeyToken::Check {
            if self.buffer.is_empty() {
                debug!(exercise = %self.id, "check pressed with nothing typed");
                return Err(AttemptError::NoSelection.into());
            }
            let raw = self.buffer.as_str().to_string();
            return self.submit_text(&raw).map(KeyOutcome::Submitted);
        }
        if self.attempt.is_solved() {
            return Err(AttemptError::AlreadySolved.into());
        }
        if !self.buffer.apply(key) {
            return Ok(KeyOutcome::Ignored);
        }
        if self.attempt.is_pending() {
            self.attempt.resume()?;
            self.host.show_feedback(None);
        }
        Ok(KeyOutcome::Edited)
    }

    /// Parses and handles a raw host key string such as `"7"` or `"check"`.
    ///
    /// # Errors
    ///
    /// `Key` for unknown tokens, otherwise as [`Self::on_key`].
    pub fn press(&mut self, raw: &str) -> Result<KeyOutcome, ExerciseError> {
        let key = raw.parse::<KeyToken>()?;
        self.on_key(key)
    }

    /// Handles an option button press: selects the option and verifies it.
    ///
    /// # Errors
    ///
    /// `OptionsUnsupported` without option buttons, `UnknownChoice` for an index with no
    /// option, `Pending` when the shown wrong option is pressed again, plus the errors
    /// of `select` and `verify`.
    pub fn choose(&mut self, index: usize) -> Result<Verdict, ExerciseError> {
        let pick = self.pick.as_ref().ok_or(ExerciseError::OptionsUnsupported)?;
        let challenge = self.current.as_ref().ok_or(ExerciseError::NoChallenge)?;
        let selection = pick(challenge, index).ok_or(ExerciseError::UnknownChoice(index))?;
        let key = index.to_string();
        self.guard_resubmission(&key)?;
        self.select(selection)?;
        let verdict = self.verify()?;
        self.last_submission = Some(key);
        Ok(verdict)
    }

    /// Fires the retry timer when `now` has reached it. Returns `true` if the attempt
    /// reopened.
    ///
    /// The failure banner stays up until the learner's next selection.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.attempt.poll(now) {
            return false;
        }
        debug!(exercise = %self.id, attempt = %self.attempt.id(), "retry window elapsed");
        self.last_submission = None;
        true
    }

    /// [`Self::tick`] with the exercise clock.
    pub fn tick_now(&mut self) -> bool {
        let now = self.clock.now();
        self.tick(now)
    }

    fn guard_resubmission(&self, key: &str) -> Result<(), ExerciseError> {
        if self.attempt.is_pending() && self.last_submission.as_deref() == Some(key) {
            debug!(exercise = %self.id, "same answer resubmitted while pending");
            return Err(AttemptError::Pending.into());
        }
        Ok(())
    }

    fn refresh_options(&mut self) {
        let Some(labels) = self.labels.as_ref() else {
            return;
        };
        if !self.mounted {
            return;
        }
        let layout = KeypadLayout::new(
            self.current
                .as_ref()
                .map(|challenge| labels(challenge))
                .unwrap_or_default(),
        );
        if let Some(registration) = &self.registration {
            registration.replace_layout(layout);
            return;
        }
        self.registration = Some(InputRegistration::custom_content(
            Rc::clone(&self.host),
            layout,
        ));
    }
}

impl<C, S, R> ExerciseContent<C, S, R> {
    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn settings(&self) -> &ExerciseSettings {
        &self.settings
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&C> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn attempt(&self) -> &AttemptMachine<S> {
        &self.attempt
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.attempt.state()
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// Keypad text typed so far.
    #[must_use]
    pub fn input_text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Next retry deadline the host should wake up for.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.attempt.next_deadline()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pool.remaining()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The pool had nothing left to show.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current.is_none() && self.completion_reported
    }
}

impl<C: fmt::Debug, S: fmt::Debug, R> fmt::Debug for ExerciseContent<C, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseContent")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("attempt", &self.attempt)
            .field("bridge", &self.bridge)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}
