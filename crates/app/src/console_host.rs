use mathplay_core::model::{ExerciseId, Feedback, FeedbackKind};
use services::{HostSurface, KeypadLayout, RecordingHost, ScaffoldProgress};
use tracing::debug;

/// Terminal scaffold: prints feedback banners and keeps the counters of a
/// [`RecordingHost`].
#[derive(Debug)]
pub struct ConsoleHost {
    inner: RecordingHost,
    echo: bool,
}

impl ConsoleHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RecordingHost::new(),
            echo: true,
        }
    }

    /// Host that prints nothing.
    #[cfg(test)]
    #[must_use]
    pub fn silent() -> Self {
        Self {
            inner: RecordingHost::new(),
            echo: false,
        }
    }

    pub fn advance(&self) -> u64 {
        self.inner.advance()
    }

    #[must_use]
    pub fn signal(&self) -> Option<u64> {
        self.inner.signal()
    }

    #[must_use]
    pub fn progress(&self) -> ScaffoldProgress {
        self.inner.progress()
    }

    #[must_use]
    pub fn custom_content(&self) -> Option<KeypadLayout> {
        self.inner.custom_content()
    }

    #[must_use]
    pub fn keypad_owner(&self) -> Option<ExerciseId> {
        self.inner.keypad_owner()
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

fn banner(feedback: &Feedback) -> String {
    let mark = match feedback.kind {
        FeedbackKind::Correct => "✔",
        FeedbackKind::Incorrect => "✘",
        FeedbackKind::Congrats => "★",
    };
    format!("{mark} {}", feedback.message)
}

impl HostSurface for ConsoleHost {
    fn show_feedback(&self, feedback: Option<Feedback>) {
        if self.echo {
            if let Some(feedback) = &feedback {
                println!("{}", banner(feedback));
            }
        }
        self.inner.show_feedback(feedback);
    }

    fn on_attempt(&self, correct: bool) {
        self.inner.on_attempt(correct);
        debug!(correct, progress = ?self.inner.progress(), "attempt reported");
    }

    fn register_keypad_handler(&self, owner: Option<ExerciseId>) {
        debug!(?owner, "keypad handler");
        self.inner.register_keypad_handler(owner);
    }

    fn set_custom_keypad_content(&self, layout: Option<KeypadLayout>) {
        self.inner.set_custom_keypad_content(layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_marks_feedback_kind() {
        assert_eq!(banner(&Feedback::correct("bien")), "✔ bien");
        assert_eq!(banner(&Feedback::incorrect("no")), "✘ no");
        assert_eq!(banner(&Feedback::congrats("fin")), "★ fin");
    }

    #[test]
    fn delegates_counters() {
        let host = ConsoleHost::silent();
        host.on_attempt(true);
        host.advance();
        assert_eq!(host.progress().stars, 1);
        assert_eq!(host.signal(), Some(1));
    }
}
