use chrono::{DateTime, Duration, Utc};

/// Source of "now" for verification stamps and retry deadlines.
///
/// Exercises never call `Utc::now()` themselves. A pinned clock lets a test stand just
/// before a retry deadline and then step across it.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Pinned(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Clock frozen at `at` until [`Clock::advance`] moves it.
    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self::Pinned(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Pinned(at) => *at,
        }
    }

    /// Steps a pinned clock forward; the system clock moves on its own.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Pinned(at) = self {
            *at += delta;
        }
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self, Clock::Pinned(_))
    }

    /// How long a host should sleep before `deadline` is due. Zero once it has passed.
    #[must_use]
    pub fn wait_until(&self, deadline: DateTime<Utc>) -> std::time::Duration {
        (deadline - self.now()).to_std().unwrap_or_default()
    }
}

/// 2023-11-14T22:13:20Z, the instant every pinned test clock starts from.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0).unwrap_or_default()
}

/// Clock pinned at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::pinned(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_clock_steps_across_a_deadline() {
        let mut clock = fixed_clock();
        let deadline = clock.now() + Duration::milliseconds(1500);
        assert_eq!(clock.wait_until(deadline), std::time::Duration::from_millis(1500));

        clock.advance(Duration::milliseconds(1499));
        assert_eq!(clock.wait_until(deadline), std::time::Duration::from_millis(1));

        clock.advance(Duration::milliseconds(250));
        assert_eq!(clock.wait_until(deadline), std::time::Duration::ZERO);
        assert!(clock.is_pinned());
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::system();
        clock.advance(Duration::days(365));
        assert!(clock.now() < fixed_now() + Duration::days(365 * 100));
        assert!(!clock.is_pinned());
    }
}
