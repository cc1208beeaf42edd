use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("retry delay must be > 0 ms")]
    InvalidRetryDelay,

    #[error("retry delay of {0} ms is out of range")]
    RetryDelayOutOfRange(u64),

    #[error("tolerance must be a finite value >= 0")]
    InvalidTolerance,

    #[error("max input length must be > 0")]
    InvalidMaxInputLen,
}

//
// ─── RETRY POLICY ──────────────────────────────────────────────────────────────
//

/// How an exercise lets the learner try again after a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// The attempt reopens by itself once the delay has elapsed.
    AutoReset { delay_ms: u64 },
    /// The attempt stays pending until the learner changes their answer.
    ManualReselect,
}

impl RetryPolicy {
    pub const DEFAULT_DELAY_MS: u64 = 1500;

    #[must_use]
    pub fn auto_reset(delay_ms: u64) -> Self {
        Self::AutoReset { delay_ms }
    }

    /// Delay before an incorrect attempt reopens, if the policy uses a timer.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::AutoReset { delay_ms } => i64::try_from(*delay_ms)
                .ok()
                .and_then(Duration::try_milliseconds),
            Self::ManualReselect => None,
        }
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if let Self::AutoReset { delay_ms } = self {
            if delay_ms == 0 {
                return Err(SettingsError::InvalidRetryDelay);
            }
            if self.delay().is_none() {
                return Err(SettingsError::RetryDelayOutOfRange(delay_ms));
            }
        }
        Ok(self)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::auto_reset(Self::DEFAULT_DELAY_MS)
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Per-exercise configuration of the attempt lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SettingsRecord", into = "SettingsRecord")]
pub struct ExerciseSettings {
    retry: RetryPolicy,
    tolerance: f64,
    max_input_len: usize,
}

impl Default for ExerciseSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            tolerance: Self::DEFAULT_TOLERANCE,
            max_input_len: Self::DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl ExerciseSettings {
    pub const DEFAULT_TOLERANCE: f64 = 0.01;
    pub const DEFAULT_MAX_INPUT_LEN: usize = 8;

    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when the delay is zero, the tolerance is negative or not
    /// finite, or the input length is zero.
    pub fn new(
        retry: RetryPolicy,
        tolerance: f64,
        max_input_len: usize,
    ) -> Result<Self, SettingsError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(SettingsError::InvalidTolerance);
        }
        if max_input_len == 0 {
            return Err(SettingsError::InvalidMaxInputLen);
        }
        Ok(Self {
            retry: retry.validate()?,
            tolerance,
            max_input_len,
        })
    }

    /// Default settings with a different retry policy.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidRetryDelay` for a zero auto-reset delay.
    pub fn with_retry(retry: RetryPolicy) -> Result<Self, SettingsError> {
        Self::new(retry, Self::DEFAULT_TOLERANCE, Self::DEFAULT_MAX_INPUT_LEN)
    }

    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }
}

/// Wire shape of `ExerciseSettings`; every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SettingsRecord {
    retry: RetryPolicy,
    tolerance: f64,
    max_input_len: usize,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        ExerciseSettings::default().into()
    }
}

impl From<ExerciseSettings> for SettingsRecord {
    fn from(settings: ExerciseSettings) -> Self {
        Self {
            retry: settings.retry,
            tolerance: settings.tolerance,
            max_input_len: settings.max_input_len,
        }
    }
}

impl TryFrom<SettingsRecord> for ExerciseSettings {
    type Error = SettingsError;

    fn try_from(record: SettingsRecord) -> Result<Self, Self::Error> {
        Self::new(record.retry, record.tolerance, record.max_input_len)
    }
}
