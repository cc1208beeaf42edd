use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an exercise (e.g. `"suma-hasta-20"`).
///
/// The identity of an exercise decides when its challenge pool is rebuilt: loading a
/// different id re-initializes the pool, loading the same id keeps it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// Creates a new `ExerciseId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Generation counter of the in-flight attempt.
///
/// Every drawn challenge gets a fresh attempt id; retry timers remember the id they were
/// armed for so a timer outliving its challenge can be recognized and dropped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttemptId(u64);

impl AttemptId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id of the attempt that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseId({})", self.0)
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_ids_step_forward() {
        let first = AttemptId::default();
        assert_eq!(first.value(), 0);
        assert_eq!(first.next(), AttemptId::new(1));
        assert_eq!(format!("{:?}", first.next()), "AttemptId(1)");
    }

    #[test]
    fn exercise_id_serializes_as_plain_string() {
        let id = ExerciseId::new("decimales");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"decimales\"");
        let back: ExerciseId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "decimales");
    }
}
