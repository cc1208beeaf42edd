//! Answer checks shared by the exercises.
//!
//! Each exercise decides what "correct" means for its own challenge shape. The functions
//! here cover the recurring cases: exact matches, numeric answers within a tolerance,
//! several independent fields that must all match, and sparse count tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Slack added to tolerance comparisons so a difference of exactly the tolerance is
/// accepted despite binary floating point error.
const FLOAT_SLACK: f64 = 1e-9;

/// Label used by select boxes for "nothing applies here".
pub const NOT_APPLICABLE_LABEL: &str = "N/A";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Raw learner input that cannot be turned into an answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidInput {
    #[error("no answer was entered")]
    Empty,
    #[error("`{raw}` is not a number")]
    NotANumber { raw: String },
    #[error("`{raw}` is not a valid answer")]
    Malformed { raw: String },
}

//
// ─── VERIFIER ──────────────────────────────────────────────────────────────────
//

/// Decides whether a selection answers a challenge.
pub trait Verifier<C, S> {
    fn is_correct(&self, challenge: &C, selection: &S) -> bool;
}

impl<C, S, F> Verifier<C, S> for F
where
    F: Fn(&C, &S) -> bool,
{
    fn is_correct(&self, challenge: &C, selection: &S) -> bool {
        self(challenge, selection)
    }
}

//
// ─── PREDICATES ────────────────────────────────────────────────────────────────
//

#[must_use]
pub fn exact<T: PartialEq + ?Sized>(expected: &T, given: &T) -> bool {
    expected == given
}

/// Text comparison ignoring surrounding whitespace and letter case.
#[must_use]
pub fn exact_text(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

/// `|expected - submitted| <= tolerance`.
#[must_use]
pub fn within_tolerance(expected: f64, submitted: f64, tolerance: f64) -> bool {
    if !expected.is_finite() || !submitted.is_finite() {
        return false;
    }
    (expected - submitted).abs() <= tolerance + FLOAT_SLACK
}

/// Expected value of one field in a multi-field answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldAnswer {
    Expected(String),
    /// No value is expected; an empty field is accepted.
    NotApplicable,
}

impl FieldAnswer {
    #[must_use]
    pub fn expected(value: impl Into<String>) -> Self {
        Self::Expected(value.into())
    }

    /// Whether a single field value satisfies this expectation.
    #[must_use]
    pub fn accepts(&self, given: Option<&str>) -> bool {
        let given = given.map(str::trim).filter(|value| !value.is_empty());
        match (self, given) {
            (Self::Expected(value), Some(given)) => exact_text(value, given),
            (Self::Expected(_), None) => false,
            (Self::NotApplicable, None) => true,
            (Self::NotApplicable, Some(given)) => given == NOT_APPLICABLE_LABEL,
        }
    }
}

impl From<String> for FieldAnswer {
    fn from(value: String) -> Self {
        if value.trim() == NOT_APPLICABLE_LABEL {
            Self::NotApplicable
        } else {
            Self::Expected(value)
        }
    }
}

impl From<FieldAnswer> for String {
    fn from(value: FieldAnswer) -> Self {
        match value {
            FieldAnswer::Expected(value) => value,
            FieldAnswer::NotApplicable => NOT_APPLICABLE_LABEL.to_string(),
        }
    }
}

/// Every field must be accepted. Given fields beyond the expected ones must be empty.
#[must_use]
pub fn fields_match(expected: &[FieldAnswer], given: &[Option<String>]) -> bool {
    let all_expected = expected
        .iter()
        .enumerate()
        .all(|(i, field)| field.accepts(given.get(i).and_then(Option::as_deref)));
    let no_extra = given
        .iter()
        .skip(expected.len())
        .all(|value| value.as_deref().is_none_or(|v| v.trim().is_empty()));
    all_expected && no_extra
}

/// Equality of sparse value → count tables, with absent keys counting as zero.
#[must_use]
pub fn counts_match(expected: &BTreeMap<i64, u32>, given: &BTreeMap<i64, u32>) -> bool {
    expected
        .keys()
        .chain(given.keys())
        .all(|key| expected.get(key).copied().unwrap_or(0) == given.get(key).copied().unwrap_or(0))
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// Parses a typed number. Accepts `,` as the decimal separator.
///
/// # Errors
///
/// Returns `InvalidInput::Empty` for blank input and `InvalidInput::NotANumber` for
/// anything that is not a finite number.
pub fn parse_number(raw: &str) -> Result<f64, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::Empty);
    }
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidInput::NotANumber {
            raw: trimmed.to_string(),
        }),
    }
}
