use mathplay_core::verify::{self, FieldAnswer, InvalidInput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Known-correct answer of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKey {
    /// Text compared ignoring case and surrounding whitespace.
    Exact { value: String },
    /// Number compared within a tolerance; the exercise tolerance applies when unset.
    Numeric {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<f64>,
    },
    /// Several independent fields; `"N/A"` marks a field that must stay empty.
    Fields { values: Vec<FieldAnswer> },
    /// Sparse value → count table, as read from a line plot.
    Counts {
        #[serde(deserialize_with = "count_table::deserialize")]
        counts: BTreeMap<i64, u32>,
    },
}

/// JSON object keys are strings; tagged enums buffer their content, so integer keys
/// have to be parsed by hand.
mod count_table {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use std::collections::BTreeMap;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<i64, u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, u32>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, count)| {
                key.trim()
                    .parse::<i64>()
                    .map(|value| (value, count))
                    .map_err(|_| D::Error::custom(format!("count key `{key}` is not an integer")))
            })
            .collect()
    }
}

/// A learner's answer, shaped like the answer key it is checked against.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Text(String),
    Number(f64),
    Fields(Vec<Option<String>>),
    Counts(BTreeMap<i64, u32>),
}

impl AnswerKey {
    /// Whether `response` answers this key. Mismatched shapes are never correct.
    #[must_use]
    pub fn accepts(&self, response: &Response, default_tolerance: f64) -> bool {
        match (self, response) {
            (Self::Exact { value }, Response::Text(given)) => verify::exact_text(value, given),
            (Self::Numeric { value, tolerance }, Response::Number(given)) => {
                verify::within_tolerance(*value, *given, tolerance.unwrap_or(default_tolerance))
            }
            (Self::Fields { values }, Response::Fields(given)) => {
                verify::fields_match(values, given)
            }
            (Self::Counts { counts }, Response::Counts(given)) => {
                verify::counts_match(counts, given)
            }
            _ => false,
        }
    }

    /// Turns typed text into a response of the matching shape.
    ///
    /// - exact: the trimmed text
    /// - numeric: a number, `,` accepted as decimal separator
    /// - fields: comma separated values, blanks allowed (`"marzo, "`)
    /// - counts: whitespace or comma separated `value:count` pairs or bare values, each bare
    ///   value counting once (`"3 3 4"` equals `"3:2 4:1"`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the text is blank or cannot be read in that shape.
    pub fn parse_response(&self, raw: &str) -> Result<Response, InvalidInput> {
        let trimmed = raw.trim();
        match self {
            Self::Exact { .. } => {
                if trimmed.is_empty() {
                    Err(InvalidInput::Empty)
                } else {
                    Ok(Response::Text(trimmed.to_string()))
                }
            }
            Self::Numeric { .. } => verify::parse_number(trimmed).map(Response::Number),
            Self::Fields { values } => parse_fields(trimmed, values.len()).map(Response::Fields),
            Self::Counts { .. } => parse_counts(trimmed).map(Response::Counts),
        }
    }
}

fn parse_fields(raw: &str, expected_len: usize) -> Result<Vec<Option<String>>, InvalidInput> {
    if raw.is_empty() && expected_len > 0 {
        return Err(InvalidInput::Empty);
    }
    let fields: Vec<Option<String>> = raw
        .split(',')
        .map(str::trim)
        .map(|part| (!part.is_empty()).then(|| part.to_string()))
        .collect();
    if fields.len() > expected_len {
        return Err(InvalidInput::Malformed {
            raw: raw.to_string(),
        });
    }
    Ok(fields)
}

fn parse_counts(raw: &str) -> Result<BTreeMap<i64, u32>, InvalidInput> {
    if raw.is_empty() {
        return Err(InvalidInput::Empty);
    }
    let malformed = || InvalidInput::Malformed {
        raw: raw.to_string(),
    };
    let mut counts = BTreeMap::new();
    for token in raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
    {
        let (value, count) = match token.split_once(':') {
            Some((value, count)) => (value, count.parse::<u32>().map_err(|_| malformed())?),
            None => (token, 1),
        };
        let value = value.parse::<i64>().map_err(|_| malformed())?;
        let entry: &mut u32 = counts.entry(value).or_default();
        *entry = entry.checked_add(count).ok_or_else(malformed)?;
    }
    Ok(counts)
}

//
// ─── SCENARIO ──────────────────────────────────────────────────────────────────
//

/// One static problem instance from a content table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub prompt: String,
    pub answer: AnswerKey,
    /// Labels for option-button exercises; empty for typed answers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl Scenario {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: AnswerKey) -> Self {
        Self {
            prompt: prompt.into(),
            answer,
            choices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn is_correct(&self, response: &Response, default_tolerance: f64) -> bool {
        self.answer.accepts(response, default_tolerance)
    }
}
