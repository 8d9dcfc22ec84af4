//! Answer values and their presence rules.
//!
//! Answers arrive from the wire as loosely shaped JSON (a scalar, an array,
//! or an object with an `other_text` rider). They are normalized once, at
//! the boundary, into [`AnswerValue`] variants keyed by the question kind;
//! everything past the boundary works on the typed variant and never probes
//! raw shapes again.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::form::QuestionKind;

/// A wire scalar: option tokens and rating values arrive as JSON numbers or
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Only the empty string counts as empty; 0 is a legitimate token.
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.is_empty())
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Scalar::Int(n) => JsonValue::from(*n),
            Scalar::Text(text) => JsonValue::String(text.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

/// One answer cell, tagged by the kind of question it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Rating(Scalar),
    Choice {
        value: Scalar,
        other_text: Option<String>,
    },
    MultipleChoice {
        values: Vec<Scalar>,
        other_text: Option<String>,
    },
    OpenText(String),
}

impl AnswerValue {
    /// Presence: the answer counts toward group completeness.
    pub fn is_present(&self) -> bool {
        match self {
            AnswerValue::Rating(scalar) => !scalar.is_empty(),
            AnswerValue::Choice { value, .. } => !value.is_empty(),
            AnswerValue::MultipleChoice { values, .. } => !values.is_empty(),
            AnswerValue::OpenText(text) => !text.trim().is_empty(),
        }
    }

    /// Normalizes a raw wire value under a question kind. Nulls and shape
    /// mismatches return `None`; callers drop those at the boundary.
    pub fn from_raw(kind: QuestionKind, raw: &JsonValue) -> Option<Self> {
        match kind {
            // Unknown kinds fall back to the rating rule
            QuestionKind::Rating | QuestionKind::Unknown => match raw {
                JsonValue::Object(map) => scalar_from(map.get("value")?).map(AnswerValue::Rating),
                other => scalar_from(other).map(AnswerValue::Rating),
            },
            QuestionKind::Choice => match raw {
                JsonValue::Object(map) => {
                    let value = scalar_from(map.get("value")?)?;
                    Some(AnswerValue::Choice {
                        value,
                        other_text: other_text_from(map),
                    })
                }
                other => scalar_from(other).map(|value| AnswerValue::Choice {
                    value,
                    other_text: None,
                }),
            },
            QuestionKind::MultipleChoice => match raw {
                JsonValue::Array(items) => Some(AnswerValue::MultipleChoice {
                    values: scalars_from(items)?,
                    other_text: None,
                }),
                JsonValue::Object(map) => {
                    let JsonValue::Array(items) = map.get("value")? else {
                        return None;
                    };
                    Some(AnswerValue::MultipleChoice {
                        values: scalars_from(items)?,
                        other_text: other_text_from(map),
                    })
                }
                _ => None,
            },
            QuestionKind::OpenText => raw
                .as_str()
                .map(|text| AnswerValue::OpenText(text.to_string())),
        }
    }

    /// The submission-side value: scalar for rating/choice, array for
    /// multiple choice, string for open text. `other_text` travels
    /// separately, see [`AnswerValue::other_text`].
    pub fn wire_value(&self) -> JsonValue {
        match self {
            AnswerValue::Rating(scalar) => scalar.to_json(),
            AnswerValue::Choice { value, .. } => value.to_json(),
            AnswerValue::MultipleChoice { values, .. } => {
                JsonValue::Array(values.iter().map(Scalar::to_json).collect())
            }
            AnswerValue::OpenText(text) => JsonValue::String(text.clone()),
        }
    }

    pub fn other_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Choice { other_text, .. }
            | AnswerValue::MultipleChoice { other_text, .. } => other_text.as_deref(),
            _ => None,
        }
    }
}

fn scalar_from(value: &JsonValue) -> Option<Scalar> {
    match value {
        JsonValue::Number(n) => n.as_i64().map(Scalar::Int),
        JsonValue::String(s) => Some(Scalar::Text(s.clone())),
        _ => None,
    }
}

fn scalars_from(items: &[JsonValue]) -> Option<Vec<Scalar>> {
    items.iter().map(scalar_from).collect()
}

fn other_text_from(map: &serde_json::Map<String, JsonValue>) -> Option<String> {
    map.get("other_text")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rating_presence() {
        assert!(AnswerValue::Rating(Scalar::Int(3)).is_present());
        assert!(AnswerValue::Rating(Scalar::Text("3".into())).is_present());
        assert!(!AnswerValue::Rating(Scalar::Text("".into())).is_present());
    }

    #[test]
    fn test_choice_presence() {
        let present = AnswerValue::Choice {
            value: Scalar::Text("2".into()),
            other_text: Some("foo".into()),
        };
        assert!(present.is_present());

        // Other-text alone does not make the answer present
        let absent = AnswerValue::Choice {
            value: Scalar::Text("".into()),
            other_text: Some("foo".into()),
        };
        assert!(!absent.is_present());
    }

    #[test]
    fn test_multiple_choice_presence() {
        let absent = AnswerValue::MultipleChoice {
            values: vec![],
            other_text: None,
        };
        assert!(!absent.is_present());

        let present = AnswerValue::MultipleChoice {
            values: vec![Scalar::Text("a".into()), Scalar::Text("b".into())],
            other_text: None,
        };
        assert!(present.is_present());

        let with_other = AnswerValue::MultipleChoice {
            values: vec![Scalar::Text("a".into())],
            other_text: Some("x".into()),
        };
        assert!(with_other.is_present());
    }

    #[test]
    fn test_open_text_presence() {
        assert!(!AnswerValue::OpenText("   ".into()).is_present());
        assert!(AnswerValue::OpenText("hello".into()).is_present());
    }

    #[test]
    fn test_from_raw_rating() {
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Rating, &json!(3)),
            Some(AnswerValue::Rating(Scalar::Int(3)))
        );
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Rating, &json!({"value": "4"})),
            Some(AnswerValue::Rating(Scalar::Text("4".into())))
        );
        assert_eq!(AnswerValue::from_raw(QuestionKind::Rating, &json!(null)), None);
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Rating, &json!([1, 2])),
            None
        );
    }

    #[test]
    fn test_from_raw_choice() {
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Choice, &json!("2")),
            Some(AnswerValue::Choice {
                value: Scalar::Text("2".into()),
                other_text: None,
            })
        );
        assert_eq!(
            AnswerValue::from_raw(
                QuestionKind::Choice,
                &json!({"value": "other", "other_text": "hand-written"})
            ),
            Some(AnswerValue::Choice {
                value: Scalar::Text("other".into()),
                other_text: Some("hand-written".into()),
            })
        );
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Choice, &json!({"other_text": "no value"})),
            None
        );
    }

    #[test]
    fn test_from_raw_multiple_choice() {
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::MultipleChoice, &json!(["a", 2])),
            Some(AnswerValue::MultipleChoice {
                values: vec![Scalar::Text("a".into()), Scalar::Int(2)],
                other_text: None,
            })
        );
        assert_eq!(
            AnswerValue::from_raw(
                QuestionKind::MultipleChoice,
                &json!({"value": ["a"], "other_text": "x"})
            ),
            Some(AnswerValue::MultipleChoice {
                values: vec![Scalar::Text("a".into())],
                other_text: Some("x".into()),
            })
        );
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::MultipleChoice, &json!("a")),
            None
        );
    }

    #[test]
    fn test_from_raw_open_text_and_unknown() {
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::OpenText, &json!("hello")),
            Some(AnswerValue::OpenText("hello".into()))
        );
        assert_eq!(AnswerValue::from_raw(QuestionKind::OpenText, &json!(5)), None);

        // Unknown kinds normalize under the rating rule
        assert_eq!(
            AnswerValue::from_raw(QuestionKind::Unknown, &json!(7)),
            Some(AnswerValue::Rating(Scalar::Int(7)))
        );
    }

    #[test]
    fn test_wire_value_shapes() {
        let multiple = AnswerValue::MultipleChoice {
            values: vec![Scalar::Text("a".into()), Scalar::Int(2)],
            other_text: Some("x".into()),
        };
        assert_eq!(multiple.wire_value(), json!(["a", 2]));
        assert_eq!(multiple.other_text(), Some("x"));

        let rating = AnswerValue::Rating(Scalar::Int(5));
        assert_eq!(rating.wire_value(), json!(5));
        assert_eq!(rating.other_text(), None);
    }
}
