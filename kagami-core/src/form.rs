//! Form definition model for one evaluation step.
//!
//! A `Part` is the server-owned definition of one wizard step: an ordered
//! tree of aspects, optional sub-aspects, and questions. The model is
//! immutable once loaded for a session; the only derived structure is the
//! [`QuestionGroup`] sequence, the unit of forward/backward navigation
//! within a step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answer::Scalar;

pub type EvaluationId = u64;
pub type PartId = u64;
pub type AspectId = u64;
pub type QuestionId = u64;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Failed to parse form definition: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Question kind, closed on the wire (`rating`, `choice`, `multiple_choice`,
/// `open_text`). Unrecognized server tags land on `Unknown` and are treated
/// like ratings for presence checking.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Rating,
    Choice,
    MultipleChoice,
    OpenText,
    #[serde(other)]
    Unknown,
}

/// One selectable option of a rating/choice/multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Display label
    pub label: String,

    /// The token submitted when this option is selected
    pub value: Scalar,

    /// Numeric score for aggregation; null for non-rating options
    #[serde(default)]
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,

    pub text: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// Ordered options; empty for open-text questions
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAspect {
    pub id: AspectId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub id: AspectId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub sub_aspects: Vec<SubAspect>,

    /// Questions attached directly to the aspect (only meaningful when it
    /// has no sub-aspects)
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// One wizard step of the evaluation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub aspects: Vec<Aspect>,
}

/// The fine-grained navigation unit within a step. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionGroup {
    pub label: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

impl Part {
    pub fn from_json(input: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Flattens the aspect tree into the navigation sequence: an aspect with
    /// sub-aspects contributes one group per sub-aspect; an aspect without
    /// sub-aspects contributes a group of its own questions only when it has
    /// any.
    pub fn question_groups(&self) -> Vec<QuestionGroup> {
        let mut groups = Vec::new();
        for aspect in &self.aspects {
            if aspect.sub_aspects.is_empty() {
                if !aspect.questions.is_empty() {
                    groups.push(QuestionGroup {
                        label: aspect.name.clone(),
                        description: aspect.description.clone(),
                        questions: aspect.questions.clone(),
                    });
                }
            } else {
                for sub in &aspect.sub_aspects {
                    groups.push(QuestionGroup {
                        label: sub.name.clone(),
                        description: sub.description.clone(),
                        questions: sub.questions.clone(),
                    });
                }
            }
        }
        groups
    }
}
