//! Evaluatees, angles, and the active evaluatee set of a step.
//!
//! An angle names the evaluator's relationship to an evaluatee. The wire
//! tags are the legacy compass names (`top`, `bottom`, `left`, `right`,
//! `self`); the variants carry the meaning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EvaluateeId = u64;

#[derive(Error, Debug, PartialEq)]
pub enum AngleError {
    #[error("Angle group has no members")]
    EmptyGroup,
    #[error("Evaluatee {evaluatee} carries angle {found}, expected {expected}")]
    MixedAngles {
        evaluatee: EvaluateeId,
        expected: Angle,
        found: Angle,
    },
    #[error("Current evaluatee {0} is not a member of the angle group")]
    CurrentNotMember(EvaluateeId),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserType {
    Internal,
    External,
}

/// Evaluator's relationship to the evaluatee.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Angle {
    /// Evaluator outranks the evaluatee
    #[serde(rename = "top")]
    #[strum(serialize = "top")]
    Superior,

    /// Evaluatee outranks the evaluator
    #[serde(rename = "bottom")]
    #[strum(serialize = "bottom")]
    Subordinate,

    /// Same grade, both internal
    #[serde(rename = "left")]
    #[strum(serialize = "left")]
    Peer,

    /// Evaluator from outside the organization
    #[serde(rename = "right")]
    #[strum(serialize = "right")]
    External,

    /// Evaluator rating themselves
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    SelfReview,
}

impl Angle {
    /// Assignment rule: may `evaluator` rate `target` under this angle?
    pub fn permits(&self, evaluator: &Evaluatee, target: &Evaluatee) -> bool {
        match self {
            Angle::Superior => evaluator.grade > target.grade,
            Angle::Subordinate => target.grade > evaluator.grade,
            Angle::Peer => {
                evaluator.grade == target.grade
                    && evaluator.user_type == UserType::Internal
                    && target.user_type == UserType::Internal
            }
            Angle::External => evaluator.user_type == UserType::External,
            Angle::SelfReview => evaluator.id == target.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluatee {
    pub id: EvaluateeId,

    pub name: String,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub unit: Option<String>,

    /// Organizational level used by the angle assignment rules
    pub grade: i32,

    pub user_type: UserType,

    /// The angle under which this person is rated in the current step
    pub angle: Angle,
}

/// The active evaluatee set of one step: a non-empty member list sharing one
/// angle, plus the id of the current evaluatee the wizard route is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleGroup {
    angle: Angle,
    members: Vec<Evaluatee>,
    current: EvaluateeId,
}

impl AngleGroup {
    pub fn new(
        angle: Angle,
        members: Vec<Evaluatee>,
        current: EvaluateeId,
    ) -> Result<Self, AngleError> {
        if members.is_empty() {
            return Err(AngleError::EmptyGroup);
        }
        if let Some(stray) = members.iter().find(|m| m.angle != angle) {
            return Err(AngleError::MixedAngles {
                evaluatee: stray.id,
                expected: angle,
                found: stray.angle,
            });
        }
        if !members.iter().any(|m| m.id == current) {
            return Err(AngleError::CurrentNotMember(current));
        }
        Ok(Self {
            angle,
            members,
            current,
        })
    }

    /// Single-element fallback used when the server supplies no angle-group
    /// data.
    pub fn solo(evaluatee: Evaluatee) -> Self {
        Self {
            angle: evaluatee.angle,
            current: evaluatee.id,
            members: vec![evaluatee],
        }
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn members(&self) -> &[Evaluatee] {
        &self.members
    }

    pub fn current_id(&self) -> EvaluateeId {
        self.current
    }

    pub fn contains(&self, id: EvaluateeId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
