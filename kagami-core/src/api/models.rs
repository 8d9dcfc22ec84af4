//! API data models for kagami-core
//!
//! Shapes exchanged with the evaluation server: the step page served on
//! wizard entry, the dual-shape existing-answer map, and the submission
//! body posted when a group is confirmed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_with::{DisplayFromStr, serde_as};
use uuid::Uuid;

use crate::answer::AnswerValue;
use crate::evaluatee::{Angle, AngleError, AngleGroup, Evaluatee, EvaluateeId};
use crate::form::{EvaluationId, Part, PartId, QuestionId};
use crate::session::EntryMode;

/// One entry of the existing-answer map. The server has served two shapes
/// historically: per-evaluatee maps keyed by numeric-string evaluatee ids,
/// and a legacy flat value meaning "the current evaluatee's answer".
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswerEntry {
    PerEvaluatee(#[serde_as(as = "HashMap<DisplayFromStr, _>")] HashMap<EvaluateeId, JsonValue>),
    Flat(JsonValue),
}

/// Existing answers served with a step page, keyed by question id.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnswerMap(
    #[serde_as(as = "HashMap<DisplayFromStr, _>")] pub HashMap<QuestionId, RawAnswerEntry>,
);

impl RawAnswerMap {
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &RawAnswerEntry)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Angle-group block of a step page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleGroupData {
    pub angle: Angle,
    pub evaluatees: Vec<Evaluatee>,
}

/// The initial page data for one wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPage {
    pub evaluation_id: EvaluationId,

    /// 1-based step number, server-assigned
    pub step: u32,

    pub total_steps: u32,

    pub part: Part,

    /// The evaluatee the wizard route is keyed by
    pub evaluatee: Evaluatee,

    /// Absent when the step rates a single evaluatee
    #[serde(default)]
    pub angle_group: Option<AngleGroupData>,

    #[serde(default)]
    pub existing_answers: RawAnswerMap,

    /// Server hint for re-entering a step mid-way
    #[serde(default)]
    pub resume_group: Option<usize>,
}

impl StepPage {
    /// The active evaluatee set, falling back to a singleton of the current
    /// evaluatee when the server supplied no angle-group block.
    pub fn angle_group(&self) -> Result<AngleGroup, AngleError> {
        match &self.angle_group {
            Some(data) => AngleGroup::new(data.angle, data.evaluatees.clone(), self.evaluatee.id),
            None => Ok(AngleGroup::solo(self.evaluatee.clone())),
        }
    }

    /// Merges the caller's navigation intent with the server's resume hint.
    /// An explicit intent wins; the hint only upgrades a fresh entry.
    pub fn entry_mode(&self, requested: EntryMode) -> EntryMode {
        match requested {
            EntryMode::Fresh => self
                .resume_group
                .map(EntryMode::ResumeAtGroup)
                .unwrap_or(EntryMode::Fresh),
            other => other,
        }
    }
}

/// One validated answer cell bound for the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub evaluatee_id: EvaluateeId,
    pub value: AnswerValue,
}

/// One group's worth of validated answers, built by the session on advance.
#[derive(Debug, Clone)]
pub struct AnswerBatch {
    /// Client-generated id for log correlation
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub evaluation_id: EvaluationId,
    pub part_id: PartId,
    /// The evaluatee the submission route is keyed by
    pub evaluatee_id: EvaluateeId,
    pub step: u32,
    pub records: Vec<AnswerRecord>,
}

/// One serialized answer of the submission body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,

    pub evaluatee_id: EvaluateeId,

    pub value: JsonValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_text: Option<String>,
}

/// Body of `POST /api/evaluations/{evaluation}/steps/{step}/answers`.
/// Answers are keyed by the compound `"{question_id}:{evaluatee_id}"` key
/// the server expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswersRequest {
    pub evaluation_id: EvaluationId,
    pub part_id: PartId,
    pub evaluatee_id: EvaluateeId,
    pub step: u32,
    pub answers: HashMap<String, SubmittedAnswer>,
}

impl From<&AnswerBatch> for SubmitAnswersRequest {
    fn from(batch: &AnswerBatch) -> Self {
        let answers = batch
            .records
            .iter()
            .map(|record| {
                let key = format!("{}:{}", record.question_id, record.evaluatee_id);
                let submitted = SubmittedAnswer {
                    question_id: record.question_id,
                    evaluatee_id: record.evaluatee_id,
                    value: record.value.wire_value(),
                    other_text: record.value.other_text().map(str::to_string),
                };
                (key, submitted)
            })
            .collect();

        Self {
            evaluation_id: batch.evaluation_id,
            part_id: batch.part_id,
            evaluatee_id: batch.evaluatee_id,
            step: batch.step,
            answers,
        }
    }
}
