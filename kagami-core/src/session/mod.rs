//! # Evaluation Answer Session
//!
//! The EvaluationAnswerSession owns the answer state of one wizard visit to
//! one step: the (question, evaluatee) answer store, the group cursor, and
//! the protocol that persists a group and decides where the wizard goes
//! next.
//!
//! ## Key Features
//!
//! - **Boundary normalization**: raw existing answers are converted into
//!   typed values once, at construction; foreign and unparseable entries are
//!   dropped there and reported with a single warning
//! - **Read-time validation**: writes accept any value so partial input is
//!   never rejected; presence is checked when completeness or a submission
//!   payload is computed
//! - **Submit-then-navigate**: `advance` persists the current group's valid
//!   answers and only moves the cursor after the server acknowledges
//! - **Single in-flight submission**: a busy flag refuses re-entry while a
//!   submit is outstanding, so a double-confirm cannot post a group twice
//!
//! ## Implementation Details
//!
//! The session is single-owner: every operation takes `&mut self`, there are
//! no background tasks, and the store is never shared. A submission failure
//! leaves the cursor and the store exactly as they were, so the user can
//! retry without losing work.

pub mod progress;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::answer::AnswerValue;
use crate::api::gateway::{AnswerGateway, GatewayError};
use crate::api::models::{AnswerBatch, AnswerRecord, RawAnswerEntry, RawAnswerMap};
use crate::evaluatee::{AngleGroup, EvaluateeId};
use crate::form::{EvaluationId, Part, QuestionGroup, QuestionId, QuestionKind};
use crate::store::{AnswerStore, GroupCompletion};

pub use progress::{EntryMode, SessionProgress, Transition};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Step has no question groups")]
    EmptyStep,
    #[error("Question {0} is not part of the current group")]
    UnknownQuestion(QuestionId),
    #[error("Evaluatee {0} is not a member of the angle group")]
    UnknownEvaluatee(EvaluateeId),
    #[error("A submission is already in flight")]
    SubmissionInFlight,
    #[error("Submission failed: {0}")]
    Gateway(#[from] GatewayError),
}

pub type SessionResult<T> = Result<T, SessionError>;

pub struct EvaluationAnswerSession {
    evaluation_id: EvaluationId,
    part: Part,
    groups: Vec<QuestionGroup>,
    angle_group: AngleGroup,
    progress: SessionProgress,
    store: AnswerStore,
    gateway: Arc<dyn AnswerGateway>,
    in_flight: bool,
}

impl EvaluationAnswerSession {
    /// Builds a session for one step: flattens the part into question
    /// groups, seeds the store from the raw existing-answer map, and
    /// resolves the entry mode into the starting group index. The entry
    /// mode is consumed here; nothing re-applies on later calls.
    pub fn new(
        evaluation_id: EvaluationId,
        part: Part,
        step: u32,
        total_steps: u32,
        angle_group: AngleGroup,
        existing_answers: &RawAnswerMap,
        entry: EntryMode,
        gateway: Arc<dyn AnswerGateway>,
    ) -> SessionResult<Self> {
        let groups = part.question_groups();
        if groups.is_empty() {
            return Err(SessionError::EmptyStep);
        }

        let kinds = question_kinds(&groups);
        let store = seed_store(existing_answers, &kinds, &angle_group);

        let total_groups = groups.len();
        let group_index = resolve_entry(entry, total_groups);

        debug!(
            evaluation_id,
            step, total_groups, group_index, "session initialized"
        );

        Ok(Self {
            evaluation_id,
            part,
            groups,
            angle_group,
            progress: SessionProgress {
                step,
                total_steps,
                group_index,
                total_groups,
            },
            store,
            gateway,
            in_flight: false,
        })
    }

    pub fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    pub fn angle_group(&self) -> &AngleGroup {
        &self.angle_group
    }

    pub fn current_group(&self) -> &QuestionGroup {
        &self.groups[self.progress.group_index]
    }

    pub fn answer(&self, question_id: QuestionId, evaluatee_id: EvaluateeId) -> Option<&AnswerValue> {
        self.store.get(question_id, evaluatee_id)
    }

    /// Replaces exactly one (question, evaluatee) cell. The value itself is
    /// accepted as-is; only membership is checked, so partial input (a
    /// rating pressed, then changed) is never rejected.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        evaluatee_id: EvaluateeId,
        value: AnswerValue,
    ) -> SessionResult<()> {
        self.check_membership(question_id, evaluatee_id)?;
        self.store.set(question_id, evaluatee_id, value);
        Ok(())
    }

    /// The UI's "clear selection" for one cell.
    pub fn clear_answer(
        &mut self,
        question_id: QuestionId,
        evaluatee_id: EvaluateeId,
    ) -> SessionResult<()> {
        self.check_membership(question_id, evaluatee_id)?;
        self.store.clear(question_id, evaluatee_id);
        Ok(())
    }

    pub fn group_completion(&self) -> GroupCompletion {
        self.store
            .group_completion(self.current_group(), &self.angle_group)
    }

    /// True iff every (question, member) pair of the current group passes
    /// its presence rule.
    pub fn is_group_complete(&self) -> bool {
        self.group_completion().is_complete()
    }

    /// Completion of every group of the step, in navigation order.
    pub fn group_completions(&self) -> Vec<GroupCompletion> {
        self.groups
            .iter()
            .map(|group| self.store.group_completion(group, &self.angle_group))
            .collect()
    }

    /// Confirms the current group: submits its valid answers, then moves
    /// the cursor. On submission failure the cursor and store are
    /// untouched and the caller may retry.
    #[instrument(skip(self), fields(step = self.progress.step, group = self.progress.group_index))]
    pub async fn advance(&mut self) -> SessionResult<Transition> {
        if self.in_flight {
            return Err(SessionError::SubmissionInFlight);
        }

        let batch = self.build_batch();
        if !batch.records.is_empty() {
            self.in_flight = true;
            let result = self.gateway.submit_answers(&batch).await;
            self.in_flight = false;
            result?;
            debug!(batch_id = %batch.batch_id, records = batch.records.len(), "group persisted");
        }

        let transition = if !self.progress.is_last_group() {
            self.progress.group_index += 1;
            Transition::NextGroup {
                group_index: self.progress.group_index,
            }
        } else if self.progress.is_final_step() {
            Transition::Finished
        } else {
            Transition::LoadStep {
                step: self.progress.step + 1,
                entry: EntryMode::Fresh,
            }
        };

        debug!(?transition, "advance");
        Ok(transition)
    }

    /// Moves backward. Within a step this is purely local; crossing a step
    /// boundary asks the router for the previous step with a jump-to-last
    /// entry, and retreating past step 1 leaves for the dashboard.
    #[instrument(skip(self), fields(step = self.progress.step, group = self.progress.group_index))]
    pub fn retreat(&mut self) -> Transition {
        let transition = if self.progress.group_index > 0 {
            self.progress.group_index -= 1;
            Transition::PrevGroup {
                group_index: self.progress.group_index,
            }
        } else if self.progress.step > 1 {
            Transition::LoadStep {
                step: self.progress.step - 1,
                entry: EntryMode::JumpToLast,
            }
        } else {
            Transition::Dashboard
        };

        debug!(?transition, "retreat");
        transition
    }

    fn check_membership(
        &self,
        question_id: QuestionId,
        evaluatee_id: EvaluateeId,
    ) -> SessionResult<()> {
        if !self
            .current_group()
            .questions
            .iter()
            .any(|q| q.id == question_id)
        {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        if !self.angle_group.contains(evaluatee_id) {
            return Err(SessionError::UnknownEvaluatee(evaluatee_id));
        }
        Ok(())
    }

    /// Restricted to the current group, re-validated per cell: absent or
    /// invalid cells are omitted, never an error.
    fn build_batch(&self) -> AnswerBatch {
        let group = self.current_group();
        let mut records = Vec::new();
        for question in &group.questions {
            for member in self.angle_group.members() {
                if let Some(value) = self.store.get(question.id, member.id) {
                    if value.is_present() {
                        records.push(AnswerRecord {
                            question_id: question.id,
                            evaluatee_id: member.id,
                            value: value.clone(),
                        });
                    }
                }
            }
        }

        AnswerBatch {
            batch_id: Uuid::new_v4(),
            created_at: Utc::now(),
            evaluation_id: self.evaluation_id,
            part_id: self.part.id,
            evaluatee_id: self.angle_group.current_id(),
            step: self.progress.step,
            records,
        }
    }
}

fn question_kinds(groups: &[QuestionGroup]) -> HashMap<QuestionId, QuestionKind> {
    groups
        .iter()
        .flat_map(|group| group.questions.iter())
        .map(|question| (question.id, question.kind))
        .collect()
}

fn resolve_entry(entry: EntryMode, total_groups: usize) -> usize {
    match entry {
        EntryMode::Fresh => 0,
        EntryMode::ResumeAtGroup(index) => {
            if index >= total_groups {
                // The hint is advisory server state, not client truth
                warn!(index, total_groups, "stale resume hint, clamping to last group");
                total_groups - 1
            } else {
                index
            }
        }
        EntryMode::JumpToLast => total_groups - 1,
    }
}

/// Seeds the store from the dual-shape raw map. Per-evaluatee entries are
/// copied only for members of the angle group; legacy flat entries become
/// answers for the current evaluatee. Everything else is dropped and
/// reported once.
fn seed_store(
    raw: &RawAnswerMap,
    kinds: &HashMap<QuestionId, QuestionKind>,
    angle_group: &AngleGroup,
) -> AnswerStore {
    let mut store = AnswerStore::new();
    let mut dropped_foreign: usize = 0;
    let mut dropped_malformed: usize = 0;

    for (&question_id, entry) in raw.iter() {
        let Some(&kind) = kinds.get(&question_id) else {
            dropped_malformed += 1;
            continue;
        };
        match entry {
            RawAnswerEntry::PerEvaluatee(map) => {
                for (&evaluatee_id, value) in map {
                    if !angle_group.contains(evaluatee_id) {
                        dropped_foreign += 1;
                        continue;
                    }
                    match AnswerValue::from_raw(kind, value) {
                        Some(answer) => store.set(question_id, evaluatee_id, answer),
                        None => dropped_malformed += 1,
                    }
                }
            }
            RawAnswerEntry::Flat(value) => match AnswerValue::from_raw(kind, value) {
                Some(answer) => store.set(question_id, angle_group.current_id(), answer),
                None => dropped_malformed += 1,
            },
        }
    }

    if dropped_foreign > 0 || dropped_malformed > 0 {
        // Stale data is tolerated; an angle-group mismatch bug should still
        // show up in the logs
        warn!(
            dropped_foreign,
            dropped_malformed,
            seeded = store.cell_count(),
            "dropped existing answers during seeding"
        );
    }

    store
}
