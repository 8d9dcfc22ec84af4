//! The answer store: a two-level (question, evaluatee) map owned by one
//! session. Lifetime is one wizard visit to one step; it is seeded at
//! session construction and discarded with the session.

use std::collections::HashMap;

use crate::answer::AnswerValue;
use crate::evaluatee::{AngleGroup, EvaluateeId};
use crate::form::{QuestionGroup, QuestionId};

#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    cells: HashMap<QuestionId, HashMap<EvaluateeId, AnswerValue>>,
}

/// The "N of M answered" summary of one question group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCompletion {
    pub answered: usize,
    pub required: usize,
}

impl GroupCompletion {
    pub fn is_complete(&self) -> bool {
        self.answered == self.required
    }
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent last-write-wins replace of exactly one cell.
    pub fn set(&mut self, question_id: QuestionId, evaluatee_id: EvaluateeId, value: AnswerValue) {
        self.cells
            .entry(question_id)
            .or_default()
            .insert(evaluatee_id, value);
    }

    pub fn clear(
        &mut self,
        question_id: QuestionId,
        evaluatee_id: EvaluateeId,
    ) -> Option<AnswerValue> {
        let row = self.cells.get_mut(&question_id)?;
        let removed = row.remove(&evaluatee_id);
        if row.is_empty() {
            self.cells.remove(&question_id);
        }
        removed
    }

    pub fn get(&self, question_id: QuestionId, evaluatee_id: EvaluateeId) -> Option<&AnswerValue> {
        self.cells.get(&question_id)?.get(&evaluatee_id)
    }

    /// A cell counts only when it exists and passes its presence rule.
    pub fn is_present(&self, question_id: QuestionId, evaluatee_id: EvaluateeId) -> bool {
        self.get(question_id, evaluatee_id)
            .is_some_and(AnswerValue::is_present)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.values().map(HashMap::len).sum()
    }

    /// Completion over the Cartesian product: with N questions and M members
    /// there are N×M required answers.
    pub fn group_completion(
        &self,
        group: &QuestionGroup,
        members: &AngleGroup,
    ) -> GroupCompletion {
        let required = group.questions.len() * members.len();
        let answered = group
            .questions
            .iter()
            .flat_map(|question| {
                members
                    .members()
                    .iter()
                    .filter(|member| self.is_present(question.id, member.id))
            })
            .count();
        GroupCompletion { answered, required }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::answer::Scalar;
    use crate::evaluatee::{Angle, Evaluatee, UserType};
    use crate::form::{Question, QuestionKind};

    fn rating(n: i64) -> AnswerValue {
        AnswerValue::Rating(Scalar::Int(n))
    }

    fn peer(id: EvaluateeId) -> Evaluatee {
        Evaluatee {
            id,
            name: format!("member {}", id),
            position: None,
            unit: None,
            grade: 3,
            user_type: UserType::Internal,
            angle: Angle::Peer,
        }
    }

    fn group_of(question_ids: &[QuestionId]) -> QuestionGroup {
        QuestionGroup {
            label: "test".to_string(),
            description: None,
            questions: question_ids
                .iter()
                .map(|&id| Question {
                    id,
                    text: format!("q{}", id),
                    kind: QuestionKind::Rating,
                    options: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_idempotent_cell_write() {
        let mut store = AnswerStore::new();
        store.set(1, 10, rating(5));
        let once = store.clone();
        store.set(1, 10, rating(5));
        assert_eq!(store.get(1, 10), once.get(1, 10));
        assert_eq!(store.cell_count(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = AnswerStore::new();
        store.set(1, 10, rating(2));
        store.set(1, 10, rating(4));
        assert_eq!(store.get(1, 10), Some(&rating(4)));
        assert_eq!(store.cell_count(), 1);
    }

    #[test]
    fn test_cross_evaluatee_isolation() {
        let mut store = AnswerStore::new();
        store.set(1, 10, rating(5));
        store.set(1, 20, rating(2));
        store.set(1, 10, rating(1));
        assert_eq!(store.get(1, 20), Some(&rating(2)));
        assert_eq!(store.get(1, 10), Some(&rating(1)));
    }

    #[test]
    fn test_clear_prunes_empty_rows() {
        let mut store = AnswerStore::new();
        store.set(1, 10, rating(5));
        assert_eq!(store.clear(1, 10), Some(rating(5)));
        assert_eq!(store.clear(1, 10), None);
        assert_eq!(store.cell_count(), 0);
    }

    #[test]
    fn test_completion_is_conjunctive() {
        let members =
            AngleGroup::new(Angle::Peer, vec![peer(10), peer(20), peer(30)], 10).unwrap();
        let group = group_of(&[1, 2]);
        let mut store = AnswerStore::new();

        // 2 questions x 3 members
        assert_eq!(
            store.group_completion(&group, &members),
            GroupCompletion {
                answered: 0,
                required: 6
            }
        );

        for question in [1, 2] {
            for member in [10, 20, 30] {
                store.set(question, member, rating(3));
            }
        }
        assert!(store.group_completion(&group, &members).is_complete());

        // Flipping a single cell to invalid flips the whole group
        store.set(2, 20, AnswerValue::Rating(Scalar::Text("".into())));
        let completion = store.group_completion(&group, &members);
        assert_eq!(completion.answered, 5);
        assert!(!completion.is_complete());
    }

    #[test]
    fn test_foreign_cells_do_not_count() {
        let members = AngleGroup::new(Angle::Peer, vec![peer(10)], 10).unwrap();
        let group = group_of(&[1]);
        let mut store = AnswerStore::new();
        store.set(1, 99, rating(5));

        let completion = store.group_completion(&group, &members);
        assert_eq!(completion.answered, 0);
        assert_eq!(completion.required, 1);
    }
}
