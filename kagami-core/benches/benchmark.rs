use criterion::{Criterion, criterion_group, criterion_main};

use kagami_core::answer::{AnswerValue, Scalar};
use kagami_core::evaluatee::{Angle, AngleGroup, Evaluatee, UserType};
use kagami_core::form::{Question, QuestionGroup, QuestionKind};
use kagami_core::store::AnswerStore;

fn peer(id: u64) -> Evaluatee {
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

fn bench_group_completion(c: &mut Criterion) {
    let questions: Vec<Question> = (0..20)
        .map(|id| Question {
            id,
            text: format!("q{}", id),
            kind: QuestionKind::Rating,
            options: vec![],
        })
        .collect();
    let group = QuestionGroup {
        label: "bench".to_string(),
        description: None,
        questions,
    };
    let members = AngleGroup::new(Angle::Peer, (1..=10).map(peer).collect(), 1).unwrap();

    let mut store = AnswerStore::new();
    for question in 0..20 {
        for member in 1..=10 {
            store.set(question, member, AnswerValue::Rating(Scalar::Int(4)));
        }
    }

    // 20 questions x 10 evaluatees per check
    c.bench_function("group_completion 20x10", |b| {
        b.iter(|| store.group_completion(&group, &members))
    });
}

criterion_group!(benches, bench_group_completion);
criterion_main!(benches);
