//! Drives the wizard loop with scripted input over mocked collaborators.

use std::io::Cursor;
use std::sync::Arc;

use kagami_cli::wizard::{WizardOutcome, run_wizard};
use kagami_core::api::gateway::{MockAnswerGateway, MockStepSource};
use kagami_core::api::models::{RawAnswerMap, StepPage};
use kagami_core::evaluatee::{Angle, Evaluatee, UserType};
use kagami_core::form::{Aspect, Part, Question, QuestionKind, QuestionOption};

fn evaluatee() -> Evaluatee {
    Evaluatee {
        id: 7,
        name: "Aki".to_string(),
        position: None,
        unit: None,
        grade: 3,
        user_type: UserType::Internal,
        angle: Angle::SelfReview,
    }
}

fn page(step: u32, total_steps: u32) -> StepPage {
    StepPage {
        evaluation_id: 42,
        step,
        total_steps,
        part: Part {
            id: 9,
            title: format!("Part {}", step),
            description: None,
            aspects: vec![Aspect {
                id: 90,
                name: "Delivery".to_string(),
                description: None,
                sub_aspects: vec![],
                questions: vec![Question {
                    id: 900 + u64::from(step),
                    text: "Delivers on time".to_string(),
                    kind: QuestionKind::Rating,
                    options: (1..=5)
                        .map(|n| QuestionOption {
                            label: n.to_string(),
                            value: kagami_core::answer::Scalar::Int(n),
                            score: Some(n),
                        })
                        .collect(),
                }],
            }],
        },
        evaluatee: evaluatee(),
        angle_group: None,
        existing_answers: RawAnswerMap::default(),
        resume_group: None,
    }
}

#[tokio::test]
async fn test_single_step_run_to_finish() {
    let mut source = MockStepSource::new();
    source
        .expect_load_step()
        .times(1)
        .returning(|_, _, _| Box::pin(async { Ok(page(1, 1)) }));

    let mut gateway = MockAnswerGateway::new();
    gateway
        .expect_submit_answers()
        .times(1)
        .withf(|batch| batch.records.len() == 1 && batch.records[0].evaluatee_id == 7)
        .returning(|_| Box::pin(async { Ok(()) }));

    // Answer the one rating question, then confirm the group
    let mut input = Cursor::new("4\nn\n");
    let mut out = Vec::new();

    let outcome = run_wizard(
        &source,
        Arc::new(gateway),
        &mut input,
        &mut out,
        42,
        7,
        1,
    )
    .await
    .unwrap();

    assert_eq!(outcome, WizardOutcome { finished: true });
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Step 1/1"));
    assert!(printed.contains("Answered 1/1"));
    assert!(printed.contains("Evaluation complete"));
}

#[tokio::test]
async fn test_two_steps_walk_forward() {
    let mut source = MockStepSource::new();
    source
        .expect_load_step()
        .withf(|_, _, step| *step == 1)
        .times(1)
        .returning(|_, _, _| Box::pin(async { Ok(page(1, 2)) }));
    source
        .expect_load_step()
        .withf(|_, _, step| *step == 2)
        .times(1)
        .returning(|_, _, _| Box::pin(async { Ok(page(2, 2)) }));

    let mut gateway = MockAnswerGateway::new();
    gateway
        .expect_submit_answers()
        .times(2)
        .returning(|_| Box::pin(async { Ok(()) }));

    let mut input = Cursor::new("4\nn\n5\nn\n");
    let mut out = Vec::new();

    let outcome = run_wizard(
        &source,
        Arc::new(gateway),
        &mut input,
        &mut out,
        42,
        7,
        1,
    )
    .await
    .unwrap();

    assert_eq!(outcome, WizardOutcome { finished: true });
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Step 1/2"));
    assert!(printed.contains("Step 2/2"));
}

#[tokio::test]
async fn test_quit_leaves_unfinished() {
    let mut source = MockStepSource::new();
    source
        .expect_load_step()
        .times(1)
        .returning(|_, _, _| Box::pin(async { Ok(page(1, 1)) }));

    // An unanswered group and a quit: the gateway must never be called
    let gateway = MockAnswerGateway::new();

    let mut input = Cursor::new("\nq\n");
    let mut out = Vec::new();

    let outcome = run_wizard(
        &source,
        Arc::new(gateway),
        &mut input,
        &mut out,
        42,
        7,
        1,
    )
    .await
    .unwrap();

    assert_eq!(outcome, WizardOutcome { finished: false });
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Answered 0/1"));
}

#[tokio::test]
async fn test_retreat_past_start_goes_to_dashboard() {
    let mut source = MockStepSource::new();
    source
        .expect_load_step()
        .times(1)
        .returning(|_, _, _| Box::pin(async { Ok(page(1, 2)) }));

    let gateway = MockAnswerGateway::new();

    let mut input = Cursor::new("\nb\n");
    let mut out = Vec::new();

    let outcome = run_wizard(
        &source,
        Arc::new(gateway),
        &mut input,
        &mut out,
        42,
        7,
        1,
    )
    .await
    .unwrap();

    assert_eq!(outcome, WizardOutcome { finished: false });
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Leaving the wizard"));
}
