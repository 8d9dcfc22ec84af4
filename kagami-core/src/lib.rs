//! # KAGAMI: 360-Degree Evaluation Wizard Core
//!
//! KAGAMI is the client-side core of a 360-degree performance-evaluation
//! system. One evaluator walks a multi-step wizard, rating one or more
//! evaluatees at a time; this crate owns the in-memory answer state for one
//! step of that walk and the contracts it uses to talk to the evaluation
//! server.
//!
//! ## Architecture
//!
//! The crate is organized around a single stateful component and the pure
//! data model it operates on:
//!
//! - Form definition ([`form`]): parts, aspects, sub-aspects, questions, and
//!   the derived question-group sequence that drives navigation.
//! - Evaluatees and angles ([`evaluatee`]): who is being rated, under which
//!   relationship, and the rules for a valid angle group.
//! - Answers ([`answer`]): the per-question-kind answer variants, their
//!   presence rules, and normalization of raw wire values.
//! - Answer store ([`store`]): the two-level (question, evaluatee) map owned
//!   by a session, with per-group completion summaries.
//! - Session ([`session`]): the [`session::EvaluationAnswerSession`] state
//!   machine that seeds the store, validates group completeness, submits
//!   answered cells, and decides where the wizard goes next.
//! - API boundary ([`api`]): wire models exchanged with the evaluation
//!   server and the collaborator traits a front-end implements.
//!
//! ## Data Flow
//!
//! ```text
//! StepPage → EvaluationAnswerSession → AnswerBatch → AnswerGateway
//!    ↑                                                    |
//!    └──────────────── StepSource ←── Transition ─────────┘
//! ```
//!
//! A front-end fetches a [`api::models::StepPage`], builds a session from
//! it, feeds user input through [`session::EvaluationAnswerSession::set_answer`],
//! and routes the [`session::Transition`] returned by `advance`/`retreat`
//! back into [`api::gateway::StepSource`] until the evaluation is finished.

pub mod answer;
pub mod api;
pub mod error;
pub mod evaluatee;
pub mod form;
pub mod session;
pub mod store;

// Re-exports
pub use error::{Error, KagamiResult};
pub use evaluatee::EvaluateeId;
pub use form::{AspectId, EvaluationId, PartId, QuestionId};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        // One-time tracing init so warn-path tests are visible under RUST_LOG
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
