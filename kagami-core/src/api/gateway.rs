//! Collaborator traits the wizard depends on.
//!
//! The session only ever talks to the server through these two contracts:
//! [`AnswerGateway`] persists one group's answers, [`StepSource`] serves
//! step pages. The navigation intent that used to ride on mutable URL state
//! travels explicitly, as the `EntryMode` inside a session `Transition`,
//! into the next page's session constructor.

use async_trait::async_trait;
use thiserror::Error;

use crate::api::models::{AnswerBatch, StepPage};
use crate::evaluatee::EvaluateeId;
use crate::form::EvaluationId;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Persistence side: submits one group's validated answers. Any error
/// aborts the navigation that triggered the submit; the caller keeps its
/// in-memory state and may retry.
#[async_trait]
#[mockall::automock]
pub trait AnswerGateway: Send + Sync {
    async fn submit_answers(&self, batch: &AnswerBatch) -> GatewayResult<()>;
}

/// Read side: serves the page data for one step of one evaluation.
#[async_trait]
#[mockall::automock]
pub trait StepSource: Send + Sync {
    async fn load_step(
        &self,
        evaluation_id: EvaluationId,
        evaluatee_id: EvaluateeId,
        step: u32,
    ) -> GatewayResult<StepPage>;
}
