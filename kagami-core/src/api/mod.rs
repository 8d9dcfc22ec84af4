//! API boundary of kagami-core
//!
//! Wire models exchanged with the evaluation server and the collaborator
//! traits a front-end implements against it.

pub mod gateway;
pub mod models;

pub use gateway::{AnswerGateway, GatewayError, GatewayResult, StepSource};
pub use models::{AnswerBatch, AnswerRecord, RawAnswerMap, StepPage, SubmitAnswersRequest};
