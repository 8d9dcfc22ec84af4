//! HTTP client for the evaluation server, implementing the core's
//! collaborator traits.

use async_trait::async_trait;
use reqwest::{Client, Response};

use kagami_core::api::gateway::{AnswerGateway, GatewayError, GatewayResult, StepSource};
use kagami_core::api::models::{AnswerBatch, StepPage, SubmitAnswersRequest};
use kagami_core::{EvaluateeId, EvaluationId};

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn health_check(&self) -> GatewayResult<()> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(transport)?;
        expect_success(response).await.map(|_| ())
    }
}

#[async_trait]
impl StepSource for ApiClient {
    async fn load_step(
        &self,
        evaluation_id: EvaluationId,
        evaluatee_id: EvaluateeId,
        step: u32,
    ) -> GatewayResult<StepPage> {
        let url = format!(
            "{}/api/evaluations/{}/steps/{}",
            self.base_url, evaluation_id, step
        );
        let response = self
            .client
            .get(&url)
            .query(&[("evaluatee", evaluatee_id)])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(transport)?;

        let response = expect_success(response).await?;
        response
            .json::<StepPage>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AnswerGateway for ApiClient {
    async fn submit_answers(&self, batch: &AnswerBatch) -> GatewayResult<()> {
        let url = format!(
            "{}/api/evaluations/{}/steps/{}/answers",
            self.base_url, batch.evaluation_id, batch.step
        );
        let body = SubmitAnswersRequest::from(batch);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        expect_success(response).await.map(|_| ())
    }
}

fn transport(error: reqwest::Error) -> GatewayError {
    GatewayError::Transport(error.to_string())
}

async fn expect_success(response: Response) -> GatewayResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        status => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}
