use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::{CandidateDocument, RoleDescription};
use super::{ScoredItem, ScoringAdapter, ScoringError};

/// Client for the hosted inference endpoint that scores candidate batches.
pub struct InferenceScoringAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ScoreBatchRequest<'a> {
    model: &'a str,
    role: RolePayload<'a>,
    candidates: Vec<CandidatePayload<'a>>,
}

#[derive(Debug, Serialize)]
struct RolePayload<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CandidatePayload<'a> {
    id: &'a str,
    display_name: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreBatchResponse {
    results: Vec<ScoredItem>,
}

impl InferenceScoringAdapter {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ScoringError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ScoringAdapter for InferenceScoringAdapter {
    async fn score_batch(
        &self,
        role: &RoleDescription,
        documents: &[CandidateDocument],
    ) -> Result<Vec<ScoredItem>, ScoringError> {
        let request = ScoreBatchRequest {
            model: &self.model,
            role: RolePayload {
                name: &role.display_name,
                content: &role.content,
            },
            candidates: documents
                .iter()
                .map(|document| CandidatePayload {
                    id: &document.id.0,
                    display_name: &document.display_name,
                    content: &document.content,
                })
                .collect(),
        };

        debug!(
            role = %role.display_name,
            candidates = documents.len(),
            "submitting scoring batch"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ScoringError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Status {
                status: status.as_u16(),
            });
        }

        let payload: ScoreBatchResponse = response
            .json()
            .await
            .map_err(|err| ScoringError::MalformedResponse(err.to_string()))?;

        if payload.results.is_empty() && !documents.is_empty() {
            return Err(ScoringError::EmptyResponse);
        }

        Ok(payload.results)
    }
}
