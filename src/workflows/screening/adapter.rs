use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{CandidateDocument, DocumentId, RoleDescription};

pub mod http;

/// One scored entry returned by the inference service.
///
/// Scores arrive as raw integers; the orchestrator clamps them into 0..=100
/// before they reach consumers. Extraction fields may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub document_id: DocumentId,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub email: String,
    pub match_score: i64,
    pub compatibility_score: i64,
    #[serde(default)]
    pub key_skills: String,
    #[serde(default)]
    pub feedback: String,
}

/// Error enumeration for scoring transport and decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring transport failed: {0}")]
    Transport(String),
    #[error("scoring endpoint returned status {status}")]
    Status { status: u16 },
    #[error("scoring response could not be decoded: {0}")]
    MalformedResponse(String),
    #[error("scoring endpoint returned no results")]
    EmptyResponse,
}

/// Boundary to the hosted inference service that scores candidate batches.
///
/// Implementations send one request per batch and are expected, not required,
/// to return one item per input document. Responses are correlated strictly by
/// `DocumentId`; callers must tolerate missing and reordered items.
#[async_trait]
pub trait ScoringAdapter: Send + Sync {
    async fn score_batch(
        &self,
        role: &RoleDescription,
        documents: &[CandidateDocument],
    ) -> Result<Vec<ScoredItem>, ScoringError>;
}
