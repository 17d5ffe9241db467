use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::adapter::ScoringAdapter;
use super::domain::{
    CandidateDocument, RoleDescription, RoleId, ScoreDisposition, ScoredCandidateRecord,
};
use super::service::ScreeningService;

/// Router builder exposing the bulk screening endpoint.
pub fn screening_router<A>(service: Arc<ScreeningService<A>>) -> Router
where
    A: ScoringAdapter + 'static,
{
    Router::new()
        .route("/api/v1/screening/sessions", post(screen_handler::<A>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScreeningRequest {
    pub(crate) role: RoleDescription,
    pub(crate) candidates: Vec<CandidateDocument>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScreeningResponse {
    pub(crate) token: u64,
    pub(crate) role_id: RoleId,
    pub(crate) role_name: String,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) submitted: usize,
    pub(crate) scored: usize,
    pub(crate) failed: usize,
    pub(crate) records: Vec<ScoredCandidateRecord>,
}

pub(crate) async fn screen_handler<A>(
    State(service): State<Arc<ScreeningService<A>>>,
    axum::Json(request): axum::Json<ScreeningRequest>,
) -> Response
where
    A: ScoringAdapter + 'static,
{
    let submitted = request.candidates.len();

    match service
        .run_to_completion(request.role, request.candidates)
        .await
    {
        Ok(session) => {
            let failed = session
                .records
                .iter()
                .filter(|record| record.disposition == ScoreDisposition::Failed)
                .count();
            let view = ScreeningResponse {
                token: session.token.0,
                role_id: session.role_id,
                role_name: session.role_name,
                started_at: session.started_at,
                submitted,
                scored: session.records.len() - failed,
                failed,
                records: session.records,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
