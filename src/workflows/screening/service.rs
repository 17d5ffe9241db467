use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use super::adapter::ScoringAdapter;
use super::batch::partition_batches;
use super::domain::{
    CandidateDocument, RoleDescription, RoleId, ScreeningSession, SessionToken,
};
use super::isolation;
use super::rank::RankedBoard;
use super::scheduler::dispatch_batches;
use super::stream::{RecordStream, SessionGate};

/// Dials governing one screening run.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    /// Documents submitted per scoring call.
    pub batch_size: usize,
    /// Cap on simultaneously outstanding scoring calls.
    pub max_in_flight: usize,
    /// Scoring attempts per batch before failure records are synthesized.
    pub max_attempts: u32,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_in_flight: 5,
            max_attempts: 2,
        }
    }
}

/// Error raised before any scoring call is issued; the session is rejected
/// whole rather than surfaced as a partial stream.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("role description has no content")]
    EmptyRole,
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
    #[error("concurrency cap must be at least 1, got {0}")]
    InvalidConcurrency(usize),
}

/// A started run: the token identifying it plus its live record stream.
pub struct ScreeningRun {
    pub token: SessionToken,
    pub role_id: RoleId,
    pub role_name: String,
    pub started_at: DateTime<Utc>,
    pub stream: RecordStream,
}

impl ScreeningRun {
    /// Drain the stream and finalize an immutable, ranked session.
    ///
    /// Each arriving record is checked against the gate; once a newer run has
    /// been issued, the remainder of this stream is discarded silently.
    pub async fn finalize(mut self, gate: &SessionGate) -> ScreeningSession {
        let mut board = RankedBoard::new();
        while let Some(record) = self.stream.next_record().await {
            if !gate.is_current(self.token) {
                continue;
            }
            board.push(record);
        }

        ScreeningSession {
            token: self.token,
            role_id: self.role_id,
            role_name: self.role_name,
            started_at: self.started_at,
            records: board.into_ranked(),
        }
    }
}

/// Facade composing the partitioner, bounded scheduler, and failure
/// isolation for bulk candidate screening. Holds no per-session state, so
/// one instance serves any number of concurrent callers.
pub struct ScreeningService<A> {
    adapter: Arc<A>,
    config: ScreeningConfig,
}

impl<A> ScreeningService<A>
where
    A: ScoringAdapter + 'static,
{
    pub fn new(adapter: Arc<A>, config: ScreeningConfig) -> Self {
        Self { adapter, config }
    }

    /// Validate and start a screening run tagged against the caller's gate.
    ///
    /// Issuing the token supersedes any earlier run started on the same gate;
    /// runs started on other gates are unrelated and keep streaming. Every
    /// submitted document yields exactly one record on the returned stream,
    /// success or failure variant; a failed batch degrades to failure records
    /// for its own documents only.
    pub fn start(
        &self,
        gate: &SessionGate,
        role: RoleDescription,
        documents: Vec<CandidateDocument>,
    ) -> Result<ScreeningRun, ScreeningError> {
        if role.content.trim().is_empty() {
            return Err(ScreeningError::EmptyRole);
        }
        if self.config.batch_size == 0 {
            return Err(ScreeningError::InvalidBatchSize(self.config.batch_size));
        }
        if self.config.max_in_flight == 0 {
            return Err(ScreeningError::InvalidConcurrency(self.config.max_in_flight));
        }

        let token = gate.issue();
        let started_at = Utc::now();
        let batches = partition_batches(documents, self.config.batch_size);

        info!(
            token = token.0,
            role = %role.display_name,
            batches = batches.len(),
            cap = self.config.max_in_flight,
            "screening session started"
        );

        let (sender, receiver) = mpsc::unbounded_channel();
        let adapter = Arc::clone(&self.adapter);
        let max_attempts = self.config.max_attempts;
        let role_id = role.id.clone();
        let role_name = role.display_name.clone();
        let role = Arc::new(role);

        dispatch_batches(batches, self.config.max_in_flight, sender, move |batch| {
            let adapter = Arc::clone(&adapter);
            let role = Arc::clone(&role);
            async move {
                let outcome =
                    isolation::call_with_isolation(adapter.as_ref(), &role, &batch, max_attempts)
                        .await;
                isolation::records_for_outcome(&batch, outcome)
            }
        });

        Ok(ScreeningRun {
            token,
            role_id,
            role_name,
            started_at,
            stream: RecordStream::new(receiver),
        })
    }

    /// Run a one-shot session to exhaustion and return the finalized, ranked
    /// session. The run drains through a gate of its own, so concurrent
    /// callers sharing this service never invalidate each other's streams.
    pub async fn run_to_completion(
        &self,
        role: RoleDescription,
        documents: Vec<CandidateDocument>,
    ) -> Result<ScreeningSession, ScreeningError> {
        let gate = SessionGate::new();
        let run = self.start(&gate, role, documents)?;
        Ok(run.finalize(&gate).await)
    }
}
