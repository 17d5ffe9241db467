use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::screening::adapter::{ScoredItem, ScoringAdapter, ScoringError};
use crate::workflows::screening::domain::{
    CandidateDocument, DocumentId, RoleDescription, RoleId,
};
use crate::workflows::screening::{ScreeningConfig, ScreeningService};

const SLOW_CALL_DELAY: Duration = Duration::from_millis(200);

/// Scripted adapter standing in for the hosted inference endpoint.
pub(super) struct StubAdapter {
    pub(super) base_score: i64,
    pub(super) score_overrides: HashMap<String, i64>,
    pub(super) omit_ids: HashSet<String>,
    pub(super) fail_ids: HashSet<String>,
    pub(super) slow_ids: HashSet<String>,
    pub(super) fail_first_calls: AtomicU32,
    pub(super) delay: Option<Duration>,
    pub(super) calls: AtomicUsize,
    pub(super) current: AtomicUsize,
    pub(super) peak: AtomicUsize,
}

impl Default for StubAdapter {
    fn default() -> Self {
        Self {
            base_score: 50,
            score_overrides: HashMap::new(),
            omit_ids: HashSet::new(),
            fail_ids: HashSet::new(),
            slow_ids: HashSet::new(),
            fail_first_calls: AtomicU32::new(0),
            delay: None,
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl StubAdapter {
    pub(super) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn respond(&self, documents: &[CandidateDocument]) -> Result<Vec<ScoredItem>, ScoringError> {
        let transient_failure = self
            .fail_first_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if transient_failure {
            return Err(ScoringError::Transport(
                "injected transient failure".to_string(),
            ));
        }

        if documents.iter().any(|doc| self.fail_ids.contains(&doc.id.0)) {
            return Err(ScoringError::Transport(
                "simulated network error: connection reset by peer".to_string(),
            ));
        }

        Ok(documents
            .iter()
            .filter(|doc| !self.omit_ids.contains(&doc.id.0))
            .map(|doc| {
                let score = self
                    .score_overrides
                    .get(&doc.id.0)
                    .copied()
                    .unwrap_or(self.base_score);
                ScoredItem {
                    document_id: doc.id.clone(),
                    candidate_name: format!("Candidate {}", doc.display_stem()),
                    email: format!("{}@example.com", doc.display_stem()),
                    match_score: score,
                    compatibility_score: (score - 5).max(0),
                    key_skills: "Rust, Distributed Systems".to_string(),
                    feedback: "screened by stub".to_string(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ScoringAdapter for StubAdapter {
    async fn score_batch(
        &self,
        _role: &RoleDescription,
        documents: &[CandidateDocument],
    ) -> Result<Vec<ScoredItem>, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if documents.iter().any(|doc| self.slow_ids.contains(&doc.id.0)) {
            tokio::time::sleep(SLOW_CALL_DELAY).await;
        }

        let result = self.respond(documents);
        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub(super) fn role() -> RoleDescription {
    RoleDescription {
        id: RoleId("backend-engineer".to_string()),
        display_name: "Backend Engineer".to_string(),
        content: "Own the ingestion pipeline; Rust and PostgreSQL required.".to_string(),
        source_document: "backend-engineer.md".to_string(),
    }
}

pub(super) fn documents(count: usize) -> Vec<CandidateDocument> {
    (0..count)
        .map(|index| CandidateDocument {
            id: DocumentId(format!("cand-{index:03}")),
            display_name: format!("candidate-{index:03}.pdf"),
            content: format!("resume body {index}"),
        })
        .collect()
}

pub(super) fn config(batch_size: usize, max_in_flight: usize) -> ScreeningConfig {
    ScreeningConfig {
        batch_size,
        max_in_flight,
        max_attempts: 1,
    }
}

pub(super) fn service_with(
    adapter: StubAdapter,
    config: ScreeningConfig,
) -> (Arc<StubAdapter>, ScreeningService<StubAdapter>) {
    let adapter = Arc::new(adapter);
    let service = ScreeningService::new(adapter.clone(), config);
    (adapter, service)
}
