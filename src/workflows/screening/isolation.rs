use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use super::adapter::{ScoredItem, ScoringAdapter};
use super::batch::Batch;
use super::domain::{CandidateDocument, DocumentId, RoleDescription, ScoreDisposition, ScoredCandidateRecord};

/// Longest diagnostic carried on a failure record. Transport errors can quote
/// entire response bodies; anything past this is cut before reaching consumers.
pub(crate) const DIAGNOSTIC_LIMIT: usize = 200;

const RETRY_BACKOFF_MS: u64 = 250;

/// Tagged result of one batch call, constructed only at this boundary.
/// Everything downstream consumes records; no error type escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BatchOutcome {
    Scored(Vec<ScoredItem>),
    Failed(String),
}

/// Invoke the adapter for one batch, retrying within bounds, and convert the
/// result into an outcome value. A batch that exhausts its attempts degrades
/// to failure records for its own documents only.
pub(crate) async fn call_with_isolation<A>(
    adapter: &A,
    role: &RoleDescription,
    batch: &Batch,
    max_attempts: u32,
) -> BatchOutcome
where
    A: ScoringAdapter + ?Sized,
{
    let attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match adapter.score_batch(role, &batch.documents).await {
            Ok(items) => return BatchOutcome::Scored(items),
            Err(err) => {
                last_error = err.to_string();
                warn!(
                    batch = batch.index,
                    attempt,
                    error = %last_error,
                    "scoring call failed"
                );
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)))
                        .await;
                }
            }
        }
    }

    BatchOutcome::Failed(truncate_diagnostic(&last_error))
}

/// Expand a batch outcome into exactly one record per submitted document.
///
/// Items correlate by document id; a document the adapter skipped gets a
/// failure record of its own while the rest of the batch scores normally.
pub(crate) fn records_for_outcome(batch: &Batch, outcome: BatchOutcome) -> Vec<ScoredCandidateRecord> {
    match outcome {
        BatchOutcome::Scored(items) => {
            let mut by_id: HashMap<DocumentId, ScoredItem> = items
                .into_iter()
                .map(|item| (item.document_id.clone(), item))
                .collect();

            batch
                .documents
                .iter()
                .map(|document| match by_id.remove(&document.id) {
                    Some(item) => scored_record(document, item),
                    None => failure_record(document, "no scored item returned for this document"),
                })
                .collect()
        }
        BatchOutcome::Failed(diagnostic) => batch
            .documents
            .iter()
            .map(|document| failure_record(document, &diagnostic))
            .collect(),
    }
}

fn scored_record(document: &CandidateDocument, item: ScoredItem) -> ScoredCandidateRecord {
    let candidate_name = if item.candidate_name.trim().is_empty() {
        document.display_stem().to_string()
    } else {
        item.candidate_name
    };

    ScoredCandidateRecord {
        document_id: document.id.clone(),
        candidate_name,
        email: item.email,
        match_score: clamp_score(item.match_score),
        compatibility_score: clamp_score(item.compatibility_score),
        key_skills: item.key_skills,
        feedback: item.feedback,
        source_document: document.display_name.clone(),
        disposition: ScoreDisposition::Scored,
    }
}

fn failure_record(document: &CandidateDocument, diagnostic: &str) -> ScoredCandidateRecord {
    ScoredCandidateRecord {
        document_id: document.id.clone(),
        candidate_name: document.display_stem().to_string(),
        email: String::new(),
        match_score: 0,
        compatibility_score: 0,
        key_skills: String::new(),
        feedback: truncate_diagnostic(diagnostic),
        source_document: document.display_name.clone(),
        disposition: ScoreDisposition::Failed,
    }
}

/// Adapter-reported scores are expected to respect 0..=100 already; clamp
/// defensively so the invariant holds regardless.
fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

fn truncate_diagnostic(raw: &str) -> String {
    match raw.char_indices().nth(DIAGNOSTIC_LIMIT) {
        Some((cut, _)) => raw[..cut].to_string(),
        None => raw.to_string(),
    }
}
