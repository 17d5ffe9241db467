use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

use super::batch::Batch;
use super::domain::ScoredCandidateRecord;

/// Dispatch every batch through `task`, keeping at most `max_in_flight`
/// scoring calls outstanding at once.
///
/// Each batch runs as its own task; a permit is one outstanding call, and a
/// slot frees the moment a batch completes, success or failure alike. Each
/// task posts its finished records as one message on `sender`, so a batch is
/// emitted the moment its outcome is known without waiting on siblings. The
/// stream ends when the last task drops its sender clone.
///
/// Callers validate `max_in_flight >= 1` before dispatching; a zero cap is a
/// configuration error, not a runtime condition.
pub(crate) fn dispatch_batches<F, Fut>(
    batches: Vec<Batch>,
    max_in_flight: usize,
    sender: mpsc::UnboundedSender<Vec<ScoredCandidateRecord>>,
    task: F,
) where
    F: Fn(Batch) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Vec<ScoredCandidateRecord>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_in_flight));
    let task = Arc::new(task);

    for batch in batches {
        let semaphore = Arc::clone(&semaphore);
        let task = Arc::clone(&task);
        let sender = sender.clone();

        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();

            let index = batch.index;
            let records = task(batch).await;
            debug!(batch = index, records = records.len(), "batch complete");

            // The consumer may have walked away; the batch still ran to
            // completion and its records are simply dropped.
            let _ = sender.send(records);
        });
    }
}
