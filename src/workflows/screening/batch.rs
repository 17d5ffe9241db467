use super::domain::CandidateDocument;

/// Ephemeral grouping of candidate documents submitted in one scoring call.
/// Exists only for the duration of that call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub documents: Vec<CandidateDocument>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Split documents into fixed-size batches, preserving submission order.
/// The final batch may hold fewer than `batch_size` documents.
pub fn partition_batches(documents: Vec<CandidateDocument>, batch_size: usize) -> Vec<Batch> {
    let size = batch_size.max(1);
    let mut batches = Vec::with_capacity((documents.len() + size - 1) / size);
    let mut current = Vec::with_capacity(size);

    for document in documents {
        current.push(document);
        if current.len() == size {
            batches.push(Batch {
                index: batches.len(),
                documents: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            documents: current,
        });
    }

    batches
}
