use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use super::domain::{ScoredCandidateRecord, SessionToken};

/// Issues monotonically increasing session tokens and remembers the latest.
///
/// A gate belongs to one consumer: starting a new run on it supersedes that
/// consumer's previous run, while runs tagged against other gates are
/// untouched. Cancellation is cooperative: in-flight scoring calls for a
/// stale token are not killed, their records are discarded at consumption
/// time instead.
#[derive(Debug, Default)]
pub struct SessionGate {
    latest: AtomicU64,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issue the next token, invalidating every previously issued one.
    pub fn issue(&self) -> SessionToken {
        SessionToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` still identifies the active run.
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Single-reader stream of completed records for one screening run.
///
/// Records from one batch arrive together and in batch-internal order;
/// batches interleave in whatever order they complete. The stream ends once
/// every batch has reported, success or failure alike. Abandoning the stream
/// early is allowed; the remaining batches still run to completion.
#[derive(Debug)]
pub struct RecordStream {
    receiver: mpsc::UnboundedReceiver<Vec<ScoredCandidateRecord>>,
    pending: VecDeque<ScoredCandidateRecord>,
}

impl RecordStream {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<Vec<ScoredCandidateRecord>>) -> Self {
        Self {
            receiver,
            pending: VecDeque::new(),
        }
    }

    /// Next completed record, or `None` once every batch has reported.
    pub async fn next_record(&mut self) -> Option<ScoredCandidateRecord> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            match self.receiver.recv().await {
                Some(records) => self.pending.extend(records),
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_and_supersede() {
        let gate = SessionGate::new();
        let first = gate.issue();
        assert!(gate.is_current(first));

        let second = gate.issue();
        assert!(second.0 > first.0);
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[test]
    fn fresh_gate_has_no_current_token() {
        let gate = SessionGate::default();
        assert!(!gate.is_current(SessionToken(1)));
    }
}
