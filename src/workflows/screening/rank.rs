use super::domain::ScoredCandidateRecord;

/// Sort records for presentation: highest match score first, candidate names
/// ascending on ties. The sort is stable, so repeated renders of the same
/// data come out byte-for-byte identical.
pub fn rank_records(mut records: Vec<ScoredCandidateRecord>) -> Vec<ScoredCandidateRecord> {
    records.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.candidate_name.cmp(&b.candidate_name))
    });
    records
}

/// Accumulator for consumers that want ranked snapshots mid-stream.
#[derive(Debug, Default)]
pub struct RankedBoard {
    records: Vec<ScoredCandidateRecord>,
}

impl RankedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ScoredCandidateRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ranked view of everything received so far.
    pub fn snapshot(&self) -> Vec<ScoredCandidateRecord> {
        rank_records(self.records.clone())
    }

    /// Consume the board into the final ranked set.
    pub fn into_ranked(self) -> Vec<ScoredCandidateRecord> {
        rank_records(self.records)
    }
}
