use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for role descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(pub String);

/// Identifier wrapper for candidate documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Monotonic token identifying one screening run. Captured immutably when the
/// run starts; records arriving under a superseded token are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

/// Read-only description of the role candidates are screened against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescription {
    pub id: RoleId,
    pub display_name: String,
    pub content: String,
    pub source_document: String,
}

/// Immutable candidate input submitted to a screening run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub id: DocumentId,
    pub display_name: String,
    pub content: String,
}

impl CandidateDocument {
    /// Display name without its trailing file extension, used as the
    /// candidate-name fallback when extraction yields nothing.
    pub fn display_stem(&self) -> &str {
        match self.display_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.display_name,
        }
    }
}

/// Tag distinguishing adapter-scored records from synthesized placeholders.
/// Both carry the same shape, so consumers render them uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDisposition {
    Scored,
    Failed,
}

impl ScoreDisposition {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreDisposition::Scored => "scored",
            ScoreDisposition::Failed => "failed",
        }
    }
}

/// One screening result per submitted candidate document.
///
/// A failed unit still produces a record: zeroed scores, empty extraction
/// fields, and the diagnostic carried in `feedback`. Scores are always within
/// 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidateRecord {
    pub document_id: DocumentId,
    pub candidate_name: String,
    pub email: String,
    pub match_score: u8,
    pub compatibility_score: u8,
    pub key_skills: String,
    pub feedback: String,
    pub source_document: String,
    pub disposition: ScoreDisposition,
}

/// Finalized screening run: one ranked record per submitted document.
/// Never mutated after finalization; a newer session supersedes it instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningSession {
    pub token: SessionToken,
    pub role_id: RoleId,
    pub role_name: String,
    pub started_at: DateTime<Utc>,
    pub records: Vec<ScoredCandidateRecord>,
}

impl ScreeningSession {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
