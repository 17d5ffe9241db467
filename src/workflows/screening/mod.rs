//! Bulk screening orchestration: batch partitioning, bounded scoring
//! dispatch, failure isolation, incremental result streaming, and ranking.

pub mod adapter;
pub mod batch;
pub mod domain;
mod isolation;
pub mod rank;
pub mod router;
mod scheduler;
pub mod service;
pub mod stream;

#[cfg(test)]
mod tests;

pub use adapter::{ScoredItem, ScoringAdapter, ScoringError};
pub use batch::{partition_batches, Batch};
pub use domain::{
    CandidateDocument, DocumentId, RoleDescription, RoleId, ScoreDisposition,
    ScoredCandidateRecord, ScreeningSession, SessionToken,
};
pub use rank::{rank_records, RankedBoard};
pub use router::screening_router;
pub use service::{ScreeningConfig, ScreeningError, ScreeningRun, ScreeningService};
pub use stream::{RecordStream, SessionGate};
