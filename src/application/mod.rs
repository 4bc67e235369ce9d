//! Application Layer - Feed and query orchestration
//!
//! - `feed`: periodic scan cycle (fetch, normalize, score, write)
//! - `writer`: candidate store writes
//! - `query`: read-only health/scan/evaluate

pub mod feed;
pub mod query;
pub mod writer;

pub use feed::{select_candidates, CycleReport, FeedConfig, FeedLoop, FeedState, Selection};
pub use query::{
    CredentialFlags, EvaluateError, EvaluateMode, Evaluation, HealthReport, QueryConfig,
    QueryService,
};
pub use writer::CandidateWriter;
