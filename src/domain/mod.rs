//! Domain Layer - Core scanning logic
//!
//! Pure types and functions with no I/O:
//! - `pair`: raw DexScreener records, normalization, venue gate
//! - `score`: bounded tradeability score
//! - `card`: persisted candidate card and block record

pub mod card;
pub mod pair;
pub mod score;

pub use card::{BlockRecord, CandidateCard, LiquidityRef};
pub use pair::{
    normalize_batch, normalize_pair, ActivityGate, CanonicalPair, RawPairRecord, VenueKind,
};
pub use score::{score_metrics, score_pair, Score, MAX_SCORE, MIN_SCORE};
