//! Answer collection and party compatibility scoring.

pub mod domain;
mod engine;
mod ranking;
pub mod session;
mod weights;

pub use domain::{
    Answers, InvariantViolation, Party, PartyId, PartyPosition, PositionDetail, ScoredResult,
    Stance, Thesis, ThesisId,
};
pub use engine::score;
pub use ranking::{rank, top_result};
pub use session::{Cursor, MatchSession, Progress, SessionError};
pub use weights::{toggle_weight, WeightSet};
