//! Refinement loop state: phases, stopping policy, round records and sessions.
//!
//! Everything here is pure. The async orchestration that drives it lives in
//! `application::handlers::refine_presentation`.

mod phase;
mod record;
mod result;
mod session;
mod stopping;

pub use phase::RefinementPhase;
pub use record::{addressed_types, RoundRecord};
pub use result::SessionResult;
pub use session::{RefinementSession, SessionStatus};
pub use stopping::{
    CandidateVerdict, StopReason, StoppingPolicy, CONVERGENCE_GAP, DEFAULT_MIN_IMPROVEMENT,
    PLATEAU_DELTA,
};
