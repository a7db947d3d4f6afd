//! Core business logic modules
//!
//! Pure logic with no process or network I/O; the status parser only
//! touches the filesystem through its async read helpers.

pub mod liveness;
pub mod selection;
pub mod session;
pub mod status;

pub use liveness::{Liveness, LivenessEvent, LivenessSnapshot, LivenessTracker};
pub use selection::{find_candidate, random_index, CandidateMatch};
pub use session::{HandshakeResult, Session, SessionPhase};
pub use status::{parse_status, read_status, remove_status};
