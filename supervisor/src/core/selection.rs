//! Candidate selection policy
//!
//! Matching is case-insensitive. An exact identifier wins; otherwise the
//! first candidate in list order whose identifier contains the fragment.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{SupervisorError, SupervisorResult};
use crate::types::CandidateList;

/// A resolved explicit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatch {
    pub index: usize,
    /// Further candidates the fragment also matched
    pub other_matches: usize,
}

pub fn find_candidate(candidates: &CandidateList, selection: &str) -> SupervisorResult<CandidateMatch> {
    let needle = selection.trim().to_ascii_lowercase();
    let not_found = || SupervisorError::ServerNotFound {
        selection: selection.to_string(),
    };

    if needle.is_empty() {
        return Err(not_found());
    }

    if let Some(index) = candidates
        .iter()
        .position(|c| c.identifier.eq_ignore_ascii_case(&needle))
    {
        return Ok(CandidateMatch { index, other_matches: 0 });
    }

    let mut matches = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.identifier.to_ascii_lowercase().contains(&needle))
        .map(|(index, _)| index);

    let index = matches.next().ok_or_else(not_found)?;
    Ok(CandidateMatch {
        index,
        other_matches: matches.count(),
    })
}

/// Uniform pick over `len` candidates from a fixed seed
pub fn random_index(len: usize, seed: u64) -> usize {
    StdRng::seed_from_u64(seed).gen_range(0..len)
}

/// Seed derived from the wall clock
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
