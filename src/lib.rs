//! # Pairing Engine
//!
//! Standings and round pairing for Swiss, round-robin and two-phase group
//! tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (competitors, matchups, results, groups)
//! - **calculate**: Standings, tie-breaks, clinch detection and team records
//! - **constraints**: Rematch and same-team tracking, first-move balancing
//! - **pairing**: Pairing strategies behind the `PairingEngine`
//! - **schedule**: Round-robin fixtures and the two-phase group format
//! - **lock**: Round lock-state rules
//! - **export**: Flat per-table projection of a round
//! - **storage**: JSONL files for the command-line front end
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod constraints;
pub mod export;
pub mod lock;
pub mod models;
pub mod pairing;
pub mod schedule;
pub mod storage;

pub use models::*;

/// Split a manual pairing argument of the form `left:right`.
///
/// Both sides are trimmed; either side being empty is rejected.
pub fn parse_pair(s: &str) -> Option<(String, String)> {
    let (left, right) = s.split_once(':')?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}
