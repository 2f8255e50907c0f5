//! Core data models for the pairing engine.

mod competitor;
mod group;
mod ids;
mod matchup;
mod result;
mod snapshot;
mod standing;

pub use competitor::*;
pub use group::*;
pub use ids::*;
pub use matchup::*;
pub use result::*;
pub use snapshot::*;
pub use standing::*;
