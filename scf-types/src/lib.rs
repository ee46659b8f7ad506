//! Shared DTOs (schemas-as-code) for the scf workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod buildstate;
pub mod patterns;
pub mod wire;

/// Schema identifiers.
pub mod schema {
    pub const SCF_BUILDSTATE_V1: &str = "scf.buildstate.v1";
    pub const SCF_PATTERNS_V1: &str = "scf.patterns.v1";
}
