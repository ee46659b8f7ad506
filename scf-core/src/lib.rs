//! The continuity engine.
//!
//! Every operation here is pure over `&mut Buildstate` with an injected
//! clock; file I/O lives in `scf-store` and the CLI. Keeping the engine
//! fs-free is what makes it testable without temp directories.

mod error;
mod ids;
mod learn;
mod record;
mod retention;
mod session;
mod staleness;

pub use error::CoreError;
pub use ids::entry_id;
pub use learn::{promote_pattern, seed_patterns, suggest_patterns};
pub use record::{
    add_decision, add_pattern, add_task, complete_task, push_next_step, set_focus,
};
pub use retention::{RetentionCaps, RetentionTrim, apply_retention};
pub use session::{end_session, start_session};
pub use staleness::{Staleness, staleness};
