//! The workout session façade.
//!
//! A `Session` owns at most one live `SessionTimer`, the task driving it and
//! the summary of the last finished workout. Plans come from a `PlanStore`
//! and finished workouts go to a `PersistenceGateway`; both are the
//! `DocumentStore` unless a caller injects something else.

#[allow(clippy::module_inception)]
mod session;
mod summary;
mod workout;

pub use session::{Session, SessionSettings};
pub use summary::SessionSummary;
pub use workout::{UP_NEXT_COUNT, WorkoutView};
