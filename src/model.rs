//! Core data model for the solver.
//!
//! These types carry state between the layers of a run:
//! the hive being solved, the browser session held across attempts,
//! and the results that guarded steps and whole attempts report upward.

mod hive;
mod outcome;
mod session;

pub use hive::{HIVE_SIZE, Hive};
pub use outcome::{AttemptOutcome, StepResult, StopAction};
pub use session::{ElementId, Session, SessionId};
