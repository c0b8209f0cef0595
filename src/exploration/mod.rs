//! Autonomous room exploration.
//!
//! [`frontier`] scores candidate directions, [`explorer`] runs the
//! sense-map-move cycle, and [`session`] owns the worker thread and its
//! lifecycle.

pub mod explorer;
pub mod frontier;
pub mod session;

pub use explorer::{Explorer, StepOutcome};
pub use frontier::{Direction, FrontierConfig, FrontierSelector, ScoredDirection};
pub use session::ExplorationSession;
