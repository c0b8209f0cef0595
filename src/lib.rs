//! NaoNav - Sonar-guided exploration and control for the NAO humanoid
//!
//! This library provides the building blocks for autonomous room
//! exploration on a NAO robot, plus the scripted control behaviors the
//! menu front-end dispatches to.
//!
//! ## Architecture
//!
//! - [`services`]: `MotionService` / `PostureService` / `SensorService`
//!   traits with two implementations - a TCP client to a NAOqi bridge
//!   daemon, and a simulated robot for hardware-free runs
//! - [`map`]: fixed-size occupancy grid with visit history and snapshot
//!   persistence
//! - [`sonar`]: distance sensing adapter (failures become a far default)
//! - [`walk`]: sonar-guided walk controller with guaranteed halt
//! - [`exploration`]: frontier selection heuristic, per-step exploration
//!   logic, and the worker-thread session
//! - [`control`]: postures, head scans, and balance readout
//!
//! ## Exploration loop
//!
//! ```text
//! sense sonar -> register obstacles -> pick frontier -> walk 0.3m
//!      ^                                                    |
//!      +--- update grid position / mark blocked cell <------+
//! ```
//!
//! The loop runs on one dedicated worker thread and terminates on an
//! explicit stop request, an explored-cell budget, or when no traversable
//! neighbor remains. The final map is persisted as a timestamped JSON
//! snapshot.

pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod exploration;
pub mod map;
pub mod services;
pub mod sonar;
pub mod walk;

// Re-export commonly used types
pub use config::NavConfig;
pub use crate::core::Pose2D;
pub use error::{NavError, Result};
pub use exploration::ExplorationSession;
pub use map::RoomMap;
pub use services::Robot;
