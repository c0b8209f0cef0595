//! Fundamental types shared across the crate.

pub mod math;
pub mod pose;

pub use pose::Pose2D;
