//! Sonar-guided walk controller.
//!
//! Issues a continuous forward command and polls the sonar at a fixed
//! interval, halting on an obstacle return, on the requested distance
//! being covered (odometry from successive pose reads), on cancellation,
//! or on any service error. The motion is stopped on every exit path -
//! the robot is never left walking.
//!
//! State machine: `Idle -> Moving -> (StoppedByObstacle |
//! StoppedByDistance) -> Idle` (cancellation and errors return straight
//! to `Idle`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::WalkConfig;
use crate::services::{MotionService, SensorService};
use crate::sonar::SonarAdapter;

/// Walk controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WalkState {
    #[default]
    Idle,
    Moving,
    StoppedByObstacle,
    StoppedByDistance,
}

/// Why the polling loop ended.
enum Outcome {
    Obstacle,
    Distance,
    Cancelled,
    Error,
}

pub struct WalkController {
    config: WalkConfig,
    sonar: SonarAdapter,
    state: WalkState,
    stop_requested: Arc<AtomicBool>,
    /// Distance covered by the most recent walk (meters)
    last_traveled: f32,
}

impl WalkController {
    pub fn new(config: WalkConfig) -> Self {
        let sonar = SonarAdapter::new(config.sonar_default_range);
        Self {
            config,
            sonar,
            state: WalkState::Idle,
            stop_requested: Arc::new(AtomicBool::new(false)),
            last_traveled: 0.0,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Distance covered by the most recent walk, in meters.
    pub fn distance_covered(&self) -> f32 {
        self.last_traveled
    }

    /// Handle for cancelling an in-progress walk from another thread.
    /// The request is observed at the next poll boundary.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }

    /// Request cancellation of an in-progress walk.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Clear a previous cancellation request before a new walk.
    pub fn reset(&self) {
        self.stop_requested.store(false, Ordering::Release);
    }

    /// Walk forward up to `target_distance` meters at the given
    /// normalized speed.
    ///
    /// Returns `true` only when the robot actually covered more than the
    /// configured minimum - an immediately-blocked walk is a failure even
    /// though the obstacle stop itself is normal behavior. Cancellation
    /// and service errors always return `false`.
    pub fn move_forward(
        &mut self,
        motion: &mut dyn MotionService,
        sensors: &mut dyn SensorService,
        target_distance: f32,
        speed: f32,
    ) -> bool {
        let start = match motion.get_position() {
            Ok(pose) => pose,
            Err(e) => {
                tracing::warn!("Walk aborted, no start position: {}", e);
                self.halt(motion);
                return false;
            }
        };

        self.state = WalkState::Moving;
        self.last_traveled = 0.0;

        if let Err(e) = motion.move_toward(speed, 0.0, 0.0) {
            tracing::warn!("Walk aborted, move command failed: {}", e);
            self.halt(motion);
            self.state = WalkState::Idle;
            return false;
        }

        tracing::debug!(
            "Walking: target {:.2}m at speed {:.2}",
            target_distance,
            speed
        );

        let outcome = loop {
            if self.stop_requested.load(Ordering::Acquire) {
                tracing::info!("Walk cancelled");
                break Outcome::Cancelled;
            }

            let reading = self.sonar.read(sensors);
            if reading.below(self.config.obstacle_threshold) {
                tracing::info!(
                    "Obstacle at L {:.2}m / R {:.2}m, halting",
                    reading.left,
                    reading.right
                );
                break Outcome::Obstacle;
            }

            match motion.get_position() {
                Ok(pose) => {
                    self.last_traveled = start.distance_to(pose);
                    if self.last_traveled >= target_distance {
                        break Outcome::Distance;
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk aborted, position read failed: {}", e);
                    break Outcome::Error;
                }
            }

            std::thread::sleep(self.poll_interval());
        };

        // Guaranteed halt: exactly one stop command on every path out of
        // the polling loop.
        self.halt(motion);

        if let Ok(pose) = motion.get_position() {
            self.last_traveled = start.distance_to(pose);
        }

        self.state = match outcome {
            Outcome::Obstacle => WalkState::StoppedByObstacle,
            Outcome::Distance => WalkState::StoppedByDistance,
            Outcome::Cancelled | Outcome::Error => WalkState::Idle,
        };

        match outcome {
            Outcome::Cancelled | Outcome::Error => false,
            _ => {
                let success = self.last_traveled > self.config.min_travel;
                tracing::debug!(
                    "Walk finished: {:.2}m covered, success={}",
                    self.last_traveled,
                    success
                );
                success
            }
        }
    }

    fn halt(&self, motion: &mut dyn MotionService) {
        if let Err(e) = motion.stop_move() {
            tracing::error!("Failed to stop motion: {}", e);
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }
}
