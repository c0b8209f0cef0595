//! Exploration loop: sense, map, select, move.

use std::f32::consts::FRAC_PI_4;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::NavConfig;
use crate::exploration::frontier::{FrontierSelector, ScoredDirection};
use crate::map::RoomMap;
use crate::services::Robot;
use crate::sonar::SonarAdapter;
use crate::walk::WalkController;

/// Result of one exploration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Moved one step in the chosen direction
    Moved(ScoredDirection),
    /// Walk failed; target cell marked as an obstacle
    Blocked(ScoredDirection),
    /// No traversable neighbor remains (terminal)
    NoDirection,
    /// The walk was cancelled by a stop request
    Cancelled,
}

/// Runs the per-step exploration cycle against a [`RoomMap`].
pub struct Explorer {
    map: RoomMap,
    selector: FrontierSelector,
    walk: WalkController,
    sonar: SonarAdapter,
    step_distance: f32,
    step_speed: f32,
    obstacle_register_range: f32,
    cell_budget: u32,
    step_pause: Duration,
}

impl Explorer {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            map: RoomMap::new(
                config.map.width,
                config.map.height,
                config.map.resolution,
                config.map.history_capacity,
            ),
            selector: FrontierSelector::new(config.frontier.clone()),
            walk: WalkController::new(config.walk.clone()),
            sonar: SonarAdapter::new(config.walk.sonar_default_range),
            step_distance: config.exploration.step_distance,
            step_speed: config.exploration.step_speed,
            obstacle_register_range: config.exploration.obstacle_register_range,
            cell_budget: config.exploration.cell_budget,
            step_pause: Duration::from_millis(config.exploration.step_pause_ms),
        }
    }

    pub fn map(&self) -> &RoomMap {
        &self.map
    }

    /// Cancellation handle for the inner walk controller.
    pub fn walk_stop_handle(&self) -> std::sync::Arc<AtomicBool> {
        self.walk.stop_handle()
    }

    /// One sense -> map -> select -> move cycle.
    pub fn step(&mut self, robot: &mut Robot) -> StepOutcome {
        // Register close sonar returns into the map, one per side at
        // ±45° off the current heading. Grid Y grows downward, so the
        // robot's left side is the negative relative angle.
        let reading = self.sonar.read(robot.sensors.as_mut());
        if reading.left < self.obstacle_register_range {
            self.map.add_obstacle(reading.left, -FRAC_PI_4);
        }
        if reading.right < self.obstacle_register_range {
            self.map.add_obstacle(reading.right, FRAC_PI_4);
        }

        let Some(choice) = self.selector.best_direction(&self.map) else {
            return StepOutcome::NoDirection;
        };

        tracing::debug!(
            "Best direction: {} (score {:.0})",
            choice.direction.name(),
            choice.score
        );

        let moved = self.walk.move_forward(
            robot.motion.as_mut(),
            robot.sensors.as_mut(),
            self.step_distance,
            self.step_speed,
        );

        if self.walk.is_cancelled() {
            return StepOutcome::Cancelled;
        }

        let (dx, dy) = choice.direction.step();
        if moved {
            self.map.update_position(
                dx as f32 * self.step_distance,
                dy as f32 * self.step_distance,
                choice.direction.heading(),
            );
            StepOutcome::Moved(choice)
        } else {
            // Blocked without a usable sonar return: mark the target
            // cell directly
            let (rx, ry) = self.map.robot_cell();
            self.map.mark_blocked(rx as i32 + dx, ry as i32 + dy);
            StepOutcome::Blocked(choice)
        }
    }

    /// Run the exploration loop until `active` is cleared, the explored-
    /// cell budget is reached, or no direction remains.
    ///
    /// The robot is locked per step so that callers keep access to it
    /// between steps.
    pub fn run(&mut self, robot: &Mutex<Robot>, active: &AtomicBool) {
        let mut step_count = 0u32;

        while active.load(Ordering::Acquire) {
            step_count += 1;

            let outcome = {
                let mut robot = match robot.lock() {
                    Ok(guard) => guard,
                    Err(e) => {
                        tracing::error!("Robot services poisoned, stopping: {}", e);
                        break;
                    }
                };
                self.step(&mut robot)
            };

            match outcome {
                StepOutcome::Moved(choice) => {
                    let (x, y) = self.map.robot_cell();
                    tracing::info!(
                        "Step {}: moved {} to ({}, {}), {} cells explored",
                        step_count,
                        choice.direction.name(),
                        x,
                        y,
                        self.map.cells_explored()
                    );
                }
                StepOutcome::Blocked(choice) => {
                    tracing::warn!(
                        "Step {}: blocked heading {}",
                        step_count,
                        choice.direction.name()
                    );
                }
                StepOutcome::NoDirection => {
                    tracing::info!("No direction available, stopping exploration");
                    break;
                }
                StepOutcome::Cancelled => {
                    tracing::info!("Exploration cancelled mid-walk");
                    break;
                }
            }

            if self.map.cells_explored() >= self.cell_budget {
                tracing::info!(
                    "Explored-cell budget reached ({}), stopping",
                    self.cell_budget
                );
                break;
            }

            if !active.load(Ordering::Acquire) {
                break;
            }
            if !self.step_pause.is_zero() {
                std::thread::sleep(self.step_pause);
            }
        }

        tracing::debug!("Final map:\n{}", self.map.render());
    }
}
