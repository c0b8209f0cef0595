//! Simulated robot for hardware-free runs.
//!
//! Integrates the commanded walk velocity into a pose and ray-casts the
//! two sonar beams against the walls of a rectangular room. Postures and
//! joint angles are plain bookkeeping. With `sonar_noise` at zero the
//! simulation is deterministic, which the integration tests rely on.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use rand::Rng;

use crate::config::SimulationConfig;
use crate::core::Pose2D;
use crate::error::{NavError, Result};

use super::{MotionService, PostureService, Robot, SensorKey, SensorService};

/// Sonar beams point forward, angled out from the torso.
const SONAR_BEAM_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

/// NAO ultrasound range limits (meters).
const SONAR_MIN_RANGE: f32 = 0.25;
const SONAR_MAX_RANGE: f32 = 2.55;

/// Longest time slice integrated in one step. Commands are expected to
/// be refreshed far more often than this.
const MAX_STEP_SECS: f32 = 0.5;

/// Shared simulation state. One instance backs all three service handles.
struct SimState {
    config: SimulationConfig,
    pose: Pose2D,
    /// Normalized velocity command (vx, vy, omega)
    command: (f32, f32, f32),
    last_update: Instant,
    awake: bool,
    posture: String,
    joints: HashMap<String, f32>,
    sonar_tags: HashSet<String>,
}

impl SimState {
    fn new(config: &SimulationConfig) -> Self {
        let pose = Pose2D::new(
            config.room_width / 2.0,
            config.room_height / 2.0,
            config.start_theta,
        );
        Self {
            config: config.clone(),
            pose,
            command: (0.0, 0.0, 0.0),
            last_update: Instant::now(),
            awake: false,
            posture: "Crouch".to_string(),
            joints: HashMap::new(),
            sonar_tags: HashSet::new(),
        }
    }

    /// Integrate the current command over the elapsed wall-clock time.
    fn advance(&mut self) {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_update)
            .as_secs_f32()
            .min(MAX_STEP_SECS);
        self.last_update = now;

        if !self.awake {
            return;
        }

        let (vx, vy, omega) = self.command;
        if vx == 0.0 && vy == 0.0 && omega == 0.0 {
            return;
        }

        let lin = self.config.max_linear_speed;
        let (sin, cos) = self.pose.theta.sin_cos();
        let wx = (vx * cos - vy * sin) * lin;
        let wy = (vx * sin + vy * cos) * lin;

        let r = self.config.robot_radius;
        self.pose.x = (self.pose.x + wx * dt).clamp(r, self.config.room_width - r);
        self.pose.y = (self.pose.y + wy * dt).clamp(r, self.config.room_height - r);
        self.pose.theta += omega * self.config.max_angular_speed * dt;
    }

    /// Distance from the robot to the room wall along one sonar beam.
    fn sonar_range(&self, relative_angle: f32) -> f32 {
        let angle = self.pose.theta + relative_angle;
        let (dy, dx) = angle.sin_cos();

        let mut range = f32::MAX;
        if dx > 1e-6 {
            range = range.min((self.config.room_width - self.pose.x) / dx);
        } else if dx < -1e-6 {
            range = range.min(-self.pose.x / dx);
        }
        if dy > 1e-6 {
            range = range.min((self.config.room_height - self.pose.y) / dy);
        } else if dy < -1e-6 {
            range = range.min(-self.pose.y / dy);
        }

        let noise = self.config.sonar_noise;
        if noise > 0.0 {
            range += rand::rng().random_range(-noise..=noise);
        }

        range.clamp(SONAR_MIN_RANGE, SONAR_MAX_RANGE)
    }
}

type Shared = Arc<Mutex<SimState>>;

fn lock(state: &Shared) -> Result<MutexGuard<'_, SimState>> {
    state
        .lock()
        .map_err(|_| NavError::Service("Simulation state poisoned".to_string()))
}

/// Factory for the simulated service set.
pub struct SimRobot;

impl SimRobot {
    /// Build a [`Robot`] whose three services share one simulation.
    pub fn create(config: &SimulationConfig) -> Robot {
        let state: Shared = Arc::new(Mutex::new(SimState::new(config)));
        Robot {
            motion: Box::new(SimMotion(Arc::clone(&state))),
            posture: Box::new(SimPosture(Arc::clone(&state))),
            sensors: Box::new(SimSensors(state)),
        }
    }
}

pub struct SimMotion(Shared);

impl MotionService for SimMotion {
    fn wake_up(&mut self) -> Result<()> {
        let mut state = lock(&self.0)?;
        state.advance();
        state.awake = true;
        Ok(())
    }

    fn rest(&mut self) -> Result<()> {
        let mut state = lock(&self.0)?;
        state.advance();
        state.command = (0.0, 0.0, 0.0);
        state.awake = false;
        state.posture = "Crouch".to_string();
        Ok(())
    }

    fn move_toward(&mut self, vx: f32, vy: f32, omega: f32) -> Result<()> {
        let mut state = lock(&self.0)?;
        state.advance();
        state.command = (
            vx.clamp(-1.0, 1.0),
            vy.clamp(-1.0, 1.0),
            omega.clamp(-1.0, 1.0),
        );
        Ok(())
    }

    fn stop_move(&mut self) -> Result<()> {
        let mut state = lock(&self.0)?;
        state.advance();
        state.command = (0.0, 0.0, 0.0);
        Ok(())
    }

    fn get_position(&mut self) -> Result<Pose2D> {
        let mut state = lock(&self.0)?;
        state.advance();
        Ok(state.pose)
    }

    fn set_angles(&mut self, names: &[&str], angles: &[f32], _speed: f32) -> Result<()> {
        if names.len() != angles.len() {
            return Err(NavError::Service(format!(
                "set_angles: {} names but {} angles",
                names.len(),
                angles.len()
            )));
        }
        let mut state = lock(&self.0)?;
        for (name, angle) in names.iter().zip(angles) {
            state.joints.insert((*name).to_string(), *angle);
        }
        Ok(())
    }
}

pub struct SimPosture(Shared);

impl PostureService for SimPosture {
    fn go_to_posture(&mut self, posture: &str, _speed: f32) -> Result<bool> {
        let mut state = lock(&self.0)?;
        state.advance();
        state.command = (0.0, 0.0, 0.0);
        state.posture = posture.to_string();
        Ok(true)
    }

    fn get_posture(&mut self) -> Result<String> {
        Ok(lock(&self.0)?.posture.clone())
    }
}

pub struct SimSensors(Shared);

impl SensorService for SimSensors {
    fn subscribe_sonar(&mut self, tag: &str) -> Result<()> {
        lock(&self.0)?.sonar_tags.insert(tag.to_string());
        Ok(())
    }

    fn unsubscribe_sonar(&mut self, tag: &str) -> Result<()> {
        lock(&self.0)?.sonar_tags.remove(tag);
        Ok(())
    }

    fn read(&mut self, key: SensorKey) -> Result<f32> {
        let mut state = lock(&self.0)?;
        state.advance();
        let value = match key {
            SensorKey::SonarLeft => state.sonar_range(SONAR_BEAM_ANGLE),
            SensorKey::SonarRight => state.sonar_range(-SONAR_BEAM_ANGLE),
            SensorKey::GyroscopeX | SensorKey::GyroscopeY | SensorKey::GyroscopeZ => 0.0,
            SensorKey::AccelerometerX | SensorKey::AccelerometerY => 0.0,
            SensorKey::AccelerometerZ => 9.81,
            SensorKey::BodyAngleX | SensorKey::BodyAngleY => 0.0,
            SensorKey::BatteryCharge => 0.87,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> SimulationConfig {
        SimulationConfig {
            room_width: 4.0,
            room_height: 4.0,
            start_theta: 0.0,
            max_linear_speed: 1.0,
            max_angular_speed: 1.0,
            robot_radius: 0.15,
            sonar_noise: 0.0,
        }
    }

    #[test]
    fn test_motion_integrates_command() {
        let mut robot = SimRobot::create(&test_config());
        robot.motion.wake_up().unwrap();
        let start = robot.motion.get_position().unwrap();

        robot.motion.move_toward(1.0, 0.0, 0.0).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        robot.motion.stop_move().unwrap();

        let end = robot.motion.get_position().unwrap();
        assert!(start.distance_to(end) > 0.01);

        // Stopped: no further drift
        std::thread::sleep(Duration::from_millis(30));
        let later = robot.motion.get_position().unwrap();
        assert!(end.distance_to(later) < 1e-4);
    }

    #[test]
    fn test_asleep_robot_does_not_move() {
        let mut robot = SimRobot::create(&test_config());
        let start = robot.motion.get_position().unwrap();
        robot.motion.move_toward(1.0, 0.0, 0.0).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        let end = robot.motion.get_position().unwrap();
        assert!(start.distance_to(end) < 1e-4);
    }

    #[test]
    fn test_sonar_sees_room_walls() {
        let mut robot = SimRobot::create(&test_config());
        // Centered in a 4x4 room facing +X: each beam travels
        // 2m / cos(45°) ≈ 2.83m to a wall, clamped to the sonar maximum.
        let left = robot.sensors.read(SensorKey::SonarLeft).unwrap();
        let right = robot.sensors.read(SensorKey::SonarRight).unwrap();
        assert!((left - SONAR_MAX_RANGE).abs() < 1e-3);
        assert!((right - SONAR_MAX_RANGE).abs() < 1e-3);
    }

    #[test]
    fn test_sonar_close_to_wall() {
        let config = SimulationConfig {
            room_width: 1.0,
            room_height: 1.0,
            ..test_config()
        };
        let mut robot = SimRobot::create(&config);
        // 0.5m from each wall: beam at 45° reaches one in ~0.71m
        let left = robot.sensors.read(SensorKey::SonarLeft).unwrap();
        assert!(left < 0.8, "expected a close wall, got {}", left);
    }

    #[test]
    fn test_posture_and_joints_bookkeeping() {
        let mut robot = SimRobot::create(&test_config());
        assert_eq!(robot.posture.get_posture().unwrap(), "Crouch");
        assert!(robot.posture.go_to_posture("Stand", 0.8).unwrap());
        assert_eq!(robot.posture.get_posture().unwrap(), "Stand");

        robot
            .motion
            .set_angles(&["HeadYaw"], &[0.5], 0.2)
            .unwrap();
        let mismatch = robot.motion.set_angles(&["HeadYaw", "HeadPitch"], &[0.1], 0.2);
        assert!(mismatch.is_err());
    }
}
