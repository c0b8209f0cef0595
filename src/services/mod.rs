//! External robot services.
//!
//! The navigation core never talks to the vendor SDK directly: every
//! motion, posture, and sensor interaction goes through the traits in
//! this module. Two implementations exist - [`bridge`] speaks to a NAOqi
//! bridge daemon over TCP, and [`sim`] runs a hardware-free simulation.
//! The implementation is selected once at startup from configuration and
//! never branched on per call.

pub mod bridge;
pub mod sim;

use crate::config::NavConfig;
use crate::core::Pose2D;
use crate::error::{NavError, Result};

/// Memory keys for the sensors the controller reads.
///
/// A fixed enumeration: callers iterate known keys and collect the valid
/// readings instead of probing device indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensorKey {
    SonarLeft,
    SonarRight,
    GyroscopeX,
    GyroscopeY,
    GyroscopeZ,
    AccelerometerX,
    AccelerometerY,
    AccelerometerZ,
    BodyAngleX,
    BodyAngleY,
    BatteryCharge,
}

impl SensorKey {
    /// The ALMemory key this value is published under.
    pub fn memory_key(self) -> &'static str {
        match self {
            SensorKey::SonarLeft => "Device/SubDeviceList/US/Left/Sensor/Value",
            SensorKey::SonarRight => "Device/SubDeviceList/US/Right/Sensor/Value",
            SensorKey::GyroscopeX => {
                "Device/SubDeviceList/InertialSensor/GyroscopeX/Sensor/Value"
            }
            SensorKey::GyroscopeY => {
                "Device/SubDeviceList/InertialSensor/GyroscopeY/Sensor/Value"
            }
            SensorKey::GyroscopeZ => {
                "Device/SubDeviceList/InertialSensor/GyroscopeZ/Sensor/Value"
            }
            SensorKey::AccelerometerX => {
                "Device/SubDeviceList/InertialSensor/AccelerometerX/Sensor/Value"
            }
            SensorKey::AccelerometerY => {
                "Device/SubDeviceList/InertialSensor/AccelerometerY/Sensor/Value"
            }
            SensorKey::AccelerometerZ => {
                "Device/SubDeviceList/InertialSensor/AccelerometerZ/Sensor/Value"
            }
            SensorKey::BodyAngleX => "Device/SubDeviceList/InertialSensor/AngleX/Sensor/Value",
            SensorKey::BodyAngleY => "Device/SubDeviceList/InertialSensor/AngleY/Sensor/Value",
            SensorKey::BatteryCharge => "Device/SubDeviceList/Battery/Charge/Sensor/Value",
        }
    }
}

/// Locomotion and joint control.
pub trait MotionService: Send {
    /// Wake the motors (stiffness on).
    fn wake_up(&mut self) -> Result<()>;

    /// Relax the motors (stiffness off, safe resting position).
    fn rest(&mut self) -> Result<()>;

    /// Continuous velocity command. `vx`, `vy`, `omega` are normalized
    /// fractions of the maximum walk speed in [-1, 1].
    fn move_toward(&mut self, vx: f32, vy: f32, omega: f32) -> Result<()>;

    /// Halt any continuous motion.
    fn stop_move(&mut self) -> Result<()>;

    /// World-frame robot pose from the vendor odometry.
    fn get_position(&mut self) -> Result<Pose2D>;

    /// Command joint angles (radians) at a fraction of maximum speed.
    fn set_angles(&mut self, names: &[&str], angles: &[f32], speed: f32) -> Result<()>;
}

/// Named whole-body postures.
pub trait PostureService: Send {
    /// Go to a vendor-defined posture. Returns whether the posture was
    /// reached.
    fn go_to_posture(&mut self, posture: &str, speed: f32) -> Result<bool>;

    /// Name of the current posture.
    fn get_posture(&mut self) -> Result<String>;
}

/// Sensor reads from the robot's key-value store.
pub trait SensorService: Send {
    /// Enable sonar publishing under a subscriber tag.
    fn subscribe_sonar(&mut self, tag: &str) -> Result<()>;

    fn unsubscribe_sonar(&mut self, tag: &str) -> Result<()>;

    /// Read one sensor value.
    fn read(&mut self, key: SensorKey) -> Result<f32>;
}

/// The full service set for one robot, selected at startup.
pub struct Robot {
    pub motion: Box<dyn MotionService>,
    pub posture: Box<dyn PostureService>,
    pub sensors: Box<dyn SensorService>,
}

/// Create the service set from configuration.
pub fn create_robot(config: &NavConfig) -> Result<Robot> {
    match config.connection.mode.as_str() {
        "sim" => Ok(sim::SimRobot::create(&config.simulation)),
        "bridge" => bridge::create_bridge_robot(config),
        other => Err(NavError::Config(format!("Unknown robot mode: {}", other))),
    }
}
