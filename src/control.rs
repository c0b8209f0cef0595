//! Scripted control behaviors: postures, head scans, balance readout.
//!
//! These are the demo behaviors the menu dispatches to. Joint limits are
//! the vendor-documented ranges for the NAO head.

use std::time::Duration;

use crate::error::Result;
use crate::services::{Robot, SensorKey};
use crate::sonar::{SensorReading, SonarAdapter};

/// HeadYaw limits in radians (-119.5° to +119.5°).
pub const HEAD_YAW_RANGE: (f32, f32) = (-2.0857, 2.0857);

/// HeadPitch limits in radians (-38.5° to +29.5°).
pub const HEAD_PITCH_RANGE: (f32, f32) = (-0.6720, 0.5149);

/// Head pitch stops for the person scan: feet, torso, head.
const PERSON_SCAN_PITCHES: [f32; 3] = [-0.6, 0.0, 0.4];

/// Joint speed for scan movements; slow enough to keep balance.
const SCAN_SPEED: f32 = 0.15;

/// Snapshot of the inertial unit plus battery.
#[derive(Clone, Copy, Debug, Default)]
pub struct BalanceReport {
    /// Gyroscope X/Y/Z in rad/s
    pub gyro: [f32; 3],
    /// Accelerometer X/Y/Z in m/s²
    pub accel: [f32; 3],
    /// Body roll in radians
    pub roll: f32,
    /// Body pitch in radians
    pub pitch: f32,
    /// True when the body-angle keys failed and roll/pitch were derived
    /// from the accelerometer instead
    pub derived_angles: bool,
    /// Battery charge fraction, when readable
    pub battery: Option<f32>,
}

/// Read the balance sensors. Individual key failures degrade to zeros
/// or derived values; this never fails as a whole.
pub fn read_balance(robot: &mut Robot) -> BalanceReport {
    let sensors = robot.sensors.as_mut();

    let gyro = [
        read_or_zero(sensors, SensorKey::GyroscopeX),
        read_or_zero(sensors, SensorKey::GyroscopeY),
        read_or_zero(sensors, SensorKey::GyroscopeZ),
    ];
    let accel = [
        read_or_zero(sensors, SensorKey::AccelerometerX),
        read_or_zero(sensors, SensorKey::AccelerometerY),
        read_or_zero(sensors, SensorKey::AccelerometerZ),
    ];

    // Prefer the body angles computed on the robot; fall back to a
    // gravity-vector estimate when those keys are unavailable
    let body_x = sensors.read(SensorKey::BodyAngleX);
    let body_y = sensors.read(SensorKey::BodyAngleY);
    let (roll, pitch, derived_angles) = match (body_x, body_y) {
        (Ok(x), Ok(y)) => (x, y, false),
        _ => {
            let roll = accel[1].atan2(accel[2]);
            let pitch = (-accel[0]).atan2((accel[1] * accel[1] + accel[2] * accel[2]).sqrt());
            (roll, pitch, true)
        }
    };

    let battery = sensors.read(SensorKey::BatteryCharge).ok();

    BalanceReport {
        gyro,
        accel,
        roll,
        pitch,
        derived_angles,
        battery,
    }
}

/// Stand the robot up. Returns whether the posture was reached (already
/// standing counts as success).
pub fn stand_up(robot: &mut Robot) -> Result<bool> {
    let current = robot.posture.get_posture()?;
    if current == "Stand" || current == "StandInit" {
        tracing::info!("Already standing ({})", current);
        return Ok(true);
    }

    robot.motion.wake_up()?;
    let reached = robot.posture.go_to_posture("Stand", 0.8)?;
    if reached {
        tracing::info!("Robot standing");
    } else {
        tracing::warn!("Posture change to Stand failed");
    }
    Ok(reached)
}

/// Sit the robot down.
pub fn sit_down(robot: &mut Robot) -> Result<bool> {
    let current = robot.posture.get_posture()?;
    if current == "Sit" || current == "SitRelax" {
        tracing::info!("Already sitting ({})", current);
        return Ok(true);
    }

    let reached = robot.posture.go_to_posture("Sit", 0.8)?;
    if reached {
        tracing::info!("Robot sitting");
    } else {
        tracing::warn!("Posture change to Sit failed");
    }
    Ok(reached)
}

/// Put the arms forward for balance, used before upward head scans.
pub fn arms_forward(robot: &mut Robot) -> Result<()> {
    let names = [
        "LShoulderPitch",
        "LShoulderRoll",
        "LElbowYaw",
        "LElbowRoll",
        "RShoulderPitch",
        "RShoulderRoll",
        "RElbowYaw",
        "RElbowRoll",
    ];
    let angles = [1.5, 0.3, -1.2, -0.5, 1.5, -0.3, 1.2, 0.5];
    robot.motion.set_angles(&names, &angles, 0.3)
}

/// Sweep the head horizontally across the full yaw range in `steps`
/// stops, dwelling at each, then recenter.
pub fn scan_head_horizontal(robot: &mut Robot, steps: usize, dwell: Duration) -> Result<()> {
    let steps = steps.max(2);
    let (yaw_min, yaw_max) = HEAD_YAW_RANGE;
    let increment = (yaw_max - yaw_min) / (steps - 1) as f32;

    for i in 0..steps {
        let yaw = yaw_min + increment * i as f32;
        tracing::info!(
            "Head scan stop {}/{}: yaw {:.2} rad ({:.1}°)",
            i + 1,
            steps,
            yaw,
            yaw.to_degrees()
        );
        robot.motion.set_angles(&["HeadYaw"], &[yaw], SCAN_SPEED)?;
        std::thread::sleep(dwell);
        log_balance(robot);
    }

    robot.motion.set_angles(&["HeadYaw"], &[0.0], 0.2)
}

/// Sweep the head vertically across the full pitch range in `steps`
/// stops, dwelling at each, then recenter.
pub fn scan_head_vertical(robot: &mut Robot, steps: usize, dwell: Duration) -> Result<()> {
    let steps = steps.max(2);
    let (pitch_min, pitch_max) = HEAD_PITCH_RANGE;
    let increment = (pitch_max - pitch_min) / (steps - 1) as f32;

    for i in 0..steps {
        let pitch = pitch_min + increment * i as f32;
        tracing::info!(
            "Head scan stop {}/{}: pitch {:.2} rad ({:.1}°)",
            i + 1,
            steps,
            pitch,
            pitch.to_degrees()
        );
        robot
            .motion
            .set_angles(&["HeadPitch"], &[pitch], SCAN_SPEED)?;
        std::thread::sleep(dwell);
        log_balance(robot);
    }

    robot.motion.set_angles(&["HeadPitch"], &[0.0], 0.2)
}

/// Three-stop vertical scan of a person (feet, torso, head), with the
/// arms forward so the robot can look up without tipping.
pub fn scan_person_vertical(robot: &mut Robot, dwell: Duration) -> Result<()> {
    arms_forward(robot)?;

    for (i, pitch) in PERSON_SCAN_PITCHES.iter().enumerate() {
        tracing::info!(
            "Person scan stop {}/{}: pitch {:.2} rad",
            i + 1,
            PERSON_SCAN_PITCHES.len(),
            pitch
        );
        robot
            .motion
            .set_angles(&["HeadPitch"], &[*pitch], SCAN_SPEED)?;
        std::thread::sleep(dwell);
        log_balance(robot);
    }

    robot.motion.set_angles(&["HeadPitch"], &[0.0], 0.2)
}

/// Return the gaze to the horizon.
pub fn reset_head(robot: &mut Robot) -> Result<()> {
    robot
        .motion
        .set_angles(&["HeadYaw", "HeadPitch"], &[0.0, 0.0], 0.3)
}

/// One-shot sonar check: subscribe, read both channels, report whether
/// both are inside `alert_distance`.
pub fn sonar_check(robot: &mut Robot, alert_distance: f32) -> Result<(SensorReading, bool)> {
    robot.sensors.subscribe_sonar("NaoNavCheck")?;
    let reading = SonarAdapter::new(2.5).read(robot.sensors.as_mut());
    robot.sensors.unsubscribe_sonar("NaoNavCheck")?;

    let crossed = alert_distance >= reading.left && alert_distance >= reading.right;
    if crossed {
        tracing::warn!(
            "Boundary of {:.2}m crossed: L {:.2}m, R {:.2}m",
            alert_distance,
            reading.left,
            reading.right
        );
    }
    Ok((reading, crossed))
}

fn read_or_zero(sensors: &mut dyn crate::services::SensorService, key: SensorKey) -> f32 {
    sensors.read(key).unwrap_or(0.0)
}

fn log_balance(robot: &mut Robot) {
    let report = read_balance(robot);
    tracing::debug!(
        "Balance: roll {:.2}° pitch {:.2}° gyro ({:.3}, {:.3}, {:.3})",
        report.roll.to_degrees(),
        report.pitch.to_degrees(),
        report.gyro[0],
        report.gyro[1],
        report.gyro[2]
    );
}
