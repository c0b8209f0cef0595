//! Configuration loading for NaoNav

use std::path::Path;

use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::exploration::frontier::FrontierConfig;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub frontier: FrontierConfig,
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub exploration: ExplorationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Robot connection settings
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Robot backend: "sim" or "bridge"
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Bridge daemon IP address
    #[serde(default = "default_robot_ip")]
    pub robot_ip: String,

    /// Bridge daemon TCP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection and reply timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Occupancy grid dimensions
#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    /// Grid width in cells
    #[serde(default = "default_grid_side")]
    pub width: usize,

    /// Grid height in cells
    #[serde(default = "default_grid_side")]
    pub height: usize,

    /// Meters per cell
    #[serde(default = "default_resolution")]
    pub resolution: f32,

    /// Visit history capacity (entries)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

/// Sonar-guided walk parameters
#[derive(Clone, Debug, Deserialize)]
pub struct WalkConfig {
    /// Halt the walk when either sonar drops under this (meters)
    #[serde(default = "default_obstacle_threshold")]
    pub obstacle_threshold: f32,

    /// Nominal safe clearance (meters). Only the menu's sonar boundary
    /// check consults this; the walk loop stops on `obstacle_threshold`
    /// alone. Kept configurable so the mismatch stays visible.
    #[serde(default = "default_safe_distance")]
    pub safe_distance: f32,

    /// Sonar poll interval while walking (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Minimum distance for a walk to count as successful (meters)
    #[serde(default = "default_min_travel")]
    pub min_travel: f32,

    /// Value substituted for a failed sonar read (meters)
    #[serde(default = "default_sonar_default_range")]
    pub sonar_default_range: f32,
}

/// Exploration loop parameters
#[derive(Clone, Debug, Deserialize)]
pub struct ExplorationConfig {
    /// Distance attempted per step (meters)
    #[serde(default = "default_step_distance")]
    pub step_distance: f32,

    /// Normalized walk speed per step
    #[serde(default = "default_step_speed")]
    pub step_speed: f32,

    /// Sonar returns under this range are registered as obstacles (meters)
    #[serde(default = "default_obstacle_register_range")]
    pub obstacle_register_range: f32,

    /// Stop after this many newly explored cells
    #[serde(default = "default_cell_budget")]
    pub cell_budget: u32,

    /// Pause between exploration steps (milliseconds)
    #[serde(default = "default_step_pause")]
    pub step_pause_ms: u64,

    /// Worker join timeout on stop (milliseconds)
    #[serde(default = "default_join_timeout")]
    pub join_timeout_ms: u64,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory for exploration snapshots
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
}

/// Simulated robot parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Room width in meters
    #[serde(default = "default_room_side")]
    pub room_width: f32,

    /// Room height in meters
    #[serde(default = "default_room_side")]
    pub room_height: f32,

    /// Initial heading in radians
    #[serde(default)]
    pub start_theta: f32,

    /// Walk speed at a full forward command (m/s)
    #[serde(default = "default_max_linear_speed")]
    pub max_linear_speed: f32,

    /// Turn speed at a full turn command (rad/s)
    #[serde(default = "default_max_angular_speed")]
    pub max_angular_speed: f32,

    /// Collision radius (meters)
    #[serde(default = "default_robot_radius")]
    pub robot_radius: f32,

    /// Uniform sonar noise amplitude (meters); zero for determinism
    #[serde(default)]
    pub sonar_noise: f32,
}

// Default value functions
fn default_mode() -> String {
    "sim".to_string()
}
fn default_robot_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    9559
}
fn default_timeout() -> u64 {
    5000
}

fn default_grid_side() -> usize {
    40
}
fn default_resolution() -> f32 {
    0.1
}
fn default_history_capacity() -> usize {
    1000
}

fn default_obstacle_threshold() -> f32 {
    0.5
}
fn default_safe_distance() -> f32 {
    0.3
}
fn default_poll_interval() -> u64 {
    100
}
fn default_min_travel() -> f32 {
    0.1
}
fn default_sonar_default_range() -> f32 {
    2.5
}

fn default_step_distance() -> f32 {
    0.3
}
fn default_step_speed() -> f32 {
    0.3
}
fn default_obstacle_register_range() -> f32 {
    1.0
}
fn default_cell_budget() -> u32 {
    200
}
fn default_step_pause() -> u64 {
    2000
}
fn default_join_timeout() -> u64 {
    5000
}

fn default_snapshot_dir() -> String {
    "output".to_string()
}

fn default_room_side() -> f32 {
    4.0
}
fn default_max_linear_speed() -> f32 {
    0.15
}
fn default_max_angular_speed() -> f32 {
    0.8
}
fn default_robot_radius() -> f32 {
    0.15
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            robot_ip: default_robot_ip(),
            port: default_port(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_grid_side(),
            height: default_grid_side(),
            resolution: default_resolution(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            obstacle_threshold: default_obstacle_threshold(),
            safe_distance: default_safe_distance(),
            poll_interval_ms: default_poll_interval(),
            min_travel: default_min_travel(),
            sonar_default_range: default_sonar_default_range(),
        }
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            step_distance: default_step_distance(),
            step_speed: default_step_speed(),
            obstacle_register_range: default_obstacle_register_range(),
            cell_budget: default_cell_budget(),
            step_pause_ms: default_step_pause(),
            join_timeout_ms: default_join_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room_width: default_room_side(),
            room_height: default_room_side(),
            start_theta: 0.0,
            max_linear_speed: default_max_linear_speed(),
            max_angular_speed: default_max_angular_speed(),
            robot_radius: default_robot_radius(),
            sonar_noise: 0.0,
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            map: MapConfig::default(),
            frontier: FrontierConfig::default(),
            walk: WalkConfig::default(),
            exploration: ExplorationConfig::default(),
            output: OutputConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Full address of the bridge daemon
    pub fn address(&self) -> String {
        format!("{}:{}", self.connection.robot_ip, self.connection.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.connection.mode, "sim");
        assert_eq!(config.map.width, 40);
        assert_eq!(config.walk.obstacle_threshold, 0.5);
        assert_eq!(config.frontier.unexplored_bonus, 100.0);
        assert_eq!(config.exploration.cell_budget, 200);
        assert_eq!(config.address(), "127.0.0.1:9559");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: NavConfig = toml::from_str(
            r#"
            [connection]
            mode = "bridge"
            robot_ip = "172.16.1.164"

            [exploration]
            cell_budget = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.mode, "bridge");
        assert_eq!(config.connection.robot_ip, "172.16.1.164");
        assert_eq!(config.connection.port, 9559);
        assert_eq!(config.exploration.cell_budget, 50);
        assert_eq!(config.exploration.step_pause_ms, 2000);
        assert_eq!(config.map.resolution, 0.1);
    }
}
