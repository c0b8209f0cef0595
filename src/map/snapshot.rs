//! Exploration snapshot persistence.
//!
//! The final map is written as a timestamped JSON document. Best-effort
//! debug artifact: no schema version, failures are reported but never
//! abort an exploration.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::{NavError, Result};
use crate::map::grid::RoomMap;
use crate::map::history::Visit;

/// Serializable view of a finished exploration.
#[derive(Clone, Debug, Serialize)]
pub struct MapSnapshot {
    pub timestamp: String,
    /// Cell rows, encoded -1 unknown / 0 free / 1 obstacle / 2 visited
    pub grid: Vec<Vec<i8>>,
    /// Robot cell `[x, y]`
    pub robot_position: [usize; 2],
    /// Heading in radians
    pub robot_heading: f32,
    pub statistics: SnapshotStats,
    pub path_history: Vec<Visit>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SnapshotStats {
    pub cells_explored: u32,
    pub obstacles_detected: u32,
    pub positions_visited: usize,
}

impl MapSnapshot {
    pub fn from_map(map: &RoomMap) -> Self {
        let grid = (0..map.height())
            .map(|y| {
                (0..map.width())
                    .map(|x| {
                        map.get(x as i32, y as i32)
                            .map(|c| c.as_i8())
                            .unwrap_or(-1)
                    })
                    .collect()
            })
            .collect();

        let (rx, ry) = map.robot_cell();

        Self {
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            grid,
            robot_position: [rx, ry],
            robot_heading: map.robot_heading(),
            statistics: SnapshotStats {
                cells_explored: map.cells_explored(),
                obstacles_detected: map.obstacles_detected(),
                positions_visited: map.positions_visited(),
            },
            path_history: map.history().iter().copied().collect(),
        }
    }
}

impl RoomMap {
    /// Serializable snapshot of the current map state.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot::from_map(self)
    }
}

/// Write a snapshot to `dir/nao_exploration_<timestamp>.json`,
/// creating the directory if needed. Returns the written path.
pub fn save_snapshot(snapshot: &MapSnapshot, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| NavError::Persistence(format!("Failed to create {:?}: {}", dir, e)))?;

    let path = dir.join(format!("nao_exploration_{}.json", snapshot.timestamp));
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| NavError::Persistence(format!("Failed to encode snapshot: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| NavError::Persistence(format!("Failed to write {:?}: {}", path, e)))?;

    Ok(path)
}
