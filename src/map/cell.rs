//! Cell states for the room occupancy grid.

use serde::{Deserialize, Serialize};

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Never observed by any sensor
    #[default]
    Unknown,

    /// Observed traversable, not yet occupied by the robot
    Free,

    /// Obstacle: sonar return or a blocked movement attempt
    Obstacle,

    /// The robot has occupied this cell
    Visited,
}

impl CellState {
    /// Is this cell an obstacle?
    #[inline]
    pub fn is_obstacle(self) -> bool {
        self == CellState::Obstacle
    }

    /// Has this cell never been observed?
    #[inline]
    pub fn is_unknown(self) -> bool {
        self == CellState::Unknown
    }

    /// Integer encoding used by the snapshot format.
    #[inline]
    pub fn as_i8(self) -> i8 {
        match self {
            CellState::Unknown => -1,
            CellState::Free => 0,
            CellState::Obstacle => 1,
            CellState::Visited => 2,
        }
    }

    /// Single character representation for the terminal map view.
    pub fn as_char(self) -> char {
        match self {
            CellState::Unknown => '?',
            CellState::Free => '.',
            CellState::Obstacle => '#',
            CellState::Visited => 'o',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(CellState::Obstacle.is_obstacle());
        assert!(!CellState::Visited.is_obstacle());
        assert!(CellState::Unknown.is_unknown());
        assert!(!CellState::Free.is_unknown());
    }

    #[test]
    fn test_snapshot_encoding() {
        assert_eq!(CellState::Unknown.as_i8(), -1);
        assert_eq!(CellState::Free.as_i8(), 0);
        assert_eq!(CellState::Obstacle.as_i8(), 1);
        assert_eq!(CellState::Visited.as_i8(), 2);
    }
}
