//! Greedy frontier selection.
//!
//! Scores the four cardinal neighbor cells and picks the best one. This
//! is a purely local heuristic - no path planning, no global
//! consistency. The anti-loop terms (revisit penalty, center-escape
//! bonus) substitute for real coverage planning; the weights carry no
//! derivation and are kept in configuration rather than tuned here.

use serde::Deserialize;

use crate::map::RoomMap;

/// The four cardinal directions in fixed scoring order.
///
/// Grid Y grows downward, so north is `(0, -1)`. The order matters:
/// ties are broken by the first direction scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit cell step for this direction.
    #[inline]
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Heading implied by this step.
    #[inline]
    pub fn heading(self) -> f32 {
        let (dx, dy) = self.step();
        (dy as f32).atan2(dx as f32)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

/// Scoring weights and windows for frontier selection.
///
/// All values are heuristic, inherited from trial-and-error tuning on
/// the robot; none are calibrated.
#[derive(Clone, Debug, Deserialize)]
pub struct FrontierConfig {
    /// Score bonus for an unexplored cell
    #[serde(default = "default_unexplored_bonus")]
    pub unexplored_bonus: f32,

    /// Score penalty per recent visit of the candidate cell
    #[serde(default = "default_revisit_penalty")]
    pub revisit_penalty: f32,

    /// Weight of the distance-from-center bonus once stuck
    #[serde(default = "default_center_escape_weight")]
    pub center_escape_weight: f32,

    /// History window for the revisit penalty
    #[serde(default = "default_revisit_window")]
    pub revisit_window: usize,

    /// History window for stuck detection
    #[serde(default = "default_stuck_window")]
    pub stuck_window: usize,

    /// Occurrences of the current cell within the stuck window that
    /// trigger the center-escape bonus
    #[serde(default = "default_stuck_threshold")]
    pub stuck_threshold: usize,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            unexplored_bonus: default_unexplored_bonus(),
            revisit_penalty: default_revisit_penalty(),
            center_escape_weight: default_center_escape_weight(),
            revisit_window: default_revisit_window(),
            stuck_window: default_stuck_window(),
            stuck_threshold: default_stuck_threshold(),
        }
    }
}

fn default_unexplored_bonus() -> f32 {
    100.0
}
fn default_revisit_penalty() -> f32 {
    10.0
}
fn default_center_escape_weight() -> f32 {
    5.0
}
fn default_revisit_window() -> usize {
    20
}
fn default_stuck_window() -> usize {
    10
}
fn default_stuck_threshold() -> usize {
    5
}

/// A chosen direction with its score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredDirection {
    pub direction: Direction,
    pub score: f32,
}

/// Scores the cardinal neighbors of the robot cell.
pub struct FrontierSelector {
    config: FrontierConfig,
}

impl FrontierSelector {
    pub fn new(config: FrontierConfig) -> Self {
        Self { config }
    }

    /// Pick the best traversable neighbor, or `None` when every neighbor
    /// is out of bounds or an obstacle (the terminal condition for the
    /// exploration loop). Ties go to the first direction in
    /// north/east/south/west order.
    pub fn best_direction(&self, map: &RoomMap) -> Option<ScoredDirection> {
        let (rx, ry) = map.robot_cell();
        let history = map.history();

        // Center-escape kicks in once the robot has been sitting on the
        // same cell for most of the recent window.
        let stuck = history.len() > self.config.stuck_window
            && history.count_recent(rx, ry, self.config.stuck_window)
                > self.config.stuck_threshold;

        let mut best: Option<ScoredDirection> = None;

        for direction in Direction::ALL {
            let (dx, dy) = direction.step();
            let nx = rx as i32 + dx;
            let ny = ry as i32 + dy;

            let Some(state) = map.get(nx, ny) else {
                continue;
            };
            if state.is_obstacle() {
                continue;
            }

            let mut score = 0.0;

            if state.is_unknown() {
                score += self.config.unexplored_bonus;
            }

            let revisits =
                history.count_recent(nx as usize, ny as usize, self.config.revisit_window);
            score -= revisits as f32 * self.config.revisit_penalty;

            if stuck {
                let center_distance = (nx - map.width() as i32 / 2).abs()
                    + (ny - map.height() as i32 / 2).abs();
                score += center_distance as f32 * self.config.center_escape_weight;
            }

            // Strictly greater: earlier directions win ties
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ScoredDirection { direction, score });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_grid_has_no_direction() {
        let map = RoomMap::new(1, 1, 0.1, 10);
        let selector = FrontierSelector::new(FrontierConfig::default());
        assert!(selector.best_direction(&map).is_none());
    }

    #[test]
    fn test_all_neighbors_blocked_is_none() {
        let mut map = RoomMap::new(3, 3, 0.1, 10);
        // Robot at (1,1); wall in all four neighbors
        map.mark_blocked(1, 0);
        map.mark_blocked(2, 1);
        map.mark_blocked(1, 2);
        map.mark_blocked(0, 1);

        let selector = FrontierSelector::new(FrontierConfig::default());
        assert!(selector.best_direction(&map).is_none());
    }

    #[test]
    fn test_tie_breaks_to_north() {
        // All four neighbors unknown and symmetric: equal scores, so the
        // first direction scored must win.
        let map = RoomMap::new(5, 5, 0.1, 10);
        let selector = FrontierSelector::new(FrontierConfig::default());

        let choice = selector.best_direction(&map).unwrap();
        assert_eq!(choice.direction, Direction::North);
        assert_eq!(choice.score, 100.0);
    }

    #[test]
    fn test_obstacle_neighbor_is_skipped() {
        let mut map = RoomMap::new(5, 5, 0.1, 10);
        map.mark_blocked(2, 1); // north of (2,2)

        let selector = FrontierSelector::new(FrontierConfig::default());
        let choice = selector.best_direction(&map).unwrap();
        assert_eq!(choice.direction, Direction::East);
    }

    #[test]
    fn test_recently_visited_neighbor_penalized() {
        let mut map = RoomMap::new(7, 7, 0.1, 100);
        // Walk north and back twice: the north cell gets two recent visits
        for _ in 0..2 {
            map.update_position(0.0, -0.1, 0.0);
            map.update_position(0.0, 0.1, 0.0);
        }

        let selector = FrontierSelector::new(FrontierConfig::default());
        let choice = selector.best_direction(&map).unwrap();
        // North is Visited (score -20); East is still Unknown (score 100)
        assert_eq!(choice.direction, Direction::East);
    }

    #[test]
    fn test_deep_revisits_still_yield_a_direction() {
        // Even when every neighbor has a negative score, a traversable
        // neighbor must still be returned.
        let mut map = RoomMap::new(3, 3, 0.1, 100);
        map.mark_blocked(2, 1);
        map.mark_blocked(1, 2);
        map.mark_blocked(0, 1);
        // Bounce between (1,1) and (1,0) to pile up recent visits north
        for _ in 0..5 {
            map.update_position(0.0, -0.1, 0.0);
            map.update_position(0.0, 0.1, 0.0);
        }

        let selector = FrontierSelector::new(FrontierConfig::default());
        let choice = selector.best_direction(&map).unwrap();
        assert_eq!(choice.direction, Direction::North);
        assert!(choice.score < 0.0);
    }

    #[test]
    fn test_center_escape_bonus_when_stuck() {
        let mut map = RoomMap::new(9, 9, 0.1, 100);
        // Fail to move 12 times: history fills with the current cell
        for _ in 0..12 {
            map.update_position(0.0, 0.0, 0.0);
        }

        let selector = FrontierSelector::new(FrontierConfig::default());
        let choice = selector.best_direction(&map).unwrap();
        // All neighbors unknown and one cell from center: bonus 100 + 1*5,
        // minus nothing (neighbors themselves unvisited)
        assert_eq!(choice.direction, Direction::North);
        assert_eq!(choice.score, 105.0);
    }
}
