//! Room occupancy mapping.

pub mod cell;
pub mod grid;
pub mod history;
pub mod snapshot;

pub use cell::CellState;
pub use grid::RoomMap;
pub use history::{Visit, VisitHistory};
pub use snapshot::{MapSnapshot, save_snapshot};
