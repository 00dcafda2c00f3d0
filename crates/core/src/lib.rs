//! Tilekit core crate - coordinates, directions, boards and pieces.

mod board;
mod coord;
mod entity;
mod error;
mod handle;
mod path;
mod topology;

pub use board::{Board, GridBoard, GridConfig};
pub use coord::TileCoord;
pub use entity::{Chess, ChessEntity, MemberId};
pub use error::BoardError;
pub use handle::BoardHandle;
pub use path::{total_cost, Cost, CostRule, PathStep};
pub use topology::{Direction, Topology};
