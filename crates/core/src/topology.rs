//! Grid topologies and directions.
//!
//! A direction is an index into the topology's neighbor table. Quad grids
//! list the four edge neighbors first, then the diagonals; hex grids use
//! axial coordinates (x = q, y = r).

use serde::{Deserialize, Serialize};

/// Index into a topology's neighbor table, always in `0..direction_count`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl From<Direction> for i32 {
    fn from(dir: Direction) -> i32 {
        dir.0 as i32
    }
}

const QUAD_DELTAS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

const HEX_DELTAS: [(i32, i32); 6] = [(1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1)];

const ALL_DIRECTIONS: [Direction; 8] = [
    Direction(0),
    Direction(1),
    Direction(2),
    Direction(3),
    Direction(4),
    Direction(5),
    Direction(6),
    Direction(7),
];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    /// Orthogonal grid, edge neighbors only.
    #[default]
    Quad4,
    /// Orthogonal grid, edge and corner neighbors.
    Quad8,
    /// Hexagonal grid in axial coordinates.
    Hex,
}

impl Topology {
    pub const ALL: [Topology; 3] = [Topology::Quad4, Topology::Quad8, Topology::Hex];

    /// Modulus used to normalize directions on this topology.
    pub const fn direction_count(self) -> u8 {
        match self {
            Topology::Quad4 => 4,
            Topology::Quad8 => 8,
            Topology::Hex => 6,
        }
    }

    /// Number of rotation steps in a full turn. Quad grids rotate in quarter
    /// turns even when diagonals are enabled.
    pub const fn rotation_steps(self) -> i32 {
        match self {
            Topology::Quad4 | Topology::Quad8 => 4,
            Topology::Hex => 6,
        }
    }

    /// Every direction defined for this topology, in table order.
    pub fn directions(self) -> &'static [Direction] {
        &ALL_DIRECTIONS[..self.direction_count() as usize]
    }

    /// Wrap any signed value into a valid direction.
    pub fn normalize(self, raw: i32) -> Direction {
        Direction(raw.rem_euclid(self.direction_count() as i32) as u8)
    }

    /// (dx, dy) step for a direction. The direction is normalized first so
    /// values from another topology never index out of the table.
    pub fn delta(self, dir: Direction) -> (i32, i32) {
        let dir = self.normalize(dir.0 as i32);
        match self {
            Topology::Quad4 | Topology::Quad8 => QUAD_DELTAS[dir.0 as usize],
            Topology::Hex => HEX_DELTAS[dir.0 as usize],
        }
    }

    /// Direction pointing back the way `dir` came.
    pub fn opposite(self, dir: Direction) -> Direction {
        let dir = self.normalize(dir.0 as i32);
        match self {
            Topology::Quad4 => Direction((dir.0 + 2) % 4),
            Topology::Quad8 if dir.0 < 4 => Direction((dir.0 + 2) % 4),
            Topology::Quad8 => Direction(4 + (dir.0 - 4 + 2) % 4),
            Topology::Hex => Direction((dir.0 + 3) % 6),
        }
    }

    /// Rotate a relative (x, y) offset by `steps` around the origin.
    /// Positive steps turn from direction 0 towards direction 1.
    pub fn rotate_xy(self, x: i32, y: i32, steps: i32) -> (i32, i32) {
        let turns = steps.rem_euclid(self.rotation_steps());
        let (mut x, mut y) = (x, y);
        for _ in 0..turns {
            (x, y) = match self {
                Topology::Quad4 | Topology::Quad8 => (-y, x),
                // axial (q, r) -> (-r, q + r) is a 60 degree turn
                Topology::Hex => (-y, x + y),
            };
        }
        (x, y)
    }
}
