//! Path steps and movement cost rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Direction, TileCoord};

/// Movement points charged for entering a tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Cost {
    Points(u32),
    /// Spend everything that is left on this tile.
    Stop,
}

impl Cost {
    /// Concrete charge given the points still available.
    #[inline]
    pub fn resolve(self, remaining: u32) -> u32 {
        match self {
            Cost::Points(points) => points,
            Cost::Stop => remaining,
        }
    }
}

impl From<u32> for Cost {
    fn from(points: u32) -> Self {
        Cost::Points(points)
    }
}

/// How much each tile costs to enter.
pub enum CostRule {
    Fixed(Cost),
    Dynamic(Box<dyn Fn(TileCoord) -> Cost>),
}

impl CostRule {
    pub fn fixed(points: u32) -> Self {
        CostRule::Fixed(Cost::Points(points))
    }

    pub fn from_fn(f: impl Fn(TileCoord) -> Cost + 'static) -> Self {
        CostRule::Dynamic(Box::new(f))
    }

    #[inline]
    pub fn evaluate(&self, at: TileCoord) -> Cost {
        match self {
            CostRule::Fixed(cost) => *cost,
            CostRule::Dynamic(f) => f(at),
        }
    }
}

impl Default for CostRule {
    fn default() -> Self {
        CostRule::fixed(1)
    }
}

impl fmt::Debug for CostRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostRule::Fixed(cost) => f.debug_tuple("Fixed").field(cost).finish(),
            CostRule::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// One tile of a planned walk.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub at: TileCoord,
    pub cost: u32,
    /// Direction the walker was moving when it entered `at`.
    pub direction: Direction,
    /// Tile the walker came from.
    pub from: TileCoord,
}

impl PathStep {
    pub fn new(at: TileCoord, cost: u32, direction: Direction, from: TileCoord) -> Self {
        Self {
            at,
            cost,
            direction,
            from,
        }
    }
}

/// Sum of step costs.
pub fn total_cost(path: &[PathStep]) -> u32 {
    path.iter().map(|step| step.cost).sum()
}
