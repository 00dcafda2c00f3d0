//! Tile coordinates - (x, y) on a grid plus a stacking layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer tile address. `layer` separates independent stacked grids that
/// share the same (x, y), e.g. the track a piece walks on and the piece itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub layer: i32,
}

impl TileCoord {
    pub const ORIGIN: TileCoord = TileCoord { x: 0, y: 0, layer: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, layer: i32) -> Self {
        Self { x, y, layer }
    }

    /// Same layer, different (x, y).
    #[inline]
    pub const fn with_xy(self, x: i32, y: i32) -> Self {
        Self { x, y, layer: self.layer }
    }

    #[inline]
    pub const fn with_layer(self, layer: i32) -> Self {
        Self { layer, ..self }
    }

    /// True when both coordinates address the same (x, y), ignoring layer.
    #[inline]
    pub fn same_xy(self, other: TileCoord) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Shift (x, y) on the same layer. `None` when either axis would overflow.
    #[inline]
    pub fn checked_shift(self, dx: i32, dy: i32) -> Option<TileCoord> {
        Some(self.with_xy(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

impl From<(i32, i32, i32)> for TileCoord {
    fn from((x, y, layer): (i32, i32, i32)) -> Self {
        Self::new(x, y, layer)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.layer)
    }
}
