//! Board collaborator contract plus the in-memory `GridBoard`.
//!
//! The board owns grid geometry (neighbors, bounds, wrap, offsets,
//! rotation) and occupancy. Everything above it only asks questions.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{BoardError, Direction, MemberId, TileCoord, Topology};

pub trait Board {
    fn topology(&self) -> Topology;

    fn normalize_direction(&self, raw: i32) -> Direction {
        self.topology().normalize(raw)
    }

    /// Is (x, y) inside the board? Infinite boards accept everything.
    fn in_bounds(&self, x: i32, y: i32) -> bool;

    /// Neighbor of `from` in `dir`, on the same layer. Wrap is applied here;
    /// `None` when the step leaves the board.
    fn neighbor(&self, from: TileCoord, dir: Direction) -> Option<TileCoord>;

    fn member_at(&self, at: TileCoord) -> Option<MemberId>;

    /// Is something placed at exactly this (x, y, layer)?
    fn is_occupied(&self, at: TileCoord) -> bool {
        self.member_at(at).is_some()
    }

    fn tile_of(&self, id: MemberId) -> Option<TileCoord>;

    /// Absolute tile for a shape offset anchored at (anchor_x, anchor_y).
    /// The offset's layer is kept. Not bounds checked; `None` only when the
    /// sum leaves the `i32` range.
    fn offset(&self, relative: TileCoord, anchor_x: i32, anchor_y: i32) -> Option<TileCoord>;

    /// Rotate a relative offset by `delta` rotation steps around the origin.
    fn rotate(&self, offset: TileCoord, delta: i32) -> TileCoord {
        let (x, y) = self.topology().rotate_xy(offset.x, offset.y, delta);
        TileCoord::new(x, y, offset.layer)
    }

    /// Place (or move) a member. Fails without side effects.
    fn add_member(&mut self, id: MemberId, at: TileCoord) -> Result<(), BoardError>;

    fn remove_member(&mut self, id: MemberId) -> Option<TileCoord>;

    fn remove_all(&mut self);

    fn world_to_tile(&self, world_x: f32, world_y: f32) -> TileCoord;
}

/// Shape and world mapping of a `GridBoard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub topology: Topology,
    pub width: u32,
    pub height: u32,
    /// Ignore width/height; every (x, y) is on the board.
    pub infinite: bool,
    /// Neighbor steps and offsets wrap around the edges (bounded boards only).
    pub wrap: bool,
    /// Cell size in world units. Hex boards use `cell_width` as the radius.
    pub cell_width: f32,
    pub cell_height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl GridConfig {
    pub fn bounded(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Unbounded board, the default for group-local shapes.
    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::default()
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn with_cell_size(mut self, width: f32, height: f32) -> Self {
        self.cell_width = width;
        self.cell_height = height;
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    fn wraps(&self) -> bool {
        self.wrap && !self.infinite && self.width > 0 && self.height > 0
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Quad4,
            width: 8,
            height: 8,
            infinite: false,
            wrap: false,
            cell_width: 1.0,
            cell_height: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// In-memory board: one member per (x, y, layer).
#[derive(Clone, Debug, Default)]
pub struct GridBoard {
    config: GridConfig,
    by_tile: FxHashMap<TileCoord, MemberId>,
    by_id: FxHashMap<MemberId, TileCoord>,
}

impl GridBoard {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            by_tile: FxHashMap::default(),
            by_id: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = (MemberId, TileCoord)> + '_ {
        self.by_id.iter().map(|(&id, &at)| (id, at))
    }

    /// Fill every listed (x, y) on `layer` with fresh ids starting at
    /// `first_id`. Used to lay out walkable tracks.
    pub fn fill(
        &mut self,
        layer: i32,
        first_id: u32,
        tiles: impl IntoIterator<Item = (i32, i32)>,
    ) -> Result<u32, BoardError> {
        let mut next = first_id;
        for (x, y) in tiles {
            self.add_member(MemberId(next), TileCoord::new(x, y, layer))?;
            next += 1;
        }
        Ok(next)
    }

    fn wrap_xy(&self, x: i32, y: i32) -> (i32, i32) {
        if self.config.wraps() {
            (
                x.rem_euclid(self.config.width as i32),
                y.rem_euclid(self.config.height as i32),
            )
        } else {
            (x, y)
        }
    }

    fn hex_world_to_tile(&self, px: f32, py: f32) -> (i32, i32) {
        let size = self.config.cell_width;
        let q = (3f32.sqrt() / 3.0 * px - py / 3.0) / size;
        let r = (2.0 / 3.0 * py) / size;
        cube_round(q, r)
    }
}

/// Round fractional axial coordinates to the nearest hex.
fn cube_round(q: f32, r: f32) -> (i32, i32) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i32, rr as i32)
}

impl Board for GridBoard {
    fn topology(&self) -> Topology {
        self.config.topology
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.config.infinite
            || (x >= 0 && y >= 0 && x < self.config.width as i32 && y < self.config.height as i32)
    }

    fn neighbor(&self, from: TileCoord, dir: Direction) -> Option<TileCoord> {
        let (dx, dy) = self.config.topology.delta(dir);
        let stepped = from.checked_shift(dx, dy)?;
        let (x, y) = self.wrap_xy(stepped.x, stepped.y);
        self.in_bounds(x, y).then(|| from.with_xy(x, y))
    }

    fn member_at(&self, at: TileCoord) -> Option<MemberId> {
        self.by_tile.get(&at).copied()
    }

    fn tile_of(&self, id: MemberId) -> Option<TileCoord> {
        self.by_id.get(&id).copied()
    }

    fn offset(&self, relative: TileCoord, anchor_x: i32, anchor_y: i32) -> Option<TileCoord> {
        let placed = relative.checked_shift(anchor_x, anchor_y)?;
        let (x, y) = self.wrap_xy(placed.x, placed.y);
        Some(relative.with_xy(x, y))
    }

    fn add_member(&mut self, id: MemberId, at: TileCoord) -> Result<(), BoardError> {
        if !self.in_bounds(at.x, at.y) {
            return Err(BoardError::OutOfBounds(at));
        }
        match self.by_tile.get(&at) {
            Some(&by) if by == id => return Ok(()),
            Some(&by) => return Err(BoardError::Occupied { at, by }),
            None => {}
        }
        if let Some(old) = self.by_id.insert(id, at) {
            self.by_tile.remove(&old);
        }
        self.by_tile.insert(at, id);
        Ok(())
    }

    fn remove_member(&mut self, id: MemberId) -> Option<TileCoord> {
        let at = self.by_id.remove(&id)?;
        self.by_tile.remove(&at);
        Some(at)
    }

    fn remove_all(&mut self) {
        self.by_tile.clear();
        self.by_id.clear();
    }

    fn world_to_tile(&self, world_x: f32, world_y: f32) -> TileCoord {
        let px = world_x - self.config.origin_x;
        let py = world_y - self.config.origin_y;
        let (x, y) = match self.config.topology {
            Topology::Quad4 | Topology::Quad8 => (
                (px / self.config.cell_width).floor() as i32,
                (py / self.config.cell_height).floor() as i32,
            ),
            Topology::Hex => self.hex_world_to_tile(px, py),
        };
        TileCoord::new(x, y, 0)
    }
}

/// Top row printed first; `[]` marks a tile holding a member on any layer.
/// Infinite boards print the bounding box of their members.
impl fmt::Display for GridBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min_x, min_y, max_x, max_y) = if self.config.infinite {
            let mut tiles = self.by_id.values();
            let Some(first) = tiles.next() else {
                return Ok(());
            };
            tiles.fold((first.x, first.y, first.x, first.y), |(ax, ay, bx, by), t| {
                (ax.min(t.x), ay.min(t.y), bx.max(t.x), by.max(t.y))
            })
        } else {
            (0, 0, self.config.width as i32 - 1, self.config.height as i32 - 1)
        };
        for y in (min_y..=max_y).rev() {
            for x in min_x..=max_x {
                let held = self.by_tile.keys().any(|t| t.x == x && t.y == y);
                write!(f, "{}", if held { "[]" } else { " ." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
