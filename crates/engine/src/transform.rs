//! Shape transforms and placement validation.
//!
//! Everything here is either pure (mirror/rotate/plan) or an explicit
//! commit step. Board state is only touched by `commit_placement` and
//! `lift_members`, and only after `plan_placement` has approved every member.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tilekit_core::{Board, BoardError, MemberId, TileCoord};

/// Member id -> offset from the group anchor.
pub type OffsetMap = FxHashMap<MemberId, TileCoord>;

/// Caller-supplied placement test: `(x, y, layer, board) -> blocked`.
pub type BlockedFn<B> = dyn Fn(i32, i32, i32, &B) -> bool;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorMode {
    #[default]
    None,
    X,
    Y,
    Both,
}

impl MirrorMode {
    pub fn flips_x(self) -> bool {
        matches!(self, MirrorMode::X | MirrorMode::Both)
    }

    pub fn flips_y(self) -> bool {
        matches!(self, MirrorMode::Y | MirrorMode::Both)
    }
}

/// Negate x and/or y of every offset. Layers are kept.
pub fn mirror_offsets(offsets: &OffsetMap, mode: MirrorMode) -> OffsetMap {
    offsets
        .iter()
        .map(|(&id, &off)| {
            let x = if mode.flips_x() { -off.x } else { off.x };
            let y = if mode.flips_y() { -off.y } else { off.y };
            (id, off.with_xy(x, y))
        })
        .collect()
}

/// Rotate every offset with the board's rotation. Layers are kept.
pub fn rotate_offsets<B: Board + ?Sized>(board: &B, offsets: &OffsetMap, delta: i32) -> OffsetMap {
    offsets
        .iter()
        .map(|(&id, &off)| (id, board.rotate(off, delta).with_layer(off.layer)))
        .collect()
}

/// An approved placement: every member's target tile, ordered by member id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub anchor_x: i32,
    pub anchor_y: i32,
    targets: Vec<(MemberId, TileCoord)>,
}

impl Placement {
    pub fn targets(&self) -> &[(MemberId, TileCoord)] {
        &self.targets
    }
}

/// Absolute tile of every member for an anchor, ordered by member id.
/// No bounds or occupancy checks; `None` when a tile cannot be addressed
/// at all.
pub fn shape_tiles<B: Board + ?Sized>(
    board: &B,
    offsets: &OffsetMap,
    anchor_x: i32,
    anchor_y: i32,
) -> Option<Vec<(MemberId, TileCoord)>> {
    let mut tiles = offsets
        .iter()
        .map(|(&id, &off)| Some((id, board.offset(off, anchor_x, anchor_y)?)))
        .collect::<Option<Vec<_>>>()?;
    tiles.sort_unstable_by_key(|&(id, _)| id);
    Some(tiles)
}

/// Check every member's target. `None` as soon as one is outside the board
/// (or past the coordinate range) or blocked. Without a custom test a tile
/// is blocked when it holds a member that is not part of `offsets`.
pub fn plan_placement<B: Board + ?Sized>(
    board: &B,
    offsets: &OffsetMap,
    anchor_x: i32,
    anchor_y: i32,
    blocked: Option<&BlockedFn<B>>,
) -> Option<Placement> {
    let targets = shape_tiles(board, offsets, anchor_x, anchor_y)?;
    for &(_, at) in &targets {
        if !board.in_bounds(at.x, at.y) {
            return None;
        }
        let is_blocked = match blocked {
            Some(test) => test(at.x, at.y, at.layer, board),
            None => board
                .member_at(at)
                .is_some_and(|holder| !offsets.contains_key(&holder)),
        };
        if is_blocked {
            return None;
        }
    }
    Some(Placement {
        anchor_x,
        anchor_y,
        targets,
    })
}

/// Put every member of an approved placement on the board. If the board
/// refuses one, the members placed so far are lifted again and the board
/// is left as it was.
pub fn commit_placement<B: Board + ?Sized>(
    board: &mut B,
    placement: &Placement,
) -> Result<(), BoardError> {
    for (done, &(id, at)) in placement.targets.iter().enumerate() {
        if let Err(err) = board.add_member(id, at) {
            for &(placed, _) in &placement.targets[..done] {
                board.remove_member(placed);
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Remove members from a board. Returns how many were actually there.
pub fn lift_members<B: Board + ?Sized>(
    board: &mut B,
    ids: impl IntoIterator<Item = MemberId>,
) -> usize {
    ids.into_iter()
        .filter(|&id| board.remove_member(id).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilekit_core::{GridBoard, GridConfig, Topology};

    fn shape(entries: &[(u32, (i32, i32, i32))]) -> OffsetMap {
        entries
            .iter()
            .map(|&(id, xyz)| (MemberId(id), TileCoord::from(xyz)))
            .collect()
    }

    #[test]
    fn test_mirror_x() {
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0))]);
        let out = mirror_offsets(&offsets, MirrorMode::X);
        assert_eq!(out, shape(&[(1, (0, 0, 0)), (2, (-1, 0, 0))]));
    }

    #[test]
    fn test_mirror_modes() {
        let offsets = shape(&[(1, (2, -3, 1))]);
        let at = |mode| mirror_offsets(&offsets, mode)[&MemberId(1)];
        assert_eq!(at(MirrorMode::None), TileCoord::new(2, -3, 1));
        assert_eq!(at(MirrorMode::X), TileCoord::new(-2, -3, 1));
        assert_eq!(at(MirrorMode::Y), TileCoord::new(2, 3, 1));
        assert_eq!(at(MirrorMode::Both), TileCoord::new(-2, 3, 1));
    }

    #[test]
    fn test_rotate_keeps_layers() {
        let board = GridBoard::new(GridConfig::infinite().with_topology(Topology::Hex));
        let offsets = shape(&[(1, (1, 0, 2)), (2, (0, 0, 0))]);
        let out = rotate_offsets(&board, &offsets, 1);
        assert_eq!(out, shape(&[(1, (0, 1, 2)), (2, (0, 0, 0))]));
    }

    #[test]
    fn test_plan_rejects_out_of_bounds() {
        let board = GridBoard::new(GridConfig::bounded(3, 3));
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0))]);
        assert!(plan_placement(&board, &offsets, 1, 1, None).is_some());
        assert!(plan_placement(&board, &offsets, 2, 1, None).is_none());
    }

    #[test]
    fn test_plan_rejects_coordinate_overflow() {
        let board = GridBoard::new(GridConfig::infinite());
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0))]);
        assert_eq!(shape_tiles(&board, &offsets, i32::MAX, 0), None);
        assert!(plan_placement(&board, &offsets, i32::MAX, 0, None).is_none());
        let placement = plan_placement(&board, &offsets, i32::MAX - 1, 0, None).unwrap();
        assert_eq!((placement.anchor_x, placement.anchor_y), (i32::MAX - 1, 0));
    }

    #[test]
    fn test_plan_rejects_foreign_member() {
        let mut board = GridBoard::new(GridConfig::bounded(3, 3));
        board.add_member(MemberId(9), TileCoord::new(2, 1, 0)).unwrap();
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0))]);
        assert!(plan_placement(&board, &offsets, 1, 1, None).is_none());
        // a different layer does not block
        board.remove_all();
        board.add_member(MemberId(9), TileCoord::new(2, 1, 1)).unwrap();
        assert!(plan_placement(&board, &offsets, 1, 1, None).is_some());
    }

    #[test]
    fn test_plan_ignores_own_members() {
        let mut board = GridBoard::new(GridConfig::bounded(3, 3));
        board.add_member(MemberId(2), TileCoord::new(2, 1, 0)).unwrap();
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0))]);
        assert!(plan_placement(&board, &offsets, 1, 1, None).is_some());
    }

    #[test]
    fn test_plan_custom_test() {
        let board = GridBoard::new(GridConfig::bounded(5, 5));
        let offsets = shape(&[(1, (0, 0, 0)), (2, (0, 1, 0))]);
        let no_top_row: Box<BlockedFn<GridBoard>> = Box::new(|_, y, _, _| y >= 4);
        assert!(plan_placement(&board, &offsets, 0, 2, Some(&*no_top_row)).is_some());
        assert!(plan_placement(&board, &offsets, 0, 3, Some(&*no_top_row)).is_none());
    }

    #[test]
    fn test_placement_targets_sorted() {
        let board = GridBoard::new(GridConfig::bounded(5, 5));
        let offsets = shape(&[(3, (0, 0, 0)), (1, (1, 0, 0)), (2, (2, 0, 0))]);
        let placement = plan_placement(&board, &offsets, 0, 0, None).unwrap();
        let ids: Vec<u32> = placement.targets().iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_commit_rolls_back_on_refusal() {
        let mut board = GridBoard::new(GridConfig::bounded(5, 5));
        board.add_member(MemberId(9), TileCoord::new(2, 0, 0)).unwrap();
        let offsets = shape(&[(1, (0, 0, 0)), (2, (1, 0, 0)), (3, (2, 0, 0))]);
        // custom test lets everything through, the board still refuses (2, 0)
        let anything: Box<BlockedFn<GridBoard>> = Box::new(|_, _, _, _| false);
        let placement = plan_placement(&board, &offsets, 0, 0, Some(&*anything)).unwrap();

        let err = commit_placement(&mut board, &placement).unwrap_err();
        assert_eq!(
            err,
            BoardError::Occupied {
                at: TileCoord::new(2, 0, 0),
                by: MemberId(9)
            }
        );
        assert_eq!(board.len(), 1);
        assert_eq!(board.tile_of(MemberId(1)), None);
        assert_eq!(board.tile_of(MemberId(2)), None);
    }

    #[test]
    fn test_lift_counts_present_members() {
        let mut board = GridBoard::new(GridConfig::bounded(5, 5));
        board.add_member(MemberId(1), TileCoord::new(0, 0, 0)).unwrap();
        assert_eq!(lift_members(&mut board, [MemberId(1), MemberId(2)]), 1);
        assert!(board.is_empty());
    }
}
