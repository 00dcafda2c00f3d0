//! Rigid multi-tile groups placed on a shared board.
//!
//! A group keeps its shape on a private infinite grid (member id -> offset)
//! and remembers two anchors: where it is now, and where it last landed
//! successfully. Every placement and every mirror/rotate is validated as a
//! whole before any member touches the board; a failed transform puts the
//! old shape back where it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilekit_core::{
    Board, BoardError, BoardHandle, Direction, GridBoard, GridConfig, MemberId, TileCoord,
    Topology,
};
use tracing::{debug, warn};

use crate::error::GroupError;
use crate::transform::{
    commit_placement, lift_members, mirror_offsets, plan_placement, rotate_offsets, shape_tiles,
    BlockedFn, MirrorMode, OffsetMap,
};

/// Board plus anchor tile a group's shape is instantiated at.
pub struct Anchor<B> {
    pub board: BoardHandle<B>,
    pub x: i32,
    pub y: i32,
}

impl<B> Anchor<B> {
    /// Same board and same tile.
    pub fn same_place(&self, other: &Anchor<B>) -> bool {
        self.board.same_board(&other.board) && self.x == other.x && self.y == other.y
    }
}

impl<B> Clone for Anchor<B> {
    fn clone(&self) -> Self {
        Self {
            board: self.board.clone(),
            x: self.x,
            y: self.y,
        }
    }
}

impl<B> fmt::Debug for Anchor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anchor")
            .field("board", &self.board)
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

/// Result of the most recent mirror/rotate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformOutcome {
    Applied,
    RolledBack,
}

pub struct BoardGroup<B> {
    shape: GridBoard,
    facing: Direction,
    anchor: Option<Anchor<B>>,
    last_anchor: Option<Anchor<B>>,
    put_test: Option<Box<BlockedFn<B>>>,
    last_outcome: Option<TransformOutcome>,
}

impl<B: Board> BoardGroup<B> {
    pub fn new(topology: Topology) -> Self {
        Self {
            shape: GridBoard::new(GridConfig::infinite().with_topology(topology)),
            facing: Direction::default(),
            anchor: None,
            last_anchor: None,
            put_test: None,
            last_outcome: None,
        }
    }

    pub fn with_members(
        topology: Topology,
        members: impl IntoIterator<Item = (MemberId, TileCoord)>,
    ) -> Result<Self, GroupError> {
        let mut group = Self::new(topology);
        for (id, offset) in members {
            group.add_member(id, offset)?;
        }
        Ok(group)
    }

    // --- shape editing, detached only ---

    pub fn add_member(&mut self, id: MemberId, offset: TileCoord) -> Result<(), GroupError> {
        self.ensure_detached()?;
        if self.shape.tile_of(id).is_some() {
            return Err(GroupError::DuplicateMember(id));
        }
        self.shape.add_member(id, offset)?;
        Ok(())
    }

    pub fn remove_member(&mut self, id: MemberId) -> Result<TileCoord, GroupError> {
        self.ensure_detached()?;
        self.shape
            .remove_member(id)
            .ok_or(GroupError::UnknownMember(id))
    }

    pub fn clear_members(&mut self) -> Result<(), GroupError> {
        self.ensure_detached()?;
        self.shape.remove_all();
        Ok(())
    }

    fn ensure_detached(&self) -> Result<(), GroupError> {
        match self.anchor {
            Some(_) => Err(GroupError::Attached),
            None => Ok(()),
        }
    }

    // --- accessors ---

    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        let mut ids: Vec<_> = self.shape.members().map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn offsets(&self) -> OffsetMap {
        self.shape.members().collect()
    }

    pub fn offset_of(&self, id: MemberId) -> Option<TileCoord> {
        self.shape.tile_of(id)
    }

    pub fn topology(&self) -> Topology {
        self.shape.topology()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_face(&mut self, raw: i32) -> &mut Self {
        self.facing = self.shape.normalize_direction(raw);
        self
    }

    pub fn anchor(&self) -> Option<&Anchor<B>> {
        self.anchor.as_ref()
    }

    pub fn last_anchor(&self) -> Option<&Anchor<B>> {
        self.last_anchor.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn last_outcome(&self) -> Option<TransformOutcome> {
        self.last_outcome
    }

    /// Replace the default "tile holds a foreign member" test.
    /// The test must not borrow the board handle mutably.
    ///
    /// `can_mirror`/`can_rotate` run the test while the group still sits on
    /// the board, whereas `mirror`/`rotate` lift the group first. A test that
    /// blocks every occupied tile therefore makes the pre-checks refuse
    /// shapes that overlap the group's current tiles even though the
    /// transform itself goes through.
    pub fn set_put_test(&mut self, test: impl Fn(i32, i32, i32, &B) -> bool + 'static) {
        self.put_test = Some(Box::new(test));
    }

    pub fn clear_put_test(&mut self) {
        self.put_test = None;
    }

    /// Tiles the shape would cover if anchored at (x, y), ordered by member
    /// id. `None` when a tile lies past the coordinate range.
    pub fn shape_tiles(&self, board: &B, x: i32, y: i32) -> Option<Vec<(MemberId, TileCoord)>> {
        shape_tiles(board, &self.offsets(), x, y)
    }

    // --- placement ---

    /// Would the shape (or `offsets` instead of it) fit at (x, y)?
    pub fn can_attach(
        &self,
        board: &BoardHandle<B>,
        x: i32,
        y: i32,
        offsets: Option<&OffsetMap>,
    ) -> bool {
        let own;
        let offsets = match offsets {
            Some(offsets) => offsets,
            None => {
                own = self.offsets();
                &own
            }
        };
        plan_placement(&*board.borrow(), offsets, x, y, self.put_test.as_deref()).is_some()
    }

    /// Detach, then place every member at (x, y) or none of them.
    pub fn attach(&mut self, board: &BoardHandle<B>, x: i32, y: i32) -> bool {
        self.detach();
        let offsets = self.offsets();
        let planned = plan_placement(&*board.borrow(), &offsets, x, y, self.put_test.as_deref());
        let Some(placement) = planned else {
            debug!(x, y, "group placement blocked");
            return false;
        };
        if let Err(err) = commit_placement(&mut *board.borrow_mut(), &placement) {
            warn!(%err, x, y, "board refused a member, placement undone");
            return false;
        }

        debug!(x, y, members = offsets.len(), "group attached");
        let anchor = Anchor {
            board: board.clone(),
            x: placement.anchor_x,
            y: placement.anchor_y,
        };
        self.last_anchor = Some(anchor.clone());
        self.anchor = Some(anchor);
        true
    }

    /// Attach at the tile under a world position.
    pub fn attach_at_world(&mut self, board: &BoardHandle<B>, world_x: f32, world_y: f32) -> bool {
        let tile = board.borrow().world_to_tile(world_x, world_y);
        self.attach(board, tile.x, tile.y)
    }

    pub fn detach(&mut self) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };
        let lifted = lift_members(
            &mut *anchor.board.borrow_mut(),
            self.shape.members().map(|(id, _)| id),
        );
        debug!(lifted, x = anchor.x, y = anchor.y, "group detached");
    }

    /// Attach again at the last anchor that worked.
    pub fn put_back(&mut self) -> bool {
        let Some(last) = self.last_anchor.clone() else {
            return false;
        };
        self.attach(&last.board, last.x, last.y)
    }

    // --- transforms ---

    pub fn can_mirror(&self, mode: MirrorMode) -> bool {
        self.can_reshape(&mirror_offsets(&self.offsets(), mode))
    }

    pub fn mirror(&mut self, mode: MirrorMode) -> bool {
        let proposed = mirror_offsets(&self.offsets(), mode);
        self.reshape(proposed)
    }

    pub fn can_rotate(&self, delta: i32) -> bool {
        self.can_reshape(&rotate_offsets(&self.shape, &self.offsets(), delta))
    }

    /// Rotate by `delta` steps; facing follows only when the turn sticks.
    pub fn rotate(&mut self, delta: i32) -> bool {
        let proposed = rotate_offsets(&self.shape, &self.offsets(), delta);
        let applied = self.reshape(proposed);
        if applied {
            let turn = delta.rem_euclid(i32::from(self.topology().direction_count()));
            self.facing = self
                .shape
                .normalize_direction(i32::from(self.facing) + turn);
        }
        applied
    }

    pub fn can_rotate_to(&self, direction: Direction) -> bool {
        self.can_rotate(self.delta_to(direction))
    }

    pub fn rotate_to(&mut self, direction: Direction) -> bool {
        self.rotate(self.delta_to(direction))
    }

    fn delta_to(&self, direction: Direction) -> i32 {
        i32::from(direction) - i32::from(self.facing)
    }

    fn can_reshape(&self, proposed: &OffsetMap) -> bool {
        match &self.anchor {
            None => true,
            Some(anchor) => self.can_attach(&anchor.board, anchor.x, anchor.y, Some(proposed)),
        }
    }

    fn reshape(&mut self, proposed: OffsetMap) -> bool {
        let outcome = self.try_reshape(&proposed);
        debug!(?outcome, "group transform");
        self.last_outcome = Some(outcome);
        outcome == TransformOutcome::Applied
    }

    fn try_reshape(&mut self, proposed: &OffsetMap) -> TransformOutcome {
        let Some(anchor) = self.anchor.clone() else {
            return match self.replace_shape(proposed) {
                Ok(()) => TransformOutcome::Applied,
                Err(_) => TransformOutcome::RolledBack,
            };
        };

        let original = self.offsets();
        self.detach();
        if self.can_attach(&anchor.board, anchor.x, anchor.y, Some(proposed))
            && self.replace_shape(proposed).is_ok()
        {
            if self.put_back() {
                return TransformOutcome::Applied;
            }
            if let Err(err) = self.replace_shape(&original) {
                warn!(%err, "could not restore the previous shape");
            }
        }
        if !self.put_back() {
            warn!(x = anchor.x, y = anchor.y, "could not restore the previous placement");
        }
        TransformOutcome::RolledBack
    }

    /// Swap in a new shape. The old one stays if the new one has two
    /// members on the same tile.
    fn replace_shape(&mut self, offsets: &OffsetMap) -> Result<(), BoardError> {
        let mut shape = GridBoard::new(self.shape.config().clone());
        for (&id, &offset) in offsets {
            shape.add_member(id, offset)?;
        }
        self.shape = shape;
        Ok(())
    }
}

impl<B: Board> Default for BoardGroup<B> {
    fn default() -> Self {
        Self::new(Topology::default())
    }
}

impl<B> fmt::Debug for BoardGroup<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardGroup")
            .field("members", &self.shape.len())
            .field("facing", &self.facing)
            .field("anchor", &self.anchor)
            .field("last_anchor", &self.last_anchor)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}
