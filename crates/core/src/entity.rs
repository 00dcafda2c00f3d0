//! Piece identities and the view of a piece sitting on a board.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Board, TileCoord};

/// Stable identity of a piece. Unique per board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for MemberId {
    fn from(raw: u32) -> Self {
        MemberId(raw)
    }
}

/// A piece that may be attached to a board.
pub trait ChessEntity {
    type Board: Board + ?Sized;

    fn id(&self) -> MemberId;

    /// The board the piece is on, `None` while unattached.
    fn board(&self) -> Option<&Self::Board>;

    /// Current tile, resolved through the board.
    fn tile(&self) -> Option<TileCoord> {
        self.board()?.tile_of(self.id())
    }
}

/// Borrowed handle pairing a member id with the board it lives on.
#[derive(Debug)]
pub struct Chess<'b, B: ?Sized> {
    id: MemberId,
    board: Option<&'b B>,
}

impl<B: ?Sized> Clone for Chess<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for Chess<'_, B> {}

impl<'b, B: Board + ?Sized> Chess<'b, B> {
    pub fn on(board: &'b B, id: MemberId) -> Self {
        Self {
            id,
            board: Some(board),
        }
    }

    pub fn detached(id: MemberId) -> Self {
        Self { id, board: None }
    }
}

impl<B: Board + ?Sized> ChessEntity for Chess<'_, B> {
    type Board = B;

    fn id(&self) -> MemberId {
        self.id
    }

    fn board(&self) -> Option<&B> {
        self.board
    }
}
