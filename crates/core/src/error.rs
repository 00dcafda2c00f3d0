use thiserror::Error;

use crate::{MemberId, TileCoord};

/// Why a board refused to take a member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("tile {0} is outside the board")]
    OutOfBounds(TileCoord),

    #[error("tile {at} is already held by member {by}")]
    Occupied { at: TileCoord, by: MemberId },
}
