use thiserror::Error;
use tilekit_core::{BoardError, MemberId};

/// Misuse of a group's shape-editing API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group is on a board; detach it before editing its shape")]
    Attached,

    #[error("member {0} is already part of the group")]
    DuplicateMember(MemberId),

    #[error("member {0} is not part of the group")]
    UnknownMember(MemberId),

    #[error(transparent)]
    Board(#[from] BoardError),
}
