//! tilekit-engine - movement planning and rigid group placement.
//!
//! Provides budgeted track walks (`PathPlanner`) and multi-tile groups that
//! attach, mirror and rotate on a board all-or-nothing (`BoardGroup`).

pub mod config;
pub mod error;
pub mod group;
pub mod planner;
pub mod transform;

pub use config::{PickMode, PlannerConfig};
pub use error::GroupError;
pub use group::{Anchor, BoardGroup, TransformOutcome};
pub use planner::{PathPlanner, TraversalSession, Visit};
pub use transform::{
    commit_placement, lift_members, mirror_offsets, plan_placement, rotate_offsets, BlockedFn,
    MirrorMode, OffsetMap, Placement,
};
