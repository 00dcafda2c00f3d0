//! Budgeted walks along a track of tiles ("monopoly" movement).
//!
//! The walker looks at every neighbor that lies on the track layer, splits
//! them into forward / backward / other, and picks one per step until the
//! movement budget runs out or the track ends.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tilekit_core::{Board, ChessEntity, Cost, CostRule, Direction, MemberId, PathStep, TileCoord};
use tracing::{debug, trace, warn};

use crate::config::{PickMode, PlannerConfig};

/// A tile the walker stands on and the direction it arrived moving in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Visit {
    pub at: TileCoord,
    pub direction: Direction,
}

/// Where a walk currently is. Owned by the caller and handed to every
/// planning call so a walk can continue across calls without the planner
/// keeping hidden state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TraversalSession {
    pub at: TileCoord,
    pub facing: Direction,
    /// Tile entered just before `at`; vetoes turning straight back.
    pub previous: Option<TileCoord>,
}

impl TraversalSession {
    pub fn new(at: TileCoord, facing: Direction) -> Self {
        Self {
            at,
            facing,
            previous: None,
        }
    }

    /// Session for a walker that reached `at` moving in `facing`. The tile
    /// behind it counts as the previous one, so the first step will not
    /// turn straight back unless forced to.
    pub fn arrived<B: Board + ?Sized>(board: &B, at: TileCoord, facing: Direction) -> Self {
        let facing = board.normalize_direction(i32::from(facing));
        Self {
            at,
            facing,
            previous: board.neighbor(at, board.topology().opposite(facing)),
        }
    }

    pub fn visit(&self) -> Visit {
        Visit {
            at: self.at,
            direction: self.facing,
        }
    }

    /// Move the session to the end of a planned path.
    pub fn advance_to(&mut self, step: &PathStep) {
        self.at = step.at;
        self.facing = step.direction;
        self.previous = Some(step.from);
    }
}

#[derive(Debug, Default)]
pub struct PathPlanner {
    config: PlannerConfig,
    cost: CostRule,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            cost: CostRule::default(),
        }
    }

    pub fn with_cost(mut self, cost: CostRule) -> Self {
        self.cost = cost;
        self
    }

    pub fn set_cost(&mut self, cost: CostRule) {
        self.cost = cost;
    }

    pub fn set_pick_mode(&mut self, mode: PickMode) {
        self.config.pick_mode = mode;
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn cost_of(&self, at: TileCoord) -> Cost {
        self.cost.evaluate(at)
    }

    /// Pick the tile after `current`, or `None` when the track ends here.
    pub fn next_tile<B, R>(
        &self,
        board: &B,
        current: Visit,
        previous: Option<TileCoord>,
        rng: &mut R,
    ) -> Option<Visit>
    where
        B: Board + ?Sized,
        R: Rng + ?Sized,
    {
        let mut forward = None;
        let mut backward = None;
        // forward and every other neighbor, backward excluded
        let mut others: SmallVec<[Visit; 8]> = SmallVec::new();

        for &dir in board.topology().directions() {
            let Some(at) = board.neighbor(current.at, dir) else {
                continue;
            };
            if !board.is_occupied(at.with_layer(self.config.path_layer)) {
                continue;
            }
            let visit = Visit { at, direction: dir };
            if dir == current.direction {
                forward = Some(visit);
            }
            if previous.is_some_and(|prev| prev.same_xy(at)) {
                backward = Some(visit);
            } else {
                others.push(visit);
            }
        }

        match (backward, others.len()) {
            (None, 0) => None,
            (None, 1) => Some(others[0]),
            (Some(back), 0) => Some(back),
            _ => match self.config.pick_mode {
                PickMode::Forward => forward.or_else(|| pick(&others, rng)),
                PickMode::Random => {
                    others.extend(backward);
                    pick(&others, rng)
                }
            },
        }
    }

    /// Plan a walk of at most `budget` points from the session's position.
    pub fn plan<B, R>(
        &self,
        board: &B,
        session: &mut TraversalSession,
        budget: u32,
        rng: &mut R,
    ) -> Vec<PathStep>
    where
        B: Board + ?Sized,
        R: Rng + ?Sized,
    {
        let mut out = Vec::new();
        self.plan_into(board, session, budget, rng, &mut out);
        out
    }

    /// Like `plan`, appending to `out`. A zero budget leaves `out` untouched.
    pub fn plan_into<B, R>(
        &self,
        board: &B,
        session: &mut TraversalSession,
        budget: u32,
        rng: &mut R,
        out: &mut Vec<PathStep>,
    ) where
        B: Board + ?Sized,
        R: Rng + ?Sized,
    {
        if budget == 0 {
            return;
        }
        let start_len = out.len();
        let mut remaining = budget;
        let mut current = session.visit();
        let mut previous = session.previous;
        let mut steps = 0usize;

        while remaining > 0 {
            if steps == self.config.max_steps {
                warn!(
                    max_steps = self.config.max_steps,
                    remaining, "walk hit the step cap, stopping"
                );
                break;
            }
            steps += 1;

            let Some(next) = self.next_tile(board, current, previous, rng) else {
                debug!(at = %current.at, "track ends");
                break;
            };
            let cost = self.cost_of(next.at).resolve(remaining);
            if remaining >= cost {
                out.push(PathStep::new(next.at, cost, next.direction, current.at));
            }
            trace!(at = %next.at, cost, remaining, "step");
            remaining = remaining.saturating_sub(cost);

            previous = Some(current.at);
            current = next;
        }

        while out.last().is_some_and(|step| step.cost == 0) {
            out.pop();
        }

        if out.len() > start_len {
            if let Some(last) = out.last() {
                session.advance_to(last);
            }
        }
    }

    /// Fresh walk for a live piece. Empty when the piece is not on a board.
    pub fn plan_for_entity<E, R>(
        &self,
        entity: &E,
        facing: Direction,
        budget: u32,
        rng: &mut R,
    ) -> Vec<PathStep>
    where
        E: ChessEntity,
        R: Rng + ?Sized,
    {
        let Some(board) = entity.board() else {
            return Vec::new();
        };
        self.plan_for_member(board, entity.id(), facing, budget, rng)
    }

    /// Fresh walk for a piece known only by id. Empty when the id is not on
    /// `board`.
    pub fn plan_for_member<B, R>(
        &self,
        board: &B,
        id: MemberId,
        facing: Direction,
        budget: u32,
        rng: &mut R,
    ) -> Vec<PathStep>
    where
        B: Board + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(at) = board.tile_of(id) else {
            return Vec::new();
        };
        let facing = board.normalize_direction(facing.index() as i32);
        let mut session = TraversalSession::new(at, facing);
        self.plan(board, &mut session, budget, rng)
    }
}

fn pick<R: Rng + ?Sized>(candidates: &[Visit], rng: &mut R) -> Option<Visit> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use tilekit_core::{GridBoard, GridConfig, Topology};

    /// Fails the test if the planner asks for randomness.
    struct NoDraws;

    impl RngCore for NoDraws {
        fn next_u32(&mut self) -> u32 {
            panic!("unexpected random draw")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("unexpected random draw")
        }

        fn fill_bytes(&mut self, _dst: &mut [u8]) {
            panic!("unexpected random draw")
        }
    }

    fn dir(raw: i32) -> Direction {
        Topology::Quad4.normalize(raw)
    }

    fn visit(x: i32, y: i32, d: i32) -> Visit {
        Visit {
            at: TileCoord::new(x, y, 1),
            direction: dir(d),
        }
    }

    /// Track tiles on layer 0 of a 5x5 quad board.
    fn track(tiles: &[(i32, i32)]) -> GridBoard {
        let mut board = GridBoard::new(GridConfig::bounded(5, 5));
        board.fill(0, 100, tiles.iter().copied()).unwrap();
        board
    }

    #[test]
    fn test_isolated_tile_has_no_next() {
        let board = track(&[(2, 2)]);
        let planner = PathPlanner::default();
        assert_eq!(planner.next_tile(&board, visit(2, 2, 0), None, &mut NoDraws), None);
    }

    #[test]
    fn test_single_other_is_taken() {
        let board = track(&[(2, 2), (2, 3)]);
        let planner = PathPlanner::default();
        let next = planner.next_tile(&board, visit(2, 2, 0), None, &mut NoDraws);
        assert_eq!(next, Some(visit(2, 3, 1)));
    }

    #[test]
    fn test_dead_end_retreats() {
        let board = track(&[(1, 2), (2, 2)]);
        let planner = PathPlanner::default();
        let prev = Some(TileCoord::new(1, 2, 1));
        let next = planner.next_tile(&board, visit(2, 2, 0), prev, &mut NoDraws);
        assert_eq!(next, Some(visit(1, 2, 2)));
    }

    #[test]
    fn test_forward_wins_without_randomness() {
        // crossroads: west (came from), east, north, south
        let board = track(&[(1, 2), (2, 2), (3, 2), (2, 1), (2, 3)]);
        let planner = PathPlanner::default();
        let prev = Some(TileCoord::new(1, 2, 1));
        let next = planner.next_tile(&board, visit(2, 2, 0), prev, &mut NoDraws);
        assert_eq!(next, Some(visit(3, 2, 0)));
    }

    #[test]
    fn test_forward_mode_never_turns_back_at_fork() {
        // T junction, facing north into a wall
        let board = track(&[(2, 1), (2, 2), (1, 2), (3, 2)]);
        let planner = PathPlanner::default();
        let prev = Some(TileCoord::new(2, 1, 1));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let next = planner
                .next_tile(&board, visit(2, 2, 1), prev, &mut rng)
                .unwrap();
            assert!(next.at == TileCoord::new(1, 2, 1) || next.at == TileCoord::new(3, 2, 1));
        }
    }

    #[test]
    fn test_random_mode_can_turn_back() {
        let board = track(&[(1, 2), (2, 2), (3, 2)]);
        let planner = PathPlanner::new(PlannerConfig::wandering());
        let prev = Some(TileCoord::new(1, 2, 1));
        let mut rng = StdRng::seed_from_u64(11);
        let mut saw_back = false;
        let mut saw_forward = false;
        for _ in 0..100 {
            let next = planner
                .next_tile(&board, visit(2, 2, 0), prev, &mut rng)
                .unwrap();
            saw_back |= next.at.x == 1;
            saw_forward |= next.at.x == 3;
        }
        assert!(saw_back && saw_forward);
    }

    #[test]
    fn test_non_track_neighbors_ignored() {
        let mut board = track(&[(2, 2), (3, 2)]);
        // something on the walker layer is not track
        board.add_member(MemberId(1), TileCoord::new(2, 3, 1)).unwrap();
        let planner = PathPlanner::default();
        let next = planner.next_tile(&board, visit(2, 2, 1), None, &mut NoDraws);
        assert_eq!(next, Some(visit(3, 2, 0)));
    }

    #[test]
    fn test_zero_budget_leaves_accumulator() {
        let board = track(&[(0, 0), (1, 0)]);
        let planner = PathPlanner::default();
        let mut session = TraversalSession::new(TileCoord::new(0, 0, 1), dir(0));
        let seed = PathStep::new(TileCoord::new(9, 9, 1), 0, dir(0), TileCoord::ORIGIN);
        let mut out = vec![seed];
        planner.plan_into(&board, &mut session, 0, &mut NoDraws, &mut out);
        assert_eq!(out, vec![seed]);
        assert_eq!(session, TraversalSession::new(TileCoord::new(0, 0, 1), dir(0)));
    }

    #[test]
    fn test_session_continues_walk() {
        let board = track(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let planner = PathPlanner::default();
        let mut session = TraversalSession::new(TileCoord::new(0, 0, 1), dir(0));

        let first = planner.plan(&board, &mut session, 2, &mut NoDraws);
        assert_eq!(first.last().map(|s| s.at.x), Some(2));
        assert_eq!(session.at, TileCoord::new(2, 0, 1));
        assert_eq!(session.previous, Some(TileCoord::new(1, 0, 1)));

        let second = planner.plan(&board, &mut session, 2, &mut NoDraws);
        let xs: Vec<i32> = second.iter().map(|s| s.at.x).collect();
        assert_eq!(xs, vec![3, 4]);
    }

    #[test]
    fn test_arrived_session_avoids_turning_back() {
        // fork with a wall ahead: west, north and south are track
        let board = track(&[(1, 2), (2, 2), (2, 1), (2, 3)]);
        let planner = PathPlanner::default();
        let at = TileCoord::new(2, 2, 1);
        let arrived = TraversalSession::arrived(&board, at, dir(0));
        let fresh = TraversalSession::new(at, dir(0));
        assert_eq!(arrived.previous, Some(TileCoord::new(1, 2, 1)));

        let mut rng = StdRng::seed_from_u64(5);
        let mut fresh_went_west = false;
        for _ in 0..100 {
            let next = planner
                .next_tile(&board, arrived.visit(), arrived.previous, &mut rng)
                .unwrap();
            assert_ne!(next.at.x, 1);
            let next = planner
                .next_tile(&board, fresh.visit(), fresh.previous, &mut rng)
                .unwrap();
            fresh_went_west |= next.at.x == 1;
        }
        assert!(fresh_went_west);
    }

    #[test]
    fn test_arrived_at_edge_has_no_previous() {
        let board = track(&[(0, 0), (1, 0)]);
        let session = TraversalSession::arrived(&board, TileCoord::new(0, 0, 1), dir(0));
        assert_eq!(session.previous, None);
        let session = TraversalSession::arrived(&board, TileCoord::new(1, 0, 1), dir(4));
        assert_eq!(session.facing, dir(0));
        assert_eq!(session.previous, Some(TileCoord::new(0, 0, 1)));
    }

    #[test]
    fn test_step_cap_stops_zero_cost_loop() {
        // ring of four tiles, every tile free
        let board = track(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        let planner = PathPlanner::new(PlannerConfig::monopoly().with_max_steps(10))
            .with_cost(CostRule::fixed(0));
        let mut session = TraversalSession::new(TileCoord::new(0, 0, 1), dir(0));
        let path = planner.plan(&board, &mut session, 5, &mut StdRng::seed_from_u64(1));
        assert!(path.is_empty());
    }

    #[test]
    fn test_plan_for_member_resolves_id() {
        let mut board = track(&[(0, 0), (1, 0), (2, 0)]);
        board.add_member(MemberId(1), TileCoord::new(0, 0, 1)).unwrap();
        let planner = PathPlanner::default();
        let path = planner.plan_for_member(&board, MemberId(1), dir(4), 2, &mut NoDraws);
        assert_eq!(path.len(), 2);
        assert_eq!(path[1].at, TileCoord::new(2, 0, 1));
    }

    #[test]
    fn test_plan_for_unknown_member_is_empty() {
        let board = track(&[(0, 0), (1, 0)]);
        let planner = PathPlanner::default();
        assert!(planner
            .plan_for_member(&board, MemberId(42), dir(0), 3, &mut NoDraws)
            .is_empty());
    }
}
