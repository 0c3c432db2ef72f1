//! Route finding through a grid.
//!
//! Every solver implements [`Solver`], which splits a search into an explicit resumable
//! computation: `begin` sets up a session, each `step` does one unit of work and `solution`
//! snapshots whatever the session holds. `solve` drives the whole thing in one call. The only
//! movement predicate any solver consults is `Grid::can_move`.

use log::{debug, trace};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::cells::Coordinate;
use crate::grid::Grid;

pub mod bidirectional;
pub mod distances;
pub mod frontier;
pub mod random_walk;
pub mod registry;
pub mod slime_mold;
pub mod wall_follower;

pub use self::bidirectional::Bidirectional;
pub use self::distances::{shortest_path, Distances};
pub use self::frontier::FrontierSearch;
pub use self::random_walk::RandomWalk;
pub use self::registry::{all_solvers, create_solver, default_solver, solver_for, solver_info,
                         SolverInfo, SolverKind, DEFAULT_SOLVER};
pub use self::slime_mold::SlimeMold;
pub use self::wall_follower::{Hand, WallFollower};

/// Work units a frontier, random walk or wall following search may spend before giving up.
pub const STEP_CAP: usize = 10_000;
/// Ticks a slime mold colony may spend before giving up.
pub const SLIME_MOLD_STEP_CAP: usize = 2_000;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum StepAction {
    /// The search session opened at this position.
    Start,
    /// A cell was expanded or moved onto.
    Visit,
    /// The search retreated from a dead end.
    Backtrack,
    /// Forward and backward searches met here.
    Meet,
    /// The goal was reached.
    Goal,
}

#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    pub position: Coordinate,
    pub action: StepAction,
    /// Milliseconds since the session began.
    pub timestamp: f64,
}

#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct SolutionStats {
    pub total_steps: usize,
    /// Milliseconds.
    pub time_taken: f64,
    pub nodes_explored: usize,
    pub path_length: usize,
}

/// Result of a search. The path is empty when the search did not reach the goal.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Solution {
    pub path: Vec<Coordinate>,
    pub steps: Vec<Step>,
    pub solved: bool,
    pub stats: SolutionStats,
}

/// Book keeping shared by every solver: endpoints, trace, counters and outcome.
#[derive(Clone, Debug)]
pub struct SearchSession {
    start: Coordinate,
    goal: Coordinate,
    trace: Vec<Step>,
    steps: usize,
    nodes_explored: usize,
    solved: bool,
    finished: bool,
    path: Vec<Coordinate>,
    started_at: Option<Instant>,
    elapsed: Option<Duration>,
}

impl SearchSession {
    /// A session with nothing to do. `step` on it always reports no work left.
    pub fn idle() -> SearchSession {
        SearchSession {
            start: Coordinate::planar(0, 0),
            goal: Coordinate::planar(0, 0),
            trace: vec![],
            steps: 0,
            nodes_explored: 0,
            solved: false,
            finished: true,
            path: vec![],
            started_at: None,
            elapsed: None,
        }
    }

    /// Open a session. Endpoints outside the grid finish it unsolved straight away, and a start
    /// equal to the goal finishes it solved with a single cell path.
    pub fn open(grid: &Grid, start: Coordinate, goal: Coordinate) -> SearchSession {
        let mut session = SearchSession {
            start,
            goal,
            finished: false,
            started_at: Some(Instant::now()),
            ..SearchSession::idle()
        };
        session.record(start, StepAction::Start);

        if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(goal) {
            session.fail();
        } else if start == goal {
            session.nodes_explored = 1;
            session.succeed(vec![start]);
        }
        session
    }

    #[inline]
    pub fn start(&self) -> Coordinate {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Coordinate {
        self.goal
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    #[inline]
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    #[inline]
    pub fn trace(&self) -> &[Step] {
        &self.trace
    }

    /// Count one unit of work. Returns false, finishing the session unsolved, once `cap` units
    /// have already been spent.
    pub fn advance(&mut self, cap: usize) -> bool {
        if self.steps >= cap {
            debug!("search from {} to {} hit its step cap of {}", self.start, self.goal, cap);
            self.fail();
            return false;
        }
        self.steps += 1;
        true
    }

    #[inline]
    pub fn explored(&mut self) {
        self.nodes_explored += 1;
    }

    pub fn record(&mut self, position: Coordinate, action: StepAction) {
        let timestamp = self.started_at
            .map_or(0.0, |started| duration_ms(started.elapsed()));
        self.trace.push(Step { position, action, timestamp });
    }

    pub fn succeed(&mut self, path: Vec<Coordinate>) {
        self.record(self.goal, StepAction::Goal);
        self.path = path;
        self.solved = true;
        self.finish();
    }

    pub fn fail(&mut self) {
        self.path.clear();
        self.solved = false;
        self.finish();
    }

    fn finish(&mut self) {
        self.finished = true;
        self.elapsed = self.started_at.map(|started| started.elapsed());
        trace!("search finished, solved: {}, steps: {}, explored: {}",
               self.solved,
               self.steps,
               self.nodes_explored);
    }

    pub fn solution(&self) -> Solution {
        let elapsed = self.elapsed
            .or_else(|| self.started_at.map(|started| started.elapsed()))
            .unwrap_or_default();
        Solution {
            path: self.path.clone(),
            steps: self.trace.clone(),
            solved: self.solved,
            stats: SolutionStats {
                total_steps: self.steps,
                time_taken: duration_ms(elapsed),
                nodes_explored: self.nodes_explored,
                path_length: self.path.len(),
            },
        }
    }
}

#[inline]
fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// The contract every search algorithm fulfils.
pub trait Solver: fmt::Debug {
    fn kind(&self) -> SolverKind;

    fn info(&self) -> &'static SolverInfo {
        solver_info(self.kind())
    }

    /// Reset, then open a stepping session from `start` to `goal`.
    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate);

    /// Do one unit of work. Returns true while more work remains.
    fn step(&mut self, grid: &Grid) -> bool;

    /// Best path known so far: the solution once solved, otherwise the partial route the search
    /// is currently extending.
    fn current_path(&self) -> Vec<Coordinate>;

    fn reset(&mut self);

    fn session(&self) -> &SearchSession;

    fn solution(&self) -> Solution {
        self.session().solution()
    }

    fn solve(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) -> Solution {
        self.begin(grid, start, goal);
        while self.step(grid) {}
        self.solution()
    }
}

/// Cells that can move onto `coord` in one move. Movement is checked in the direction of travel.
pub(crate) fn predecessors(grid: &Grid, coord: Coordinate) -> Vec<Coordinate> {
    let mut candidates: Vec<Coordinate> = grid.neighbours(coord).into_iter().collect();
    for linked in grid.links(coord) {
        if !candidates.contains(&linked) {
            candidates.push(linked);
        }
    }
    candidates.retain(|candidate| grid.can_move(*candidate, coord));
    candidates
}

/// Drop every loop from a walk so no cell appears twice.
pub(crate) fn erase_loops(walk: &[Coordinate]) -> Vec<Coordinate> {
    let mut path: Vec<Coordinate> = Vec::with_capacity(walk.len());
    for coord in walk {
        match path.iter().position(|c| c == coord) {
            Some(index) => path.truncate(index + 1),
            None => path.push(*coord),
        }
    }
    path
}
