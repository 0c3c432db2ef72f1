use rand::seq::SliceRandom;
use rand_xorshift::XorShiftRng;

use crate::cells::Coordinate;
use crate::grid::Grid;
use crate::pathing::{SearchSession, Solver, SolverKind, StepAction, STEP_CAP};
use crate::utils::{self, FnvHashSet};

/// Extends a single live path one random unvisited cell at a time, popping the tail at dead ends.
///
/// With a seed the walk is reproducible: every `begin` reseeds from it.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    seed: Option<u64>,
    rng: XorShiftRng,
    session: SearchSession,
    path: Vec<Coordinate>,
    visited: FnvHashSet<Coordinate>,
}

impl RandomWalk {
    pub fn new(seed: Option<u64>) -> RandomWalk {
        RandomWalk {
            seed,
            rng: utils::xorshift_rng(seed),
            session: SearchSession::idle(),
            path: vec![],
            visited: utils::fnv_hashset(0),
        }
    }
}

impl Solver for RandomWalk {
    fn kind(&self) -> SolverKind {
        SolverKind::RandomWalk
    }

    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) {
        self.reset();
        self.rng = utils::xorshift_rng(self.seed);
        self.session = SearchSession::open(grid, start, goal);
        if self.session.is_finished() {
            return;
        }
        self.path.push(start);
        self.visited.insert(start);
        self.session.explored();
    }

    fn step(&mut self, grid: &Grid) -> bool {
        if self.session.is_finished() {
            return false;
        }
        let tail = match self.path.last() {
            Some(tail) => *tail,
            None => {
                self.session.fail();
                return false;
            }
        };
        if !self.session.advance(STEP_CAP) {
            return false;
        }

        let visited = &self.visited;
        let candidates = grid.passable_neighbours(tail)
            .into_iter()
            .filter(|next| !visited.contains(next))
            .collect::<Vec<_>>();

        match candidates.choose(&mut self.rng) {
            Some(&next) => {
                self.visited.insert(next);
                self.path.push(next);
                self.session.explored();
                self.session.record(next, StepAction::Visit);
                if next == self.session.goal() {
                    let path = self.path.clone();
                    self.session.succeed(path);
                    return false;
                }
            }
            None => {
                let _ = self.path.pop();
                self.session.record(tail, StepAction::Backtrack);
                if self.path.is_empty() {
                    self.session.fail();
                    return false;
                }
            }
        }
        true
    }

    fn current_path(&self) -> Vec<Coordinate> {
        if self.session.is_solved() {
            return self.session.path().to_vec();
        }
        self.path.clone()
    }

    fn reset(&mut self) {
        self.session = SearchSession::idle();
        self.path.clear();
        self.visited.clear();
    }

    fn session(&self) -> &SearchSession {
        &self.session
    }
}
