use std::collections::VecDeque;

use crate::cells::Coordinate;
use crate::grid::Grid;
use crate::pathing::{self, SearchSession, Solver, SolverKind, StepAction, STEP_CAP};
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// One direction of the search: a breadth first frontier with its own bookkeeping.
#[derive(Debug, Clone)]
struct Side {
    queue: VecDeque<Coordinate>,
    parents: FnvHashMap<Coordinate, Coordinate>,
    distances: FnvHashMap<Coordinate, u32>,
    closed: FnvHashSet<Coordinate>,
    last_closed: Option<Coordinate>,
}

impl Side {
    fn new() -> Side {
        Side {
            queue: VecDeque::new(),
            parents: utils::fnv_hashmap(0),
            distances: utils::fnv_hashmap(0),
            closed: utils::fnv_hashset(0),
            last_closed: None,
        }
    }

    fn rooted_at(root: Coordinate) -> Side {
        let mut side = Side::new();
        side.distances.insert(root, 0);
        side.queue.push_back(root);
        side
    }

    fn chain(&self, from: Coordinate) -> Vec<Coordinate> {
        let mut chain = vec![from];
        let mut coord = from;
        while let Some(parent) = self.parents.get(&coord) {
            if chain.len() > self.parents.len() {
                break;
            }
            coord = *parent;
            chain.push(coord);
        }
        chain
    }
}

/// Breadth first searches from both ends, alternating one expansion at a time.
///
/// The backward side follows moves in reverse, so it only ever steps from a cell onto the cell
/// that can move into it. The search stops once a cell has been closed by both sides; the route
/// then goes through the cell discovered by both with the smallest combined distance.
#[derive(Debug, Clone)]
pub struct Bidirectional {
    session: SearchSession,
    forward: Side,
    backward: Side,
    forward_turn: bool,
}

impl Bidirectional {
    pub fn new() -> Bidirectional {
        Bidirectional {
            session: SearchSession::idle(),
            forward: Side::new(),
            backward: Side::new(),
            forward_turn: true,
        }
    }

    fn meeting_path(&self) -> Vec<Coordinate> {
        let best = self.forward
            .distances
            .iter()
            .filter_map(|(coord, forward_distance)| {
                self.backward
                    .distances
                    .get(coord)
                    .map(|backward_distance| (forward_distance + backward_distance, *coord))
            })
            .min();

        match best {
            Some((_, meeting)) => {
                let mut path = self.forward.chain(meeting);
                path.reverse();
                path.extend(self.backward.chain(meeting).into_iter().skip(1));
                path
            }
            None => vec![],
        }
    }
}

impl Default for Bidirectional {
    fn default() -> Self {
        Bidirectional::new()
    }
}

impl Solver for Bidirectional {
    fn kind(&self) -> SolverKind {
        SolverKind::Bidirectional
    }

    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) {
        self.reset();
        self.session = SearchSession::open(grid, start, goal);
        if self.session.is_finished() {
            return;
        }
        self.forward = Side::rooted_at(start);
        self.backward = Side::rooted_at(goal);
    }

    fn step(&mut self, grid: &Grid) -> bool {
        if self.session.is_finished() {
            return false;
        }
        if !self.session.advance(STEP_CAP) {
            return false;
        }

        let forward_turn = self.forward_turn;
        self.forward_turn = !forward_turn;
        let (side, other) = if forward_turn {
            (&mut self.forward, &self.backward)
        } else {
            (&mut self.backward, &self.forward)
        };

        let coord = loop {
            match side.queue.pop_front() {
                Some(coord) if side.closed.contains(&coord) => continue,
                Some(coord) => break coord,
                None => {
                    // One side has used up its whole component without meeting the other.
                    self.session.fail();
                    return false;
                }
            }
        };

        side.closed.insert(coord);
        side.last_closed = Some(coord);
        let met = other.closed.contains(&coord);

        if !met {
            let distance = side.distances.get(&coord).cloned().unwrap_or(0) + 1;
            let next = if forward_turn {
                grid.passable_neighbours(coord).into_iter().collect::<Vec<_>>()
            } else {
                pathing::predecessors(grid, coord)
            };
            for neighbour in next {
                if !side.distances.contains_key(&neighbour) {
                    side.distances.insert(neighbour, distance);
                    side.parents.insert(neighbour, coord);
                    side.queue.push_back(neighbour);
                }
            }
        }

        self.session.explored();
        self.session.record(coord, StepAction::Visit);
        if met {
            self.session.record(coord, StepAction::Meet);
            let path = self.meeting_path();
            self.session.succeed(path);
            return false;
        }
        true
    }

    fn current_path(&self) -> Vec<Coordinate> {
        if self.session.is_solved() {
            return self.session.path().to_vec();
        }
        match self.forward.last_closed {
            Some(coord) => {
                let mut path = self.forward.chain(coord);
                path.reverse();
                path
            }
            None => vec![],
        }
    }

    fn reset(&mut self) {
        self.session = SearchSession::idle();
        self.forward = Side::new();
        self.backward = Side::new();
        self.forward_turn = true;
    }

    fn session(&self) -> &SearchSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::generators;
    use crate::pathing::fixtures::*;
    use crate::pathing::FrontierSearch;

    #[test]
    fn walks_the_corridor() {
        let grid = corridor();
        let (start, goal) = corners();
        let solution = Bidirectional::new().solve(&grid, start, goal);
        assert!(solution.solved);
        assert_eq!(solution.path.len(), 9);
        assert_eq!(solution.path.first(), Some(&start));
        assert_eq!(solution.path.last(), Some(&goal));
        assert_walkable(&grid, &solution.path);
        assert!(solution.steps.iter().any(|step| step.action == StepAction::Meet));
    }

    #[test]
    fn matches_breadth_first_lengths() {
        let grid = open_room();
        for &(start, goal) in &[(Coordinate::planar(0, 0), Coordinate::planar(4, 4)),
                                (Coordinate::planar(2, 0), Coordinate::planar(2, 4)),
                                (Coordinate::planar(0, 3), Coordinate::planar(1, 3))] {
            let ours = Bidirectional::new().solve(&grid, start, goal);
            let bfs = FrontierSearch::breadth_first().solve(&grid, start, goal);
            assert_eq!(ours.path.len(), bfs.path.len());
            assert_walkable(&grid, &ours.path);
        }
    }

    #[test]
    fn with_links_in_a_generated_maze() {
        let mut config = Configuration::maze_2d(9, 9).with_seed(21);
        config.fifth_dimension = Some(crate::config::FifthDimensionConfig {
            enabled: true,
            linkage_count: 3,
        });
        let grid = generators::generate(&config).unwrap();
        let (start, goal) = (generators::start(&grid), generators::goal(&grid));
        let ours = Bidirectional::new().solve(&grid, start, goal);
        let bfs = FrontierSearch::breadth_first().solve(&grid, start, goal);
        assert!(ours.solved);
        assert_eq!(ours.path.len(), bfs.path.len());
        assert_walkable(&grid, &ours.path);
    }

    #[test]
    fn reset_is_idempotent() {
        let grid = open_room();
        let (start, goal) = corners();
        let mut solver = Bidirectional::new();
        let first = solver.solve(&grid, start, goal);
        solver.reset();
        let second = solver.solve(&grid, start, goal);
        assert_eq!(first.path, second.path);
        assert_eq!(first.solved, second.solved);
    }
}
