use crate::cells::{Coordinate, Direction};
use crate::grid::Grid;
use crate::pathing::{self, SearchSession, Solver, SolverKind, StepAction, STEP_CAP};

/// Which wall the follower keeps a hand on.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Hand {
    Left,
    Right,
}

/// Directions in clockwise order looking down on a layer, with the climb and the descent
/// sitting between West and North.
const CLOCKWISE: [Direction; 6] = [Direction::North,
                                   Direction::East,
                                   Direction::South,
                                   Direction::West,
                                   Direction::Up,
                                   Direction::Down];

impl Hand {
    /// Facings to try after moving towards `facing`. The left hand sweeps clockwise from the
    /// side it came in by, the right hand anticlockwise, so on a layer the order is towards the
    /// hand, straight on, away from the hand, then back. The way back is always last.
    fn preferences(self, facing: Direction) -> [Direction; 6] {
        let came_from = facing.opposite();
        let from_index = CLOCKWISE.iter().position(|dir| *dir == came_from).unwrap_or(0);
        let mut order = [came_from; 6];
        for (offset, slot) in (1..=CLOCKWISE.len()).zip(order.iter_mut()) {
            let index = match self {
                Hand::Left => from_index + offset,
                Hand::Right => from_index + CLOCKWISE.len() - offset,
            };
            *slot = CLOCKWISE[index % CLOCKWISE.len()];
        }
        order
    }
}

/// Walks the maze keeping one hand on the wall, climbing or descending between layers where a
/// passage allows. Links are never taken, so loops or links can defeat it; such runs end at the
/// step cap. Any maze without loops is walked to the goal. The reported path has its loops
/// erased.
#[derive(Debug, Clone)]
pub struct WallFollower {
    hand: Hand,
    session: SearchSession,
    position: Option<Coordinate>,
    facing: Direction,
    trail: Vec<Coordinate>,
}

impl WallFollower {
    pub fn new(hand: Hand) -> WallFollower {
        WallFollower {
            hand,
            session: SearchSession::idle(),
            position: None,
            facing: Direction::East,
            trail: vec![],
        }
    }

    pub fn left_hand() -> WallFollower {
        WallFollower::new(Hand::Left)
    }

    pub fn right_hand() -> WallFollower {
        WallFollower::new(Hand::Right)
    }

    #[inline]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    fn move_to(&mut self, next: Coordinate) {
        match self.trail.iter().position(|c| *c == next) {
            Some(index) => {
                self.trail.truncate(index + 1);
                self.session.record(next, StepAction::Backtrack);
            }
            None => {
                self.trail.push(next);
                self.session.explored();
                self.session.record(next, StepAction::Visit);
            }
        }
        self.position = Some(next);
    }
}

impl Solver for WallFollower {
    fn kind(&self) -> SolverKind {
        match self.hand {
            Hand::Left => SolverKind::LeftHandRule,
            Hand::Right => SolverKind::RightHandRule,
        }
    }

    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) {
        self.reset();
        self.session = SearchSession::open(grid, start, goal);
        if self.session.is_finished() {
            return;
        }
        self.position = Some(start);
        self.trail.push(start);
        self.session.explored();
    }

    fn step(&mut self, grid: &Grid) -> bool {
        if self.session.is_finished() {
            return false;
        }
        let position = match self.position {
            Some(position) => position,
            None => return false,
        };
        if !self.session.advance(STEP_CAP) {
            return false;
        }

        let choice = self.hand
            .preferences(self.facing)
            .iter()
            .cloned()
            .filter_map(|dir| grid.neighbour_at_direction(position, dir).map(|next| (dir, next)))
            .find(|&(_, next)| grid.can_move(position, next));

        match choice {
            Some((dir, next)) => {
                self.facing = dir;
                self.move_to(next);
                if next == self.session.goal() {
                    let path = pathing::erase_loops(&self.trail);
                    self.session.succeed(path);
                    return false;
                }
                true
            }
            None => {
                // Walled in on every side.
                self.session.fail();
                false
            }
        }
    }

    fn current_path(&self) -> Vec<Coordinate> {
        if self.session.is_solved() {
            return self.session.path().to_vec();
        }
        self.trail.clone()
    }

    fn reset(&mut self) {
        self.session = SearchSession::idle();
        self.position = None;
        self.facing = Direction::East;
        self.trail.clear();
    }

    fn session(&self) -> &SearchSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, GenerationAlgorithm};
    use crate::generators;
    use crate::pathing::fixtures::*;
    use itertools::Itertools;

    #[test]
    fn preference_orders() {
        let lateral = |order: [Direction; 6]| {
            order.iter().cloned().filter(|dir| !dir.is_vertical()).collect::<Vec<_>>()
        };
        assert_eq!(lateral(Hand::Left.preferences(Direction::North)),
                   vec![Direction::West, Direction::North, Direction::East, Direction::South]);
        assert_eq!(lateral(Hand::Right.preferences(Direction::North)),
                   vec![Direction::East, Direction::North, Direction::West, Direction::South]);
        assert_eq!(Hand::Left.preferences(Direction::Up),
                   [Direction::North,
                    Direction::East,
                    Direction::South,
                    Direction::West,
                    Direction::Up,
                    Direction::Down]);
        for hand in &[Hand::Left, Hand::Right] {
            for facing in Direction::ALL.iter() {
                let order = hand.preferences(*facing);
                assert_eq!(order[5], facing.opposite());
                assert_eq!(order.iter().unique().count(), 6);
            }
        }
    }

    #[test]
    fn climbs_between_layers() {
        let mut grid = Grid::create(&Configuration::maze_3d(3, 1, 2)).unwrap();
        let c = Coordinate::new;
        grid.set_wall(c(0, 0, 0), Direction::East, false);
        grid.set_wall(c(1, 0, 0), Direction::East, false);
        grid.set_wall(c(1, 0, 0), Direction::Up, false);
        grid.set_wall(c(1, 0, 1), Direction::East, false);

        for mut follower in vec![WallFollower::left_hand(), WallFollower::right_hand()] {
            let solution = follower.solve(&grid, c(0, 0, 0), c(2, 0, 1));
            assert!(solution.solved);
            assert_eq!(solution.path, vec![c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(2, 0, 1)]);
        }
    }

    #[test]
    fn layered_mazes_without_loops_are_solved() {
        // Small layers get exactly one passage per layer pair, so the maze stays a tree.
        for seed in 0..5 {
            let grid = generators::generate(&Configuration::maze_3d(4, 4, 3).with_seed(seed))
                .unwrap();
            let (start, goal) = (generators::start(&grid), generators::goal(&grid));
            for mut follower in vec![WallFollower::left_hand(), WallFollower::right_hand()] {
                let solution = follower.solve(&grid, start, goal);
                assert!(solution.solved);
                assert_walkable(&grid, &solution.path);
            }
        }
    }

    #[test]
    fn reset_then_solve_again() {
        let config = Configuration::maze_2d(8, 6).with_seed(12);
        let grid = generators::generate(&config).unwrap();
        let (start, goal) = (generators::start(&grid), generators::goal(&grid));
        for mut follower in vec![WallFollower::left_hand(), WallFollower::right_hand()] {
            let first = follower.solve(&grid, start, goal);
            follower.reset();
            assert!(follower.current_path().is_empty());
            assert_eq!(follower.facing(), Direction::East);
            let second = follower.solve(&grid, start, goal);
            assert!(first.solved && second.solved);
            assert_eq!(first.path, second.path);
            assert_eq!(first.stats.total_steps, second.stats.total_steps);
        }
    }

    #[test]
    fn both_hands_walk_the_corridor() {
        let grid = corridor();
        let (start, goal) = corners();
        for mut follower in vec![WallFollower::left_hand(), WallFollower::right_hand()] {
            let solution = follower.solve(&grid, start, goal);
            assert!(solution.solved);
            assert_eq!(solution.path.len(), 9);
            assert_eq!(follower.facing(), Direction::South);
        }
    }

    #[test]
    fn perfect_mazes_are_solved_with_simple_paths() {
        for seed in 0..5 {
            let config = Configuration::maze_2d(7, 5)
                .with_seed(seed)
                .with_algorithm(GenerationAlgorithm::Prim);
            let grid = generators::generate(&config).unwrap();
            let (start, goal) = (generators::start(&grid), generators::goal(&grid));
            for mut follower in vec![WallFollower::left_hand(), WallFollower::right_hand()] {
                let solution = follower.solve(&grid, start, goal);
                assert!(solution.solved);
                assert_walkable(&grid, &solution.path);
                assert_eq!(solution.path.iter().unique().count(), solution.path.len());
            }
        }
    }

    #[test]
    fn island_loop_hits_the_cap() {
        // Goal sits inside a walled off pocket; the follower circles the room until the cap.
        let mut grid = open_room();
        let goal = Coordinate::planar(2, 2);
        for dir in Direction::LATERAL.iter() {
            grid.set_wall(goal, *dir, true);
        }
        let solution = WallFollower::left_hand().solve(&grid, Coordinate::planar(0, 0), goal);
        assert!(!solution.solved);
        assert_eq!(solution.stats.total_steps, STEP_CAP);
    }

    #[test]
    fn kinds() {
        assert_eq!(WallFollower::left_hand().kind(), SolverKind::LeftHandRule);
        assert_eq!(WallFollower::right_hand().kind(), SolverKind::RightHandRule);
    }
}
