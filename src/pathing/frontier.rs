use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::cells::Coordinate;
use crate::grid::Grid;
use crate::pathing::{SearchSession, Solver, SolverKind, StepAction, STEP_CAP};
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// How the open list is ordered.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
enum Ordering {
    /// Last in, first out.
    Stack,
    /// First in, first out.
    Queue,
    /// Lowest cost so far plus heuristic.
    CostAndHeuristic,
    /// Lowest cost so far.
    Cost,
    /// Lowest heuristic.
    Heuristic,
}

/// Heap entries break priority ties first in, first out.
type HeapEntry = (Reverse<u32>, Reverse<u64>, Coordinate);

#[derive(Debug, Clone)]
enum OpenList {
    Stack(Vec<Coordinate>),
    Queue(VecDeque<Coordinate>),
    Heap(BinaryHeap<HeapEntry>),
}

impl OpenList {
    fn for_ordering(ordering: Ordering) -> OpenList {
        match ordering {
            Ordering::Stack => OpenList::Stack(vec![]),
            Ordering::Queue => OpenList::Queue(VecDeque::new()),
            _ => OpenList::Heap(BinaryHeap::new()),
        }
    }

    fn pop(&mut self) -> Option<Coordinate> {
        match *self {
            OpenList::Stack(ref mut stack) => stack.pop(),
            OpenList::Queue(ref mut queue) => queue.pop_front(),
            OpenList::Heap(ref mut heap) => heap.pop().map(|(_, _, coord)| coord),
        }
    }

    fn clear(&mut self) {
        match *self {
            OpenList::Stack(ref mut stack) => stack.clear(),
            OpenList::Queue(ref mut queue) => queue.clear(),
            OpenList::Heap(ref mut heap) => heap.clear(),
        }
    }
}

/// Graph search with an explicit open list and parent pointers: depth first, breadth first,
/// A*, Dijkstra and greedy best first differ only in how the open list is ordered.
///
/// Every move costs 1. The heuristic is the Manhattan distance to the goal over all three axes:
/// layer changes count as well as lateral distance. It stays admissible because a climb or a
/// descent also costs 1, but on 3-D grids greedy best first expands cells in a different order
/// than a planar x + y estimate would give.
#[derive(Debug, Clone)]
pub struct FrontierSearch {
    kind: SolverKind,
    ordering: Ordering,
    session: SearchSession,
    open: OpenList,
    parents: FnvHashMap<Coordinate, Coordinate>,
    costs: FnvHashMap<Coordinate, u32>,
    closed: FnvHashSet<Coordinate>,
    pushed: u64,
    current: Option<Coordinate>,
}

impl FrontierSearch {
    fn new(kind: SolverKind, ordering: Ordering) -> FrontierSearch {
        FrontierSearch {
            kind,
            ordering,
            session: SearchSession::idle(),
            open: OpenList::for_ordering(ordering),
            parents: utils::fnv_hashmap(0),
            costs: utils::fnv_hashmap(0),
            closed: utils::fnv_hashset(0),
            pushed: 0,
            current: None,
        }
    }

    pub fn depth_first() -> FrontierSearch {
        FrontierSearch::new(SolverKind::DepthFirst, Ordering::Stack)
    }

    pub fn breadth_first() -> FrontierSearch {
        FrontierSearch::new(SolverKind::BreadthFirst, Ordering::Queue)
    }

    pub fn a_star() -> FrontierSearch {
        FrontierSearch::new(SolverKind::AStar, Ordering::CostAndHeuristic)
    }

    pub fn dijkstra() -> FrontierSearch {
        FrontierSearch::new(SolverKind::Dijkstra, Ordering::Cost)
    }

    pub fn greedy_best_first() -> FrontierSearch {
        FrontierSearch::new(SolverKind::GreedyBestFirst, Ordering::Heuristic)
    }

    fn heuristic(&self, coord: Coordinate) -> u32 {
        coord.manhattan_distance(self.session.goal())
    }

    fn push(&mut self, coord: Coordinate, cost: u32) {
        let priority = match self.ordering {
            Ordering::CostAndHeuristic => cost.saturating_add(self.heuristic(coord)),
            Ordering::Cost => cost,
            Ordering::Heuristic => self.heuristic(coord),
            Ordering::Stack | Ordering::Queue => 0,
        };
        self.pushed += 1;
        let order = self.pushed;
        match self.open {
            OpenList::Stack(ref mut stack) => stack.push(coord),
            OpenList::Queue(ref mut queue) => queue.push_back(coord),
            OpenList::Heap(ref mut heap) => heap.push((Reverse(priority), Reverse(order), coord)),
        }
    }

    /// Next open cell not already closed. Stale heap and stack entries are skipped lazily.
    fn next_open(&mut self) -> Option<Coordinate> {
        while let Some(coord) = self.open.pop() {
            if !self.closed.contains(&coord) {
                return Some(coord);
            }
        }
        None
    }

    fn expand(&mut self, grid: &Grid, coord: Coordinate) {
        let cost = self.costs.get(&coord).cloned().unwrap_or(0);
        let next_cost = cost.saturating_add(1);
        let mut neighbours = grid.passable_neighbours(coord);
        if self.ordering == Ordering::Stack {
            // First listed neighbour is popped first.
            neighbours.reverse();
        }

        for neighbour in neighbours {
            if self.closed.contains(&neighbour) {
                continue;
            }
            match self.ordering {
                Ordering::Stack => {
                    self.parents.insert(neighbour, coord);
                    self.push(neighbour, next_cost);
                }
                Ordering::Queue => {
                    if !self.costs.contains_key(&neighbour) {
                        self.costs.insert(neighbour, next_cost);
                        self.parents.insert(neighbour, coord);
                        self.push(neighbour, next_cost);
                    }
                }
                _ => {
                    let improves = self.costs.get(&neighbour).map_or(true, |known| next_cost < *known);
                    if improves {
                        self.costs.insert(neighbour, next_cost);
                        self.parents.insert(neighbour, coord);
                        self.push(neighbour, next_cost);
                    }
                }
            }
        }
    }

    fn path_to(&self, end: Coordinate) -> Vec<Coordinate> {
        let start = self.session.start();
        let mut path = vec![end];
        let mut coord = end;
        while coord != start {
            match self.parents.get(&coord) {
                Some(parent) if path.len() <= self.parents.len() => {
                    coord = *parent;
                    path.push(coord);
                }
                _ => return vec![],
            }
        }
        path.reverse();
        path
    }
}

impl Solver for FrontierSearch {
    fn kind(&self) -> SolverKind {
        self.kind
    }

    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) {
        self.reset();
        self.session = SearchSession::open(grid, start, goal);
        if self.session.is_finished() {
            return;
        }
        self.costs.insert(start, 0);
        self.push(start, 0);
    }

    fn step(&mut self, grid: &Grid) -> bool {
        if self.session.is_finished() {
            return false;
        }
        let coord = match self.next_open() {
            Some(coord) => coord,
            None => {
                self.session.fail();
                return false;
            }
        };
        if !self.session.advance(STEP_CAP) {
            return false;
        }

        self.closed.insert(coord);
        self.current = Some(coord);
        self.session.explored();
        self.session.record(coord, StepAction::Visit);

        if coord == self.session.goal() {
            let path = self.path_to(coord);
            self.session.succeed(path);
            return false;
        }

        self.expand(grid, coord);
        true
    }

    fn current_path(&self) -> Vec<Coordinate> {
        if self.session.is_solved() {
            return self.session.path().to_vec();
        }
        self.current.map_or_else(Vec::new, |coord| self.path_to(coord))
    }

    fn reset(&mut self) {
        self.session = SearchSession::idle();
        self.open.clear();
        self.parents.clear();
        self.costs.clear();
        self.closed.clear();
        self.pushed = 0;
        self.current = None;
    }

    fn session(&self) -> &SearchSession {
        &self.session
    }
}
