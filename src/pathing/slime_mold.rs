use log::trace;
use rand::Rng;
use rand_xorshift::XorShiftRng;
use std::cmp;

use crate::cells::Coordinate;
use crate::grid::Grid;
use crate::pathing::{self, SearchSession, Solver, SolverKind, StepAction, SLIME_MOLD_STEP_CAP};
use crate::units::{Depth, Height, Width};
use crate::utils::{self, FnvHashMap, FnvHashSet};

const AGENTS_COUNT: usize = 24;
const PHEROMONE_DEPOSIT: f64 = 1.0;
const PHEROMONE_CAP: f64 = 10.0;
const PHEROMONE_DECAY: f64 = 0.95;
const PHEROMONE_FLOOR: f64 = 0.01;
const RECONSTRUCTION_THRESHOLD: f64 = 0.05;

const HEADING_WEIGHT: f64 = 0.3;
const PHEROMONE_WEIGHT: f64 = 0.4;
const PROXIMITY_WEIGHT: f64 = 0.5;
const JITTER_WEIGHT: f64 = 0.2;

type Vector = (f64, f64, f64);

#[derive(Debug, Clone)]
struct Agent {
    position: Coordinate,
    heading: Vector,
    speed: f64,
    /// Cells from the start to the current position. Extended on every advance, retracted at
    /// dead ends, so it never holds a loop.
    tube: Vec<Coordinate>,
    visited: FnvHashSet<Coordinate>,
    moves: usize,
    active: bool,
}

/// A colony of agents spreading from the start. Each agent extends its tube into a cell it has
/// not visited yet, choosing by its heading, by the pheromone the colony lays and by the goal's
/// proximity, and retracts the tube when nothing new is in reach. An agent goes dormant once
/// it has retracted all the way to the start or has used up its moves.
///
/// The route is read back from the goal by always stepping to the strongest pheromone cell not
/// yet on the route. When the trail is too faint to reach the start that way, the successful
/// agent's tube is reported instead.
#[derive(Debug, Clone)]
pub struct SlimeMold {
    seed: Option<u64>,
    rng: XorShiftRng,
    session: SearchSession,
    agents: Vec<Agent>,
    pheromones: FnvHashMap<Coordinate, f64>,
    explored: FnvHashSet<Coordinate>,
    move_cap: usize,
    proximity_scale: f64,
}

impl SlimeMold {
    pub fn new(seed: Option<u64>) -> SlimeMold {
        SlimeMold {
            seed,
            rng: utils::xorshift_rng(seed),
            session: SearchSession::idle(),
            agents: vec![],
            pheromones: utils::fnv_hashmap(0),
            explored: utils::fnv_hashset(0),
            move_cap: 0,
            proximity_scale: 1.0,
        }
    }

    /// Pheromone strength at a cell, 0 where none is left.
    pub fn pheromone(&self, coord: Coordinate) -> f64 {
        self.pheromones.get(&coord).cloned().unwrap_or(0.0)
    }

    pub fn active_agents(&self) -> usize {
        self.agents.iter().filter(|agent| agent.active).count()
    }

    fn deposit(&mut self, coord: Coordinate, speed: f64) {
        let strength = self.pheromones.entry(coord).or_insert(0.0);
        *strength = (*strength + PHEROMONE_DEPOSIT * speed).min(PHEROMONE_CAP);
    }

    fn decay(&mut self) {
        for strength in self.pheromones.values_mut() {
            *strength *= PHEROMONE_DECAY;
        }
        self.pheromones.retain(|_, strength| *strength >= PHEROMONE_FLOOR);
    }

    fn random_heading(&mut self, three_d: bool) -> Vector {
        let angle = self.rng.gen_range(0.0..std::f64::consts::PI * 2.0);
        let z = if three_d { self.rng.gen_range(-0.5..0.5) } else { 0.0 };
        normalise((angle.cos(), angle.sin(), z))
    }

    /// Move one agent. Returns true when it stepped onto the goal.
    fn advance_agent(&mut self, grid: &Grid, index: usize) -> bool {
        let goal = self.session.goal();
        let (position, heading) = {
            let agent = &self.agents[index];
            (agent.position, agent.heading)
        };

        let candidates = {
            let visited = &self.agents[index].visited;
            grid.passable_neighbours(position)
                .into_iter()
                .filter(|next| !visited.contains(next))
                .collect::<Vec<_>>()
        };
        if candidates.is_empty() {
            self.retract(index);
            return false;
        }

        let mut best: Option<(f64, Coordinate)> = None;
        for next in candidates {
            let alignment = dot(heading, normalise(difference(next, position)));
            let proximity = 1.0 - f64::from(next.manhattan_distance(goal)) / self.proximity_scale;
            let jitter: f64 = self.rng.gen();
            let score = HEADING_WEIGHT * alignment +
                        PHEROMONE_WEIGHT * self.pheromone(next) / PHEROMONE_CAP +
                        PROXIMITY_WEIGHT * proximity + JITTER_WEIGHT * jitter;
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, next));
            }
        }
        let next = match best {
            Some((_, next)) => next,
            None => return false,
        };

        let speed = self.agents[index].speed;
        self.deposit(next, speed);
        if self.explored.insert(next) {
            self.session.explored();
        }

        let agent = &mut self.agents[index];
        agent.heading = normalise(difference(next, agent.position));
        agent.position = next;
        agent.tube.push(next);
        agent.visited.insert(next);
        self.spend_move(index);
        next == goal
    }

    /// Pull the agent's tube back one cell. With nothing left to pull back into, the agent
    /// goes dormant.
    fn retract(&mut self, index: usize) {
        let back = {
            let tube = &mut self.agents[index].tube;
            let _ = tube.pop();
            tube.last().cloned()
        };
        match back {
            Some(back) => {
                let agent = &mut self.agents[index];
                agent.heading = normalise(difference(back, agent.position));
                agent.position = back;
                self.spend_move(index);
            }
            None => {
                self.agents[index].active = false;
                trace!("slime mold agent {} has nothing left to explore", index);
            }
        }
    }

    fn spend_move(&mut self, index: usize) {
        let move_cap = self.move_cap;
        let agent = &mut self.agents[index];
        agent.moves += 1;
        if agent.moves > move_cap {
            agent.active = false;
            trace!("slime mold agent {} used up its moves at {}", index, agent.position);
        }
    }

    /// Walk back from the goal along the strongest pheromone. None when the trail goes cold.
    fn pheromone_route(&self, grid: &Grid) -> Option<Vec<Coordinate>> {
        let (start, goal) = (self.session.start(), self.session.goal());
        let mut route = vec![goal];
        let mut on_route = utils::fnv_hashset(grid.size());
        on_route.insert(goal);
        let mut current = goal;

        while current != start {
            if route.len() > grid.size() {
                return None;
            }
            let predecessors = pathing::predecessors(grid, current);
            let next = if predecessors.contains(&start) {
                start
            } else {
                let strongest = predecessors.into_iter()
                    .filter(|c| !on_route.contains(c))
                    .map(|c| (self.pheromone(c), c))
                    .fold(None, |best: Option<(f64, Coordinate)>, candidate| match best {
                        Some(b) if b.0 >= candidate.0 => Some(b),
                        _ => Some(candidate),
                    });
                match strongest {
                    Some((strength, c)) if strength >= RECONSTRUCTION_THRESHOLD => c,
                    _ => return None,
                }
            };
            on_route.insert(next);
            route.push(next);
            current = next;
        }

        route.reverse();
        Some(route)
    }
}

impl Solver for SlimeMold {
    fn kind(&self) -> SolverKind {
        SolverKind::SlimeMold
    }

    fn begin(&mut self, grid: &Grid, start: Coordinate, goal: Coordinate) {
        self.reset();
        self.rng = utils::xorshift_rng(self.seed);
        self.session = SearchSession::open(grid, start, goal);
        if self.session.is_finished() {
            return;
        }

        let dimensions = grid.dimensions();
        let (Width(w), Height(h), Depth(d)) = (dimensions.width(), dimensions.height(),
                                               dimensions.depth());
        // Exploring everything within reach takes at most two moves per cell.
        self.move_cap = cmp::max(64, grid.size() * 4);
        self.proximity_scale = cmp::max(1, w + h + d) as f64;
        let three_d = d > 1;

        for _ in 0..AGENTS_COUNT {
            let heading = self.random_heading(three_d);
            let speed = self.rng.gen_range(0.5..1.5);
            self.deposit(start, speed);
            let mut visited = utils::fnv_hashset(grid.size());
            visited.insert(start);
            self.agents.push(Agent {
                position: start,
                heading,
                speed,
                tube: vec![start],
                visited,
                moves: 0,
                active: true,
            });
        }
        self.explored.insert(start);
        self.session.explored();
    }

    fn step(&mut self, grid: &Grid) -> bool {
        if self.session.is_finished() {
            return false;
        }
        if !self.session.advance(SLIME_MOLD_STEP_CAP) {
            return false;
        }

        for index in 0..self.agents.len() {
            if !self.agents[index].active {
                continue;
            }
            if self.advance_agent(grid, index) {
                let goal = self.session.goal();
                self.session.record(goal, StepAction::Visit);
                let path = self.pheromone_route(grid)
                    .unwrap_or_else(|| self.agents[index].tube.clone());
                self.session.succeed(path);
                return false;
            }
        }

        self.decay();
        let lead = self.agents
            .iter()
            .find(|agent| agent.active)
            .map(|agent| agent.position);
        match lead {
            Some(position) => {
                self.session.record(position, StepAction::Visit);
                true
            }
            None => {
                self.session.fail();
                false
            }
        }
    }

    /// The tube of the agent closest to the goal.
    fn current_path(&self) -> Vec<Coordinate> {
        if self.session.is_solved() {
            return self.session.path().to_vec();
        }
        let goal = self.session.goal();
        self.agents
            .iter()
            .min_by_key(|agent| agent.position.manhattan_distance(goal))
            .map_or_else(Vec::new, |agent| agent.tube.clone())
    }

    fn reset(&mut self) {
        self.session = SearchSession::idle();
        self.agents.clear();
        self.pheromones.clear();
        self.explored.clear();
        self.move_cap = 0;
        self.proximity_scale = 1.0;
    }

    fn session(&self) -> &SearchSession {
        &self.session
    }
}

#[inline]
fn difference(to: Coordinate, from: Coordinate) -> Vector {
    (f64::from(to.x) - f64::from(from.x),
     f64::from(to.y) - f64::from(from.y),
     f64::from(to.z) - f64::from(from.z))
}

#[inline]
fn dot(a: Vector, b: Vector) -> f64 {
    a.0 * b.0 + a.1 * b.1 + a.2 * b.2
}

fn normalise(v: Vector) -> Vector {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        v
    } else {
        (v.0 / length, v.1 / length, v.2 / length)
    }
}
