use lazy_static::lazy_static;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::*;
use crate::pathing::{Bidirectional, FrontierSearch, RandomWalk, SlimeMold, Solver, WallFollower};

#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum SolverKind {
    RandomWalk,
    DepthFirst,
    BreadthFirst,
    AStar,
    Dijkstra,
    GreedyBestFirst,
    Bidirectional,
    LeftHandRule,
    RightHandRule,
    SlimeMold,
}

impl SolverKind {
    /// Catalog order.
    pub const ALL: [SolverKind; 10] = [SolverKind::RandomWalk,
                                       SolverKind::DepthFirst,
                                       SolverKind::BreadthFirst,
                                       SolverKind::AStar,
                                       SolverKind::Dijkstra,
                                       SolverKind::GreedyBestFirst,
                                       SolverKind::Bidirectional,
                                       SolverKind::LeftHandRule,
                                       SolverKind::RightHandRule,
                                       SolverKind::SlimeMold];

    pub fn identifier(self) -> &'static str {
        match self {
            SolverKind::RandomWalk => "random-walk",
            SolverKind::DepthFirst => "dfs",
            SolverKind::BreadthFirst => "bfs",
            SolverKind::AStar => "astar",
            SolverKind::Dijkstra => "dijkstra",
            SolverKind::GreedyBestFirst => "greedy",
            SolverKind::Bidirectional => "bidirectional",
            SolverKind::LeftHandRule => "left-hand",
            SolverKind::RightHandRule => "right-hand",
            SolverKind::SlimeMold => "slime-mold",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for SolverKind {
    type Err = Error;

    fn from_str(identifier: &str) -> Result<SolverKind> {
        SolverKind::ALL
            .iter()
            .cloned()
            .find(|kind| kind.identifier() == identifier)
            .ok_or_else(|| ErrorKind::UnknownSolverType(identifier.to_owned()).into())
    }
}

/// What a selection UI needs to know about a solver.
#[derive(Eq, PartialEq, Clone, Debug, Serialize)]
pub struct SolverInfo {
    pub kind: SolverKind,
    pub identifier: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Always returns a shortest path when it finds one.
    pub optimal: bool,
    /// Always finds a path when one exists.
    pub complete: bool,
}

fn describe(kind: SolverKind) -> SolverInfo {
    let (name, description, optimal, complete) = match kind {
        SolverKind::RandomWalk => {
            ("Random Walk",
             "Extends one path through random unvisited cells, backing up at dead ends.",
             false,
             false)
        }
        SolverKind::DepthFirst => {
            ("Depth First Search",
             "Explores as deep as possible along each branch before backtracking.",
             false,
             true)
        }
        SolverKind::BreadthFirst => {
            ("Breadth First Search",
             "Explores every cell at one distance before moving further out.",
             true,
             true)
        }
        SolverKind::AStar => {
            ("A*",
             "Expands the cell with the lowest cost so far plus Manhattan distance to the goal.",
             true,
             true)
        }
        SolverKind::Dijkstra => {
            ("Dijkstra",
             "Expands the cell with the lowest cost so far.",
             true,
             true)
        }
        SolverKind::GreedyBestFirst => {
            ("Greedy Best First",
             "Expands the cell that looks closest to the goal, ignoring the cost so far.",
             false,
             false)
        }
        SolverKind::Bidirectional => {
            ("Bidirectional Search",
             "Breadth first searches from both ends that stop where they meet.",
             true,
             true)
        }
        SolverKind::LeftHandRule => {
            ("Left Hand Rule",
             "Follows the wall on the left, climbing between layers. Loops can defeat it.",
             false,
             false)
        }
        SolverKind::RightHandRule => {
            ("Right Hand Rule",
             "Follows the wall on the right, climbing between layers. Loops can defeat it.",
             false,
             false)
        }
        SolverKind::SlimeMold => {
            ("Slime Mold",
             "A colony of agents laying decaying pheromone trails towards the goal.",
             false,
             false)
        }
    };
    SolverInfo {
        kind,
        identifier: kind.identifier(),
        name,
        description,
        optimal,
        complete,
    }
}

lazy_static! {
    static ref CATALOG: Vec<SolverInfo> = SolverKind::ALL.iter().cloned().map(describe).collect();
}

pub const DEFAULT_SOLVER: SolverKind = SolverKind::AStar;

/// Every solver in catalog order.
pub fn all_solvers() -> &'static [SolverInfo] {
    &CATALOG
}

pub fn solver_info(kind: SolverKind) -> &'static SolverInfo {
    // The catalog is built from SolverKind::ALL, whose order matches the declaration order.
    &CATALOG[kind as usize]
}

pub fn create_solver(kind: SolverKind) -> Box<dyn Solver> {
    match kind {
        SolverKind::RandomWalk => Box::new(RandomWalk::new(None)),
        SolverKind::DepthFirst => Box::new(FrontierSearch::depth_first()),
        SolverKind::BreadthFirst => Box::new(FrontierSearch::breadth_first()),
        SolverKind::AStar => Box::new(FrontierSearch::a_star()),
        SolverKind::Dijkstra => Box::new(FrontierSearch::dijkstra()),
        SolverKind::GreedyBestFirst => Box::new(FrontierSearch::greedy_best_first()),
        SolverKind::Bidirectional => Box::new(Bidirectional::new()),
        SolverKind::LeftHandRule => Box::new(WallFollower::left_hand()),
        SolverKind::RightHandRule => Box::new(WallFollower::right_hand()),
        SolverKind::SlimeMold => Box::new(SlimeMold::new(None)),
    }
}

/// The solver registered under `identifier`.
pub fn solver_for(identifier: &str) -> Result<Box<dyn Solver>> {
    identifier.parse().map(create_solver)
}

pub fn default_solver() -> Box<dyn Solver> {
    create_solver(DEFAULT_SOLVER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn catalog_lines_up_with_kinds() {
        assert_eq!(all_solvers().len(), 10);
        for (info, kind) in all_solvers().iter().zip(SolverKind::ALL.iter()) {
            assert_eq!(info.kind, *kind);
            assert_eq!(solver_info(*kind), info);
            assert_eq!(create_solver(*kind).kind(), *kind);
            assert_eq!(create_solver(*kind).info().identifier, kind.identifier());
        }
        assert_eq!(all_solvers().iter().map(|info| info.identifier).unique().count(), 10);
    }

    #[test]
    fn optimal_and_complete_flags() {
        let optimal = all_solvers()
            .iter()
            .filter(|info| info.optimal)
            .map(|info| info.kind)
            .collect::<Vec<_>>();
        assert_eq!(optimal,
                   vec![SolverKind::BreadthFirst,
                        SolverKind::AStar,
                        SolverKind::Dijkstra,
                        SolverKind::Bidirectional]);
        assert!(solver_info(SolverKind::DepthFirst).complete);
        assert!(!solver_info(SolverKind::DepthFirst).optimal);
        assert!(!solver_info(SolverKind::SlimeMold).complete);
    }

    #[test]
    fn lookup_by_identifier() {
        assert_eq!(solver_for("bfs").unwrap().kind(), SolverKind::BreadthFirst);
        assert_eq!("slime-mold".parse::<SolverKind>().unwrap(), SolverKind::SlimeMold);
        assert_eq!(default_solver().kind(), SolverKind::AStar);
        assert_eq!(SolverKind::LeftHandRule.to_string(), "left-hand");
    }

    #[test]
    fn unknown_identifier() {
        let e = solver_for("teleport").unwrap_err();
        assert!(matches!(*e.kind(), ErrorKind::UnknownSolverType(ref id) if id == "teleport"));
        assert!("".parse::<SolverKind>().is_err());
    }
}
