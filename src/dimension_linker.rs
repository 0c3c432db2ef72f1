use log::{debug, warn};
use rand::seq::SliceRandom;
use std::f64;

use crate::cells::Coordinate;
use crate::config::{Configuration, FifthDimensionConfig};
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap};

/// Problems found when checking registered links against a grid.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum LinkIssue {
    /// An endpoint does not name a cell of the grid.
    MissingEndpoint(Coordinate),
    /// The grid does not hold the link in both directions.
    NotMirrored(Coordinate, Coordinate),
}

/// Registers random non-adjacent links between arbitrary cells and answers questions about them.
#[derive(Debug, Clone)]
pub struct DimensionLinker {
    linkage_count: usize,
    seed: Option<u64>,
    pairs: Vec<(Coordinate, Coordinate)>,
    forward: FnvHashMap<Coordinate, Coordinate>,
    reverse: FnvHashMap<Coordinate, Coordinate>,
}

impl DimensionLinker {
    pub fn new(config: &FifthDimensionConfig, seed: Option<u64>) -> DimensionLinker {
        DimensionLinker {
            linkage_count: config.linkage_count,
            seed,
            pairs: Vec::with_capacity(config.linkage_count),
            forward: utils::fnv_hashmap(config.linkage_count),
            reverse: utils::fnv_hashmap(config.linkage_count),
        }
    }

    /// A linker for the configuration's 5th dimension sub-config, if present and enabled.
    pub fn from_configuration(config: &Configuration) -> Option<DimensionLinker> {
        config.active_fifth_dimension()
            .map(|fifth| DimensionLinker::new(fifth, config.seed))
    }

    /// Shuffle every cell coordinate and link consecutive pairs, up to the linkage count.
    /// Pairs of adjacent cells are passed over. The same seed, or no seed, always produces the
    /// same pairs, and linking again replaces what an earlier call registered here. Returns the
    /// number of pairs registered.
    pub fn link(&mut self, grid: &mut Grid) -> usize {
        self.pairs.clear();
        self.forward.clear();
        self.reverse.clear();

        let mut coords = grid.iter().collect::<Vec<_>>();
        coords.shuffle(&mut utils::layout_rng(self.seed));

        let chosen = coords.chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .filter(|&(from, to)| grid.direction_between(from, to).is_none())
            .take(self.linkage_count)
            .collect::<Vec<_>>();

        for &(from, to) in &chosen {
            grid.add_link(from, to);
            self.pairs.push((from, to));
            self.forward.insert(from, to);
            self.reverse.insert(to, from);
        }

        debug!("linked {} cell pairs through the 5th dimension", chosen.len());
        chosen.len()
    }

    /// Registered pairs in registration order.
    pub fn pairs(&self) -> &[(Coordinate, Coordinate)] {
        &self.pairs
    }

    /// Where a link starting at `coord` leads.
    pub fn linked_from(&self, coord: Coordinate) -> Option<Coordinate> {
        self.forward.get(&coord).cloned()
    }

    /// Where the link ending at `coord` started.
    pub fn linked_to(&self, coord: Coordinate) -> Option<Coordinate> {
        self.reverse.get(&coord).cloned()
    }

    /// Straight line distance a link jumps. For analysis and display, never a path cost.
    pub fn teleport_distance(a: Coordinate, b: Coordinate) -> f64 {
        a.euclidean_distance(b)
    }

    /// The registered pair with an endpoint closest to `position`, that endpoint first.
    pub fn nearest_link(&self, position: Coordinate) -> Option<(Coordinate, Coordinate)> {
        let mut nearest = None;
        let mut best = f64::INFINITY;
        for &(a, b) in &self.pairs {
            for &(near, far) in &[(a, b), (b, a)] {
                let distance = position.euclidean_distance(near);
                if distance < best {
                    best = distance;
                    nearest = Some((near, far));
                }
            }
        }
        nearest
    }

    /// Check every registered pair still resolves to two cells that are linked both ways.
    pub fn validate(&self, grid: &Grid) -> Vec<LinkIssue> {
        let mut issues = vec![];
        for &(a, b) in &self.pairs {
            let mut endpoints_ok = true;
            for endpoint in &[a, b] {
                if grid.cell(*endpoint).is_none() {
                    issues.push(LinkIssue::MissingEndpoint(*endpoint));
                    endpoints_ok = false;
                }
            }
            if endpoints_ok && !(grid.links(a).contains(&b) && grid.links(b).contains(&a)) {
                issues.push(LinkIssue::NotMirrored(a, b));
            }
        }
        for issue in &issues {
            warn!("5th dimension link issue: {:?}", issue);
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;
    use crate::units::{Height, Width};

    fn linker(count: usize, seed: u64) -> DimensionLinker {
        DimensionLinker::new(&FifthDimensionConfig { enabled: true, linkage_count: count }, Some(seed))
    }

    #[test]
    fn links_are_registered_and_mirrored() {
        let mut grid = generators::generate(&Configuration::maze_2d(6, 6).with_seed(1)).unwrap();
        let mut dl = linker(4, 1);
        assert_eq!(dl.link(&mut grid), 4);
        assert_eq!(dl.pairs().len(), 4);
        assert_eq!(grid.links_count(), 4);
        for &(a, b) in dl.pairs() {
            assert_ne!(a, b);
            assert!(grid.can_move(a, b) && grid.can_move(b, a));
            assert_eq!(dl.linked_from(a), Some(b));
            assert_eq!(dl.linked_to(b), Some(a));
        }
        assert!(dl.validate(&grid).is_empty());
    }

    #[test]
    fn pairing_is_deterministic() {
        let config = Configuration::maze_2d(5, 5).with_seed(2);
        let mut a = generators::generate(&config).unwrap();
        let mut b = generators::generate(&config).unwrap();
        let (mut la, mut lb) = (linker(3, 9), linker(3, 9));
        la.link(&mut a);
        lb.link(&mut b);
        assert_eq!(la.pairs(), lb.pairs());
    }

    #[test]
    fn linkage_count_is_capped_by_cell_pairs() {
        let mut grid = generators::generate(&Configuration::maze_2d(3, 3).with_seed(0)).unwrap();
        let mut dl = linker(10, 0);
        let registered = dl.link(&mut grid);
        assert!(registered <= 4);
        assert_eq!(dl.pairs().len(), registered);
        assert_eq!(grid.links_count(), registered);
    }

    #[test]
    fn adjacent_cells_are_never_linked() {
        let mut pair_grid = Grid::create(&Configuration::maze_2d(2, 1)).unwrap();
        assert_eq!(linker(1, 5).link(&mut pair_grid), 0);
        assert_eq!(pair_grid.links_count(), 0);

        let mut grid = Grid::create(&Configuration::maze_3d(4, 4, 2)).unwrap();
        let mut dl = linker(12, 5);
        dl.link(&mut grid);
        for &(a, b) in dl.pairs() {
            assert_eq!(grid.direction_between(a, b), None);
        }
    }

    #[test]
    fn unseeded_pairing_repeats_between_runs() {
        let fifth = FifthDimensionConfig { enabled: true, linkage_count: 40 };
        let mut a = Grid::create(&Configuration::maze_2d(20, 20)).unwrap();
        let mut b = Grid::create(&Configuration::maze_2d(20, 20)).unwrap();
        let mut la = DimensionLinker::new(&fifth, None);
        let mut lb = DimensionLinker::new(&fifth, None);
        assert_eq!(la.link(&mut a), 40);
        lb.link(&mut b);
        assert_eq!(la.pairs(), lb.pairs());
    }

    #[test]
    fn linking_again_does_not_duplicate_pairs() {
        let mut grid = Grid::create(&Configuration::maze_2d(8, 8)).unwrap();
        let mut dl = linker(6, 8);
        assert_eq!(dl.link(&mut grid), 6);
        let first = dl.pairs().to_vec();
        assert_eq!(dl.link(&mut grid), 6);
        assert_eq!(dl.pairs(), &first[..]);
        assert_eq!(grid.links_count(), 6);
        assert!(dl.validate(&grid).is_empty());
    }

    #[test]
    fn validation_reports_foreign_grids() {
        let mut big = generators::generate(&Configuration::maze_2d(8, 8).with_seed(3)).unwrap();
        let mut dl = linker(5, 3);
        dl.link(&mut big);

        let small = Grid::create(&Configuration::maze_2d(2, 2)).unwrap();
        let issues = dl.validate(&small);
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|issue| match *issue {
            LinkIssue::MissingEndpoint(c) => small.cell(c).is_none(),
            LinkIssue::NotMirrored(a, b) => !small.is_linked(a, b),
        }));
    }

    #[test]
    fn nearest_link_and_distance() {
        let mut grid = Grid::create(&Configuration::maze_2d(10, 10)).unwrap();
        let mut dl = linker(1, 4);
        assert_eq!(dl.nearest_link(Coordinate::planar(0, 0)), None);
        dl.link(&mut grid);

        let (a, b) = dl.pairs()[0];
        assert_eq!(dl.nearest_link(a), Some((a, b)));
        assert_eq!(dl.nearest_link(b), Some((b, a)));

        assert!((DimensionLinker::teleport_distance(Coordinate::planar(0, 0),
                                                     Coordinate::planar(6, 8)) -
                 10.0)
                    .abs() < 1e-9);
        assert_eq!(grid.dimensions().width(), Width(10));
        assert_eq!(grid.dimensions().height(), Height(10));
    }

    #[test]
    fn built_from_configuration_only_when_enabled() {
        let mut config = Configuration::maze_2d(4, 4);
        assert!(DimensionLinker::from_configuration(&config).is_none());
        config.fifth_dimension = Some(FifthDimensionConfig { enabled: true, linkage_count: 2 });
        assert!(DimensionLinker::from_configuration(&config).is_some());
    }
}
