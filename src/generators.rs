use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp;

use crate::cells::{Coordinate, CoordinateSmallVec, Direction};
use crate::config::{Configuration, GenerationAlgorithm, PuzzleKind, SpatialMode};
use crate::errors::*;
use crate::grid::Grid;
use crate::units::{Depth, Height, LayerIndex, Width};
use crate::utils::{self, FnvHashSet};

/// Share of a layer's area opened as vertical passages between layers, in percent.
const LAYER_CONNECTOR_PERCENT: usize = 5;

/// Build a fresh grid from the configuration and carve it.
///
/// The configuration is validated before anything is allocated. Carving is seeded from
/// `config.seed` when present, so the same configuration always yields the same grid.
pub fn generate(config: &Configuration) -> Result<Grid> {
    let mut rng = utils::xorshift_rng(config.seed);
    generate_with_rng(config, &mut rng)
}

pub fn generate_with_rng<R: Rng>(config: &Configuration, rng: &mut R) -> Result<Grid> {
    let mut grid = Grid::create(config)?;

    let Depth(depth) = grid.dimensions().depth();
    for z in 0..depth {
        let layer = LayerIndex(z);
        match config.kind {
            PuzzleKind::Maze => {
                match config.generation_algorithm() {
                    GenerationAlgorithm::RecursiveBacktracker => {
                        recursive_backtracker(&mut grid, layer, rng)
                    }
                    GenerationAlgorithm::Prim => prim(&mut grid, layer, rng),
                }
            }
            PuzzleKind::Labyrinth => spiral_labyrinth(&mut grid, layer),
        }
    }
    grid.clear_visited();

    if config.mode == SpatialMode::ThreeD {
        seal_outer_layers(&mut grid);
        let connectors = connect_layers(&mut grid, rng);
        debug!("opened {} passages between {} layers", connectors, depth);
    }

    open_entrance_and_exit(&mut grid);

    if let Some(fifth) = config.active_fifth_dimension() {
        let links = add_fifth_dimension_links(&mut grid, fifth.linkage_count, rng);
        debug!("registered {} 5th dimension links", links);
    }

    debug!("generated {:?} {:?} with {} passages",
           config.kind,
           grid.dimensions(),
           grid.passages_count());
    Ok(grid)
}

/// The maze entrance, north west corner of the bottom layer.
pub fn start(grid: &Grid) -> Coordinate {
    grid.dimensions().corners().0
}

/// The maze exit, south east corner of the top layer.
pub fn goal(grid: &Grid) -> Coordinate {
    grid.dimensions().corners().1
}

/// Carve a perfect maze into one layer with a randomised depth first walk.
/// An explicit stack of the walk is kept; when the head of the walk has no unvisited neighbour
/// it backtracks by popping until a cell with unvisited neighbours is found. Once the stack
/// empties every cell of the layer has been visited exactly once.
pub fn recursive_backtracker<R: Rng>(grid: &mut Grid, layer: LayerIndex, rng: &mut R) {
    let start = random_layer_cell(grid, layer, rng);
    grid.mark_visited(start);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let unvisited = layer_unvisited_neighbours(grid, current, layer);
        if let Some(&next) = unvisited.choose(rng) {
            grid.open_passage(current, next);
            grid.mark_visited(next);
            stack.push(next);
        } else {
            stack.pop();
        }
    }
}

/// Carve a perfect maze into one layer by growing a tree from a single cell (Prim's algorithm
/// with uniform random weights).
/// The frontier holds unvisited cells next to the tree. A random frontier cell is joined to a
/// random visited neighbour, and its own unvisited neighbours join the frontier. This has many
/// more short dead ends than the recursive backtracker.
pub fn prim<R: Rng>(grid: &mut Grid, layer: LayerIndex, rng: &mut R) {
    let area = grid.dimensions().layer_area();
    let mut frontier: Vec<Coordinate> = Vec::with_capacity(area);
    let mut in_frontier: FnvHashSet<Coordinate> = utils::fnv_hashset(area);

    let start = random_layer_cell(grid, layer, rng);
    grid.mark_visited(start);
    expand_frontier(grid, start, layer, &mut frontier, &mut in_frontier);

    while !frontier.is_empty() {
        let cell = frontier.swap_remove(rng.gen_range(0..frontier.len()));

        let visited: CoordinateSmallVec = grid.neighbours(cell)
            .into_iter()
            .filter(|neighbour| neighbour.z == cell.z && grid.is_visited(*neighbour))
            .collect();
        if let Some(&join) = visited.choose(rng) {
            grid.open_passage(cell, join);
        }
        grid.mark_visited(cell);
        expand_frontier(grid, cell, layer, &mut frontier, &mut in_frontier);
    }
}

fn expand_frontier(grid: &Grid,
                   from: Coordinate,
                   layer: LayerIndex,
                   frontier: &mut Vec<Coordinate>,
                   in_frontier: &mut FnvHashSet<Coordinate>) {
    for neighbour in layer_unvisited_neighbours(grid, from, layer) {
        if in_frontier.insert(neighbour) {
            frontier.push(neighbour);
        }
    }
}

/// Planar coordinates of an inward clockwise rectangular spiral, starting at the north west
/// corner heading east. Every cell of a width x height layer appears exactly once.
///
/// The first run east covers the full width. After each run the next run on the same axis is
/// one cell shorter, so run lengths shrink every second turn: w, h-1, w-1, h-2, w-2, ...
pub fn spiral_order(width: Width, height: Height) -> Vec<(u32, u32)> {
    let (Width(w), Height(h)) = (width, height);
    let cells_count = w * h;
    let mut order = Vec::with_capacity(cells_count);

    // Start one step west of the grid so the first run enters at (0, 0).
    let (mut x, mut y) = (-1i64, 0i64);
    let mut horizontal_run = w;
    let mut vertical_run = h.saturating_sub(1);
    let mut heading = Direction::East;

    while order.len() < cells_count {
        let run = if heading == Direction::East || heading == Direction::West {
            &mut horizontal_run
        } else {
            &mut vertical_run
        };
        if *run == 0 {
            break;
        }

        let (dx, dy, _) = heading.delta();
        for _ in 0..*run {
            x += dx;
            y += dy;
            order.push((x as u32, y as u32));
        }
        *run -= 1;
        heading = heading.turn_right();
    }

    order
}

/// Carve one layer into a single unbranched corridor following `spiral_order`.
pub fn spiral_labyrinth(grid: &mut Grid, layer: LayerIndex) {
    let dimensions = *grid.dimensions();
    let z = layer.0 as u32;
    let corridor = spiral_order(dimensions.width(), dimensions.height())
        .into_iter()
        .map(|(x, y)| Coordinate::new(x, y, z))
        .collect::<Vec<_>>();

    for pair in corridor.windows(2) {
        grid.open_passage(pair[0], pair[1]);
    }
    for coord in corridor {
        grid.mark_visited(coord);
    }
}

/// Close the up walls of the top layer and the down walls of the bottom layer so the only
/// vertical ways out are the ones opened for the entrance and exit.
pub fn seal_outer_layers(grid: &mut Grid) {
    let Depth(depth) = grid.dimensions().depth();
    let top = depth as u32 - 1;
    let faces = grid.iter()
        .filter(|coord| coord.z == 0 || coord.z == top)
        .collect::<Vec<_>>();
    for coord in faces {
        if coord.z == 0 {
            grid.set_wall(coord, Direction::Down, true);
        }
        if coord.z == top {
            grid.set_wall(coord, Direction::Up, true);
        }
    }
}

/// Open vertical passages between independently carved layers.
///
/// About 5% of the layer area is opened (at least one) at random columns. Each adjacent pair
/// of layers always gets at least one of them, so a grid made of connected layers stays
/// connected. Returns the number of passages opened, 0 for a single layer.
pub fn connect_layers<R: Rng>(grid: &mut Grid, rng: &mut R) -> usize {
    let dimensions = *grid.dimensions();
    let Depth(depth) = dimensions.depth();
    if depth < 2 {
        return 0;
    }

    let (Width(w), Height(h)) = (dimensions.width(), dimensions.height());
    let wanted = cmp::max(1, dimensions.layer_area() * LAYER_CONNECTOR_PERCENT / 100);
    let guaranteed = depth - 1;
    let total = cmp::max(wanted, guaranteed);

    for n in 0..total {
        let z = if n < guaranteed { n } else { rng.gen_range(0..guaranteed) };
        let column = Coordinate::new(rng.gen_range(0..w) as u32,
                                     rng.gen_range(0..h) as u32,
                                     z as u32);
        grid.set_wall(column, Direction::Up, false);
    }
    total
}

/// Clear the outward walls of the entrance (north, west, and down in 3-D) and of the exit
/// (south, east, and up in 3-D).
pub fn open_entrance_and_exit(grid: &mut Grid) {
    let (entrance, exit) = grid.dimensions().corners();
    let three_d = grid.mode() == SpatialMode::ThreeD;

    grid.set_wall(entrance, Direction::North, false);
    grid.set_wall(entrance, Direction::West, false);
    grid.set_wall(exit, Direction::South, false);
    grid.set_wall(exit, Direction::East, false);
    if three_d {
        grid.set_wall(entrance, Direction::Down, false);
        grid.set_wall(exit, Direction::Up, false);
    }
}

/// Register `linkage_count` random links for each pair of opposite boundaries: top to bottom,
/// left to right, and front to back in 3-D. Endpoints that coincide are silently skipped.
/// Returns the number of new links.
pub fn add_fifth_dimension_links<R: Rng>(grid: &mut Grid,
                                         linkage_count: usize,
                                         rng: &mut R)
                                         -> usize {
    let dimensions = *grid.dimensions();
    let (Width(w), Height(h), Depth(d)) = (dimensions.width(), dimensions.height(),
                                           dimensions.depth());
    let (last_x, last_y, last_z) = (w as u32 - 1, h as u32 - 1, d as u32 - 1);
    let before = grid.links_count();

    for _ in 0..linkage_count {
        let z = rng.gen_range(0..d) as u32;
        let top = Coordinate::new(rng.gen_range(0..w) as u32, 0, z);
        let bottom = Coordinate::new(rng.gen_range(0..w) as u32, last_y, z);
        grid.add_link(top, bottom);

        let z = rng.gen_range(0..d) as u32;
        let left = Coordinate::new(0, rng.gen_range(0..h) as u32, z);
        let right = Coordinate::new(last_x, rng.gen_range(0..h) as u32, z);
        grid.add_link(left, right);

        if grid.mode() == SpatialMode::ThreeD {
            let front = Coordinate::new(rng.gen_range(0..w) as u32, rng.gen_range(0..h) as u32, 0);
            let back = Coordinate::new(rng.gen_range(0..w) as u32,
                                       rng.gen_range(0..h) as u32,
                                       last_z);
            grid.add_link(front, back);
        }
    }

    grid.links_count() - before
}

fn random_layer_cell<R: Rng>(grid: &Grid, layer: LayerIndex, rng: &mut R) -> Coordinate {
    let dimensions = grid.dimensions();
    Coordinate::new(rng.gen_range(0..dimensions.width().0) as u32,
                    rng.gen_range(0..dimensions.height().0) as u32,
                    layer.0 as u32)
}

fn layer_unvisited_neighbours(grid: &Grid,
                              coord: Coordinate,
                              layer: LayerIndex)
                              -> CoordinateSmallVec {
    grid.unvisited_neighbours(coord)
        .into_iter()
        .filter(|neighbour| neighbour.z as usize == layer.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use std::collections::VecDeque;

    use super::*;
    use crate::config::FifthDimensionConfig;
    use crate::utils::fnv_hashset;

    /// Cells reachable from the origin using only `can_move`.
    fn reachable_from_origin(grid: &Grid) -> usize {
        let origin = Coordinate::new(0, 0, 0);
        let mut seen = fnv_hashset(grid.size());
        let mut queue = VecDeque::new();
        seen.insert(origin);
        queue.push_back(origin);
        while let Some(current) = queue.pop_front() {
            for next in grid.passable_neighbours(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len()
    }

    fn internal_open_lateral_walls(grid: &Grid, coord: Coordinate) -> usize {
        Direction::LATERAL
            .iter()
            .filter(|dir| {
                grid.neighbour_at_direction(coord, **dir).is_some() &&
                grid.wall(coord, **dir) == Some(false)
            })
            .count()
    }

    #[test]
    fn perfect_mazes_in_two_d() {
        for algorithm in &[GenerationAlgorithm::RecursiveBacktracker, GenerationAlgorithm::Prim] {
            for seed in 0..5 {
                let config = Configuration::maze_2d(12, 7)
                    .with_algorithm(*algorithm)
                    .with_seed(seed);
                let grid = generate(&config).unwrap();
                assert_eq!(reachable_from_origin(&grid), 12 * 7, "{:?}", algorithm);
                // Connected with exactly n - 1 passages means no cycles.
                assert_eq!(grid.passages_count(), 12 * 7 - 1, "{:?}", algorithm);
                assert_eq!(grid.links_count(), 0);
            }
        }
    }

    #[test]
    fn single_cell_maze() {
        let grid = generate(&Configuration::maze_2d(1, 1).with_seed(3)).unwrap();
        assert_eq!(grid.passages_count(), 0);
        assert_eq!(start(&grid), goal(&grid));
    }

    #[test]
    fn generation_is_reproducible_with_a_seed() {
        let config = Configuration::maze_2d(9, 9)
            .with_algorithm(GenerationAlgorithm::Prim)
            .with_seed(42);
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        let walls = |g: &Grid| g.all_cells().map(|cell| cell.walls()).collect::<Vec<_>>();
        assert_eq!(walls(&a), walls(&b));
    }

    #[test]
    fn invalid_size_is_reported() {
        let result = generate(&Configuration::maze_2d(0, 3));
        match result {
            Err(ref e) => assert!(matches!(*e.kind(), ErrorKind::InvalidConfiguration(_))),
            Ok(_) => panic!("zero width grid generated"),
        }
    }

    #[test]
    fn three_d_maze_is_connected() {
        for seed in 0..5 {
            let config = Configuration::maze_3d(5, 4, 3).with_seed(seed);
            let grid = generate(&config).unwrap();
            assert_eq!(reachable_from_origin(&grid), 5 * 4 * 3);
            assert!(grid.passages_count() >= 5 * 4 * 3 - 1);
        }
    }

    #[test]
    fn entrance_and_exit_are_open() {
        let grid = generate(&Configuration::maze_3d(4, 4, 2).with_seed(1)).unwrap();
        let (entrance, exit) = (start(&grid), goal(&grid));
        assert_eq!(exit, Coordinate::new(3, 3, 1));
        for dir in &[Direction::North, Direction::West, Direction::Down] {
            assert_eq!(grid.wall(entrance, *dir), Some(false));
        }
        for dir in &[Direction::South, Direction::East, Direction::Up] {
            assert_eq!(grid.wall(exit, *dir), Some(false));
        }
        // Other outer faces stay sealed
        assert_eq!(grid.wall(Coordinate::new(1, 1, 0), Direction::Down), Some(true));
        assert_eq!(grid.wall(Coordinate::new(1, 1, 1), Direction::Up), Some(true));
    }

    #[test]
    fn spiral_order_three_by_three() {
        assert_eq!(spiral_order(Width(3), Height(3)),
                   vec![(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1), (1, 1)]);
    }

    #[test]
    fn spiral_order_visits_every_cell_once() {
        for &(w, h) in &[(1, 1), (1, 5), (5, 1), (4, 4), (7, 3), (3, 8), (10, 10)] {
            let order = spiral_order(Width(w), Height(h));
            assert_eq!(order.len(), w * h);
            let unique = order.iter().cloned().unique().count();
            assert_eq!(unique, w * h);
            for pair in order.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let step = (i64::from(a.0) - i64::from(b.0)).abs() + (i64::from(a.1) - i64::from(b.1)).abs();
                assert_eq!(step, 1, "spiral jumps from {:?} to {:?}", a, b);
            }
        }
    }

    #[test]
    fn labyrinth_is_a_single_corridor() {
        let grid = generate(&Configuration::labyrinth_2d(8, 6).with_seed(9)).unwrap();
        assert_eq!(reachable_from_origin(&grid), 48);
        assert_eq!(grid.passages_count(), 47);
        for coord in grid.iter() {
            assert!(internal_open_lateral_walls(&grid, coord) <= 2);
        }
        // Only the two corridor ends are dead ends
        let dead_ends = grid.iter()
            .filter(|coord| internal_open_lateral_walls(&grid, *coord) == 1)
            .count();
        assert_eq!(dead_ends, 2);
    }

    #[test]
    fn labyrinth_carving_alone_opens_at_most_two_walls() {
        let mut grid = Grid::create(&Configuration::labyrinth_2d(6, 5)).unwrap();
        spiral_labyrinth(&mut grid, LayerIndex(0));
        assert!(grid.all_cells().all(|cell| cell.walls().open_lateral_count() <= 2));
        assert!(grid.all_cells().all(|cell| cell.is_visited()));
    }

    #[test]
    fn three_d_labyrinth_is_connected() {
        let mut config = Configuration::maze_3d(4, 4, 3).with_seed(5);
        config.kind = PuzzleKind::Labyrinth;
        let grid = generate(&config).unwrap();
        assert_eq!(reachable_from_origin(&grid), 48);
    }

    #[test]
    fn fifth_dimension_links_join_opposite_boundaries() {
        let mut config = Configuration::maze_2d(6, 6).with_seed(11);
        config.fifth_dimension = Some(FifthDimensionConfig { enabled: true, linkage_count: 3 });
        let grid = generate(&config).unwrap();
        assert!(grid.links_count() > 0 && grid.links_count() <= 6);
        for (a, b) in grid.iter_links() {
            let on_top_bottom = (a.y == 0 && b.y == 5) || (a.y == 5 && b.y == 0);
            let on_left_right = (a.x == 0 && b.x == 5) || (a.x == 5 && b.x == 0);
            assert!(on_top_bottom || on_left_right, "{} <-> {}", a, b);
            assert!(grid.can_move(a, b) && grid.can_move(b, a));
        }
    }

    #[test]
    fn disabled_fifth_dimension_adds_nothing() {
        let mut config = Configuration::maze_2d(6, 6).with_seed(11);
        config.fifth_dimension = Some(FifthDimensionConfig { enabled: false, linkage_count: 3 });
        assert_eq!(generate(&config).unwrap().links_count(), 0);
    }

    #[test]
    fn connect_layers_on_flat_grid_is_noop() {
        let mut grid = Grid::create(&Configuration::maze_2d(3, 3)).unwrap();
        let mut rng = utils::xorshift_rng(Some(0));
        assert_eq!(connect_layers(&mut grid, &mut rng), 0);
    }
}
