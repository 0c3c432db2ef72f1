use itertools::Itertools;
use smallvec::SmallVec;

use crate::cells::Coordinate;
use crate::grid::Grid;
use crate::grid_displays::GridDisplay;
use crate::utils::{self, FnvHashMap};

/// Flood fill of move counts from one start cell to every cell reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Coordinate,
    distances: FnvHashMap<Coordinate, u32>,
    max_distance: u32,
}

impl Distances {
    /// None when the start is outside the grid.
    pub fn new(grid: &Grid, start_coordinate: Coordinate) -> Option<Distances> {
        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(grid.size());
        distances.insert(start_coordinate, 0);

        // Every move costs one, so the first distance recorded for a cell is already the
        // shortest and the map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances.get(cell_coord).cloned().unwrap_or(0);
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for next in grid.passable_neighbours(*cell_coord) {
                    if !distances.contains_key(&next) {
                        distances.insert(next, distance_to_cell + 1);
                        new_frontier.push(next);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Coordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Coordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    /// Number of cells reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    pub fn furthest_points_on_grid(&self) -> SmallVec<[Coordinate; 8]> {
        self.distances
            .iter()
            .filter(|&(_, distance)| *distance == self.max_distance)
            .map(|(coord, _)| *coord)
            .sorted()
            .collect()
    }
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        if let Some(d) = self.distances.get(&coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

/// Walk downhill through the distances from `end_point` back to their start.
/// None when the end point is unreachable.
pub fn shortest_path(grid: &Grid,
                     distances_from_start: &Distances,
                     end_point: Coordinate)
                     -> Option<Vec<Coordinate>> {
    distances_from_start.distance_from_start_to(end_point)?;

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {
        let current_distance = distances_from_start.distance_from_start_to(current_coord)?;

        let closest_to_start = super::predecessors(grid, current_coord)
            .into_iter()
            .filter_map(|coord| {
                distances_from_start.distance_from_start_to(coord).map(|d| (d, coord))
            })
            .min();

        match closest_to_start {
            Some((closer_distance, closer_coord)) if closer_distance < current_distance => {
                current_coord = closer_coord;
                path.push(current_coord);
            }
            // No step brings us closer: the distances belong to some other grid.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::Direction;
    use crate::config::Configuration;
    use crate::generators;
    use crate::pathing::fixtures::*;

    fn gc(x: u32, y: u32) -> Coordinate {
        Coordinate::planar(x, y)
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let g = corridor();
        assert!(Distances::new(&g, gc(100, 100)).is_none());
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let g = Grid::create(&Configuration::maze_2d(3, 3)).unwrap();
        let start_coordinate = gc(0, 0);
        let distances = Distances::new(&g, start_coordinate).unwrap();
        assert_eq!(distances.start(), start_coordinate);
        for coord in g.iter() {
            let d = distances.distance_from_start_to(coord);
            if coord != start_coordinate {
                assert!(d.is_none());
            } else {
                assert_eq!(d, Some(0));
            }
        }
        assert_eq!(distances.reachable_count(), 1);
    }

    #[test]
    fn distances_on_open_grid() {
        let mut g = Grid::create(&Configuration::maze_2d(2, 2)).unwrap();
        g.set_wall(gc(0, 0), Direction::East, false);
        g.set_wall(gc(0, 0), Direction::South, false);
        g.set_wall(gc(1, 1), Direction::North, false);
        g.set_wall(gc(1, 1), Direction::West, false);

        let distances = Distances::new(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), Some(2));
        assert_eq!(distances.max(), 2);
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(1, 1)]);
        assert_eq!(distances.render_cell_body(gc(1, 1)), " 2 ");
    }

    #[test]
    fn shortest_path_down_the_corridor() {
        let g = corridor();
        let (start, goal) = corners();
        let distances = Distances::new(&g, start).unwrap();
        let path = shortest_path(&g, &distances, goal).unwrap();
        assert_eq!(path.len(), 9);
        assert_walkable(&g, &path);
        assert_eq!(shortest_path(&g, &distances, gc(0, 4)), None);
    }

    #[test]
    fn generated_mazes_reach_every_cell() {
        let grid = generators::generate(&Configuration::maze_2d(9, 7).with_seed(6)).unwrap();
        let distances = Distances::new(&grid, gc(0, 0)).unwrap();
        assert_eq!(distances.reachable_count(), 63);
    }
}
