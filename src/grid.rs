use petgraph::graph::{self, NodeIndex, UnGraph};
use rand::Rng;
use std::fmt;
use std::slice;

use crate::cells::{Cell, Coordinate, CoordinateOptionSmallVec, CoordinateSmallVec, Direction,
                   Walls};
use crate::config::{Configuration, SpatialMode};
use crate::errors::*;
use crate::grid_dimensions::GridDimensions;
use crate::grid_iterators::{CellIter, LayerRowIter};
use crate::units::{EdgesCount, LayerIndex, NodesCount};

/// Dense store of cells. The grid owns every cell; cells refer to each other only by coordinate.
///
/// Walls live on the cells and are always updated in mirrored pairs. 5th dimension links live in
/// an undirected graph indexed like the cell storage, so a link is symmetric by construction.
#[derive(Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    links: UnGraph<(), (), u32>,
    dimensions: GridDimensions,
    mode: SpatialMode,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: dimensions: {:?}, mode: {:?}, links: {:?}",
               self.dimensions,
               self.mode,
               self.links_count())
    }
}

impl Grid {
    /// Validate the configuration, then allocate a fresh grid for it.
    pub fn create(config: &Configuration) -> Result<Grid> {
        config.validate()?;
        Ok(Grid::new(config.dimensions(), config.mode))
    }

    /// All lateral walls closed. In 3-D the up/down walls are closed between layers and open on
    /// the outer faces of the top and bottom layers.
    pub fn new(dimensions: GridDimensions, mode: SpatialMode) -> Grid {
        let (NodesCount(nodes), EdgesCount(edges)) = dimensions.graph_size();
        let top_layer = dimensions.depth().0 as u32 - 1;

        let cells = CellIter::new(dimensions)
            .map(|coord| {
                let mut walls = Walls::closed();
                if mode == SpatialMode::ThreeD {
                    walls.set(Direction::Up, coord.z < top_layer);
                    walls.set(Direction::Down, coord.z > 0);
                }
                Cell::new(coord, walls)
            })
            .collect();

        let mut links = UnGraph::with_capacity(nodes, edges / 8);
        for _ in 0..nodes {
            let _ = links.add_node(());
        }

        Grid {
            cells,
            links,
            dimensions,
            mode,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn mode(&self) -> SpatialMode {
        self.mode
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: Coordinate) -> bool {
        self.dimensions.contains(coord)
    }

    #[inline]
    pub fn coordinate_to_index(&self, coord: Coordinate) -> Option<usize> {
        self.dimensions.coordinate_to_index(coord)
    }

    /// The cell at `coord`, or None when the coordinate is outside the grid.
    #[inline]
    pub fn cell(&self, coord: Coordinate) -> Option<&Cell> {
        self.coordinate_to_index(coord).map(|index| &self.cells[index])
    }

    #[inline]
    fn cell_mut(&mut self, coord: Coordinate) -> Option<&mut Cell> {
        match self.coordinate_to_index(coord) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    /// Is there a wall on the `dir` side of `coord`? None outside the grid.
    pub fn wall(&self, coord: Coordinate, dir: Direction) -> Option<bool> {
        self.cell(coord).map(|cell| cell.has_wall(dir))
    }

    /// Set or clear the wall on the `dir` side of `coord` and the facing wall of the neighbour.
    /// Boundary walls have no neighbour and only change locally.
    pub fn set_wall(&mut self, coord: Coordinate, dir: Direction, present: bool) {
        match self.cell_mut(coord) {
            Some(cell) => cell.set_wall(dir, present),
            None => return,
        }

        if let Some(neighbour) = self.neighbour_at_direction(coord, dir) {
            if let Some(neighbour_cell) = self.cell_mut(neighbour) {
                neighbour_cell.set_wall(dir.opposite(), present);
            }
        }
    }

    /// Carve a passage between two adjacent cells. Returns false if they are not adjacent.
    pub fn open_passage(&mut self, a: Coordinate, b: Coordinate) -> bool {
        match self.direction_between(a, b) {
            Some(dir) => {
                self.set_wall(a, dir, false);
                true
            }
            None => false,
        }
    }

    /// Directions with a possible neighbour: 4 lateral ones in 2-D, all 6 in 3-D.
    #[inline]
    pub fn directions(&self) -> &'static [Direction] {
        match self.mode {
            SpatialMode::TwoD => &Direction::LATERAL,
            SpatialMode::ThreeD => &Direction::ALL,
        }
    }

    /// Cells geometrically adjacent to `coord`, whether or not a wall is in the way.
    pub fn neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.directions()
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbours_at_directions(&self,
                                    coord: Coordinate,
                                    dirs: &[Direction])
                                    -> CoordinateOptionSmallVec {
        dirs.iter()
            .map(|direction| self.neighbour_at_direction(coord, *direction))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Coordinate,
                                  direction: Direction)
                                  -> Option<Coordinate> {
        if !self.is_valid_coordinate(coord) ||
           (direction.is_vertical() && self.mode == SpatialMode::TwoD) {
            return None;
        }
        direction.offset(coord).filter(|neighbour| self.is_valid_coordinate(*neighbour))
    }

    /// Adjacent cells not yet visited by the current generation pass.
    pub fn unvisited_neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| !self.is_visited(*neighbour))
            .collect()
    }

    /// The direction leading from `a` to an adjacent `b`.
    pub fn direction_between(&self, a: Coordinate, b: Coordinate) -> Option<Direction> {
        self.directions()
            .iter()
            .cloned()
            .find(|dir| self.neighbour_at_direction(a, *dir) == Some(b))
    }

    /// The movement predicate. `b` is reachable in one move from `a` if a link joins them, or if
    /// they are adjacent with no wall in between.
    pub fn can_move(&self, a: Coordinate, b: Coordinate) -> bool {
        if self.is_linked(a, b) {
            return true;
        }
        match (self.direction_between(a, b), self.cell(a)) {
            (Some(dir), Some(cell)) => !cell.has_wall(dir),
            _ => false,
        }
    }

    /// Every cell reachable from `coord` in one move: open adjacent cells first, then links.
    pub fn passable_neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        let mut reachable: CoordinateSmallVec = self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| self.can_move(coord, *neighbour))
            .collect();
        for linked in self.links(coord) {
            if !reachable.contains(&linked) && self.can_move(coord, linked) {
                reachable.push(linked);
            }
        }
        reachable
    }

    /// Link two cells through the 5th dimension. Idempotent and symmetric.
    /// Self links and coordinates outside the grid are ignored.
    pub fn add_link(&mut self, a: Coordinate, b: Coordinate) {
        if a == b {
            return;
        }
        if let (Some(a_index), Some(b_index)) = (self.graph_index(a), self.graph_index(b)) {
            let _ = self.links.update_edge(a_index, b_index, ());
        }
    }

    /// Cells linked to `coord` through the 5th dimension.
    pub fn links(&self, coord: Coordinate) -> CoordinateSmallVec {
        match self.graph_index(coord) {
            Some(node_index) => {
                self.links
                    .neighbors(node_index)
                    .map(|linked| self.dimensions.index_to_coordinate(linked.index()))
                    .collect()
            }
            None => CoordinateSmallVec::new(),
        }
    }

    pub fn is_linked(&self, a: Coordinate, b: Coordinate) -> bool {
        if let (Some(a_index), Some(b_index)) = (self.graph_index(a), self.graph_index(b)) {
            self.links.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.links.edge_count()
    }

    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            graph_edge_iter: self.links.raw_edges().iter(),
            dimensions: &self.dimensions,
        }
    }

    pub fn mark_visited(&mut self, coord: Coordinate) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.set_visited(true);
        }
    }

    /// Out of bounds cells count as visited so they are never picked.
    pub fn is_visited(&self, coord: Coordinate) -> bool {
        self.cell(coord).map_or(true, |cell| cell.is_visited())
    }

    pub fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.set_visited(false);
        }
    }

    /// Coordinates in storage order: depth-major, then row, then column.
    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.dimensions)
    }

    /// Cells in the same order as `iter`.
    #[inline]
    pub fn all_cells(&self) -> slice::Iter<Cell> {
        self.cells.iter()
    }

    #[inline]
    pub fn iter_layer_rows(&self, layer: LayerIndex) -> LayerRowIter {
        LayerRowIter::new(self.dimensions, layer)
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coordinate {
        self.dimensions.random_cell(rng)
    }

    /// Number of open walls between adjacent cells, each counted once.
    pub fn passages_count(&self) -> usize {
        self.iter()
            .map(|coord| {
                [Direction::East, Direction::South, Direction::Up]
                    .iter()
                    .filter_map(|dir| self.neighbour_at_direction(coord, *dir).map(|_| *dir))
                    .filter(|dir| self.wall(coord, *dir) == Some(false))
                    .count()
            })
            .sum()
    }

    #[inline]
    fn graph_index(&self, coord: Coordinate) -> Option<NodeIndex<u32>> {
        self.coordinate_to_index(coord).map(NodeIndex::new)
    }
}

/// Iterator over every link as a pair of coordinates.
pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
    dimensions: &'a GridDimensions,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (Coordinate, Coordinate);

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter.next().map(|edge| {
            let src_cell_coord = self.dimensions.index_to_coordinate(edge.source().index());
            let dst_cell_coord = self.dimensions.index_to_coordinate(edge.target().index());
            (src_cell_coord, dst_cell_coord)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}
