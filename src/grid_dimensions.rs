use rand::Rng;

use crate::cells::Coordinate;
use crate::units::{Depth, EdgesCount, Height, NodesCount, Width};

/// Extent of a dense width x height x depth grid and the mapping between coordinates and
/// the depth-major / row / column storage index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridDimensions {
    width: Width,
    height: Height,
    depth: Depth,
}

impl GridDimensions {
    pub fn new(width: Width, height: Height, depth: Depth) -> GridDimensions {
        GridDimensions { width, height, depth }
    }

    #[inline(always)]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline(always)]
    pub fn depth(&self) -> Depth {
        self.depth
    }

    #[inline(always)]
    pub fn size(&self) -> NodesCount {
        NodesCount(self.layer_area() * self.depth.0)
    }

    #[inline(always)]
    pub fn layer_area(&self) -> usize {
        self.width.0 * self.height.0
    }

    /// Upper bound on the number of carved passages, used as a capacity hint.
    pub fn graph_size(&self) -> (NodesCount, EdgesCount) {
        let NodesCount(cells_count) = self.size();
        (NodesCount(cells_count), EdgesCount(cells_count))
    }

    #[inline]
    pub fn contains(&self, coord: Coordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0 &&
        (coord.z as usize) < self.depth.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...size.
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn coordinate_to_index(&self, coord: Coordinate) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.z as usize * self.layer_area() + coord.y as usize * self.width.0 +
                 coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_coordinate(&self, index: usize) -> Coordinate {
        let area = self.layer_area();
        let z = index / area;
        let in_layer = index % area;
        let y = in_layer / self.width.0;
        let x = in_layer % self.width.0;
        Coordinate::new(x as u32, y as u32, z as u32)
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coordinate {
        let NodesCount(cells_count) = self.size();
        self.index_to_coordinate(rng.gen_range(0..cells_count))
    }

    /// The first and last cells in storage order, the maze entrance and exit.
    pub fn corners(&self) -> (Coordinate, Coordinate) {
        let last = Coordinate::new(self.width.0 as u32 - 1,
                                   self.height.0 as u32 - 1,
                                   self.depth.0 as u32 - 1);
        (Coordinate::new(0, 0, 0), last)
    }
}
