use std::fmt;

use crate::cells::Coordinate;
use crate::grid_dimensions::GridDimensions;
use crate::units::{LayerIndex, NodesCount};

/// Every cell coordinate in storage order: layer by layer, row by row, column by column.
#[derive(Clone)]
pub struct CellIter {
    dimensions: GridDimensions,
    current_cell_number: usize,
    cells_count: usize,
}

impl CellIter {
    pub fn new(dimensions: GridDimensions) -> CellIter {
        let NodesCount(cells_count) = dimensions.size();
        CellIter {
            dimensions,
            current_cell_number: 0,
            cells_count,
        }
    }
}

impl fmt::Debug for CellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Coordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = self.dimensions.index_to_coordinate(self.current_cell_number);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// The rows of one layer, north to south, each row west to east.
#[derive(Debug, Clone)]
pub struct LayerRowIter {
    layer: LayerIndex,
    width: usize,
    height: usize,
    current_row: usize,
}

impl LayerRowIter {
    pub fn new(dimensions: GridDimensions, layer: LayerIndex) -> LayerRowIter {
        // A layer outside the grid simply has no rows.
        let height = if layer.0 < dimensions.depth().0 { dimensions.height().0 } else { 0 };
        LayerRowIter {
            layer,
            width: dimensions.width().0,
            height,
            current_row: 0,
        }
    }
}

impl ExactSizeIterator for LayerRowIter {}
impl Iterator for LayerRowIter {
    type Item = Vec<Coordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.height {
            let (y, z) = (self.current_row as u32, self.layer.0 as u32);
            let coords = (0..self.width)
                .map(|x| Coordinate::new(x as u32, y, z))
                .collect();
            self.current_row += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.height - self.current_row;
        (remaining, Some(remaining))
    }
}
