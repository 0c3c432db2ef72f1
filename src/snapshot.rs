use serde_derive::{Deserialize, Serialize};

use crate::cells::{Coordinate, Walls};
use crate::config::Configuration;
use crate::errors::*;
use crate::grid::Grid;

/// Everything persisted about one cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub coordinate: Coordinate,
    pub walls: Walls,
    pub links: Vec<Coordinate>,
}

/// Plain data shape of a grid and the configuration that built it. Encoding is left to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub configuration: Configuration,
    pub cells: Vec<CellRecord>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid, configuration: &Configuration) -> GridSnapshot {
        let cells = grid.all_cells()
            .map(|cell| {
                let coordinate = cell.coordinate();
                CellRecord {
                    coordinate,
                    walls: cell.walls(),
                    links: grid.links(coordinate).into_iter().collect(),
                }
            })
            .collect();
        GridSnapshot {
            configuration: configuration.clone(),
            cells,
        }
    }

    /// Rebuild the grid by replaying every recorded wall and link onto a fresh one.
    /// Records naming cells outside the configured grid are skipped.
    pub fn restore(&self) -> Result<Grid> {
        let mut grid = Grid::create(&self.configuration)?;
        for record in &self.cells {
            if !grid.is_valid_coordinate(record.coordinate) {
                continue;
            }
            for dir in grid.directions() {
                grid.set_wall(record.coordinate, *dir, record.walls.has(*dir));
            }
            for linked in &record.links {
                grid.add_link(record.coordinate, *linked);
            }
        }
        Ok(grid)
    }
}
