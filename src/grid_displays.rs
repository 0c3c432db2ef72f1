use std::fmt;

use crate::cells::{Coordinate, CoordinateSmallVec, Direction};
use crate::config::SpatialMode;
use crate::grid::Grid;
use crate::units::{Depth, Height, LayerIndex, Width};
use crate::utils::FnvHashSet;

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";
const EMPTY_BODY: &str = "   ";

/// Supplies the 3 character body text of a cell. A blank body leaves the cell unclaimed.
pub trait GridDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> String;
}

/// Marks every cell of a path with a dot.
#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Coordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Coordinate]) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> String {

        let contains_coordinate =
            |coordinates: &CoordinateSmallVec| coordinates.iter().any(|&c| c == coord);

        if contains_coordinate(&self.start_coordinates) {
            String::from(" S ")
        } else if contains_coordinate(&self.end_coordinates) {
            String::from(" E ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

/// Two overlays stacked; the first one to claim a cell wins.
impl<A: GridDisplay, B: GridDisplay> GridDisplay for (A, B) {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        let first = self.0.render_cell_body(coord);
        if is_blank(&first) {
            self.1.render_cell_body(coord)
        } else {
            first
        }
    }
}

#[inline]
fn is_blank(body: &str) -> bool {
    body.trim().is_empty()
}

/// Render one layer as box drawing text, one line per wall row and one per cell row.
///
/// Every wall is drawn from the cells' own flags, boundary walls included, so opened entrances
/// show up as gaps in the outline. Unclaimed cells show `*` when they own a 5th dimension link
/// and, in 3-D, `^`, `v` or `↕` for open up/down passages. A layer outside the grid renders
/// as an empty string.
pub fn render_layer(grid: &Grid, layer: LayerIndex, display: Option<&dyn GridDisplay>) -> String {
    let dimensions = grid.dimensions();
    let (Width(w), Height(h), Depth(d)) = (dimensions.width(), dimensions.height(),
                                           dimensions.depth());
    if layer.0 >= d {
        return String::new();
    }
    let z = layer.0 as u32;
    let wall = |x: usize, y: usize, dir: Direction| {
        grid.wall(Coordinate::new(x as u32, y as u32, z), dir).unwrap_or(true)
    };

    // Horizontal wall segment on the north side of row `y` (south side of the last row).
    let horizontal = |x: usize, y: usize| {
        if y < h { wall(x, y, Direction::North) } else { wall(x, y - 1, Direction::South) }
    };
    // Vertical wall segment on the west side of column `x` (east side of the last column).
    let vertical = |x: usize, y: usize| {
        if x < w { wall(x, y, Direction::West) } else { wall(x - 1, y, Direction::East) }
    };

    let mut output = String::new();
    for corner_y in 0..h + 1 {
        for corner_x in 0..w + 1 {
            let left = corner_x > 0 && horizontal(corner_x - 1, corner_y);
            let right = corner_x < w && horizontal(corner_x, corner_y);
            let up = corner_y > 0 && vertical(corner_x, corner_y - 1);
            let down = corner_y < h && vertical(corner_x, corner_y);
            output.push_str(corner_glyph(left, right, up, down));
            if corner_x < w {
                output.push_str(if right { WALL_LR_3 } else { EMPTY_BODY });
            }
        }
        output.push('\n');

        if corner_y == h {
            break;
        }
        let y = corner_y;
        for x in 0..w + 1 {
            output.push_str(if vertical(x, y) { WALL_UD } else { " " });
            if x < w {
                output.push_str(&cell_body(grid, Coordinate::new(x as u32, y as u32, z), display));
            }
        }
        output.push('\n');
    }
    output
}

fn cell_body(grid: &Grid, coord: Coordinate, display: Option<&dyn GridDisplay>) -> String {
    if let Some(displayer) = display {
        let body = displayer.render_cell_body(coord);
        if !is_blank(&body) {
            return body;
        }
    }

    if !grid.links(coord).is_empty() {
        return String::from(" * ");
    }
    if grid.mode() == SpatialMode::ThreeD {
        let is_open = |dir| grid.neighbour_at_direction(coord, dir).is_some() &&
                            grid.wall(coord, dir) == Some(false);
        match (is_open(Direction::Up), is_open(Direction::Down)) {
            (true, true) => return String::from(" ↕ "),
            (true, false) => return String::from(" ^ "),
            (false, true) => return String::from(" v "),
            (false, false) => {}
        }
    }
    String::from(EMPTY_BODY)
}

fn corner_glyph(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => WALL_LRUD,
        (true, true, true, false) => WALL_LRU,
        (true, true, false, true) => WALL_LRD,
        (true, false, true, true) => WALL_LUD,
        (false, true, true, true) => WALL_RUD,
        (true, true, false, false) => WALL_LR,
        (false, false, true, true) => WALL_UD,
        (false, true, true, false) => WALL_RU,
        (true, false, false, true) => WALL_LD,
        (true, false, true, false) => WALL_LU,
        (false, true, false, true) => WALL_RD,
        (true, false, false, false) => WALL_L,
        (false, true, false, false) => WALL_R,
        (false, false, true, false) => WALL_U,
        (false, false, false, true) => WALL_D,
        (false, false, false, false) => " ",
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Depth(depth) = self.dimensions().depth();
        for z in 0..depth {
            if self.mode() == SpatialMode::ThreeD {
                writeln!(f, "layer {}", z)?;
            }
            write!(f, "{}", render_layer(self, LayerIndex(z), None))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use smallvec::smallvec;

    fn closed_2d(w: usize, h: usize) -> Grid {
        Grid::create(&Configuration::maze_2d(w, h)).unwrap()
    }

    #[test]
    fn single_closed_cell() {
        let grid = closed_2d(1, 1);
        assert_eq!(render_layer(&grid, LayerIndex(0), None), "┌───┐\n│   │\n└───┘\n");
    }

    #[test]
    fn open_passage_removes_the_wall() {
        let mut grid = closed_2d(2, 1);
        assert_eq!(grid.to_string(), "┌───┬───┐\n│   │   │\n└───┴───┘\n");

        grid.open_passage(Coordinate::planar(0, 0), Coordinate::planar(1, 0));
        assert_eq!(grid.to_string(), "┌───────┐\n│       │\n└───────┘\n");
    }

    #[test]
    fn entrance_shows_as_a_gap() {
        let mut grid = closed_2d(1, 1);
        grid.set_wall(Coordinate::planar(0, 0), Direction::North, false);
        assert_eq!(render_layer(&grid, LayerIndex(0), None), "╷   ╷\n│   │\n└───┘\n");
    }

    #[test]
    fn overlays_and_links() {
        let mut grid = closed_2d(3, 1);
        grid.add_link(Coordinate::planar(0, 0), Coordinate::planar(2, 0));

        let start_end = StartEndPointsDisplay::new(smallvec![Coordinate::planar(0, 0)],
                                                   smallvec![]);
        let path = PathDisplay::new(&[Coordinate::planar(0, 0), Coordinate::planar(1, 0)]);
        let both = (start_end, path);
        let text = render_layer(&grid, LayerIndex(0), Some(&both));
        let body = text.lines().nth(1).unwrap();
        assert_eq!(body, "│ S │ . │ * │");
    }

    #[test]
    fn layers_of_a_3d_grid() {
        let mut grid = Grid::create(&Configuration::maze_3d(1, 1, 2)).unwrap();
        let bottom = Coordinate::new(0, 0, 0);
        grid.set_wall(bottom, Direction::Up, false);

        let text = grid.to_string();
        assert!(text.starts_with("layer 0\n"));
        assert!(text.contains("layer 1\n"));
        assert_eq!(render_layer(&grid, LayerIndex(0), None).lines().nth(1), Some("│ ^ │"));
        assert_eq!(render_layer(&grid, LayerIndex(1), None).lines().nth(1), Some("│ v │"));
        assert_eq!(render_layer(&grid, LayerIndex(2), None), "");
    }
}
