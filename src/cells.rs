use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Grid position. `z` is always 0 in a 2-D grid.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

pub type CoordinateSmallVec = SmallVec<[Coordinate; 6]>;
pub type CoordinateOptionSmallVec = SmallVec<[Option<Coordinate>; 6]>;

impl Coordinate {
    pub fn new(x: u32, y: u32, z: u32) -> Coordinate {
        Coordinate { x, y, z }
    }

    pub fn planar(x: u32, y: u32) -> Coordinate {
        Coordinate { x, y, z: 0 }
    }

    /// Taxicab distance over all three axes.
    pub fn manhattan_distance(&self, other: Coordinate) -> u32 {
        abs_diff(self.x, other.x) + abs_diff(self.y, other.y) + abs_diff(self.z, other.z)
    }

    pub fn euclidean_distance(&self, other: Coordinate) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from(x_y_pair: (u32, u32)) -> Coordinate {
        Coordinate::planar(x_y_pair.0, x_y_pair.1)
    }
}

impl From<(u32, u32, u32)> for Coordinate {
    fn from(x_y_z: (u32, u32, u32)) -> Coordinate {
        Coordinate::new(x_y_z.0, x_y_z.1, x_y_z.2)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[inline]
fn abs_diff(a: u32, b: u32) -> u32 {
    if a > b { a - b } else { b - a }
}

/// North is towards y == 0, West towards x == 0 and Down towards z == 0.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [Direction::North,
                                     Direction::South,
                                     Direction::East,
                                     Direction::West,
                                     Direction::Up,
                                     Direction::Down];

    pub const LATERAL: [Direction; 4] = [Direction::North,
                                         Direction::South,
                                         Direction::East,
                                         Direction::West];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Quarter turn anticlockwise when looking down on a layer. Vertical directions do not turn.
    pub fn turn_left(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
            vertical => vertical,
        }
    }

    pub fn turn_right(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            vertical => vertical,
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        self == Direction::Up || self == Direction::Down
    }

    /// Unit step (dx, dy, dz) for this direction.
    pub fn delta(self) -> (i64, i64, i64) {
        match self {
            Direction::North => (0, -1, 0),
            Direction::South => (0, 1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    /// Creates a new `Coordinate` offset 1 cell away in this direction.
    /// Returns None if the coordinate is not representable; it may still be outside of a grid.
    pub fn offset(self, coord: Coordinate) -> Option<Coordinate> {
        let Coordinate { x, y, z } = coord;
        match self {
            Direction::North => y.checked_sub(1).map(|y| Coordinate::new(x, y, z)),
            Direction::South => y.checked_add(1).map(|y| Coordinate::new(x, y, z)),
            Direction::East => x.checked_add(1).map(|x| Coordinate::new(x, y, z)),
            Direction::West => x.checked_sub(1).map(|x| Coordinate::new(x, y, z)),
            Direction::Up => z.checked_add(1).map(|z| Coordinate::new(x, y, z)),
            Direction::Down => z.checked_sub(1).map(|z| Coordinate::new(x, y, z)),
        }
    }

    #[inline]
    fn wall_index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
            Direction::Up => 4,
            Direction::Down => 5,
        }
    }
}

/// The six wall flags of a cell, `true` meaning the wall is present.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Walls {
    flags: [bool; 6],
}

impl Walls {
    pub fn closed() -> Walls {
        Walls { flags: [true; 6] }
    }

    pub fn open() -> Walls {
        Walls { flags: [false; 6] }
    }

    #[inline]
    pub fn has(&self, dir: Direction) -> bool {
        self.flags[dir.wall_index()]
    }

    #[inline]
    pub fn set(&mut self, dir: Direction, present: bool) {
        self.flags[dir.wall_index()] = present;
    }

    pub fn open_lateral_count(&self) -> usize {
        Direction::LATERAL.iter().filter(|dir| !self.has(**dir)).count()
    }
}

impl Default for Walls {
    fn default() -> Walls {
        Walls::closed()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coordinate: Coordinate,
    walls: Walls,
    visited: bool,
}

impl Cell {
    pub fn new(coordinate: Coordinate, walls: Walls) -> Cell {
        Cell { coordinate, walls, visited: false }
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[inline]
    pub fn walls(&self) -> Walls {
        self.walls
    }

    #[inline]
    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls.has(dir)
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub(crate) fn set_wall(&mut self, dir: Direction, present: bool) {
        self.walls.set(dir, present);
    }

    pub(crate) fn set_visited(&mut self, visited: bool) {
        self.visited = visited;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for dir in Direction::ALL.iter() {
            assert_ne!(*dir, dir.opposite());
            assert_eq!(*dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn turning_four_times_is_identity() {
        for dir in Direction::LATERAL.iter() {
            let left = dir.turn_left().turn_left().turn_left().turn_left();
            let right = dir.turn_right().turn_right().turn_right().turn_right();
            assert_eq!(left, *dir);
            assert_eq!(right, *dir);
            assert_eq!(dir.turn_left().turn_right(), *dir);
            assert_eq!(dir.turn_left().turn_left(), dir.opposite());
        }
        assert_eq!(Direction::Up.turn_left(), Direction::Up);
    }

    #[test]
    fn offsets_at_zero_are_unrepresentable() {
        let origin = Coordinate::new(0, 0, 0);
        assert_eq!(Direction::North.offset(origin), None);
        assert_eq!(Direction::West.offset(origin), None);
        assert_eq!(Direction::Down.offset(origin), None);
        assert_eq!(Direction::South.offset(origin), Some(Coordinate::new(0, 1, 0)));
        assert_eq!(Direction::East.offset(origin), Some(Coordinate::new(1, 0, 0)));
        assert_eq!(Direction::Up.offset(origin), Some(Coordinate::new(0, 0, 1)));
    }

    #[test]
    fn distances() {
        let a = Coordinate::new(0, 0, 0);
        let b = Coordinate::new(3, 4, 0);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
        assert!((a.euclidean_distance(b) - 5.0).abs() < 1e-9);
        assert_eq!(Coordinate::new(1, 1, 2).manhattan_distance(Coordinate::new(1, 1, 0)), 2);
    }

    #[test]
    fn wall_flags() {
        let mut walls = Walls::closed();
        assert_eq!(walls.open_lateral_count(), 0);
        walls.set(Direction::East, false);
        walls.set(Direction::Up, false);
        assert!(!walls.has(Direction::East));
        assert!(walls.has(Direction::West));
        assert_eq!(walls.open_lateral_count(), 1);
    }
}
