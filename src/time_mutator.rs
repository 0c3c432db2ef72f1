use bit_set::BitSet;
use itertools::iproduct;
use log::{debug, trace};
use rand::seq::SliceRandom;
use std::cmp;

use crate::cells::{Coordinate, Walls};
use crate::config::{Configuration, TimeConfig};
use crate::grid::Grid;
use crate::grid_dimensions::GridDimensions;
use crate::units::{Depth, Height, Width};
use crate::utils;

/// Migrates wall state across discrete ticks, leaving a fixed set of stability island columns
/// untouched.
///
/// A column is every cell sharing an (x, y) position across all layers. Walls are copied through
/// `Grid::set_wall`, so the mirrored wall of every neighbour follows and wall symmetry holds
/// after each shift. A wall facing a stability island is never copied, which keeps the island's
/// walls exactly as generated.
#[derive(Debug, Clone)]
pub struct TimeMutator {
    config: TimeConfig,
    dimensions: GridDimensions,
    stable: BitSet,
    tick: u64,
}

impl TimeMutator {
    /// Pick the stability islands. The same seed always picks the same columns, and so does
    /// leaving the seed out.
    pub fn new(dimensions: &GridDimensions, config: &TimeConfig, seed: Option<u64>) -> TimeMutator {
        let (Width(w), Height(h)) = (dimensions.width(), dimensions.height());
        let area = dimensions.layer_area();

        let mut columns = (0..area).collect::<Vec<_>>();
        columns.shuffle(&mut utils::layout_rng(seed));

        let islands_count = cmp::min(area,
                                     (area as f64 * config.stability_islands.fraction()).round() as
                                     usize);
        let mut stable = BitSet::with_capacity(area);
        for column in columns.into_iter().take(islands_count) {
            stable.insert(column);
        }
        debug!("{} of {} columns ({}x{}) are stability islands", islands_count, area, w, h);

        TimeMutator {
            config: *config,
            dimensions: *dimensions,
            stable,
            tick: 0,
        }
    }

    /// A mutator for the configuration's time sub-config, if it is present and enabled.
    pub fn from_configuration(config: &Configuration) -> Option<TimeMutator> {
        config.active_time()
            .map(|time| TimeMutator::new(&config.dimensions(), time, config.seed))
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_stable(&self, x: u32, y: u32) -> bool {
        let Width(w) = self.dimensions.width();
        let Height(h) = self.dimensions.height();
        (x as usize) < w && (y as usize) < h && self.stable.contains(y as usize * w + x as usize)
    }

    /// Stability island columns in row order.
    pub fn stable_columns(&self) -> Vec<(u32, u32)> {
        let Width(w) = self.dimensions.width();
        self.stable
            .iter()
            .map(|column| ((column % w) as u32, (column / w) as u32))
            .collect()
    }

    /// How far a column moves on a shift: the extent share of the smaller lateral dimension.
    pub fn shift_distance(&self) -> usize {
        let smaller = cmp::min(self.dimensions.width().0, self.dimensions.height().0);
        cmp::max(1, (smaller as f64 * self.config.shift_extent.fraction()).round() as usize)
    }

    /// Advance one tick. On every `shift_frequency`-th tick each active column copies its wall
    /// state onto the column it drifts to. Returns whether any column moved.
    pub fn shift_walls(&mut self, grid: &mut Grid) -> bool {
        self.tick += 1;
        if self.tick % u64::from(self.config.shift_frequency) != 0 {
            return false;
        }

        let (Width(w), Height(h), Depth(depth)) = (self.dimensions.width(),
                                                   self.dimensions.height(),
                                                   self.dimensions.depth());
        let before: Vec<Walls> = grid.all_cells().map(|cell| cell.walls()).collect();
        let distance = self.shift_distance() as i64;
        let mut moved_columns = 0;

        for (y, x) in iproduct!(0..h as u32, 0..w as u32) {
            if self.is_stable(x, y) {
                continue;
            }
            let (dx, dy) = self.drift(x, y);
            let dest_x = clamp(i64::from(x) + dx * distance, w);
            let dest_y = clamp(i64::from(y) + dy * distance, h);
            if (dest_x, dest_y) == (x, y) || self.is_stable(dest_x, dest_y) {
                continue;
            }

            for z in 0..depth as u32 {
                let source = Coordinate::new(x, y, z);
                let dest = Coordinate::new(dest_x, dest_y, z);
                let source_walls = match grid.coordinate_to_index(source) {
                    Some(index) => before[index],
                    None => continue,
                };
                for dir in grid.directions() {
                    let faces_island = grid.neighbour_at_direction(dest, *dir)
                        .map_or(false, |n| self.is_stable(n.x, n.y));
                    if !faces_island {
                        grid.set_wall(dest, *dir, source_walls.has(*dir));
                    }
                }
            }
            trace!("tick {}: column ({}, {}) shifted to ({}, {})", self.tick, x, y, dest_x, dest_y);
            moved_columns += 1;
        }

        debug!("tick {}: {} columns shifted", self.tick, moved_columns);
        moved_columns > 0
    }

    /// Smooth per column drift direction, varying with position and time. Each component is
    /// -1, 0 or 1.
    fn drift(&self, x: u32, y: u32) -> (i64, i64) {
        let angle = f64::from(x) * 0.5 + f64::from(y) * 0.3 + self.tick as f64 * 0.25;
        (angle.cos().round() as i64, angle.sin().round() as i64)
    }
}

#[inline]
fn clamp(value: i64, length: usize) -> u32 {
    cmp::max(0, cmp::min(value, length as i64 - 1)) as u32
}
