use error_chain::bail;
use serde_derive::{Deserialize, Serialize};

use crate::errors::*;
use crate::grid_dimensions::GridDimensions;
use crate::units::{Depth, Height, Percent, Width};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum PuzzleKind {
    /// Branching perfect maze.
    Maze,
    /// Single unbranched spiral corridor per layer.
    Labyrinth,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum SpatialMode {
    TwoD,
    ThreeD,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum GenerationAlgorithm {
    RecursiveBacktracker,
    Prim,
}

impl Default for GenerationAlgorithm {
    fn default() -> GenerationAlgorithm {
        GenerationAlgorithm::RecursiveBacktracker
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TimeConfig {
    pub enabled: bool,
    /// Walls shift on every n-th tick.
    pub shift_frequency: u32,
    /// Share of the layer area exempt from shifting.
    pub stability_islands: Percent,
    /// Shift distance as a share of the smaller lateral grid dimension.
    pub shift_extent: Percent,
}

impl Default for TimeConfig {
    fn default() -> TimeConfig {
        TimeConfig {
            enabled: true,
            shift_frequency: 1,
            stability_islands: Percent(20),
            shift_extent: Percent(10),
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct FifthDimensionConfig {
    pub enabled: bool,
    pub linkage_count: usize,
}

impl Default for FifthDimensionConfig {
    fn default() -> FifthDimensionConfig {
        FifthDimensionConfig { enabled: true, linkage_count: 1 }
    }
}

/// Everything needed to (re)build a grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub kind: PuzzleKind,
    pub mode: SpatialMode,
    pub width: Width,
    pub height: Height,
    /// Ignored in 2-D mode, where the depth is always 1.
    pub depth: Depth,
    pub algorithm: Option<GenerationAlgorithm>,
    pub time: Option<TimeConfig>,
    pub fifth_dimension: Option<FifthDimensionConfig>,
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            kind: PuzzleKind::Maze,
            mode: SpatialMode::TwoD,
            width: Width(10),
            height: Height(10),
            depth: Depth(1),
            algorithm: Some(GenerationAlgorithm::RecursiveBacktracker),
            time: None,
            fifth_dimension: None,
            seed: None,
        }
    }
}

impl Configuration {
    pub fn maze_2d(width: usize, height: usize) -> Configuration {
        Configuration {
            width: Width(width),
            height: Height(height),
            ..Configuration::default()
        }
    }

    pub fn maze_3d(width: usize, height: usize, depth: usize) -> Configuration {
        Configuration {
            mode: SpatialMode::ThreeD,
            width: Width(width),
            height: Height(height),
            depth: Depth(depth),
            ..Configuration::default()
        }
    }

    pub fn labyrinth_2d(width: usize, height: usize) -> Configuration {
        Configuration {
            kind: PuzzleKind::Labyrinth,
            ..Configuration::maze_2d(width, height)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Configuration {
        self.seed = Some(seed);
        self
    }

    pub fn with_algorithm(mut self, algorithm: GenerationAlgorithm) -> Configuration {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn generation_algorithm(&self) -> GenerationAlgorithm {
        self.algorithm.unwrap_or_default()
    }

    /// The time sub-config, only when present and enabled.
    pub fn active_time(&self) -> Option<&TimeConfig> {
        self.time.as_ref().filter(|time| time.enabled)
    }

    /// The 5th dimension sub-config, only when present and enabled.
    pub fn active_fifth_dimension(&self) -> Option<&FifthDimensionConfig> {
        self.fifth_dimension.as_ref().filter(|fifth| fifth.enabled)
    }

    pub fn dimensions(&self) -> GridDimensions {
        let depth = match self.mode {
            SpatialMode::TwoD => Depth(1),
            SpatialMode::ThreeD => self.depth,
        };
        GridDimensions::new(self.width, self.height, depth)
    }

    /// Check sizes and sub-config ranges. Runs before any grid is allocated.
    pub fn validate(&self) -> Result<()> {
        let Width(width) = self.width;
        let Height(height) = self.height;
        let Depth(depth) = self.depth;

        if width == 0 || height == 0 {
            bail!(ErrorKind::InvalidConfiguration(format!("grid size {}x{} must be at least 1x1",
                                                          width,
                                                          height)));
        }
        if self.mode == SpatialMode::ThreeD && depth == 0 {
            bail!(ErrorKind::InvalidConfiguration(String::from("3-D grid depth must be at least 1")));
        }

        let cells_count = width.checked_mul(height)
            .and_then(|area| area.checked_mul(self.dimensions().depth().0))
            .filter(|count| *count <= u32::MAX as usize);
        if cells_count.is_none() {
            bail!(ErrorKind::InvalidConfiguration(format!("grid size {}x{}x{} is too large",
                                                          width,
                                                          height,
                                                          depth)));
        }

        if let Some(time) = self.time.as_ref() {
            if time.shift_frequency == 0 {
                bail!(ErrorKind::InvalidConfiguration(String::from("shift frequency must be at least 1")));
            }
            if time.stability_islands.0 > 100 {
                bail!(ErrorKind::InvalidConfiguration(format!("stability islands {}% out of range 0-100",
                                                              time.stability_islands.0)));
            }
            if time.shift_extent.0 == 0 || time.shift_extent.0 > 100 {
                bail!(ErrorKind::InvalidConfiguration(format!("shift extent {}% out of range 1-100",
                                                              time.shift_extent.0)));
            }
        }

        if let Some(fifth) = self.fifth_dimension.as_ref() {
            if fifth.linkage_count == 0 {
                bail!(ErrorKind::InvalidConfiguration(String::from("linkage count must be at least 1")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_configuration_error(result: Result<()>) -> bool {
        match result {
            Err(ref e) => matches!(*e.kind(), ErrorKind::InvalidConfiguration(_)),
            Ok(_) => false,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Configuration::default().validate().is_ok());
        assert!(Configuration::maze_3d(4, 4, 3).validate().is_ok());
        assert!(Configuration::labyrinth_2d(1, 1).validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(is_configuration_error(Configuration::maze_2d(0, 5).validate()));
        assert!(is_configuration_error(Configuration::maze_2d(5, 0).validate()));
        assert!(is_configuration_error(Configuration::maze_3d(5, 5, 0).validate()));
    }

    #[test]
    fn depth_is_ignored_in_two_d() {
        let mut config = Configuration::maze_2d(3, 4);
        config.depth = Depth(0);
        assert!(config.validate().is_ok());
        assert_eq!(config.dimensions().depth(), Depth(1));
    }

    #[test]
    fn sub_config_ranges() {
        let mut config = Configuration::maze_2d(5, 5);
        config.time = Some(TimeConfig { shift_frequency: 0, ..TimeConfig::default() });
        assert!(is_configuration_error(config.validate()));

        config.time = Some(TimeConfig { stability_islands: Percent(101), ..TimeConfig::default() });
        assert!(is_configuration_error(config.validate()));

        config.time = Some(TimeConfig { shift_extent: Percent(0), ..TimeConfig::default() });
        assert!(is_configuration_error(config.validate()));

        config.time = Some(TimeConfig::default());
        config.fifth_dimension = Some(FifthDimensionConfig { enabled: true, linkage_count: 0 });
        assert!(is_configuration_error(config.validate()));
    }

    #[test]
    fn disabled_sub_configs_are_inactive() {
        let mut config = Configuration::maze_2d(5, 5);
        config.time = Some(TimeConfig { enabled: false, ..TimeConfig::default() });
        config.fifth_dimension = Some(FifthDimensionConfig { enabled: false, linkage_count: 2 });
        assert!(config.active_time().is_none());
        assert!(config.active_fifth_dimension().is_none());
    }
}
