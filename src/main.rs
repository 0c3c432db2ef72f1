use docopt::Docopt;
use hypermaze::{
    cells::{Coordinate, CoordinateSmallVec},
    config::{Configuration, FifthDimensionConfig, GenerationAlgorithm, PuzzleKind, SpatialMode,
             TimeConfig},
    dimension_linker::DimensionLinker,
    generators,
    grid::Grid,
    grid_displays::{self, GridDisplay, PathDisplay, StartEndPointsDisplay},
    pathing::{self, Distances, Solution},
    time_mutator::TimeMutator,
    units::{Depth, Height, LayerIndex, Percent, Width},
};
use log::{debug, info};
use serde_derive::Deserialize;
use std::{fs::File, io::prelude::*, path::Path};

const USAGE: &str = "Hypermaze

Usage:
    maze_driver -h | --help
    maze_driver list-solvers
    maze_driver [maze|labyrinth] [--width=<w> --height=<h> --depth=<d>] [--prim] [--seed=<n>] [--solver=<id>] [--time-ticks=<n> --shift-frequency=<n> --stability-islands=<p> --shift-extent=<p>] [--boundary-links=<n>] [--links=<n>] [--show-distances] [--text-out=<path>]

Options:
    -h --help                  Show this screen.
    --width=<w>                Cells along x [default: 10].
    --height=<h>               Cells along y [default: 10].
    --depth=<d>                Layers along z, more than 1 makes a 3-D grid [default: 1].
    --prim                     Carve mazes with Prim's algorithm instead of recursive backtracking.
    --seed=<n>                 Seed for every random choice, for reproducible runs.
    --solver=<id>              Solver identifier, see list-solvers [default: astar].
    --time-ticks=<n>           Run the time mutator for n ticks before solving [default: 0].
    --shift-frequency=<n>      Walls shift on every n-th tick [default: 1].
    --stability-islands=<p>    Percentage of columns that never shift [default: 20].
    --shift-extent=<p>         Shift distance as a percentage of the smaller side [default: 10].
    --boundary-links=<n>       5th dimension links per pair of opposite boundaries.
    --links=<n>                Random 5th dimension links between arbitrary cells.
    --show-distances           Show move counts from the start instead of the solution path.
    --text-out=<path>          Write the rendered maze to a text file instead of stdout.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_list_solvers: bool,
    cmd_labyrinth: bool,
    flag_width: usize,
    flag_height: usize,
    flag_depth: usize,
    flag_prim: bool,
    flag_seed: Option<u64>,
    flag_solver: String,
    flag_time_ticks: u32,
    flag_shift_frequency: u32,
    flag_stability_islands: u8,
    flag_shift_extent: u8,
    flag_boundary_links: Option<usize>,
    flag_links: Option<usize>,
    flag_show_distances: bool,
    flag_text_out: String,
}

// The driver's own errors, chaining the library's.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(hypermaze::errors::Error, hypermaze::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.cmd_list_solvers {
        list_solvers();
        return Ok(());
    }

    let config = configuration_from_args(&args);
    let mut grid = generators::generate(&config)?;
    let (start, goal) = (generators::start(&grid), generators::goal(&grid));

    if let Some(mut mutator) = TimeMutator::from_configuration(&config) {
        let moved_ticks = (0..args.flag_time_ticks)
            .filter(|_| mutator.shift_walls(&mut grid))
            .count();
        info!("walls shifted on {} of {} ticks", moved_ticks, args.flag_time_ticks);
    }

    if let Some(linkage_count) = args.flag_links {
        let mut linker = DimensionLinker::new(&FifthDimensionConfig {
                                                  enabled: true,
                                                  linkage_count,
                                              },
                                              config.seed);
        let linked = linker.link(&mut grid);
        let issues = linker.validate(&grid);
        debug!("{} random links registered, {} issues", linked, issues.len());
    }

    let mut solver = pathing::solver_for(&args.flag_solver)?;
    let solution = solver.solve(&grid, start, goal);

    let rendered = if args.flag_show_distances {
        let distances = Distances::new(&grid, start)
            .ok_or("The maze start is not a cell of the grid.")?;
        render(&grid, &distances)
    } else {
        let start_end = StartEndPointsDisplay::new(as_coordinate_smallvec(start),
                                                   as_coordinate_smallvec(goal));
        render(&grid, &(start_end, PathDisplay::new(&solution.path)))
    };
    let report = format!("{}\n{}", rendered, solution_report(solver.info().name, &solution));

    if args.flag_text_out.is_empty() {
        println!("{}", report);
    } else {
        write_text_to_file(&report, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn configuration_from_args(args: &MazeArgs) -> Configuration {
    let mode = if args.flag_depth > 1 { SpatialMode::ThreeD } else { SpatialMode::TwoD };
    let algorithm = if args.flag_prim {
        GenerationAlgorithm::Prim
    } else {
        GenerationAlgorithm::RecursiveBacktracker
    };
    let time = if args.flag_time_ticks > 0 {
        Some(TimeConfig {
            enabled: true,
            shift_frequency: args.flag_shift_frequency,
            stability_islands: Percent(args.flag_stability_islands),
            shift_extent: Percent(args.flag_shift_extent),
        })
    } else {
        None
    };
    let fifth_dimension = args.flag_boundary_links.map(|linkage_count| {
        FifthDimensionConfig {
            enabled: true,
            linkage_count,
        }
    });

    Configuration {
        kind: if args.cmd_labyrinth { PuzzleKind::Labyrinth } else { PuzzleKind::Maze },
        mode,
        width: Width(args.flag_width),
        height: Height(args.flag_height),
        depth: Depth(args.flag_depth),
        algorithm: Some(algorithm),
        time,
        fifth_dimension,
        seed: args.flag_seed,
    }
}

fn render(grid: &Grid, display: &dyn GridDisplay) -> String {
    let Depth(depth) = grid.dimensions().depth();
    let mut output = String::new();
    for z in 0..depth {
        if grid.mode() == SpatialMode::ThreeD {
            output.push_str(&format!("layer {}\n", z));
        }
        output.push_str(&grid_displays::render_layer(grid, LayerIndex(z), Some(display)));
    }
    output
}

fn solution_report(solver_name: &str, solution: &Solution) -> String {
    format!("{}: {}\n  path length: {}\n  steps: {}\n  nodes explored: {}\n  time: {:.3}ms",
            solver_name,
            if solution.solved { "solved" } else { "unsolved" },
            solution.stats.path_length,
            solution.stats.total_steps,
            solution.stats.nodes_explored,
            solution.stats.time_taken)
}

fn list_solvers() {
    for info in pathing::all_solvers() {
        println!("{:<14} {:<22} optimal: {:<5} complete: {:<5} {}",
                 info.identifier,
                 info.name,
                 info.optimal,
                 info.complete,
                 info.description);
    }
}

fn as_coordinate_smallvec(coord: Coordinate) -> CoordinateSmallVec {
    [coord].iter().cloned().collect::<CoordinateSmallVec>()
}

fn write_text_to_file(data: &str, file_name: &str) -> Result<()> {
    let path = Path::new(file_name);
    let mut f = File::create(path)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
