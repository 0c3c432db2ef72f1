//! **hypermaze** is a multi-dimensional maze and labyrinth generation, mutation and route
//! finding library.
//!
//! A [`grid::Grid`] is carved by [`generators::generate`] from a [`config::Configuration`],
//! optionally reshaped over time by a [`time_mutator::TimeMutator`] and cross linked by a
//! [`dimension_linker::DimensionLinker`], then searched by any solver from [`pathing`].

pub mod cells;
pub mod config;
pub mod dimension_linker;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_dimensions;
pub mod grid_displays;
pub mod grid_iterators;
pub mod pathing;
pub mod snapshot;
pub mod time_mutator;
pub mod units;
mod utils;
