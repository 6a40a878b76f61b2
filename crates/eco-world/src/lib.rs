//! World simulation engine.
//!
//! This module implements the 2D grid world where animals graze, breed and
//! die, one day at a time.

pub mod animal;
pub mod boundary;
pub mod genome;
pub mod jungle;
pub mod observer;
pub mod reproduction;
pub mod world_map;

pub use animal::Animal;
pub use boundary::{Boundary, BorderedBoundary, MoveLimiter, WrappedBoundary};
pub use genome::Genome;
pub use jungle::Jungle;
pub use observer::{DayChangeObserver, DayReport};
pub use reproduction::ReproductionSystem;
pub use world_map::{place_unique, Grass, MapObject, WorldMap};
