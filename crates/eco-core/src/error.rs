//! Error types for the simulation.

use crate::types::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Position {position} is outside the {width}x{height} map")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },

    #[error("Not enough parents at {position}: need 2 eligible, found {found}")]
    NotEnoughParents { position: Position, found: usize },

    #[error("Invalid gene: {0}")]
    InvalidGene(u8),

    #[error("Invalid genome: {0}")]
    InvalidGenome(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
