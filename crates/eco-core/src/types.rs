//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Unique identifier for an animal.
///
/// Ids are handed out by a single [`IdProvider`] per world and are never
/// reused, so they double as an index into the world's animal arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl AnimalId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of [`AnimalId`]s
#[derive(Debug, Default, Clone)]
pub struct IdProvider {
    next: u64,
}

impl IdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are less than or equal to `other`'s
    pub fn precedes(&self, other: &Position) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// True when both coordinates are greater than or equal to `other`'s
    pub fn follows(&self, other: &Position) -> bool {
        self.x >= other.x && self.y >= other.y
    }

    pub fn upper_right(&self, other: &Position) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    pub fn lower_left(&self, other: &Position) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn subtract(&self, other: &Position) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Swap the axes
    pub fn opposite(&self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    /// Apply toroidal wrapping for given world dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// Whether the position lies in `[0, width) x [0, height)`
    pub fn within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        self.translate(other.x, other.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        self.subtract(&other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Facing of an animal, clockwise from north in 45 degree steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Number of distinct facings; also the gene alphabet size
    pub const COUNT: u8 = 8;

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Self {
        Self::all()[(index % Self::COUNT) as usize]
    }

    /// Turn clockwise by `steps` eighths of a full circle
    pub fn rotate(&self, steps: u8) -> Self {
        Self::from_index(self.index() + steps % Self::COUNT)
    }

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

/// Which boundary topology a world uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Wrapped,
    Bordered,
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Wrapped => write!(f, "wrapped"),
            MapKind::Bordered => write!(f, "bordered"),
        }
    }
}
