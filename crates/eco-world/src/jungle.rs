//! Fertile sub-region of the map.

use eco_core::Position;
use serde::{Deserialize, Serialize};

/// Rectangle centred on the map where grass grows preferentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jungle {
    lower_left: Position,
    upper_right: Position,
}

impl Jungle {
    /// `ratio` scales each axis of the map; 0.0 gives an empty jungle.
    pub fn new(width: i32, height: i32, ratio: f64) -> Self {
        let jungle_width = (width as f64 * ratio).round() as i32;
        let jungle_height = (height as f64 * ratio).round() as i32;
        let lower_left = Position::new((width - jungle_width) / 2, (height - jungle_height) / 2);
        let upper_right = lower_left.translate(jungle_width - 1, jungle_height - 1);
        Self {
            lower_left,
            upper_right,
        }
    }

    pub fn lower_left(&self) -> Position {
        self.lower_left
    }

    pub fn upper_right(&self) -> Position {
        self.upper_right
    }

    /// Whether `position` is fertile
    pub fn contains(&self, position: Position) -> bool {
        position.follows(&self.lower_left) && position.precedes(&self.upper_right)
    }

    pub fn area(&self) -> usize {
        let size = self.upper_right.subtract(&self.lower_left).translate(1, 1);
        if size.x <= 0 || size.y <= 0 {
            0
        } else {
            (size.x * size.y) as usize
        }
    }
}
