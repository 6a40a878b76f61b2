//! Console stand-in for the map view: keeps a tile board per world,
//! patches only the cells reported as changed and logs the day's stats.

use crate::runner::Update;
use eco_core::{MapKind, Position};
use eco_world::MapObject;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, trace, warn};

/// Displayable content of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Grass,
    Animal { energy: i32 },
}

impl From<MapObject<'_>> for Tile {
    fn from(object: MapObject<'_>) -> Self {
        match object {
            MapObject::Animal(animal) => Tile::Animal {
                energy: animal.energy,
            },
            MapObject::Grass(_) => Tile::Grass,
            MapObject::Empty => Tile::Empty,
        }
    }
}

impl Tile {
    fn glyph(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Grass => '*',
            Tile::Animal { energy } if *energy <= 0 => 'x',
            Tile::Animal { .. } => 'A',
        }
    }
}

pub struct Board {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; size],
        }
    }

    pub fn apply(&mut self, tiles: &[(Position, Tile)]) {
        for (position, tile) in tiles {
            if let Some(index) = self.index(*position) {
                self.tiles[index] = *tile;
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, position: Position) -> Option<Tile> {
        self.index(position).map(|index| self.tiles[index])
    }

    pub fn count(&self, predicate: impl Fn(&Tile) -> bool) -> usize {
        self.tiles.iter().filter(|t| predicate(*t)).count()
    }

    /// Rows top to bottom, north up
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.tiles[(y * self.width + x) as usize].glyph());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, position: Position) -> Option<usize> {
        position
            .within(self.width, self.height)
            .then(|| (position.y * self.width + position.x) as usize)
    }
}

/// Consume updates until the runner hangs up, returning the final boards
pub async fn report(
    mut updates: UnboundedReceiver<Update>,
    width: i32,
    height: i32,
) -> HashMap<MapKind, Board> {
    let mut boards: HashMap<MapKind, Board> = HashMap::new();

    while let Some(update) = updates.recv().await {
        let kind = update.report.kind;
        let board = boards
            .entry(kind)
            .or_insert_with(|| Board::new(width, height));
        board.apply(&update.tiles);

        let stats = &update.stats;
        info!(
            kind = %kind,
            day = stats.day,
            living = stats.living,
            dead = stats.dead,
            grass = stats.grass,
            average_energy = format!("{:.1}", stats.average_energy),
            average_lifespan = ?stats.average_lifespan,
            average_children = format!("{:.2}", stats.average_children),
            changed = update.report.changed.len(),
            "Day summary"
        );
        trace!(kind = %kind, day = stats.day, "\n{}", board.render());

        if stats.is_extinct() && stats.day > 0 {
            warn!(kind = %kind, day = stats.day, "Population extinct");
        }
    }

    boards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_patches_cells() {
        let mut board = Board::new(3, 2);
        board.apply(&[
            (Position::new(0, 0), Tile::Grass),
            (Position::new(2, 1), Tile::Animal { energy: 12 }),
            (Position::new(7, 7), Tile::Grass),
        ]);

        assert_eq!(board.get(Position::new(0, 0)), Some(Tile::Grass));
        assert_eq!(board.get(Position::new(1, 0)), Some(Tile::Empty));
        assert_eq!(board.get(Position::new(7, 7)), None);
        assert_eq!(board.count(|t| matches!(t, Tile::Animal { .. })), 1);
        assert_eq!(board.render(), "..A\n*..\n");

        board.apply(&[(Position::new(0, 0), Tile::Empty)]);
        assert_eq!(board.count(|t| *t == Tile::Grass), 0);
    }

    #[test]
    fn test_starving_animals_render_differently() {
        let mut board = Board::new(2, 1);
        board.apply(&[
            (Position::new(0, 0), Tile::Animal { energy: 0 }),
            (Position::new(1, 0), Tile::Animal { energy: 5 }),
        ]);
        assert_eq!(board.render(), "xA\n");
    }
}
