//! Animal state and movement.

use crate::boundary::MoveLimiter;
use crate::genome::Genome;
use eco_core::{AnimalId, Direction, Position};

/// An animal in the simulation
#[derive(Debug, Clone)]
pub struct Animal {
    pub id: AnimalId,
    pub position: Position,
    pub energy: i32,
    pub genome: Genome,
    pub facing: Direction,
    /// Index of the gene read on the next step
    pub gene_cursor: usize,
    /// Days survived
    pub age: u32,
    pub children: u32,
}

/// Sort key of an animal inside a position's resident set: poorest first,
/// older ids before newer ones on equal energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resident {
    pub energy: i32,
    pub id: AnimalId,
}

impl Animal {
    pub fn new(
        id: AnimalId,
        position: Position,
        energy: i32,
        genome: Genome,
        facing: Direction,
    ) -> Self {
        Self {
            id,
            position,
            energy,
            genome,
            facing,
            gene_cursor: 0,
            age: 0,
            children: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn resident(&self) -> Resident {
        Resident {
            energy: self.energy,
            id: self.id,
        }
    }

    pub fn add_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_add(amount);
    }

    pub fn consume_energy(&mut self, amount: i32) -> bool {
        if self.energy >= amount {
            self.energy -= amount;
            true
        } else {
            self.energy = 0;
            false
        }
    }

    pub fn record_offspring(&mut self) {
        self.children += 1;
    }

    /// Take one day's step.
    ///
    /// Pays `move_energy`, turns by the gene under the cursor and tries to
    /// walk one cell forward. Returns the previous position when the animal
    /// actually relocated; a refused step leaves it turned in place.
    pub fn step<L: MoveLimiter>(&mut self, move_energy: i32, limiter: &L) -> Option<Position> {
        self.consume_energy(move_energy);
        self.age += 1;

        let turn = self.genome.gene_at(self.gene_cursor);
        self.facing = self.facing.rotate(turn);
        self.gene_cursor = (self.gene_cursor + 1) % self.genome.len();

        let (dx, dy) = self.facing.to_delta();
        let candidate = self.position.translate(dx, dy);
        if !limiter.can_move_to(candidate) {
            return None;
        }

        let old = self.position;
        self.position = limiter.canonicalize(candidate);
        Some(old)
    }
}
