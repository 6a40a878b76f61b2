//! Sexual reproduction between two co-located animals.

use crate::animal::Animal;
use crate::genome::Genome;
use eco_core::{AnimalId, Direction};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub struct ReproductionSystem {
    /// Energy each parent pays into the child
    cost: i32,
}

impl ReproductionSystem {
    pub fn new(start_energy: i32) -> Self {
        Self {
            cost: start_energy / 2,
        }
    }

    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// Breed `first` and `second` into a new animal with id `id`.
    ///
    /// Each parent contributes a slice of its genome proportional to its
    /// share of the pair's energy; a coin flip decides which parent supplies
    /// the left part. Both parents pay [`cost`](Self::cost) and the child
    /// starts with the sum at the parents' position.
    pub fn create_child(
        &self,
        first: &mut Animal,
        second: &mut Animal,
        id: AnimalId,
        rng: &mut ChaCha8Rng,
    ) -> Animal {
        debug_assert_eq!(first.position, second.position);
        debug_assert_ne!(first.id, second.id);

        let genome = self.child_genome(first, second, rng);

        let paid = self.debit(first) + self.debit(second);
        first.record_offspring();
        second.record_offspring();

        let facing = Direction::from_index(rng.gen_range(0..Direction::COUNT));
        Animal::new(id, first.position, paid, genome, facing)
    }

    fn child_genome(&self, first: &Animal, second: &Animal, rng: &mut ChaCha8Rng) -> Genome {
        let length = first.genome.len();
        let total = first.energy.max(0) as f64 + second.energy.max(0) as f64;
        let share = if total > 0.0 {
            first.energy.max(0) as f64 / total
        } else {
            0.5
        };
        let from_first = ((length as f64) * share).round() as usize;

        if rng.gen_bool(0.5) {
            Genome::splice(&first.genome, &second.genome, from_first)
        } else {
            Genome::splice(&second.genome, &first.genome, length - from_first)
        }
    }

    fn debit(&self, parent: &mut Animal) -> i32 {
        let paid = self.cost.min(parent.energy.max(0));
        parent.energy -= paid;
        paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::Position;
    use rand::SeedableRng;

    fn parent(id: u64, energy: i32, gene: u8) -> Animal {
        Animal::new(
            AnimalId(id),
            Position::new(2, 3),
            energy,
            Genome::new(vec![gene; 8]).unwrap(),
            Direction::North,
        )
    }

    #[test]
    fn test_child_energy_and_bookkeeping() {
        let system = ReproductionSystem::new(80);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut a = parent(0, 70, 1);
        let mut b = parent(1, 64, 2);

        let child = system.create_child(&mut a, &mut b, AnimalId(2), &mut rng);

        assert_eq!(child.id, AnimalId(2));
        assert_eq!(child.energy, 80);
        assert_eq!(child.position, Position::new(2, 3));
        assert_eq!(child.age, 0);
        assert_eq!(child.children, 0);
        assert_eq!(a.energy, 30);
        assert_eq!(b.energy, 24);
        assert_eq!(a.children, 1);
        assert_eq!(b.children, 1);
    }

    #[test]
    fn test_genome_split_follows_energy_share() {
        let system = ReproductionSystem::new(80);
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            // 3:1 energy split over 8 genes -> 6 genes from the richer parent
            let mut a = parent(0, 90, 1);
            let mut b = parent(1, 30, 2);
            let child = system.create_child(&mut a, &mut b, AnimalId(2), &mut rng);

            let from_a = child.genome.genes().iter().filter(|&&g| g == 1).count();
            assert_eq!(from_a, 6);
            assert_eq!(child.genome.len(), 8);

            let genes = child.genome.genes();
            let left_is_a = genes[0] == 1;
            if left_is_a {
                assert_eq!(genes, &[1, 1, 1, 1, 1, 1, 2, 2]);
            } else {
                assert_eq!(genes, &[2, 2, 1, 1, 1, 1, 1, 1]);
            }
        }
    }

    #[test]
    fn test_parents_never_go_negative() {
        let system = ReproductionSystem::new(80);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut a = parent(0, 10, 1);
        let mut b = parent(1, 50, 2);
        let child = system.create_child(&mut a, &mut b, AnimalId(2), &mut rng);
        assert_eq!(a.energy, 0);
        assert_eq!(b.energy, 10);
        assert_eq!(child.energy, 50);
    }
}
