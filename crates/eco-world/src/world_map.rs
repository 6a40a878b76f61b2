//! Simulation engine owning one world and advancing it a day at a time.

use crate::animal::{Animal, Resident};
use crate::boundary::{Boundary, MoveLimiter};
use crate::genome::Genome;
use crate::jungle::Jungle;
use crate::observer::{DayChangeObserver, DayReport};
use crate::reproduction::ReproductionSystem;
use eco_core::{
    average, AnimalId, Direction, Error, IdProvider, MapKind, Position, Result, WorldConfig,
    WorldStats,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, trace};

/// A grass tuft waiting to be eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grass {
    pub position: Position,
}

/// What a renderer should draw on a cell
#[derive(Debug, Clone, Copy)]
pub enum MapObject<'a> {
    Animal(&'a Animal),
    Grass(&'a Grass),
    Empty,
}

/// A step taken this day whose bookkeeping is still outstanding
#[derive(Debug, Clone, Copy)]
struct PendingMove {
    id: AnimalId,
    from: Position,
}

pub struct WorldMap {
    config: WorldConfig,
    boundary: Boundary,
    jungle: Jungle,
    reproduction: ReproductionSystem,
    ids: IdProvider,
    rng: ChaCha8Rng,
    /// Every animal ever created, indexed by id
    animals: Vec<Animal>,
    living: Vec<AnimalId>,
    dead: Vec<AnimalId>,
    /// Only non-empty sets are kept
    residents: BTreeMap<Position, BTreeSet<Resident>>,
    grass: BTreeMap<Position, Grass>,
    free_positions: BTreeSet<Position>,
    changed: BTreeSet<Position>,
    pending_moves: Vec<PendingMove>,
    observers: Vec<Box<dyn DayChangeObserver>>,
    day: u64,
    revivals_left: u32,
}

/// Pick a uniformly random candidate, `None` when there is nothing to pick
pub fn place_unique(candidates: &[Position], rng: &mut ChaCha8Rng) -> Option<Position> {
    candidates.choose(rng).copied()
}

impl WorldMap {
    pub fn new(config: WorldConfig, kind: MapKind) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, kind, rng)
    }

    /// Build a world drawing all randomness from `rng`
    pub fn with_rng(config: WorldConfig, kind: MapKind, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let free_positions = (0..config.width)
            .flat_map(|x| (0..config.height).map(move |y| Position::new(x, y)))
            .collect();

        let mut world = Self {
            boundary: Boundary::new(kind, config.width, config.height),
            jungle: Jungle::new(config.width, config.height, config.jungle_ratio),
            reproduction: ReproductionSystem::new(config.start_energy),
            ids: IdProvider::new(),
            rng,
            animals: Vec::new(),
            living: Vec::new(),
            dead: Vec::new(),
            residents: BTreeMap::new(),
            grass: BTreeMap::new(),
            free_positions,
            changed: BTreeSet::new(),
            pending_moves: Vec::new(),
            observers: Vec::new(),
            day: 0,
            revivals_left: config.revival.max_revivals,
            config,
        };

        for _ in 0..world.config.initial_animals {
            let genome = Genome::random(world.config.genome_length, &mut world.rng);
            world.add_animal_at_random(genome);
        }

        let mut candidates = world.grass_candidates();
        for _ in 0..world.config.initial_grass {
            if !world.plant_in(&mut candidates) {
                break;
            }
        }

        world.changed.clear();

        info!(
            kind = %kind,
            width = world.config.width,
            height = world.config.height,
            animals = world.living.len(),
            grass = world.grass.len(),
            "World created"
        );

        Ok(world)
    }

    /// Register an observer notified at the end of every day
    pub fn subscribe(&mut self, observer: Box<dyn DayChangeObserver>) {
        self.observers.push(observer);
    }

    /// Run one full day: death cleanup, movement, feeding, reproduction,
    /// growth.
    pub fn advance_day(&mut self) -> DayReport {
        self.changed.clear();

        if self.revival_due() {
            self.revive();
        }

        let deaths = self.remove_dead_animals();
        debug_assert!(self.invariants_hold());
        self.move_animals();
        debug_assert!(self.invariants_hold());
        let meals = self.feed_animals();
        let births = self.reproduce_animals();
        debug_assert!(self.invariants_hold());
        let sprouted = self.grow_grass();

        self.day += 1;
        debug_assert!(self.invariants_hold());

        let kind = self.kind();
        debug!(
            day = self.day,
            kind = %kind,
            population = self.living.len(),
            deaths,
            births,
            meals,
            sprouted,
            grass = self.grass.len(),
            changed = self.changed.len(),
            "Day complete"
        );

        for observer in &mut self.observers {
            observer.on_day_changed(&self.changed, kind);
        }

        DayReport {
            day: self.day,
            kind,
            changed: self.changed.clone(),
        }
    }

    /// Place an animal with start energy at `position`. The genome must have
    /// the configured length so it can breed with everyone else.
    pub fn spawn_animal(&mut self, position: Position, genome: Genome) -> Result<AnimalId> {
        let position = self.check_position(position)?;
        if genome.len() != self.config.genome_length {
            return Err(Error::InvalidGenome(format!(
                "expected {} genes, got {}",
                self.config.genome_length,
                genome.len()
            )));
        }
        let energy = self.config.start_energy;
        Ok(self.insert_animal(position, energy, genome))
    }

    /// Put grass on `position`; false when grass is already there
    pub fn plant_grass(&mut self, position: Position) -> Result<bool> {
        let position = self.check_position(position)?;
        if self.grass.contains_key(&position) {
            return Ok(false);
        }
        self.grass.insert(position, Grass { position });
        self.changed.insert(position);
        Ok(true)
    }

    /// Breed the two parents at `position`, returning the child's id.
    ///
    /// Parents are the first two residents in the position's ordering
    /// (lowest energy, then lowest id) and both must have at least the
    /// reproduction threshold.
    pub fn breed_at(&mut self, position: Position) -> Result<AnimalId> {
        let position = self.check_position(position)?;
        match self.parents_at(position) {
            Some(parents) => Ok(self.breed(position, parents)),
            None => {
                let threshold = self.config.reproduction_threshold();
                let found = self
                    .residents
                    .get(&position)
                    .map(|set| set.iter().filter(|r| r.energy >= threshold).count())
                    .unwrap_or(0);
                Err(Error::NotEnoughParents { position, found })
            }
        }
    }

    /// The richest animal on a cell, else its grass
    pub fn object_at(&self, position: Position) -> Result<MapObject<'_>> {
        let position = self.check_position(position)?;
        if let Some(top) = self.residents.get(&position).and_then(|set| set.last()) {
            return Ok(MapObject::Animal(&self.animals[top.id.index()]));
        }
        Ok(self
            .grass
            .get(&position)
            .map(MapObject::Grass)
            .unwrap_or(MapObject::Empty))
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn kind(&self) -> MapKind {
        self.boundary.kind()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn jungle(&self) -> &Jungle {
        &self.jungle
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(id.index())
    }

    pub fn living_animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.living.iter().map(move |id| &self.animals[id.index()])
    }

    pub fn dead_animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.dead.iter().map(move |id| &self.animals[id.index()])
    }

    /// Residents of a cell, poorest first
    pub fn animals_at(&self, position: Position) -> impl Iterator<Item = &Animal> + '_ {
        let position = self.boundary.canonicalize(position);
        self.residents
            .get(&position)
            .into_iter()
            .flatten()
            .map(move |r| &self.animals[r.id.index()])
    }

    pub fn grass_at(&self, position: Position) -> Option<&Grass> {
        self.grass.get(&self.boundary.canonicalize(position))
    }

    pub fn free_positions(&self) -> &BTreeSet<Position> {
        &self.free_positions
    }

    /// Cells touched so far during the current (or last completed) day
    pub fn changed_positions(&self) -> &BTreeSet<Position> {
        &self.changed
    }

    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    pub fn grass_count(&self) -> usize {
        self.grass.len()
    }

    pub fn average_energy(&self) -> f64 {
        average(self.living_animals().map(|a| a.energy))
    }

    /// Mean age at death; 0.0 until something has died
    pub fn average_lifespan(&self) -> f64 {
        average(self.dead_animals().map(|a| a.age))
    }

    pub fn has_dead_animals(&self) -> bool {
        !self.dead.is_empty()
    }

    pub fn average_child_count(&self) -> f64 {
        average(self.living_animals().map(|a| a.children))
    }

    /// Canonical genome carried by the most living animals. Ties go to the
    /// smallest canonical genome so the answer is stable.
    pub fn most_common_genome(&self) -> Option<Genome> {
        let mut counts: HashMap<Genome, usize> = HashMap::new();
        for animal in self.living_animals() {
            *counts.entry(animal.genome.canonical()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|(ga, ca), (gb, cb)| ca.cmp(cb).then_with(|| gb.cmp(ga)))
            .map(|(genome, _)| genome)
    }

    /// Living animals whose genome shares `genome`'s canonical form
    pub fn animals_with_genome(&self, genome: &Genome) -> Vec<&Animal> {
        let canonical = genome.canonical();
        self.living_animals()
            .filter(|a| a.genome.canonical() == canonical)
            .collect()
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            kind: self.kind(),
            day: self.day,
            living: self.living.len(),
            dead: self.dead.len(),
            grass: self.grass.len(),
            average_energy: self.average_energy(),
            average_lifespan: self.has_dead_animals().then(|| self.average_lifespan()),
            average_children: self.average_child_count(),
            dominant_genome: self.most_common_genome().map(|g| g.genes().to_vec()),
        }
    }

    fn check_position(&self, position: Position) -> Result<Position> {
        let canonical = self.boundary.canonicalize(position);
        if canonical.within(self.config.width, self.config.height) {
            Ok(canonical)
        } else {
            Err(Error::OutOfBounds {
                position,
                width: self.config.width,
                height: self.config.height,
            })
        }
    }

    fn random_position(&mut self) -> Position {
        Position::new(
            self.rng.gen_range(0..self.config.width),
            self.rng.gen_range(0..self.config.height),
        )
    }

    /// Prefer an empty cell; once none is left any cell will do
    fn add_animal_at_random(&mut self, genome: Genome) -> AnimalId {
        let free: Vec<Position> = self.free_positions.iter().copied().collect();
        let position = match place_unique(&free, &mut self.rng) {
            Some(position) => position,
            None => self.random_position(),
        };
        let energy = self.config.start_energy;
        self.insert_animal(position, energy, genome)
    }

    fn insert_animal(&mut self, position: Position, energy: i32, genome: Genome) -> AnimalId {
        let id = self.ids.next_id();
        let facing = Direction::from_index(self.rng.gen_range(0..Direction::COUNT));
        let animal = Animal::new(id, position, energy, genome, facing);
        debug_assert_eq!(id.index(), self.animals.len());

        self.occupy(position, animal.resident());
        self.animals.push(animal);
        self.living.push(id);
        self.changed.insert(position);
        id
    }

    fn occupy(&mut self, position: Position, resident: Resident) {
        self.free_positions.remove(&position);
        self.residents.entry(position).or_default().insert(resident);
    }

    fn vacate(&mut self, position: Position, resident: Resident) {
        if let Some(set) = self.residents.get_mut(&position) {
            set.remove(&resident);
            if set.is_empty() {
                self.residents.remove(&position);
                self.free_positions.insert(position);
            }
        }
    }

    /// Mutate an animal and re-key it in its cell's ordered set
    fn update_animal(&mut self, id: AnimalId, f: impl FnOnce(&mut Animal)) {
        let animal = &mut self.animals[id.index()];
        let before = animal.resident();
        f(animal);
        let after = animal.resident();
        if before != after {
            if let Some(set) = self.residents.get_mut(&animal.position) {
                set.remove(&before);
                set.insert(after);
            }
        }
    }

    /// Cells with neither an animal nor grass
    fn grass_candidates(&self) -> Vec<Position> {
        self.free_positions
            .iter()
            .copied()
            .filter(|p| !self.grass.contains_key(p))
            .collect()
    }

    /// Plant on a random candidate and drop it from the list
    fn plant_in(&mut self, candidates: &mut Vec<Position>) -> bool {
        let Some(position) = place_unique(candidates, &mut self.rng) else {
            return false;
        };
        candidates.retain(|p| *p != position);
        self.grass.insert(position, Grass { position });
        self.changed.insert(position);
        true
    }

    fn revival_due(&self) -> bool {
        let revival = &self.config.revival;
        revival.enabled
            && self.revivals_left > 0
            && self.living.len() == revival.population_threshold
    }

    fn revive(&mut self) {
        self.revivals_left -= 1;
        let genomes: Vec<Genome> = self
            .living_animals()
            .map(|a| a.genome.clone())
            .collect();

        info!(
            day = self.day,
            kind = %self.kind(),
            survivors = genomes.len(),
            revivals_left = self.revivals_left,
            "Reviving population from survivors"
        );

        for genome in genomes {
            self.add_animal_at_random(genome);
        }
    }

    fn remove_dead_animals(&mut self) -> usize {
        let mut reaped: Vec<AnimalId> = Vec::new();
        let mut touched: Vec<Position> = Vec::new();

        for (position, set) in self.residents.iter_mut() {
            // Sets are ordered poorest first, so the dead lead
            let dead: Vec<Resident> = set.iter().take_while(|r| r.energy <= 0).copied().collect();
            if dead.is_empty() {
                continue;
            }
            for resident in dead {
                set.remove(&resident);
                reaped.push(resident.id);
            }
            touched.push(*position);
        }

        for position in touched {
            self.changed.insert(position);
            if self.residents.get(&position).is_some_and(|set| set.is_empty()) {
                self.residents.remove(&position);
                self.free_positions.insert(position);
            }
        }

        if reaped.is_empty() {
            return 0;
        }

        let reaped_set: HashSet<AnimalId> = reaped.iter().copied().collect();
        self.living.retain(|id| !reaped_set.contains(id));
        for id in &reaped {
            let animal = &self.animals[id.index()];
            trace!(
                animal = %id,
                age = animal.age,
                children = animal.children,
                x = animal.position.x,
                y = animal.position.y,
                "Animal died"
            );
        }
        debug_assert!(reaped.iter().all(|id| !self.dead.contains(id)));
        self.dead.extend(reaped.iter().copied());
        reaped.len()
    }

    fn move_animals(&mut self) {
        let move_energy = self.config.move_energy;
        let positions: Vec<Position> = self.residents.keys().copied().collect();

        for position in positions {
            let Some(set) = self.residents.remove(&position) else {
                continue;
            };
            let mut rebuilt = BTreeSet::new();
            for resident in set {
                let animal = &mut self.animals[resident.id.index()];
                if let Some(from) = animal.step(move_energy, &self.boundary) {
                    self.pending_moves.push(PendingMove {
                        id: resident.id,
                        from,
                    });
                }
                rebuilt.insert(animal.resident());
            }
            self.residents.insert(position, rebuilt);
            self.changed.insert(position);
        }

        // Relocate only after every animal has picked its step
        let mut pending = std::mem::take(&mut self.pending_moves);
        for step in pending.drain(..) {
            self.relocate(step);
        }
        self.pending_moves = pending;
    }

    fn relocate(&mut self, step: PendingMove) {
        let animal = &self.animals[step.id.index()];
        let resident = animal.resident();
        let to = animal.position;
        if to == step.from {
            return;
        }
        self.vacate(step.from, resident);
        self.occupy(to, resident);
        self.changed.insert(to);
    }

    fn feed_animals(&mut self) -> usize {
        let plant_energy = self.config.plant_energy;
        let grass_positions: Vec<Position> = self.grass.keys().copied().collect();
        let mut meals = 0;

        for position in grass_positions {
            let Some(set) = self.residents.get(&position) else {
                continue;
            };
            let Some(top) = set.last().copied() else {
                continue;
            };
            let eaters: Vec<AnimalId> = set
                .iter()
                .rev()
                .take_while(|r| r.energy == top.energy)
                .map(|r| r.id)
                .collect();

            // Integer split; the remainder is lost
            let share = plant_energy / eaters.len() as i32;
            for id in eaters {
                self.update_animal(id, |animal| animal.add_energy(share));
            }

            self.grass.remove(&position);
            self.changed.insert(position);
            meals += 1;
        }

        meals
    }

    fn parents_at(&self, position: Position) -> Option<(AnimalId, AnimalId)> {
        let threshold = self.config.reproduction_threshold();
        let mut residents = self.residents.get(&position)?.iter();
        let first = residents.next()?;
        let second = residents.next()?;
        (first.energy >= threshold && second.energy >= threshold).then_some((first.id, second.id))
    }

    fn reproduce_animals(&mut self) -> usize {
        let crowded: Vec<Position> = self
            .residents
            .iter()
            .filter(|(_, set)| set.len() >= 2)
            .map(|(position, _)| *position)
            .collect();

        let mut births = 0;
        for position in crowded {
            if let Some(parents) = self.parents_at(position) {
                self.breed(position, parents);
                births += 1;
            }
        }
        births
    }

    fn breed(&mut self, position: Position, (a, b): (AnimalId, AnimalId)) -> AnimalId {
        let child_id = self.ids.next_id();
        let before = [self.animals[a.index()].resident(), self.animals[b.index()].resident()];

        let (first, second) = pair_mut(&mut self.animals, a.index(), b.index());
        let child = self
            .reproduction
            .create_child(first, second, child_id, &mut self.rng);
        let after = [first.resident(), second.resident()];

        if let Some(set) = self.residents.get_mut(&position) {
            for resident in before {
                set.remove(&resident);
            }
            set.extend(after);
        }

        trace!(
            child = %child_id,
            first_parent = %a,
            second_parent = %b,
            energy = child.energy,
            x = position.x,
            y = position.y,
            "Animal born"
        );

        debug_assert_eq!(child_id.index(), self.animals.len());
        self.occupy(position, child.resident());
        self.animals.push(child);
        self.living.push(child_id);
        self.changed.insert(position);
        child_id
    }

    fn grow_grass(&mut self) -> usize {
        let (mut fertile, mut steppe): (Vec<Position>, Vec<Position>) = self
            .grass_candidates()
            .into_iter()
            .partition(|p| self.jungle.contains(*p));

        let mut sprouted = 0;
        for _ in 0..self.config.daily_grass_per_region {
            if self.plant_in(&mut fertile) {
                sprouted += 1;
            }
        }
        for _ in 0..self.config.daily_grass_per_region {
            if self.plant_in(&mut steppe) {
                sprouted += 1;
            }
        }
        sprouted
    }

    /// Bookkeeping invariants between phases
    fn invariants_hold(&self) -> bool {
        let living: HashSet<AnimalId> = self.living.iter().copied().collect();
        let dead: HashSet<AnimalId> = self.dead.iter().copied().collect();

        let partitioned = living.len() == self.living.len()
            && dead.len() == self.dead.len()
            && living.is_disjoint(&dead)
            && (living.len() + dead.len()) as u64 == self.ids.issued();

        let complementary = self.free_positions.len() + self.residents.len() == self.config.area()
            && self.residents.values().all(|set| !set.is_empty())
            && self
                .residents
                .keys()
                .all(|p| !self.free_positions.contains(p));

        let in_sync = self.residents.iter().all(|(position, set)| {
            set.iter().all(|r| {
                let animal = &self.animals[r.id.index()];
                animal.position == *position && animal.resident() == *r && living.contains(&r.id)
            })
        }) && self.residents.values().map(BTreeSet::len).sum::<usize>() == self.living.len();

        partitioned && complementary && in_sync
    }
}

/// Two distinct mutable borrows into the arena
fn pair_mut(animals: &mut [Animal], a: usize, b: usize) -> (&mut Animal, &mut Animal) {
    assert_ne!(a, b, "an animal cannot breed with itself");
    if a < b {
        let (left, right) = animals.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = animals.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
