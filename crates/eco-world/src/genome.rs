//! Move genomes and their canonical form.

use eco_core::{Direction, Error, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of move genes. Each gene is a clockwise turn in
/// eighths of a circle, so the alphabet matches [`Direction::COUNT`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<u8>,
}

impl Genome {
    pub fn new(genes: Vec<u8>) -> Result<Self> {
        if genes.is_empty() {
            return Err(Error::InvalidGenome("a genome needs at least one gene".to_string()));
        }
        if let Some(&bad) = genes.iter().find(|&&g| g >= Direction::COUNT) {
            return Err(Error::InvalidGene(bad));
        }
        Ok(Self { genes })
    }

    pub fn random(length: usize, rng: &mut ChaCha8Rng) -> Self {
        let genes = (0..length)
            .map(|_| rng.gen_range(0..Direction::COUNT))
            .collect();
        Self { genes }
    }

    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Gene at `cursor`, wrapping around the end of the sequence
    pub fn gene_at(&self, cursor: usize) -> u8 {
        self.genes[cursor % self.genes.len()]
    }

    /// Order-insensitive form used to group similar genomes. Any rotation
    /// or reordering of the same genes yields the same canonical genome.
    pub fn canonical(&self) -> Genome {
        let mut genes = self.genes.clone();
        genes.sort_unstable();
        Genome { genes }
    }

    /// Splice two genomes: `left` contributes its first `split` genes and
    /// `right` the remainder.
    pub fn splice(left: &Genome, right: &Genome, split: usize) -> Genome {
        debug_assert_eq!(left.len(), right.len());
        let split = split.min(left.len());
        let genes = left.genes[..split]
            .iter()
            .chain(&right.genes[split..])
            .copied()
            .collect();
        Genome { genes }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.genes {
            write!(f, "{}", gene)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_out_of_alphabet_genes() {
        assert!(Genome::new(vec![0, 7, 3]).is_ok());
        assert!(matches!(Genome::new(vec![1, 8]), Err(Error::InvalidGene(8))));
        assert!(matches!(Genome::new(Vec::new()), Err(Error::InvalidGenome(_))));
    }

    #[test]
    fn test_random_genome() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let genome = Genome::random(32, &mut rng);
        assert_eq!(genome.len(), 32);
        assert!(genome.genes().iter().all(|&g| g < Direction::COUNT));
    }

    #[test]
    fn test_rotations_share_canonical_form() {
        let genome = Genome::new(vec![0, 1, 2, 7, 7, 3]).unwrap();
        let mut rotated = genome.genes().to_vec();
        rotated.rotate_left(2);
        let rotated = Genome::new(rotated).unwrap();

        assert_ne!(genome, rotated);
        assert_eq!(genome.canonical(), rotated.canonical());
        assert_eq!(genome.canonical().genes(), &[0, 1, 2, 3, 7, 7]);
        // canonical() leaves the original untouched
        assert_eq!(genome.genes(), &[0, 1, 2, 7, 7, 3]);
    }

    #[test]
    fn test_gene_cursor_wraps() {
        let genome = Genome::new(vec![4, 5, 6]).unwrap();
        assert_eq!(genome.gene_at(0), 4);
        assert_eq!(genome.gene_at(3), 4);
        assert_eq!(genome.gene_at(5), 6);
    }

    #[test]
    fn test_splice() {
        let a = Genome::new(vec![1, 1, 1, 1]).unwrap();
        let b = Genome::new(vec![2, 2, 2, 2]).unwrap();
        assert_eq!(Genome::splice(&a, &b, 3).genes(), &[1, 1, 1, 2]);
        assert_eq!(Genome::splice(&b, &a, 0).genes(), &[1, 1, 1, 1]);
        assert_eq!(Genome::splice(&a, &b, 9).genes(), &[1, 1, 1, 1]);
        assert_eq!(a.to_string(), "1111");
    }
}
