//! Population statistics reported after each day.

use crate::types::MapKind;
use serde::{Deserialize, Serialize};

/// Snapshot of a world's population, taken between days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub kind: MapKind,
    pub day: u64,
    pub living: usize,
    pub dead: usize,
    pub grass: usize,
    pub average_energy: f64,
    /// Average age at death; `None` until something has died
    pub average_lifespan: Option<f64>,
    pub average_children: f64,
    /// Canonical genome shared by the most animals
    pub dominant_genome: Option<Vec<u8>>,
}

impl WorldStats {
    pub fn is_extinct(&self) -> bool {
        self.living == 0
    }
}

/// Mean of an iterator of integral values, 0.0 when empty
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v.into(), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average() {
        assert_eq!(average(Vec::<i32>::new()), 0.0);
        assert_eq!(average(vec![1i32, 2, 3, 4]), 2.5);
        assert_eq!(average([10u32, 20]), 15.0);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = WorldStats {
            kind: MapKind::Bordered,
            day: 3,
            living: 2,
            dead: 1,
            grass: 4,
            average_energy: 55.5,
            average_lifespan: Some(2.0),
            average_children: 0.5,
            dominant_genome: Some(vec![0, 1, 1, 7]),
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: WorldStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, back);
        assert!(!back.is_extinct());
    }
}
