//! Arena-level view of a round's odds
//!
//! An arena's odds are the sum of `1 / m` over its four pirates. Below 1 the
//! arena is "positive": betting every pirate proportionally would pay back
//! more than it costs.

use serde::{Deserialize, Serialize};

use crate::core::bits::{pirate_bit, ARENA_COUNT, PIRATES_PER_ARENA};
use crate::core::probability::OddsMatrix;

pub const ARENA_NAMES: [&str; ARENA_COUNT] = ["Shipwreck", "Lagoon", "Treasure", "Hidden", "Harpoon"];

/// A pirate slot within an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pirate {
    pub arena: usize,
    /// 1-4 within the arena
    pub index: u8,
    pub odds: u8,
}

impl Pirate {
    /// Bet binary picking only this pirate
    pub fn binary(&self) -> u32 {
        pirate_bit(self.index, self.arena)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub id: usize,
    pub pirates: [Pirate; PIRATES_PER_ARENA],
    pub odds: f64,
}

impl Arena {
    pub fn new(id: usize, pirate_odds: [u8; PIRATES_PER_ARENA]) -> Self {
        let pirates = std::array::from_fn(|p| Pirate {
            arena: id,
            index: p as u8 + 1,
            odds: pirate_odds[p],
        });
        let odds = pirate_odds.iter().map(|&m| 1.0 / m as f64).sum();

        Self { id, pirates, odds }
    }

    pub fn name(&self) -> &'static str {
        ARENA_NAMES[self.id]
    }

    pub fn ratio(&self) -> f64 {
        1.0 / self.odds - 1.0
    }

    pub fn is_positive(&self) -> bool {
        self.ratio() > 0.0
    }

    /// Pirates from lowest to highest odds; ties keep arena order
    pub fn best(&self) -> Vec<Pirate> {
        let mut pirates = self.pirates.to_vec();
        pirates.sort_by_key(|p| p.odds);
        pirates
    }
}

/// All five arenas of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arenas(Vec<Arena>);

impl Arenas {
    pub fn new(odds: &OddsMatrix) -> Self {
        Self(
            odds.rows()
                .iter()
                .enumerate()
                .map(|(id, row)| Arena::new(id, *row))
                .collect(),
        )
    }

    pub fn get(&self, id: usize) -> Option<&Arena> {
        self.0.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arena> {
        self.0.iter()
    }

    /// Arenas from lowest to highest odds
    pub fn best(&self) -> Vec<&Arena> {
        let mut arenas: Vec<&Arena> = self.0.iter().collect();
        arenas.sort_by(|a, b| a.odds.total_cmp(&b.odds));
        arenas
    }

    /// Positive arenas from lowest to highest odds
    pub fn positives(&self) -> Vec<&Arena> {
        self.best()
            .into_iter()
            .filter(|arena| arena.is_positive())
            .collect()
    }

    /// Pirates picked by a bet binary, in arena order
    pub fn pirates_from_binary(&self, mask: u32) -> Vec<Pirate> {
        self.0
            .iter()
            .flat_map(|arena| arena.pirates.iter())
            .filter(|pirate| mask & pirate.binary() != 0)
            .copied()
            .collect()
    }
}
