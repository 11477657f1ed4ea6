//! Precomputed table of every possible bet
//!
//! One row per non-empty bet (3124 in total), in the enumeration order of
//! [`all_valid_masks`](super::bits::all_valid_masks). The table is built once
//! per odds snapshot and only read afterwards, so it can be shared freely
//! between threads.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bits::{all_valid_masks, combination_index, to_selections, Selections, COMBINATION_COUNT};
use super::probability::{OddsMatrix, Probabilities};

/// Payout cap per bet in neopoints
pub const MAX_PAYOUT: u64 = 1_000_000;

/// A single bet's precomputed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationEntry {
    pub mask: u32,
    pub selections: Selections,
    /// Product of the picked pirates' probabilities
    pub probability: f64,
    /// Product of the picked pirates' odds
    pub odds: u32,
    pub expected_ratio: f64,
    /// Smallest bet amount that reaches the payout cap
    pub max_stake: u32,
}

impl CombinationEntry {
    fn new(mask: u32, selections: Selections, probs: &Probabilities, odds: &OddsMatrix) -> Self {
        let mut probability = 1.0f64;
        let mut odds_product = 1u32;
        for (arena, &pirate) in selections.iter().enumerate() {
            if pirate == 0 {
                continue;
            }
            probability *= probs.get(arena, pirate as usize);
            odds_product *= odds.get(arena, pirate as usize) as u32;
        }

        Self {
            mask,
            selections,
            probability,
            odds: odds_product,
            expected_ratio: probability * odds_product as f64,
            max_stake: MAX_PAYOUT.div_ceil(odds_product as u64) as u32,
        }
    }
}

/// All 3124 bets for one odds snapshot
#[derive(Debug, Clone)]
pub struct CombinationTable {
    entries: Vec<CombinationEntry>,
    probabilities: Probabilities,
    odds: OddsMatrix,
}

impl CombinationTable {
    /// Build the table
    ///
    /// `probabilities` usually come from the opening odds, while `odds` are
    /// the current (payout) odds.
    pub fn build(probabilities: &Probabilities, odds: &OddsMatrix) -> Self {
        let mut entries = Vec::with_capacity(COMBINATION_COUNT);

        for mask in all_valid_masks() {
            // masks from the enumeration always decode
            if let Ok(selections) = to_selections(mask) {
                entries.push(CombinationEntry::new(mask, selections, probabilities, odds));
            }
        }

        debug!("Built combination table with {} entries", entries.len());

        Self {
            entries,
            probabilities: *probabilities,
            odds: *odds,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CombinationEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CombinationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CombinationEntry> {
        self.entries.iter()
    }

    /// Row index of a bet binary
    pub fn index_of_mask(&self, mask: u32) -> Option<usize> {
        let selections = to_selections(mask).ok()?;
        combination_index(selections)
    }

    pub fn entry_for_mask(&self, mask: u32) -> Option<&CombinationEntry> {
        self.index_of_mask(mask).and_then(|index| self.get(index))
    }

    pub fn probabilities(&self) -> &Probabilities {
        &self.probabilities
    }

    pub fn odds(&self) -> &OddsMatrix {
        &self.odds
    }
}

impl<'a> IntoIterator for &'a CombinationTable {
    type Item = &'a CombinationEntry;
    type IntoIter = std::slice::Iter<'a, CombinationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
