//! A set of 1 to 15 bets with optional bet amounts

use serde::{Deserialize, Serialize};

use crate::core::bits::{mask_of, picked_arenas, to_mask, to_selections, Selections, ARENA_COUNT, BIT_MASKS};
use crate::core::combinations::{CombinationEntry, CombinationTable};
use crate::core::distribution::Distribution;
use crate::core::hash::{decode_amounts, decode_bets, encode_amounts, pack_bets};
use crate::core::stakes::{capped_winnings, clamp_stake};
use crate::error::{validate_bet_count, validate_winners, FoodClubError, Result};

/// Winning pirate (1-4) of each arena
pub type Winners = [u8; ARENA_COUNT];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bets {
    masks: Vec<u32>,
    amounts: Option<Vec<Option<u32>>>,
}

impl Bets {
    /// Build from bet binaries, keeping the first of any duplicates
    pub fn from_masks(masks: &[u32]) -> Result<Self> {
        let mut unique: Vec<u32> = Vec::with_capacity(masks.len());
        for &mask in masks {
            to_selections(mask)?;
            if mask == 0 {
                return Err(FoodClubError::InvalidShape(
                    "Bet binary must pick at least one pirate".to_string(),
                ));
            }
            if !unique.contains(&mask) {
                unique.push(mask);
            }
        }

        validate_bet_count(unique.len())?;

        Ok(Self {
            masks: unique,
            amounts: None,
        })
    }

    pub fn from_selections(selections: &[Selections]) -> Result<Self> {
        let mut masks = Vec::with_capacity(selections.len());
        for bet in selections {
            masks.push(to_mask(*bet)?);
        }
        Self::from_masks(&masks)
    }

    /// Decode a bets hash, with an optional amounts hash
    pub fn from_hash(bets_hash: &str, amounts_hash: Option<&str>) -> Result<Self> {
        let mut bets = Self::from_selections(&decode_bets(bets_hash)?)?;
        if let Some(hash) = amounts_hash {
            bets.set_amounts(&decode_amounts(hash)?)?;
        }
        Ok(bets)
    }

    /// Attach one amount per bet. Amounts are clamped to the game's limits.
    pub fn set_amounts(&mut self, amounts: &[Option<u32>]) -> Result<()> {
        if amounts.len() != self.masks.len() {
            return Err(FoodClubError::AmountCountMismatch {
                expected: self.masks.len(),
                actual: amounts.len(),
            });
        }
        self.amounts = Some(amounts.iter().map(|a| a.map(clamp_stake)).collect());
        Ok(())
    }

    pub fn with_amounts(mut self, amounts: &[Option<u32>]) -> Result<Self> {
        self.set_amounts(amounts)?;
        Ok(self)
    }

    pub fn clear_amounts(&mut self) {
        self.amounts = None;
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn masks(&self) -> &[u32] {
        &self.masks
    }

    pub fn selections(&self) -> Vec<Selections> {
        self.masks
            .iter()
            .filter_map(|&mask| to_selections(mask).ok())
            .collect()
    }

    pub fn amounts(&self) -> Option<&[Option<u32>]> {
        self.amounts.as_deref()
    }

    /// Amounts, but only when every bet has one
    fn full_amounts(&self) -> Option<Vec<u32>> {
        self.amounts.as_ref()?.iter().copied().collect()
    }

    pub fn bets_hash(&self) -> String {
        pack_bets(&self.selections())
    }

    /// Empty when no amounts are attached
    pub fn amounts_hash(&self) -> String {
        self.amounts
            .as_deref()
            .map(encode_amounts)
            .unwrap_or_default()
    }

    fn entries<'a>(&'a self, table: &'a CombinationTable) -> impl Iterator<Item = &'a CombinationEntry> + 'a {
        self.masks
            .iter()
            .filter_map(move |&mask| table.entry_for_mask(mask))
    }

    pub fn odds_values(&self, table: &CombinationTable) -> Vec<u32> {
        self.entries(table).map(|entry| entry.odds).collect()
    }

    /// Total expected ratio
    pub fn expected_ratio(&self, table: &CombinationTable) -> f64 {
        self.entries(table).map(|entry| entry.expected_ratio).sum()
    }

    /// Total expected profit in NP over bets with an amount
    ///
    /// Bets without an amount are skipped, so a partly filled set still
    /// reports the profit of the bets that are staked. Zero when no amounts
    /// are attached.
    pub fn net_expected(&self, table: &CombinationTable) -> f64 {
        let Some(amounts) = &self.amounts else {
            return 0.0;
        };

        self.entries(table)
            .zip(amounts)
            .filter_map(|(entry, amount)| amount.map(|a| (entry, a as f64)))
            .map(|(entry, amount)| amount * entry.expected_ratio - amount)
            .sum()
    }

    /// Payout distribution in units, each bet paying its odds
    pub fn distribution(&self, table: &CombinationTable) -> Distribution {
        let weighted: Vec<(u32, u64)> = self
            .entries(table)
            .map(|entry| (entry.mask, entry.odds as u64))
            .collect();
        Distribution::new(&weighted, table.probabilities())
    }

    /// True when no outcome loses every bet
    pub fn is_bustproof(&self, table: &CombinationTable) -> bool {
        self.distribution(table).bust().is_none()
    }

    /// Bustproof, and the smallest possible payout beats the largest amount
    pub fn is_guaranteed_win(&self, table: &CombinationTable) -> bool {
        let Some(amounts) = self.full_amounts() else {
            return false;
        };
        let Some(&highest) = amounts.iter().max() else {
            return false;
        };

        let lowest_win = self
            .odds_values(table)
            .iter()
            .zip(&amounts)
            .map(|(&odds, &amount)| odds as u64 * amount as u64)
            .min()
            .unwrap_or(0);

        (highest as u64) < lowest_win && self.is_bustproof(table)
    }

    /// Every bet is a subset of one five-pirate bet
    pub fn is_gambit(&self) -> bool {
        if self.masks.len() < 2 {
            return false;
        }
        let Some(&highest) = self.masks.iter().max() else {
            return false;
        };
        highest.count_ones() == 5 && self.masks.iter().all(|&mask| mask & highest == mask)
    }

    /// Every bet picks a pirate in every arena
    pub fn is_crazy(&self) -> bool {
        self.masks
            .iter()
            .all(|&mask| BIT_MASKS.iter().all(|bit_mask| mask & bit_mask != 0))
    }

    /// Number of bets that fill all five arenas
    pub fn full_bet_count(&self) -> usize {
        self.masks
            .iter()
            .filter(|&&mask| picked_arenas(mask) == ARENA_COUNT)
            .count()
    }

    fn winning_entries<'a>(
        &'a self,
        table: &'a CombinationTable,
        winners: &Winners,
    ) -> Result<impl Iterator<Item = (usize, &'a CombinationEntry)> + 'a> {
        validate_winners(winners)?;
        let winners_mask = mask_of(*winners);
        Ok(self
            .entries(table)
            .enumerate()
            .filter(move |(_, entry)| entry.mask & winners_mask == entry.mask))
    }

    /// Units won: the sum of the odds of every winning bet
    ///
    /// Fails unless every arena has a winning pirate 1-4.
    pub fn win_units(&self, table: &CombinationTable, winners: &Winners) -> Result<u32> {
        Ok(self
            .winning_entries(table, winners)?
            .map(|(_, entry)| entry.odds)
            .sum())
    }

    /// NP won, each bet capped at the game's payout limit
    ///
    /// Zero unless every bet has an amount.
    pub fn win_np(&self, table: &CombinationTable, winners: &Winners) -> Result<u64> {
        let winning = self.winning_entries(table, winners)?;
        let Some(amounts) = self.full_amounts() else {
            return Ok(0);
        };

        Ok(winning
            .map(|(i, entry)| capped_winnings(amounts[i], entry.odds))
            .sum())
    }
}
