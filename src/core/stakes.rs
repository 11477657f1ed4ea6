//! Bet amount sizing
//!
//! Food Club pays at most 1,000,000 NP per bet, so staking more than
//! `ceil(1_000_000 / odds)` on a bet only adds risk. Given a player's bet
//! amount:
//!
//! ```text
//! capped = min(max_stake, bet_amount)
//! net expected = capped * expected_ratio - capped
//! ```
//!
//! Bustproof sets spread the amount so every bet pays back about the same:
//!
//! ```text
//! stake = bet_amount * min_odds / odds
//! ```

use serde::{Deserialize, Serialize};

use super::combinations::{CombinationEntry, MAX_PAYOUT};

/// Smallest bet amount the game accepts
pub const BET_AMOUNT_MIN: u32 = 50;
/// Largest bet amount the game accepts
pub const BET_AMOUNT_MAX: u32 = 70_304;

/// Clamp an amount into the game's bet limits
pub fn clamp_stake(amount: u32) -> u32 {
    amount.clamp(BET_AMOUNT_MIN, BET_AMOUNT_MAX)
}

/// Payout for a winning bet, capped at the game maximum
pub fn capped_winnings(stake: u32, odds: u32) -> u64 {
    (stake as u64 * odds as u64).min(MAX_PAYOUT)
}

/// Stake recommendation for a single bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeSizing {
    pub mask: u32,
    pub odds: u32,
    pub expected_ratio: f64,
    pub max_stake: u32,
    pub stake: u32,
    pub net_expected: f64,
    pub potential_winnings: u64,
}

/// Sizes bets against a player's bet amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeCalculator {
    pub bet_amount: u32,
}

impl StakeCalculator {
    pub fn new(bet_amount: u32) -> Self {
        Self { bet_amount }
    }

    fn capped(&self, entry: &CombinationEntry) -> u32 {
        entry.max_stake.min(self.bet_amount)
    }

    /// Amount to place on a bet: never more than needed to hit the payout cap
    pub fn capped_stake(&self, entry: &CombinationEntry) -> u32 {
        clamp_stake(self.capped(entry))
    }

    /// Expected profit in NP of the capped stake
    pub fn net_expected(&self, entry: &CombinationEntry) -> f64 {
        let capped = self.capped(entry) as f64;
        capped * entry.expected_ratio - capped
    }

    /// Stakes that make each bet of a bustproof set pay out evenly
    pub fn bustproof_stakes(&self, odds: &[u32]) -> Vec<u32> {
        let Some(&min_odds) = odds.iter().min() else {
            return Vec::new();
        };

        odds.iter()
            .map(|&o| (self.bet_amount as u64 * min_odds as u64 / o as u64) as u32)
            .collect()
    }

    /// Full sizing breakdown for a single bet
    pub fn calculate_single(&self, entry: &CombinationEntry) -> StakeSizing {
        let stake = self.capped_stake(entry);

        StakeSizing {
            mask: entry.mask,
            odds: entry.odds,
            expected_ratio: entry.expected_ratio,
            max_stake: entry.max_stake,
            stake,
            net_expected: self.net_expected(entry),
            potential_winnings: capped_winnings(stake, entry.odds),
        }
    }

    pub fn calculate_multiple(&self, entries: &[&CombinationEntry]) -> Vec<StakeSizing> {
        entries
            .iter()
            .map(|entry| self.calculate_single(entry))
            .collect()
    }
}
