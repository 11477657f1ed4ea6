use serde::{Deserialize, Serialize};

use crate::arenas::Arena;
use crate::bets::{Bets, Winners};
use crate::core::bits::{Selections, ARENA_COUNT};
use crate::core::combinations::CombinationTable;
use crate::core::distribution::Chance;
use crate::core::probability::{make_probabilities, OddsMatrix, Probabilities};
use crate::core::stakes::{StakeCalculator, StakeSizing};
use crate::error::Result;

/// Round data as published by the Food Club data feeds
///
/// Odds rows use the 5-column layout with a leading placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// Pirate ids (1-20) per arena
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pirates: Option<Vec<Vec<u8>>>,
    pub opening_odds: OddsMatrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_odds: Option<OddsMatrix>,
    /// Winning pirate per arena; all zeroes until the round ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<u8>>,
}

impl RoundData {
    /// Payout odds; the opening odds until they change
    pub fn current(&self) -> &OddsMatrix {
        self.current_odds.as_ref().unwrap_or(&self.opening_odds)
    }

    pub fn probabilities(&self) -> Probabilities {
        make_probabilities(&self.opening_odds)
    }

    /// Probabilities from the opening odds, payouts from the current odds
    pub fn build_table(&self) -> CombinationTable {
        CombinationTable::build(&self.probabilities(), self.current())
    }

    /// Winners, once every arena has one
    pub fn winners(&self) -> Option<Winners> {
        let winners = self.winners.as_ref()?;
        if winners.len() != ARENA_COUNT || winners.iter().any(|&w| !(1..=4).contains(&w)) {
            return None;
        }
        let mut result = [0u8; ARENA_COUNT];
        result.copy_from_slice(winners);
        Some(result)
    }
}

/// Arena summary row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaReport {
    pub id: usize,
    pub name: String,
    pub odds: f64,
    pub ratio: f64,
    pub is_positive: bool,
    /// Pirate indices from lowest to highest odds
    pub best: Vec<u8>,
}

impl From<&Arena> for ArenaReport {
    fn from(arena: &Arena) -> Self {
        Self {
            id: arena.id,
            name: arena.name().to_string(),
            odds: arena.odds,
            ratio: arena.ratio(),
            is_positive: arena.is_positive(),
            best: arena.best().iter().map(|p| p.index).collect(),
        }
    }
}

/// One bet of a set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetReport {
    pub mask: u32,
    pub selections: Selections,
    pub odds: u32,
    pub probability: f64,
    pub expected_ratio: f64,
    pub max_stake: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    /// Stake and payout for the bet's amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizing: Option<StakeSizing>,
}

/// Result of a finished round for a bet set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinReport {
    pub winners: Winners,
    pub units: u32,
    pub np: u64,
}

/// Everything known about a bet set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetsReport {
    pub bets_hash: String,
    pub amounts_hash: String,
    pub expected_ratio: f64,
    pub net_expected: f64,
    pub bust_probability: f64,
    pub best_payout: u64,
    pub most_likely_winner: Option<Chance>,
    pub partial_rate: f64,
    pub is_bustproof: bool,
    pub is_guaranteed_win: bool,
    pub is_gambit: bool,
    pub is_crazy: bool,
    pub bets: Vec<BetReport>,
    pub chances: Vec<Chance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WinReport>,
}

impl BetsReport {
    /// Fails when the winners aren't a pirate 1-4 in every arena
    pub fn new(bets: &Bets, table: &CombinationTable, winners: Option<Winners>) -> Result<Self> {
        let distribution = bets.distribution(table);
        let amounts = bets.amounts();

        let rows = bets
            .masks()
            .iter()
            .enumerate()
            .filter_map(|(i, &mask)| {
                let entry = table.entry_for_mask(mask)?;
                let amount = amounts.and_then(|a| a[i]);
                Some(BetReport {
                    mask,
                    selections: entry.selections,
                    odds: entry.odds,
                    probability: entry.probability,
                    expected_ratio: entry.expected_ratio,
                    max_stake: entry.max_stake,
                    amount,
                    sizing: amount.map(|a| StakeCalculator::new(a).calculate_single(entry)),
                })
            })
            .collect();

        let result = match winners {
            Some(winners) => Some(WinReport {
                winners,
                units: bets.win_units(table, &winners)?,
                np: bets.win_np(table, &winners)?,
            }),
            None => None,
        };

        Ok(Self {
            bets_hash: bets.bets_hash(),
            amounts_hash: bets.amounts_hash(),
            expected_ratio: bets.expected_ratio(table),
            net_expected: bets.net_expected(table),
            bust_probability: distribution.bust().map_or(0.0, |c| c.probability),
            best_payout: distribution.best().map_or(0, |c| c.value),
            most_likely_winner: distribution.most_likely_winner().copied(),
            partial_rate: distribution.partial_rate(),
            is_bustproof: distribution.bust().is_none(),
            is_guaranteed_win: bets.is_guaranteed_win(table),
            is_gambit: bets.is_gambit(),
            is_crazy: bets.is_crazy(),
            bets: rows,
            chances: distribution.chances().to_vec(),
            result,
        })
    }
}
