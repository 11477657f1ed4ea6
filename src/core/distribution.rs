//! Payout distribution of a bet set
//!
//! Every race outcome is one winner per arena, so the outcome space is the
//! 4^5 = 1024 full masks. Instead of walking all of them, the space is split
//! into "classes": reachable masks (one or more pirates in every arena) whose
//! outcomes all pay the same. Each bet's acceptance mask cuts the classes it
//! overlaps into a paying part and up to five non-paying remainders.
//!
//! A class's probability is the product over arenas of the summed
//! probabilities of the pirates it contains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bits::{acceptance_mask, is_reachable, BIT_MASKS, FULL_MASK, PIRATE_MASKS};
use super::probability::Probabilities;
use crate::error::MAX_BETS;

/// One point of a payout distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chance {
    /// Payout in the unit of the bet weights
    pub value: u64,
    pub probability: f64,
    /// Probability of a payout <= value
    pub cumulative: f64,
    /// Probability of a payout >= value
    pub tail: f64,
}

/// Partition the outcome space by payout
///
/// Takes `(bet binary, weight)` pairs and returns class mask -> total weight.
/// Bets with the same acceptance mask are merged before splitting.
pub fn refine(bets: &[(u32, u64)]) -> BTreeMap<u32, u64> {
    let mut accepted: BTreeMap<u32, u64> = BTreeMap::new();
    for &(mask, weight) in bets {
        *accepted.entry(acceptance_mask(mask)).or_default() += weight;
    }

    let mut classes = BTreeMap::from([(FULL_MASK, 0u64)]);

    for (&accept, &weight) in &accepted {
        let keys: Vec<u32> = classes.keys().copied().collect();
        for key in keys {
            let common = accept & key;
            if !is_reachable(common) {
                continue;
            }

            let Some(value) = classes.remove(&key) else {
                continue;
            };
            classes.insert(common, value + weight);

            // peel off what's left of the class one arena at a time
            let mut rest = key;
            for &bit_mask in &BIT_MASKS {
                let piece = rest ^ (common & bit_mask);
                if !is_reachable(piece) {
                    continue;
                }
                classes.insert(piece, value);
                rest = (rest & !bit_mask) | (common & bit_mask);
            }
        }
    }

    debug!(
        "Refined {} bets into {} classes",
        bets.len(),
        classes.len()
    );

    classes
}

/// Probability that the winning outcome falls inside a class mask
pub fn class_probability(mask: u32, probabilities: &Probabilities) -> f64 {
    BIT_MASKS
        .iter()
        .enumerate()
        .map(|(arena, &bit_mask)| {
            PIRATE_MASKS
                .iter()
                .enumerate()
                .filter(|&(_, &pirate_mask)| bit_mask & pirate_mask & mask != 0)
                .map(|(pirate, _)| probabilities.get(arena, pirate + 1))
                .sum::<f64>()
        })
        .product()
}

/// Payout distribution for weighted bets, sorted by value
///
/// With no bets the whole probability mass is a single bust point.
pub fn compute_distribution(bets: &[(u32, u64)], probabilities: &Probabilities) -> Vec<Chance> {
    if bets.is_empty() {
        return vec![Chance {
            value: 0,
            probability: 1.0,
            cumulative: 1.0,
            tail: 1.0,
        }];
    }

    let mut by_value: BTreeMap<u64, f64> = BTreeMap::new();
    for (mask, value) in refine(bets) {
        *by_value.entry(value).or_default() += class_probability(mask, probabilities);
    }

    let mut chances = Vec::with_capacity(by_value.len());
    let mut cumulative = 0.0;
    let mut tail = 1.0;
    for (value, probability) in by_value {
        cumulative += probability;
        chances.push(Chance {
            value,
            probability,
            cumulative,
            tail,
        });
        tail -= probability;
    }

    chances
}

/// Distribution of a bet set along with the summary metrics built on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    chances: Vec<Chance>,
    bet_count: usize,
}

impl Distribution {
    pub fn new(bets: &[(u32, u64)], probabilities: &Probabilities) -> Self {
        Self {
            chances: compute_distribution(bets, probabilities),
            bet_count: bets.len(),
        }
    }

    pub fn chances(&self) -> &[Chance] {
        &self.chances
    }

    /// Chance of winning nothing, if any outcome does
    pub fn bust(&self) -> Option<&Chance> {
        self.chances.first().filter(|chance| chance.value == 0)
    }

    /// Highest possible payout
    pub fn best(&self) -> Option<&Chance> {
        self.chances.last()
    }

    /// Most probable non-zero payout
    pub fn most_likely_winner(&self) -> Option<&Chance> {
        self.chances
            .iter()
            .filter(|chance| chance.value > 0)
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }

    /// Probability of winning something, but less than one unit per bet
    pub fn partial_rate(&self) -> f64 {
        let threshold = self.bet_count.min(MAX_BETS) as u64;
        self.chances
            .iter()
            .filter(|chance| chance.value > 0 && chance.value < threshold)
            .map(|chance| chance.probability)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probability::{make_probabilities, OddsMatrix};

    fn scenario_probabilities() -> Probabilities {
        let odds = OddsMatrix::new([
            [2, 13, 8, 3],
            [4, 4, 13, 2],
            [4, 3, 4, 4],
            [11, 13, 2, 5],
            [11, 3, 12, 2],
        ])
        .unwrap();
        make_probabilities(&odds)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_refine_single_bet() {
        let classes = refine(&[(0x80000, 1)]);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes.get(&0x8FFFF), Some(&1));
        assert_eq!(classes.get(&0x7FFFF), Some(&0));
    }

    #[test]
    fn test_refine_overlapping_bets() {
        let classes = refine(&[(0x80000, 2), (0x88000, 5)]);
        assert_eq!(classes.len(), 3);
        assert_eq!(classes.get(&0x7FFFF), Some(&0));
        assert_eq!(classes.get(&0x87FFF), Some(&2));
        assert_eq!(classes.get(&0x88FFF), Some(&7));
    }

    #[test]
    fn test_refine_merges_duplicate_acceptance() {
        let classes = refine(&[(0x80000, 2), (0x80000, 3)]);
        assert_eq!(classes.get(&0x8FFFF), Some(&5));
    }

    #[test]
    fn test_class_probability() {
        let probs = scenario_probabilities();
        assert_close(class_probability(0x8FFFF, &probs), probs.get(0, 1));
        assert_close(
            class_probability(0x88FFF, &probs),
            probs.get(0, 1) * probs.get(1, 1),
        );
        // an arena with no pirates can't happen
        assert_eq!(class_probability(0x8FFF0, &probs), 0.0);
    }

    #[test]
    fn test_single_bet_distribution() {
        let probs = scenario_probabilities();
        let chances = compute_distribution(&[(0x80000, 1)], &probs);

        assert_eq!(chances.len(), 2);
        assert_eq!(chances[0].value, 0);
        assert_close(chances[0].probability, 0.459_722_222_222_222_1);
        assert_close(chances[0].tail, 1.0);
        assert_eq!(chances[1].value, 1);
        assert_close(chances[1].probability, 0.540_277_777_777_777_9);
        assert_close(chances[1].cumulative, 1.0);
        assert_close(chances[1].tail, 0.540_277_777_777_777_9);
    }

    #[test]
    fn test_overlapping_distribution() {
        let probs = scenario_probabilities();
        let chances = compute_distribution(&[(0x80000, 2), (0x88000, 5)], &probs);

        let values: Vec<u64> = chances.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![0, 2, 7]);
        assert_close(chances[1].probability, 0.418_715_277_777_777_8);
        assert_close(chances[2].probability, 0.121_562_5);
        assert_close(chances[2].cumulative, 1.0);
    }

    #[test]
    fn test_covering_an_arena_never_busts() {
        let probs = scenario_probabilities();
        let bets = [(0x80000, 1), (0x40000, 1), (0x20000, 1), (0x10000, 1)];
        let distribution = Distribution::new(&bets, &probs);

        assert!(distribution.bust().is_none());
        assert_eq!(distribution.chances().len(), 1);
        assert_eq!(distribution.chances()[0].value, 1);
        assert_close(distribution.chances()[0].probability, 1.0);
    }

    #[test]
    fn test_distribution_invariants() {
        let probs = scenario_probabilities();
        let bets = [(0x80000, 2), (0x88000, 5), (0x8, 3), (0x4400, 11)];
        let chances = compute_distribution(&bets, &probs);

        let total: f64 = chances.iter().map(|c| c.probability).sum();
        assert_close(total, 1.0);

        for pair in chances.windows(2) {
            assert!(pair[0].value < pair[1].value);
            assert!(pair[0].cumulative <= pair[1].cumulative);
        }
        for chance in &chances {
            assert_close(chance.tail, 1.0 - chance.cumulative + chance.probability);
        }
    }

    #[test]
    fn test_empty_distribution() {
        let probs = scenario_probabilities();
        let distribution = Distribution::new(&[], &probs);

        assert_eq!(
            distribution.chances(),
            &[Chance {
                value: 0,
                probability: 1.0,
                cumulative: 1.0,
                tail: 1.0
            }]
        );
        assert!(distribution.bust().is_some());
        assert!(distribution.most_likely_winner().is_none());
        assert_eq!(distribution.partial_rate(), 0.0);
    }

    #[test]
    fn test_summary_metrics() {
        let probs = scenario_probabilities();
        let distribution = Distribution::new(&[(0x80000, 2), (0x88000, 5)], &probs);

        assert_eq!(distribution.bust().map(|c| c.value), Some(0));
        assert_eq!(distribution.best().map(|c| c.value), Some(7));
        assert_eq!(distribution.most_likely_winner().map(|c| c.value), Some(2));
        // two bets: only payouts of 1 would be partial
        assert_eq!(distribution.partial_rate(), 0.0);

        let distribution = Distribution::new(&[(0x80000, 1), (0x8, 3), (0x4, 3)], &probs);
        let partial: f64 = distribution
            .chances()
            .iter()
            .filter(|c| c.value == 1 || c.value == 2)
            .map(|c| c.probability)
            .sum();
        assert!(partial > 0.0);
        assert_close(distribution.partial_rate(), partial);
    }
}
