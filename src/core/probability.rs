//! Pirate win probabilities from opening odds
//!
//! Food Club odds are integers from 2 to 13. An odds value `m` only tells us
//! the true probability lies roughly in `(1/(m+1), 1/m)`; 13 is a catch-all
//! for long shots and 2 for heavy favourites. Each arena is solved
//! independently:
//!
//! 1. naive bounds per pirate from its odds
//! 2. bounds tightened so the arena can still sum to 1
//! 3. initial estimate at the midpoint (0.05 for 13:1 pirates)
//! 4. leveling: from the favourites upward, lift the estimates of every pirate
//!    with odds <= level so the arena sums to 1, if their bounds allow it
//!
//! The result is not renormalized. Existing bet hashes and max-TER sets were
//! produced from these exact values; [`Probabilities::renormalized`] is
//! available when a strict distribution is needed.

use serde::{Deserialize, Serialize};

use super::bits::{ARENA_COUNT, PIRATES_PER_ARENA};
use crate::error::{validate_arena_count, validate_odds, validate_pirate, FoodClubError, Result};

/// Validated 5x4 grid of pirate odds (2-13)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct OddsMatrix([[u8; PIRATES_PER_ARENA]; ARENA_COUNT]);

impl OddsMatrix {
    pub fn new(odds: [[u8; PIRATES_PER_ARENA]; ARENA_COUNT]) -> Result<Self> {
        for (arena, row) in odds.iter().enumerate() {
            for (pirate, &value) in row.iter().enumerate() {
                validate_odds(arena, pirate + 1, value)?;
            }
        }
        Ok(Self(odds))
    }

    /// Build from rows of either 4 odds, or 5 where column 0 is the
    /// placeholder used by round data (`[1, a, b, c, d]`).
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        validate_arena_count(rows.len())?;

        let mut odds = [[0u8; PIRATES_PER_ARENA]; ARENA_COUNT];
        for (arena, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let values = match row.len() {
                PIRATES_PER_ARENA => row,
                n if n == PIRATES_PER_ARENA + 1 => &row[1..],
                n => {
                    return Err(FoodClubError::InvalidShape(format!(
                        "Arena {} must have 4 odds (or 5 with a leading placeholder), got {}",
                        arena, n
                    )))
                }
            };
            odds[arena].copy_from_slice(values);
        }

        Self::new(odds)
    }

    /// Odds of a pirate (1-4) in an arena (0-4)
    ///
    /// # Panics
    ///
    /// Panics if the arena or pirate is out of range.
    pub fn get(&self, arena: usize, pirate: usize) -> u8 {
        self.0[arena][pirate - 1]
    }

    pub fn rows(&self) -> &[[u8; PIRATES_PER_ARENA]; ARENA_COUNT] {
        &self.0
    }

    /// Copy with a single pirate's odds replaced
    pub fn with_odds(&self, arena: usize, pirate: usize, odds: u8) -> Result<Self> {
        validate_pirate(arena, pirate)?;
        validate_odds(arena, pirate, odds)?;
        let mut rows = self.0;
        rows[arena][pirate - 1] = odds;
        Ok(Self(rows))
    }
}

impl TryFrom<Vec<Vec<u8>>> for OddsMatrix {
    type Error = FoodClubError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self> {
        Self::from_rows(&rows)
    }
}

impl From<OddsMatrix> for Vec<Vec<u8>> {
    fn from(odds: OddsMatrix) -> Self {
        odds.0.iter().map(|row| row.to_vec()).collect()
    }
}

/// Estimated win probability for every pirate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities([[f64; PIRATES_PER_ARENA]; ARENA_COUNT]);

impl Probabilities {
    pub fn from_rows(rows: [[f64; PIRATES_PER_ARENA]; ARENA_COUNT]) -> Self {
        Self(rows)
    }

    /// Probability of a pirate (1-4) in an arena (0-4)
    ///
    /// # Panics
    ///
    /// Panics if the arena or pirate is out of range.
    pub fn get(&self, arena: usize, pirate: usize) -> f64 {
        self.0[arena][pirate - 1]
    }

    pub fn rows(&self) -> &[[f64; PIRATES_PER_ARENA]; ARENA_COUNT] {
        &self.0
    }

    pub fn arena_sum(&self, arena: usize) -> f64 {
        self.0[arena].iter().sum()
    }

    /// Scale each arena so its probabilities sum to exactly 1
    ///
    /// Opt-in: the raw estimates are what bet generation expects.
    pub fn renormalized(&self) -> Self {
        let mut rows = self.0;
        for row in &mut rows {
            let sum: f64 = row.iter().sum();
            if sum > 0.0 {
                for prob in row.iter_mut() {
                    *prob /= sum;
                }
            }
        }
        Self(rows)
    }
}

/// Lower/upper probability bounds implied by a single odds value
fn naive_bounds(odds: u8) -> (f64, f64) {
    match odds {
        13 => (0.0, 1.0 / 13.0),
        2 => (1.0 / 3.0, 1.0),
        m => {
            let m = m as f64;
            (1.0 / (1.0 + m), 1.0 / m)
        }
    }
}

/// Estimate win probabilities for one arena
fn arena_probabilities(odds: &[u8; PIRATES_PER_ARENA]) -> [f64; PIRATES_PER_ARENA] {
    let mut min = [0.0f64; PIRATES_PER_ARENA];
    let mut max = [0.0f64; PIRATES_PER_ARENA];
    for (pirate, &value) in odds.iter().enumerate() {
        (min[pirate], max[pirate]) = naive_bounds(value);
    }

    let min_sum: f64 = min.iter().sum();
    let max_sum: f64 = max.iter().sum();

    // tighten: a pirate can't be above 1 minus everyone else's minimum, etc.
    let adj_min: [f64; PIRATES_PER_ARENA] =
        std::array::from_fn(|p| f64::max(min[p], 1.0 + max[p] - max_sum));
    let adj_max: [f64; PIRATES_PER_ARENA] =
        std::array::from_fn(|p| f64::min(max[p], 1.0 + min[p] - min_sum));

    let mut estimates: [f64; PIRATES_PER_ARENA] = std::array::from_fn(|p| match odds[p] {
        13 => 0.05,
        _ => (adj_min[p] + adj_max[p]) / 2.0,
    });

    for level in 2..=12u8 {
        let total: f64 = estimates.iter().sum();
        if total == 1.0 {
            break;
        }

        let mut count = 0usize;
        let mut excess = 0.0f64;
        let mut capacity = 1.0f64;
        for p in (0..PIRATES_PER_ARENA).filter(|&p| odds[p] <= level) {
            count += 1;
            excess += estimates[p] - adj_min[p];
            capacity = f64::min(capacity, adj_max[p] - adj_min[p]);
        }

        let needed = excess + 1.0 - total;
        if total - excess <= 1.0 && count > 0 && capacity * count as f64 >= needed {
            let share = needed / count as f64;
            for p in (0..PIRATES_PER_ARENA).filter(|&p| odds[p] <= level) {
                estimates[p] = adj_min[p] + share;
            }
            break;
        }
    }

    estimates
}

/// Estimate win probabilities for every arena from its odds
pub fn make_probabilities(odds: &OddsMatrix) -> Probabilities {
    let mut rows = [[0.0f64; PIRATES_PER_ARENA]; ARENA_COUNT];
    for (arena, row) in odds.rows().iter().enumerate() {
        rows[arena] = arena_probabilities(row);
    }
    Probabilities(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_odds() -> OddsMatrix {
        OddsMatrix::from_rows(&[
            vec![1u8, 2, 13, 8, 3],
            vec![1, 4, 4, 13, 2],
            vec![1, 4, 3, 4, 4],
            vec![1, 11, 13, 2, 5],
            vec![1, 11, 3, 12, 2],
        ])
        .unwrap()
    }

    #[test]
    fn test_odds_matrix_from_rows_with_placeholder() {
        let odds = scenario_odds();
        assert_eq!(odds.get(0, 1), 2);
        assert_eq!(odds.get(0, 2), 13);
        assert_eq!(odds.get(4, 4), 2);
    }

    #[test]
    fn test_odds_matrix_from_rows_without_placeholder() {
        let odds = OddsMatrix::from_rows(&[
            [2u8, 13, 8, 3],
            [4, 4, 13, 2],
            [4, 3, 4, 4],
            [11, 13, 2, 5],
            [11, 3, 12, 2],
        ])
        .unwrap();
        assert_eq!(odds, scenario_odds());
    }

    #[test]
    fn test_odds_matrix_invalid_shape() {
        let four_arenas = vec![vec![2u8, 3, 4, 5]; 4];
        assert!(matches!(
            OddsMatrix::from_rows(&four_arenas),
            Err(FoodClubError::InvalidShape(_))
        ));

        let short_row = vec![vec![2u8, 3, 4]; 5];
        assert!(matches!(
            OddsMatrix::from_rows(&short_row),
            Err(FoodClubError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_odds_matrix_invalid_odds() {
        let rows = vec![vec![1u8, 1, 13, 3, 5]; 5];
        assert!(matches!(
            OddsMatrix::from_rows(&rows),
            Err(FoodClubError::InvalidOdds { arena: 0, pirate: 1, odds: 1 })
        ));
    }

    #[test]
    fn test_odds_matrix_deserialize() {
        let json = "[[1,2,13,8,3],[1,4,4,13,2],[1,4,3,4,4],[1,11,13,2,5],[1,11,3,12,2]]";
        let odds: OddsMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(odds, scenario_odds());
        assert!(serde_json::from_str::<OddsMatrix>("[[2,3,4,5]]").is_err());
    }

    #[test]
    fn test_with_odds() {
        let odds = scenario_odds().with_odds(0, 2, 5).unwrap();
        assert_eq!(odds.get(0, 2), 5);
        assert!(scenario_odds().with_odds(0, 2, 14).is_err());
        assert!(scenario_odds().with_odds(0, 0, 5).is_err());
        assert!(scenario_odds().with_odds(0, 5, 5).is_err());
        assert!(scenario_odds().with_odds(5, 1, 5).is_err());
    }

    #[test]
    fn test_naive_bounds() {
        assert_eq!(naive_bounds(13), (0.0, 1.0 / 13.0));
        assert_eq!(naive_bounds(2), (1.0 / 3.0, 1.0));
        assert_eq!(naive_bounds(4), (0.2, 0.25));
    }

    #[test]
    fn test_scenario_probabilities() {
        let probs = make_probabilities(&scenario_odds());

        for arena in 0..ARENA_COUNT {
            assert!((probs.arena_sum(arena) - 1.0).abs() < 1e-9);
        }

        // arena 0: [2, 13, 8, 3]
        assert!((probs.get(0, 1) - 0.540_277_777_777_777_9).abs() < 1e-12);
        assert!((probs.get(0, 2) - 0.05).abs() < 1e-12);
        assert!((probs.get(0, 3) - 0.118_055_555_555_555_55).abs() < 1e-12);
        assert!((probs.get(0, 4) - 0.291_666_666_666_666_63).abs() < 1e-12);

        // arena 1: [4, 4, 13, 2]
        assert!((probs.get(1, 1) - 0.225).abs() < 1e-12);
        assert!((probs.get(1, 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_bounded() {
        let probs = make_probabilities(&scenario_odds());
        for row in probs.rows() {
            for &p in row {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_all_long_shots_not_renormalized() {
        // four 13:1 pirates can't be leveled; estimates stay at 0.05
        let odds = OddsMatrix::new([[13; 4]; 5]).unwrap();
        let probs = make_probabilities(&odds);
        assert!((probs.arena_sum(0) - 0.2).abs() < 1e-12);

        let renormalized = probs.renormalized();
        assert!((renormalized.arena_sum(0) - 1.0).abs() < 1e-12);
        assert!((renormalized.get(0, 1) - 0.25).abs() < 1e-12);
    }
}
