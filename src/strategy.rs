//! Bet set generators
//!
//! Each generator ranks rows of the combination table and keeps the top
//! `max_bets`. Ties keep table order. When the config has a bet amount,
//! expected-ratio rankings switch to net expected and the generated set gets
//! capped stakes attached.
//!
//! The random generators take the caller's RNG so a seeded one reproduces
//! the same set.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::arenas::Arenas;
use crate::bets::Bets;
use crate::config::GeneratorConfig;
use crate::core::bits::{picked_arenas, to_selections, ARENA_COUNT};
use crate::core::combinations::{CombinationEntry, CombinationTable};
use crate::core::stakes::StakeCalculator;
use crate::error::{FoodClubError, Result};

/// Most arenas a ten-bet can fix
const TENBET_MAX_ARENAS: usize = 3;

pub struct BetGenerator<'a> {
    table: &'a CombinationTable,
    config: GeneratorConfig,
}

impl<'a> BetGenerator<'a> {
    pub fn new(table: &'a CombinationTable, config: GeneratorConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn stakes(&self) -> Option<StakeCalculator> {
        self.config.bet_amount.map(StakeCalculator::new)
    }

    /// Expected ratio, or net expected when a bet amount is set
    fn ranking_value(&self, entry: &CombinationEntry) -> f64 {
        match self.stakes() {
            Some(calc) => calc.net_expected(entry),
            None => entry.expected_ratio,
        }
    }

    /// Rows that pick a pirate in every arena
    fn full_bets(&self) -> Vec<&'a CombinationEntry> {
        self.table
            .iter()
            .filter(|entry| picked_arenas(entry.mask) == ARENA_COUNT)
            .collect()
    }

    /// Sort descending by `key` and keep the top `max_bets`
    fn take_ranked<F>(&self, mut candidates: Vec<&'a CombinationEntry>, key: F) -> Vec<&'a CombinationEntry>
    where
        F: Fn(&CombinationEntry) -> f64,
    {
        candidates.sort_by(|a, b| key(*b).total_cmp(&key(*a)));
        candidates.truncate(self.config.max_bets);
        candidates
    }

    /// Turn ranked rows into a bet set, attaching capped stakes if configured
    fn finish(&self, picked: &[&CombinationEntry]) -> Result<Bets> {
        let masks: Vec<u32> = picked.iter().map(|entry| entry.mask).collect();
        let bets = Bets::from_masks(&masks)?;

        match self.stakes() {
            Some(calc) => {
                let amounts: Vec<Option<u32>> = calc
                    .calculate_multiple(picked)
                    .into_iter()
                    .map(|sizing| Some(sizing.stake))
                    .collect();
                bets.with_amounts(&amounts)
            }
            None => Ok(bets),
        }
    }

    /// Highest expected ratio (or net expected) bets
    pub fn max_ter(&self) -> Result<Bets> {
        let picked = self.take_ranked(self.table.iter().collect(), |e| self.ranking_value(e));
        debug!("max TER picked {} bets", picked.len());
        self.finish(&picked)
    }

    /// Subsets of a five-arena bet, best odds plus probability first
    pub fn gambit(&self, five_bet: u32) -> Result<Bets> {
        to_selections(five_bet)?;
        if picked_arenas(five_bet) != ARENA_COUNT {
            return Err(FoodClubError::InvalidShape(format!(
                "Gambit needs a bet on all five arenas, got {:#x}",
                five_bet
            )));
        }

        let candidates = self
            .table
            .iter()
            .filter(|entry| entry.mask & five_bet == entry.mask)
            .collect();
        let picked = self.take_ranked(candidates, |e| e.odds as f64 + e.probability);

        debug!("gambit on {:#x} picked {} bets", five_bet, picked.len());
        self.finish(&picked)
    }

    /// Gambit on the five-arena bet with the highest ranking value
    pub fn best_gambit(&self) -> Result<Bets> {
        let best = self.take_ranked(self.full_bets(), |e| self.ranking_value(e));

        match best.first() {
            Some(entry) => self.gambit(entry.mask),
            None => Err(FoodClubError::EmptyWagerSet),
        }
    }

    /// Distinct five-arena bets picked at random
    pub fn crazy(&self, rng: &mut impl Rng) -> Result<Bets> {
        let full_bets = self.full_bets();
        let picked: Vec<&CombinationEntry> = full_bets
            .choose_multiple(rng, self.config.max_bets)
            .copied()
            .collect();

        debug!("crazy picked {} bets", picked.len());
        self.finish(&picked)
    }

    /// Distinct bets drawn from the whole table
    pub fn random(&self, rng: &mut impl Rng) -> Result<Bets> {
        let rows: Vec<&CombinationEntry> = self.table.iter().collect();
        let picked: Vec<&CombinationEntry> = rows
            .choose_multiple(rng, self.config.max_bets)
            .copied()
            .collect();

        debug!("random picked {} bets", picked.len());
        self.finish(&picked)
    }

    /// Gambit on a randomly chosen five-arena bet
    pub fn random_gambit(&self, rng: &mut impl Rng) -> Result<Bets> {
        let five_bet = self
            .full_bets()
            .choose(rng)
            .map(|entry| entry.mask)
            .ok_or(FoodClubError::EmptyWagerSet)?;

        debug!("random gambit on {:#x}", five_bet);
        self.gambit(five_bet)
    }

    /// Best bets that include every pirate in `pirates_mask`
    ///
    /// The mask must pick pirates in 1 to 3 arenas.
    pub fn tenbet(&self, pirates_mask: u32) -> Result<Bets> {
        to_selections(pirates_mask)
            .map_err(|e| FoodClubError::InvalidPirateSelection(e.to_string()))?;

        let arenas = picked_arenas(pirates_mask);
        if arenas == 0 || arenas > TENBET_MAX_ARENAS {
            return Err(FoodClubError::InvalidPirateSelection(format!(
                "Pick pirates in 1 to {} arenas, got {}",
                TENBET_MAX_ARENAS, arenas
            )));
        }

        let candidates = self
            .table
            .iter()
            .filter(|entry| entry.mask & pirates_mask == pirates_mask)
            .collect();
        let picked = self.take_ranked(candidates, |e| self.ranking_value(e));

        debug!("tenbet on {:#x} picked {} bets", pirates_mask, picked.len());
        self.finish(&picked)
    }

    /// Most probable bets paying at least `units` odds
    pub fn units(&self, units: u32) -> Result<Bets> {
        let candidates = self
            .table
            .iter()
            .filter(|entry| entry.odds >= units)
            .collect();
        let picked = self.take_ranked(candidates, |e| e.probability);

        debug!("units >= {} picked {} bets", units, picked.len());
        self.finish(&picked)
    }

    /// A set that pays out whatever the result, built from positive arenas
    ///
    /// - one positive arena: every pirate of it
    /// - two: the three worst pirates of the best arena, plus every pirate of
    ///   the second paired with the best arena's favourite
    /// - three or more: the three worst of the best arena, the three worst
    ///   of the second paired with the best's favourite, and every pirate of
    ///   the third paired with both favourites
    ///
    /// With a bet amount, stakes scale so each bet pays back the same.
    pub fn bustproof(&self) -> Result<Bets> {
        let arenas = Arenas::new(self.table.odds());
        let positives = arenas.positives();

        let masks: Vec<u32> = match positives.as_slice() {
            [] => return Err(FoodClubError::NoPositiveArenas),
            [only] => only.pirates.iter().map(|p| p.binary()).collect(),
            [first, second] => {
                let first_best = first.best();
                let favourite = first_best[0].binary();

                first_best[1..]
                    .iter()
                    .map(|p| p.binary())
                    .chain(second.pirates.iter().map(|p| p.binary() | favourite))
                    .collect()
            }
            [first, second, third, ..] => {
                let first_best = first.best();
                let second_best = second.best();
                let favourite = first_best[0].binary();
                let second_favourite = second_best[0].binary();

                first_best[1..]
                    .iter()
                    .map(|p| p.binary())
                    .chain(second_best[1..].iter().map(|p| p.binary() | favourite))
                    .chain(
                        third
                            .best()
                            .iter()
                            .map(|p| p.binary() | favourite | second_favourite),
                    )
                    .collect()
            }
        };

        debug!(
            "bustproof from {} positive arenas: {} bets",
            positives.len(),
            masks.len()
        );

        let bets = Bets::from_masks(&masks)?;
        match self.stakes() {
            Some(calc) => {
                let amounts: Vec<Option<u32>> = calc
                    .bustproof_stakes(&bets.odds_values(self.table))
                    .into_iter()
                    .map(Some)
                    .collect();
                bets.with_amounts(&amounts)
            }
            None => Ok(bets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probability::{make_probabilities, OddsMatrix};
    use rand::{rngs::StdRng, SeedableRng};

    const MAX_TER_7956: [u32; 10] = [
        0x1104, 0x1004, 0x81104, 0x11104, 0x104, 0x81004, 0x1204, 0x1124, 0x1114, 0x21104,
    ];

    fn round_7956() -> CombinationTable {
        let opening = OddsMatrix::new([
            [2, 13, 3, 5],
            [4, 2, 4, 5],
            [3, 13, 7, 2],
            [13, 2, 3, 3],
            [12, 2, 6, 13],
        ])
        .unwrap();
        let current = OddsMatrix::new([
            [2, 13, 3, 5],
            [4, 2, 4, 6],
            [3, 13, 7, 2],
            [13, 2, 3, 3],
            [8, 2, 4, 12],
        ])
        .unwrap();
        CombinationTable::build(&make_probabilities(&opening), &current)
    }

    fn sorted(masks: &[u32]) -> Vec<u32> {
        let mut masks = masks.to_vec();
        masks.sort_unstable();
        masks
    }

    #[test]
    fn test_max_ter() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let bets = generator.max_ter().unwrap();

        assert_eq!(bets.masks()[0], 0x1104);
        assert_eq!(sorted(bets.masks()), sorted(&MAX_TER_7956));
        assert_eq!(bets.bets_hash(), "eukucjuoycaulucepkyreynyc");
        assert!(bets.amounts().is_none());
        assert!((bets.expected_ratio(&table) - 15.104_183_611_874_232).abs() < 1e-9);
    }

    #[test]
    fn test_max_ter_with_bet_amount() {
        let table = round_7956();
        let config = GeneratorConfig::default().with_bet_amount(8000);
        let bets = BetGenerator::new(&table, config).max_ter().unwrap();

        assert_eq!(sorted(bets.masks()), sorted(&MAX_TER_7956));
        let amounts = bets.amounts().unwrap();
        assert!(amounts.iter().all(|&a| a == Some(8000)));
        assert!((bets.net_expected(&table) - 40_833.468_894_993_89).abs() < 1e-6);
    }

    #[test]
    fn test_charity_corner_limit() {
        let table = round_7956();
        let config = GeneratorConfig::default().with_charity_corner();
        let bets = BetGenerator::new(&table, config).max_ter().unwrap();
        assert_eq!(bets.len(), 15);
    }

    #[test]
    fn test_gambit() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let bets = generator.gambit(0x88888).unwrap();

        assert_eq!(bets.masks()[0], 0x88888);
        assert_eq!(bets.masks()[1], 0x8888);
        assert!(bets.is_gambit());

        assert!(generator.gambit(0x8888).is_err());
        assert!(generator.gambit(0xC8888).is_err());
    }

    #[test]
    fn test_best_gambit() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let bets = generator.best_gambit().unwrap();

        assert_eq!(
            bets.masks(),
            &[0x81124, 0x1124, 0x81024, 0x81120, 0x81104, 0x1024, 0x1120, 0x81020, 0x1104, 0x81004]
        );
        assert!(bets.is_gambit());
    }

    #[test]
    fn test_crazy() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        let bets = generator.crazy(&mut rng).unwrap();

        // from_masks drops duplicates, so a full set means distinct bets
        assert_eq!(bets.len(), 10);
        assert!(bets.is_crazy());
        assert_eq!(bets.full_bet_count(), 10);
        assert!(bets.amounts().is_none());

        let again = generator.crazy(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(again.masks(), bets.masks());
    }

    #[test]
    fn test_crazy_with_charity_corner_and_amount() {
        let table = round_7956();
        let config = GeneratorConfig::default()
            .with_charity_corner()
            .with_bet_amount(8000);
        let mut rng = StdRng::seed_from_u64(7);
        let bets = BetGenerator::new(&table, config).crazy(&mut rng).unwrap();

        assert_eq!(bets.len(), 15);
        assert!(bets.is_crazy());
        let calc = StakeCalculator::new(8000);
        for (mask, amount) in bets.masks().iter().zip(bets.amounts().unwrap()) {
            let entry = table.entry_for_mask(*mask).unwrap();
            assert_eq!(*amount, Some(calc.capped_stake(entry)));
        }
    }

    #[test]
    fn test_random() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        let bets = generator.random(&mut rng).unwrap();

        assert_eq!(bets.len(), 10);
        assert!(bets
            .masks()
            .iter()
            .all(|&mask| table.entry_for_mask(mask).is_some()));

        let other = generator.random(&mut StdRng::seed_from_u64(43)).unwrap();
        assert_ne!(other.masks(), bets.masks());
    }

    #[test]
    fn test_random_gambit() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let bets = generator.random_gambit(&mut rng).unwrap();

            assert_eq!(bets.len(), 10);
            assert!(bets.is_gambit());
            assert_eq!(picked_arenas(bets.masks()[0]), ARENA_COUNT);
        }
    }

    #[test]
    fn test_tenbet() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());

        let bets = generator.tenbet(0x80000).unwrap();
        assert_eq!(bets.len(), 10);
        assert!(bets.masks().iter().all(|m| m & 0x80000 == 0x80000));
        assert_eq!(bets.masks()[0], 0x81104);

        // three fixed arenas leave 25 candidates
        let bets = generator.tenbet(0x80808).unwrap();
        assert_eq!(bets.masks()[0], 0x81808);
        assert!(bets.masks().iter().all(|m| m & 0x80808 == 0x80808));
    }

    #[test]
    fn test_tenbet_invalid_selection() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());

        assert!(matches!(
            generator.tenbet(0),
            Err(FoodClubError::InvalidPirateSelection(_))
        ));
        assert!(matches!(
            generator.tenbet(0x88880),
            Err(FoodClubError::InvalidPirateSelection(_))
        ));
        assert!(matches!(
            generator.tenbet(0xC0000),
            Err(FoodClubError::InvalidPirateSelection(_))
        ));
    }

    #[test]
    fn test_units() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());

        let bets = generator.units(100).unwrap();
        assert_eq!(bets.masks()[0], 0x11104);
        assert!(bets.odds_values(&table).iter().all(|&odds| odds >= 100));

        // nothing pays a million to one
        assert_eq!(generator.units(1_000_000), Err(FoodClubError::EmptyWagerSet));
    }

    #[test]
    fn test_bustproof_single_positive_arena() {
        let table = round_7956();
        let generator = BetGenerator::new(&table, GeneratorConfig::default());
        let bets = generator.bustproof().unwrap();

        assert_eq!(bets.bets_hash(), "aafacaapae");
        assert!(bets.amounts().is_none());
        assert!(bets.is_bustproof(&table));
    }

    #[test]
    fn test_bustproof_stakes() {
        let table = round_7956();
        let config = GeneratorConfig::default().with_bet_amount(8000);
        let bets = BetGenerator::new(&table, config).bustproof().unwrap();

        assert_eq!(
            bets.amounts(),
            Some(&[Some(2000), Some(8000), Some(4000), Some(1333)][..])
        );
        assert!(bets.is_guaranteed_win(&table));
    }

    #[test]
    fn test_bustproof_two_positive_arenas() {
        let odds = OddsMatrix::new([
            [2, 13, 3, 5],
            [4, 2, 4, 6],
            [3, 13, 7, 2],
            [13, 2, 4, 13],
            [8, 2, 4, 12],
        ])
        .unwrap();
        let table = CombinationTable::build(&make_probabilities(&odds), &odds);
        let bets = BetGenerator::new(&table, GeneratorConfig::default())
            .bustproof()
            .unwrap();

        // arena 3 (odds 0.904) ranks ahead of arena 4 (0.958)
        assert_eq!(bets.len(), 7);
        assert_eq!(&bets.masks()[..3], &[0x20, 0x80, 0x10]);
        assert_eq!(&bets.masks()[3..], &[0x48, 0x44, 0x42, 0x41]);
        assert!(bets.is_bustproof(&table));
    }

    #[test]
    fn test_bustproof_three_positive_arenas() {
        let odds = OddsMatrix::new([
            [2, 13, 3, 5],
            [4, 2, 4, 6],
            [2, 13, 13, 4],
            [13, 2, 4, 13],
            [8, 2, 4, 12],
        ])
        .unwrap();
        let table = CombinationTable::build(&make_probabilities(&odds), &odds);
        let bets = BetGenerator::new(&table, GeneratorConfig::default())
            .bustproof()
            .unwrap();

        assert_eq!(bets.len(), 10);
        assert!(bets.is_bustproof(&table));
    }

    #[test]
    fn test_no_positive_arenas() {
        let odds = OddsMatrix::new([[2, 2, 2, 2]; 5]).unwrap();
        let table = CombinationTable::build(&make_probabilities(&odds), &odds);
        let generator = BetGenerator::new(&table, GeneratorConfig::default());

        assert_eq!(generator.bustproof(), Err(FoodClubError::NoPositiveArenas));
    }
}
