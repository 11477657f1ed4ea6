//! Bet generator configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::stakes::{BET_AMOUNT_MAX, BET_AMOUNT_MIN};
use crate::error::MAX_BETS;

/// Bets per generated set without the Charity Corner perk
pub const DEFAULT_MAX_BETS: usize = 10;

pub const BET_AMOUNT_ENV: &str = "FOODCLUB_BET_AMOUNT";
pub const MAX_BETS_ENV: &str = "FOODCLUB_MAX_BETS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Player's bet amount. When set, generators rank by net expected and
    /// attach capped stakes to the bets they produce.
    pub bet_amount: Option<u32>,
    /// Number of bets per generated set (10, or 15 with Charity Corner)
    pub max_bets: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bet_amount: None,
            max_bets: DEFAULT_MAX_BETS,
        }
    }
}

impl GeneratorConfig {
    pub fn new(bet_amount: Option<u32>, max_bets: usize) -> Self {
        Self {
            bet_amount: bet_amount.map(|a| a.clamp(BET_AMOUNT_MIN, BET_AMOUNT_MAX)),
            max_bets: max_bets.clamp(1, MAX_BETS),
        }
    }

    /// Charity Corner raises the bet limit to 15
    pub fn with_charity_corner(mut self) -> Self {
        self.max_bets = MAX_BETS;
        self
    }

    pub fn with_bet_amount(mut self, bet_amount: u32) -> Self {
        self.bet_amount = Some(bet_amount.clamp(BET_AMOUNT_MIN, BET_AMOUNT_MAX));
        self
    }

    /// Defaults overridden by `FOODCLUB_BET_AMOUNT` and `FOODCLUB_MAX_BETS`
    ///
    /// Values that don't parse are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(BET_AMOUNT_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(amount) => config = config.with_bet_amount(amount),
                Err(e) => warn!("Ignoring {}={:?}: {}", BET_AMOUNT_ENV, raw, e),
            }
        }

        if let Some(raw) = lookup(MAX_BETS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_BETS).contains(&n) => config.max_bets = n,
                Ok(n) => warn!("Ignoring {}={}: must be between 1 and {}", MAX_BETS_ENV, n, MAX_BETS),
                Err(e) => warn!("Ignoring {}={:?}: {}", MAX_BETS_ENV, raw, e),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.bet_amount, None);
        assert_eq!(config.max_bets, 10);
    }

    #[test]
    fn test_charity_corner() {
        let config = GeneratorConfig::default().with_charity_corner();
        assert_eq!(config.max_bets, 15);
    }

    #[test]
    fn test_bet_amount_clamped() {
        assert_eq!(GeneratorConfig::default().with_bet_amount(10).bet_amount, Some(50));
        assert_eq!(
            GeneratorConfig::new(Some(100_000), 20),
            GeneratorConfig {
                bet_amount: Some(70_304),
                max_bets: 15
            }
        );
    }

    #[test]
    fn test_from_env_values() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            (BET_AMOUNT_ENV, "8000"),
            (MAX_BETS_ENV, " 15 "),
        ]));
        assert_eq!(config.bet_amount, Some(8000));
        assert_eq!(config.max_bets, 15);
    }

    #[test]
    fn test_from_env_ignores_bad_values() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            (BET_AMOUNT_ENV, "lots"),
            (MAX_BETS_ENV, "40"),
        ]));
        assert_eq!(config, GeneratorConfig::default());

        let config = GeneratorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, GeneratorConfig::default());
    }
}
