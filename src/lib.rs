//! Food Club - odds, probabilities and bet sets for the Neopets Food Club
//!
//! This library provides:
//! - Win probabilities derived from a round's payout odds
//! - The 3124-row combination table of every possible bet
//! - Payout distributions for a set of up to 15 bets
//! - Bet and amount hashes as used by the community bet-sharing sites
//! - Bet set generators (max TER, gambit, tenbet, units, bustproof)
//!
//! # Example
//!
//! ```no_run
//! use foodclub::{BetGenerator, GeneratorConfig, OddsMatrix, make_probabilities, CombinationTable};
//!
//! let odds = OddsMatrix::new([
//!     [2, 13, 3, 5],
//!     [4, 2, 4, 6],
//!     [3, 13, 7, 2],
//!     [13, 2, 3, 3],
//!     [8, 2, 4, 12],
//! ])?;
//! let table = CombinationTable::build(&make_probabilities(&odds), &odds);
//!
//! let config = GeneratorConfig::default().with_bet_amount(8000);
//! let bets = BetGenerator::new(&table, config).max_ter()?;
//! println!("{} ({})", bets.bets_hash(), bets.amounts_hash());
//! # Ok::<(), foodclub::FoodClubError>(())
//! ```

pub mod arenas;
pub mod bets;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use arenas::{Arena, Arenas, Pirate};
pub use bets::{Bets, Winners};
pub use config::GeneratorConfig;
pub use crate::core::{
    make_probabilities, Chance, CombinationEntry, CombinationTable, Distribution, OddsMatrix,
    Probabilities, Selections,
};
pub use error::{FoodClubError, Result};
pub use models::{ArenaReport, BetsReport, RoundData};
pub use strategy::BetGenerator;
