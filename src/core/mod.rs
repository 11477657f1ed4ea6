//! Core math: bet encoding, probabilities, payout distributions and hashes

pub mod bits;
pub mod combinations;
pub mod distribution;
pub mod hash;
pub mod probability;
pub mod stakes;

// Re-export commonly used types
pub use bits::{all_valid_masks, to_mask, to_selections, Selections};
pub use combinations::{CombinationEntry, CombinationTable, MAX_PAYOUT};
pub use distribution::{compute_distribution, Chance, Distribution};
pub use hash::{decode_amounts, decode_bets, encode_amounts, encode_bets};
pub use probability::{make_probabilities, OddsMatrix, Probabilities};
pub use stakes::{clamp_stake, StakeCalculator, StakeSizing, BET_AMOUNT_MAX, BET_AMOUNT_MIN};
