use thiserror::Error;

use crate::core::bits::{Selections, ARENA_COUNT, PIRATES_PER_ARENA};

/// Maximum number of bets a single bet set may hold
pub const MAX_BETS: usize = 15;

/// Errors raised while validating odds, bets and hashes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoodClubError {
    /// Odds matrix or bet binary has the wrong structure
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid odds {odds} for arena {arena}, pirate {pirate}: must be between 2 and 13")]
    InvalidOdds { arena: usize, pirate: usize, odds: u8 },

    #[error("Invalid hash character {character:?} at position {position}")]
    InvalidHashCharacter { character: char, position: usize },

    #[error("Invalid amounts hash length {0}: must be a multiple of 3")]
    InvalidHashLength(usize),

    #[error("Bet set requires at least one valid bet")]
    EmptyWagerSet,

    #[error("Bet count must be between 1 and 15, got {0}")]
    WagerCountOutOfRange(usize),

    #[error("Expected {expected} bet amounts, got {actual}")]
    AmountCountMismatch { expected: usize, actual: usize },

    #[error("No positive arenas to build a bustproof set from")]
    NoPositiveArenas,

    #[error("Invalid pirate selection: {0}")]
    InvalidPirateSelection(String),
}

pub type Result<T> = std::result::Result<T, FoodClubError>;

/// Validation functions
pub fn validate_bet_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(FoodClubError::EmptyWagerSet);
    }
    if count > MAX_BETS {
        return Err(FoodClubError::WagerCountOutOfRange(count));
    }
    Ok(())
}

pub fn validate_odds(arena: usize, pirate: usize, odds: u8) -> Result<()> {
    if !(2..=13).contains(&odds) {
        return Err(FoodClubError::InvalidOdds {
            arena,
            pirate,
            odds,
        });
    }
    Ok(())
}

pub fn validate_arena_count(count: usize) -> Result<()> {
    if count != ARENA_COUNT {
        return Err(FoodClubError::InvalidShape(format!(
            "Exactly {} arenas required, got {}",
            ARENA_COUNT, count
        )));
    }
    Ok(())
}

pub fn validate_selection(arena: usize, selection: u8) -> Result<()> {
    if selection as usize > PIRATES_PER_ARENA {
        return Err(FoodClubError::InvalidShape(format!(
            "Pirate index in arena {} must be between 0 and {}, got {}",
            arena, PIRATES_PER_ARENA, selection
        )));
    }
    Ok(())
}

pub fn validate_selections(selections: &Selections) -> Result<()> {
    for (arena, &selection) in selections.iter().enumerate() {
        validate_selection(arena, selection)?;
    }
    Ok(())
}

pub fn validate_arena(arena: usize) -> Result<()> {
    if arena >= ARENA_COUNT {
        return Err(FoodClubError::InvalidShape(format!(
            "Arena must be between 0 and {}, got {}",
            ARENA_COUNT - 1,
            arena
        )));
    }
    Ok(())
}

/// A pirate slot (1-4) in an arena (0-4)
pub fn validate_pirate(arena: usize, pirate: usize) -> Result<()> {
    validate_arena(arena)?;
    if !(1..=PIRATES_PER_ARENA).contains(&pirate) {
        return Err(FoodClubError::InvalidShape(format!(
            "Pirate in arena {} must be between 1 and {}, got {}",
            arena, PIRATES_PER_ARENA, pirate
        )));
    }
    Ok(())
}

/// Every arena needs a winning pirate (1-4)
pub fn validate_winners(winners: &[u8; ARENA_COUNT]) -> Result<()> {
    for (arena, &winner) in winners.iter().enumerate() {
        validate_pirate(arena, winner as usize)?;
    }
    Ok(())
}
