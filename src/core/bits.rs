//! Bet binary encoding
//!
//! A bet picks at most one pirate per arena and is stored as a 20-bit mask:
//! four bits per arena, arena 0 in the most significant nibble. Within an
//! arena nibble, pirate 1 is the high bit (`0b1000`) and pirate 4 the low bit
//! (`0b0001`).
//!
//! ```
//! use foodclub::core::bits::{to_mask, to_selections};
//!
//! let mask = to_mask([1, 2, 3, 4, 0])?;
//! assert_eq!(mask, 0x84210);
//! assert_eq!(to_selections(mask)?, [1, 2, 3, 4, 0]);
//! # Ok::<(), foodclub::FoodClubError>(())
//! ```

use std::iter::FusedIterator;

use crate::error::{validate_arena, validate_selection, validate_selections, FoodClubError, Result};

pub const ARENA_COUNT: usize = 5;
pub const PIRATES_PER_ARENA: usize = 4;

/// Number of non-empty bets (5^5 - 1)
pub const COMBINATION_COUNT: usize = 3124;

/// Every pirate of every arena
pub const FULL_MASK: u32 = 0xFFFFF;

/// One nibble per arena, arena 0 first
pub const BIT_MASKS: [u32; ARENA_COUNT] = [0xF0000, 0xF000, 0xF00, 0xF0, 0xF];

/// The same pirate position across all arenas.
/// `0x88888` is pirate 1 of every arena, `0x11111` pirate 4.
pub const PIRATE_MASKS: [u32; PIRATES_PER_ARENA] = [0x88888, 0x44444, 0x22222, 0x11111];

/// Pirate index per arena: 0 = no pick, 1-4 = pirate
pub type Selections = [u8; ARENA_COUNT];

/// Binary of a single pirate in an arena. Index 0 (no pick) maps to 0.
pub fn pirate_binary(index: u8, arena: usize) -> Result<u32> {
    validate_arena(arena)?;
    validate_selection(arena, index)?;
    Ok(pirate_bit(index, arena))
}

/// Unchecked [`pirate_binary`]: slots outside arenas 0-4 and pirates 1-4
/// have no bit.
pub(crate) fn pirate_bit(index: u8, arena: usize) -> u32 {
    match (index, arena) {
        (1..=4, 0..=4) => 1 << (19 - (index as u32 - 1 + arena as u32 * 4)),
        _ => 0,
    }
}

/// Convert pirate indices to a bet binary
pub fn to_mask(selections: Selections) -> Result<u32> {
    validate_selections(&selections)?;
    Ok(mask_of(selections))
}

/// Unchecked [`to_mask`] for selections already known to be in range
pub(crate) fn mask_of(selections: Selections) -> u32 {
    selections
        .iter()
        .enumerate()
        .fold(0, |mask, (arena, &index)| mask | pirate_bit(index, arena))
}

/// Convert a bet binary back to pirate indices
///
/// Fails when the mask has bits above the 20-bit range or more than one
/// pirate picked in an arena.
pub fn to_selections(mask: u32) -> Result<Selections> {
    if mask & !FULL_MASK != 0 {
        return Err(FoodClubError::InvalidShape(format!(
            "Bet binary {:#x} exceeds 20 bits",
            mask
        )));
    }

    let mut selections = [0u8; ARENA_COUNT];
    for (arena, bit_mask) in BIT_MASKS.iter().enumerate() {
        let nibble = mask & bit_mask;
        if nibble == 0 {
            continue;
        }
        if nibble.count_ones() != 1 {
            return Err(FoodClubError::InvalidShape(format!(
                "Bet binary {:#x} picks more than one pirate in arena {}",
                mask, arena
            )));
        }
        let bit_length = 32 - nibble.leading_zeros();
        selections[arena] = 4 - ((bit_length - 1) % 4) as u8;
    }

    Ok(selections)
}

/// True when every arena has at least one pirate in the mask.
///
/// A mask missing an arena entirely cannot describe any real outcome.
pub fn is_reachable(mask: u32) -> bool {
    BIT_MASKS.iter().all(|bit_mask| mask & bit_mask != 0)
}

/// Mask of every outcome a bet pays out on: arenas without a pick accept
/// all four pirates.
pub fn acceptance_mask(mask: u32) -> u32 {
    BIT_MASKS.iter().fold(0, |acc, &bit_mask| {
        let nibble = mask & bit_mask;
        acc | if nibble == 0 { bit_mask } else { nibble }
    })
}

/// Number of arenas with a pick
pub fn picked_arenas(mask: u32) -> usize {
    BIT_MASKS
        .iter()
        .filter(|&&bit_mask| mask & bit_mask != 0)
        .count()
}

/// Position of a bet in the enumeration order of [`all_valid_masks`]
///
/// Returns `None` for the empty bet or out-of-range pirate indices.
pub fn combination_index(selections: Selections) -> Option<usize> {
    if selections.iter().any(|&s| s as usize > PIRATES_PER_ARENA) {
        return None;
    }
    let code = selections
        .iter()
        .fold(0usize, |acc, &s| acc * (PIRATES_PER_ARENA + 1) + s as usize);
    code.checked_sub(1)
}

/// Iterate every valid non-empty bet binary
///
/// Enumerates the pirate indices as five base-5 digits, arena 0 most
/// significant, skipping the all-zero bet. Each call returns a fresh
/// iterator.
pub fn all_valid_masks() -> ValidMasks {
    ValidMasks { code: 1 }
}

/// Iterator returned by [`all_valid_masks`]
#[derive(Debug, Clone)]
pub struct ValidMasks {
    code: usize,
}

impl ValidMasks {
    const END: usize = COMBINATION_COUNT + 1;

    fn selections(mut code: usize) -> Selections {
        let mut selections = [0u8; ARENA_COUNT];
        for arena in (0..ARENA_COUNT).rev() {
            selections[arena] = (code % (PIRATES_PER_ARENA + 1)) as u8;
            code /= PIRATES_PER_ARENA + 1;
        }
        selections
    }
}

impl Iterator for ValidMasks {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.code >= Self::END {
            return None;
        }
        let mask = mask_of(Self::selections(self.code));
        self.code += 1;
        Some(mask)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = Self::END.saturating_sub(self.code);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ValidMasks {}

impl FusedIterator for ValidMasks {}
