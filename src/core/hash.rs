//! Bet and amount hashes
//!
//! Bets are shared as a short lowercase string. The pirate indices of every
//! bet are flattened into one digit stream and packed two digits per letter
//! (`a` + first * 5 + second), so `"faa"` is a single bet on arena 0,
//! pirate 1.
//!
//! Amounts use three characters per bet over `a-zA-Z`, offset by the
//! maximum bet amount so an unset amount encodes as `"Aaa"`.

use super::bits::{mask_of, Selections, ARENA_COUNT};
use super::stakes::{clamp_stake, BET_AMOUNT_MAX, BET_AMOUNT_MIN};
use crate::error::{validate_bet_count, validate_selections, FoodClubError, Result};

const AMOUNTS_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const AMOUNTS_RADIX: u32 = 52;

/// Largest value three amount characters can hold
const AMOUNT_CODE_MAX: u32 = AMOUNTS_RADIX * AMOUNTS_RADIX * AMOUNTS_RADIX - 1;

/// Encode bets into a bets hash
///
/// Fails when any pirate index is outside 0-4.
pub fn encode_bets(bets: &[Selections]) -> Result<String> {
    for bet in bets {
        validate_selections(bet)?;
    }
    Ok(pack_bets(bets))
}

/// Pack bets whose indices are already known to be in range
pub(crate) fn pack_bets(bets: &[Selections]) -> String {
    let digits: Vec<u8> = bets.iter().flatten().copied().collect();

    digits
        .chunks(2)
        .map(|pair| {
            let high = pair[0];
            let low = pair.get(1).copied().unwrap_or(0);
            (b'a' + high * 5 + low) as char
        })
        .collect()
}

/// Decode a bets hash
///
/// Trailing digits are padded out to a full bet and bets without any pick
/// are dropped, so `"f"` and `"faa"` decode the same.
pub fn decode_bets(hash: &str) -> Result<Vec<Selections>> {
    let mut digits = Vec::with_capacity(hash.len() * 2);
    for (position, character) in hash.chars().enumerate() {
        let code = match character {
            'a'..='y' => character as u8 - b'a',
            _ => {
                return Err(FoodClubError::InvalidHashCharacter {
                    character,
                    position,
                })
            }
        };
        digits.push(code / 5);
        digits.push(code % 5);
    }

    let bets = digits
        .chunks(ARENA_COUNT)
        .map(|chunk| {
            let mut selections = [0u8; ARENA_COUNT];
            selections[..chunk.len()].copy_from_slice(chunk);
            selections
        })
        .filter(|selections| selections.iter().any(|&s| s != 0))
        .collect();

    Ok(bets)
}

/// Decode a bets hash into bet binaries
pub fn bets_hash_to_bet_binaries(hash: &str) -> Result<Vec<u32>> {
    Ok(decode_bets(hash)?.into_iter().map(mask_of).collect())
}

/// Number of bets in a bets hash
pub fn bets_hash_to_bets_count(hash: &str) -> Result<usize> {
    Ok(decode_bets(hash)?.len())
}

/// Decode a bets hash, requiring 1 to 15 bets
pub fn bets_hash_to_bets(hash: &str) -> Result<Vec<Selections>> {
    let bets = decode_bets(hash)?;
    validate_bet_count(bets.len())?;
    Ok(bets)
}

/// Encode bet amounts into an amounts hash
///
/// Amounts are clamped to the game's limits. The top of the range doesn't
/// fit in three characters and saturates at the largest code.
pub fn encode_amounts(amounts: &[Option<u32>]) -> String {
    let mut hash = String::with_capacity(amounts.len() * 3);
    for amount in amounts {
        let value = amount.map_or(0, clamp_stake);
        let code = (value + BET_AMOUNT_MAX).min(AMOUNT_CODE_MAX);

        for divisor in [AMOUNTS_RADIX * AMOUNTS_RADIX, AMOUNTS_RADIX, 1] {
            let index = (code / divisor) % AMOUNTS_RADIX;
            hash.push(AMOUNTS_ALPHABET[index as usize] as char);
        }
    }
    hash
}

/// Decode an amounts hash; anything below the minimum bet is unset
pub fn decode_amounts(hash: &str) -> Result<Vec<Option<u32>>> {
    let characters: Vec<char> = hash.chars().collect();
    if characters.len() % 3 != 0 {
        return Err(FoodClubError::InvalidHashLength(characters.len()));
    }

    let mut amounts = Vec::with_capacity(characters.len() / 3);
    for (group, chunk) in characters.chunks(3).enumerate() {
        let mut code = 0u32;
        for (offset, &character) in chunk.iter().enumerate() {
            let index = AMOUNTS_ALPHABET
                .iter()
                .position(|&c| c as char == character)
                .ok_or(FoodClubError::InvalidHashCharacter {
                    character,
                    position: group * 3 + offset,
                })?;
            code = code * AMOUNTS_RADIX + index as u32;
        }

        let amount = code.checked_sub(BET_AMOUNT_MAX).filter(|&a| a >= BET_AMOUNT_MIN);
        amounts.push(amount);
    }

    Ok(amounts)
}
