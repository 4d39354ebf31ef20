//! Persistence-safe conversation identity.
//!
//! Privacy-sensitive channels never store the raw address (it embeds the
//! user's phone number). They store a SHA-256 digest of it instead, plus a
//! masked form of the number for operators.

use sha2::{Digest, Sha256};

/// Characters of the number kept before the mask.
const MASK_HEAD: usize = 4;
/// Characters of the number kept after the mask.
const MASK_TAIL: usize = 3;
/// Numbers shorter than this are not masked at all.
const MIN_MASKABLE: usize = MASK_HEAD + MASK_TAIL + 1;

/// Deterministic 64-char uppercase hex SHA-256 digest of `address`.
pub fn hash_address(address: &str) -> String {
    hex::encode_upper(Sha256::digest(address.as_bytes()))
}

/// `+393331234567` → `+393*567`.
///
/// Returns `None` when the number is too short for the mask to hide
/// anything.
pub fn mask_phone(number: &str) -> Option<String> {
    let chars: Vec<char> = number.trim().chars().collect();
    if chars.len() < MIN_MASKABLE {
        return None;
    }

    let head: String = chars[..MASK_HEAD].iter().collect();
    let tail: String = chars[chars.len() - MASK_TAIL..].iter().collect();
    Some(format!("{head}*{tail}"))
}
