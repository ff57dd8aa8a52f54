//! Session id generation and normalization

use rand::Rng;

use crate::game::constants::session::{ID_ALPHABET, ID_LENGTH};
use crate::game::state::SessionId;

/// Random id of `ID_LENGTH` uppercase letters, each drawn uniformly
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> SessionId {
    generate_with_len(rng, ID_LENGTH)
}

pub fn generate_with_len<R: Rng + ?Sized>(rng: &mut R, len: usize) -> SessionId {
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Ids are matched case-insensitively; the canonical form is upper case
pub fn normalize(id: &str) -> SessionId {
    id.to_ascii_uppercase()
}
