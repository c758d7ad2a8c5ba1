//! Redemption code generation.

use rand::Rng;

/// 32-symbol alphabet with the visually ambiguous characters
/// (0/O, 1/I) removed, so codes survive being read out loud.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a redemption code.
pub const CODE_LEN: usize = 9;

/// Generate a 9-character redemption code, uniform over the alphabet.
pub fn redemption_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
