//! Secure password generation
//!
//! Generated passwords always contain at least one uppercase letter, one
//! lowercase letter, one digit, and one special character, shuffled so the
//! guaranteed characters are not in a predictable position.

use rand::Rng;
use rand::seq::SliceRandom;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default password length for generated credentials
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Generate a secure random password of the given length.
///
/// Lengths below 4 are raised to 4 so every character class can be
/// represented.
pub fn generate_secure_password(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let length = length.max(4);

    let mut password = vec![
        UPPERCASE[rng.gen_range(0..UPPERCASE.len())],
        LOWERCASE[rng.gen_range(0..LOWERCASE.len())],
        DIGITS[rng.gen_range(0..DIGITS.len())],
        SPECIAL[rng.gen_range(0..SPECIAL.len())],
    ];

    let pool: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL].concat();
    for _ in password.len()..length {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }

    password.shuffle(&mut rng);
    password.into_iter().map(char::from).collect()
}
