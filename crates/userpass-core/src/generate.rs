//! Random password generation.

use zeroize::Zeroizing;

use crate::error::{Result, UserpassError};

/// Characters a generated password is drawn from.
const ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#$%&*+-=?@^_~";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 24;

/// Generate a password of `length` characters from [`ALPHABET`].
///
/// Bytes at or above the largest multiple of the alphabet size are rejected
/// so every character is equally likely.
pub fn generate_password(length: usize) -> Result<Zeroizing<String>> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(UserpassError::InvalidInput(format!(
            "Password length must be between {} and {} (got {})",
            MIN_LENGTH, MAX_LENGTH, length
        )));
    }

    let limit = 256 - (256 % ALPHABET.len());
    let mut password = Zeroizing::new(String::with_capacity(length));
    let mut buffer = Zeroizing::new([0u8; 64]);
    while password.len() < length {
        getrandom::getrandom(&mut buffer[..])
            .map_err(|e| UserpassError::Crypto(format!("Failed to gather randomness: {}", e)))?;
        for &byte in buffer.iter() {
            if password.len() == length {
                break;
            }
            if (byte as usize) < limit {
                password.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            }
        }
    }
    Ok(password)
}
