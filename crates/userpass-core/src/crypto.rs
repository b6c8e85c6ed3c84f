//! Age passphrase encryption for source files.
//!
//! Age derives the file key from the passphrase with scrypt, so the files
//! are portable between hosts given the shared passphrase.

use std::io::{Read, Write};
use std::iter;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, UserpassError};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Encrypt plaintext with an age passphrase recipient.
///
/// # Examples
///
/// ```
/// use secrecy::SecretString;
/// use userpass_core::crypto::encrypt;
///
/// let passphrase = SecretString::from("my-secure-passphrase".to_string());
/// let encrypted = encrypt(b"100\tsite\talice\tp1\n", &passphrase).unwrap();
/// assert!(!encrypted.is_empty());
/// ```
pub fn encrypt(data: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
    let encryptor = age::Encryptor::with_user_passphrase(passphrase.clone());

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| UserpassError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(data)
        .map_err(|e| UserpassError::Crypto(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| UserpassError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(encrypted)
}

/// Decrypt an age passphrase-encrypted file.
///
/// # Errors
///
/// Returns `UserpassError::IncorrectPassphrase` when the passphrase does not
/// unlock the file, and `UserpassError::Crypto` for malformed input.
pub fn decrypt(encrypted_data: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
    let decryptor = age::Decryptor::new(encrypted_data)
        .map_err(|e| UserpassError::Crypto(format!("Failed to create decryptor: {}", e)))?;

    let identity = age::scrypt::Identity::new(passphrase.clone());
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => UserpassError::IncorrectPassphrase,
            _ => UserpassError::Crypto(format!("Decryption failed: {}", e)),
        })?;

    let mut decrypted = Vec::new();
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| UserpassError::Crypto(format!("Failed to read decrypted data: {}", e)))?;

    Ok(decrypted)
}

/// Validate a passphrase chosen for a new source file.
pub fn validate_passphrase(passphrase: &SecretString) -> Result<()> {
    let value = passphrase.expose_secret();
    if value.trim().is_empty() {
        return Err(UserpassError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    if value.chars().count() < MIN_PASSPHRASE_LENGTH {
        return Err(UserpassError::InvalidInput(format!(
            "Passphrase must be at least {} characters",
            MIN_PASSPHRASE_LENGTH
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let passphrase = secret("test-passphrase-secure-123");
        let plaintext = b"100\tsite\talice\tp1\n";

        let encrypted = encrypt(plaintext, &passphrase).unwrap();
        assert_ne!(encrypted.as_slice(), plaintext);

        let decrypted = decrypt(&encrypted, &passphrase).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_wrong_passphrase_is_reported_as_such() {
        let encrypted = encrypt(b"secret data", &secret("correct-passphrase-123")).unwrap();
        let result = decrypt(&encrypted, &secret("wrong-passphrase-456"));
        assert!(matches!(result, Err(UserpassError::IncorrectPassphrase)));
    }

    #[test]
    fn test_garbage_input_is_a_crypto_error() {
        let result = decrypt(b"not an age file", &secret("test-passphrase-secure-123"));
        assert!(matches!(result, Err(UserpassError::Crypto(_))));
    }

    #[test]
    fn test_empty_plaintext_still_produces_ciphertext() {
        let passphrase = secret("test-passphrase-secure-123");
        let encrypted = encrypt(b"", &passphrase).unwrap();
        assert!(!encrypted.is_empty());
        assert!(decrypt(&encrypted, &passphrase).unwrap().is_empty());
    }

    #[test]
    fn test_validate_passphrase() {
        assert!(validate_passphrase(&secret("my-secure-passphrase-123")).is_ok());
        assert!(validate_passphrase(&secret("12345678")).is_ok());
        assert!(validate_passphrase(&secret("short")).is_err());
        assert!(validate_passphrase(&secret("   ")).is_err());
    }
}
