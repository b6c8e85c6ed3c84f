//! Decrypt/encrypt collaborator for source files.
//!
//! The store never handles ciphertext or passphrases itself; it asks a
//! [`Vault`] for the plaintext of a source and hands it plaintext to write.
//! [`AgeVault`] is the age-backed implementation. It looks for a passphrase
//! in this order:
//!
//! 1. the credential agent, unless [`DecryptOptions::use_agent`] is off
//! 2. the session [`CredentialCache`]
//! 3. the [`PassphrasePrompt`], at most [`DecryptOptions::max_attempts`] times

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::crypto;
use crate::error::{Result, UserpassError};

/// Default number of prompted passphrase attempts per source.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Produces plaintext from sources and writes encrypted replacements.
pub trait Vault {
    /// Decrypt `source` and return its plaintext.
    ///
    /// # Errors
    ///
    /// - `UserpassError::SourceNotFound` if the file does not exist
    /// - `UserpassError::DecryptionFailed` once the retry budget is spent
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>>;

    /// Encrypt `plaintext` for `target`, writing the ciphertext to
    /// `<target>.new`. The caller verifies that file and moves it into place.
    fn encrypt(&mut self, target: &Path, plaintext: &[u8]) -> Result<()>;
}

impl<V: Vault + ?Sized> Vault for &mut V {
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>> {
        (**self).decrypt(source)
    }

    fn encrypt(&mut self, target: &Path, plaintext: &[u8]) -> Result<()> {
        (**self).encrypt(target, plaintext)
    }
}

/// What a passphrase prompt is being asked for.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// File the passphrase is for
    pub source: PathBuf,

    /// 1-based attempt number
    pub attempt: u32,

    /// Attempt budget for this source
    pub max_attempts: u32,

    /// A new passphrase is being chosen and should be confirmed
    pub confirm: bool,
}

/// Interactive (or scripted) source of passphrases.
pub trait PassphrasePrompt {
    /// Ask for a passphrase. `Ok(None)` means none can be obtained, which
    /// ends the retry loop early.
    fn prompt(&mut self, request: &PromptRequest) -> Result<Option<SecretString>>;
}

/// A credential store consulted before prompting, such as a keychain.
pub trait CredentialAgent {
    /// Passphrase known for `source`, if any.
    fn lookup(&self, source: &Path) -> Option<SecretString>;

    /// Called after a prompted passphrase unlocked `source`.
    fn remember(&self, _source: &Path, _passphrase: &SecretString) {}

    /// Called when the agent's passphrase was rejected for `source`.
    fn forget(&self, _source: &Path) {}
}

/// Agent that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAgent;

impl CredentialAgent for NoAgent {
    fn lookup(&self, _source: &Path) -> Option<SecretString> {
        None
    }
}

/// Remembers the last working passphrase for the rest of a session.
///
/// Owned by the vault for one run of the program; the passphrase is zeroized
/// when the cache is cleared or dropped.
#[derive(Default)]
pub struct CredentialCache {
    passphrase: Option<SecretString>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&SecretString> {
        self.passphrase.as_ref()
    }

    pub fn store(&mut self, passphrase: SecretString) {
        self.passphrase = Some(passphrase);
    }

    pub fn clear(&mut self) {
        self.passphrase = None;
    }

    pub fn is_empty(&self) -> bool {
        self.passphrase.is_none()
    }
}

/// Retry and agent settings for decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptOptions {
    /// Prompted attempts per source before giving up
    pub max_attempts: u32,

    /// Try the credential agent before the cache and the prompt
    pub use_agent: bool,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            use_agent: true,
        }
    }
}

/// Age passphrase vault.
pub struct AgeVault<P, A = NoAgent> {
    prompt: P,
    agent: A,
    cache: CredentialCache,
    options: DecryptOptions,
}

impl<P: PassphrasePrompt> AgeVault<P, NoAgent> {
    /// Vault without a credential agent.
    pub fn new(prompt: P, options: DecryptOptions) -> Self {
        Self::with_agent(prompt, NoAgent, options)
    }
}

impl<P: PassphrasePrompt, A: CredentialAgent> AgeVault<P, A> {
    pub fn with_agent(prompt: P, agent: A, options: DecryptOptions) -> Self {
        Self {
            prompt,
            agent,
            cache: CredentialCache::new(),
            options,
        }
    }

    pub fn options(&self) -> DecryptOptions {
        self.options
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CredentialCache {
        &mut self.cache
    }

    fn agent_passphrase(&self, source: &Path) -> Option<SecretString> {
        if self.options.use_agent {
            self.agent.lookup(source)
        } else {
            None
        }
    }

    fn request(&self, source: &Path, attempt: u32, confirm: bool) -> PromptRequest {
        PromptRequest {
            source: source.to_path_buf(),
            attempt,
            max_attempts: self.options.max_attempts,
            confirm,
        }
    }
}

impl<P: PassphrasePrompt, A: CredentialAgent> Vault for AgeVault<P, A> {
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>> {
        let encrypted = match fs::read(source) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(UserpassError::SourceNotFound(source.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(passphrase) = self.agent_passphrase(source) {
            match crypto::decrypt(&encrypted, &passphrase) {
                Ok(plaintext) => {
                    tracing::debug!(source = %source.display(), "unlocked with agent passphrase");
                    self.cache.store(passphrase);
                    return Ok(plaintext);
                }
                Err(UserpassError::IncorrectPassphrase) => {
                    tracing::debug!(source = %source.display(), "agent passphrase rejected");
                    self.agent.forget(source);
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(passphrase) = self.cache.get().cloned() {
            match crypto::decrypt(&encrypted, &passphrase) {
                Ok(plaintext) => return Ok(plaintext),
                Err(UserpassError::IncorrectPassphrase) => {
                    tracing::debug!(source = %source.display(), "cached passphrase rejected");
                    self.cache.clear();
                }
                Err(err) => return Err(err),
            }
        }

        let mut attempts = 0;
        while attempts < self.options.max_attempts {
            let request = self.request(source, attempts + 1, false);
            let Some(passphrase) = self.prompt.prompt(&request)? else {
                break;
            };
            attempts += 1;
            match crypto::decrypt(&encrypted, &passphrase) {
                Ok(plaintext) => {
                    if self.options.use_agent {
                        self.agent.remember(source, &passphrase);
                    }
                    self.cache.store(passphrase);
                    return Ok(plaintext);
                }
                Err(UserpassError::IncorrectPassphrase) => {
                    tracing::warn!(
                        source = %source.display(),
                        remaining = self.options.max_attempts - attempts,
                        "incorrect passphrase"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(UserpassError::DecryptionFailed {
            path: source.to_path_buf(),
            attempts,
        })
    }

    fn encrypt(&mut self, target: &Path, plaintext: &[u8]) -> Result<()> {
        let passphrase = match self.cache.get().cloned() {
            Some(passphrase) => passphrase,
            None => match self.agent_passphrase(target) {
                Some(passphrase) => passphrase,
                None => {
                    let request = self.request(target, 1, true);
                    let passphrase = self.prompt.prompt(&request)?.ok_or_else(|| {
                        UserpassError::InvalidInput(format!(
                            "No passphrase available to encrypt {}",
                            target.display()
                        ))
                    })?;
                    crypto::validate_passphrase(&passphrase)?;
                    passphrase
                }
            },
        };

        let ciphertext = crypto::encrypt(plaintext, &passphrase)?;
        crate::fs::write_private(&crate::fs::pending_path(target), &ciphertext)?;
        self.cache.store(passphrase);
        Ok(())
    }
}
