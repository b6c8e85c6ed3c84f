//! Multi-source record store.
//!
//! A [`Store`] merges the records of any number of source files into one
//! in-memory view keyed by account. Writes never touch another host's file:
//! a host loads only its own source, appends a record and saves it back.
//! Conflicts between hosts are left in place and settled at read time by
//! [`Resolution`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use zeroize::Zeroizing;

use crate::codec;
use crate::error::{Result, UserpassError};
use crate::record::Record;
use crate::resolve::Resolution;
use crate::vault::Vault;

/// How a query selects keys.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// The key equals the text.
    Exact(String),

    /// The regex matches somewhere in the key.
    Regex(Regex),
}

impl KeyPattern {
    /// Build a pattern from user input.
    ///
    /// # Errors
    ///
    /// Returns `UserpassError::InvalidInput` for an invalid regex.
    pub fn parse(text: &str, exact: bool) -> Result<Self> {
        if exact {
            return Ok(KeyPattern::Exact(text.to_string()));
        }
        Regex::new(text)
            .map(KeyPattern::Regex)
            .map_err(|e| UserpassError::InvalidInput(format!("Invalid key pattern: {}", e)))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(text) => text == key,
            KeyPattern::Regex(regex) => regex.is_match(key),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            KeyPattern::Exact(text) => text,
            KeyPattern::Regex(regex) => regex.as_str(),
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory merge of one or more sources.
#[derive(Debug, Default)]
pub struct Store {
    entries: BTreeMap<String, Vec<Record>>,
    sources: Vec<PathBuf>,
}

impl Store {
    /// Create an empty store with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources loaded so far, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of records across all keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge the records of every source into this store.
    ///
    /// Sources are decrypted through `vault` and decoded in order. Nothing
    /// is merged unless every source loads; on success the sources are
    /// appended to [`Store::sources`].
    ///
    /// # Errors
    ///
    /// - `UserpassError::SourceNotFound` if a source does not exist
    /// - `UserpassError::DecryptionFailed` if the vault gives up on one
    ///
    /// Returns the number of records merged.
    pub fn load<P, V>(&mut self, sources: &[P], vault: &mut V) -> Result<usize>
    where
        P: AsRef<Path>,
        V: Vault + ?Sized,
    {
        let mut staged = Vec::new();
        for source in sources {
            let source = source.as_ref();
            if !source.exists() {
                return Err(UserpassError::SourceNotFound(source.to_path_buf()));
            }
            let plaintext = Zeroizing::new(vault.decrypt(source)?);
            let records = codec::decode(&plaintext);
            tracing::debug!(
                source = %source.display(),
                records = records.len(),
                "decoded source"
            );
            staged.extend(records);
        }

        let merged = staged.len();
        for record in staged {
            self.add_record(record);
        }
        self.sources
            .extend(sources.iter().map(|source| source.as_ref().to_path_buf()));
        Ok(merged)
    }

    /// Append a record. Duplicates are kept; resolution happens on read.
    ///
    /// # Errors
    ///
    /// Returns `UserpassError::InvalidInput` if `timestamp <= 0`.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        timestamp: i64,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<()> {
        let record = Record::new(key, timestamp, username, secret)?;
        self.add_record(record);
        Ok(())
    }

    /// A timestamp for a new record under `key`: now, or one second past the
    /// newest record if that is not already in the past.
    ///
    /// Keeps a quick second write from colliding with the first under
    /// [`Resolution::Latest`].
    pub fn next_timestamp(&self, key: &str) -> i64 {
        let now = chrono::Utc::now().timestamp();
        let newest = self
            .entries
            .get(key)
            .and_then(|records| records.iter().map(|r| r.timestamp).max());
        match newest {
            Some(newest) if newest >= now => newest + 1,
            _ => now,
        }
    }

    /// Append an already validated record.
    pub fn add_record(&mut self, record: Record) {
        self.entries
            .entry(record.key.clone())
            .or_default()
            .push(record);
    }

    /// Where [`Store::save`] would write for `target`.
    ///
    /// # Errors
    ///
    /// Returns `UserpassError::AmbiguousTarget` when the store holds more than
    /// one source, or when no target is given and there is not exactly one.
    pub fn save_target(&self, target: Option<&Path>) -> Result<PathBuf> {
        if self.sources.len() > 1 {
            return Err(UserpassError::AmbiguousTarget {
                sources: self.sources.len(),
            });
        }
        match (target, self.sources.first()) {
            (Some(target), _) => Ok(target.to_path_buf()),
            (None, Some(source)) => Ok(source.clone()),
            (None, None) => Err(UserpassError::AmbiguousTarget { sources: 0 }),
        }
    }

    /// Encrypt and write the store back to its single source (or `target`).
    ///
    /// Records are written grouped by key, each key's records ascending by
    /// timestamp. The vault writes `<target>.new`; it only replaces the target
    /// once it exists and is non-empty, so a failed save leaves the previous
    /// file as it was.
    ///
    /// Two processes saving the same source concurrently are not
    /// coordinated: the last rename wins and the other update is lost.
    /// Where rename cannot replace an existing file, the target is removed
    /// and the rename retried. If that retry also fails, both the previous
    /// file and `<target>.new` are gone.
    ///
    /// # Errors
    ///
    /// - `UserpassError::AmbiguousTarget` (see [`Store::save_target`])
    /// - `UserpassError::EncryptionFailed` if the vault produced no output
    ///
    /// Returns the path written.
    pub fn save<V>(&self, target: Option<&Path>, vault: &mut V) -> Result<PathBuf>
    where
        V: Vault + ?Sized,
    {
        let target = self.save_target(target)?;
        let ordered = self.ordered_records();
        let plaintext = Zeroizing::new(codec::encode(&ordered));
        let pending = crate::fs::pending_path(&target);

        if let Err(err) = vault.encrypt(&target, &plaintext) {
            let _ = std::fs::remove_file(&pending);
            return Err(err);
        }

        let written = std::fs::metadata(&pending).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            let _ = std::fs::remove_file(&pending);
            return Err(UserpassError::EncryptionFailed(target));
        }

        crate::fs::rename_with_fallback(&pending, &target).map_err(|e| {
            UserpassError::Storage(format!("Failed to replace {}: {}", target.display(), e))
        })?;

        tracing::info!(
            path = %target.display(),
            records = ordered.len(),
            "saved source"
        );
        Ok(target)
    }

    fn ordered_records(&self) -> Vec<Record> {
        let mut ordered = Vec::with_capacity(self.len());
        for records in self.entries.values() {
            let start = ordered.len();
            ordered.extend(records.iter().cloned());
            ordered[start..].sort();
        }
        ordered
    }

    /// Keys matching `pattern`.
    pub fn find_keys(&self, pattern: &KeyPattern) -> BTreeSet<String> {
        self.entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect()
    }

    /// Every record under `key`, oldest first, including duplicates.
    ///
    /// Records sharing a timestamp are ordered by content, not load order.
    pub fn records(&self, key: &str) -> Vec<Record> {
        let mut records = self.entries.get(key).cloned().unwrap_or_default();
        records.sort();
        records
    }

    /// `(username, secret)` for every record under `key`, oldest first.
    ///
    /// The last element is the most recent write.
    pub fn find(&self, key: &str) -> Vec<(String, String)> {
        self.records(key)
            .iter()
            .map(Record::credential)
            .collect()
    }

    /// Username of the most recent record under `key`.
    pub fn current_username(&self, key: &str) -> Option<String> {
        self.records(key).pop().map(|record| record.username)
    }

    /// The single key matching `pattern`.
    ///
    /// # Errors
    ///
    /// - `UserpassError::NoMatch` if no key matches
    /// - `UserpassError::AmbiguousMatch` if several do
    pub fn resolve_one(&self, pattern: &KeyPattern) -> Result<String> {
        let keys = self.find_keys(pattern);
        let mut iter = keys.iter();
        match (iter.next(), iter.next()) {
            (Some(key), None) => Ok(key.clone()),
            (None, _) => Err(UserpassError::NoMatch(pattern.to_string())),
            (Some(_), Some(_)) => Err(UserpassError::AmbiguousMatch {
                pattern: pattern.to_string(),
                candidates: keys.into_iter().collect(),
            }),
        }
    }

    /// Records of `keys` under `mode`, grouped by key in the order given.
    pub fn select<'a, I>(&self, keys: I, mode: Resolution) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a String>,
    {
        keys.into_iter()
            .flat_map(|key| mode.apply(self.records(key)))
            .collect()
    }

    /// Records for every key matching `pattern`, resolved under `mode`.
    ///
    /// # Errors
    ///
    /// Returns `UserpassError::NoMatch` if no key matches.
    pub fn search(&self, pattern: &KeyPattern, mode: Resolution) -> Result<Vec<Record>> {
        let keys = self.find_keys(pattern);
        if keys.is_empty() {
            return Err(UserpassError::NoMatch(pattern.to_string()));
        }
        Ok(self.select(&keys, mode))
    }
}
