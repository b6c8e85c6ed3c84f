//! Plaintext line codec for source files.
//!
//! A decrypted source is a sequence of lines:
//!
//! ```text
//! timestamp\tkey\tusername\tsecret\n
//! ```
//!
//! Fields are not escaped; values containing tabs or newlines cannot be
//! stored. Lines that do not decode are skipped rather than reported, which
//! covers blank lines and trailing garbage.

use crate::record::Record;

const FIELD_SEPARATOR: char = '\t';

/// Decode every valid record from a decrypted source.
///
/// # Examples
///
/// ```
/// use userpass_core::codec::decode;
///
/// let records = decode(b"100\tsite\talice\tp1\n\ngarbage\n");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].username, "alice");
/// ```
pub fn decode(bytes: &[u8]) -> Vec<Record> {
    let text = String::from_utf8_lossy(bytes);
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        match decode_line(line) {
            Some(record) => records.push(record),
            None => {
                if !line.is_empty() {
                    tracing::debug!(line = index + 1, "skipping undecodable record line");
                }
            }
        }
    }
    records
}

fn decode_line(line: &str) -> Option<Record> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [timestamp, key, username, secret] = fields.as_slice() else {
        return None;
    };
    let timestamp: i64 = timestamp.trim().parse().ok()?;
    Record::new(*key, timestamp, *username, *secret).ok()
}

/// Encode records one per line, in the order given.
pub fn encode(records: &[Record]) -> Vec<u8> {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.timestamp.to_string());
        out.push(FIELD_SEPARATOR);
        out.push_str(&record.key);
        out.push(FIELD_SEPARATOR);
        out.push_str(&record.username);
        out.push(FIELD_SEPARATOR);
        out.push_str(&record.secret);
        out.push('\n');
    }
    out.into_bytes()
}
