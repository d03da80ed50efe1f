//! Local fallback storage: a bounded key/value store that holds the latest
//! snapshot while the remote target is unreachable.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::{Deserialize, Serialize};

use crate::types::{PersistError, Snapshot};

/// Bounded key/value store. Usage counts key and value bytes together.
///
/// A `put` that would exceed the quota must fail with
/// [`PersistError::CapacityExceeded`] and leave the store unchanged.
pub trait LocalStore: Send {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistError>;
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
    fn usage(&mut self) -> Result<usize, PersistError>;
    fn quota(&self) -> usize;
}

/// On-disk shape of a fallback entry.
#[derive(Serialize, Deserialize)]
struct LocalRecord<'a> {
    revision: u64,
    saved_at_secs: u64,
    body: std::borrow::Cow<'a, str>,
}

pub(crate) fn encode_record(snapshot: &Snapshot) -> Result<Vec<u8>, PersistError> {
    let saved_at_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let record = LocalRecord {
        revision: snapshot.revision,
        saved_at_secs,
        body: std::borrow::Cow::Borrowed(&snapshot.body),
    };
    serde_json::to_vec(&record).map_err(|e| PersistError::Transient(e.to_string()))
}

pub(crate) fn decode_record(bytes: &[u8]) -> Option<Snapshot> {
    match serde_json::from_slice::<LocalRecord<'_>>(bytes) {
        Ok(record) => Some(Snapshot::new(record.revision, record.body.into_owned())),
        Err(e) => {
            log::warn!(target: "store", "discarding unreadable fallback record: {}", e);
            None
        }
    }
}

/// Size a `put` of `key`/`value` adds, and the error if it does not fit.
pub(crate) fn check_quota(
    quota: usize,
    usage_without_key: usize,
    key: &str,
    value: &[u8],
) -> Result<(), PersistError> {
    let needed = key.len() + value.len();
    let available = quota.saturating_sub(usage_without_key);
    if needed > available {
        return Err(PersistError::CapacityExceeded { needed, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trip_keeps_revision() {
        let bytes = encode_record(&Snapshot::new(7, "{\"a\":1}")).unwrap();
        let decoded = decode_record(&bytes).unwrap();
        assert_eq!(decoded, Snapshot::new(7, "{\"a\":1}"));
    }

    #[test]
    fn garbage_record_is_ignored() {
        assert_eq!(decode_record(b"not json"), None);
    }

    #[test]
    fn quota_check_counts_key_and_value() {
        assert!(check_quota(10, 0, "abc", b"1234567").is_ok());
        assert_eq!(
            check_quota(10, 2, "abc", b"1234567"),
            Err(PersistError::CapacityExceeded {
                needed: 10,
                available: 8
            })
        );
    }
}
