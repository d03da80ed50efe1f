//! Persistence seams supplied by the host application.
//!
//! `SnapshotSource` produces the serialized document at flush time and
//! `PersistenceTarget` is the remote sink. `FileTarget` is a concrete remote
//! that writes the body to a single file.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::types::{PersistError, Snapshot};

/// Produces the serialized document body. Called on the worker thread at
/// the moment a save begins.
pub trait SnapshotSource: Send {
    fn snapshot(&mut self) -> String;
}

impl<F> SnapshotSource for F
where
    F: FnMut() -> String + Send,
{
    fn snapshot(&mut self) -> String {
        self()
    }
}

/// Remote sink for snapshots. Implementations block until the write is
/// acknowledged; the controller never calls them concurrently.
pub trait PersistenceTarget: Send {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), PersistError>;

    /// Latest persisted body, or `None` if nothing was ever saved.
    fn fetch(&mut self) -> Result<Option<String>, PersistError>;

    fn describe(&self) -> String {
        "remote".to_string()
    }
}

/// Writes each snapshot to `path` atomically (temp file + rename).
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PersistenceTarget for FileTarget {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| io_error(e, snapshot.byte_len()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_error(e, snapshot.byte_len()))?;
        tmp.write_all(snapshot.body.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| io_error(e, snapshot.byte_len()))?;
        tmp.persist(&self.path)
            .map_err(|e| io_error(e.error, snapshot.byte_len()))?;

        log::debug!(
            target: "store",
            "wrote revision {} ({} bytes) to {}",
            snapshot.revision,
            snapshot.byte_len(),
            self.path.display()
        );
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn io_error(e: std::io::Error, needed: usize) -> PersistError {
    match e.kind() {
        ErrorKind::StorageFull | ErrorKind::FileTooLarge => PersistError::CapacityExceeded {
            needed,
            available: 0,
        },
        _ => PersistError::Transient(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_snapshot_sources() {
        let mut count = 0;
        let mut source = move || {
            count += 1;
            format!("{{\"n\":{}}}", count)
        };
        assert_eq!(SnapshotSource::snapshot(&mut source), "{\"n\":1}");
        assert_eq!(SnapshotSource::snapshot(&mut source), "{\"n\":2}");
    }

    #[test]
    fn file_target_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = FileTarget::new(dir.path().join("nested").join("doc.json"));
        assert_eq!(target.fetch().unwrap(), None);

        target.persist(&Snapshot::new(1, "{\"a\":1}")).unwrap();
        target.persist(&Snapshot::new(2, "{\"a\":2}")).unwrap();
        assert_eq!(target.fetch().unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn file_target_reports_unwritable_dir_as_transient() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut target = FileTarget::new(blocker.join("doc.json"));
        let err = target.persist(&Snapshot::new(1, "x")).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn storage_full_maps_to_capacity() {
        let err = io_error(std::io::Error::from(ErrorKind::StorageFull), 12);
        assert_eq!(
            err,
            PersistError::CapacityExceeded {
                needed: 12,
                available: 0
            }
        );
    }
}
