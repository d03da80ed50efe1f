//! Offline simulation for the remote target, toggled from the keyboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use savepoint_core::target::PersistenceTarget;
use savepoint_core::types::{PersistError, Snapshot};

/// Wraps a target and fails every call while the switch is on.
pub struct SwitchableTarget<T> {
    inner: T,
    offline: Arc<AtomicBool>,
}

impl<T: PersistenceTarget> SwitchableTarget<T> {
    pub fn new(inner: T, offline: Arc<AtomicBool>) -> Self {
        Self { inner, offline }
    }

    fn check(&self) -> Result<(), PersistError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(PersistError::transient("remote unreachable (offline mode)"));
        }
        Ok(())
    }
}

impl<T: PersistenceTarget> PersistenceTarget for SwitchableTarget<T> {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        self.check()?;
        self.inner.persist(snapshot)
    }

    fn fetch(&mut self) -> Result<Option<String>, PersistError> {
        self.check()?;
        self.inner.fetch()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savepoint_core::target::FileTarget;

    #[test]
    fn offline_switch_fails_then_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let offline = Arc::new(AtomicBool::new(true));
        let mut target = SwitchableTarget::new(
            FileTarget::new(dir.path().join("doc.txt")),
            Arc::clone(&offline),
        );

        let err = target.persist(&Snapshot::new(1, "hi")).unwrap_err();
        assert!(err.is_retryable());

        offline.store(false, Ordering::Relaxed);
        target.persist(&Snapshot::new(1, "hi")).unwrap();
        assert_eq!(target.fetch().unwrap().as_deref(), Some("hi"));
    }
}
