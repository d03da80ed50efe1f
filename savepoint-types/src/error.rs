use std::fmt;

/// Failure reported by a persistence target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Network-class failure. Retried with backoff.
    Transient(String),
    /// The sink is full. Reported once and never retried automatically.
    CapacityExceeded { needed: usize, available: usize },
}

impl PersistError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(msg) => write!(f, "transient persistence failure: {}", msg),
            Self::CapacityExceeded { needed, available } => write!(
                f,
                "storage capacity exceeded: need {} bytes, {} available",
                needed, available
            ),
        }
    }
}

impl std::error::Error for PersistError {}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        Self::Transient(e.to_string())
    }
}

/// Nothing could be loaded: the remote failed and no local copy exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError(pub PersistError);

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load failed: {}", self.0)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(PersistError::transient("timeout").is_retryable());
        let full = PersistError::CapacityExceeded {
            needed: 10,
            available: 4,
        };
        assert!(!full.is_retryable());
        assert_eq!(
            full.to_string(),
            "storage capacity exceeded: need 10 bytes, 4 available"
        );
    }
}
