use serde::{Deserialize, Serialize};

/// Immutable copy of the host document taken when a save begins.
///
/// `body` is already serialized; its format belongs to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub revision: u64,
    pub body: String,
}

impl Snapshot {
    pub fn new(revision: u64, body: impl Into<String>) -> Self {
        Self {
            revision,
            body: body.into(),
        }
    }

    /// Size in bytes of the serialized body.
    pub fn byte_len(&self) -> usize {
        self.body.len()
    }
}
