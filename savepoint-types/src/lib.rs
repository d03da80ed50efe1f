//! # savepoint-types
//!
//! Shared type definitions for the savepoint workspace.
//! This crate contains the status vocabulary, snapshot and error types used by
//! savepoint-core and any display surface built on top of it.

mod error;
mod io;
mod snapshot;
mod status;

pub use error::{LoadError, PersistError};
pub use io::IoGeneration;
pub use snapshot::Snapshot;
pub use status::{SaveState, Status, StatusEvent, StatusLevel};
