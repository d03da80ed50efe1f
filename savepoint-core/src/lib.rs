//! # savepoint-core
//!
//! Auto-save engine: persists a host document to a remote target after a
//! quiet period, retries transient failures with backoff, keeps a copy in a
//! bounded local store while the remote is unreachable, and reports every
//! phase through a fixed set of status messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::{Arc, Mutex};
//! use savepoint_core::config::Config;
//! use savepoint_core::controller::{AutoSaveFeedback, AutoSaveHandle};
//! use savepoint_core::store::SqliteStore;
//! use savepoint_core::target::FileTarget;
//!
//! let config = Config::load();
//! let doc = Arc::new(Mutex::new(String::new()));
//! let source_doc = Arc::clone(&doc);
//! let local = SqliteStore::open(&config::data_dir().join("local.sqlite"), config.local_quota_bytes())?;
//!
//! // 1. Spawn the worker; it reports "Auto-save initialized"
//! let mut autosave = AutoSaveHandle::spawn(
//!     config.autosave(),
//!     move || source_doc.lock().map(|d| d.clone()).unwrap_or_default(),
//!     FileTarget::new(config.remote_path()),
//!     Some(Box::new(local)),
//! )?;
//!
//! // 2. Display surfaces subscribe to status events
//! let status_rx = autosave.subscribe();
//!
//! // 3. Tell the controller whenever the document changes
//! autosave.notify_changed();
//!
//! // 4. Drain AutoSaveFeedback for save/load completions
//! for feedback in autosave.drain_feedback() { /* ... */ }
//! ```
//!
//! ## Module Overview
//!
//! - [`controller`]: `AutoSaveCore` (deterministic engine) and
//!   `AutoSaveHandle` (worker thread + channels)
//! - [`status`]: `StatusReporter`, the single writer of the visible status
//! - [`target`]: `SnapshotSource`, `PersistenceTarget`, `FileTarget`
//! - [`store`]: bounded local fallback stores (`MemoryStore`, `SqliteStore`)
//! - [`retry`]: fixed and exponential backoff
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub use savepoint_types as types;

pub mod config;
pub mod controller;
pub mod retry;
pub mod status;
pub mod store;
pub mod target;
