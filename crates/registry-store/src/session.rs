//! Scoped storage sessions.
//!
//! The original system opens a context-managed connection per logical unit
//! of work. `sled::Db` handles are cheap `Arc`-backed clones, so a
//! `Session` is just one of those clones — acquired per call, dropped (no
//! explicit close needed) at the end of every path, success or failure.
//! Sessions are never shared across threads: each call site gets its own.

use crate::error::StoreError;
use std::path::Path;

/// A handle on the embedded store, scoped to one logical unit of work.
#[derive(Clone)]
pub struct Session {
    pub(crate) db: sled::Db,
}

/// Owns the long-lived database handle and mints sessions from it.
#[derive(Clone)]
pub struct StorageConnection {
    db: sled::Db,
}

impl StorageConnection {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open an ephemeral, non-persistent store — used by tests and by
    /// in-process pipeline runs that don't need durability across restarts.
    pub fn open_temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Acquire a session for one logical unit of work.
    pub fn session(&self) -> Session {
        Session { db: self.db.clone() }
    }
}
