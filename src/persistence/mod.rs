//! Saving and restoring a [`FileSystem`](crate::filesystem::FileSystem) across runs.
//!
//! State files hold a magic tag followed by a zstd-compressed bincode
//! [`snapshot::Snapshot`]: one record per node pointing at its parent, plus the
//! path of the current directory.

mod snapshot;
mod state_store;

pub use state_store::{StateStore, StateStoreError};
