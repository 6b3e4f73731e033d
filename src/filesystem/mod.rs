//! In-memory directory tree.
//!
//! A [`FileSystem`] owns every [`Node`](node::Node) reachable from its root and tracks a
//! current directory that all relative operations are evaluated against.

mod node;
mod tree;

pub use node::{EntryKindTag, NodeId};
pub use tree::{FileSystem, FilesystemError};
