use bincode::{Decode, Encode};
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

use crate::filesystem::{EntryKindTag, FileSystem, FilesystemError, NodeId};

/// Bumped whenever the encoded layout of [`Snapshot`] changes.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Self-contained copy of a [`FileSystem`].
///
/// Non-root nodes are stored flat in pre-order, each pointing at an earlier
/// entry as its parent, so neither encoding nor restoring recurses. The current
/// directory is kept as the list of names leading to it from root.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Snapshot {
    pub version: u32,
    pub entries: Vec<SnapshotEntry>,
    pub current_path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SnapshotEntry {
    pub name: String,
    /// Index into `entries`; `None` means root.
    pub parent: Option<usize>,
    pub kind: SnapshotKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum SnapshotKind {
    File,
    Directory,
}

impl From<EntryKindTag> for SnapshotKind {
    fn from(tag: EntryKindTag) -> Self {
        match tag {
            EntryKindTag::File => SnapshotKind::File,
            EntryKindTag::Directory => SnapshotKind::Directory,
        }
    }
}

impl From<SnapshotKind> for EntryKindTag {
    fn from(kind: SnapshotKind) -> Self {
        match kind {
            SnapshotKind::File => EntryKindTag::File,
            SnapshotKind::Directory => EntryKindTag::Directory,
        }
    }
}

impl From<&FileSystem> for Snapshot {
    fn from(fs: &FileSystem) -> Self {
        let mut entries = Vec::with_capacity(fs.node_count().saturating_sub(1));
        // Entry index of the node at each depth along the path being walked.
        let mut ancestors: Vec<Option<usize>> = Vec::new();

        for (depth, node) in fs.pre_order(fs.root()) {
            ancestors.truncate(depth);
            if node.is_root() {
                ancestors.push(None);
                continue;
            }

            let parent = ancestors.last().copied().flatten();
            ancestors.push(Some(entries.len()));
            entries.push(SnapshotEntry {
                name: node.name().to_string(),
                parent,
                kind: node.kind().tag().into(),
            });
        }

        Snapshot {
            version: SNAPSHOT_VERSION,
            entries,
            current_path: fs
                .path_components(fs.current())
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl TryFrom<Snapshot> for FileSystem {
    type Error = SnapshotError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        ensure!(
            snapshot.version == SNAPSHOT_VERSION,
            UnsupportedVersionSnafu {
                found: snapshot.version,
            }
        );

        let mut fs = FileSystem::new();
        let mut created: Vec<NodeId> = Vec::with_capacity(snapshot.entries.len());

        for (index, entry) in snapshot.entries.iter().enumerate() {
            let parent = match entry.parent {
                None => fs.root(),
                Some(parent) => *created
                    .get(parent)
                    .context(UnknownParentSnafu { index, parent })?,
            };
            let id = fs
                .create_in(parent, &entry.name, entry.kind.into())
                .context(InvalidEntrySnafu { index })?;
            created.push(id);
        }

        for component in &snapshot.current_path {
            let entered = component != ".." && fs.change_directory(component).is_ok();
            ensure!(
                entered,
                DanglingCurrentPathSnafu {
                    path: format!("/{}/", snapshot.current_path.join("/")),
                }
            );
        }

        debug!(
            "Restored {} nodes, current directory {}",
            fs.node_count(),
            fs.working_directory()
        );
        Ok(fs)
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display(
        "Unsupported snapshot version {found}, expected {}",
        SNAPSHOT_VERSION
    ))]
    UnsupportedVersion { found: u32 },
    #[snafu(display("Entry {index} refers to parent {parent}, which does not precede it"))]
    UnknownParent { index: usize, parent: usize },
    #[snafu(display("Entry {index} violates the tree rules"))]
    InvalidEntry {
        index: usize,
        source: FilesystemError,
    },
    #[snafu(display("Saved current directory {path} does not exist in the snapshot"))]
    DanglingCurrentPath { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, parent: Option<usize>, kind: SnapshotKind) -> SnapshotEntry {
        SnapshotEntry {
            name: name.into(),
            parent,
            kind,
        }
    }

    fn snapshot(entries: Vec<SnapshotEntry>, current_path: &[&str]) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            entries,
            current_path: current_path.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample_filesystem() -> FileSystem {
        let mut fs = FileSystem::new();
        fs.make_file("first_file").unwrap();
        fs.make_directory("projects").unwrap();
        fs.change_directory("projects").unwrap();
        fs.make_directory("shell").unwrap();
        fs.make_file("todo").unwrap();
        fs.change_directory("shell").unwrap();
        fs
    }

    #[test]
    fn capture_records_tree_and_current_path() {
        let captured = Snapshot::from(&sample_filesystem());

        assert_eq!(
            captured,
            snapshot(
                vec![
                    entry("first_file", None, SnapshotKind::File),
                    entry("projects", None, SnapshotKind::Directory),
                    entry("shell", Some(1), SnapshotKind::Directory),
                    entry("todo", Some(1), SnapshotKind::File),
                ],
                &["projects", "shell"],
            )
        );
    }

    #[test]
    fn capture_skips_removed_nodes() {
        let mut fs = sample_filesystem();
        fs.change_directory("..").unwrap();
        fs.remove("todo").unwrap();
        fs.make_file("fresh").unwrap();

        let captured = Snapshot::from(&fs);

        assert_eq!(captured.entries.len(), fs.node_count() - 1);
        assert_eq!(captured.entries[3], entry("fresh", Some(1), SnapshotKind::File));
    }

    #[test]
    fn restore_rebuilds_structure_and_position() {
        let original = sample_filesystem();
        let mut restored = FileSystem::try_from(Snapshot::from(&original)).unwrap();

        assert_eq!(restored.working_directory(), "/projects/shell/");
        assert_eq!(restored.tree(), original.tree());

        restored.change_directory("..").unwrap();
        assert_eq!(restored.list(), vec!["shell", "todo"]);
        restored.change_directory("..").unwrap();
        assert_eq!(restored.current(), restored.root());
        assert_eq!(restored.list(), vec!["first_file", "projects"]);
    }

    #[test]
    fn restore_of_fresh_filesystem_sits_at_root() {
        let restored = FileSystem::try_from(Snapshot::from(&FileSystem::new())).unwrap();
        assert_eq!(restored.current(), restored.root());
        assert_eq!(restored.node_count(), 1);
    }

    #[test]
    fn deep_nesting_round_trips() {
        let depth = 50_000;
        let mut fs = FileSystem::new();
        for _ in 0..depth {
            fs.make_directory("d").unwrap();
            fs.change_directory("d").unwrap();
        }

        let captured = Snapshot::from(&fs);
        assert_eq!(captured.entries.len(), depth);
        assert_eq!(captured.entries[depth - 1].parent, Some(depth - 2));

        let restored = FileSystem::try_from(captured).unwrap();
        assert_eq!(restored.node_count(), depth + 1);
        assert_eq!(restored.path_components(restored.current()).len(), depth);
    }

    #[test]
    fn restore_rejects_other_versions() {
        let mut old = snapshot(vec![], &[]);
        old.version = SNAPSHOT_VERSION + 1;

        let result = FileSystem::try_from(old);
        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion { found }) if found == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn restore_rejects_forward_parent_reference() {
        let bad = snapshot(
            vec![
                entry("child", Some(1), SnapshotKind::File),
                entry("dir", None, SnapshotKind::Directory),
            ],
            &[],
        );
        let error = FileSystem::try_from(bad).unwrap_err();
        assert!(matches!(
            error,
            SnapshotError::UnknownParent {
                index: 0,
                parent: 1
            }
        ));
    }

    #[test]
    fn restore_rejects_self_parent_reference() {
        let bad = snapshot(vec![entry("loop", Some(0), SnapshotKind::Directory)], &[]);
        assert!(matches!(
            FileSystem::try_from(bad),
            Err(SnapshotError::UnknownParent { .. })
        ));
    }

    #[test]
    fn restore_rejects_duplicate_siblings() {
        let bad = snapshot(
            vec![
                entry("same", None, SnapshotKind::File),
                entry("same", None, SnapshotKind::Directory),
            ],
            &[],
        );
        assert!(matches!(
            FileSystem::try_from(bad),
            Err(SnapshotError::InvalidEntry {
                index: 1,
                source: FilesystemError::NameConflict { .. }
            })
        ));
    }

    #[test]
    fn restore_rejects_children_of_files() {
        let bad = snapshot(
            vec![
                entry("leaf", None, SnapshotKind::File),
                entry("inner", Some(0), SnapshotKind::File),
            ],
            &[],
        );
        assert!(matches!(
            FileSystem::try_from(bad),
            Err(SnapshotError::InvalidEntry {
                source: FilesystemError::InvalidOperation { .. },
                ..
            })
        ));
    }

    #[test]
    fn restore_rejects_invalid_names() {
        let bad = snapshot(vec![entry("a/b", None, SnapshotKind::Directory)], &[]);
        assert!(matches!(
            FileSystem::try_from(bad),
            Err(SnapshotError::InvalidEntry {
                source: FilesystemError::InvalidName { .. },
                ..
            })
        ));
    }

    #[test]
    fn restore_rejects_current_path_through_file() {
        let bad = snapshot(vec![entry("notes", None, SnapshotKind::File)], &["notes"]);
        let error = FileSystem::try_from(bad).unwrap_err();
        assert!(matches!(error, SnapshotError::DanglingCurrentPath { .. }));
        assert_eq!(
            error.to_string(),
            "Saved current directory /notes/ does not exist in the snapshot"
        );
    }

    #[test]
    fn restore_rejects_parent_segment_in_current_path() {
        let bad = snapshot(vec![entry("a", None, SnapshotKind::Directory)], &["a", ".."]);
        assert!(matches!(
            FileSystem::try_from(bad),
            Err(SnapshotError::DanglingCurrentPath { .. })
        ));
    }
}
