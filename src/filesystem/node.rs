use std::fmt;

use derive_more::Display;

/// Index of a node inside the [`FileSystem`](super::FileSystem) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct NodeId(pub(super) usize);

/// Which of the two entry types a name refers to, without any payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKindTag {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// Payload of a node: directories own an ordered list of children, files own nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory { children: Vec<NodeId> },
}

impl EntryKind {
    pub fn empty_directory() -> Self {
        EntryKind::Directory {
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> EntryKindTag {
        match self {
            EntryKind::File => EntryKindTag::File,
            EntryKind::Directory { .. } => EntryKindTag::Directory,
        }
    }
}

impl From<EntryKindTag> for EntryKind {
    fn from(tag: EntryKindTag) -> Self {
        match tag {
            EntryKindTag::File => EntryKind::File,
            EntryKindTag::Directory => EntryKind::empty_directory(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: EntryKind,
}

impl Node {
    pub(super) fn new(name: String, parent: Option<NodeId>, kind: EntryKind) -> Self {
        Self { name, parent, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-owning link used only to walk upwards.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Children in insertion order; always empty for files.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            EntryKind::Directory { children } => children,
            EntryKind::File => &[],
        }
    }

    pub(super) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            EntryKind::Directory { children } => Some(children),
            EntryKind::File => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Directory { .. } => write!(f, "{} <directory>", self.name),
            EntryKind::File => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_renders_with_tag() {
        let node = Node::new("docs".into(), Some(NodeId(0)), EntryKind::empty_directory());
        assert_eq!(node.to_string(), "docs <directory>");
    }

    #[test]
    fn file_renders_as_plain_name() {
        let node = Node::new("notes.txt".into(), Some(NodeId(0)), EntryKind::File);
        assert_eq!(node.to_string(), "notes.txt");
    }

    #[test]
    fn root_renders_with_empty_name() {
        let root = Node::new(String::new(), None, EntryKind::empty_directory());
        assert!(root.is_root());
        assert_eq!(root.to_string(), " <directory>");
    }

    #[test]
    fn file_never_reports_children() {
        let mut node = Node::new("f".into(), Some(NodeId(0)), EntryKind::File);
        assert!(node.children().is_empty());
        assert!(node.children_mut().is_none());
    }

    #[test]
    fn kind_tags_display_lowercase() {
        assert_eq!(EntryKindTag::File.to_string(), "file");
        assert_eq!(EntryKindTag::Directory.to_string(), "directory");
        assert_eq!(EntryKind::from(EntryKindTag::Directory).tag(), EntryKindTag::Directory);
    }
}
