use snafu::{OptionExt, Snafu, ensure};
use tracing::debug;

use super::node::{EntryKind, EntryKindTag, Node, NodeId};

const PARENT_DIRECTORY: &str = "..";
const TREE_INDENT: &str = "\t";

/// In-memory hierarchy of directories and files with a movable current position.
///
/// Nodes are kept in an arena and addressed by [`NodeId`]. Children are owned
/// through their parent's child list; the parent link is a plain index used
/// only for walking upwards. Slots freed by removals are reused.
#[derive(Debug, Clone)]
pub struct FileSystem {
    nodes: Vec<Option<Node>>,
    free_slots: Vec<usize>,
    root: NodeId,
    current: NodeId,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    pub fn new() -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Some(Node::new(
                String::new(),
                None,
                EntryKind::empty_directory(),
            ))],
            free_slots: Vec::new(),
            root,
            current: root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_slots.len()
    }

    /// Names of the current directory's children, in insertion order.
    pub fn list(&self) -> Vec<&str> {
        self.get(self.current)
            .children()
            .iter()
            .map(|&child| self.get(child).name())
            .collect()
    }

    pub fn make_directory(&mut self, name: &str) -> Result<NodeId, FilesystemError> {
        self.create_in(self.current, name, EntryKindTag::Directory)
    }

    pub fn make_file(&mut self, name: &str) -> Result<NodeId, FilesystemError> {
        self.create_in(self.current, name, EntryKindTag::File)
    }

    pub fn change_directory(&mut self, name: &str) -> Result<(), FilesystemError> {
        if name == PARENT_DIRECTORY {
            let parent = self.get(self.current).parent().context(BoundarySnafu)?;
            self.current = parent;
            debug!("Moved up to {}", self.working_directory());
            return Ok(());
        }

        let (_, target) = self
            .find_child(self.current, name, EntryKindTag::Directory)
            .ok_or_else(|| not_found(name, EntryKindTag::Directory))?;
        self.current = target;
        debug!("Moved into {}", self.working_directory());
        Ok(())
    }

    /// Removes a file from the current directory. Directories are never matched.
    pub fn remove(&mut self, name: &str) -> Result<(), FilesystemError> {
        let (position, _) = self
            .find_child(self.current, name, EntryKindTag::File)
            .ok_or_else(|| not_found(name, EntryKindTag::File))?;
        self.detach(self.current, position);
        debug!("Removed file '{}'", name);
        Ok(())
    }

    /// Removes an empty directory from the current directory. Never recursive.
    pub fn remove_directory(&mut self, name: &str) -> Result<(), FilesystemError> {
        let (position, target) = self
            .find_child(self.current, name, EntryKindTag::Directory)
            .ok_or_else(|| not_found(name, EntryKindTag::Directory))?;
        ensure!(
            self.get(target).children().is_empty(),
            NotEmptySnafu { name }
        );
        self.detach(self.current, position);
        debug!("Removed directory '{}'", name);
        Ok(())
    }

    /// Absolute path of the current directory, e.g. `/a/b/`; root is `/`.
    pub fn working_directory(&self) -> String {
        self.path_components(self.current)
            .into_iter()
            .fold(String::from("/"), |mut path, name| {
                path.push_str(name);
                path.push('/');
                path
            })
    }

    /// Pre-order rendering of the subtree under the current directory, one
    /// line per node, indented by depth.
    pub fn tree(&self) -> Vec<String> {
        self.pre_order(self.current)
            .into_iter()
            .map(|(depth, node)| format!("{}{}", TREE_INDENT.repeat(depth), node))
            .collect()
    }

    /// Every node under `from`, itself included, in pre-order with its depth
    /// relative to `from`. Iterative, so tree depth is bounded only by memory.
    pub(crate) fn pre_order(&self, from: NodeId) -> Vec<(usize, &Node)> {
        let mut visited = Vec::new();
        let mut pending = vec![(from, 0usize)];

        while let Some((id, depth)) = pending.pop() {
            let node = self.get(id);
            visited.push((depth, node));
            pending.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }

        visited
    }

    /// Names of the directories leading from root down to `id`, root excluded.
    pub fn path_components(&self, id: NodeId) -> Vec<&str> {
        let mut components = Vec::new();
        let mut cursor = Some(id);

        while let Some(node) = cursor.map(|id| self.get(id)) {
            if node.is_root() {
                break;
            }
            components.push(node.name());
            cursor = node.parent();
        }

        components.reverse();
        components
    }

    /// Creates `name` under `parent` after checking the name and sibling uniqueness.
    /// Nothing is allocated or linked unless every check passes.
    pub(crate) fn create_in(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: EntryKindTag,
    ) -> Result<NodeId, FilesystemError> {
        ensure!(is_valid_name(name), InvalidNameSnafu { name });
        let name_taken = self
            .get(parent)
            .children()
            .iter()
            .any(|&child| self.get(child).name() == name);
        ensure!(!name_taken, NameConflictSnafu { name });

        let id = self.append_child(parent, name, kind)?;
        debug!("Created {} '{}' as {}", kind, name, id);
        Ok(id)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: EntryKindTag,
    ) -> Result<NodeId, FilesystemError> {
        ensure!(
            self.get(parent).is_directory(),
            InvalidOperationSnafu { name }
        );

        let node = Node::new(name.to_string(), Some(parent), kind.into());
        let id = match self.free_slots.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };

        if let Some(children) = self.get_mut(parent).children_mut() {
            children.push(id);
        }
        Ok(id)
    }

    /// First child of `dir` named `name` with the given kind, with its position.
    fn find_child(&self, dir: NodeId, name: &str, kind: EntryKindTag) -> Option<(usize, NodeId)> {
        self.get(dir)
            .children()
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, child)| {
                let node = self.get(child);
                node.name() == name && node.kind().tag() == kind
            })
    }

    /// Unlinks a leaf from its parent and releases its slot.
    fn detach(&mut self, dir: NodeId, position: usize) {
        let removed = self
            .get_mut(dir)
            .children_mut()
            .map(|children| children.remove(position));

        if let Some(removed) = removed {
            self.nodes[removed.0] = None;
            self.free_slots.push(removed.0);
        }
    }

    fn get(&self, id: NodeId) -> &Node {
        match self.node(id) {
            Some(node) => node,
            None => unreachable!("node {id} is not live"),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("node {id} is not live"),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != PARENT_DIRECTORY && !name.contains('/')
}

fn not_found(name: &str, expected: EntryKindTag) -> FilesystemError {
    NotFoundSnafu { name, expected }.build()
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum FilesystemError {
    #[snafu(display("{name} already exists"))]
    NameConflict { name: String },
    #[snafu(display("{name} is not a valid {expected}"))]
    NotFound { name: String, expected: EntryKindTag },
    #[snafu(display("{name} is not empty"))]
    NotEmpty { name: String },
    #[snafu(display("Cannot go above root directory"))]
    BoundaryError,
    #[snafu(display("Cannot add child to a file"))]
    InvalidOperation { name: String },
    #[snafu(display("'{name}' is not a valid name"))]
    InvalidName { name: String },
}
