// In-memory directory hierarchy used to simulate the container's
// filesystem while steps are abstractly interpreted.
// Arena-backed strict tree plus a cursor; nodes are added, never removed.

use std::collections::BTreeMap;

use crate::error::PathError;

/// Conventional top-level build directory.
pub const WORKSPACE_DIR: &str = "workspace";

/// Stable handle to a node in a `PathTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
}

/// Arena-backed directory tree.
///
/// Ownership flows strictly from parent to children; the parent link is a
/// navigational index only. Every non-root node has exactly one parent.
#[derive(Debug)]
pub struct PathTree {
    nodes: Vec<Node>,
}

impl PathTree {
    /// Create a tree containing only a root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.into(),
                parent: None,
                children: BTreeMap::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add a directory named `name` under `parent`.
    ///
    /// Idempotent: if the child already exists, its handle is returned.
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(&existing) = self.nodes[parent.0].children.get(name) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
            children: BTreeMap::new(),
        });
        self.nodes[parent.0].children.insert(name.to_string(), id);
        id
    }

    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[node.0].children.get(name).copied()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    /// Absolute `/`-joined path of `node`.
    pub fn path_of(&self, node: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cur = node;
        while let Some(parent) = self.nodes[cur.0].parent {
            segments.push(self.nodes[cur.0].name.as_str());
            cur = parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Nested textual outline of the whole tree, for diagnostics.
    /// Siblings print in lexicographic order so output is reproducible.
    pub fn render(&self) -> String {
        let mut out = String::from(".\n");
        self.render_children(self.root(), "", &mut out);
        out
    }

    fn render_children(&self, node: NodeId, prefix: &str, out: &mut String) {
        let children: Vec<NodeId> = self.nodes[node.0].children.values().copied().collect();
        for (i, child) in children.iter().enumerate() {
            let last = i == children.len() - 1;
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(self.name(*child));
            out.push('\n');
            let child_prefix = if last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            self.render_children(*child, &child_prefix, out);
        }
    }
}

/// A `PathTree` plus a current-position cursor, exposing the navigation
/// and creation operations the shell simulator and driver run against.
#[derive(Debug)]
pub struct VirtualFs {
    tree: PathTree,
    cwd: NodeId,
}

impl VirtualFs {
    /// Create a filesystem with a root, a fixed `workspace` child, and the
    /// cursor positioned at `workspace`.
    pub fn new() -> Self {
        let mut tree = PathTree::new("root");
        let root = tree.root();
        let workspace = tree.create_child(root, WORKSPACE_DIR);
        Self {
            tree,
            cwd: workspace,
        }
    }

    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    /// Absolute path of the cursor.
    pub fn cwd_path(&self) -> String {
        self.tree.path_of(self.cwd)
    }

    pub fn reset_to_root(&mut self) {
        self.cwd = self.tree.root();
    }

    pub fn reset_to_workspace(&mut self) {
        let root = self.tree.root();
        self.cwd = self.tree.create_child(root, WORKSPACE_DIR);
    }

    /// Move the cursor along `path`.
    ///
    /// Segment rules: an empty first segment resets to the root, `.` is a
    /// no-op, `..` moves to the parent (an error at the root), and any
    /// other segment descends into the same-named child, failing if
    /// absent. Atomic: on any failure the cursor stays where it was.
    pub fn navigate(&mut self, path: &str) -> Result<(), PathError> {
        let target = self.resolve(path)?;
        self.cwd = target;
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<NodeId, PathError> {
        let mut cursor = self.cwd;
        for (i, segment) in path.split('/').enumerate() {
            match segment {
                "" if i == 0 => cursor = self.tree.root(),
                "" | "." => {}
                ".." => {
                    cursor = self.tree.parent(cursor).ok_or_else(|| PathError::AboveRoot {
                        path: path.to_string(),
                    })?;
                }
                name => {
                    cursor = self.tree.child(cursor, name).ok_or_else(|| PathError::NotFound {
                        segment: name.to_string(),
                        path: path.to_string(),
                    })?;
                }
            }
        }
        Ok(cursor)
    }

    /// Create the directory named by the final segment of `path`.
    ///
    /// Intermediate segments are descended; a missing intermediate is
    /// created when `recursive`, otherwise the call fails there with no
    /// further changes. The final segment is created idempotently. The
    /// cursor never moves.
    pub fn make_directory(&mut self, path: &str, recursive: bool) -> Result<(), PathError> {
        let segments: Vec<&str> = path.split('/').collect();
        let mut cursor = self.cwd;
        for (i, segment) in segments.iter().enumerate() {
            let last = i == segments.len() - 1;
            match *segment {
                "" if i == 0 => cursor = self.tree.root(),
                "" | "." => {}
                ".." => {
                    cursor = self.tree.parent(cursor).ok_or_else(|| PathError::AboveRoot {
                        path: path.to_string(),
                    })?;
                }
                name if last => {
                    self.tree.create_child(cursor, name);
                }
                name => match self.tree.child(cursor, name) {
                    Some(child) => cursor = child,
                    None if recursive => cursor = self.tree.create_child(cursor, name),
                    None => {
                        return Err(PathError::MissingParent {
                            segment: name.to_string(),
                            path: path.to_string(),
                        })
                    }
                },
            }
        }
        Ok(())
    }

    /// Nested outline of the whole tree.
    pub fn render(&self) -> String {
        self.tree.render()
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}
