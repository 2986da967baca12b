use crate::errors::{SurfaceError, SurfaceResult};
use crate::types::NodeId;
use std::collections::BTreeMap;
use std::fmt::Write;

/// A renderable node in the scene graph.
///
/// Mirrors the small slice of a document element the transition engine cares
/// about: a tag, class list, scoped style variables and children. Widget
/// content is carried as an opaque text label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    /// Element tag (e.g. `"div"`, `"luma-clock"`).
    pub tag: String,
    /// Opaque text content rendered inside the element.
    pub label: Option<String>,
    /// Class names, in insertion order.
    pub classes: Vec<String>,
    /// Scoped custom properties (`--name: value`).
    pub style_vars: BTreeMap<String, String>,
    /// Indices of child nodes.
    pub children: Vec<NodeId>,
    /// Index of parent node.
    pub parent: Option<NodeId>,
}

impl SceneNode {
    /// Creates a new detached node with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if not already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

/// The Scene Graph data structure.
///
/// Manages the arena of nodes, their relationships, and the stylesheets
/// attached to the document they live in.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    /// The Arena of all nodes. `None` marks a destroyed slot.
    pub nodes: Vec<Option<SceneNode>>,
    /// Indices of nodes that have been removed and can be reused.
    pub free_indices: Vec<usize>,
    /// Document-level stylesheets keyed by id.
    pub stylesheets: BTreeMap<String, String>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new node to the arena and returns its ID. The node is detached.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        if let Some(id) = self.free_indices.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Recursively destroys a node and its children, freeing their indices for reuse.
    pub fn destroy_node(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (parent_id, children_ids) = (node.parent, node.children.clone());

        if let Some(pid) = parent_id {
            if let Some(p_node) = self.get_node_mut(pid) {
                p_node.children.retain(|&c| c != id);
            }
        }

        for child_id in children_ids {
            // Detach first so the child doesn't try to edit a parent that is going away.
            if let Some(child) = self.get_node_mut(child_id) {
                child.parent = None;
            }
            self.destroy_node(child_id);
        }

        self.nodes[id] = None;
        self.free_indices.push(id);
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// Like a document `appendChild`, a child that already has a parent is
    /// moved rather than duplicated.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SurfaceError::CycleDetected(child));
        }

        self.detach(child);
        if let Some(p_node) = self.get_node_mut(parent) {
            p_node.children.push(child);
        }
        if let Some(c_node) = self.get_node_mut(child) {
            c_node.parent = Some(parent);
        }
        Ok(())
    }

    /// Removes `child` from `parent`'s children list and clears its parent link.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.require(child)?;
        let p_node = self
            .get_node_mut(parent)
            .ok_or(SurfaceError::NodeNotFound(parent))?;
        let pos = p_node
            .children
            .iter()
            .position(|&x| x == child)
            .ok_or(SurfaceError::NotAChild { parent, child })?;
        p_node.children.remove(pos);

        if let Some(c_node) = self.get_node_mut(child) {
            c_node.parent = None;
        }
        Ok(())
    }

    /// Detaches a node from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.get_node(id).and_then(|n| n.parent);
        if let Some(pid) = parent {
            // The parent link was just read, so the child is present.
            let _ = self.remove_child(pid, id);
        }
    }

    /// Returns true if `child` is a direct child of `parent`.
    pub fn contains(&self, parent: NodeId, child: NodeId) -> bool {
        self.get_node(parent)
            .map(|p| p.children.contains(&child))
            .unwrap_or(false)
    }

    /// Returns true if `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.get_node(id).and_then(|n| n.parent);
        while let Some(pid) = current {
            if pid == ancestor {
                return true;
            }
            current = self.get_node(pid).and_then(|n| n.parent);
        }
        false
    }

    /// Deep-copies the subtree rooted at `id` into fresh, detached nodes.
    pub fn snapshot(&mut self, id: NodeId) -> SurfaceResult<NodeId> {
        let node = self.require(id)?.clone();
        let copy = self.add_node(SceneNode {
            children: Vec::new(),
            parent: None,
            ..node.clone()
        });
        for child in node.children {
            let child_copy = self.snapshot(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Returns a mutable reference to the SceneNode.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Returns a shared reference to the SceneNode.
    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    /// Returns the number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the subtree rooted at `id` as markup, for logs and assertions.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let _ = write!(out, "<{}", node.tag);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", node.classes.join(" "));
        }
        if !node.style_vars.is_empty() {
            let vars: Vec<String> = node
                .style_vars
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " style=\"{}\"", vars.join("; "));
        }
        out.push('>');
        if let Some(label) = &node.label {
            out.push_str(label);
        }
        for &child in &node.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }

    fn require(&self, id: NodeId) -> SurfaceResult<&SceneNode> {
        self.get_node(id).ok_or(SurfaceError::NodeNotFound(id))
    }
}
