//! # Surface
//!
//! The document the engine draws into. A surface owns the renderable nodes,
//! their class lists and scoped style variables, and the stylesheets that
//! give those classes meaning.
//!
//! [`MemorySurface`] keeps everything in an in-process [`SceneGraph`]; other
//! backends (a browser document, a native compositor) implement [`Surface`]
//! directly.

use crate::errors::{SurfaceError, SurfaceResult};
use crate::scene::{SceneGraph, SceneNode};
use crate::types::NodeId;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A tree of renderable nodes that the transition engine can manipulate.
///
/// All mutating calls are synchronous; the only suspension point a surface
/// exposes is [`Surface::next_frame`].
#[async_trait]
pub trait Surface: Send + Sync {
    /// Creates a detached node and returns its ID.
    fn create_element(&self, node: SceneNode) -> SurfaceResult<NodeId>;

    /// Deep-copies a subtree into a new detached node.
    fn snapshot(&self, id: NodeId) -> SurfaceResult<NodeId>;

    /// Appends `child` to `parent`, moving it if it is already attached elsewhere.
    fn append_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()>;

    /// Removes `child` from `parent`. Fails if it is not a direct child.
    fn remove_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()>;

    /// Returns true if `child` is a direct child of `parent`.
    fn contains(&self, parent: NodeId, child: NodeId) -> bool;

    /// Destroys a node and everything beneath it.
    fn destroy(&self, id: NodeId) -> SurfaceResult<()>;

    fn add_class(&self, id: NodeId, class: &str) -> SurfaceResult<()>;

    fn set_style_var(&self, id: NodeId, name: &str, value: &str) -> SurfaceResult<()>;

    /// Forces pending style changes under `id` to be committed, so that a later
    /// class change is observed as a transition rather than a jump.
    fn flush_layout(&self, id: NodeId) -> SurfaceResult<()>;

    /// Resolves at the start of the next animation frame.
    async fn next_frame(&self);

    fn has_stylesheet(&self, id: &str) -> bool;

    fn insert_stylesheet(&self, id: &str, css: &str) -> SurfaceResult<()>;
}

/// Frame interval used by [`MemorySurface`] unless overridden (~60fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// An in-memory surface backed by a shared [`SceneGraph`].
///
/// Cloning is cheap and every clone sees the same document.
#[derive(Clone)]
pub struct MemorySurface {
    graph: Arc<Mutex<SceneGraph>>,
    stats: Arc<Mutex<SurfaceStats>>,
    frame_interval: Duration,
}

/// Counters for side effects that leave no trace in the graph itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub layout_flushes: usize,
    pub frames: usize,
    pub stylesheet_inserts: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            graph: Arc::new(Mutex::new(SceneGraph::new())),
            stats: Arc::new(Mutex::new(SurfaceStats::default())),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Locks the underlying scene graph.
    ///
    /// A poisoned lock is recovered: the graph has no invariants that a
    /// panicking reader could have left half-updated.
    pub fn graph(&self) -> MutexGuard<'_, SceneGraph> {
        self.graph.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stats(&self) -> SurfaceStats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Renders a subtree as markup.
    pub fn markup(&self, id: NodeId) -> String {
        self.graph().to_markup(id)
    }

    /// Returns the children of `id`, or an empty list if it doesn't exist.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.graph()
            .get_node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn bump(&self, f: impl FnOnce(&mut SurfaceStats)) {
        f(&mut self.stats.lock().unwrap_or_else(|e| e.into_inner()));
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Surface for MemorySurface {
    fn create_element(&self, node: SceneNode) -> SurfaceResult<NodeId> {
        Ok(self.graph().add_node(node))
    }

    fn snapshot(&self, id: NodeId) -> SurfaceResult<NodeId> {
        self.graph().snapshot(id)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.graph().append_child(parent, child)
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.graph().remove_child(parent, child)
    }

    fn contains(&self, parent: NodeId, child: NodeId) -> bool {
        self.graph().contains(parent, child)
    }

    fn destroy(&self, id: NodeId) -> SurfaceResult<()> {
        let mut graph = self.graph();
        if graph.get_node(id).is_none() {
            return Err(SurfaceError::NodeNotFound(id));
        }
        graph.destroy_node(id);
        Ok(())
    }

    fn add_class(&self, id: NodeId, class: &str) -> SurfaceResult<()> {
        let mut graph = self.graph();
        let node = graph
            .get_node_mut(id)
            .ok_or(SurfaceError::NodeNotFound(id))?;
        node.add_class(class);
        Ok(())
    }

    fn set_style_var(&self, id: NodeId, name: &str, value: &str) -> SurfaceResult<()> {
        let mut graph = self.graph();
        let node = graph
            .get_node_mut(id)
            .ok_or(SurfaceError::NodeNotFound(id))?;
        node.style_vars.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn flush_layout(&self, id: NodeId) -> SurfaceResult<()> {
        if self.graph().get_node(id).is_none() {
            return Err(SurfaceError::NodeNotFound(id));
        }
        self.bump(|s| s.layout_flushes += 1);
        Ok(())
    }

    async fn next_frame(&self) {
        tokio::time::sleep(self.frame_interval).await;
        self.bump(|s| s.frames += 1);
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.graph().stylesheets.contains_key(id)
    }

    fn insert_stylesheet(&self, id: &str, css: &str) -> SurfaceResult<()> {
        self.graph()
            .stylesheets
            .insert(id.to_string(), css.to_string());
        self.bump(|s| s.stylesheet_inserts += 1);
        Ok(())
    }
}
