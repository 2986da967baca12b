#![allow(dead_code)]

use async_trait::async_trait;
use luma_core::errors::SurfaceResult;
use luma_core::{MemorySurface, NodeId, SceneNode, SceneTransitionEngine, Surface, SurfaceError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FRAME: Duration = Duration::from_millis(16);

/// Installs a test subscriber once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A live container plus a set of scenes, none of them mounted.
pub struct Board {
    pub surface: MemorySurface,
    pub live: NodeId,
    pub scenes: Vec<NodeId>,
}

impl Board {
    pub fn new(scene_names: &[&str]) -> Self {
        init_tracing();
        let surface = MemorySurface::new().with_frame_interval(FRAME);
        let live = surface
            .create_element(SceneNode::new("main").with_class("luma-board"))
            .unwrap();
        let scenes = scene_names
            .iter()
            .map(|name| build_scene(&surface, name))
            .collect();
        Self {
            surface,
            live,
            scenes,
        }
    }

    /// Mounts scene `index` directly, as if it were shown at startup.
    pub fn mount(&self, index: usize) -> NodeId {
        let scene = self.scenes[index];
        self.surface.append_child(self.live, scene).unwrap();
        scene
    }

    pub fn engine(&self) -> SceneTransitionEngine {
        SceneTransitionEngine::new(Arc::new(self.surface.clone()), self.live).unwrap()
    }

    pub fn live_children(&self) -> Vec<NodeId> {
        self.surface.children(self.live)
    }

    /// Asserts that only `scene` is mounted and no transition container is left behind.
    pub fn assert_only(&self, scene: NodeId) {
        assert_eq!(
            self.live_children(),
            vec![scene],
            "live container: {}",
            self.surface.markup(self.live)
        );
        assert!(
            !self.surface.markup(self.live).contains("luma-transition-container"),
            "leftover wrapper: {}",
            self.surface.markup(self.live)
        );
    }
}

/// A scene with a couple of widget nodes, like the layout engine would produce.
pub fn build_scene(surface: &MemorySurface, name: &str) -> NodeId {
    let scene = surface
        .create_element(SceneNode::new("section").with_class("luma-scene").with_label(name))
        .unwrap();
    let clock = surface
        .create_element(SceneNode::new("luma-clock").with_label("09:41"))
        .unwrap();
    let ticker = surface
        .create_element(SceneNode::new("luma-ticker").with_label("ACME +1.2%"))
        .unwrap();
    surface.append_child(scene, clock).unwrap();
    surface.append_child(scene, ticker).unwrap();
    scene
}

/// Surface operations that [`FaultySurface`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Fails the way a foreign backend would, through `SurfaceError::Backend`.
    CreateElement,
    Snapshot,
    AddClass,
    FlushLayout,
    SetStyleVar,
}

/// Wraps a [`MemorySurface`] and fails one kind of operation on demand.
pub struct FaultySurface {
    pub inner: MemorySurface,
    fault: Mutex<Option<Fault>>,
}

impl FaultySurface {
    pub fn new(inner: MemorySurface, fault: Fault) -> Self {
        Self {
            inner,
            fault: Mutex::new(Some(fault)),
        }
    }

    pub fn heal(&self) {
        *self.fault.lock().unwrap() = None;
    }

    fn check(&self, op: Fault) -> SurfaceResult<()> {
        let fault = *self.fault.lock().unwrap();
        match fault {
            Some(Fault::CreateElement) if op == Fault::CreateElement => {
                Err(anyhow::anyhow!("injected {:?} failure", op).into())
            }
            Some(fault) if fault == op => {
                Err(SurfaceError::Rejected(format!("injected {:?} failure", op)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Surface for FaultySurface {
    fn create_element(&self, node: SceneNode) -> SurfaceResult<NodeId> {
        self.check(Fault::CreateElement)?;
        self.inner.create_element(node)
    }

    fn snapshot(&self, id: NodeId) -> SurfaceResult<NodeId> {
        self.check(Fault::Snapshot)?;
        self.inner.snapshot(id)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.inner.append_child(parent, child)
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.inner.remove_child(parent, child)
    }

    fn contains(&self, parent: NodeId, child: NodeId) -> bool {
        self.inner.contains(parent, child)
    }

    fn destroy(&self, id: NodeId) -> SurfaceResult<()> {
        self.inner.destroy(id)
    }

    fn add_class(&self, id: NodeId, class: &str) -> SurfaceResult<()> {
        self.check(Fault::AddClass)?;
        self.inner.add_class(id, class)
    }

    fn set_style_var(&self, id: NodeId, name: &str, value: &str) -> SurfaceResult<()> {
        self.check(Fault::SetStyleVar)?;
        self.inner.set_style_var(id, name, value)
    }

    fn flush_layout(&self, id: NodeId) -> SurfaceResult<()> {
        self.check(Fault::FlushLayout)?;
        self.inner.flush_layout(id)
    }

    async fn next_frame(&self) {
        self.inner.next_frame().await
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.inner.has_stylesheet(id)
    }

    fn insert_stylesheet(&self, id: &str, css: &str) -> SurfaceResult<()> {
        self.inner.insert_stylesheet(id, css)
    }
}
