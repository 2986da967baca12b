//! Playlist files: the scenes on a board and the order they are shown in.

use anyhow::{bail, Context, Result};
use luma_core::{ConfigUpdate, MemorySurface, NodeId, SceneNode, Surface};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Playlist {
    /// Preset applied before `config`.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub config: Option<ConfigUpdate>,
    pub scenes: Vec<SceneSpec>,
    /// Scene mounted at startup. Defaults to the first scene.
    #[serde(default)]
    pub start: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSpec {
    pub name: String,
    /// Widget tags, e.g. `"luma-clock"`.
    #[serde(default)]
    pub widgets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub to: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub configure: Option<ConfigUpdate>,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub enable: bool,
}

impl Playlist {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading playlist {}", path.display()))?;
        let playlist: Playlist = serde_json::from_str(&raw)
            .with_context(|| format!("parsing playlist {}", path.display()))?;
        playlist.validate()?;
        Ok(playlist)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scenes.is_empty() {
            bail!("playlist has no scenes");
        }
        let mut seen = HashMap::new();
        for (i, scene) in self.scenes.iter().enumerate() {
            if let Some(prev) = seen.insert(scene.name.as_str(), i) {
                bail!("scene '{}' defined twice (#{} and #{})", scene.name, prev, i);
            }
        }
        if let Some(start) = &self.start {
            if !seen.contains_key(start.as_str()) {
                bail!("start scene '{}' is not defined", start);
            }
        }
        for (i, step) in self.steps.iter().enumerate() {
            if !seen.contains_key(step.to.as_str()) {
                bail!("step #{} targets unknown scene '{}'", i, step.to);
            }
            if step.enable && step.disable {
                bail!("step #{} both enables and disables transitions", i);
            }
        }
        Ok(())
    }

    pub fn start_scene(&self) -> &str {
        self.start
            .as_deref()
            .unwrap_or_else(|| self.scenes[0].name.as_str())
    }
}

/// The scenes of a playlist, built on a surface.
pub struct Board {
    pub live: NodeId,
    pub scenes: HashMap<String, NodeId>,
}

impl Board {
    /// Builds every scene and mounts the start scene into a fresh live container.
    pub fn build(playlist: &Playlist, surface: &MemorySurface) -> Result<Self> {
        let live = surface.create_element(SceneNode::new("main").with_class("luma-board"))?;

        let mut scenes = HashMap::new();
        for spec in &playlist.scenes {
            let root = surface.create_element(
                SceneNode::new("section")
                    .with_class("luma-scene")
                    .with_label(spec.name.as_str()),
            )?;
            for tag in &spec.widgets {
                let widget = surface.create_element(SceneNode::new(tag.as_str()))?;
                surface.append_child(root, widget)?;
            }
            scenes.insert(spec.name.clone(), root);
        }

        let board = Self { live, scenes };
        surface.append_child(live, board.scene(playlist.start_scene())?)?;
        Ok(board)
    }

    pub fn scene(&self, name: &str) -> Result<NodeId> {
        self.scenes
            .get(name)
            .copied()
            .with_context(|| format!("unknown scene '{}'", name))
    }
}
