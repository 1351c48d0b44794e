use crate::{
    core::constants::API_KEY_SCENE_PATH,
    engine::RenderEngine,
    scene::style::StyleSelection,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// One scene override: a component path and the YAML value to put there
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneUpdate {
    pub path: String,
    pub value: String,
}

impl SceneUpdate {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Which engine entry point a style load goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Sync,
    Async,
}

/// Pending scene overrides plus the API key every style load must carry.
///
/// Updates keep insertion order and are never deduplicated; the engine
/// lets later entries for a path win.
#[derive(Debug, Default)]
pub struct SceneUpdateQueue {
    pending: Vec<SceneUpdate>,
    api_key: Option<String>,
}

impl SceneUpdateQueue {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            pending: Vec::new(),
            api_key,
        }
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    pub fn has_api_key(&self) -> bool {
        self.usable_api_key().is_some()
    }

    pub fn queue(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.pending.push(SceneUpdate::new(path, value));
    }

    pub fn queue_all<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = SceneUpdate>,
    {
        self.pending.extend(updates);
    }

    pub fn pending(&self) -> &[SceneUpdate] {
        &self.pending
    }

    /// Hands every pending update to the engine in one command, even when empty
    pub fn apply(&mut self, engine: &mut dyn RenderEngine) {
        let updates = std::mem::take(&mut self.pending);
        log::debug!("applying {} scene update(s)", updates.len());
        engine.apply_scene_updates(&updates);
    }

    /// Loads a built-in style with `extra` and the API key appended to the queue.
    ///
    /// The API key update always goes last so no caller-supplied update can
    /// shadow it. Nothing is queued when the key is missing. Returns the
    /// scene file name that was requested.
    pub fn load_style(
        &mut self,
        engine: &mut dyn RenderEngine,
        style: StyleSelection,
        extra: Vec<SceneUpdate>,
        mode: LoadMode,
    ) -> Result<&'static str> {
        let api_key = self
            .usable_api_key()
            .ok_or(MapError::MissingApiKey)?
            .to_string();

        self.pending.extend(extra);
        self.pending
            .push(SceneUpdate::new(API_KEY_SCENE_PATH, api_key));

        let file_name = style.file_name();
        let updates = std::mem::take(&mut self.pending);
        log::info!(
            "loading style {} ({}) with {} update(s), {:?}",
            style,
            file_name,
            updates.len(),
            mode
        );
        match mode {
            LoadMode::Sync => engine.load_scene(file_name, &updates),
            LoadMode::Async => engine.load_scene_async(file_name, &updates),
        }
        Ok(file_name)
    }

    fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
