use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::config::{SceneConfig, SceneRecord};

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a JSON array of scene entries.
pub fn parse_scenes(raw: &str) -> serde_json::Result<Vec<SceneConfig>> {
    let records: Vec<SceneRecord> = serde_json::from_str(raw)?;
    Ok(records.into_iter().map(SceneConfig::from).collect())
}

pub fn load_scenes(path: &Path) -> Result<Vec<SceneConfig>, SceneLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| SceneLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenes(&raw).map_err(|source| SceneLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_scenes`], but a missing or malformed file degrades to an empty
/// list so the player can still come up.
pub fn load_scenes_or_empty(path: &Path) -> Vec<SceneConfig> {
    match load_scenes(path) {
        Ok(scenes) => scenes,
        Err(err) => {
            log::warn!("{err}: {}", error_chain(&err));
            Vec::new()
        }
    }
}

fn error_chain(err: &SceneLoadError) -> String {
    match err {
        SceneLoadError::Io { source, .. } => source.to_string(),
        SceneLoadError::Parse { source, .. } => source.to_string(),
    }
}

/// Keyed lookup of every scene in the story, built once at startup.
#[derive(Debug, Default, Clone)]
pub struct SceneRegistry {
    scenes: HashMap<String, SceneConfig>,
}

impl SceneRegistry {
    /// Builds the registry. When an id appears twice the first entry is kept.
    pub fn new<I>(configs: I) -> Self
    where
        I: IntoIterator<Item = SceneConfig>,
    {
        let mut scenes: HashMap<String, SceneConfig> = HashMap::new();
        for config in configs {
            if scenes.contains_key(&config.scene_id) {
                log::warn!(
                    "duplicate scene id {}; keeping the first definition",
                    config.scene_id
                );
                continue;
            }
            scenes.insert(config.scene_id.clone(), config);
        }
        SceneRegistry { scenes }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SceneLoadError> {
        Ok(Self::new(load_scenes(path)?))
    }

    pub fn from_json_file_or_empty(path: &Path) -> Self {
        Self::new(load_scenes_or_empty(path))
    }

    pub fn get(&self, scene_id: &str) -> Option<&SceneConfig> {
        self.scenes.get(scene_id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scene ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaType;

    #[test]
    fn first_duplicate_wins() {
        let registry = SceneRegistry::new(vec![
            SceneConfig::new("intro", "first.png", MediaType::Image),
            SceneConfig::new("intro", "second.png", MediaType::Image),
            SceneConfig::new("street", "street.mp4", MediaType::Video),
        ]);
        assert_eq!(registry.len(), 2);
        let intro = registry.get("intro").expect("intro registered");
        assert_eq!(intro.media_source, "first.png");
        assert_eq!(registry.ids(), vec!["intro", "street"]);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = SceneRegistry::default();
        assert!(registry.get("nowhere").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(parse_scenes(r#"{"scene_id": "intro"}"#).is_err());
    }
}
