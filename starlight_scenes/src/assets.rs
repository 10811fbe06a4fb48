use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const SUBTITLE_FILE: &str = "subtitle.txt";

/// Resolves scene assets by the `{root}/{scene_id}/{file_name}` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn scene_file(&self, scene_id: &str, file_name: &str) -> PathBuf {
        self.root.join(scene_id).join(file_name)
    }

    pub fn subtitle_path(&self, scene_id: &str) -> PathBuf {
        self.scene_file(scene_id, SUBTITLE_FILE)
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new("assets")
    }
}

/// Supplies subtitle text. A missing file yields `None`, never an error.
pub trait SubtitleSource {
    fn read_text(&self, path: &Path) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsSubtitles;

impl SubtitleSource for FsSubtitles {
    fn read_text(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::warn!("subtitle not found at {}", path.display());
                None
            }
            Err(err) => {
                log::warn!("reading subtitle {}: {err}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_files_follow_the_directory_convention() {
        let layout = AssetLayout::new("data/assets");
        assert_eq!(
            layout.scene_file("intro", "bg.png"),
            Path::new("data/assets/intro/bg.png")
        );
        assert_eq!(
            layout.subtitle_path("intro"),
            Path::new("data/assets/intro/subtitle.txt")
        );
    }

    #[test]
    fn missing_subtitle_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.txt");
        assert_eq!(FsSubtitles.read_text(&path), None);

        fs::write(&path, "The city hums.").expect("write subtitle");
        let text = FsSubtitles.read_text(&path);
        assert_eq!(text.as_deref(), Some("The city hums."));
    }
}
