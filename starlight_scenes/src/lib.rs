pub mod assets;
pub mod config;
pub mod registry;

pub use assets::{AssetLayout, FsSubtitles, SubtitleSource, SUBTITLE_FILE};
pub use config::{ButtonConfig, MediaType, Rgba, SceneConfig, TextStyle, MAX_BACKOFF_SECONDS};
pub use registry::{load_scenes, load_scenes_or_empty, parse_scenes, SceneLoadError, SceneRegistry};
