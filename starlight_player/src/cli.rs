use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use starlight_engine::{EngineSettings, DEFAULT_IDLE_SECONDS};

use crate::script::ScriptedInput;

pub const GAME_TITLE: &str = "Starlight Urban Escape";

#[derive(Parser, Debug)]
#[command(about = "Plays a Starlight story from its scene graph", version)]
pub struct Args {
    /// Scene graph JSON listing every scene of the story
    #[arg(long, default_value = "configs/scenes_config.json")]
    pub scenes: PathBuf,

    /// Directory holding per-scene assets laid out as <scene_id>/<file>
    #[arg(long, default_value = "assets")]
    pub assets_root: PathBuf,

    /// Scene to enter once the event loop is running
    #[arg(long, default_value = "intro")]
    pub start_scene: String,

    /// Seconds the idle countdown runs before the player exits
    #[arg(long, default_value_t = DEFAULT_IDLE_SECONDS)]
    pub idle_seconds: u32,

    /// Delay between mounting a scene and starting its audio, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub mount_delay_ms: u64,

    /// Window title
    #[arg(long, default_value = GAME_TITLE)]
    pub title: String,

    /// Length reported for every track when playing without an audio device
    #[arg(long, default_value_t = 5.0)]
    pub silent_track_secs: f64,

    /// Never open the audio device, even when built with the `audio` feature
    #[arg(long)]
    pub mute: bool,

    /// Path to write the scene/audio event log as JSON on exit
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Scripted input replayed against the clock, e.g. "4:explore,12.5:close"
    #[arg(long, value_delimiter = ',')]
    pub choices: Vec<ScriptedInput>,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            Duration::try_from_secs_f64(self.silent_track_secs).is_ok(),
            "silent_track_secs must be a non-negative number of seconds (got {})",
            self.silent_track_secs
        );
        ensure!(
            !self.start_scene.trim().is_empty(),
            "start_scene must not be empty"
        );
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            idle_seconds: self.idle_seconds,
            mount_delay: Duration::from_millis(self.mount_delay_ms),
        }
    }

    pub fn silent_track_length(&self) -> Duration {
        Duration::try_from_secs_f64(self.silent_track_secs).unwrap_or_default()
    }
}
