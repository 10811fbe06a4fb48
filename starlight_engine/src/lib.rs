//! Scene lifecycle and transition engine for the Starlight story player.
//!
//! Everything runs on one logical thread. Timers, audio completion and UI
//! input are fed into [`ApplicationController`] by the host loop, which in
//! tests is a manually advanced clock.

use std::time::Duration;

pub mod app;
pub mod audio;
pub mod countdown;
pub mod observer;
pub mod render;
pub mod scene;
pub mod timer;

pub use app::{ApplicationController, Collaborators, RunState};
pub use audio::{AudioBackend, AudioFinished, AudioPlaybackController, AudioTrack, PlaybackState};
pub use countdown::{CountdownState, CountdownTick, IdleCountdown};
pub use observer::{EngineEvent, EngineObserver, NullObserver, RecordingObserver};
pub use render::{countdown_text, Renderer, UiEvent, ViewHandle};
pub use scene::{Scene, SceneContext, SceneDirective, ScenePhase};
pub use timer::{TimerHandle, TimerQueue, TimerService, TimerSet};

pub const DEFAULT_IDLE_SECONDS: u32 = 10;
pub const DEFAULT_MOUNT_DELAY: Duration = Duration::from_secs(1);

/// Timer payloads. Each variant names the work to run when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The view has had time to lay out; start the audio sequence.
    MountAudio,
    /// Backoff between two plays of the scene audio elapsed.
    AudioResume,
    /// Grace period before the idle countdown becomes visible.
    CountdownGrace,
    /// One second of the idle countdown.
    CountdownTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Starting value of the idle countdown.
    pub idle_seconds: u32,
    /// Delay between mounting a scene and starting its audio.
    pub mount_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            idle_seconds: DEFAULT_IDLE_SECONDS,
            mount_delay: DEFAULT_MOUNT_DELAY,
        }
    }
}
