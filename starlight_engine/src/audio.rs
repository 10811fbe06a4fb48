use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::timer::{TimerHandle, TimerService, TimerSet};
use crate::TimerEvent;

/// One loaded audio asset.
pub trait AudioTrack {
    fn play(&mut self);
    fn stop(&mut self);
    fn seek_to_start(&mut self);
    /// Reports a natural end of playback, once per end. An explicit `stop()`
    /// does not count as an end.
    fn poll_ended(&mut self) -> bool;
}

pub trait AudioBackend {
    /// Returns `None` when the asset is missing or cannot be decoded.
    fn load(&mut self, path: &Path) -> Option<Box<dyn AudioTrack>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Waiting,
    Finished,
    Stopped,
}

/// Emitted once when the repeat sequence is over, or immediately when there
/// is nothing to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFinished {
    pub plays: u32,
}

/// Plays a scene's track `repeat_count` times with a backoff pause between
/// plays.
pub struct AudioPlaybackController {
    source: Option<PathBuf>,
    repeat_count: u32,
    backoff: Duration,
    track: Option<Box<dyn AudioTrack>>,
    subscribed: bool,
    state: PlaybackState,
    play_count: u32,
    backoff_waits: u32,
    timers: TimerSet,
}

impl AudioPlaybackController {
    pub fn new(source: Option<PathBuf>, repeat_count: u32, backoff: Duration) -> Self {
        Self {
            source,
            repeat_count: repeat_count.max(1),
            backoff,
            track: None,
            subscribed: false,
            state: PlaybackState::Idle,
            play_count: 0,
            backoff_waits: 0,
            timers: TimerSet::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    /// Number of backoff pauses scheduled so far.
    pub fn backoff_waits(&self) -> u32 {
        self.backoff_waits
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn start(&mut self, backend: &mut dyn AudioBackend) -> Option<AudioFinished> {
        if self.state != PlaybackState::Idle {
            return None;
        }
        self.play_count = 0;

        let Some(path) = self.source.as_deref() else {
            self.state = PlaybackState::Finished;
            return Some(AudioFinished { plays: 0 });
        };
        let Some(mut track) = backend.load(path) else {
            log::warn!("audio {} could not be loaded; skipping", path.display());
            self.state = PlaybackState::Finished;
            return Some(AudioFinished { plays: 0 });
        };

        track.play();
        self.track = Some(track);
        self.subscribed = true;
        self.state = PlaybackState::Playing;
        None
    }

    /// Polls the track for a natural end while subscribed.
    pub fn poll_ended(&mut self) -> bool {
        if !self.subscribed {
            return false;
        }
        self.track
            .as_mut()
            .map_or(false, |track| track.poll_ended())
    }

    pub fn handle_track_ended(
        &mut self,
        timers: &mut dyn TimerService<TimerEvent>,
    ) -> Option<AudioFinished> {
        if !self.subscribed || self.state != PlaybackState::Playing {
            return None;
        }
        self.play_count += 1;

        if self.play_count < self.repeat_count {
            self.state = PlaybackState::Waiting;
            self.backoff_waits += 1;
            self.timers
                .track(timers.after(self.backoff, TimerEvent::AudioResume));
            log::debug!(
                "audio play {}/{} ended; resuming in {:?}",
                self.play_count,
                self.repeat_count,
                self.backoff
            );
            return None;
        }

        self.subscribed = false;
        if let Some(track) = self.track.as_mut() {
            track.stop();
        }
        self.state = PlaybackState::Finished;
        Some(AudioFinished {
            plays: self.play_count,
        })
    }

    /// Backoff timer fired: replay from the start.
    pub fn resume(&mut self, handle: TimerHandle) {
        self.timers.forget(handle);
        if self.state != PlaybackState::Waiting {
            return;
        }
        if let Some(track) = self.track.as_mut() {
            track.seek_to_start();
            track.play();
        }
        self.state = PlaybackState::Playing;
    }

    /// Unsubscribes before stopping so a stop never counts as an end. Never
    /// emits [`AudioFinished`].
    pub fn stop(&mut self, timers: &mut dyn TimerService<TimerEvent>) {
        self.subscribed = false;
        if let Some(track) = self.track.as_mut() {
            track.stop();
        }
        self.timers.cancel_all(timers);
        if self.state != PlaybackState::Finished {
            self.state = PlaybackState::Stopped;
        }
    }
}

impl std::fmt::Debug for AudioPlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlaybackController")
            .field("source", &self.source)
            .field("repeat_count", &self.repeat_count)
            .field("backoff", &self.backoff)
            .field("state", &self.state)
            .field("play_count", &self.play_count)
            .field("subscribed", &self.subscribed)
            .finish()
    }
}
