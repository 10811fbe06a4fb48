use starlight_scenes::{AssetLayout, SceneConfig, SubtitleSource};

use crate::audio::{AudioBackend, AudioFinished, AudioPlaybackController};
use crate::countdown::IdleCountdown;
use crate::observer::EngineObserver;
use crate::render::{countdown_text, Renderer, ViewHandle};
use crate::timer::{TimerHandle, TimerService, TimerSet};
use crate::{EngineSettings, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Building,
    MediaLoaded,
    AudioFinished,
    EndgameTransition,
    IdleCountdown,
    Terminated,
    Ended,
}

/// What the scene asks of the application after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneDirective {
    TransitionTo(String),
    Terminate,
}

/// Collaborators a scene needs while it is running.
pub struct SceneContext<'a> {
    pub timers: &'a mut dyn TimerService<TimerEvent>,
    pub renderer: &'a mut dyn Renderer,
    pub audio: &'a mut dyn AudioBackend,
    pub subtitles: &'a dyn SubtitleSource,
    pub observer: &'a dyn EngineObserver,
}

/// One live visit to a scene. A fresh instance is built on every entry.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    assets: AssetLayout,
    settings: EngineSettings,
    phase: ScenePhase,
    view: Option<ViewHandle>,
    audio: AudioPlaybackController,
    countdown: IdleCountdown,
    timers: TimerSet,
}

impl Scene {
    pub fn new(config: SceneConfig, assets: AssetLayout, settings: EngineSettings) -> Self {
        let audio_path = config
            .audio_source
            .as_deref()
            .map(|source| assets.scene_file(&config.scene_id, source));
        let audio =
            AudioPlaybackController::new(audio_path, config.audio_repeat_count, config.backoff());
        let countdown = IdleCountdown::new(settings.idle_seconds);
        Self {
            config,
            assets,
            settings,
            phase: ScenePhase::Building,
            view: None,
            audio,
            countdown,
            timers: TimerSet::new(),
        }
    }

    pub fn scene_id(&self) -> &str {
        &self.config.scene_id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    pub fn audio(&self) -> &AudioPlaybackController {
        &self.audio
    }

    pub fn countdown(&self) -> &IdleCountdown {
        &self.countdown
    }

    pub fn audio_play_count(&self) -> u32 {
        self.audio.play_count()
    }

    pub fn idle_seconds_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Every timer this scene and its components still hold.
    pub fn pending_timers(&self) -> usize {
        self.timers.len() + self.audio.pending_timers() + self.countdown.pending_timers()
    }

    pub fn is_ended(&self) -> bool {
        self.phase == ScenePhase::Ended
    }

    /// Builds the view and arms the delayed audio start. Returns `None` if
    /// the scene was already activated or has ended.
    pub fn activate(&mut self, ctx: &mut SceneContext<'_>) -> Option<ViewHandle> {
        if self.phase != ScenePhase::Building {
            return None;
        }
        let scene_id = self.config.scene_id.as_str();
        let view = ctx.renderer.open_view(scene_id);

        let media_path = self.assets.scene_file(scene_id, &self.config.media_source);
        ctx.renderer
            .render_media(view, &media_path, self.config.media_type);

        if self.config.has_subtitle {
            let text = ctx
                .subtitles
                .read_text(&self.assets.subtitle_path(scene_id))
                .unwrap_or_default();
            ctx.renderer
                .render_subtitle(view, text.trim_end(), &self.config.text_style);
        }

        let buttons = self.config.buttons();
        if !buttons.is_empty() {
            ctx.renderer.render_buttons(view, buttons);
        }
        ctx.renderer.render_close_control(view);
        ctx.renderer.render_countdown_text(view, "");

        self.timers.track(
            ctx.timers
                .after(self.settings.mount_delay, TimerEvent::MountAudio),
        );
        self.view = Some(view);
        self.phase = ScenePhase::MediaLoaded;
        Some(view)
    }

    pub fn handle_timer(
        &mut self,
        handle: TimerHandle,
        event: TimerEvent,
        ctx: &mut SceneContext<'_>,
    ) -> Option<SceneDirective> {
        if self.phase == ScenePhase::Ended {
            return None;
        }
        match event {
            TimerEvent::MountAudio => {
                self.timers.forget(handle);
                self.start_audio(ctx)
            }
            TimerEvent::AudioResume => {
                self.audio.resume(handle);
                None
            }
            TimerEvent::CountdownGrace => {
                let remaining = self.countdown.on_grace(ctx.timers, handle)?;
                self.show_countdown(ctx, remaining);
                None
            }
            TimerEvent::CountdownTick => {
                let tick = self.countdown.on_tick(ctx.timers)?;
                self.show_countdown(ctx, tick.remaining);
                ctx.observer
                    .countdown_tick(&self.config.scene_id, tick.remaining);
                if !tick.expired {
                    return None;
                }
                log::info!("scene {} idle countdown expired", self.config.scene_id);
                self.phase = ScenePhase::Terminated;
                Some(SceneDirective::Terminate)
            }
        }
    }

    /// Checks the audio track for a natural end and advances the repeat
    /// sequence.
    pub fn pump_audio(&mut self, ctx: &mut SceneContext<'_>) -> Option<SceneDirective> {
        if self.phase == ScenePhase::Ended || !self.audio.poll_ended() {
            return None;
        }
        let finished = self.audio.handle_track_ended(ctx.timers)?;
        self.on_audio_finished(finished, ctx)
    }

    /// Tears down every pending piece of work. Returns `false` when the scene
    /// had already ended.
    pub fn deactivate(&mut self, timers: &mut dyn TimerService<TimerEvent>) -> bool {
        if self.phase == ScenePhase::Ended {
            return false;
        }
        self.phase = ScenePhase::Ended;
        self.audio.stop(timers);
        self.countdown.cancel(timers);
        self.timers.cancel_all(timers);
        true
    }

    fn start_audio(&mut self, ctx: &mut SceneContext<'_>) -> Option<SceneDirective> {
        if self.phase != ScenePhase::MediaLoaded {
            return None;
        }
        if self.config.audio_source.is_some() {
            ctx.observer.audio_started(&self.config.scene_id);
        }
        let finished = self.audio.start(ctx.audio)?;
        self.on_audio_finished(finished, ctx)
    }

    fn on_audio_finished(
        &mut self,
        finished: AudioFinished,
        ctx: &mut SceneContext<'_>,
    ) -> Option<SceneDirective> {
        self.phase = ScenePhase::AudioFinished;
        ctx.observer
            .audio_finished(&self.config.scene_id, finished.plays);

        if let Some(fallback) = self.config.fallback_scene_id.clone() {
            log::info!(
                "scene {} finished after {} plays; falling back to {}",
                self.config.scene_id,
                finished.plays,
                fallback
            );
            self.phase = ScenePhase::EndgameTransition;
            return Some(SceneDirective::TransitionTo(fallback));
        }

        log::info!(
            "scene {} finished after {} plays; idle countdown armed",
            self.config.scene_id,
            finished.plays
        );
        self.countdown.start(
            ctx.timers,
            self.settings.idle_seconds,
            self.config.backoff(),
        );
        self.phase = ScenePhase::IdleCountdown;
        None
    }

    fn show_countdown(&self, ctx: &mut SceneContext<'_>, remaining: u32) {
        if let Some(view) = self.view {
            ctx.renderer
                .render_countdown_text(view, &countdown_text(remaining));
        }
    }
}
