use std::rc::Rc;
use std::time::Duration;

use starlight_scenes::{AssetLayout, Rgba, SceneRegistry, SubtitleSource};

use crate::audio::AudioBackend;
use crate::observer::{EngineObserver, NullObserver};
use crate::render::{Renderer, UiEvent, ViewHandle};
use crate::scene::{Scene, SceneContext, SceneDirective};
use crate::timer::TimerQueue;
use crate::{EngineSettings, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Terminated,
}

/// Capabilities the controller drives, plus the timer queue they share.
pub struct Collaborators {
    timers: TimerQueue<TimerEvent>,
    renderer: Box<dyn Renderer>,
    audio: Box<dyn AudioBackend>,
    subtitles: Box<dyn SubtitleSource>,
    observer: Rc<dyn EngineObserver>,
}

impl Collaborators {
    pub fn new(
        renderer: Box<dyn Renderer>,
        audio: Box<dyn AudioBackend>,
        subtitles: Box<dyn SubtitleSource>,
    ) -> Self {
        Self {
            timers: TimerQueue::new(),
            renderer,
            audio,
            subtitles,
            observer: Rc::new(NullObserver),
        }
    }

    pub fn with_observer(mut self, observer: Rc<dyn EngineObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn context(&mut self) -> SceneContext<'_> {
        SceneContext {
            timers: &mut self.timers,
            renderer: self.renderer.as_mut(),
            audio: self.audio.as_mut(),
            subtitles: self.subtitles.as_ref(),
            observer: self.observer.as_ref(),
        }
    }
}

/// Owns the story registry and the single active scene, and performs every
/// transition between scenes.
pub struct ApplicationController {
    registry: SceneRegistry,
    assets: AssetLayout,
    settings: EngineSettings,
    io: Collaborators,
    current: Option<Scene>,
    clear_color: Rgba,
    state: RunState,
}

impl ApplicationController {
    pub fn new(
        registry: SceneRegistry,
        assets: AssetLayout,
        settings: EngineSettings,
        io: Collaborators,
    ) -> Self {
        Self {
            registry,
            assets,
            settings,
            io,
            current: None,
            clear_color: Rgba::default(),
            state: RunState::Running,
        }
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.as_ref()
    }

    pub fn current_view(&self) -> Option<ViewHandle> {
        self.current.as_ref().and_then(Scene::view)
    }

    pub fn clear_color(&self) -> Rgba {
        self.clear_color
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == RunState::Terminated
    }

    pub fn now(&self) -> Duration {
        self.io.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.io.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.io.timers.len()
    }

    /// Leaves the current scene (if any) and enters `scene_id`. An unknown id
    /// is logged and leaves no scene active.
    pub fn transition_to(&mut self, scene_id: &str) {
        if self.is_terminated() {
            log::debug!("ignoring transition to {scene_id} after termination");
            return;
        }
        self.exit_current();

        let Some(config) = self.registry.get(scene_id) else {
            log::warn!("transition target {scene_id} is not a known scene");
            self.io.observer.unknown_scene(scene_id);
            return;
        };

        log::info!("entering scene {scene_id}");
        let mut scene = Scene::new(config.clone(), self.assets.clone(), self.settings);

        self.clear_color = config.background_color;
        self.io.renderer.set_clear_color(self.clear_color);

        if let Some(view) = scene.activate(&mut self.io.context()) {
            self.io.renderer.mount(view);
        }
        self.io.observer.scene_entered(scene_id);
        self.current = Some(scene);
    }

    /// Ends the whole application. Safe to call more than once.
    pub fn terminate(&mut self) {
        if self.is_terminated() {
            return;
        }
        log::info!("terminating");
        self.exit_current();
        log::debug!(
            "timers fired: {}, cancelled: {}",
            self.io.timers.fired_total(),
            self.io.timers.cancelled_total()
        );
        self.io.renderer.shutdown();
        self.state = RunState::Terminated;
        self.io.observer.terminated();
    }

    pub fn handle_ui(&mut self, event: UiEvent) {
        match event {
            UiEvent::Choose { view, target } => {
                if self.current_view() != Some(view) {
                    log::debug!("ignoring choice {target} from stale view {view:?}");
                    return;
                }
                self.transition_to(&target);
            }
            UiEvent::Close => self.terminate(),
        }
    }

    /// Delivers every timer due at or before `now`, one at a time.
    pub fn advance_to(&mut self, now: Duration) {
        while !self.is_terminated() {
            let Some((handle, event)) = self.io.timers.pop_due(now) else {
                break;
            };
            log::trace!("timer {} fired: {event:?}", handle.id());
            let directive = match self.current.as_mut() {
                Some(scene) => scene.handle_timer(handle, event, &mut self.io.context()),
                None => {
                    log::warn!("timer {event:?} fired with no active scene");
                    None
                }
            };
            self.apply(directive);
        }
        self.io.timers.settle(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        let target = self.now() + delta;
        self.advance_to(target);
    }

    /// Lets the active scene observe a natural end of its audio track.
    pub fn pump_audio(&mut self) {
        if self.is_terminated() {
            return;
        }
        let directive = match self.current.as_mut() {
            Some(scene) => scene.pump_audio(&mut self.io.context()),
            None => None,
        };
        self.apply(directive);
    }

    fn apply(&mut self, directive: Option<SceneDirective>) {
        match directive {
            Some(SceneDirective::TransitionTo(target)) => self.transition_to(&target),
            Some(SceneDirective::Terminate) => self.terminate(),
            None => {}
        }
    }

    fn exit_current(&mut self) {
        let Some(mut scene) = self.current.take() else {
            return;
        };
        scene.deactivate(&mut self.io.timers);
        if let Some(view) = scene.view() {
            self.io.renderer.unmount(view);
        }
        log::info!("leaving scene {}", scene.scene_id());
        self.io
            .observer
            .scene_exited(scene.scene_id(), scene.audio_play_count());
    }
}
