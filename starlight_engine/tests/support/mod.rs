#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use starlight_engine::{
    ApplicationController, AudioBackend, AudioTrack, Collaborators, EngineSettings,
    RecordingObserver, Renderer, ViewHandle,
};
use starlight_scenes::{
    AssetLayout, ButtonConfig, MediaType, Rgba, SceneConfig, SceneRegistry, SubtitleSource,
    TextStyle,
};

pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    OpenView { view: ViewHandle, scene_id: String },
    Media {
        view: ViewHandle,
        path: PathBuf,
        media_type: MediaType,
    },
    Subtitle { view: ViewHandle, text: String },
    Buttons {
        view: ViewHandle,
        labels: Vec<String>,
    },
    CloseControl { view: ViewHandle },
    Countdown { view: ViewHandle, text: String },
    ClearColor(Rgba),
    Mount(ViewHandle),
    Unmount(ViewHandle),
    Shutdown,
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Rc<RefCell<Vec<RenderCall>>>,
    next_view: Rc<Cell<u64>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.borrow().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, RenderCall::Shutdown))
            .count()
    }

    /// Non-empty countdown label updates, in order.
    pub fn countdown_texts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                RenderCall::Countdown { text, .. } if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: RenderCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn open_view(&mut self, scene_id: &str) -> ViewHandle {
        let view = ViewHandle(self.next_view.get() + 1);
        self.next_view.set(view.0);
        self.push(RenderCall::OpenView {
            view,
            scene_id: scene_id.to_string(),
        });
        view
    }

    fn render_media(&mut self, view: ViewHandle, path: &Path, media_type: MediaType) {
        self.push(RenderCall::Media {
            view,
            path: path.to_path_buf(),
            media_type,
        });
    }

    fn render_subtitle(&mut self, view: ViewHandle, text: &str, _style: &TextStyle) {
        self.push(RenderCall::Subtitle {
            view,
            text: text.to_string(),
        });
    }

    fn render_buttons(&mut self, view: ViewHandle, buttons: &[ButtonConfig]) {
        self.push(RenderCall::Buttons {
            view,
            labels: buttons.iter().map(|button| button.label.clone()).collect(),
        });
    }

    fn render_close_control(&mut self, view: ViewHandle) {
        self.push(RenderCall::CloseControl { view });
    }

    fn render_countdown_text(&mut self, view: ViewHandle, text: &str) {
        self.push(RenderCall::Countdown {
            view,
            text: text.to_string(),
        });
    }

    fn set_clear_color(&mut self, color: Rgba) {
        self.push(RenderCall::ClearColor(color));
    }

    fn mount(&mut self, view: ViewHandle) {
        self.push(RenderCall::Mount(view));
    }

    fn unmount(&mut self, view: ViewHandle) {
        self.push(RenderCall::Unmount(view));
    }

    fn shutdown(&mut self) {
        self.push(RenderCall::Shutdown);
    }
}

#[derive(Debug, Default)]
pub struct TrackLog {
    pub path: PathBuf,
    pub plays: u32,
    pub stops: u32,
    pub seeks: u32,
    pub playing: bool,
    ended: bool,
}

struct ScriptedTrack(Rc<RefCell<TrackLog>>);

impl AudioTrack for ScriptedTrack {
    fn play(&mut self) {
        let mut log = self.0.borrow_mut();
        log.plays += 1;
        log.playing = true;
    }

    fn stop(&mut self) {
        let mut log = self.0.borrow_mut();
        log.stops += 1;
        log.playing = false;
    }

    fn seek_to_start(&mut self) {
        self.0.borrow_mut().seeks += 1;
    }

    fn poll_ended(&mut self) -> bool {
        std::mem::take(&mut self.0.borrow_mut().ended)
    }
}

/// Audio backend whose tracks only end when the test says so.
#[derive(Clone, Default)]
pub struct ScriptedAudio {
    loaded: Rc<RefCell<Vec<Rc<RefCell<TrackLog>>>>>,
    missing: Rc<RefCell<HashSet<PathBuf>>>,
}

impl ScriptedAudio {
    pub fn mark_missing(&self, path: impl Into<PathBuf>) {
        self.missing.borrow_mut().insert(path.into());
    }

    pub fn loads(&self) -> usize {
        self.loaded.borrow().len()
    }

    pub fn last_track(&self) -> Option<Rc<RefCell<TrackLog>>> {
        self.loaded.borrow().last().cloned()
    }

    /// Simulates the most recently loaded track reaching its natural end.
    pub fn end_track(&self) {
        let track = self.last_track().expect("a track has been loaded");
        let mut log = track.borrow_mut();
        assert!(log.playing, "track {} is not playing", log.path.display());
        log.playing = false;
        log.ended = true;
    }
}

impl AudioBackend for ScriptedAudio {
    fn load(&mut self, path: &Path) -> Option<Box<dyn AudioTrack>> {
        if self.missing.borrow().contains(path) {
            return None;
        }
        let log = Rc::new(RefCell::new(TrackLog {
            path: path.to_path_buf(),
            ..TrackLog::default()
        }));
        self.loaded.borrow_mut().push(log.clone());
        Some(Box::new(ScriptedTrack(log)))
    }
}

#[derive(Clone, Default)]
pub struct StaticSubtitles(pub HashMap<PathBuf, String>);

impl SubtitleSource for StaticSubtitles {
    fn read_text(&self, path: &Path) -> Option<String> {
        self.0.get(path).cloned()
    }
}

pub struct Harness {
    pub app: ApplicationController,
    pub renderer: RecordingRenderer,
    pub audio: ScriptedAudio,
    pub observer: RecordingObserver,
}

impl Harness {
    pub fn new(scenes: Vec<SceneConfig>) -> Self {
        Self::with(
            scenes,
            EngineSettings::default(),
            StaticSubtitles::default(),
        )
    }

    pub fn with(
        scenes: Vec<SceneConfig>,
        settings: EngineSettings,
        subtitles: StaticSubtitles,
    ) -> Self {
        let renderer = RecordingRenderer::default();
        let audio = ScriptedAudio::default();
        let observer = RecordingObserver::new();
        let io = Collaborators::new(
            Box::new(renderer.clone()),
            Box::new(audio.clone()),
            Box::new(subtitles),
        )
        .with_observer(Rc::new(observer.clone()));
        let app = ApplicationController::new(
            SceneRegistry::new(scenes),
            AssetLayout::new("assets"),
            settings,
            io,
        );
        Self {
            app,
            renderer,
            audio,
            observer,
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.app.advance_by(delta);
    }

    /// Ends the playing track and lets the engine notice.
    pub fn end_track(&mut self) {
        self.audio.end_track();
        self.app.pump_audio();
    }

    pub fn scene_id(&self) -> Option<&str> {
        self.app.current_scene().map(|scene| scene.scene_id())
    }
}

pub fn image_scene(scene_id: &str) -> SceneConfig {
    SceneConfig::new(scene_id, "bg.png", MediaType::Image)
}
