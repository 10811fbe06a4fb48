use std::{cell::RefCell, fmt, rc::Rc};

use serde::Serialize;

/// Hooks for watching the engine from the outside (logging, replay capture).
pub trait EngineObserver {
    fn scene_entered(&self, _scene_id: &str) {}
    fn scene_exited(&self, _scene_id: &str, _audio_plays: u32) {}
    fn unknown_scene(&self, _scene_id: &str) {}
    fn audio_started(&self, _scene_id: &str) {}
    fn audio_finished(&self, _scene_id: &str, _plays: u32) {}
    fn countdown_tick(&self, _scene_id: &str, _remaining: u32) {}
    fn terminated(&self) {}
}

impl fmt::Debug for dyn EngineObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EngineObserver")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl EngineObserver for NullObserver {}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    SceneEntered { scene_id: String },
    SceneExited { scene_id: String, audio_plays: u32 },
    UnknownScene { scene_id: String },
    AudioStarted { scene_id: String },
    AudioFinished { scene_id: String, plays: u32 },
    CountdownTick { scene_id: String, remaining: u32 },
    Terminated,
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.events.borrow())
    }

    fn push(&self, event: EngineEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl EngineObserver for RecordingObserver {
    fn scene_entered(&self, scene_id: &str) {
        self.push(EngineEvent::SceneEntered {
            scene_id: scene_id.to_string(),
        });
    }

    fn scene_exited(&self, scene_id: &str, audio_plays: u32) {
        self.push(EngineEvent::SceneExited {
            scene_id: scene_id.to_string(),
            audio_plays,
        });
    }

    fn unknown_scene(&self, scene_id: &str) {
        self.push(EngineEvent::UnknownScene {
            scene_id: scene_id.to_string(),
        });
    }

    fn audio_started(&self, scene_id: &str) {
        self.push(EngineEvent::AudioStarted {
            scene_id: scene_id.to_string(),
        });
    }

    fn audio_finished(&self, scene_id: &str, plays: u32) {
        self.push(EngineEvent::AudioFinished {
            scene_id: scene_id.to_string(),
            plays,
        });
    }

    fn countdown_tick(&self, scene_id: &str, remaining: u32) {
        self.push(EngineEvent::CountdownTick {
            scene_id: scene_id.to_string(),
            remaining,
        });
    }

    fn terminated(&self) {
        self.push(EngineEvent::Terminated);
    }
}
