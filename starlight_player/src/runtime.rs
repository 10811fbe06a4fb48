use std::time::Duration;

use anyhow::{Context, Result};
use starlight_engine::{ApplicationController, UiEvent};
use tokio::time::{sleep_until, Instant};

use crate::script::{ChoiceScript, ScriptedAction};

/// Upper bound on how long the loop sleeps before checking audio again.
pub const AUDIO_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Drives the engine against the wall clock until it terminates. Timers fire
/// in deadline order, track ends are polled, and Ctrl+C closes the story.
pub async fn run(app: &mut ApplicationController, script: &mut ChoiceScript) -> Result<()> {
    let started = Instant::now();
    loop {
        let now = started.elapsed();
        app.advance_to(now);
        app.pump_audio();
        while let Some(action) = script.next_due(now) {
            dispatch(app, action);
        }
        if app.is_terminated() {
            break;
        }

        let wake = [app.next_deadline(), script.next_at()]
            .into_iter()
            .flatten()
            .fold(now + AUDIO_POLL_INTERVAL, Duration::min);

        tokio::select! {
            _ = sleep_until(started + wake) => {}
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl+C")?;
                log::info!("interrupt received; closing");
                app.handle_ui(UiEvent::Close);
            }
        }
    }
    let elapsed = started.elapsed().as_secs_f64();
    log::info!("story finished after {elapsed:.1}s");
    Ok(())
}

fn dispatch(app: &mut ApplicationController, action: ScriptedAction) {
    match action {
        ScriptedAction::Close => app.handle_ui(UiEvent::Close),
        ScriptedAction::Choose(target) => match app.current_view() {
            Some(view) => {
                log::info!("scripted choice -> {target}");
                app.handle_ui(UiEvent::Choose { view, target });
            }
            None => log::warn!("scripted choice {target} ignored; no scene is showing"),
        },
    }
}
