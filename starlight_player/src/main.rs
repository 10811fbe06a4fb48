mod cli;
mod console;
mod error;
mod playback;
mod runtime;
mod script;

use std::{fs, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use starlight_engine::{ApplicationController, Collaborators, RecordingObserver};
use starlight_scenes::{AssetLayout, FsSubtitles, SceneRegistry};

use crate::cli::Args;
use crate::console::ConsoleRenderer;
use crate::script::ChoiceScript;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    args.validate()?;

    let registry = SceneRegistry::from_json_file_or_empty(&args.scenes);
    if registry.is_empty() {
        log::warn!("no scenes available from {}", args.scenes.display());
    } else {
        log::info!(
            "loaded {} scenes from {}",
            registry.len(),
            args.scenes.display()
        );
        log::debug!("scenes: {}", registry.ids().join(", "));
    }

    let observer = RecordingObserver::new();
    let io = Collaborators::new(
        Box::new(ConsoleRenderer::stdout(args.title.clone())),
        playback::open_backend(args.mute, args.silent_track_length()),
        Box::new(FsSubtitles),
    )
    .with_observer(Rc::new(observer.clone()));

    let mut app = ApplicationController::new(
        registry,
        AssetLayout::new(&args.assets_root),
        args.engine_settings(),
        io,
    );
    let mut script = ChoiceScript::new(args.choices.iter().cloned());

    app.transition_to(&args.start_scene);
    runtime::run(&mut app, &mut script).await?;
    log::debug!("replayed {} scripted inputs", script.history().len());
    if !script.is_empty() {
        log::info!("story ended before every scripted input was replayed");
    }

    if let Some(path) = args.event_log_json.as_ref() {
        let json = observer.to_json().context("serializing event log")?;
        fs::write(path, json)
            .with_context(|| format!("writing event log to {}", path.display()))?;
        println!("Saved event log to {}", path.display());
    }

    Ok(())
}
