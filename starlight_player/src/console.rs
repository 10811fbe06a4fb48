use std::{
    collections::HashMap,
    fmt, fs,
    io::{self, Write},
    path::Path,
};

use starlight_engine::{Renderer, ViewHandle};
use starlight_scenes::{ButtonConfig, MediaType, Rgba, TextStyle};

use crate::error::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaInfo {
    Image { width: u32, height: u32 },
    Video { bytes: u64 },
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaInfo::Image { width, height } => write!(f, "{width}x{height}"),
            MediaInfo::Video { bytes } => write!(f, "{bytes} bytes"),
        }
    }
}

/// Checks that a scene's media exists; images are also decoded far enough
/// to read their dimensions.
pub fn inspect_media(path: &Path, media_type: MediaType) -> Result<MediaInfo, AssetError> {
    if !path.is_file() {
        return Err(AssetError::MissingMedia(path.to_path_buf()));
    }
    match media_type {
        MediaType::Image => {
            let (width, height) =
                image::image_dimensions(path).map_err(|source| AssetError::Image {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(MediaInfo::Image { width, height })
        }
        MediaType::Video => {
            let bytes = fs::metadata(path)
                .map(|meta| meta.len())
                .map_err(|_| AssetError::MissingMedia(path.to_path_buf()))?;
            Ok(MediaInfo::Video { bytes })
        }
    }
}

/// Text front end: each scene is printed as it is built, buttons are
/// numbered, and input arrives through scripted choices or Ctrl+C.
pub struct ConsoleRenderer<W: Write = io::Stdout> {
    title: String,
    out: W,
    next_view: u64,
    scenes: HashMap<ViewHandle, String>,
    mounted: Option<ViewHandle>,
    closed: bool,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout(title: impl Into<String>) -> Self {
        Self::new(title, io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(title: impl Into<String>, out: W) -> Self {
        Self {
            title: title.into(),
            out,
            next_view: 0,
            scenes: HashMap::new(),
            mounted: None,
            closed: false,
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{args}") {
            log::warn!("console output failed: {err}");
        }
    }

    fn scene_of(&self, view: ViewHandle) -> &str {
        self.scenes.get(&view).map(String::as_str).unwrap_or("?")
    }
}

#[cfg(test)]
impl<W: Write> ConsoleRenderer<W> {
    pub fn mounted(&self) -> Option<ViewHandle> {
        self.mounted
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn open_view(&mut self, scene_id: &str) -> ViewHandle {
        self.next_view += 1;
        let view = ViewHandle(self.next_view);
        self.scenes.insert(view, scene_id.to_string());
        let title = self.title.clone();
        self.line(format_args!("=== {title} :: {scene_id} ==="));
        view
    }

    fn render_media(&mut self, view: ViewHandle, path: &Path, media_type: MediaType) {
        let kind = media_type.as_str();
        match inspect_media(path, media_type) {
            Ok(info) => self.line(format_args!("{kind} {} ({info})", path.display())),
            Err(err) => {
                log::warn!("scene {}: {err}", self.scene_of(view));
                self.line(format_args!("{kind} {} (unavailable)", path.display()));
            }
        }
    }

    fn render_subtitle(&mut self, _view: ViewHandle, text: &str, _style: &TextStyle) {
        for row in text.lines() {
            self.line(format_args!("  {row}"));
        }
    }

    fn render_buttons(&mut self, _view: ViewHandle, buttons: &[ButtonConfig]) {
        for (index, button) in buttons.iter().enumerate() {
            self.line(format_args!(
                "  [{}] {} -> {}",
                index + 1,
                button.label,
                button.target_scene_id
            ));
        }
    }

    fn render_close_control(&mut self, _view: ViewHandle) {
        self.line(format_args!("  [x] close"));
    }

    fn render_countdown_text(&mut self, _view: ViewHandle, text: &str) {
        if !text.is_empty() {
            self.line(format_args!("  {text}"));
        }
    }

    fn set_clear_color(&mut self, color: Rgba) {
        log::debug!("clear color {:?}", color.0);
    }

    fn mount(&mut self, view: ViewHandle) {
        log::debug!("mounted scene {}", self.scene_of(view));
        self.mounted = Some(view);
    }

    fn unmount(&mut self, view: ViewHandle) {
        if self.mounted == Some(view) {
            self.mounted = None;
        }
        self.scenes.remove(&view);
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let title = self.title.clone();
        self.line(format_args!("=== {title} closed ==="));
        if let Err(err) = self.out.flush() {
            log::warn!("console output failed: {err}");
        }
    }
}
