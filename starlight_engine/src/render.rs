use std::path::Path;

use starlight_scenes::{ButtonConfig, MediaType, Rgba, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewHandle(pub u64);

/// Input coming back from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A button of `view` was chosen.
    Choose { view: ViewHandle, target: String },
    /// The close control was pressed or the window was closed.
    Close,
}

/// Presentation capability. Buttons report back through [`UiEvent::Choose`]
/// and the close control through [`UiEvent::Close`].
pub trait Renderer {
    fn open_view(&mut self, scene_id: &str) -> ViewHandle;
    fn render_media(&mut self, view: ViewHandle, path: &Path, media_type: MediaType);
    fn render_subtitle(&mut self, view: ViewHandle, text: &str, style: &TextStyle);
    fn render_buttons(&mut self, view: ViewHandle, buttons: &[ButtonConfig]);
    fn render_close_control(&mut self, view: ViewHandle);
    fn render_countdown_text(&mut self, view: ViewHandle, text: &str);
    fn set_clear_color(&mut self, color: Rgba);
    fn mount(&mut self, view: ViewHandle);
    fn unmount(&mut self, view: ViewHandle);
    /// Closes the window; the event loop exits afterwards.
    fn shutdown(&mut self);
}

pub fn countdown_text(remaining: u32) -> String {
    format!("Idle. Game terminating in {remaining} seconds")
}
