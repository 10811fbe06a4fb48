use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_AUDIO_REPEAT: u32 = 2;
pub const DEFAULT_BACKOFF_SECONDS: f64 = 3.0;
pub const DEFAULT_FONT_STYLE: &str = "Subtitle1";
/// Longest pause accepted between plays; larger values are clamped on load.
pub const MAX_BACKOFF_SECONDS: f64 = 86_400.0;

/// Linear RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0.0, 0.0, 0.0, 1.0]);
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    #[serde(alias = "text")]
    pub label: String,
    pub target_scene_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default = "default_text_color")]
    pub text_color: Rgba,
    #[serde(default = "default_font_style")]
    pub font_style: String,
    /// Renderer-specific keys passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_color: default_text_color(),
            font_style: default_font_style(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_text_color() -> Rgba {
    Rgba::WHITE
}

fn default_font_style() -> String {
    DEFAULT_FONT_STYLE.to_string()
}

/// Immutable description of one scene in the story graph.
///
/// Other scenes are referenced by id only; the registry resolves them when a
/// transition actually happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneConfig {
    pub scene_id: String,
    pub media_source: String,
    pub media_type: MediaType,
    pub audio_source: Option<String>,
    pub button_config: Option<Vec<ButtonConfig>>,
    pub text_style: TextStyle,
    pub background_color: Rgba,
    pub audio_repeat_count: u32,
    pub backoff_rate_seconds: f64,
    pub has_subtitle: bool,
    pub fallback_scene_id: Option<String>,
}

impl SceneConfig {
    /// Builds a config with every optional field at its default.
    pub fn new(
        scene_id: impl Into<String>,
        media_source: impl Into<String>,
        media_type: MediaType,
    ) -> Self {
        Self {
            scene_id: scene_id.into(),
            media_source: media_source.into(),
            media_type,
            audio_source: None,
            button_config: None,
            text_style: TextStyle::default(),
            background_color: Rgba::default(),
            audio_repeat_count: DEFAULT_AUDIO_REPEAT,
            backoff_rate_seconds: DEFAULT_BACKOFF_SECONDS,
            has_subtitle: true,
            fallback_scene_id: None,
        }
    }

    pub fn with_audio(mut self, source: impl Into<String>) -> Self {
        self.audio_source = Some(source.into());
        self
    }

    pub fn with_repeat(mut self, count: u32, backoff_rate_seconds: f64) -> Self {
        self.audio_repeat_count = count.max(1);
        self.backoff_rate_seconds = sanitize_backoff(&self.scene_id, backoff_rate_seconds);
        self
    }

    pub fn with_fallback(mut self, scene_id: impl Into<String>) -> Self {
        self.fallback_scene_id = Some(scene_id.into());
        self
    }

    pub fn with_buttons<I>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = ButtonConfig>,
    {
        let buttons: Vec<ButtonConfig> = buttons.into_iter().collect();
        self.button_config = if buttons.is_empty() {
            None
        } else {
            Some(buttons)
        };
        self
    }

    pub fn without_subtitle(mut self) -> Self {
        self.has_subtitle = false;
        self
    }

    pub fn backoff(&self) -> Duration {
        let seconds = self.backoff_rate_seconds.clamp(0.0, MAX_BACKOFF_SECONDS);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
    }

    pub fn buttons(&self) -> &[ButtonConfig] {
        self.button_config.as_deref().unwrap_or(&[])
    }
}

impl ButtonConfig {
    pub fn new(label: impl Into<String>, target_scene_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target_scene_id: target_scene_id.into(),
        }
    }
}

/// On-disk shape of a scene entry. Accepts both the current field names and
/// the older `bg_color` / `backoff_rate` / `has_text` / `last_scene_id` ones.
#[derive(Debug, Deserialize)]
pub(crate) struct SceneRecord {
    scene_id: String,
    media_source: String,
    media_type: MediaType,
    #[serde(default)]
    audio_source: Option<String>,
    #[serde(default)]
    button_config: Option<Vec<ButtonConfig>>,
    #[serde(default)]
    text_style: Option<TextStyle>,
    #[serde(default, alias = "bg_color")]
    background_color: Option<Rgba>,
    #[serde(default)]
    audio_repeat_count: Option<f64>,
    #[serde(default, alias = "backoff_rate")]
    backoff_rate_seconds: Option<f64>,
    #[serde(default, alias = "has_text")]
    has_subtitle: Option<bool>,
    #[serde(default, alias = "last_scene_id")]
    fallback_scene_id: Option<String>,
}

impl From<SceneRecord> for SceneConfig {
    fn from(record: SceneRecord) -> Self {
        let scene_id = record.scene_id;
        let audio_repeat_count = record
            .audio_repeat_count
            .map(|count| sanitize_repeat(&scene_id, count))
            .unwrap_or(DEFAULT_AUDIO_REPEAT);
        let backoff_rate_seconds = record
            .backoff_rate_seconds
            .map(|value| sanitize_backoff(&scene_id, value))
            .unwrap_or(DEFAULT_BACKOFF_SECONDS);

        SceneConfig {
            media_source: record.media_source,
            media_type: record.media_type,
            audio_source: non_empty(record.audio_source),
            button_config: record.button_config.filter(|buttons| !buttons.is_empty()),
            text_style: record.text_style.unwrap_or_default(),
            background_color: record.background_color.unwrap_or_default(),
            audio_repeat_count,
            backoff_rate_seconds,
            has_subtitle: record.has_subtitle.unwrap_or(true),
            fallback_scene_id: non_empty(record.fallback_scene_id),
            scene_id,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

// Plays continue while the count is below the limit, so a fractional limit
// rounds up.
fn sanitize_repeat(scene_id: &str, value: f64) -> u32 {
    if value.is_nan() || value < 1.0 {
        log::warn!("scene {scene_id}: audio_repeat_count {value} raised to 1");
        return 1;
    }
    if value.fract() != 0.0 {
        log::warn!("scene {scene_id}: audio_repeat_count {value} rounded up");
    }
    // float-to-int `as` saturates at u32::MAX
    value.ceil() as u32
}

fn sanitize_backoff(scene_id: &str, value: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        log::warn!("scene {scene_id}: backoff rate {value} clamped to 0");
        0.0
    } else if value > MAX_BACKOFF_SECONDS {
        log::warn!("scene {scene_id}: backoff rate {value} clamped to one day");
        MAX_BACKOFF_SECONDS
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SceneConfig {
        let record: SceneRecord = serde_json::from_str(json).expect("valid scene record");
        SceneConfig::from(record)
    }

    #[test]
    fn minimal_record_takes_defaults() {
        let config =
            parse(r#"{"scene_id": "intro", "media_source": "bg.png", "media_type": "image"}"#);
        assert_eq!(config.audio_source, None);
        assert_eq!(config.audio_repeat_count, DEFAULT_AUDIO_REPEAT);
        assert_eq!(config.backoff_rate_seconds, DEFAULT_BACKOFF_SECONDS);
        assert_eq!(config.background_color, Rgba::BLACK);
        assert_eq!(config.text_style.text_color, Rgba::WHITE);
        assert_eq!(config.text_style.font_style, "Subtitle1");
        assert!(config.has_subtitle);
        assert!(config.buttons().is_empty());
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let config = parse(
            r#"{
                "scene_id": "rooftop",
                "media_source": "loop.mp4",
                "media_type": "video",
                "audio_source": "wind.mp3",
                "bg_color": [0.1, 0.2, 0.3, 1.0],
                "backoff_rate": 1,
                "has_text": false,
                "last_scene_id": "intro",
                "button_config": [{"text": "Jump", "target_scene_id": "street"}]
            }"#,
        );
        assert_eq!(config.media_type, MediaType::Video);
        assert_eq!(config.background_color, Rgba([0.1, 0.2, 0.3, 1.0]));
        assert_eq!(config.backoff(), Duration::from_secs(1));
        assert!(!config.has_subtitle);
        assert_eq!(config.fallback_scene_id.as_deref(), Some("intro"));
        assert_eq!(config.buttons(), &[ButtonConfig::new("Jump", "street")]);
    }

    #[test]
    fn out_of_range_timing_is_normalised() {
        let config = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "audio_repeat_count": 0, "backoff_rate_seconds": -4}"#,
        );
        assert_eq!(config.audio_repeat_count, 1);
        assert_eq!(config.backoff_rate_seconds, 0.0);
    }

    #[test]
    fn oversized_backoff_is_clamped() {
        let config = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "backoff_rate": 1e20}"#,
        );
        assert_eq!(config.backoff_rate_seconds, MAX_BACKOFF_SECONDS);
        assert_eq!(config.backoff(), Duration::from_secs(86_400));

        let built = SceneConfig::new("y", "y.png", MediaType::Image).with_repeat(2, f64::MAX);
        assert_eq!(built.backoff(), Duration::from_secs(86_400));
    }

    #[test]
    fn hand_set_backoff_never_panics() {
        let mut config = SceneConfig::new("x", "x.png", MediaType::Image);
        config.backoff_rate_seconds = f64::NAN;
        assert_eq!(config.backoff(), Duration::ZERO);
        config.backoff_rate_seconds = 1e300;
        assert_eq!(config.backoff(), Duration::from_secs(86_400));
    }

    #[test]
    fn float_repeat_counts_are_accepted() {
        let whole = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "audio_repeat_count": 3.0}"#,
        );
        assert_eq!(whole.audio_repeat_count, 3);

        let fractional = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "audio_repeat_count": 2.5}"#,
        );
        assert_eq!(fractional.audio_repeat_count, 3);

        let huge = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "audio_repeat_count": 1e12}"#,
        );
        assert_eq!(huge.audio_repeat_count, u32::MAX);
    }

    #[test]
    fn blank_references_become_none() {
        let config = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "audio_source": "", "fallback_scene_id": " ", "button_config": []}"#,
        );
        assert_eq!(config.audio_source, None);
        assert_eq!(config.fallback_scene_id, None);
        assert_eq!(config.button_config, None);
    }

    #[test]
    fn text_style_keeps_extra_keys() {
        let config = parse(
            r#"{"scene_id": "x", "media_source": "x.png", "media_type": "image",
                "text_style": {"font_style": "H5", "bold": true}}"#,
        );
        assert_eq!(config.text_style.font_style, "H5");
        assert_eq!(config.text_style.text_color, Rgba::WHITE);
        assert_eq!(
            config.text_style.extra.get("bold"),
            Some(&Value::Bool(true))
        );
    }
}
