use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures while opening scene media or audio. The player logs these and
/// keeps going with a placeholder or a skipped track.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("media {} is missing", .0.display())]
    MissingMedia(PathBuf),
    #[error("image {} could not be decoded: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("audio {} could not be opened: {source}", .path.display())]
    AudioOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[cfg(feature = "audio")]
    #[error("audio {} could not be decoded: {source}", .path.display())]
    AudioDecode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[cfg(feature = "audio")]
    #[error("audio output unavailable: {0}")]
    Stream(#[from] rodio::StreamError),
    #[cfg(feature = "audio")]
    #[error("audio playback failed: {0}")]
    Play(#[from] rodio::PlayError),
}
