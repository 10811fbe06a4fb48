use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use starlight_engine::{AudioBackend, AudioTrack};

use crate::error::AssetError;

#[cfg(feature = "audio")]
pub use hardware::RodioAudio;

/// Picks the audio backend: the default output device when built with the
/// `audio` feature and not muted, silent tracks of a fixed length otherwise.
pub fn open_backend(mute: bool, silent_length: Duration) -> Box<dyn AudioBackend> {
    if !mute {
        if let Some(backend) = hardware_backend() {
            return backend;
        }
    }
    log::info!("using silent playback ({:?} per track)", silent_length);
    Box::new(SilentAudio::new(silent_length))
}

#[cfg(feature = "audio")]
fn hardware_backend() -> Option<Box<dyn AudioBackend>> {
    match RodioAudio::new() {
        Ok(backend) => Some(Box::new(backend)),
        Err(err) => {
            log::warn!("{err}; falling back to silent playback");
            None
        }
    }
}

#[cfg(not(feature = "audio"))]
fn hardware_backend() -> Option<Box<dyn AudioBackend>> {
    log::debug!("built without the audio feature");
    None
}

/// Stands in for an audio device: tracks must exist on disk and end after a
/// fixed wall-clock length.
#[derive(Debug, Clone)]
pub struct SilentAudio {
    length: Duration,
}

impl SilentAudio {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }
}

impl AudioBackend for SilentAudio {
    fn load(&mut self, path: &Path) -> Option<Box<dyn AudioTrack>> {
        if let Err(err) = fs::metadata(path).map_err(|source| AssetError::AudioOpen {
            path: path.to_path_buf(),
            source,
        }) {
            log::warn!("{err}");
            return None;
        }
        Some(Box::new(SilentTrack {
            length: self.length,
            started: None,
        }))
    }
}

#[derive(Debug)]
struct SilentTrack {
    length: Duration,
    started: Option<Instant>,
}

impl AudioTrack for SilentTrack {
    fn play(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.started = None;
    }

    fn seek_to_start(&mut self) {
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn poll_ended(&mut self) -> bool {
        match self.started {
            Some(started) if started.elapsed() >= self.length => {
                self.started = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(feature = "audio")]
mod hardware {
    use std::{
        fs::File,
        io::BufReader,
        path::{Path, PathBuf},
    };

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use starlight_engine::{AudioBackend, AudioTrack};

    use crate::error::AssetError;

    /// Default output device. The stream must outlive every sink created
    /// from its handle.
    pub struct RodioAudio {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl RodioAudio {
        pub fn new() -> Result<Self, AssetError> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }
    }

    impl AudioBackend for RodioAudio {
        fn load(&mut self, path: &Path) -> Option<Box<dyn AudioTrack>> {
            match RodioTrack::open(self.handle.clone(), path) {
                Ok(track) => Some(Box::new(track)),
                Err(err) => {
                    log::warn!("{err}");
                    None
                }
            }
        }
    }

    struct RodioTrack {
        path: PathBuf,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
        playing: bool,
    }

    impl RodioTrack {
        fn open(handle: OutputStreamHandle, path: &Path) -> Result<Self, AssetError> {
            decode(path)?;
            Ok(Self {
                path: path.to_path_buf(),
                handle,
                sink: None,
                playing: false,
            })
        }

        // A fresh sink per play; rodio sinks cannot rewind a decoded source.
        fn queue(&mut self) -> Result<(), AssetError> {
            let sink = Sink::try_new(&self.handle)?;
            sink.append(decode(&self.path)?);
            self.sink = Some(sink);
            Ok(())
        }
    }

    fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, AssetError> {
        let file = File::open(path).map_err(|source| AssetError::AudioOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Decoder::new(BufReader::new(file)).map_err(|source| AssetError::AudioDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    impl AudioTrack for RodioTrack {
        fn play(&mut self) {
            if self.sink.as_ref().map_or(true, Sink::empty) {
                if let Err(err) = self.queue() {
                    // an empty sink reads as an immediate end
                    log::warn!("{err}");
                    self.sink = None;
                }
            }
            if let Some(sink) = &self.sink {
                sink.play();
            }
            self.playing = true;
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.playing = false;
        }

        fn seek_to_start(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }

        fn poll_ended(&mut self) -> bool {
            if self.playing && self.sink.as_ref().map_or(true, Sink::empty) {
                self.playing = false;
                return true;
            }
            false
        }
    }
}
