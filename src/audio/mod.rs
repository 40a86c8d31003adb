pub mod backend;
pub mod file;
pub mod local;
pub mod platform;
pub mod recorder;
pub mod sound;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, SignalBackend};
pub use file::AudioFile;
pub use local::LocalPlatform;
pub use platform::{
    path_to_uri, uri_to_path, AudioMode, AudioPlatform, PlaybackStatus, RecordingHandle, RecordingOptions,
    SoundHandle,
};
pub use recorder::{RecordingSummary, WavRecording};
pub use sound::ClockSound;
