//! Boundary to the platform audio device.
//!
//! The session never touches audio hardware or files directly; it drives
//! these traits. `LocalPlatform` is the in-process implementation, tests
//! substitute scripted ones.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Audio routing requested before recording starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMode {
    pub allows_recording: bool,
    pub plays_in_silent_mode: bool,
}

impl Default for AudioMode {
    fn default() -> Self {
        Self {
            allows_recording: true,
            plays_in_silent_mode: true,
        }
    }
}

/// Quality and destination of a new recording
#[derive(Debug, Clone)]
pub struct RecordingOptions {
    /// Directory the finished asset is written to
    pub output_dir: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Capture frame size in milliseconds
    pub buffer_duration_ms: u64,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("travel-gpt"),
            sample_rate: 44100,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

/// Snapshot of a sound handle, pushed on every change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub is_playing: bool,
    /// Set on the update that reports natural completion
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// Fraction of the sound already played, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).min(1.0)
    }
}

/// Platform audio device
#[async_trait::async_trait]
pub trait AudioPlatform: Send + Sync {
    /// Configure routing for simultaneous recording and playback
    async fn set_audio_mode(&self, mode: AudioMode) -> Result<()>;

    /// Open a recording handle; capture begins on `RecordingHandle::start`
    async fn prepare_recording(&self, options: &RecordingOptions) -> Result<Box<dyn RecordingHandle>>;

    /// Load and decode the asset behind `uri`
    async fn load_sound(&self, uri: &str) -> Result<Arc<dyn SoundHandle>>;

    /// Delete the asset behind `uri`
    async fn delete_asset(&self, uri: &str) -> Result<()>;

    /// Get platform name for logging
    fn name(&self) -> &str;
}

/// A single capture into a single asset
#[async_trait::async_trait]
pub trait RecordingHandle: Send + Sync {
    async fn start(&mut self) -> Result<()>;

    /// Finalize the asset and release the capture device
    async fn stop_and_unload(&mut self) -> Result<()>;

    /// Asset locator, available once the recording is finalized
    fn uri(&self) -> Option<String>;
}

/// A loaded, decoded sound
#[async_trait::async_trait]
pub trait SoundHandle: Send + Sync {
    async fn status(&self) -> Result<PlaybackStatus>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Halt playback and rewind to the start
    async fn stop(&self) -> Result<()>;

    async fn unload(&self) -> Result<()>;

    /// Status-change notifications driven by the audio subsystem
    fn subscribe(&self) -> watch::Receiver<PlaybackStatus>;

    fn uri(&self) -> &str;
}

/// Convert a filesystem path into an asset URI
pub fn path_to_uri(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

/// Resolve an asset URI back to a filesystem path
pub fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}
