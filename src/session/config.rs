use crate::audio::{AudioMode, RecordingOptions};

/// Configuration for an audio session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Routing applied before each recording
    pub audio_mode: AudioMode,

    /// Where and how recordings are captured
    pub recording: RecordingOptions,
}
