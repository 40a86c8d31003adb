use std::fmt;
use thiserror::Error;

/// Platform operations the audio session can fail in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformOp {
    CheckPermission,
    RequestPermission,
    SetAudioMode,
    PrepareRecording,
    StartRecording,
    StopRecording,
    Load,
    Status,
    Play,
    Pause,
    Stop,
    Unload,
    DeleteAsset,
}

impl fmt::Display for PlatformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformOp::CheckPermission => "check microphone permission",
            PlatformOp::RequestPermission => "request microphone permission",
            PlatformOp::SetAudioMode => "set audio mode",
            PlatformOp::PrepareRecording => "prepare recording",
            PlatformOp::StartRecording => "start recording",
            PlatformOp::StopRecording => "stop recording",
            PlatformOp::Load => "load sound",
            PlatformOp::Status => "query sound status",
            PlatformOp::Play => "play audio",
            PlatformOp::Pause => "pause audio",
            PlatformOp::Stop => "stop audio",
            PlatformOp::Unload => "unload sound",
            PlatformOp::DeleteAsset => "delete audio asset",
        };
        f.write_str(name)
    }
}

/// Audio session errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// The user declined microphone access
    #[error("Need microphone permission to record audio")]
    PermissionDenied,

    /// A platform audio call failed
    #[error("Failed to {op}: {source}")]
    Platform {
        op: PlatformOp,
        #[source]
        source: anyhow::Error,
    },
}

impl AudioError {
    pub fn platform(op: PlatformOp, source: anyhow::Error) -> Self {
        AudioError::Platform { op, source }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AudioError::PermissionDenied)
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;
