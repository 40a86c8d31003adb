pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod messages;
pub mod permission;
pub mod session;
pub mod ui;

pub use app::{App, Command, Flow, PlayerTarget};
pub use audio::{
    AudioFile, AudioFrame, AudioMode, AudioPlatform, CaptureBackend, CaptureConfig, CaptureSource, LocalPlatform,
    PlaybackStatus, RecordingHandle, RecordingOptions, SoundHandle,
};
pub use config::Config;
pub use error::{AudioError, PlatformOp};
pub use messages::{DraftMessage, Message, MessageId, MessageStore};
pub use permission::{ConfiguredPermissionGate, PermissionGate, PermissionPolicy};
pub use session::{AudioSession, PlaybackState, SessionConfig, SessionState, SoundKey};
pub use ui::format_time;
