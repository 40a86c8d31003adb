use serde::{Deserialize, Serialize};
use std::fmt;

use crate::messages::MessageId;

/// Registry identity of a sound handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKey {
    /// The composer's unsent voice note
    Draft,
    /// The voice note attached to a sent message
    Message(MessageId),
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundKey::Draft => f.write_str("draft"),
            SoundKey::Message(id) => write!(f, "message #{}", id),
        }
    }
}

/// Transport state of the current sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Overall session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Recording,
    Playing,
    Paused,
}

impl SessionState {
    pub(crate) fn from_parts(is_recording: bool, playback: PlaybackState) -> Self {
        if is_recording {
            return SessionState::Recording;
        }
        match playback {
            PlaybackState::Stopped => SessionState::Idle,
            PlaybackState::Playing => SessionState::Playing,
            PlaybackState::Paused => SessionState::Paused,
        }
    }
}
