//! Audio session management
//!
//! This module provides the `AudioSession` state machine that manages:
//! - Microphone permission and the single active recording
//! - A registry of loaded sound handles keyed by draft or message
//! - Which handle is current, and at most one playing at a time
//! - Status-change subscriptions for player views

mod config;
mod session;
mod state;

pub use config::SessionConfig;
pub use session::AudioSession;
pub use state::{PlaybackState, SessionState, SoundKey};
