use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::{AudioMode, RecordingOptions};
use crate::permission::PermissionPolicy;
use crate::session::SessionConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub audio: AudioConfig,
    pub permissions: PermissionConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub assistant_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Travel GPT".to_string(),
            assistant_name: "Tratoli".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
    /// How often playing sounds publish their position
    pub status_interval_ms: u64,
    /// Delete a message's voice note together with the message
    pub prune_on_delete: bool,
    /// Capture from the default input device instead of the synthetic tone
    pub use_microphone: bool,
    pub allows_recording: bool,
    pub plays_in_silent_mode: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            recordings_path: "~/.travel-gpt/recordings".to_string(),
            sample_rate: 44100,
            channels: 1,
            buffer_duration_ms: 100,
            status_interval_ms: 50,
            prune_on_delete: false,
            use_microphone: false,
            allows_recording: true,
            plays_in_silent_mode: true,
        }
    }
}

impl AudioConfig {
    pub fn recordings_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.recordings_path).into_owned())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms.max(1))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            audio_mode: AudioMode {
                allows_recording: self.allows_recording,
                plays_in_silent_mode: self.plays_in_silent_mode,
            },
            recording: RecordingOptions {
                output_dir: self.recordings_dir(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                buffer_duration_ms: self.buffer_duration_ms,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    pub microphone: PermissionPolicy,
}

impl Config {
    /// Load `path` (any extension the config crate knows, optional) layered
    /// with `TRAVEL_GPT__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TRAVEL_GPT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
