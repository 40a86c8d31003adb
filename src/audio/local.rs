use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::backend::{CaptureBackendFactory, CaptureConfig, CaptureSource};
use super::file::AudioFile;
use super::platform::{uri_to_path, AudioMode, AudioPlatform, RecordingHandle, RecordingOptions, SoundHandle};
use super::recorder::WavRecording;
use super::sound::ClockSound;

/// In-process audio platform
///
/// Records from a capture backend into WAV files and plays sounds against
/// a clock.
pub struct LocalPlatform {
    source: CaptureSource,
    status_interval: Duration,
    mode: Mutex<Option<AudioMode>>,
}

impl LocalPlatform {
    pub fn new(source: CaptureSource, status_interval: Duration) -> Self {
        Self {
            source,
            status_interval,
            mode: Mutex::new(None),
        }
    }

    /// Last audio mode applied, if any
    pub async fn audio_mode(&self) -> Option<AudioMode> {
        *self.mode.lock().await
    }
}

#[async_trait::async_trait]
impl AudioPlatform for LocalPlatform {
    async fn set_audio_mode(&self, mode: AudioMode) -> Result<()> {
        info!(
            "Audio mode: allows_recording={}, plays_in_silent_mode={}",
            mode.allows_recording, mode.plays_in_silent_mode
        );
        *self.mode.lock().await = Some(mode);
        Ok(())
    }

    async fn prepare_recording(&self, options: &RecordingOptions) -> Result<Box<dyn RecordingHandle>> {
        let allowed = self
            .mode
            .lock()
            .await
            .map(|mode| mode.allows_recording)
            .unwrap_or(false);
        if !allowed {
            anyhow::bail!("Audio mode does not allow recording");
        }

        let capture_config = CaptureConfig {
            sample_rate: options.sample_rate,
            channels: options.channels,
            buffer_duration_ms: options.buffer_duration_ms,
        };
        let backend = CaptureBackendFactory::create(self.source, capture_config)
            .context("Failed to create capture backend")?;

        Ok(Box::new(WavRecording::new(options.clone(), backend)?))
    }

    async fn load_sound(&self, uri: &str) -> Result<Arc<dyn SoundHandle>> {
        let path = uri_to_path(uri);
        let audio = tokio::task::spawn_blocking(move || AudioFile::open(path))
            .await
            .context("Audio decoder task panicked")??;

        Ok(Arc::new(ClockSound::new(uri.to_string(), &audio, self.status_interval)))
    }

    async fn delete_asset(&self, uri: &str) -> Result<()> {
        let path = uri_to_path(uri);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted audio asset: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Audio asset already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete audio asset: {}", path.display())),
        }
    }

    fn name(&self) -> &str {
        match self.source {
            CaptureSource::Signal => "local-signal",
            CaptureSource::Microphone => "local-microphone",
        }
    }
}
