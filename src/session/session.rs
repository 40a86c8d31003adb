use super::config::SessionConfig;
use super::state::{PlaybackState, SessionState, SoundKey};
use crate::audio::{AudioPlatform, PlaybackStatus, RecordingHandle, SoundHandle};
use crate::error::{AudioError, PlatformOp, Result};
use crate::permission::PermissionGate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Recording and playback state machine shared by the composer and player views
pub struct AudioSession {
    /// Session configuration
    config: SessionConfig,

    /// Platform audio device
    platform: Arc<dyn AudioPlatform>,

    /// Microphone permission source
    permissions: Arc<dyn PermissionGate>,

    /// Whether a recording is active, readable without awaiting
    is_recording: Arc<AtomicBool>,

    /// Mutable slots; held for the whole of each transition
    inner: Arc<Mutex<Inner>>,

    /// Latest overall state
    state_tx: Arc<watch::Sender<SessionState>>,
}

#[derive(Default)]
struct Inner {
    /// The single active recording
    recording: Option<Box<dyn RecordingHandle>>,

    /// Every live sound handle
    sounds: HashMap<SoundKey, Arc<dyn SoundHandle>>,

    /// Handle transport calls apply to
    current: Option<SoundKey>,

    playback: PlaybackState,

    /// Watches the current handle for natural completion
    completion_task: Option<JoinHandle<()>>,
}

impl Inner {
    fn state(&self) -> SessionState {
        SessionState::from_parts(self.recording.is_some(), self.playback)
    }

    fn cancel_completion_watch(&mut self) {
        if let Some(task) = self.completion_task.take() {
            task.abort();
        }
    }
}

fn platform_error(op: PlatformOp, e: anyhow::Error) -> AudioError {
    error!("Failed to {}: {:#}", op, e);
    AudioError::platform(op, e)
}

impl AudioSession {
    pub fn new(
        config: SessionConfig,
        platform: Arc<dyn AudioPlatform>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        info!("Creating audio session on platform: {}", platform.name());

        let (state_tx, _) = watch::channel(SessionState::Idle);

        Self {
            config,
            platform,
            permissions,
            is_recording: Arc::new(AtomicBool::new(false)),
            inner: Arc::new(Mutex::new(Inner::default())),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Start recording a voice note
    ///
    /// Requests microphone permission if it is not granted yet. A no-op when
    /// a recording is already active.
    pub async fn start_recording(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;

        if inner.recording.is_some() {
            warn!("Recording already started");
            return Ok(());
        }

        let mut granted = self
            .permissions
            .check_microphone_permission()
            .await
            .map_err(|e| platform_error(PlatformOp::CheckPermission, e))?;
        if !granted {
            granted = self
                .permissions
                .request_microphone_permission()
                .await
                .map_err(|e| platform_error(PlatformOp::RequestPermission, e))?;
        }
        if !granted {
            warn!("Need microphone permission to record audio");
            return Err(AudioError::PermissionDenied);
        }

        self.platform
            .set_audio_mode(self.config.audio_mode)
            .await
            .map_err(|e| platform_error(PlatformOp::SetAudioMode, e))?;

        let mut recording = self
            .platform
            .prepare_recording(&self.config.recording)
            .await
            .map_err(|e| platform_error(PlatformOp::PrepareRecording, e))?;

        recording
            .start()
            .await
            .map_err(|e| platform_error(PlatformOp::StartRecording, e))?;

        inner.recording = Some(recording);
        self.is_recording.store(true, Ordering::SeqCst);
        self.publish_state(&inner);

        info!("Recording started");
        Ok(())
    }

    /// Stop the active recording
    ///
    /// Returns the asset URI and loads it as the current sound under
    /// `SoundKey::Draft`. Returns `None` when nothing is recording.
    pub async fn stop_recording(&self) -> Result<Option<String>> {
        let mut inner = self.inner.lock().await;

        let Some(mut recording) = inner.recording.take() else {
            warn!("No active recording to stop");
            return Ok(None);
        };

        // Released even when the stop fails
        let stopped = recording.stop_and_unload().await;
        let uri = recording.uri();
        drop(recording);
        self.is_recording.store(false, Ordering::SeqCst);
        self.publish_state(&inner);

        if let Err(e) = stopped {
            return Err(platform_error(PlatformOp::StopRecording, e));
        }

        if let Some(uri) = &uri {
            let sound = self
                .platform
                .load_sound(uri)
                .await
                .map_err(|e| platform_error(PlatformOp::Load, e))?;

            if let Err(e) = self.release_current(&mut inner).await {
                warn!("Previous sound left running while adopting the recording: {}", e);
                inner.cancel_completion_watch();
                inner.playback = PlaybackState::Stopped;
            }
            self.replace_handle(&mut inner, SoundKey::Draft, sound).await;
            inner.current = Some(SoundKey::Draft);
            self.publish_state(&inner);

            info!("Recording stopped: {}", uri);
        } else {
            warn!("Recording stopped without producing an asset");
        }

        Ok(uri)
    }

    /// Decode `uri` and register it under `key`, replacing any previous handle
    pub async fn load(&self, key: SoundKey, uri: &str) -> Result<PlaybackStatus> {
        let sound = self
            .platform
            .load_sound(uri)
            .await
            .map_err(|e| platform_error(PlatformOp::Load, e))?;

        let status = sound
            .status()
            .await
            .map_err(|e| platform_error(PlatformOp::Status, e))?;

        let mut inner = self.inner.lock().await;
        self.replace_handle(&mut inner, key, sound).await;
        self.publish_state(&inner);

        debug!("Loaded {} for {}", uri, key);
        Ok(status)
    }

    /// Drop and unload the handle registered under `key`
    pub async fn unload(&self, key: SoundKey) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let Some(sound) = inner.sounds.remove(&key) else {
            debug!("Nothing loaded for {}", key);
            return Ok(());
        };

        if inner.current == Some(key) {
            inner.current = None;
            inner.playback = PlaybackState::Stopped;
            inner.cancel_completion_watch();
            self.publish_state(&inner);
        }

        sound
            .unload()
            .await
            .map_err(|e| platform_error(PlatformOp::Unload, e))
    }

    /// Make the handle under `key` current and start it
    ///
    /// Any other handle that is playing or paused is stopped first. If the
    /// play call fails the handle stays current.
    pub async fn play_audio(&self, key: SoundKey) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let Some(sound) = inner.sounds.get(&key).cloned() else {
            warn!("No sound loaded to play for {}", key);
            return Ok(());
        };

        if inner.current != Some(key) {
            self.release_current(&mut inner).await?;
        }
        inner.cancel_completion_watch();
        inner.current = Some(key);

        // Subscribe before playing so a very short sound cannot finish unseen
        let status_rx = sound.subscribe();

        sound
            .play()
            .await
            .map_err(|e| platform_error(PlatformOp::Play, e))?;

        inner.playback = PlaybackState::Playing;
        inner.completion_task = Some(self.watch_completion(key, status_rx));
        self.publish_state(&inner);

        info!("Playing {}", key);
        Ok(())
    }

    /// Pause the current handle, if any
    pub async fn pause_audio(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let Some(sound) = self.current_handle(&inner) else {
            debug!("Pause requested with no current sound");
            return Ok(());
        };

        sound
            .pause()
            .await
            .map_err(|e| platform_error(PlatformOp::Pause, e))?;

        if inner.playback == PlaybackState::Playing {
            inner.playback = PlaybackState::Paused;
        }
        inner.cancel_completion_watch();
        self.publish_state(&inner);
        Ok(())
    }

    /// Stop and rewind the current handle, if any
    pub async fn stop_audio(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let Some(sound) = self.current_handle(&inner) else {
            debug!("Stop requested with no current sound");
            return Ok(());
        };

        sound
            .stop()
            .await
            .map_err(|e| platform_error(PlatformOp::Stop, e))?;

        inner.playback = PlaybackState::Stopped;
        inner.cancel_completion_watch();
        self.publish_state(&inner);
        Ok(())
    }

    /// Delete a recorded asset through the platform
    pub async fn delete_asset(&self, uri: &str) -> Result<()> {
        self.platform
            .delete_asset(uri)
            .await
            .map_err(|e| platform_error(PlatformOp::DeleteAsset, e))
    }

    /// Finish any recording and unload every handle
    pub async fn shutdown(&self) {
        if self.is_recording() {
            if let Err(e) = self.stop_recording().await {
                warn!("Failed to finalize recording on shutdown: {}", e);
            }
        }

        let mut inner = self.inner.lock().await;
        inner.cancel_completion_watch();
        inner.current = None;
        inner.playback = PlaybackState::Stopped;

        for (key, sound) in inner.sounds.drain() {
            if let Err(e) = sound.unload().await {
                warn!("Failed to unload {} on shutdown: {}", key, e);
            }
        }

        self.publish_state(&inner);
        info!("Audio session shut down");
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    pub fn is_playing(&self) -> bool {
        self.state() == SessionState::Playing
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Overall state changes
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Key of the handle transport calls apply to
    pub async fn current(&self) -> Option<SoundKey> {
        self.inner.lock().await.current
    }

    pub async fn is_loaded(&self, key: SoundKey) -> bool {
        self.inner.lock().await.sounds.contains_key(&key)
    }

    /// Status-change notifications for the handle under `key`
    pub async fn subscribe(&self, key: SoundKey) -> Option<watch::Receiver<PlaybackStatus>> {
        let inner = self.inner.lock().await;
        inner.sounds.get(&key).map(|sound| sound.subscribe())
    }

    /// Query the handle under `key` directly
    pub async fn status(&self, key: SoundKey) -> Result<Option<PlaybackStatus>> {
        let sound = {
            let inner = self.inner.lock().await;
            inner.sounds.get(&key).cloned()
        };

        match sound {
            Some(sound) => sound
                .status()
                .await
                .map(Some)
                .map_err(|e| platform_error(PlatformOp::Status, e)),
            None => Ok(None),
        }
    }

    fn current_handle(&self, inner: &Inner) -> Option<Arc<dyn SoundHandle>> {
        inner.current.and_then(|key| inner.sounds.get(&key).cloned())
    }

    /// Stop the current handle if it is playing or paused, and forget it
    async fn release_current(&self, inner: &mut Inner) -> Result<()> {
        inner.cancel_completion_watch();

        if inner.playback != PlaybackState::Stopped {
            if let Some(sound) = self.current_handle(inner) {
                sound
                    .stop()
                    .await
                    .map_err(|e| platform_error(PlatformOp::Stop, e))?;
            }
        }

        inner.current = None;
        inner.playback = PlaybackState::Stopped;
        Ok(())
    }

    async fn replace_handle(&self, inner: &mut Inner, key: SoundKey, sound: Arc<dyn SoundHandle>) {
        if let Some(previous) = inner.sounds.insert(key, sound) {
            if inner.current == Some(key) {
                inner.cancel_completion_watch();
                inner.current = None;
                inner.playback = PlaybackState::Stopped;
            }
            if let Err(e) = previous.unload().await {
                warn!("Failed to unload replaced sound for {}: {}", key, e);
            }
        }
    }

    fn publish_state(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.state());
    }

    fn watch_completion(
        &self,
        key: SoundKey,
        mut status_rx: watch::Receiver<PlaybackStatus>,
    ) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let state_tx = Arc::clone(&self.state_tx);

        tokio::spawn(async move {
            while status_rx.changed().await.is_ok() {
                let finished = status_rx.borrow_and_update().did_just_finish;
                if !finished {
                    continue;
                }

                let mut inner = inner.lock().await;
                if inner.current == Some(key) && inner.playback == PlaybackState::Playing {
                    inner.playback = PlaybackState::Stopped;
                    inner.completion_task = None;
                    state_tx.send_replace(inner.state());
                    debug!("Playback finished: {}", key);
                }
                break;
            }
        })
    }
}
