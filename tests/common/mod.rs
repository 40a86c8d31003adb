// Scripted platform and permission gate for session tests
#![allow(dead_code)]

use anyhow::Result;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use travel_gpt::{
    AudioMode, AudioPlatform, PermissionGate, PlaybackStatus, RecordingHandle, RecordingOptions, SoundHandle,
};

/// Mock operations that can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fail {
    SetAudioMode,
    Prepare,
    RecordStart,
    RecordStop,
    Load,
    Play,
    Pause,
    Stop,
}

#[derive(Default)]
pub struct MockPlatform {
    failures: Mutex<HashSet<Fail>>,
    recordings: AtomicUsize,
    /// Recordings finish without an asset
    no_uri: AtomicBool,
    sounds: Mutex<Vec<Arc<MockSound>>>,
    deleted: Mutex<Vec<String>>,
    mode: Mutex<Option<AudioMode>>,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, op: Fail) {
        self.failures.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Fail) {
        self.failures.lock().unwrap().remove(&op);
    }

    pub fn produce_no_uri(&self) {
        self.no_uri.store(true, Ordering::SeqCst);
    }

    fn check(&self, op: Fail) -> Result<()> {
        if self.failures.lock().unwrap().contains(&op) {
            anyhow::bail!("mock {:?} failure", op);
        }
        Ok(())
    }

    /// Every sound handle loaded so far, in load order
    pub fn sounds(&self) -> Vec<Arc<MockSound>> {
        self.sounds.lock().unwrap().clone()
    }

    pub fn last_sound(&self) -> Arc<MockSound> {
        self.sounds().last().cloned().expect("no sound loaded")
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn audio_mode(&self) -> Option<AudioMode> {
        *self.mode.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl AudioPlatform for MockPlatform {
    async fn set_audio_mode(&self, mode: AudioMode) -> Result<()> {
        self.check(Fail::SetAudioMode)?;
        *self.mode.lock().unwrap() = Some(mode);
        Ok(())
    }

    async fn prepare_recording(&self, _options: &RecordingOptions) -> Result<Box<dyn RecordingHandle>> {
        self.check(Fail::Prepare)?;
        let n = self.recordings.fetch_add(1, Ordering::SeqCst) + 1;
        let (fail_start, fail_stop) = {
            let failures = self.failures.lock().unwrap();
            (failures.contains(&Fail::RecordStart), failures.contains(&Fail::RecordStop))
        };
        Ok(Box::new(MockRecording {
            uri: format!("file:///mock/recording-{}.wav", n),
            fail_start,
            fail_stop,
            no_uri: self.no_uri.load(Ordering::SeqCst),
            started: false,
            stopped: false,
        }))
    }

    async fn load_sound(&self, uri: &str) -> Result<Arc<dyn SoundHandle>> {
        self.check(Fail::Load)?;
        let sound = Arc::new(MockSound::new(uri, 5_000, self.failures.lock().unwrap().clone()));
        self.sounds.lock().unwrap().push(Arc::clone(&sound));
        Ok(sound)
    }

    async fn delete_asset(&self, uri: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(uri.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub struct MockRecording {
    uri: String,
    fail_start: bool,
    fail_stop: bool,
    no_uri: bool,
    started: bool,
    stopped: bool,
}

#[async_trait::async_trait]
impl RecordingHandle for MockRecording {
    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            anyhow::bail!("mock RecordStart failure");
        }
        self.started = true;
        Ok(())
    }

    async fn stop_and_unload(&mut self) -> Result<()> {
        if self.fail_stop {
            anyhow::bail!("mock RecordStop failure");
        }
        self.stopped = true;
        Ok(())
    }

    fn uri(&self) -> Option<String> {
        (self.stopped && !self.no_uri).then(|| self.uri.clone())
    }
}

pub struct MockSound {
    uri: String,
    failures: HashSet<Fail>,
    status_tx: watch::Sender<PlaybackStatus>,
    pub play_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub unloaded: AtomicBool,
}

impl MockSound {
    fn new(uri: &str, duration_ms: u64, failures: HashSet<Fail>) -> Self {
        let (status_tx, _) = watch::channel(PlaybackStatus {
            is_loaded: true,
            duration_ms,
            ..Default::default()
        });
        Self {
            uri: uri.to_string(),
            failures,
            status_tx,
            play_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            unloaded: AtomicBool::new(false),
        }
    }

    fn check(&self, op: Fail) -> Result<()> {
        if self.failures.contains(&op) {
            anyhow::bail!("mock {:?} failure", op);
        }
        Ok(())
    }

    pub fn current(&self) -> PlaybackStatus {
        *self.status_tx.borrow()
    }

    /// Report natural completion, as the audio subsystem would
    pub fn finish(&self) {
        self.status_tx.send_modify(|s| {
            s.position_ms = s.duration_ms;
            s.is_playing = false;
            s.did_just_finish = true;
        });
    }

    /// Report playback progress
    pub fn advance_to(&self, position_ms: u64) {
        self.status_tx.send_modify(|s| {
            s.position_ms = position_ms;
            s.did_just_finish = false;
        });
    }
}

#[async_trait::async_trait]
impl SoundHandle for MockSound {
    async fn status(&self) -> Result<PlaybackStatus> {
        Ok(self.current())
    }

    async fn play(&self) -> Result<()> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Fail::Play)?;
        self.status_tx.send_modify(|s| {
            s.is_playing = true;
            s.did_just_finish = false;
        });
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.check(Fail::Pause)?;
        self.status_tx.send_modify(|s| s.is_playing = false);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Fail::Stop)?;
        self.status_tx.send_modify(|s| {
            s.is_playing = false;
            s.position_ms = 0;
        });
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.unloaded.store(true, Ordering::SeqCst);
        self.status_tx.send_modify(|s| {
            s.is_loaded = false;
            s.is_playing = false;
        });
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status_tx.subscribe()
    }

    fn uri(&self) -> &str {
        &self.uri
    }
}

pub struct MockPermissions {
    granted: AtomicBool,
    grant_on_request: bool,
    pub requests: AtomicUsize,
}

impl MockPermissions {
    pub fn new(granted: bool, grant_on_request: bool) -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(granted),
            grant_on_request,
            requests: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl PermissionGate for MockPermissions {
    async fn check_microphone_permission(&self) -> Result<bool> {
        Ok(self.granted.load(Ordering::SeqCst))
    }

    async fn request_microphone_permission(&self) -> Result<bool> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.granted.store(self.grant_on_request, Ordering::SeqCst);
        Ok(self.grant_on_request)
    }
}
