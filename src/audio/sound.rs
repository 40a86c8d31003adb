use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::file::AudioFile;
use super::platform::{PlaybackStatus, SoundHandle};

/// Clock-driven sound handle
///
/// Playback position advances with wall-clock time and is published on a
/// watch channel every `status_interval`. No samples reach an output device.
pub struct ClockSound {
    uri: String,
    duration_ms: u64,
    status_interval: Duration,
    clock: Arc<Mutex<Clock>>,
    status_tx: Arc<watch::Sender<PlaybackStatus>>,
}

#[derive(Default)]
struct Clock {
    loaded: bool,
    /// Position when playback last (re)started or was last paused
    base_position_ms: u64,
    /// Set while playing
    started_at: Option<Instant>,
    ticker: Option<JoinHandle<()>>,
}

impl Clock {
    fn position_ms(&self, duration_ms: u64) -> u64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        (self.base_position_ms + elapsed).min(duration_ms)
    }

    fn halt(&mut self, duration_ms: u64) {
        self.base_position_ms = self.position_ms(duration_ms);
        self.started_at = None;
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl ClockSound {
    pub fn new(uri: String, audio: &AudioFile, status_interval: Duration) -> Self {
        let initial = PlaybackStatus {
            is_loaded: true,
            duration_ms: audio.duration_ms,
            ..Default::default()
        };
        let (status_tx, _) = watch::channel(initial);

        Self {
            uri,
            duration_ms: audio.duration_ms,
            status_interval,
            clock: Arc::new(Mutex::new(Clock {
                loaded: true,
                ..Default::default()
            })),
            status_tx: Arc::new(status_tx),
        }
    }

    fn snapshot(&self, clock: &Clock) -> PlaybackStatus {
        PlaybackStatus {
            is_loaded: clock.loaded,
            duration_ms: self.duration_ms,
            position_ms: clock.position_ms(self.duration_ms),
            is_playing: clock.started_at.is_some(),
            did_just_finish: false,
        }
    }

    fn publish(&self, status: PlaybackStatus) {
        self.status_tx.send_replace(status);
    }
}

#[async_trait::async_trait]
impl SoundHandle for ClockSound {
    async fn status(&self) -> Result<PlaybackStatus> {
        let clock = self.clock.lock().await;
        Ok(self.snapshot(&clock))
    }

    async fn play(&self) -> Result<()> {
        let mut clock = self.clock.lock().await;
        if !clock.loaded {
            anyhow::bail!("Cannot play unloaded sound: {}", self.uri);
        }
        if clock.started_at.is_some() {
            debug!("Already playing: {}", self.uri);
            return Ok(());
        }
        if clock.base_position_ms >= self.duration_ms {
            clock.base_position_ms = 0;
        }

        clock.started_at = Some(Instant::now());

        let duration_ms = self.duration_ms;
        let interval = self.status_interval;
        let shared = Arc::clone(&self.clock);
        let status_tx = Arc::clone(&self.status_tx);

        clock.ticker = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let mut clock = shared.lock().await;
                let position_ms = clock.position_ms(duration_ms);

                if position_ms >= duration_ms {
                    clock.base_position_ms = duration_ms;
                    clock.started_at = None;
                    clock.ticker = None;
                    status_tx.send_replace(PlaybackStatus {
                        is_loaded: true,
                        duration_ms,
                        position_ms: duration_ms,
                        is_playing: false,
                        did_just_finish: true,
                    });
                    break;
                }

                status_tx.send_replace(PlaybackStatus {
                    is_loaded: true,
                    duration_ms,
                    position_ms,
                    is_playing: true,
                    did_just_finish: false,
                });
            }
        }));

        let status = self.snapshot(&clock);
        self.publish(status);
        info!("Playing {} from {}ms", self.uri, clock.base_position_ms);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut clock = self.clock.lock().await;
        clock.halt(self.duration_ms);
        let status = self.snapshot(&clock);
        self.publish(status);
        debug!("Paused {} at {}ms", self.uri, status.position_ms);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut clock = self.clock.lock().await;
        clock.halt(self.duration_ms);
        clock.base_position_ms = 0;
        let status = self.snapshot(&clock);
        self.publish(status);
        debug!("Stopped {}", self.uri);
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        let mut clock = self.clock.lock().await;
        clock.halt(self.duration_ms);
        clock.base_position_ms = 0;
        clock.loaded = false;
        let status = self.snapshot(&clock);
        self.publish(status);
        debug!("Unloaded {}", self.uri);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status_tx.subscribe()
    }

    fn uri(&self) -> &str {
        &self.uri
    }
}
