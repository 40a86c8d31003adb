use std::sync::Arc;
use tokio::sync::watch;
use tracing::error;

use super::format::{format_time, progress_bar};
use crate::audio::PlaybackStatus;
use crate::session::{AudioSession, SoundKey};

const PROGRESS_WIDTH: usize = 20;

/// Inline player for one voice note
///
/// Transport goes through the session; the displayed position comes from
/// the status the session's handle pushes.
pub struct PlayerView {
    key: SoundKey,
    session: Arc<AudioSession>,
    status_rx: Option<watch::Receiver<PlaybackStatus>>,
    status: PlaybackStatus,
}

impl PlayerView {
    /// Load `uri` into the session under `key` and attach to it
    ///
    /// A load failure is logged and leaves an inert player.
    pub async fn mount(session: Arc<AudioSession>, key: SoundKey, uri: &str) -> Self {
        if let Err(e) = session.load(key, uri).await {
            error!("Failed to load sound for {}: {}", key, e);
        }
        Self::attach(session, key).await
    }

    /// Attach to a handle the session already holds under `key`
    pub async fn attach(session: Arc<AudioSession>, key: SoundKey) -> Self {
        let status_rx = session.subscribe(key).await;
        let status = status_rx
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or_default();

        Self {
            key,
            session,
            status_rx,
            status,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status_rx.is_some() && self.status.is_loaded
    }

    /// Latest pushed status; natural completion shows as rewound
    pub fn status(&mut self) -> PlaybackStatus {
        if let Some(rx) = &mut self.status_rx {
            let mut status = *rx.borrow_and_update();
            if status.did_just_finish {
                status.position_ms = 0;
                status.is_playing = false;
            }
            self.status = status;
        }
        self.status
    }

    pub fn is_playing(&mut self) -> bool {
        self.status().is_playing
    }

    /// Play when idle, pause when playing
    pub async fn toggle(&mut self) {
        if self.status_rx.is_none() {
            return;
        }

        let result = if self.is_playing() {
            self.session.pause_audio().await
        } else {
            self.session.play_audio(self.key).await
        };

        if let Err(e) = result {
            error!("Failed to play/pause sound: {}", e);
        }
    }

    pub fn render(&mut self) -> String {
        if self.status_rx.is_none() {
            return "(audio unavailable)".to_string();
        }

        let status = self.status();
        let glyph = if status.is_playing { "||" } else { "|>" };
        format!(
            "{} {} / {} {}",
            glyph,
            format_time(status.position_ms),
            format_time(status.duration_ms),
            progress_bar(status.progress(), PROGRESS_WIDTH)
        )
    }

    /// Release the handle
    pub async fn unmount(self) {
        if let Err(e) = self.session.unload(self.key).await {
            error!("Failed to unload sound for {}: {}", self.key, e);
        }
    }
}
