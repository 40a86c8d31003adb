use std::sync::Arc;
use tracing::debug;

use super::player::PlayerView;
use super::recorder::{RecorderControl, RecorderEvent};
use crate::messages::{DraftMessage, Message, MessageStore};
use crate::session::{AudioSession, SoundKey};

/// Draft editor: text field, record toggle, send
pub struct Composer {
    session: Arc<AudioSession>,
    recorder: RecorderControl,
    text: String,
    audio_uri: Option<String>,
    player: Option<PlayerView>,
}

impl Composer {
    pub fn new(session: Arc<AudioSession>) -> Self {
        Self {
            recorder: RecorderControl::new(Arc::clone(&session)),
            session,
            text: String::new(),
            audio_uri: None,
            player: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn audio_uri(&self) -> Option<&str> {
        self.audio_uri.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Recording is offered until a voice note is attached
    pub fn can_record(&self) -> bool {
        self.audio_uri.is_none() || self.recorder.is_recording()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerView> {
        self.player.as_mut()
    }

    pub fn draft(&self) -> DraftMessage {
        let text = self.text.trim();
        DraftMessage {
            text: (!text.is_empty()).then(|| text.to_string()),
            audio_uri: self.audio_uri.clone(),
        }
    }

    /// Press the record toggle
    pub async fn toggle_recording(&mut self) -> Option<RecorderEvent> {
        if !self.can_record() {
            debug!("Draft already has a voice note");
            return None;
        }

        let event = self.recorder.press().await;
        if let Some(RecorderEvent::Stopped { uri }) = &event {
            self.audio_uri = Some(uri.clone());
            self.player = Some(PlayerView::attach(Arc::clone(&self.session), SoundKey::Draft).await);
        }
        event
    }

    /// Drop the attached voice note
    pub async fn discard_audio(&mut self) {
        self.audio_uri = None;
        if let Some(player) = self.player.take() {
            player.unmount().await;
        }
    }

    /// Hand the draft to `store` and reset
    ///
    /// Nothing is sent while recording or when the draft is empty.
    pub async fn send(&mut self, store: &mut MessageStore) -> Option<Message> {
        if self.recorder.is_recording() {
            debug!("Send ignored while recording");
            return None;
        }

        let draft = self.draft();
        if draft.is_empty() {
            debug!("Send ignored for empty draft");
            return None;
        }

        if let Some(player) = self.player.take() {
            player.unmount().await;
        }
        self.text.clear();
        self.audio_uri = None;

        Some(store.add_message(draft))
    }

    pub fn render(&mut self) -> String {
        let mut lines = Vec::new();

        if let Some(player) = &mut self.player {
            lines.push(format!("  draft {}", player.render()));
        }

        if self.recorder.is_recording() {
            lines.push(format!("  recording... {}", self.recorder.render()));
        } else {
            let field = if self.text.is_empty() {
                "Ask anything...".to_string()
            } else {
                self.text.clone()
            };
            let mic = if self.can_record() { self.recorder.render() } else { "" };
            lines.push(format!("  > {} {} [send]", field, mic));
        }

        lines.join("\n")
    }
}
