use std::collections::HashMap;
use std::sync::Arc;

use super::player::PlayerView;
use crate::messages::{Message, MessageId};
use crate::session::{AudioSession, SoundKey};

/// Scrollable history with one inline player per voice note
pub struct MessageListView {
    session: Arc<AudioSession>,
    assistant_name: String,
    players: HashMap<MessageId, PlayerView>,
}

impl MessageListView {
    pub fn new(session: Arc<AudioSession>, assistant_name: impl Into<String>) -> Self {
        Self {
            session,
            assistant_name: assistant_name.into(),
            players: HashMap::new(),
        }
    }

    /// Mount players for new voice notes and unmount those of removed messages
    pub async fn sync(&mut self, messages: &[Message]) {
        let gone: Vec<MessageId> = self
            .players
            .keys()
            .filter(|id| !messages.iter().any(|m| m.id == **id))
            .copied()
            .collect();
        for id in gone {
            if let Some(player) = self.players.remove(&id) {
                player.unmount().await;
            }
        }

        for message in messages {
            let Some(uri) = &message.audio_uri else { continue };
            if self.players.contains_key(&message.id) {
                continue;
            }
            let player =
                PlayerView::mount(Arc::clone(&self.session), SoundKey::Message(message.id), uri).await;
            self.players.insert(message.id, player);
        }
    }

    pub fn player_mut(&mut self, id: MessageId) -> Option<&mut PlayerView> {
        self.players.get_mut(&id)
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hi there! 👋 My name is {}. How can I assist you today?",
            self.assistant_name
        )
    }

    pub fn render(&mut self, messages: &[Message]) -> String {
        if messages.is_empty() {
            return format!("  {}", self.greeting());
        }

        let mut lines = Vec::new();
        for message in messages {
            let mut line = format!("  #{} [{}]", message.id, message.created_at.format("%H:%M"));
            if let Some(player) = self.players.get_mut(&message.id) {
                line.push(' ');
                line.push_str(&player.render());
            }
            if let Some(text) = &message.text {
                line.push(' ');
                line.push_str(text);
            }
            line.push_str("  [delete]");
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Unmount every player
    pub async fn clear(&mut self) {
        for (_, player) in self.players.drain() {
            player.unmount().await;
        }
    }
}
