use super::types::{DraftMessage, Message, MessageId};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Ordered chat history
///
/// Single writer; readers observe snapshots through `subscribe`.
pub struct MessageStore {
    messages: watch::Sender<Vec<Message>>,
    /// Ids are never reused, even after removal
    next_id: MessageId,
}

impl MessageStore {
    pub fn new() -> Self {
        let (messages, _) = watch::channel(Vec::new());
        Self { messages, next_id: 1 }
    }

    /// Append a message built from `draft`
    ///
    /// Both fields are copied as-is; the store does not reject empty drafts.
    pub fn add_message(&mut self, draft: DraftMessage) -> Message {
        let message = Message {
            id: self.next_id,
            text: draft.text,
            audio_uri: draft.audio_uri,
            created_at: Utc::now(),
        };
        self.next_id += 1;

        info!(
            "Message #{} added (text: {}, audio: {})",
            message.id,
            message.text.is_some(),
            message.audio_uri.is_some()
        );

        let added = message.clone();
        self.messages.send_modify(|messages| messages.push(message));
        added
    }

    /// Remove the message with `id`; unknown ids are ignored
    pub fn remove_message(&mut self, id: MessageId) -> Option<Message> {
        let index = self.messages.borrow().iter().position(|m| m.id == id);

        let Some(index) = index else {
            debug!("No message #{} to remove", id);
            return None;
        };

        let mut removed = None;
        self.messages.send_modify(|messages| removed = Some(messages.remove(index)));
        info!("Message #{} removed", id);
        removed
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.messages.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Snapshot of the history after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.subscribe()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
