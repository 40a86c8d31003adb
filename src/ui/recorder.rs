use std::sync::Arc;
use tracing::error;

use crate::session::AudioSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Started,
    Stopped { uri: String },
}

/// Record/stop toggle
pub struct RecorderControl {
    session: Arc<AudioSession>,
}

impl RecorderControl {
    pub fn new(session: Arc<AudioSession>) -> Self {
        Self { session }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Start or stop depending on the session; failures are logged and yield `None`
    pub async fn press(&self) -> Option<RecorderEvent> {
        if self.session.is_recording() {
            match self.session.stop_recording().await {
                Ok(Some(uri)) => Some(RecorderEvent::Stopped { uri }),
                Ok(None) => None,
                Err(e) => {
                    error!("Error handling record press: {}", e);
                    None
                }
            }
        } else {
            match self.session.start_recording().await {
                Ok(()) => Some(RecorderEvent::Started),
                Err(e) => {
                    error!("Error handling record press: {}", e);
                    None
                }
            }
        }
    }

    pub fn render(&self) -> &'static str {
        if self.session.is_recording() {
            "[stop]"
        } else {
            "[mic]"
        }
    }
}
