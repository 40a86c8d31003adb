use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::audio::{AudioPlatform, CaptureSource, LocalPlatform};
use crate::config::Config;
use crate::messages::{Message, MessageId, MessageStore};
use crate::permission::{ConfiguredPermissionGate, PermissionGate};
use crate::session::AudioSession;
use crate::ui::{Composer, MessageListView, RecorderEvent};

/// Which player a transport command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTarget {
    Draft,
    Message(MessageId),
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the draft text
    Text(String),
    Record,
    Send,
    Discard,
    Play(PlayerTarget),
    Pause,
    Stop,
    Delete(MessageId),
    List,
    Dump,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Text(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let command = match name {
            "record" | "r" => Command::Record,
            "send" | "s" => Command::Send,
            "discard" => Command::Discard,
            "play" | "p" => Command::Play(parse_target(arg)?),
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "delete" | "d" => Command::Delete(parse_id(arg)?),
            "list" | "l" => Command::List,
            "dump" => Command::Dump,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => anyhow::bail!("Unknown command: /{}", other),
        };

        Ok(command)
    }
}

fn parse_id(arg: Option<&str>) -> Result<MessageId> {
    let arg = arg.context("Expected a message id")?;
    arg.trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid message id: {}", arg))
}

fn parse_target(arg: Option<&str>) -> Result<PlayerTarget> {
    match arg {
        None | Some("draft") => Ok(PlayerTarget::Draft),
        Some(_) => Ok(PlayerTarget::Message(parse_id(arg)?)),
    }
}

pub const HELP: &str = "\
  <text>            set the draft text
  /record           start or stop a voice note
  /send             send the draft
  /discard          drop the draft voice note
  /play [id|draft]  play or pause a voice note
  /pause, /stop     control the current voice note
  /delete <id>      delete a message
  /list, /dump      show messages (text or JSON)
  /quit";

/// Outcome of handling a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Print this instead of the regular screen
    Output(String),
    Quit,
}

/// Top-level application context
///
/// Owns the message store and the audio session for its whole lifetime;
/// views receive them from here.
pub struct App {
    config: Config,
    store: MessageStore,
    session: Arc<AudioSession>,
    composer: Composer,
    list: MessageListView,
}

impl App {
    /// Build the app on the local platform described by `config`
    pub fn new(config: Config) -> Result<Self> {
        let recordings_dir = config.audio.recordings_dir();
        std::fs::create_dir_all(&recordings_dir)
            .with_context(|| format!("Failed to create recordings directory: {}", recordings_dir.display()))?;

        let source = if config.audio.use_microphone {
            CaptureSource::Microphone
        } else {
            CaptureSource::Signal
        };
        let platform = Arc::new(LocalPlatform::new(source, config.audio.status_interval()));
        let permissions = Arc::new(ConfiguredPermissionGate::new(config.permissions.microphone));

        Ok(Self::with_platform(config, platform, permissions))
    }

    pub fn with_platform(
        config: Config,
        platform: Arc<dyn AudioPlatform>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        let session = Arc::new(AudioSession::new(
            config.audio.session_config(),
            platform,
            permissions,
        ));

        info!("{} ready (assistant: {})", config.app.name, config.app.assistant_name);

        Self {
            composer: Composer::new(Arc::clone(&session)),
            list: MessageListView::new(Arc::clone(&session), config.app.assistant_name.clone()),
            store: MessageStore::new(),
            session,
            config,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn session(&self) -> &Arc<AudioSession> {
        &self.session
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub async fn handle(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Text(text) => self.composer.set_text(text),
            Command::Record => {
                if let Some(RecorderEvent::Started) = self.composer.toggle_recording().await {
                    return Ok(Flow::Output("  recording... /record again to stop".to_string()));
                }
            }
            Command::Send => {
                if self.composer.send(&mut self.store).await.is_some() {
                    self.sync_list().await;
                }
            }
            Command::Discard => self.composer.discard_audio().await,
            Command::Play(PlayerTarget::Draft) => {
                if let Some(player) = self.composer.player_mut() {
                    player.toggle().await;
                }
            }
            Command::Play(PlayerTarget::Message(id)) => match self.list.player_mut(id) {
                Some(player) => player.toggle().await,
                None => return Ok(Flow::Output(format!("  no voice note on message #{}", id))),
            },
            Command::Pause => self.session.pause_audio().await?,
            Command::Stop => self.session.stop_audio().await?,
            Command::Delete(id) => {
                self.delete_message(id).await;
            }
            Command::List => {}
            Command::Dump => {
                let json = serde_json::to_string_pretty(&self.store.messages())?;
                return Ok(Flow::Output(json));
            }
            Command::Help => return Ok(Flow::Output(HELP.to_string())),
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Remove a message, its player, and with `prune_on_delete` its voice note
    pub async fn delete_message(&mut self, id: MessageId) -> Option<Message> {
        let removed = self.store.remove_message(id)?;
        self.sync_list().await;

        if self.config.audio.prune_on_delete {
            if let Some(uri) = &removed.audio_uri {
                if let Err(e) = self.session.delete_asset(uri).await {
                    warn!("Voice note of message #{} kept: {}", id, e);
                }
            }
        }

        Some(removed)
    }

    async fn sync_list(&mut self) {
        let messages = self.store.messages();
        self.list.sync(&messages).await;
    }

    pub fn render(&mut self) -> String {
        let messages = self.store.messages();
        format!(
            "== {} ==\n{}\n{}",
            self.config.app.name,
            self.list.render(&messages),
            self.composer.render()
        )
    }

    /// Release every player and the session
    pub async fn shutdown(&mut self) {
        self.list.clear().await;
        self.composer.discard_audio().await;
        self.session.shutdown().await;
        info!("{} shut down", self.config.app.name);
    }
}
