// Integration tests for the views and the application context
//
// These tests run the composer, players and message list against the
// scripted platform, the way the terminal front end drives them.

mod common;

use anyhow::Result;
use common::{MockPermissions, MockPlatform};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use travel_gpt::ui::{Composer, MessageListView, PlayerView, RecorderEvent};
use travel_gpt::{
    format_time, App, AudioSession, Command, Config, DraftMessage, Flow, MessageStore, PlayerTarget, SessionConfig,
    SessionState, SoundKey,
};

fn shared_session(platform: &Arc<MockPlatform>) -> Arc<AudioSession> {
    Arc::new(AudioSession::new(
        SessionConfig::default(),
        platform.clone(),
        MockPermissions::new(true, true),
    ))
}

fn app(platform: &Arc<MockPlatform>, prune_on_delete: bool) -> App {
    let mut config = Config::default();
    config.audio.prune_on_delete = prune_on_delete;
    App::with_platform(config, platform.clone(), MockPermissions::new(true, true))
}

#[test]
fn test_format_time_minutes_seconds() {
    assert_eq!(format_time(65000), "1:05");
    assert_eq!(format_time(0), "0:00");
    assert_eq!(format_time(9_999), "0:09");
    assert_eq!(format_time(3_599_000), "59:59");
}

#[test]
fn test_command_parsing() -> Result<()> {
    assert_eq!(Command::parse("Where should I eat in Lisbon?")?, Command::Text("Where should I eat in Lisbon?".into()));
    assert_eq!(Command::parse("/record")?, Command::Record);
    assert_eq!(Command::parse("/send")?, Command::Send);
    assert_eq!(Command::parse("/play")?, Command::Play(PlayerTarget::Draft));
    assert_eq!(Command::parse("/play draft")?, Command::Play(PlayerTarget::Draft));
    assert_eq!(Command::parse("/play #3")?, Command::Play(PlayerTarget::Message(3)));
    assert_eq!(Command::parse("/delete 2")?, Command::Delete(2));
    assert_eq!(Command::parse("  /q ")?, Command::Quit);

    assert!(Command::parse("/delete").is_err());
    assert!(Command::parse("/delete two").is_err());
    assert!(Command::parse("/teleport").is_err());
    Ok(())
}

#[tokio::test]
async fn test_composer_refuses_empty_draft() {
    let platform = MockPlatform::new();
    let mut composer = Composer::new(shared_session(&platform));
    let mut store = MessageStore::new();

    assert!(composer.send(&mut store).await.is_none());
    composer.set_text("   ");
    assert!(composer.send(&mut store).await.is_none());

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_composer_sends_trimmed_text_and_resets() {
    let platform = MockPlatform::new();
    let mut composer = Composer::new(shared_session(&platform));
    let mut store = MessageStore::new();

    composer.set_text("  Best time to visit Kyoto?  ");
    let sent = composer.send(&mut store).await.expect("message sent");

    assert_eq!(sent.id, 1);
    assert_eq!(sent.text.as_deref(), Some("Best time to visit Kyoto?"));
    assert!(sent.audio_uri.is_none());
    assert_eq!(composer.text(), "");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_composer_records_and_sends_voice_note() -> Result<()> {
    let platform = MockPlatform::new();
    let session = shared_session(&platform);
    let mut composer = Composer::new(Arc::clone(&session));
    let mut store = MessageStore::new();

    assert_eq!(composer.toggle_recording().await, Some(RecorderEvent::Started));
    assert!(composer.is_recording());

    composer.set_text("Listen to this");
    assert!(composer.send(&mut store).await.is_none(), "No send while recording");

    let event = composer.toggle_recording().await;
    assert!(matches!(event, Some(RecorderEvent::Stopped { .. })));
    assert!(composer.audio_uri().is_some());
    assert!(!composer.can_record(), "One voice note per draft");
    assert!(composer.toggle_recording().await.is_none());

    let player = composer.player_mut().expect("draft player");
    assert!(player.is_loaded());
    assert!(player.render().contains("0:00 / 0:05"));

    let sent = composer.send(&mut store).await.expect("message sent");
    assert_eq!(sent.text.as_deref(), Some("Listen to this"));
    assert_eq!(sent.audio_uri.as_deref(), Some("file:///mock/recording-1.wav"));
    assert!(composer.audio_uri().is_none());
    assert!(!session.is_loaded(SoundKey::Draft).await, "Draft player unmounted on send");
    Ok(())
}

#[tokio::test]
async fn test_discard_audio_unloads_draft() -> Result<()> {
    let platform = MockPlatform::new();
    let session = shared_session(&platform);
    let mut composer = Composer::new(Arc::clone(&session));

    composer.toggle_recording().await;
    composer.toggle_recording().await;
    assert!(session.is_loaded(SoundKey::Draft).await);

    composer.discard_audio().await;

    assert!(composer.audio_uri().is_none());
    assert!(composer.can_record());
    assert!(platform.last_sound().unloaded.load(Ordering::SeqCst));
    Ok(())
}

#[tokio::test]
async fn test_player_toggle_and_completion() -> Result<()> {
    let platform = MockPlatform::new();
    let session = shared_session(&platform);

    let mut player = PlayerView::mount(Arc::clone(&session), SoundKey::Message(1), "file:///mock/a.wav").await;
    assert!(player.is_loaded());
    assert!(!player.is_playing());

    player.toggle().await;
    assert!(player.is_playing());
    assert_eq!(session.state(), SessionState::Playing);

    platform.last_sound().advance_to(3_000);
    assert!(player.render().starts_with("|| 0:03 / 0:05"));

    player.toggle().await;
    assert!(!player.is_playing());
    assert_eq!(session.state(), SessionState::Paused);

    platform.last_sound().finish();
    let status = player.status();
    assert_eq!(status.position_ms, 0, "Finished players show a rewound position");
    assert!(!status.is_playing);

    player.unmount().await;
    assert!(!session.is_loaded(SoundKey::Message(1)).await);
    Ok(())
}

#[tokio::test]
async fn test_player_with_failed_load_is_inert() {
    let platform = MockPlatform::new();
    platform.fail(common::Fail::Load);
    let session = shared_session(&platform);

    let mut player = PlayerView::mount(Arc::clone(&session), SoundKey::Message(1), "file:///mock/a.wav").await;

    assert!(!player.is_loaded());
    player.toggle().await;
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(player.render(), "(audio unavailable)");
}

#[tokio::test]
async fn test_message_list_mounts_and_unmounts_players() {
    let platform = MockPlatform::new();
    let session = shared_session(&platform);
    let mut list = MessageListView::new(Arc::clone(&session), "Tratoli");
    let mut store = MessageStore::new();

    assert!(list.render(&store.messages()).contains("My name is Tratoli"));

    store.add_message(DraftMessage::text("Hi"));
    store.add_message(DraftMessage::audio("file:///mock/a.wav"));
    list.sync(&store.messages()).await;

    assert!(list.player_mut(1).is_none());
    assert!(list.player_mut(2).is_some());
    assert!(session.is_loaded(SoundKey::Message(2)).await);

    let screen = list.render(&store.messages());
    assert!(screen.contains("#1"));
    assert!(screen.contains("Hi"));
    assert!(screen.contains("0:00 / 0:05"));

    store.remove_message(2);
    list.sync(&store.messages()).await;

    assert!(list.player_mut(2).is_none());
    assert!(!session.is_loaded(SoundKey::Message(2)).await);
}

#[tokio::test]
async fn test_app_flow() -> Result<()> {
    let platform = MockPlatform::new();
    let mut app = app(&platform, false);

    assert!(app.render().contains("Travel GPT"));

    app.handle(Command::Text("Hello".into())).await?;
    assert_eq!(app.handle(Command::Send).await?, Flow::Continue);
    app.handle(Command::Record).await?;
    assert!(app.session().is_recording());
    app.handle(Command::Record).await?;
    app.handle(Command::Send).await?;

    let messages = app.store().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].id, 2);
    assert!(messages[1].audio_uri.is_some());

    app.handle(Command::Play(PlayerTarget::Message(2))).await?;
    assert!(app.session().is_playing());
    app.handle(Command::Pause).await?;
    assert_eq!(app.session().state(), SessionState::Paused);
    app.handle(Command::Stop).await?;
    assert_eq!(app.session().state(), SessionState::Idle);

    match app.handle(Command::Play(PlayerTarget::Message(1))).await? {
        Flow::Output(text) => assert!(text.contains("no voice note")),
        other => panic!("expected output, got {:?}", other),
    }

    match app.handle(Command::Dump).await? {
        Flow::Output(json) => {
            let parsed: serde_json::Value = serde_json::from_str(&json)?;
            assert_eq!(parsed.as_array().map(|a| a.len()), Some(2));
            assert_eq!(parsed[0]["text"], "Hello");
        }
        other => panic!("expected JSON dump, got {:?}", other),
    }

    assert_eq!(app.handle(Command::Quit).await?, Flow::Quit);
    app.shutdown().await;
    assert!(platform.sounds().iter().all(|s| s.unloaded.load(Ordering::SeqCst)));
    Ok(())
}

#[tokio::test]
async fn test_delete_keeps_asset_by_default() -> Result<()> {
    let platform = MockPlatform::new();
    let mut app = app(&platform, false);

    app.handle(Command::Record).await?;
    app.handle(Command::Record).await?;
    app.handle(Command::Send).await?;
    app.handle(Command::Delete(1)).await?;

    assert!(app.store().is_empty());
    assert!(platform.deleted().is_empty());

    // Deleting again is a no-op
    app.handle(Command::Delete(1)).await?;
    Ok(())
}

#[tokio::test]
async fn test_delete_prunes_asset_when_configured() -> Result<()> {
    let platform = MockPlatform::new();
    let mut app = app(&platform, true);

    app.handle(Command::Record).await?;
    app.handle(Command::Record).await?;
    app.handle(Command::Send).await?;

    let removed = app.delete_message(1).await.expect("message removed");

    assert_eq!(platform.deleted(), vec![removed.audio_uri.expect("voice note")]);
    assert!(!app.session().is_loaded(SoundKey::Message(1)).await);
    Ok(())
}
