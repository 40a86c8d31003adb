// Default input device capture via cpal
//
// cpal streams are not Send, so the stream lives on a dedicated thread for
// the duration of the capture. Stopping signals that thread, which drops the
// stream and the frame sender with it.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig};

pub struct MicrophoneBackend {
    config: CaptureConfig,
    device_name: String,
    capturing: Arc<AtomicBool>,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input device available")?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        info!("Using input device: {}", device_name);

        Ok(Self {
            config,
            device_name,
            capturing: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            thread: None,
        })
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing.load(Ordering::SeqCst) {
            anyhow::bail!("Microphone already capturing");
        }

        let (frame_tx, frame_rx) = mpsc::channel(100);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel::<Result<()>>();
        let target_channels = self.config.channels.max(1);
        let capturing = Arc::clone(&self.capturing);

        let thread = std::thread::spawn(move || {
            let stream = match build_stream(frame_tx, target_channels) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(anyhow::anyhow!("Failed to start input stream: {}", e)));
                return;
            }
            capturing.store(true, Ordering::SeqCst);
            let _ = ready_tx.send(Ok(()));

            // Park until stop() or the backend is dropped
            let _ = stop_rx.blocking_recv();
            capturing.store(false, Ordering::SeqCst);
            drop(stream);
        });

        ready_rx
            .await
            .context("Microphone thread exited before starting")??;

        self.stop_tx = Some(stop_tx);
        self.thread = Some(thread);
        info!("Microphone capture started");

        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .context("Failed to join microphone thread")?
                .map_err(|_| anyhow::anyhow!("Microphone thread panicked"))?;
        }
        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream(frame_tx: mpsc::Sender<AudioFrame>, target_channels: u16) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("No input device available")?;
    let stream_config: cpal::StreamConfig = device
        .default_input_config()
        .context("Failed to get input config")?
        .into();

    let sample_rate = stream_config.sample_rate.0;
    let device_channels = stream_config.channels as usize;
    let started = Instant::now();

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Downmix to mono, then duplicate if stereo output was requested
                let samples: Vec<i16> = data
                    .chunks(device_channels)
                    .flat_map(|frame| {
                        let mono = frame.iter().sum::<f32>() / device_channels as f32;
                        let sample = (mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        std::iter::repeat(sample).take(target_channels as usize)
                    })
                    .collect();

                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels: target_channels,
                    timestamp_ms: started.elapsed().as_millis() as u64,
                };
                if let Err(e) = frame_tx.try_send(frame) {
                    debug!("Dropping microphone frame: {}", e);
                }
            },
            |err| error!("Audio input stream error: {}", err),
            None,
        )
        .context("Failed to build input stream")?;

    Ok(stream)
}
