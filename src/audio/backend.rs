use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate of produced frames
    pub sample_rate: u32,
    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Frame size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

impl CaptureConfig {
    /// Number of interleaved samples in one frame
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate as u64 * self.buffer_duration_ms / 1000) as usize * self.channels as usize
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - `SignalBackend`: synthetic tone, for headless runs and tests
/// - `MicrophoneBackend`: default input device via cpal (`microphone` feature)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The channel
    /// closes once the backend is stopped.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Synthetic sine tone (no hardware needed)
    Signal,
    /// Default input device
    Microphone,
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Signal => Ok(Box::new(SignalBackend::new(config))),

            CaptureSource::Microphone => {
                #[cfg(feature = "microphone")]
                {
                    use super::microphone::MicrophoneBackend;
                    Ok(Box::new(MicrophoneBackend::new(config)?))
                }

                #[cfg(not(feature = "microphone"))]
                {
                    anyhow::bail!("Microphone capture requires the `microphone` feature")
                }
            }
        }
    }
}

/// Produces a quiet 440Hz tone in real time
pub struct SignalBackend {
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SignalBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SignalBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing.load(Ordering::SeqCst) {
            anyhow::bail!("Signal backend already capturing");
        }

        let (tx, rx) = mpsc::channel(100);
        let config = self.config.clone();
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        info!(
            "Signal capture started: {}Hz, {} channels, {}ms frames",
            config.sample_rate, config.channels, config.buffer_duration_ms
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(config.buffer_duration_ms.max(1)));
            let samples_per_frame = config.samples_per_frame();
            let channels = config.channels.max(1) as usize;
            let mut phase: u64 = 0;
            let mut timestamp_ms = 0;

            while capturing.load(Ordering::SeqCst) {
                ticker.tick().await;

                let mut samples = Vec::with_capacity(samples_per_frame);
                for _ in 0..samples_per_frame / channels {
                    let t = phase as f32 / config.sample_rate as f32;
                    let value = ((t * 440.0 * std::f32::consts::TAU).sin() * 2000.0) as i16;
                    samples.extend(std::iter::repeat(value).take(channels));
                    phase += 1;
                }

                let frame = AudioFrame {
                    samples,
                    sample_rate: config.sample_rate,
                    channels: config.channels,
                    timestamp_ms,
                };

                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver dropped, ending signal capture");
                    break;
                }
                timestamp_ms += config.buffer_duration_ms;
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            // Dropping the task drops the sender, which closes the frame channel
            task.abort();
            let _ = task.await;
        }
        info!("Signal capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "signal"
    }
}
