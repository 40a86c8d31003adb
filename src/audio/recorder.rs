use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend};
use super::platform::{path_to_uri, RecordingHandle, RecordingOptions};

/// Metadata for a finished recording
#[derive(Debug, Clone)]
pub struct RecordingSummary {
    /// File path of the asset
    pub file_path: PathBuf,
    /// Timestamp of the last frame in milliseconds since capture started
    pub end_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Number of samples written
    pub sample_count: usize,
}

/// Records one capture into one WAV file
///
/// Frames from the capture backend are drained by a writer task until the
/// backend closes its channel.
pub struct WavRecording {
    file_path: PathBuf,
    options: RecordingOptions,
    backend: Box<dyn CaptureBackend>,
    writer_task: Option<JoinHandle<Result<RecordingSummary>>>,
    summary: Option<RecordingSummary>,
}

impl WavRecording {
    pub fn new(options: RecordingOptions, backend: Box<dyn CaptureBackend>) -> Result<Self> {
        fs::create_dir_all(&options.output_dir).context("Failed to create recordings directory")?;

        let file_path = options
            .output_dir
            .join(format!("recording-{}.wav", uuid::Uuid::new_v4()));

        info!("Prepared recording: {} (via {})", file_path.display(), backend.name());

        Ok(Self {
            file_path,
            options,
            backend,
            writer_task: None,
            summary: None,
        })
    }

    pub fn summary(&self) -> Option<&RecordingSummary> {
        self.summary.as_ref()
    }
}

#[async_trait::async_trait]
impl RecordingHandle for WavRecording {
    async fn start(&mut self) -> Result<()> {
        if self.writer_task.is_some() || self.summary.is_some() {
            anyhow::bail!("Recording already started");
        }

        let audio_rx = self
            .backend
            .start()
            .await
            .context("Failed to start audio capture")?;

        let file_path = self.file_path.clone();
        let sample_rate = self.options.sample_rate;
        let channels = self.options.channels;

        self.writer_task = Some(tokio::spawn(async move {
            write_frames(audio_rx, file_path, sample_rate, channels).await
        }));

        info!("Recording started: {}", self.file_path.display());
        Ok(())
    }

    async fn stop_and_unload(&mut self) -> Result<()> {
        let task = self
            .writer_task
            .take()
            .context("Recording was never started")?;

        if let Err(e) = self.backend.stop().await {
            task.abort();
            return Err(e).context("Failed to stop audio capture");
        }

        let summary = task.await.context("Recording writer task panicked")??;

        info!(
            "Recording complete: {} ({:.1}s, {} samples)",
            summary.file_path.display(),
            summary.end_ms as f64 / 1000.0,
            summary.sample_count
        );

        self.summary = Some(summary);
        Ok(())
    }

    fn uri(&self) -> Option<String> {
        self.summary.as_ref().map(|s| path_to_uri(&s.file_path))
    }
}

async fn write_frames(
    mut audio_rx: mpsc::Receiver<AudioFrame>,
    file_path: PathBuf,
    sample_rate: u32,
    channels: u16,
) -> Result<RecordingSummary> {
    let mut writer: Option<ClipWriter> = None;

    while let Some(frame) = audio_rx.recv().await {
        // The first frame decides the WAV format, backends may not honor the requested rate
        if writer.is_none() {
            writer = Some(ClipWriter::new(file_path.clone(), frame.sample_rate, frame.channels)?);
        }
        if let Some(writer) = &mut writer {
            writer.write_frame(&frame)?;
        }
    }

    // No frames arrived: still leave a valid, empty asset behind
    let writer = match writer {
        Some(writer) => writer,
        None => ClipWriter::new(file_path, sample_rate, channels)?,
    };

    writer.finish()
}

/// Writes a single clip to disk as WAV file
struct ClipWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    summary: RecordingSummary,
}

impl ClipWriter {
    fn new(file_path: PathBuf, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&file_path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", file_path))?;

        Ok(Self {
            writer: Some(writer),
            summary: RecordingSummary {
                file_path,
                end_ms: 0,
                sample_rate,
                channels,
                sample_count: 0,
            },
        })
    }

    fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }

            self.summary.end_ms = frame.timestamp_ms;
            self.summary.sample_count += frame.samples.len();
        }

        Ok(())
    }

    fn finish(mut self) -> Result<RecordingSummary> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        Ok(self.summary.clone())
    }
}

impl Drop for ClipWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
