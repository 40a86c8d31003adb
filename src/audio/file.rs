use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::info;

/// Decoded properties of an audio asset
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub path: String,
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Number of frames (samples per channel)
    pub frames: u64,
}

impl AudioFile {
    /// Probe any format symphonia understands (WAV, M4A, MP3, FLAC, OGG)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .context("Unsupported or corrupt audio file")?;

        let track = probed
            .format
            .default_track()
            .context("Audio file has no playable track")?;
        let params = &track.codec_params;

        let sample_rate = params
            .sample_rate
            .filter(|rate| *rate > 0)
            .context("Audio track has no sample rate")?;
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(1);
        let frames = params.n_frames.unwrap_or(0);
        let duration_ms = frames * 1000 / sample_rate as u64;

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} frames",
            duration_ms as f64 / 1000.0,
            sample_rate,
            channels,
            frames
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_ms,
            sample_rate,
            channels,
            frames,
        })
    }
}
