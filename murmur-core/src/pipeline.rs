//! End-to-end transcription pipeline.
//!
//! One `FeaturePipeline` per loaded model: it owns the shared resources, the
//! spectrogram engine, and a handle to the recognition backend. A request
//! flows strictly forward:
//!
//! ```text
//! samples ─► fix length (480 000) ─► log-mel ─► [1, 80, 3000] ─► infer ─► decode
//! ```
//!
//! The backend call is blocking; the engine mutex serialises concurrent
//! requests at that stage while spectrogram extraction runs unserialised.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ndarray::Array3;
use tracing::{info, warn};

use crate::error::{MurmurError, Result};
use crate::inference::EngineHandle;
use crate::resource::ModelResources;
use crate::spectrogram::{SpectrogramEngine, CHUNK_SAMPLES, SAMPLE_RATE};
use crate::vocab::decoder::{DecodeOutcome, TokenDecoder};

/// Upper bound on tokens consumed from one inference result.
pub const MAX_OUTPUT_TOKENS: usize = 224;

pub struct FeaturePipeline {
    resources: Arc<ModelResources>,
    spectrogram: SpectrogramEngine,
    engine: EngineHandle,
    threads: usize,
}

impl FeaturePipeline {
    /// `threads` is the spectrogram worker count; 0 means single-threaded.
    pub fn new(resources: Arc<ModelResources>, engine: EngineHandle, threads: usize) -> Self {
        let spectrogram = SpectrogramEngine::new(Arc::new(resources.filters.clone()));
        Self {
            resources,
            spectrogram,
            engine,
            threads,
        }
    }

    pub fn resources(&self) -> &ModelResources {
        &self.resources
    }

    /// Transcribe one buffer of mono 16 kHz f32 samples.
    ///
    /// Input longer than 30 s is truncated; shorter input is implicitly
    /// zero-padded. The text is empty when the backend emits EOT first.
    pub fn transcribe(&self, samples: &[f32]) -> Result<DecodeOutcome> {
        let started = Instant::now();
        let clipped = if samples.len() > CHUNK_SAMPLES {
            warn!(
                samples = samples.len(),
                kept = CHUNK_SAMPLES,
                "input exceeds one chunk, truncating"
            );
            &samples[..CHUNK_SAMPLES]
        } else {
            samples
        };

        let mel = self.spectrogram.compute(clipped, self.threads);
        let features = Array3::from_shape_vec((1, mel.n_mel, mel.n_len), mel.data)
            .map_err(|e| MurmurError::Inference(format!("feature tensor shape: {e}")))?;

        let tokens = self.engine.0.lock().infer(features.view())?;

        let outcome =
            TokenDecoder::new(&self.resources.vocab).decode(&tokens, MAX_OUTPUT_TOKENS)?;
        info!(
            samples = clipped.len(),
            tokens = tokens.len(),
            chars = outcome.text.len(),
            task = ?outcome.task,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transcription finished"
        );
        Ok(outcome)
    }

    /// Transcribe a WAV file. The file must already be 16 kHz; multi-channel
    /// audio is averaged down to mono.
    pub fn transcribe_file(&self, path: impl AsRef<Path>) -> Result<DecodeOutcome> {
        let samples = read_wav_mono(path.as_ref())?;
        self.transcribe(&samples)
    }
}

/// Read a WAV file as mono f32, rejecting anything not at the model rate.
pub fn read_wav_mono(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| MurmurError::InvalidAudio(format!("{}: {e}", path.display())))?;
    let spec = reader.spec();
    if spec.sample_rate != SAMPLE_RATE {
        return Err(MurmurError::InvalidAudio(format!(
            "{}: sample rate {} Hz, expected {} Hz",
            path.display(),
            spec.sample_rate,
            SAMPLE_RATE
        )));
    }
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| MurmurError::InvalidAudio(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| MurmurError::InvalidAudio(e.to_string()))?
        }
    };

    if channels == 1 {
        return Ok(interleaved);
    }
    Ok(interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}
