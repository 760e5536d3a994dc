//! Log-mel spectrogram frontend.
//!
//! ## Parameters (must match model training)
//!
//! | Parameter       | Value          |
//! |-----------------|----------------|
//! | Sample rate     | 16 000 Hz      |
//! | Hann window     | 400 samples    |
//! | FFT size        | 400            |
//! | Frequency bins  | 201 (400/2+1)  |
//! | Hop length      | 160 (10 ms)    |
//! | Mel bands       | 80             |
//! | Frames          | 3 000 (30 s)   |
//!
//! ## Threading
//!
//! Frames are independent, so frame indices are dealt round-robin across the
//! requested worker count: worker k owns frames `k, k+threads, k+2*threads…`,
//! which balances load regardless of per-frame cost variance. Each worker has
//! private FFT scratch and writes only the frame rows it owns, so the only
//! synchronization is the scope join. Output values are deterministic up to
//! ULP-scale float summation differences across thread counts.

pub mod fft;

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::resource::MelFilterBank;

/// Model input sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16_000;
/// Frame and FFT length (25 ms).
pub const N_FFT: usize = 400;
/// Retained frequency bins: N_FFT/2 + 1.
pub const N_FREQS: usize = N_FFT / 2 + 1;
/// Hop between frames (10 ms).
pub const HOP: usize = 160;
/// Mel bands expected by the recognition model.
pub const N_MELS: usize = 80;
/// Frames per 30 s chunk: CHUNK_SAMPLES / HOP.
pub const N_FRAMES: usize = CHUNK_SAMPLES / HOP;
/// Samples per 30 s chunk at 16 kHz.
pub const CHUNK_SAMPLES: usize = 480_000;

/// Silence floor applied before log10.
const LOG_FLOOR: f32 = 1e-10;
/// Dynamic range below the global maximum kept after the log, in dex.
const DYNAMIC_RANGE: f32 = 8.0;

/// One spectrogram, exclusively owned by the requesting call.
///
/// `data` is mel-major: `data[m * n_len + i]` is band `m` at frame `i`.
#[derive(Debug, Clone)]
pub struct MelSpectrogram {
    pub n_mel: usize,
    pub n_len: usize,
    pub data: Vec<f32>,
}

/// Windowing + FFT + mel projection + normalization.
///
/// Holds the shared filter bank and the precomputed Hann window; `compute`
/// takes `&self`, so one engine serves concurrent requests.
pub struct SpectrogramEngine {
    filters: Arc<MelFilterBank>,
    hann: Vec<f32>,
}

impl SpectrogramEngine {
    pub fn new(filters: Arc<MelFilterBank>) -> Self {
        // Periodic Hann: w[i] = 0.5 * (1 - cos(2πi/N)).
        let hann: Vec<f32> = (0..N_FFT)
            .map(|i| {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / N_FFT as f32;
                0.5 * (1.0 - angle.cos())
            })
            .collect();
        Self { filters, hann }
    }

    pub fn filters(&self) -> &MelFilterBank {
        &self.filters
    }

    /// Compute the log-mel spectrogram of a 30 s sample buffer.
    ///
    /// `samples` is treated as zero past its true length, so callers may pass
    /// a buffer shorter than [`CHUNK_SAMPLES`]; the frame count is fixed at
    /// [`N_FRAMES`] either way. A worker count of 0 runs single-threaded.
    pub fn compute(&self, samples: &[f32], threads: usize) -> MelSpectrogram {
        let threads = threads.max(1).min(N_FRAMES);
        let n_mel = self.filters.n_mel();
        let started = Instant::now();

        // Workers fill disjoint rows of a frame-major scratch matrix; the
        // transposed mel-major layout is produced serially after the join.
        let mut frame_major = vec![0.0f32; N_FRAMES * n_mel];
        {
            let mut assignments: Vec<Vec<(usize, &mut [f32])>> = Vec::new();
            assignments.resize_with(threads, Vec::new);
            for (frame, row) in frame_major.chunks_mut(n_mel).enumerate() {
                assignments[frame % threads].push((frame, row));
            }

            let filters = self.filters.as_ref();
            let hann = self.hann.as_slice();
            std::thread::scope(|scope| {
                for owned_frames in assignments {
                    scope.spawn(move || {
                        let mut windowed = vec![0.0f32; N_FFT];
                        let mut spectrum: Vec<f32> = Vec::with_capacity(2 * N_FFT);
                        let mut power = vec![0.0f32; N_FFT];

                        for (frame, mel_row) in owned_frames {
                            let offset = frame * HOP;
                            for (j, w) in windowed.iter_mut().enumerate() {
                                let sample =
                                    samples.get(offset + j).copied().unwrap_or(0.0);
                                *w = sample * hann[j];
                            }

                            fft::fft(&windowed, &mut spectrum);
                            for (k, p) in power.iter_mut().enumerate() {
                                let re = spectrum[2 * k];
                                let im = spectrum[2 * k + 1];
                                *p = re * re + im * im;
                            }
                            // Fold the mirror half onto the retained bins.
                            for j in 1..N_FFT / 2 {
                                power[j] += power[N_FFT - j];
                            }

                            for (m, out) in mel_row.iter_mut().enumerate() {
                                let row = filters.row(m);
                                let mut sum = 0.0f32;
                                for k in 0..N_FREQS {
                                    sum += power[k] * row[k];
                                }
                                *out = sum.max(LOG_FLOOR).log10();
                            }
                        }
                    });
                }
            });
        }

        let mut data = vec![0.0f32; n_mel * N_FRAMES];
        for frame in 0..N_FRAMES {
            for m in 0..n_mel {
                data[m * N_FRAMES + frame] = frame_major[frame * n_mel + m];
            }
        }

        // Floor to max - 8 dex, then rescale into the model's input range.
        let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = max - DYNAMIC_RANGE;
        for v in data.iter_mut() {
            *v = ((*v).max(floor) + 4.0) / 4.0;
        }

        debug!(
            threads,
            n_mel,
            n_len = N_FRAMES,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "mel spectrogram computed"
        );

        MelSpectrogram {
            n_mel,
            n_len: N_FRAMES,
            data,
        }
    }
}
