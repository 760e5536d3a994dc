//! Triangular mel filter coefficients from the resource file.

use crate::error::{MurmurError, Result};

/// Row-major `[mel][fft_bin]` filter matrix. Immutable after load; one
/// instance is shared by every transcription request against the model.
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    n_mel: usize,
    n_fft: usize,
    data: Vec<f32>,
}

impl MelFilterBank {
    pub fn new(n_mel: usize, n_fft: usize, data: Vec<f32>) -> Result<Self> {
        if n_mel == 0 || n_fft == 0 {
            return Err(MurmurError::Format(format!(
                "filter bank dimensions must be positive: n_mel={n_mel} n_fft={n_fft}"
            )));
        }
        if data.len() != n_mel * n_fft {
            return Err(MurmurError::Format(format!(
                "filter bank holds {} coefficients, expected {}",
                data.len(),
                n_mel * n_fft
            )));
        }
        Ok(Self { n_mel, n_fft, data })
    }

    pub fn n_mel(&self) -> usize {
        self.n_mel
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Coefficients for one mel band, length `n_fft`.
    pub fn row(&self, mel: usize) -> &[f32] {
        &self.data[mel * self.n_fft..(mel + 1) * self.n_fft]
    }
}
