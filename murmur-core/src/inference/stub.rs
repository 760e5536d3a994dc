//! `StubEngine` — scripted backend that returns canned token streams.
//!
//! Stands in for a real recognition model so the resource/spectrogram/decode
//! path can be exercised end-to-end without model weights. Each call pops the
//! next script entry; once the script is exhausted it keeps returning the
//! last entry.

use ndarray::ArrayView3;
use tracing::debug;

use crate::error::{MurmurError, Result};
use crate::inference::InferenceEngine;

pub struct StubEngine {
    script: Vec<Vec<i32>>,
    next: usize,
}

impl StubEngine {
    pub fn new(script: Vec<Vec<i32>>) -> Self {
        Self { script, next: 0 }
    }

    /// A stub that answers every request with the same stream.
    pub fn repeating(tokens: Vec<i32>) -> Self {
        Self::new(vec![tokens])
    }
}

impl InferenceEngine for StubEngine {
    fn infer(&mut self, features: ArrayView3<'_, f32>) -> Result<Vec<i32>> {
        let entry = self
            .script
            .get(self.next)
            .or_else(|| self.script.last())
            .ok_or_else(|| MurmurError::Inference("stub script is empty".into()))?;
        if self.next + 1 < self.script.len() {
            self.next += 1;
        }
        debug!(shape = ?features.shape(), tokens = entry.len(), "stub inference");
        Ok(entry.clone())
    }
}
