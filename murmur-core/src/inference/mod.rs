//! Recognition model abstraction.
//!
//! The `InferenceEngine` trait decouples the feature pipeline from any
//! specific backend (stub, TFLite, ONNX, remote service).
//!
//! `&mut self` on `infer` intentionally expresses that decoders are stateful
//! — KV caches, beam hypotheses, interpreter scratch buffers. All mutation is
//! therefore serialised through `EngineHandle`'s `parking_lot::Mutex`, and a
//! call blocks until the backend returns its full token stream.

pub mod stub;

pub use stub::StubEngine;

use std::sync::Arc;

use ndarray::ArrayView3;
use parking_lot::Mutex;

use crate::error::Result;

/// Contract for recognition backends.
pub trait InferenceEngine: Send + 'static {
    /// Run one inference over a `[1, n_mel, n_len]` feature tensor and return
    /// the raw token id stream, special tokens included.
    ///
    /// # Errors
    /// Backend failures surface as `MurmurError::Inference`.
    fn infer(&mut self, features: ArrayView3<'_, f32>) -> Result<Vec<i32>>;
}

/// Thread-safe reference-counted handle to any `InferenceEngine` implementor.
///
/// Uses `parking_lot::Mutex` for non-poisoning behaviour on panic, so one
/// failed request cannot wedge the shared backend.
#[derive(Clone)]
pub struct EngineHandle(pub Arc<Mutex<dyn InferenceEngine>>);

impl EngineHandle {
    /// Wrap any `InferenceEngine` in an `EngineHandle`.
    pub fn new<E: InferenceEngine>(engine: E) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").finish_non_exhaustive()
    }
}
