//! # murmur-core
//!
//! Speech-feature extraction and token-decoding frontend for a Whisper-style
//! recognition model.
//!
//! ## Architecture
//!
//! ```text
//! resource file ─► ResourceParser ─► MelFilterBank + VocabularyTable (Arc, per load)
//!                                          │
//! raw f32 samples ─► FeaturePipeline ─► SpectrogramEngine (N workers)
//!                                          │
//!                                   [1, 80, 3000] tensor
//!                                          │
//!                                 InferenceEngine::infer  (external collaborator)
//!                                          │
//!                                   TokenDecoder ─► text
//! ```
//!
//! The filter bank and vocabulary are immutable after load and shared across
//! requests. A `MelSpectrogram` is built fresh per transcription and owned
//! exclusively by the requesting call.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod inference;
pub mod pipeline;
pub mod resource;
pub mod spectrogram;
pub mod vocab;

// Convenience re-exports for downstream crates
pub use error::MurmurError;
pub use inference::{EngineHandle, InferenceEngine};
pub use pipeline::FeaturePipeline;
pub use resource::{MelFilterBank, ModelResources};
pub use spectrogram::{MelSpectrogram, SpectrogramEngine};
pub use vocab::{decoder::TokenDecoder, LanguageMode, SpecialTokens, VocabularyTable};
