//! Renders an inference token stream as text.
//!
//! Iteration stops at the first EOT token (excluded from output) or after
//! `limit` tokens, whichever comes first. Ids below the EOT threshold append
//! their mapped word verbatim — vocabulary words already carry the upstream
//! tokenizer's sub-word and boundary markers, so no joining logic is needed
//! here. Ids at or above the threshold are control tokens and never enter
//! the text; the task markers are surfaced as a side signal instead.

use tracing::debug;

use crate::error::{MurmurError, Result};
use crate::vocab::VocabularyTable;

/// Task mode signalled by a control token in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskHint {
    Transcribe,
    Translate,
}

/// Result of decoding one token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub text: String,
    /// Set when a TRANSLATE/TRANSCRIBE control token appeared. Diagnostic
    /// only — the marker itself never renders.
    pub task: Option<TaskHint>,
}

/// Stateless decoder borrowing an immutable vocabulary.
pub struct TokenDecoder<'a> {
    vocab: &'a VocabularyTable,
}

impl<'a> TokenDecoder<'a> {
    pub fn new(vocab: &'a VocabularyTable) -> Self {
        Self { vocab }
    }

    /// Decode up to `limit` tokens, stopping early at the first EOT.
    ///
    /// # Errors
    /// `MurmurError::Lookup` if a sub-threshold id has no vocabulary entry.
    /// Text rendering cannot proceed past a missing entry, so no partial
    /// text is returned.
    pub fn decode(&self, tokens: &[i32], limit: usize) -> Result<DecodeOutcome> {
        let special = self.vocab.special();
        let mut text = String::new();
        let mut task = None;

        for &token in tokens.iter().take(limit) {
            if token == special.eot {
                break;
            }
            if token >= special.eot {
                if token == special.translate {
                    task = Some(TaskHint::Translate);
                } else if token == special.transcribe {
                    task = Some(TaskHint::Transcribe);
                }
                debug!(token, "skipping control token");
                continue;
            }
            let word = self
                .vocab
                .word(token)
                .ok_or(MurmurError::Lookup { token })?;
            text.push_str(word);
        }

        Ok(DecodeOutcome { text, task })
    }
}
