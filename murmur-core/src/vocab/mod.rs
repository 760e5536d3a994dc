//! Token-id → word table with Whisper-style special tokens.
//!
//! The vocabulary is keyed by small, dense, contiguous integers, so it is a
//! plain growable array indexed by token id rather than a hash map.
//!
//! `VocabularyTable` is an immutable value built once per model load. The
//! multilingual +1 id shift is resolved at construction from `LanguageMode`;
//! there is no shared mutable special-token state between loads, so two
//! models in different modes can coexist in one process.

pub mod decoder;

// ── English-baseline special token ids ───────────────────────────────────────
const EOT_BASE: i32 = 50_256;
const SOT_BASE: i32 = 50_257;
const TRANSLATE_BASE: i32 = 50_258;
const TRANSCRIBE_BASE: i32 = 50_259;
const PREV_BASE: i32 = 50_360;
const SOLM_BASE: i32 = 50_361;
const NOT_BASE: i32 = 50_362;
const BEG_BASE: i32 = 50_363;

/// Total vocabulary size including synthesized entries, English models.
const N_VOCAB_ENGLISH: usize = 51_864;
/// Total vocabulary size including synthesized entries, multilingual models.
const N_VOCAB_MULTILINGUAL: usize = 51_865;

/// Whether the loaded model is English-only or multilingual.
///
/// Multilingual vocabularies insert one extra language token ahead of the
/// special-token block, shifting every special id by +1 and growing the
/// synthesized-vocabulary bound by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMode {
    English,
    Multilingual,
}

impl LanguageMode {
    /// Upper bound (exclusive) of the dense token-id space for this mode.
    pub fn vocab_bound(self) -> usize {
        match self {
            LanguageMode::English => N_VOCAB_ENGLISH,
            LanguageMode::Multilingual => N_VOCAB_MULTILINGUAL,
        }
    }

    fn id_shift(self) -> i32 {
        match self {
            LanguageMode::English => 0,
            LanguageMode::Multilingual => 1,
        }
    }
}

/// Resolved special-token ids for one loaded vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    /// End of transcript. Also the threshold: ids at or above `eot` are
    /// control tokens and never render as text.
    pub eot: i32,
    /// Start of transcript.
    pub sot: i32,
    /// Task marker: translate to English.
    pub translate: i32,
    /// Task marker: transcribe verbatim.
    pub transcribe: i32,
    /// Previous-context marker.
    pub prev: i32,
    /// Start of language model.
    pub solm: i32,
    /// No-timestamps marker.
    pub not: i32,
    /// First timestamp token; ids above map to `[_TT_n]` labels.
    pub beg: i32,
}

impl SpecialTokens {
    pub fn for_mode(mode: LanguageMode) -> Self {
        let shift = mode.id_shift();
        Self {
            eot: EOT_BASE + shift,
            sot: SOT_BASE + shift,
            translate: TRANSLATE_BASE + shift,
            transcribe: TRANSCRIBE_BASE + shift,
            prev: PREV_BASE + shift,
            solm: SOLM_BASE + shift,
            not: NOT_BASE + shift,
            beg: BEG_BASE + shift,
        }
    }
}

/// Dense token-id → word mapping for one loaded model.
#[derive(Debug, Clone)]
pub struct VocabularyTable {
    /// Indexed directly by token id. Entries past `loaded_len` are synthesized.
    words: Vec<String>,
    /// Number of entries that came from the resource file.
    loaded_len: usize,
    special: SpecialTokens,
    mode: LanguageMode,
}

impl VocabularyTable {
    /// Build the table from the words read out of the resource file,
    /// synthesizing bracket labels for ids in `[words.len(), vocab_bound)`.
    pub fn new(words: Vec<String>, mode: LanguageMode) -> Self {
        let special = SpecialTokens::for_mode(mode);
        let loaded_len = words.len();
        let bound = mode.vocab_bound().max(loaded_len);

        let mut words = words;
        words.reserve(bound - loaded_len);
        for id in loaded_len..bound {
            words.push(Self::synthesize_label(id as i32, special));
        }

        Self {
            words,
            loaded_len,
            special,
            mode,
        }
    }

    fn synthesize_label(id: i32, special: SpecialTokens) -> String {
        if id > special.beg {
            format!("[_TT_{}]", id - special.beg)
        } else if id == special.eot {
            "[_EOT_]".to_string()
        } else if id == special.sot {
            "[_SOT_]".to_string()
        } else if id == special.prev {
            "[_PREV_]".to_string()
        } else if id == special.not {
            "[_NOT_]".to_string()
        } else if id == special.beg {
            "[_BEG_]".to_string()
        } else {
            format!("[_extra_token_{id}]")
        }
    }

    /// Word for a token id, or `None` if the id is outside the dense range.
    pub fn word(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.words.get(idx))
            .map(String::as_str)
    }

    /// Total number of entries, loaded plus synthesized.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of entries read from the resource file.
    pub fn loaded_len(&self) -> usize {
        self.loaded_len
    }

    /// The words exactly as read from the resource file, for re-serialization.
    pub fn loaded_words(&self) -> &[String] {
        &self.words[..self.loaded_len]
    }

    pub fn special(&self) -> SpecialTokens {
        self.special
    }

    pub fn mode(&self) -> LanguageMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_table(mode: LanguageMode) -> VocabularyTable {
        VocabularyTable::new(vec!["the".into(), " cat".into()], mode)
    }

    #[test]
    fn loaded_words_keep_sequential_ids() {
        let vocab = tiny_table(LanguageMode::English);
        assert_eq!(vocab.word(0), Some("the"));
        assert_eq!(vocab.word(1), Some(" cat"));
        assert_eq!(vocab.loaded_len(), 2);
    }

    #[test]
    fn synthesized_labels_match_at_special_boundaries() {
        let vocab = tiny_table(LanguageMode::English);
        let special = vocab.special();

        assert_eq!(vocab.word(special.eot), Some("[_EOT_]"));
        assert_eq!(vocab.word(special.sot), Some("[_SOT_]"));
        assert_eq!(vocab.word(special.prev), Some("[_PREV_]"));
        assert_eq!(vocab.word(special.not), Some("[_NOT_]"));
        assert_eq!(vocab.word(special.beg), Some("[_BEG_]"));
        assert_eq!(vocab.word(special.beg + 1), Some("[_TT_1]"));
    }

    #[test]
    fn unnamed_extra_ids_get_extra_token_labels() {
        let vocab = tiny_table(LanguageMode::English);
        assert_eq!(vocab.word(2), Some("[_extra_token_2]"));
        assert_eq!(vocab.word(50_255), Some("[_extra_token_50255]"));
    }

    #[test]
    fn multilingual_shifts_every_special_id_by_one() {
        let en = SpecialTokens::for_mode(LanguageMode::English);
        let multi = SpecialTokens::for_mode(LanguageMode::Multilingual);

        assert_eq!(multi.eot, en.eot + 1);
        assert_eq!(multi.sot, en.sot + 1);
        assert_eq!(multi.translate, en.translate + 1);
        assert_eq!(multi.transcribe, en.transcribe + 1);
        assert_eq!(multi.prev, en.prev + 1);
        assert_eq!(multi.solm, en.solm + 1);
        assert_eq!(multi.not, en.not + 1);
        assert_eq!(multi.beg, en.beg + 1);
    }

    #[test]
    fn multilingual_grows_the_vocab_bound() {
        assert_eq!(LanguageMode::English.vocab_bound(), 51_864);
        assert_eq!(LanguageMode::Multilingual.vocab_bound(), 51_865);

        let en = tiny_table(LanguageMode::English);
        let multi = tiny_table(LanguageMode::Multilingual);
        assert_eq!(en.len(), 51_864);
        assert_eq!(multi.len(), 51_865);
    }

    #[test]
    fn multilingual_synthesis_uses_shifted_ids() {
        let vocab = tiny_table(LanguageMode::Multilingual);
        // Shifted EOT: the English-baseline id now holds a plain extra label.
        assert_eq!(vocab.word(50_257), Some("[_EOT_]"));
        assert_eq!(vocab.word(50_256), Some("[_extra_token_50256]"));
        assert_eq!(vocab.word(50_364), Some("[_BEG_]"));
    }

    #[test]
    fn out_of_range_ids_have_no_word() {
        let vocab = tiny_table(LanguageMode::English);
        assert_eq!(vocab.word(-1), None);
        assert_eq!(vocab.word(51_864), None);
    }

    #[test]
    fn two_modes_coexist_without_shared_state() {
        let en = tiny_table(LanguageMode::English);
        let multi = tiny_table(LanguageMode::Multilingual);
        // Constructing one table never perturbs the other's ids.
        assert_eq!(en.special().eot, 50_256);
        assert_eq!(multi.special().eot, 50_257);
        assert_eq!(en.special().eot, 50_256);
    }
}
