//! Combined vocabulary + filter-bank resource file.
//!
//! ## Layout (native byte order)
//!
//! ```text
//! [4B]           magic = 0x5553454E
//! [4B i32]       n_mel
//! [4B i32]       n_fft
//! [n_mel*n_fft*4B f32]  filter coefficients, row-major [mel][fft_bin]
//! [4B i32]       vocab_count
//! repeated vocab_count times:
//!   [4B i32]     byte length
//!   [len B]      UTF-8 word
//! ```
//!
//! A bad magic or malformed header is `MurmurError::Format`; a short read
//! anywhere surfaces the underlying `std::io::Error` unchanged. Both are
//! fatal at load time — the caller must not proceed to transcription.

pub mod filterbank;

pub use filterbank::MelFilterBank;

use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MurmurError, Result};
use crate::spectrogram::N_FREQS;
use crate::vocab::{LanguageMode, VocabularyTable};

/// `"NESU"` when viewed as little-endian bytes, matching the generator tool.
pub const RESOURCE_MAGIC: u32 = 0x5553_454E;

/// Read-only model resources built once per load and shared across requests.
#[derive(Debug, Clone)]
pub struct ModelResources {
    pub filters: MelFilterBank,
    pub vocab: VocabularyTable,
}

/// Load and parse a resource file from disk.
pub fn load(path: impl AsRef<Path>, mode: LanguageMode) -> Result<ModelResources> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let resources = parse(std::io::BufReader::new(file), mode)?;
    info!(
        path = %path.display(),
        n_mel = resources.filters.n_mel(),
        n_fft = resources.filters.n_fft(),
        loaded_words = resources.vocab.loaded_len(),
        total_words = resources.vocab.len(),
        ?mode,
        "model resources loaded"
    );
    Ok(resources)
}

/// Parse a resource stream.
///
/// `mode` selects the multilingual +1 special-id shift and the synthesized
/// vocabulary bound; it is fixed per load and never mutated afterwards.
pub fn parse(mut reader: impl Read, mode: LanguageMode) -> Result<ModelResources> {
    let magic = read_u32(&mut reader)?;
    if magic != RESOURCE_MAGIC {
        return Err(MurmurError::Format(format!(
            "bad magic {magic:#010x}, expected {RESOURCE_MAGIC:#010x}"
        )));
    }

    let n_mel = read_dim(&mut reader, "n_mel")?;
    let n_fft = read_dim(&mut reader, "n_fft")?;
    if n_fft != N_FREQS {
        return Err(MurmurError::Format(format!(
            "filter bank n_fft {n_fft} does not match the {N_FREQS}-bin frontend"
        )));
    }

    let mut coefficients = vec![0.0f32; n_mel * n_fft];
    for value in coefficients.iter_mut() {
        *value = read_f32(&mut reader)?;
    }
    let filters = MelFilterBank::new(n_mel, n_fft, coefficients)?;

    let vocab_count = read_dim(&mut reader, "vocab_count")?;
    let mut words = Vec::with_capacity(vocab_count);
    for id in 0..vocab_count {
        let len = read_i32(&mut reader)?;
        let len = usize::try_from(len).map_err(|_| {
            MurmurError::Format(format!("negative length {len} for word id {id}"))
        })?;
        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        let word = String::from_utf8(bytes)
            .map_err(|e| MurmurError::Format(format!("word id {id} is not UTF-8: {e}")))?;
        words.push(word);
    }
    debug!(n_mel, n_fft, vocab_count, "resource header parsed");

    let vocab = VocabularyTable::new(words, mode);
    Ok(ModelResources { filters, vocab })
}

/// Serialize a filter bank and the *loaded* vocabulary back to the resource
/// layout. Parsing the output reproduces the input byte-for-byte.
pub fn write(
    mut writer: impl Write,
    filters: &MelFilterBank,
    words: &[String],
) -> Result<()> {
    writer.write_all(&RESOURCE_MAGIC.to_ne_bytes())?;
    writer.write_all(&(filters.n_mel() as i32).to_ne_bytes())?;
    writer.write_all(&(filters.n_fft() as i32).to_ne_bytes())?;
    for &value in filters.data() {
        writer.write_all(&value.to_ne_bytes())?;
    }
    writer.write_all(&(words.len() as i32).to_ne_bytes())?;
    for word in words {
        writer.write_all(&(word.len() as i32).to_ne_bytes())?;
        writer.write_all(word.as_bytes())?;
    }
    Ok(())
}

// ── Native-byte-order primitives ─────────────────────────────────────────────

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}

fn read_i32(reader: &mut impl Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_ne_bytes(buf))
}

fn read_f32(reader: &mut impl Read) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_ne_bytes(buf))
}

fn read_dim(reader: &mut impl Read, name: &str) -> Result<usize> {
    let raw = read_i32(reader)?;
    usize::try_from(raw)
        .map_err(|_| MurmurError::Format(format!("negative {name}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_filters() -> MelFilterBank {
        // Two mel bands over the full 201-bin spectrum.
        let mut data = vec![0.0f32; 2 * N_FREQS];
        for (k, v) in data.iter_mut().enumerate() {
            *v = (k % 7) as f32 * 0.125;
        }
        MelFilterBank::new(2, N_FREQS, data).unwrap()
    }

    fn tiny_resource_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        write(
            &mut bytes,
            &tiny_filters(),
            &["the".to_string(), " cat".to_string(), " sat".to_string()],
        )
        .unwrap();
        bytes
    }

    #[test]
    fn parse_then_write_round_trips_byte_for_byte() {
        let original = tiny_resource_bytes();
        let resources = parse(Cursor::new(&original), LanguageMode::English).unwrap();

        let mut rewritten = Vec::new();
        write(
            &mut rewritten,
            &resources.filters,
            resources.vocab.loaded_words(),
        )
        .unwrap();
        assert_eq!(rewritten, original);
    }

    #[test]
    fn parsed_words_get_sequential_ids_from_zero() {
        let resources =
            parse(Cursor::new(tiny_resource_bytes()), LanguageMode::English).unwrap();
        assert_eq!(resources.vocab.word(0), Some("the"));
        assert_eq!(resources.vocab.word(1), Some(" cat"));
        assert_eq!(resources.vocab.word(2), Some(" sat"));
        assert_eq!(resources.vocab.loaded_len(), 3);
    }

    #[test]
    fn bad_magic_is_a_format_error() {
        let mut bytes = tiny_resource_bytes();
        bytes[0] ^= 0xff;
        let err = parse(Cursor::new(bytes), LanguageMode::English).unwrap_err();
        assert!(matches!(err, MurmurError::Format(_)), "got {err:?}");
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let bytes = tiny_resource_bytes();
        let err = parse(Cursor::new(&bytes[..9]), LanguageMode::English).unwrap_err();
        assert!(matches!(err, MurmurError::Io(_)), "got {err:?}");
    }

    #[test]
    fn truncated_word_is_an_io_error() {
        let bytes = tiny_resource_bytes();
        let err =
            parse(Cursor::new(&bytes[..bytes.len() - 2]), LanguageMode::English).unwrap_err();
        assert!(matches!(err, MurmurError::Io(_)), "got {err:?}");
    }

    #[test]
    fn negative_word_length_is_a_format_error() {
        let mut bytes = Vec::new();
        write(&mut bytes, &tiny_filters(), &[]).unwrap();
        // Claim one word, then give it a negative length prefix.
        let count_at = bytes.len() - 4;
        bytes[count_at..].copy_from_slice(&1i32.to_ne_bytes());
        bytes.extend_from_slice(&(-5i32).to_ne_bytes());
        let err = parse(Cursor::new(bytes), LanguageMode::English).unwrap_err();
        assert!(matches!(err, MurmurError::Format(_)), "got {err:?}");
    }

    #[test]
    fn unexpected_fft_geometry_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&RESOURCE_MAGIC.to_ne_bytes());
        bytes.extend_from_slice(&2i32.to_ne_bytes());
        bytes.extend_from_slice(&128i32.to_ne_bytes());
        bytes.extend(std::iter::repeat(0u8).take(2 * 128 * 4));
        bytes.extend_from_slice(&0i32.to_ne_bytes());
        let err = parse(Cursor::new(bytes), LanguageMode::English).unwrap_err();
        assert!(matches!(err, MurmurError::Format(_)), "got {err:?}");
    }

    #[test]
    fn multilingual_mode_is_applied_at_parse_time() {
        let resources =
            parse(Cursor::new(tiny_resource_bytes()), LanguageMode::Multilingual).unwrap();
        assert_eq!(resources.vocab.special().eot, 50_257);
        assert_eq!(resources.vocab.len(), 51_865);
    }
}
