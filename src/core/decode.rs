//! Decoding of raw big-endian sensor words.

use crate::core::constants::RAW_WORD_BYTES;
use crate::error::{EngineError, Result};

/// Something that may hold the bytes of one raw sensor word.
///
/// Returning `None` means the word is absent, which is reported the same way
/// as a word of the wrong width.
pub trait RawWord {
    fn word_bytes(&self) -> Option<&[u8]>;
}

impl RawWord for [u8; RAW_WORD_BYTES] {
    fn word_bytes(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl RawWord for Vec<u8> {
    fn word_bytes(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl RawWord for &[u8] {
    fn word_bytes(&self) -> Option<&[u8]> {
        Some(*self)
    }
}

impl<W: RawWord> RawWord for Option<W> {
    fn word_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(RawWord::word_bytes)
    }
}

/// Decode a single word as an unsigned big-endian 16-bit value.
///
/// `index` is only used to locate the word in the error.
pub fn decode_word(index: usize, word: Option<&[u8]>) -> Result<u16> {
    match word {
        Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
        Some(bytes) => Err(EngineError::InvalidInput {
            index,
            len: Some(bytes.len()),
        }),
        None => Err(EngineError::InvalidInput { index, len: None }),
    }
}

/// Decode a sequence of raw words, preserving order.
///
/// Fails on the first absent or malformed word.
pub fn decode_words<W: RawWord>(words: &[W]) -> Result<Vec<u16>> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| decode_word(i, w.word_bytes()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_big_endian() {
        let words: Vec<[u8; 2]> = vec![[0x00, 0x00], [0x01, 0xFF], [0xFF, 0xFF]];
        assert_eq!(decode_words(&words).unwrap(), vec![0, 511, 65535]);
    }

    #[test]
    fn test_round_trip_all_values() {
        for v in 0..=u16::MAX {
            let word = [(v >> 8) as u8, (v & 0xFF) as u8];
            assert_eq!(decode_word(0, Some(&word[..])).unwrap(), v);
        }
    }

    #[test]
    fn test_short_word_rejected() {
        let words = vec![vec![0x00, 0x10], vec![0x01]];
        let err = decode_words(&words).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            err,
            EngineError::InvalidInput {
                index: 1,
                len: Some(1)
            }
        );
    }

    #[test]
    fn test_long_word_rejected() {
        let words = vec![vec![0x00, 0x10, 0x20]];
        assert!(decode_words(&words).is_err());
    }

    #[test]
    fn test_absent_word_rejected() {
        let words: Vec<Option<Vec<u8>>> = vec![Some(vec![0x00, 0x01]), None];
        assert_eq!(
            decode_words(&words).unwrap_err(),
            EngineError::InvalidInput {
                index: 1,
                len: None
            }
        );
    }

    #[test]
    fn test_empty_sequence() {
        let words: Vec<Vec<u8>> = Vec::new();
        assert!(decode_words(&words).unwrap().is_empty());
    }
}
