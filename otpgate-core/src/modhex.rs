//! Modhex encoding.
//!
//! Hardware tokens type their output as keystrokes, so they use a hex
//! alphabet made only of keys that sit in the same place on common keyboard
//! layouts. Nibble `n` is written as `ALPHABET[n]`, high nibble first.

use crate::error::CodecError;
use crate::token::BLOCK_SIZE;

/// The sixteen modhex characters, indexed by nibble value.
pub const ALPHABET: &[u8; 16] = b"cbdefghijklnrtuv";

/// Length of an encoded token block in characters.
pub const ENCODED_BLOCK_LEN: usize = BLOCK_SIZE * 2;

/// Encodes bytes as modhex. Total over any input.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(ALPHABET[(b >> 4) as usize] as char);
        out.push(ALPHABET[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decodes modhex text into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(CodecError::OddLength(chars.len()));
    }

    let mut out = Vec::with_capacity(chars.len() / 2);
    for (i, pair) in chars.chunks_exact(2).enumerate() {
        let hi = nibble(pair[0], i * 2)?;
        let lo = nibble(pair[1], i * 2 + 1)?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

/// Decodes exactly one encrypted token block.
pub fn decode_block(text: &str) -> Result<[u8; BLOCK_SIZE], CodecError> {
    let bytes = decode(text)?;
    bytes.as_slice().try_into().map_err(|_| CodecError::WrongLength {
        expected: BLOCK_SIZE,
        actual: bytes.len(),
    })
}

/// Returns true if every character of `text` is in the alphabet.
pub fn is_modhex(text: &str) -> bool {
    text.bytes().all(|b| ALPHABET.contains(&b))
}

fn nibble(ch: char, position: usize) -> Result<u8, CodecError> {
    ALPHABET
        .iter()
        .position(|&c| c as char == ch)
        .map(|n| n as u8)
        .ok_or(CodecError::InvalidCharacter { ch, position })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        assert_eq!(encode(&[0x00]), "cc");
        assert_eq!(encode(&[0xff]), "vv");
        assert_eq!(encode(&[0x01, 0x23, 0x45, 0x67]), "cbdefghi");
        assert_eq!(encode(&[0x89, 0xab, 0xcd, 0xef]), "jklnrtuv");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn decodes_known_values() {
        assert_eq!(decode("cbdefghijklnrtuv").unwrap(), vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_hex_digits() {
        let err = decode("0a").unwrap_err();
        assert_eq!(err, CodecError::InvalidCharacter { ch: '0', position: 0 });
    }

    #[test]
    fn rejects_uppercase() {
        assert!(matches!(
            decode("cC"),
            Err(CodecError::InvalidCharacter { ch: 'C', position: 1 })
        ));
    }

    #[test]
    fn rejects_odd_length() {
        assert_eq!(decode("cbd").unwrap_err(), CodecError::OddLength(3));
    }

    #[test]
    fn decode_block_checks_length() {
        let short = encode(&[0u8; 15]);
        assert_eq!(
            decode_block(&short).unwrap_err(),
            CodecError::WrongLength { expected: 16, actual: 15 }
        );
        let exact = encode(&[7u8; 16]);
        assert_eq!(decode_block(&exact).unwrap(), [7u8; 16]);
    }

    #[test]
    fn multibyte_input_is_rejected_not_panicking() {
        assert!(decode("cé").is_err());
        assert!(!is_modhex("cé"));
    }

    #[test]
    fn is_modhex_accepts_alphabet_only() {
        assert!(is_modhex("cbdefghijklnrtuv"));
        assert!(!is_modhex("cbdefghijklnrtua"));
    }
}
