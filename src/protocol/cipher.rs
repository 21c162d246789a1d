//! Caesar cipher codec
//!
//! Shifts lowercase ASCII letters around the 26-letter alphabet. Any other
//! byte is passed through unchanged; the receiving side rejects such bytes
//! with `Validation::Lowercase` before decoding.

const ALPHABET_LEN: u32 = 26;

/// A Caesar shift amount
///
/// The value travels on the wire as-is; reduction modulo 26 only happens
/// inside the codec, so both ends must agree on the exact integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherKey(pub u32);

impl CipherKey {
    pub fn new(shift: u32) -> Self {
        Self(shift)
    }

    /// The raw key value as sent on the wire
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Effective forward shift in `0..26`
    fn shift(&self) -> u8 {
        (self.0 % ALPHABET_LEN) as u8
    }
}

/// Encipher `text` by shifting each lowercase letter forward by `key`
pub fn encode(text: &[u8], key: CipherKey) -> Vec<u8> {
    let shift = key.shift();
    text.iter().map(|&c| rotate(c, shift)).collect()
}

/// Decipher `ciphertext` enciphered with the same `key`
pub fn decode(ciphertext: &[u8], key: CipherKey) -> Vec<u8> {
    // Shifting back by k is shifting forward by 26 - k.
    let shift = (ALPHABET_LEN as u8 - key.shift()) % ALPHABET_LEN as u8;
    ciphertext.iter().map(|&c| rotate(c, shift)).collect()
}

#[inline]
fn rotate(c: u8, shift: u8) -> u8 {
    if c.is_ascii_lowercase() {
        b'a' + (c - b'a' + shift) % ALPHABET_LEN as u8
    } else {
        c
    }
}
