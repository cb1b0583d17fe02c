//! Credential cipher boundary
//!
//! Vendor credentials are stored encrypted in the integration row and only
//! decrypted at the moment they cross to the companion service. The cipher
//! itself is a pluggable contract; the default implementation is a keyed
//! XOR stream over base64, matching what the deployment currently ships.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Result, TesseraError};

/// Symmetric cipher for the stored credential pair.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> String;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Keyed XOR cipher. The key is truncated or zero-padded to 32 bytes.
pub struct XorCipher {
    key: [u8; 32],
}

impl XorCipher {
    pub fn new(key: &str) -> Self {
        let mut bytes = [b'0'; 32];
        for (dst, src) in bytes.iter_mut().zip(key.bytes()) {
            *dst = src;
        }
        Self { key: bytes }
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ self.key[i % self.key.len()])
            .collect()
    }
}

impl Cipher for XorCipher {
    fn encrypt(&self, plaintext: &str) -> String {
        BASE64.encode(self.xor(plaintext.as_bytes()))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|e| TesseraError::validation(format!("Invalid ciphertext: {}", e)))?;
        String::from_utf8(self.xor(&raw))
            .map_err(|e| TesseraError::validation(format!("Invalid ciphertext: {}", e)))
    }
}
