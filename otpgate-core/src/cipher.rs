//! Single-block AES-128.
//!
//! Token payloads are exactly one cipher block, so there is no mode of
//! operation, IV, or padding.

use crate::error::CipherError;
use crate::token::BLOCK_SIZE;
use aes::Aes128;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};

/// Size of device keys in bytes (128 bits).
pub const KEY_SIZE: usize = 16;

fn cipher_for(key: &[u8]) -> Result<Aes128, CipherError> {
    Aes128::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

/// Decrypts one block with a device key.
pub fn decrypt_block(key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE], CipherError> {
    let cipher = cipher_for(key)?;
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.decrypt_block(&mut buf);

    let mut out = [0u8; BLOCK_SIZE];
    out.copy_from_slice(&buf);
    Ok(out)
}

/// Encrypts one block with a device key.
pub fn encrypt_block(key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE], CipherError> {
    let cipher = cipher_for(key)?;
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);

    let mut out = [0u8; BLOCK_SIZE];
    out.copy_from_slice(&buf);
    Ok(out)
}
